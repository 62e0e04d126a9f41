use crate::list::chain::{chain_next, merge_chains, set_chain_next, Link, OpenList};
use crate::list::List;
use std::cmp::Ordering;

impl<T> List<T> {
    /// Sort the list.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n* * log(*n*)) time, with a
    /// recursion depth of *O*(log(*n*)).
    ///
    /// # Current Implementation
    ///
    /// The list is opened into a singly-linked chain, merge-sorted without
    /// touching any `prev` link, and then every `prev` link is repaired in one
    /// final pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut list = List::from_iter([5, 2, 4, 3, 1]);
    ///
    /// list.sort();
    ///
    /// assert_eq!(Vec::from_iter(list), vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        merge_sort(self, |a, b| a.lt(b));
    }

    /// Sort the list with a comparator function.
    ///
    /// This sort is stable (i.e., does not reorder equal elements).
    ///
    /// The comparator function must define a total ordering for the
    /// elements in the list. If the ordering is not total, the order
    /// of the elements is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    /// let mut v = List::from_iter([5, 4, 1, 3, 2]);
    /// v.sort_by(|a, b| a.cmp(b));
    /// assert_eq!(Vec::from_iter(v.iter().copied()), vec![1, 2, 3, 4, 5]);
    ///
    /// // reverse sorting
    /// v.sort_by(|a, b| b.cmp(a));
    /// assert_eq!(Vec::from_iter(v), vec![5, 4, 3, 2, 1]);
    /// ```
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        merge_sort(self, |a, b| compare(a, b) == Ordering::Less)
    }
}

pub(crate) fn merge_sort<T, F>(list: &mut List<T>, mut less: F)
where
    F: FnMut(&T, &T) -> bool,
{
    if list.is_empty() {
        return;
    }
    list.open().sort_by(&mut less);
}

impl<T> OpenList<'_, T> {
    pub(crate) fn sort_by<F>(&mut self, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        // SAFETY: the list is open, and its chain is detached from the ghost while
        // it is being sorted, so a panicking `less` leaves an empty (closable) list.
        unsafe {
            let head = self.list.chain_head();
            self.list.set_chain_head(None);
            let sorted = merge_sort_chain(head, less);
            self.list.set_chain_head(sorted);
        }
    }
}

/// Sort an open chain, returning its new head.
unsafe fn merge_sort_chain<T, F>(head: Link<T>, less: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let first = match head {
        Some(first) if chain_next(first).is_some() => first,
        _ => return head,
    };

    // `fast` runs two nodes per step of `slow`, so `slow` stops at the back of
    // the first half.
    let mut slow = first;
    let mut fast = chain_next(first);
    while let Some(node) = fast {
        fast = match chain_next(node) {
            Some(next) => chain_next(next),
            None => break,
        };
        if let Some(next) = chain_next(slow) {
            slow = next;
        }
    }
    let mid = chain_next(slow);
    set_chain_next(slow, None);

    let left = merge_sort_chain(Some(first), less);
    let right = merge_sort_chain(mid, less);
    merge_chains(left, right, less)
}
