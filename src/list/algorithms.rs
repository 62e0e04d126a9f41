use crate::list::{connect, element_of, next_of, prev_of, List, Node};
use std::ptr::NonNull;

mod merge;
mod sort;

pub(crate) use merge::ListHandle;

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other)
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T> List<T> {
    /// Removes the middle element and returns it, or `None` if the list is empty.
    ///
    /// The middle element is found by a fast/slow walk and is the element at
    /// index `len / 2`, so for an even length it is the later of the two
    /// middle elements.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3, 4]);
    /// assert_eq!(list.remove_middle(), Some(3));
    /// assert_eq!(list.remove_middle(), Some(2));
    /// assert_eq!(Vec::from_iter(list), vec![1, 4]);
    /// ```
    pub fn remove_middle(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let ghost = self.ghost_node();
        let (mut slow, mut fast) = (self.front_node(), self.front_node());
        // SAFETY: both walkers only follow `next` links of this ring, and `fast`
        // stops before passing through the ghost node, so `slow` stays on a data node.
        unsafe {
            while fast != ghost && next_of(fast) != ghost {
                fast = next_of(next_of(fast));
                slow = next_of(slow);
            }
            Some(self.detach_node(slow).into_element())
        }
    }

    /// Removes every maximal run of two or more adjacent elements that are equal
    /// according to `same`, including the first element of the run. Each removed
    /// element is passed to `release`. Returns the number of removed elements.
    ///
    /// Equal elements that are not adjacent are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter(['a', 'b', 'b', 'c', 'c', 'c', 'd', 'a']);
    /// let mut removed = Vec::new();
    /// assert_eq!(list.purge_duplicates_by(|a, b| a == b, |x| removed.push(x)), 5);
    /// assert_eq!(Vec::from_iter(list), vec!['a', 'd', 'a']);
    /// assert_eq!(removed, vec!['b', 'b', 'c', 'c', 'c']);
    /// ```
    pub fn purge_duplicates_by<F, R>(&mut self, mut same: F, mut release: R) -> usize
    where
        F: FnMut(&T, &T) -> bool,
        R: FnMut(T),
    {
        let ghost = self.ghost_node();
        let mut node = self.front_node();
        let mut in_run = false;
        let mut removed = 0;
        // SAFETY: `next` is read before `node` is detached, and only data nodes
        // are detached.
        unsafe {
            while node != ghost {
                let next = next_of(node);
                let duplicated = next != ghost && same(element_of(node), element_of(next));
                if duplicated || in_run {
                    release(self.detach_node(node).into_element());
                    removed += 1;
                }
                in_run = duplicated;
                node = next;
            }
        }
        removed
    }

    /// Swaps every two adjacent elements: the 1st with the 2nd, the 3rd with the
    /// 4th, and so on. A trailing element without a partner stays in place.
    ///
    /// Only links are rewritten; elements are not moved in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3, 4, 5]);
    /// list.swap_pairs();
    /// assert_eq!(Vec::from_iter(list), vec![2, 1, 4, 3, 5]);
    /// ```
    pub fn swap_pairs(&mut self) {
        let ghost = self.ghost_node();
        let mut before = ghost;
        // SAFETY: `first` and `second` are checked to be data nodes of this list.
        unsafe {
            loop {
                let first = next_of(before);
                if first == ghost {
                    break;
                }
                let second = next_of(first);
                if second == ghost {
                    break;
                }
                move_node(second, first);
                before = first;
            }
        }
    }

    /// Reverses the list in place, by moving every node after the first one
    /// to the front.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3]);
    /// list.reverse();
    /// assert_eq!(Vec::from_iter(list), vec![3, 2, 1]);
    /// ```
    pub fn reverse(&mut self) {
        let ghost = self.ghost_node();
        // SAFETY: `node` is a data node other than the current front node, so
        // moving it in front of the front node keeps the ring well-formed.
        unsafe {
            let mut node = next_of(self.front_node());
            while node != ghost {
                let next = next_of(node);
                move_node(node, self.front_node());
                node = next;
            }
        }
    }

    /// Reverses every consecutive group of `k` elements from the front. A last
    /// group with fewer than `k` elements is left as it is.
    ///
    /// `k <= 1` or `k > len` leaves the list unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([1, 2, 3, 4, 5]);
    /// list.reverse_groups(3);
    /// assert_eq!(Vec::from_iter(list), vec![3, 2, 1, 4, 5]);
    /// ```
    pub fn reverse_groups(&mut self, k: usize) {
        if k <= 1 {
            return;
        }
        let mut remaining = self.len();
        let mut before = self.ghost_node();
        // SAFETY: at least `k` data nodes follow `before`, and `first` becomes the
        // back of its group, so `first.next` is always a data node of the group
        // while it is being reversed.
        unsafe {
            while remaining >= k {
                let first = next_of(before);
                for _ in 1..k {
                    move_node(next_of(first), next_of(before));
                }
                before = first;
                remaining -= k;
            }
        }
    }

    /// Removes every element that is outranked by some element to its right,
    /// passing each removed element to `release`. Returns the number of kept
    /// elements.
    ///
    /// `outranks(right, element)` decides whether `right` outranks `element`.
    /// With `|right, x| right < x` only the running suffix minima are kept, and
    /// with `|right, x| right > x` only the running suffix maxima are kept.
    ///
    /// The list is scanned once from the back, comparing each element with the
    /// last element kept so far, which is the extremum of everything to its right.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    /// use std::iter::FromIterator;
    ///
    /// let mut list = List::from_iter([5, 3, 4, 1, 2]);
    /// assert_eq!(list.retain_monotonic_by(|right, x| right > x, drop), 3);
    /// assert_eq!(Vec::from_iter(list), vec![5, 4, 2]);
    /// ```
    pub fn retain_monotonic_by<F, R>(&mut self, mut outranks: F, mut release: R) -> usize
    where
        F: FnMut(&T, &T) -> bool,
        R: FnMut(T),
    {
        let ghost = self.ghost_node();
        let mut extremum = self.back_node();
        if extremum == ghost {
            return 0;
        }
        let mut kept = 1;
        // SAFETY: `prev` is read before `node` is detached, `extremum` is always a
        // kept data node, and the walk stops at the ghost node.
        unsafe {
            let mut node = prev_of(extremum);
            while node != ghost {
                let prev = prev_of(node);
                if outranks(element_of(extremum), element_of(node)) {
                    release(self.detach_node(node).into_element());
                } else {
                    extremum = node;
                    kept += 1;
                }
                node = prev;
            }
        }
        kept
    }
}

/// Move the node `from` to the position right before `to`.
///
/// It is unsafe because both nodes must belong to the same list, and `from`
/// must not be `to`.
unsafe fn move_node<T>(from: NonNull<Node<T>>, to: NonNull<Node<T>>) {
    move_nodes(from, from, to);
}

unsafe fn move_nodes<T>(
    from_front: NonNull<Node<T>>,
    from_back: NonNull<Node<T>>,
    to: NonNull<Node<T>>,
) {
    connect(prev_of(from_front), next_of(from_back));
    connect(prev_of(to), from_front);
    connect(from_back, to);
}
