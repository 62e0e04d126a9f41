use crate::error::{Error, Result};
use crate::list::{element_mut, next_of, prev_of, List};

/// An element of a chain of lists that refers to one list, or to none.
///
/// Implementations must return the same answer every time for a given handle,
/// since a merge opens and later closes every list it reaches through them.
pub(crate) trait ListHandle {
    type Item;

    fn list_mut(&mut self) -> Option<&mut List<Self::Item>>;
}

impl<T> ListHandle for List<T> {
    type Item = T;

    fn list_mut(&mut self) -> Option<&mut List<T>> {
        Some(self)
    }
}

impl<H: ListHandle> List<H> {
    /// Merge all the lists referred to by the handles of this list into the one
    /// referred to by the front handle, and return that handle.
    ///
    /// Every referred list must already be sorted by `less`. The lists are
    /// merged pairwise from both ends of this list towards its middle, round by
    /// round, until the front list holds everything. The other lists are left
    /// empty.
    ///
    /// Returns `Ok(None)` without touching anything if there are fewer than two
    /// handles, and [`Error::NullHandle`] if any handle refers to no list.
    pub(crate) fn merge_handles_by<F>(&mut self, mut less: F) -> Result<Option<&mut H>>
    where
        F: FnMut(&H::Item, &H::Item) -> bool,
    {
        let count = self.len();
        if count < 2 {
            return Ok(None);
        }
        if self.iter_mut().any(|handle| handle.list_mut().is_none()) {
            return Err(Error::NullHandle);
        }
        tracing::trace!(lists = count, "merging sorted lists");
        OpenHandles::open_all(self).fold(count, &mut less);
        Ok(self.front_mut())
    }
}

/// Every list referred to by a chain of handles, opened. The lists are closed
/// again when the guard is dropped.
struct OpenHandles<'a, H: ListHandle> {
    chain: &'a mut List<H>,
}

impl<'a, H: ListHandle> OpenHandles<'a, H> {
    fn open_all(chain: &'a mut List<H>) -> Self {
        for handle in chain.iter_mut() {
            if let Some(list) = handle.list_mut() {
                // SAFETY: each list is reached once, and closed by `Drop`.
                unsafe { list.open_ring() };
            }
        }
        Self { chain }
    }

    /// Fold the open lists into the front one.
    ///
    /// Each round pairs the handle nearest the front with the handle nearest
    /// the back and merges the back one's chain into the front one's, moving both
    /// inwards until they meet. The front pointer restarts every round while the
    /// back pointer keeps its position, so after `ceil(count / 2)` rounds only the
    /// front list is left non-empty.
    fn fold<F>(&mut self, count: usize, less: &mut F)
    where
        F: FnMut(&H::Item, &H::Item) -> bool,
    {
        let mut tail = self.chain.back_node();
        for round in 0..(count + 1) / 2 {
            let mut head = self.chain.front_node();
            // SAFETY: `head` and `tail` are distinct data nodes of the chain inside
            // the loop, so the two handles are borrowed mutably without aliasing.
            unsafe {
                while head != tail && prev_of(head) != tail {
                    let (dst, src) = (element_mut(head), element_mut(tail));
                    if let (Some(dst), Some(src)) = (dst.list_mut(), src.list_mut()) {
                        dst.absorb_chain(src, less);
                    }
                    head = next_of(head);
                    tail = prev_of(tail);
                }
            }
            tracing::trace!(round, "merge round finished");
        }
    }
}

impl<H: ListHandle> Drop for OpenHandles<'_, H> {
    fn drop(&mut self) {
        for handle in self.chain.iter_mut() {
            if let Some(list) = handle.list_mut() {
                // SAFETY: every list was opened by `open_all`.
                unsafe { list.close_ring() };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::list::{List, ListHandle};
    use std::iter::FromIterator;
    use std::panic::{self, AssertUnwindSafe};

    fn chain_of<const N: usize>(lists: [Vec<i32>; N]) -> List<List<i32>> {
        List::from_iter(lists.into_iter().map(List::from_iter))
    }

    fn contents(chain: &List<List<i32>>) -> Vec<Vec<i32>> {
        Vec::from_iter(chain.iter().map(|list| Vec::from_iter(list.iter().copied())))
    }

    #[test]
    fn merge_three_lists() {
        let mut chain = chain_of([vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]);
        let merged = chain.merge_handles_by(|a, b| a < b).unwrap().unwrap();
        assert_eq!(merged.len(), 9);
        assert_eq!(
            Vec::from_iter(merged.iter().rev().copied()),
            vec![9, 8, 7, 6, 5, 4, 3, 2, 1]
        );
        let expected: Vec<Vec<i32>> = vec![(1..=9).collect(), vec![], vec![]];
        assert_eq!(contents(&chain), expected);
    }

    #[test]
    fn merge_many_lists() {
        for count in 2..10 {
            let lists = (0..count).map(|i| Vec::from_iter((0..5).map(|x| x * count + i)));
            let mut chain = List::from_iter(lists.map(List::from_iter));
            let merged = chain.merge_handles_by(|a, b| a < b).unwrap().unwrap();
            assert_eq!(Vec::from_iter(merged.iter().copied()), Vec::from_iter(0..5 * count));
            assert_eq!(merged.len(), (5 * count) as usize);
            assert!(chain.iter().skip(1).all(|list| list.is_empty()));
        }
    }

    #[test]
    fn merge_with_empty_lists() {
        let mut chain = chain_of([vec![], vec![1, 3], vec![], vec![2]]);
        let merged = chain.merge_handles_by(|a, b| a < b).unwrap().unwrap();
        assert_eq!(Vec::from_iter(merged.iter().copied()), vec![1, 2, 3]);
    }

    #[test]
    fn merge_needs_two_lists() {
        let mut chain = chain_of([vec![2, 1]]);
        assert!(chain.merge_handles_by(|a, b| a < b).unwrap().is_none());
        assert_eq!(contents(&chain), vec![vec![2, 1]]);

        let mut chain = List::<List<i32>>::new();
        assert!(chain.merge_handles_by(|a, b| a < b).unwrap().is_none());
    }

    #[test]
    fn merge_null_handle() {
        struct Handle(Option<List<i32>>);
        impl ListHandle for Handle {
            type Item = i32;
            fn list_mut(&mut self) -> Option<&mut List<i32>> {
                self.0.as_mut()
            }
        }
        let mut chain = List::new();
        chain.push_back(Handle(Some(List::from_iter([1, 2]))));
        chain.push_back(Handle(None));
        assert_eq!(
            chain.merge_handles_by(|a, b| a < b).err(),
            Some(Error::NullHandle)
        );
        let first = chain.front().and_then(|handle| handle.0.as_ref());
        assert_eq!(first.map(|list| list.len()), Some(2));
    }

    // The two chains being merged are detached when the comparator panics, so
    // their nodes are leaked.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn merge_panic_leaves_consistent_lists() {
        let mut chain = chain_of([vec![1, 4], vec![2, 5, 8], vec![3, 6]]);
        let merged = panic::catch_unwind(AssertUnwindSafe(|| {
            chain.merge_handles_by(|_, _| panic!("comparator gave up")).map(|_| ())
        }));
        assert!(merged.is_err());
        for list in chain.iter() {
            assert_eq!(list.len(), list.iter().count());
            assert_eq!(list.len(), list.iter().rev().count());
        }
        assert_eq!(contents(&chain), vec![vec![], vec![2, 5, 8], vec![]]);

        chain.front_mut().unwrap().push_back(0);
        let merged = chain.merge_handles_by(|a, b| a < b).unwrap().unwrap();
        assert_eq!(Vec::from_iter(merged.iter().copied()), vec![0, 2, 5, 8]);
        assert_eq!(merged.len(), 4);
    }
}
