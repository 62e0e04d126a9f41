use crate::list::{element_mut, element_of, next_of, prev_of, List, Node};
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ptr::NonNull;

/// The nodes `start..end` still to be yielded: `start` inclusive, `end` (at
/// first the ghost node) exclusive.
struct Span<T> {
    start: NonNull<Node<T>>,
    end: NonNull<Node<T>>,
    #[cfg(feature = "length")]
    len: usize,
}

// Manual impls: deriving would bound `T: Clone`.
impl<T> Clone for Span<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Span<T> {}

impl<T> Span<T> {
    fn of(list: &List<T>) -> Self {
        Self {
            start: list.front_node(),
            end: list.ghost_node(),
            #[cfg(feature = "length")]
            len: list.len(),
        }
    }

    /// Shrinks the span from the front and returns the node it gave up.
    fn take_front(&mut self) -> Option<NonNull<Node<T>>> {
        if self.start == self.end {
            return None;
        }
        let node = self.start;
        // SAFETY: the span is non-empty, so `start` is a live data node.
        self.start = unsafe { next_of(node) };
        #[cfg(feature = "length")]
        {
            self.len -= 1;
        }
        Some(node)
    }

    /// Shrinks the span from the back and returns the node it gave up.
    fn take_back(&mut self) -> Option<NonNull<Node<T>>> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: the span is non-empty, so `end.prev` is a live data node.
        self.end = unsafe { prev_of(self.end) };
        #[cfg(feature = "length")]
        {
            self.len -= 1;
        }
        Some(self.end)
    }

    #[cfg(feature = "length")]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }

    #[cfg(not(feature = "length"))]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.start == self.end {
            (0, Some(0))
        } else {
            (1, None)
        }
    }
}

/// A double-ended iterator over shared references to the elements of a [`List`].
///
/// The list stays borrowed for as long as the iterator lives:
///
/// ```compile_fail
/// use cyclic_queue::List;
/// use std::iter::FromIterator;
///
/// let mut list = List::from_iter([1, 2, 3]);
/// let mut iter = list.iter();
/// list.push_back(4);
/// iter.next();
/// ```
pub struct Iter<'a, T: 'a> {
    span: Span<T>,
    _marker: PhantomData<&'a List<T>>,
}

impl<'a, T: 'a> Iter<'a, T> {
    pub(crate) fn new(list: &'a List<T>) -> Self {
        Self {
            span: Span::of(list),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            span: self.span,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: fmt::Debug + 'a> fmt::Debug for Iter<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T: 'a> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        // SAFETY: every node of the span is a data node borrowed for `'a`.
        self.span.take_front().map(|node| unsafe { element_of(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.span.size_hint()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T: 'a> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        // SAFETY: as in `next`.
        self.span.take_back().map(|node| unsafe { element_of(node) })
    }
}

#[cfg(feature = "length")]
impl<'a, T: 'a> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: 'a> FusedIterator for Iter<'a, T> {}

/// A double-ended iterator over mutable references to the elements of a
/// [`List`]. The links of the list cannot be changed through it.
pub struct IterMut<'a, T: 'a> {
    span: Span<T>,
    _marker: PhantomData<&'a mut List<T>>,
}

impl<'a, T: 'a> IterMut<'a, T> {
    pub(crate) fn new(list: &'a mut List<T>) -> Self {
        Self {
            span: Span::of(list),
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        // SAFETY: the list is borrowed mutably for `'a`, and the span yields
        // each node once, so the references never alias.
        self.span.take_front().map(|node| unsafe { element_mut(node) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.span.size_hint()
    }

    fn last(mut self) -> Option<&'a mut T> {
        self.next_back()
    }
}

impl<'a, T: 'a> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        // SAFETY: as in `next`.
        self.span.take_back().map(|node| unsafe { element_mut(node) })
    }
}

#[cfg(feature = "length")]
impl<'a, T: 'a> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T: 'a> FusedIterator for IterMut<'a, T> {}

/// An owning iterator over the elements of a [`List`], popping them from
/// either end.
pub struct IntoIter<T> {
    list: List<T>,
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        Span::of(&self.list).size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

#[cfg(feature = "length")]
impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elt in iter {
            self.push_back(elt);
        }
    }
}

unsafe impl<T: Sync> Send for Iter<'_, T> {}

unsafe impl<T: Sync> Sync for Iter<'_, T> {}

unsafe impl<T: Send> Send for IterMut<'_, T> {}

unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::List;
    use std::iter::FromIterator;

    /// Walks `0..len` from both ends at once, taking `front` items from the
    /// front first, and checks every step against a slice.
    fn walk_both_ends(len: i32, front: usize) {
        let expected = Vec::from_iter(0..len);
        let mut list = List::from_iter(0..len);

        let mut iter = list.iter();
        let mut model = expected.iter();
        for _ in 0..front {
            assert_eq!(iter.next(), model.next());
        }
        while let Some(item) = model.next_back() {
            #[cfg(feature = "length")]
            assert_eq!(iter.len(), model.len() + 1);
            assert_eq!(iter.next_back(), Some(item));
        }
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);

        for (i, item) in list.iter_mut().rev().enumerate() {
            *item += 100 * i as i32;
        }
        let shifted = Vec::from_iter(expected.iter().rev().enumerate().map(|(i, x)| x + 100 * i as i32));
        assert_eq!(Vec::from_iter(list.iter().rev().copied()), shifted);
    }

    #[test]
    fn iter_from_both_ends() {
        for (len, front) in [(0, 0), (1, 0), (1, 1), (2, 1), (5, 2), (10, 0), (10, 7), (10, 10)] {
            walk_both_ends(len, front);
        }
    }

    #[test]
    fn iter_is_fused() {
        let list = List::from_iter(["x"]);
        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&"x"));
        for _ in 0..3 {
            assert_eq!(iter.next(), None);
            assert_eq!(iter.next_back(), None);
        }
        assert_eq!(format!("{:?}", list.iter()), r#"["x"]"#);
    }

    #[test]
    fn into_iter_pops_both_ends() {
        let mut iter = List::from_iter(["a", "b", "c"]).into_iter();
        #[cfg(feature = "length")]
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back(), Some("c"));
        assert_eq!(iter.next(), Some("a"));
        assert_eq!(iter.size_hint().0, 1);
        assert_eq!(iter.next(), Some("b"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.size_hint(), (0, Some(0)));
    }
}
