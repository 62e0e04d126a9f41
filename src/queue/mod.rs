//! A queue of owned strings on top of [`List`].
//!
//! Every element removed by a rewrite, and every element left in the queue
//! when it is freed, is handed to the queue's [`ReleaseHook`] exactly once.
//! Elements taken out with [`Queue::remove_head`] or [`Queue::remove_tail`]
//! belong to the caller, who may drop them or pass them back to
//! [`Queue::release`].

use crate::error::{Error, Result};
use crate::list::List;
use std::fmt;

mod context;

pub use context::{QueueChain, QueueContext};

/// The function a [`Queue`] calls with each element it destroys.
pub type ReleaseHook = Box<dyn FnMut(Element)>;

/// A single string payload of a [`Queue`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element {
    value: String,
}

impl Element {
    /// Copies `value` into a freshly allocated payload.
    ///
    /// Returns [`Error::AllocationFailure`] if the payload cannot be allocated.
    pub fn try_new(value: &str) -> Result<Self> {
        let mut owned = String::new();
        owned
            .try_reserve_exact(value.len())
            .map_err(|_| Error::AllocationFailure { size: value.len() })?;
        owned.push_str(value);
        Ok(Self { value: owned })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Copies the payload into `buf` as a NUL-terminated byte string and
    /// returns the number of payload bytes copied.
    ///
    /// At most `buf.len() - 1` bytes are copied, so a longer payload is
    /// silently truncated. The rest of `buf` is filled with NUL bytes. Nothing
    /// is written into an empty buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Element;
    ///
    /// let element = Element::try_new("queue").unwrap();
    /// let mut buf = [0xff; 4];
    /// assert_eq!(element.copy_to(&mut buf), 3);
    /// assert_eq!(&buf, b"que\0");
    /// ```
    pub fn copy_to(&self, buf: &mut [u8]) -> usize {
        let Some(room) = buf.len().checked_sub(1) else {
            return 0;
        };
        let bytes = self.value.as_bytes();
        let copied = bytes.len().min(room);
        buf[..copied].copy_from_slice(&bytes[..copied]);
        buf[copied..].fill(0);
        copied
    }
}

impl AsRef<str> for Element {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// An ordered queue of strings.
///
/// # Examples
///
/// ```
/// use cyclic_queue::Queue;
///
/// let mut queue = Queue::new().unwrap();
/// queue.insert_tail("b").unwrap();
/// queue.insert_tail("c").unwrap();
/// queue.insert_head("a").unwrap();
/// assert_eq!(queue.size(), 3);
///
/// let mut buf = [0u8; 8];
/// let head = queue.remove_head(Some(&mut buf)).unwrap();
/// assert_eq!(head.value(), "a");
/// assert_eq!(&buf[..2], b"a\0");
/// assert_eq!(Vec::from_iter(queue.iter()), vec!["b", "c"]);
/// ```
pub struct Queue {
    list: List<Element>,
    release: ReleaseHook,
}

impl Queue {
    /// Creates an empty queue whose release hook just drops elements.
    pub fn new() -> Result<Self> {
        Self::with_release(drop)
    }

    /// Creates an empty queue that passes every element it destroys to
    /// `release`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let released = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&released);
    /// let mut queue = Queue::with_release(move |_| counter.set(counter.get() + 1)).unwrap();
    /// queue.insert_tail("x").unwrap();
    /// queue.insert_tail("x").unwrap();
    /// queue.insert_tail("y").unwrap();
    ///
    /// assert_eq!(queue.delete_dup(), 2);
    /// assert_eq!(released.get(), 2);
    /// queue.free();
    /// assert_eq!(released.get(), 3);
    /// ```
    pub fn with_release<R>(release: R) -> Result<Self>
    where
        R: FnMut(Element) + 'static,
    {
        Ok(Self {
            list: List::try_new()?,
            release: Box::new(release),
        })
    }

    /// Creates a queue holding `values` in order.
    pub fn from_values<I>(values: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut queue = Self::new()?;
        for value in values {
            queue.insert_tail(value.as_ref())?;
        }
        Ok(queue)
    }

    /// Releases every element and then the queue itself.
    pub fn free(self) {}

    /// Passes an element previously removed from this queue to its release hook.
    pub fn release(&mut self, element: Element) {
        (self.release)(element)
    }

    /// Inserts a copy of `value` at the head of the queue.
    ///
    /// On allocation failure the queue is left untouched.
    pub fn insert_head(&mut self, value: &str) -> Result<()> {
        let inserted = Element::try_new(value).and_then(|element| self.list.try_push_front(element));
        if let Err(err) = &inserted {
            tracing::debug!(%err, "failed to insert at the head");
        }
        inserted
    }

    /// Inserts a copy of `value` at the tail of the queue.
    ///
    /// On allocation failure the queue is left untouched.
    pub fn insert_tail(&mut self, value: &str) -> Result<()> {
        let inserted = Element::try_new(value).and_then(|element| self.list.try_push_back(element));
        if let Err(err) = &inserted {
            tracing::debug!(%err, "failed to insert at the tail");
        }
        inserted
    }

    /// Unlinks the head element and hands it to the caller, or returns `None`
    /// if the queue is empty.
    ///
    /// If `buf` is given, the payload is copied into it as described in
    /// [`Element::copy_to`].
    pub fn remove_head(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        let element = self.list.pop_front()?;
        if let Some(buf) = buf {
            element.copy_to(buf);
        }
        Some(element)
    }

    /// Unlinks the tail element and hands it to the caller, or returns `None`
    /// if the queue is empty.
    ///
    /// If `buf` is given, the payload is copied into it as described in
    /// [`Element::copy_to`].
    pub fn remove_tail(&mut self, buf: Option<&mut [u8]>) -> Option<Element> {
        let element = self.list.pop_back()?;
        if let Some(buf) = buf {
            element.copy_to(buf);
        }
        Some(element)
    }

    /// Returns the number of elements in the queue.
    pub fn size(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterates over the payloads from head to tail.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.list.iter().map(Element::value)
    }

    /// Deletes the middle element, the one at index `size / 2`.
    ///
    /// Returns [`Error::EmptyQueue`] if there is nothing to delete.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::from_values(["a", "b", "c", "d"]).unwrap();
    /// queue.delete_mid().unwrap();
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "b", "d"]);
    /// ```
    pub fn delete_mid(&mut self) -> Result<()> {
        let middle = self.list.remove_middle().ok_or(Error::EmptyQueue)?;
        (self.release)(middle);
        Ok(())
    }

    /// Deletes every run of adjacent equal elements, keeping none of them.
    /// Returns the number of deleted elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::from_values(["a", "b", "b", "c", "c", "c", "d"]).unwrap();
    /// assert_eq!(queue.delete_dup(), 5);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["a", "d"]);
    /// ```
    pub fn delete_dup(&mut self) -> usize {
        let removed = self.list.purge_duplicates_by(|a, b| a == b, &mut self.release);
        tracing::trace!(removed, "deleted duplicates");
        removed
    }

    /// Swaps every two adjacent elements.
    pub fn swap(&mut self) {
        self.list.swap_pairs();
    }

    pub fn reverse(&mut self) {
        self.list.reverse();
    }

    /// Reverses every full group of `k` elements, starting from the head.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::from_values(["1", "2", "3", "4", "5"]).unwrap();
    /// queue.reverse_k(2);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["2", "1", "4", "3", "5"]);
    /// ```
    pub fn reverse_k(&mut self, k: usize) {
        self.list.reverse_groups(k);
    }

    /// Sorts the queue by byte-lexicographic order of the payloads. The sort is
    /// stable.
    pub fn sort(&mut self, descending: bool) {
        tracing::trace!(size = self.size(), descending, "sorting queue");
        self.list.sort();
        if descending {
            self.list.reverse();
        }
    }

    /// Deletes every element that has a strictly smaller element anywhere to its
    /// right, and returns the resulting size.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::Queue;
    ///
    /// let mut queue = Queue::from_values(["5", "3", "4", "1", "2"]).unwrap();
    /// assert_eq!(queue.ascend(), 2);
    /// assert_eq!(Vec::from_iter(queue.iter()), vec!["1", "2"]);
    /// ```
    pub fn ascend(&mut self) -> usize {
        let kept = self
            .list
            .retain_monotonic_by(|right, x| right < x, &mut self.release);
        tracing::trace!(kept, "kept ascending elements");
        kept
    }

    /// Deletes every element that has a strictly greater element anywhere to its
    /// right, and returns the resulting size.
    pub fn descend(&mut self) -> usize {
        let kept = self
            .list
            .retain_monotonic_by(|right, x| right > x, &mut self.release);
        tracing::trace!(kept, "kept descending elements");
        kept
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        while let Some(element) = self.list.pop_front() {
            (self.release)(element);
        }
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Queue};
    use crate::error::Error;
    use crate::list::Node;
    use crate::test_alloc::fail_allocation;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn contents(queue: &Queue) -> Vec<&str> {
        queue.iter().collect()
    }

    fn tracked() -> (Queue, Rc<RefCell<Vec<String>>>) {
        let released = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&released);
        let queue = Queue::with_release(move |element| sink.borrow_mut().push(element.into_value()))
            .unwrap();
        (queue, released)
    }

    #[test]
    fn queue_fifo_and_lifo() {
        let values = ["alpha", "beta", "gamma", "delta"];

        let mut queue = Queue::new().unwrap();
        values.iter().for_each(|v| queue.insert_tail(v).unwrap());
        for v in values {
            assert_eq!(queue.remove_head(None).map(Element::into_value).as_deref(), Some(v));
        }
        assert!(queue.remove_head(None).is_none());

        values.iter().for_each(|v| queue.insert_head(v).unwrap());
        for v in values.iter().rev() {
            assert_eq!(queue.remove_head(None).unwrap().value(), *v);
        }
        assert!(queue.remove_tail(None).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_size() {
        let mut queue = Queue::new().unwrap();
        assert_eq!(queue.size(), 0);
        queue.insert_head("a").unwrap();
        queue.insert_tail("b").unwrap();
        queue.insert_tail("c").unwrap();
        assert_eq!(queue.size(), 3);
        queue.remove_tail(None).unwrap();
        assert_eq!(queue.size(), 2);
        queue.delete_mid().unwrap();
        assert_eq!(queue.size(), 1);
        assert_eq!(contents(&queue), vec!["a"]);
    }

    #[test]
    fn queue_remove_into_buffer() {
        let mut queue = Queue::from_values(["hello", "hi", "", "world"]).unwrap();

        let mut buf = [0xff_u8; 4];
        let removed = queue.remove_head(Some(&mut buf)).unwrap();
        assert_eq!(&buf, b"hel\0");
        assert_eq!(removed.value(), "hello");

        let mut buf = [0xff_u8; 6];
        queue.remove_head(Some(&mut buf)).unwrap();
        assert_eq!(&buf, b"hi\0\0\0\0");

        let mut buf = [0xff_u8; 2];
        queue.remove_head(Some(&mut buf)).unwrap();
        assert_eq!(&buf, b"\0\0");

        let mut buf = [0xff_u8; 0];
        assert_eq!(queue.remove_tail(Some(&mut buf)).unwrap().value(), "world");
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_delete_mid() {
        let mut queue = Queue::from_values(["a", "b", "c", "d", "e"]).unwrap();
        queue.delete_mid().unwrap();
        assert_eq!(contents(&queue), vec!["a", "b", "d", "e"]);
        queue.delete_mid().unwrap();
        assert_eq!(contents(&queue), vec!["a", "b", "e"]);

        let mut queue = Queue::new().unwrap();
        assert_eq!(queue.delete_mid(), Err(Error::EmptyQueue));
        queue.insert_tail("only").unwrap();
        queue.delete_mid().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_delete_dup() {
        let (mut queue, released) = tracked();
        for v in ["a", "b", "b", "c", "c", "c", "d"] {
            queue.insert_tail(v).unwrap();
        }
        assert_eq!(queue.delete_dup(), 5);
        assert_eq!(contents(&queue), vec!["a", "d"]);
        assert_eq!(*released.borrow(), vec!["b", "b", "c", "c", "c"]);

        let mut queue = Queue::from_values(["x", "y", "x"]).unwrap();
        assert_eq!(queue.delete_dup(), 0);
        assert_eq!(contents(&queue), vec!["x", "y", "x"]);
    }

    #[test]
    fn queue_swap() {
        let mut queue = Queue::from_values(["1", "2", "3", "4", "5"]).unwrap();
        queue.swap();
        assert_eq!(contents(&queue), vec!["2", "1", "4", "3", "5"]);

        let mut queue = Queue::from_values(["1"]).unwrap();
        queue.swap();
        assert_eq!(contents(&queue), vec!["1"]);
    }

    #[test]
    fn queue_reverse() {
        let values = ["1", "2", "3", "4", "5"];
        let mut queue = Queue::from_values(values).unwrap();
        queue.reverse();
        assert_eq!(contents(&queue), vec!["5", "4", "3", "2", "1"]);
        assert_eq!(queue.iter().rev().collect::<Vec<_>>(), values);
        queue.reverse();
        assert_eq!(contents(&queue), values);
    }

    #[test]
    fn queue_reverse_k() {
        let values = ["1", "2", "3", "4", "5"];
        let mut queue = Queue::from_values(values).unwrap();
        queue.reverse_k(2);
        assert_eq!(contents(&queue), vec!["2", "1", "4", "3", "5"]);

        let mut queue = Queue::from_values(values).unwrap();
        queue.reverse_k(3);
        assert_eq!(contents(&queue), vec!["3", "2", "1", "4", "5"]);

        for k in [0, 1, 6] {
            let mut queue = Queue::from_values(values).unwrap();
            queue.reverse_k(k);
            assert_eq!(contents(&queue), values);
        }
    }

    #[test]
    fn queue_ascend_descend() {
        let values = ["5", "3", "4", "1", "2"];

        let (mut queue, released) = tracked();
        values.iter().for_each(|v| queue.insert_tail(v).unwrap());
        assert_eq!(queue.ascend(), 2);
        assert_eq!(contents(&queue), vec!["1", "2"]);
        assert_eq!(released.borrow().len(), 3);

        let mut queue = Queue::from_values(values).unwrap();
        assert_eq!(queue.descend(), 3);
        assert_eq!(contents(&queue), vec!["5", "4", "2"]);

        let mut queue = Queue::new().unwrap();
        assert_eq!(queue.ascend(), 0);
        assert_eq!(queue.descend(), 0);
    }

    #[test]
    fn queue_sort() {
        let mut queue = Queue::from_values(["pear", "apple", "fig", "Apple", "apple", "b"]).unwrap();
        queue.sort(false);
        assert_eq!(contents(&queue), vec!["Apple", "apple", "apple", "b", "fig", "pear"]);
        queue.sort(false);
        assert_eq!(contents(&queue), vec!["Apple", "apple", "apple", "b", "fig", "pear"]);
        queue.sort(true);
        assert_eq!(contents(&queue), vec!["pear", "fig", "b", "apple", "apple", "Apple"]);

        let mut queue = Queue::new().unwrap();
        queue.sort(true);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_release_runs_once() {
        let (mut queue, released) = tracked();
        for v in ["a", "b", "c", "d"] {
            queue.insert_tail(v).unwrap();
        }
        let head = queue.remove_head(None).unwrap();
        queue.delete_mid().unwrap();
        assert_eq!(*released.borrow(), vec!["c"]);

        queue.release(head);
        assert_eq!(*released.borrow(), vec!["c", "a"]);

        queue.free();
        assert_eq!(*released.borrow(), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn queue_insert_allocation_failure() {
        let node_size = std::mem::size_of::<Node<Element>>();
        let (created, leaked) = fail_allocation(0, Queue::new);
        assert_eq!(created.err(), Some(Error::AllocationFailure { size: node_size }));
        assert_eq!(leaked, 0);

        let (mut queue, released) = tracked();
        queue.insert_tail("a").unwrap();
        queue.insert_tail("b").unwrap();
        // Lazily initialized state on the failure path is set up here, so it
        // does not show up as a leak below.
        let _ = fail_allocation(0, || queue.insert_head("warm"));
        let _ = fail_allocation(0, || queue.insert_tail("warm"));

        // Skipping one allocation lets the payload through and fails the node.
        for (skip, size) in [(0, "payload".len()), (1, node_size)] {
            let (inserted, leaked) = fail_allocation(skip, || queue.insert_head("payload"));
            assert_eq!(inserted, Err(Error::AllocationFailure { size }));
            assert_eq!(leaked, 0);
            let (inserted, leaked) = fail_allocation(skip, || queue.insert_tail("payload"));
            assert_eq!(inserted, Err(Error::AllocationFailure { size }));
            assert_eq!(leaked, 0);

            assert_eq!(queue.size(), 2);
            assert_eq!(contents(&queue), vec!["a", "b"]);
            assert_eq!(queue.iter().rev().collect::<Vec<_>>(), vec!["b", "a"]);
        }
        assert!(released.borrow().is_empty());

        queue.insert_tail("c").unwrap();
        assert_eq!(contents(&queue), vec!["a", "b", "c"]);
    }

    #[test]
    fn queue_debug() {
        let queue = Queue::from_values(["a", "b"]).unwrap();
        assert_eq!(format!("{:?}", queue), r#"["a", "b"]"#);
    }
}

// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use super::Queue;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[derive(Clone, Debug)]
    enum Op {
        InsertHead(String),
        InsertTail(String),
        RemoveHead,
        RemoveTail,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            2 => "[a-z]{0,8}".prop_map(Op::InsertHead),
            2 => "[a-z]{0,8}".prop_map(Op::InsertTail),
            1 => Just(Op::RemoveHead),
            1 => Just(Op::RemoveTail),
        ]
    }

    fn values() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]{0,2}", 0..40)
    }

    fn contents(queue: &Queue) -> Vec<String> {
        queue.iter().map(String::from).collect()
    }

    /// The elements not outranked by anything to their right, by brute force.
    fn survivors(values: &[String], outranks: fn(&String, &String) -> bool) -> Vec<String> {
        (0..values.len())
            .filter(|&i| !values[i + 1..].iter().any(|right| outranks(right, &values[i])))
            .map(|i| values[i].clone())
            .collect()
    }

    proptest! {
        #[test]
        fn matches_deque(ops in prop::collection::vec(op(), 0..200)) {
            let mut queue = Queue::new().unwrap();
            let mut model = VecDeque::new();
            for op in ops {
                match op {
                    Op::InsertHead(v) => {
                        queue.insert_head(&v).unwrap();
                        model.push_front(v);
                    }
                    Op::InsertTail(v) => {
                        queue.insert_tail(&v).unwrap();
                        model.push_back(v);
                    }
                    Op::RemoveHead => {
                        let mut buf = [0u8; 16];
                        let removed = queue.remove_head(Some(&mut buf));
                        let expected = model.pop_front();
                        if let Some(expected) = &expected {
                            prop_assert_eq!(&buf[..expected.len()], expected.as_bytes());
                            prop_assert_eq!(buf[expected.len()], 0);
                        }
                        prop_assert_eq!(removed.map(|e| e.into_value()), expected);
                    }
                    Op::RemoveTail => {
                        let removed = queue.remove_tail(None);
                        prop_assert_eq!(removed.map(|e| e.into_value()), model.pop_back());
                    }
                }
                prop_assert_eq!(queue.size(), model.len());
            }
            prop_assert!(queue.iter().eq(model.iter().map(String::as_str)));
        }

        #[test]
        fn sort_matches_vec(values in values(), descending in any::<bool>()) {
            let mut queue = Queue::from_values(&values).unwrap();
            let mut model = values;
            model.sort();
            if descending {
                model.reverse();
            }
            queue.sort(descending);
            prop_assert_eq!(contents(&queue), model.clone());
            prop_assert!(queue.iter().rev().eq(model.iter().rev().map(String::as_str)));
        }

        #[test]
        fn delete_dup_matches_runs(values in values()) {
            let mut queue = Queue::from_values(&values).unwrap();
            let model: Vec<String> = values
                .iter()
                .enumerate()
                .filter(|&(i, v)| {
                    let before = i > 0 && values[i - 1] == *v;
                    let after = i + 1 < values.len() && values[i + 1] == *v;
                    !before && !after
                })
                .map(|(_, v)| v.clone())
                .collect();
            prop_assert_eq!(queue.delete_dup(), values.len() - model.len());
            prop_assert_eq!(contents(&queue), model);
        }

        #[test]
        fn ascend_descend_match_suffix_scan(values in values()) {
            let ascending = survivors(&values, |right, x| right < x);
            let descending = survivors(&values, |right, x| right > x);

            let mut queue = Queue::from_values(&values).unwrap();
            prop_assert_eq!(queue.ascend(), ascending.len());
            prop_assert_eq!(contents(&queue), ascending);

            let mut queue = Queue::from_values(&values).unwrap();
            prop_assert_eq!(queue.descend(), descending.len());
            prop_assert_eq!(contents(&queue), descending);
        }

        #[test]
        fn reverse_k_matches_chunks(values in values(), k in 0usize..8) {
            let mut queue = Queue::from_values(&values).unwrap();
            let mut model = values.clone();
            if k > 1 {
                model.chunks_exact_mut(k).for_each(|group| group.reverse());
            }
            queue.reverse_k(k);
            prop_assert_eq!(contents(&queue), model);
        }

        #[test]
        fn delete_mid_removes_half_index(values in values()) {
            let mut queue = Queue::from_values(&values).unwrap();
            let mut model = values;
            if model.is_empty() {
                prop_assert!(queue.delete_mid().is_err());
            } else {
                model.remove(model.len() / 2);
                queue.delete_mid().unwrap();
            }
            prop_assert_eq!(contents(&queue), model);
        }
    }
}
