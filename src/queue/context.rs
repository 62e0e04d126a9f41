use crate::error::{Error, Result};
use crate::list::{List, ListHandle};
use crate::queue::{Element, Queue};

/// A handle in a [`QueueChain`], owning one queue or none.
#[derive(Debug)]
pub struct QueueContext {
    id: usize,
    queue: Option<Queue>,
}

impl QueueContext {
    /// The id the chain gave this context, counting from 0 in creation order.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> Option<&mut Queue> {
        self.queue.as_mut()
    }

    /// Takes the queue out, leaving a null handle behind.
    pub fn take_queue(&mut self) -> Option<Queue> {
        self.queue.take()
    }

    /// The size of the owned queue, or 0 for a null handle.
    pub fn size(&self) -> usize {
        self.queue.as_ref().map_or(0, Queue::size)
    }
}

impl ListHandle for QueueContext {
    type Item = Element;

    fn list_mut(&mut self) -> Option<&mut List<Element>> {
        self.queue.as_mut().map(|queue| &mut queue.list)
    }
}

/// A ring of [`QueueContext`]s whose queues can be merged into one.
///
/// # Examples
///
/// ```
/// use cyclic_queue::{Queue, QueueChain};
///
/// let mut chain = QueueChain::new();
/// chain.push(Queue::from_values(["a", "d"]).unwrap());
/// chain.push(Queue::from_values(["b", "e"]).unwrap());
/// chain.push(Queue::from_values(["c"]).unwrap());
///
/// assert_eq!(chain.merge(false), Ok(5));
/// let merged = chain.front().and_then(|context| context.queue()).unwrap();
/// assert_eq!(Vec::from_iter(merged.iter()), vec!["a", "b", "c", "d", "e"]);
/// ```
#[derive(Debug, Default)]
pub struct QueueChain {
    contexts: List<QueueContext>,
    next_id: usize,
}

impl QueueChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a context owning `queue` and returns its id.
    pub fn push(&mut self, queue: Queue) -> usize {
        self.push_context(Some(queue))
    }

    /// Appends a context that owns no queue and returns its id.
    pub fn push_null(&mut self) -> usize {
        self.push_context(None)
    }

    fn push_context(&mut self, queue: Option<Queue>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.contexts.push_back(QueueContext { id, queue });
        id
    }

    /// The number of contexts, null handles included.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn iter(&self) -> crate::Iter<'_, QueueContext> {
        self.contexts.iter()
    }

    pub fn front(&self) -> Option<&QueueContext> {
        self.contexts.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueueContext> {
        self.contexts.front_mut()
    }

    pub fn get(&self, id: usize) -> Option<&QueueContext> {
        self.contexts.iter().find(|context| context.id == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut QueueContext> {
        self.contexts.iter_mut().find(|context| context.id == id)
    }

    /// Merges every queue of the chain into the front one, and returns its size.
    ///
    /// Every queue must already be sorted ascending. The merged queue is
    /// ascending, or descending if `descending` is set, and all the other queues
    /// are left empty.
    ///
    /// Returns `Ok(0)` without touching anything if the chain has fewer than two
    /// contexts, and [`Error::NullHandle`] if any context owns no queue.
    pub fn merge(&mut self, descending: bool) -> Result<usize> {
        let front = match self.contexts.merge_handles_by(|a, b| a < b)? {
            Some(front) => front,
            None => return Ok(0),
        };
        let queue = front.queue.as_mut().ok_or(Error::NullHandle)?;
        if descending {
            queue.reverse();
        }
        tracing::trace!(id = front.id, size = queue.size(), "merged queues");
        Ok(queue.size())
    }
}
