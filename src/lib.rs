//! This crate provides a queue of owned strings built on a doubly-linked list
//! with owned nodes, implemented as a cyclic list around a ghost node.
//!
//! The [`Queue`] inserts and removes strings at both ends in constant time, and
//! rewrites itself in place: deleting the middle element or runs of duplicates,
//! swapping pairs, reversing (whole or in groups of *k*), filtering down to a
//! monotonic sequence, and merge sorting. Several sorted queues held by a
//! [`QueueChain`] can be merged into one.
//!
//! Here is a quick example showing how the queue works.
//!
//! ```
//! use cyclic_queue::Queue;
//!
//! let mut queue = Queue::from_values(["pear", "fig", "fig", "apple", "kiwi"]).unwrap();
//!
//! assert_eq!(queue.delete_dup(), 2); // both "fig"s are gone
//! queue.sort(false);
//! assert_eq!(Vec::from_iter(queue.iter()), vec!["apple", "kiwi", "pear"]);
//!
//! let mut buf = [0u8; 4];
//! let tail = queue.remove_tail(Some(&mut buf)).unwrap();
//! assert_eq!(tail.value(), "pear");
//! assert_eq!(&buf, b"pea\0"); // truncated, always NUL-terminated
//! ```
//!
//! # Memory Layout
//!
//! The memory layout of the underlying [`List`] is like the following graph:
//! ```text
//!          ┌─────────────────────────────────────────────────────────────────────┐
//!          ↓                                                     (Ghost) Node N  │
//!    ╔═══════════╗           ╔═══════════╗                        ┌───────────┐  │
//!    ║   next    ║ ────────→ ║   next    ║ ────────→ ┄┄ ────────→ │   next    │ ─┘
//!    ╟───────────╢           ╟───────────╢     Node 2, 3, ...     ├───────────┤
//! ┌─ ║   prev    ║ ←──────── ║   prev    ║ ←──────── ┄┄ ←──────── │   prev    │
//! │  ╟───────────╢           ╟───────────╢                        ├───────────┤
//! │  ║ payload T ║           ║ payload T ║                        ┊ (unused)  ┊
//! │  ╚═══════════╝           ╚═══════════╝                        └╌╌╌╌╌╌╌╌╌╌╌┘
//! │      Node 0                  Node 1                               ↑   ↑
//! └───────────────────────────────────────────────────────────────────┘   │
//! ╔═══════════╗                                                           │
//! ║   ghost   ║ ──────────────────────────────────────────────────────────┘
//! ╟───────────╢
//! ║   (len)   ║
//! ╚═══════════╝
//!     List
//! ```
//! The `List` contains:
//! - a pointer `ghost` that points to the ghost node;
//! - a length field `len` indicating the length of the list. It can be disabled by
//!   disabling the `length` feature in your `Cargo.toml`, which makes
//!   [`List::len`] and [`Queue::size`] walk the ring instead:
//! ```text
//! [dependencies]
//! cyclic_queue = { default-features = false }
//! ```
//!
//! Each node of the list `List<T>` is allocated on heap, which contains:
//! - the `next` pointer that points to the next element (or the ghost node if it
//!   is the last element in the list);
//! - the `prev` pointer that points to the previous element (or the ghost node if
//!   it is the first element in the list);
//! - the actual payload `T`, which is left uninitialized in the ghost node.
//!
//! Initially, there is a ghost node in an empty list, of which the `next` and `prev`
//! pointer point to itself.
//!
//! # Iteration
//!
//! Iterating over a list is by the [`Iter`] and [`IterMut`] iterators. These are
//! double-ended iterators and iterate the list like an array (fused and non-cyclic).
//!
//! ```
//! use cyclic_queue::List;
//! use std::iter::FromIterator;
//!
//! let mut list = List::from_iter([1, 2, 3]);
//! let mut iter = list.iter();
//! assert_eq!(iter.next(), Some(&1));
//! assert_eq!(iter.next_back(), Some(&3));
//! assert_eq!(iter.next(), Some(&2));
//! assert_eq!(iter.next(), None);
//! assert_eq!(iter.next(), None); // Fused and non-cyclic
//!
//! list.iter_mut().for_each(|item| *item *= 2);
//! assert_eq!(Vec::from_iter(list), vec![2, 4, 6]);
//! ```
//!
//! # Algorithms
//!
//! Every rewrite relinks existing nodes and never allocates. Elements a rewrite
//! drops from a [`Queue`] are passed to its [`ReleaseHook`].
//!
//! Sorting cuts the ring open into a singly-linked chain, merge sorts the chain
//! and repairs all `prev` links in one final pass. Merging a [`QueueChain`]
//! folds its sorted queues pairwise from both ends of the chain into the front
//! queue.
//!
//! ```
//! use cyclic_queue::{Queue, QueueChain};
//!
//! let mut chain = QueueChain::new();
//! for values in [["1", "4", "7"], ["2", "5", "8"], ["3", "6", "9"]] {
//!     chain.push(Queue::from_values(values).unwrap());
//! }
//! assert_eq!(chain.merge(false), Ok(9));
//!
//! let merged = chain.front().and_then(|context| context.queue()).unwrap();
//! assert_eq!(merged.iter().collect::<String>(), "123456789");
//! ```

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use list::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use list::List;
#[doc(inline)]
pub use queue::{Element, Queue, QueueChain, QueueContext, ReleaseHook};

pub mod error;
pub mod list;
pub mod queue;

#[cfg(test)]
mod test_alloc;
