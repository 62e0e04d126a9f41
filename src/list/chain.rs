//! Open chains: a list temporarily cut into a singly-linked run of nodes.
//!
//! Sorting and merging only need `next` links, so they cut the ring after its
//! back node and work on the chain hanging off the ghost node:
//! ```text
//!  ╔═══════╗     ┌──────┐     ┌──────┐            ┌──────┐
//!  ║ ghost ║ ──→ │ next │ ──→ │ next │ ──→ ┄┄ ──→ │ next │ ──→ (terminator)
//!  ╚═══════╝     └──────┘     └──────┘            └──────┘
//! ```
//! While a list is open, `prev` links (and `ghost.prev`) are stale and the
//! back node's `next` is a dangling terminator that is never dereferenced.
//! [`List::close_ring`] rebuilds every `prev` link, and the cached length, in a
//! single pass.
//!
//! An open list must never be observed through the public API, so opening is
//! always paired with a guard that closes the ring again on drop, even when a
//! comparator panics.

use crate::list::{connect, element_of, next_of, List, Node};
use std::ptr::NonNull;

pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// The `next` of the last node of an open chain. It never points to a live node.
#[inline]
fn terminator<T>() -> NonNull<Node<T>> {
    NonNull::dangling()
}

#[inline]
pub(crate) unsafe fn chain_next<T>(node: NonNull<Node<T>>) -> Link<T> {
    let next = next_of(node);
    if next == terminator() {
        None
    } else {
        Some(next)
    }
}

#[inline]
pub(crate) unsafe fn set_chain_next<T>(node: NonNull<Node<T>>, next: Link<T>) {
    (*node.as_ptr()).next = next.unwrap_or_else(terminator);
}

impl<T> List<T> {
    /// Cut the ring after its back node, leaving an open chain that starts at
    /// `ghost.next`.
    ///
    /// It is unsafe because the list is ill-formed until [`List::close_ring`] is
    /// called, and it must not be called on a list that is already open.
    pub(crate) unsafe fn open_ring(&mut self) {
        if !self.is_empty() {
            set_chain_next(self.back_node(), None);
        }
    }

    /// The first node of the open chain, or `None` if the list is empty.
    pub(crate) fn chain_head(&self) -> Link<T> {
        if self.is_empty() {
            None
        } else {
            Some(self.front_node())
        }
    }

    /// Hang `head` off the ghost node of an open list.
    pub(crate) unsafe fn set_chain_head(&mut self, head: Link<T>) {
        (*self.ghost.as_ptr()).next = head.unwrap_or(self.ghost);
    }

    /// Repair every `prev` link of an open list and close it back into a ring.
    ///
    /// The cached length is reset to the number of nodes walked, so it holds
    /// whatever the chain ended up with, including nothing at all after a
    /// comparator panicked with the chain detached.
    ///
    /// It is unsafe because the list must have been opened by [`List::open_ring`].
    pub(crate) unsafe fn close_ring(&mut self) {
        let ghost = self.ghost_node();
        let mut prev = ghost;
        let mut node = self.chain_head();
        let mut walked = 0_usize;
        while let Some(current) = node {
            node = chain_next(current);
            connect(prev, current);
            prev = current;
            walked += 1;
        }
        connect(prev, ghost);
        #[cfg(feature = "length")]
        {
            self.len = walked;
        }
        #[cfg(not(feature = "length"))]
        let _ = walked;
    }

    /// Merge the open chain of `other` into the open chain of `self`, leaving
    /// `other` empty.
    ///
    /// Both chains are detached from their ghosts before merging, so a panicking
    /// `less` can only leak nodes, never share them between two lists. Lengths
    /// are not touched here: [`List::close_ring`] recounts both lists, so after
    /// such a panic each of them reports the nodes it still owns.
    pub(crate) unsafe fn absorb_chain<F>(&mut self, other: &mut List<T>, less: &mut F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let (left, right) = (self.chain_head(), other.chain_head());
        self.set_chain_head(None);
        other.set_chain_head(None);
        self.set_chain_head(merge_chains(left, right, less));
    }

    /// Open the list, returning a guard that closes it again when dropped.
    pub(crate) fn open(&mut self) -> OpenList<'_, T> {
        // SAFETY: the list is closed here, and the guard closes it on drop.
        unsafe { self.open_ring() };
        OpenList { list: self }
    }
}

/// A list opened into a chain. The ring is closed when the guard is dropped.
pub(crate) struct OpenList<'a, T> {
    pub(crate) list: &'a mut List<T>,
}

impl<T> Drop for OpenList<'_, T> {
    fn drop(&mut self) {
        // SAFETY: `OpenList` is only created by `List::open`.
        unsafe { self.list.close_ring() }
    }
}

/// Merge two sorted chains into one, in a single pass.
///
/// The merge is stable: a node from `right` is taken only if it is strictly
/// less than the current node of `left`.
pub(crate) unsafe fn merge_chains<T, F>(mut left: Link<T>, mut right: Link<T>, less: &mut F) -> Link<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut head: Link<T> = None;
    let mut tail: Link<T> = None;
    while let (Some(l), Some(r)) = (left, right) {
        let taken = if less(element_of(r), element_of(l)) {
            right = chain_next(r);
            r
        } else {
            left = chain_next(l);
            l
        };
        match tail {
            Some(tail) => set_chain_next(tail, Some(taken)),
            None => head = Some(taken),
        }
        tail = Some(taken);
    }
    // At most one side is left over; it is already sorted and terminated.
    let rest = if left.is_some() { left } else { right };
    match tail {
        Some(tail) => set_chain_next(tail, rest),
        None => head = rest,
    }
    head
}
