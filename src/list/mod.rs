use std::alloc::{self, Layout};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::{IntoIter, Iter, IterMut};

pub mod iterator;

mod algorithms;
pub(crate) mod chain;

pub(crate) use algorithms::ListHandle;

/// The `List` is a doubly-linked list with owned nodes, implemented as a cyclic list
/// around a ghost (sentinel) node.
///
/// It allows inserting and removing elements at either end in constant time, and
/// relinking nodes anywhere without reallocating them.
///
/// The `List` contains:
/// - a pointer `ghost` that points to the ghost node;
/// - a length field `len` indicating the length of the list. It can be disabled by
///   disabling the `length` feature in your `Cargo.toml`:
/// ```text
/// [dependencies]
/// cyclic_queue = { default-features = false }
/// ```
///
/// # Naming Conventions
///
/// - `front..=back`: a closed range of list nodes, both inclusive;
/// - `start..end`: a half-open range of list nodes, left inclusive and right
///   exclusive (probably the ghost node).
pub struct List<T> {
    /// Allocated as a `Node<MaybeUninit<T>>`; its element is never read.
    ghost: NonNull<Node<T>>,
    #[cfg(feature = "length")]
    /// the length of the list
    pub(crate) len: usize,
    _marker: PhantomData<Box<Node<T>>>,
}

#[repr(C)]
pub(crate) struct Node<T> {
    pub(crate) next: NonNull<Node<T>>,
    pub(crate) prev: NonNull<Node<T>>,
    pub(crate) element: T,
}

/// Links `prev` and `next` to each other.
///
/// # Safety
///
/// Both nodes must be alive.
#[inline]
pub(crate) unsafe fn connect<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    (*prev.as_ptr()).next = next;
    (*next.as_ptr()).prev = prev;
}

#[inline]
pub(crate) unsafe fn next_of<T>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    (*node.as_ptr()).next
}

#[inline]
pub(crate) unsafe fn prev_of<T>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    (*node.as_ptr()).prev
}

/// Borrows the element of a data node.
///
/// # Safety
///
/// `node` must not be a ghost node, and the returned reference must not outlive
/// the node nor alias a mutable borrow of the same element.
#[inline]
pub(crate) unsafe fn element_of<'a, T>(node: NonNull<Node<T>>) -> &'a T {
    &(*node.as_ptr()).element
}

/// Mutably borrows the element of a data node. See [`element_of`].
#[inline]
pub(crate) unsafe fn element_mut<'a, T>(node: NonNull<Node<T>>) -> &'a mut T {
    &mut (*node.as_ptr()).element
}

// private methods
impl<T> List<T> {
    pub(crate) fn ghost_node(&self) -> NonNull<Node<T>> {
        self.ghost
    }
    pub(crate) fn front_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.next` is always valid (either `ghost` itself, or the first element
        // in the list).
        unsafe { next_of(self.ghost) }
    }
    pub(crate) fn back_node(&self) -> NonNull<Node<T>> {
        // SAFETY: `ghost.prev` is always valid (either `ghost` itself, or the last element
        // in the list).
        unsafe { prev_of(self.ghost) }
    }

    /// Detach a single node `node` from the list, and return it as a box.
    ///
    /// It is unsafe because it does not check whether `node` belongs to the list.
    ///
    /// If the `node` does not belong to the list, or it is the ghost node, this
    /// function call will make the list ill-formed.
    pub(crate) unsafe fn detach_node(&mut self, node: NonNull<Node<T>>) -> Box<Node<T>> {
        #[cfg(feature = "length")]
        {
            self.len -= 1;
        }
        connect(prev_of(node), next_of(node));
        Box::from_raw(node.as_ptr())
    }

    /// Attach a single node `node` to the list, between `prev` and `next`.
    ///
    /// It is unsafe because it does not check whether `prev` and `next` belongs
    /// to the list, or whether the `prev` and `next` is adjacent (only in
    /// `#[cfg(debug_assertions)]`).
    ///
    /// If the `prev` and `next` does not belong to the list, or they are not
    /// adjacent nodes, this function call will make the list ill-formed.
    pub(crate) unsafe fn attach_node(
        &mut self,
        prev: NonNull<Node<T>>,
        next: NonNull<Node<T>>,
        node: NonNull<Node<T>>,
    ) {
        #[cfg(debug_assertions)]
        assert_adjacent(prev, next);
        connect(prev, node);
        connect(node, next);
        #[cfg(feature = "length")]
        {
            self.len += 1;
        }
    }

    fn try_attach_front(&mut self, elt: T) -> Result<()> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: the ghost node and the front node are adjacent nodes in the list.
        unsafe { self.attach_node(self.ghost_node(), self.front_node(), node) };
        Ok(())
    }

    fn try_attach_back(&mut self, elt: T) -> Result<()> {
        let node = Node::try_new_detached(elt)?;
        // SAFETY: the back node and the ghost node are adjacent nodes in the list.
        unsafe { self.attach_node(self.back_node(), self.ghost_node(), node) };
        Ok(())
    }
}

impl<T> List<T> {
    /// Create an empty `List`.
    ///
    /// Aborts through [`std::alloc::handle_alloc_error`] if the ghost node cannot
    /// be allocated. See [`List::try_new`] for a fallible version.
    ///
    /// # Examples
    /// ```
    /// use cyclic_queue::List;
    /// let list: List<u32> = List::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(list) => list,
            Err(_) => alloc::handle_alloc_error(Layout::new::<Node<T>>()),
        }
    }

    /// Create an empty `List`, or return [`Error::AllocationFailure`] if the ghost
    /// node cannot be allocated.
    ///
    /// # Examples
    /// ```
    /// use cyclic_queue::List;
    /// let list = List::<String>::try_new().unwrap();
    /// assert!(list.is_empty());
    /// ```
    pub fn try_new() -> Result<Self> {
        Ok(Self {
            ghost: new_ghost()?,
            #[cfg(feature = "length")]
            len: 0,
            _marker: PhantomData,
        })
    }

    /// Returns `true` if the `List` is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert!(list.is_empty());
    ///
    /// list.push_front("foo");
    /// assert!(!list.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front_node() == self.ghost_node()
    }

    /// Returns the length of the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time with the `length` feature,
    /// and in *O*(*n*) time without it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.len(), 1);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.len(), 2);
    ///
    /// list.push_back(3);
    /// assert_eq!(list.len(), 3);
    /// ```
    #[cfg(feature = "length")]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(not(feature = "length"))]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Removes all elements from the `List`.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    #[inline]
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Provides a reference to the front element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.front(), None);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front(), Some(&1));
    /// ```
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the front node is a data node.
        Some(unsafe { element_of(self.front_node()) })
    }

    /// Provides a mutable reference to the front element, or `None` if the list
    /// is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, and it is borrowed mutably.
        Some(unsafe { element_mut(self.front_node()) })
    }

    /// Provides a reference to the back element, or `None` if the list is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.back(), None);
    ///
    /// list.push_back(1);
    /// assert_eq!(list.back(), Some(&1));
    /// ```
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the back node is a data node.
        Some(unsafe { element_of(self.back_node()) })
    }

    /// Adds an element first in the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_front(2);
    /// assert_eq!(list.front().unwrap(), &2);
    ///
    /// list.push_front(1);
    /// assert_eq!(list.front().unwrap(), &1);
    /// ```
    pub fn push_front(&mut self, elt: T) {
        if self.try_attach_front(elt).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node<T>>());
        }
    }

    /// Like [`List::push_front`], but returns [`Error::AllocationFailure`] instead of
    /// aborting when the node cannot be allocated. The list is left unchanged on
    /// failure and `elt` is dropped.
    pub fn try_push_front(&mut self, elt: T) -> Result<()> {
        self.try_attach_front(elt)
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_front(1);
    /// list.push_front(3);
    /// assert_eq!(list.pop_front(), Some(3));
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the front node is a data node of it.
        Some(unsafe { self.detach_node(self.front_node()) }.into_element())
    }

    /// Appends an element to the back of a list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.back().unwrap(), &3);
    /// ```
    pub fn push_back(&mut self, elt: T) {
        if self.try_attach_back(elt).is_err() {
            alloc::handle_alloc_error(Layout::new::<Node<T>>());
        }
    }

    /// Like [`List::push_back`], but returns [`Error::AllocationFailure`] instead of
    /// aborting when the node cannot be allocated.
    pub fn try_push_back(&mut self, elt: T) -> Result<()> {
        self.try_attach_back(elt)
    }

    /// Removes the last element from a list and returns it, or `None` if
    /// it is empty.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    /// assert_eq!(list.pop_back(), None);
    /// list.push_back(1);
    /// list.push_back(3);
    /// assert_eq!(list.pop_back(), Some(3));
    /// ```
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: the list is not empty, so the back node is a data node of it.
        Some(unsafe { self.detach_node(self.back_node()) }.into_element())
    }

    /// Provides a forward iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use cyclic_queue::List;
    ///
    /// let mut list = List::new();
    ///
    /// list.push_back(0);
    /// list.push_back(1);
    /// list.push_back(2);
    ///
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&0));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Provides a forward iterator with mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }
}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    /// Allocate a self-linked node holding `element`.
    ///
    /// On allocation failure `element` is dropped and nothing is leaked.
    pub(crate) fn try_new_detached(element: T) -> Result<NonNull<Node<T>>> {
        let layout = Layout::new::<Node<T>>();
        // SAFETY: `Node<T>` holds two pointers, so `layout` is never zero-sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Node<T>>();
        let node = NonNull::new(raw).ok_or(Error::AllocationFailure {
            size: layout.size(),
        })?;
        // SAFETY: `raw` is a fresh allocation with the layout of `Node<T>`, so
        // it can be released later by `Box::from_raw`.
        unsafe {
            raw.write(Node {
                next: node,
                prev: node,
                element,
            })
        };
        Ok(node)
    }

    pub(crate) fn into_element(self: Box<Self>) -> T {
        self.element
    }
}

/// Allocate a self-linked ghost node.
///
/// The ghost has the layout of a `Node<T>`, so its links can be read through
/// a `NonNull<Node<T>>`, but its element slot stays uninitialized.
fn new_ghost<T>() -> Result<NonNull<Node<T>>> {
    Node::<MaybeUninit<T>>::try_new_detached(MaybeUninit::uninit()).map(NonNull::cast)
}

#[cfg(debug_assertions)]
fn assert_adjacent<T>(prev: NonNull<Node<T>>, next: NonNull<Node<T>>) {
    unsafe {
        assert_eq!(next_of(prev), next);
        assert_eq!(prev_of(next), prev);
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: the ghost was allocated as a `Node<MaybeUninit<T>>` by `new_ghost`,
        // and dropping a `MaybeUninit` never reads the element slot.
        unsafe {
            drop(Box::from_raw(
                self.ghost.cast::<Node<MaybeUninit<T>>>().as_ptr(),
            ))
        };
    }
}

unsafe impl<T: Send> Send for List<T> {}

unsafe impl<T: Sync> Sync for List<T> {}

// Ensure that `List` and its read-only iterators are covariant in their type parameters.
#[allow(dead_code)]
fn assert_covariance() {
    fn a<'a>(x: List<&'static str>) -> List<&'a str> {
        x
    }
    fn b<'i, 'a>(x: Iter<'i, &'static str>) -> Iter<'i, &'a str> {
        x
    }
    fn c<'a>(x: IntoIter<&'static str>) -> IntoIter<&'a str> {
        x
    }
}
