//! A global allocator for tests that can fail a chosen allocation.
//!
//! Failures are armed per thread, so tests running in parallel are unaffected.
//! Each thread also keeps a count of its live allocations, which lets a test
//! check that a failed operation released everything it allocated.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

struct FailingAlloc;

#[global_allocator]
static ALLOCATOR: FailingAlloc = FailingAlloc;

thread_local! {
    /// Number of allocations to let through before failing one, if armed.
    static FAIL_AFTER: Cell<Option<usize>> = const { Cell::new(None) };
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn should_fail() -> bool {
    FAIL_AFTER
        .try_with(|fail_after| match fail_after.get() {
            Some(0) => {
                fail_after.set(None);
                true
            }
            Some(n) => {
                fail_after.set(Some(n - 1));
                false
            }
            None => false,
        })
        .unwrap_or(false)
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if should_fail() {
            return std::ptr::null_mut();
        }
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            track(1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        track(-1);
        System.dealloc(ptr, layout)
    }
}

/// Runs `f` with the allocation after the first `skip` ones failing, and
/// returns its result with the change in this thread's live allocations.
pub(crate) fn fail_allocation<R>(skip: usize, f: impl FnOnce() -> R) -> (R, isize) {
    let before = LIVE.with(Cell::get);
    FAIL_AFTER.with(|fail_after| fail_after.set(Some(skip)));
    let result = f();
    FAIL_AFTER.with(|fail_after| fail_after.set(None));
    let after = LIVE.with(Cell::get);
    (result, after - before)
}
