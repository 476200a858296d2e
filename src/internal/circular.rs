//! Circular dependency detection infrastructure.
//!
//! The construction stack is thread-local: resolution runs synchronously on
//! the caller's thread, so one top-level call owns the stack for its whole
//! duration. Entries are pushed by [`StackGuard::enter`] and popped when the
//! guard drops, on every exit path.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Default depth guard, overridable through `ProviderOptions::max_depth`.
pub(crate) const MAX_DEPTH: usize = 1024;

thread_local! {
    static CONSTRUCTION_STACK: RefCell<Vec<Key>> = const { RefCell::new(Vec::new()) };
}

/// Marks `key` as under construction until dropped.
pub(crate) struct StackGuard {
    key: Key,
}

impl StackGuard {
    /// Pushes `key`, or fails if it is already under construction on this
    /// thread or the stack is `max_depth` deep.
    pub(crate) fn enter(key: Key, max_depth: usize) -> DiResult<Self> {
        CONSTRUCTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            // cycle check before pushing
            if stack.contains(&key) {
                let mut path: Vec<&'static str> = stack.iter().map(Key::display_name).collect();
                path.push(key.display_name());
                return Err(DiError::Circular(path));
            }
            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(key);
            Ok(StackGuard { key })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread teardown
        let _ = CONSTRUCTION_STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(last) = stack.pop() {
                debug_assert_eq!(last, self.key);
            }
        });
    }
}

/// Current construction stack depth on this thread.
#[cfg(test)]
pub(crate) fn depth() -> usize {
    CONSTRUCTION_STACK.with(|stack| stack.borrow().len())
}
