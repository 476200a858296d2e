//! Internal disposal bag for managing cleanup hooks.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Disposal hooks executed in LIFO order.
#[derive(Default)]
pub(crate) struct DisposeBag {
    hooks: Vec<Box<dyn FnOnce() + Send>>,
}

impl DisposeBag {
    pub(crate) fn push(&mut self, f: Box<dyn FnOnce() + Send>) {
        self.hooks.push(f);
    }

    /// Runs every hook, last registered first. A panicking hook is logged and
    /// does not stop the remaining ones.
    pub(crate) fn run_all_reverse(&mut self) {
        while let Some(hook) = self.hooks.pop() {
            if catch_unwind(AssertUnwindSafe(hook)).is_err() {
                tracing::warn!("disposal hook panicked; continuing with remaining hooks");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
