use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use pulp_webservices::collaborators::Slot;

type Stop = Box<dyn FnOnce() + Send>;

/// Active patches, undone newest first.
///
/// Each undo runs on its own: one that panics is logged and the rest still run.
/// Dropping the set undoes whatever is still active.
#[derive(Default)]
#[must_use]
pub struct PatchSet {
    active: Vec<(String, Stop)>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Register an undo action for a patch that is already in place.
    pub fn push(&mut self, name: impl Into<String>, stop: impl FnOnce() + Send + 'static) {
        self.active.push((name.into(), Box::new(stop)));
    }

    /// Swap `replacement` into the slot `slot` selects on `owner`.
    pub fn patch<O, T>(
        &mut self,
        name: impl Into<String>,
        owner: &Arc<O>,
        slot: fn(&O) -> &Slot<T>,
        replacement: Arc<T>,
    ) where
        O: Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
    {
        let original = slot(owner).replace(replacement);
        let owner = Arc::clone(owner);
        self.push(name, move || {
            slot(&owner).replace(original);
        });
    }

    /// Undo every patch and return the names of those whose undo panicked.
    pub fn stop_all(&mut self) -> Vec<String> {
        let mut failed = Vec::new();
        while let Some((name, stop)) = self.active.pop() {
            if catch_unwind(AssertUnwindSafe(stop)).is_err() {
                tracing::error!(patch = %name, "failed to stop patch");
                failed.push(name);
            }
        }
        failed
    }
}

impl Drop for PatchSet {
    fn drop(&mut self) {
        self.stop_all();
    }
}
