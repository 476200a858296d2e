//! Lifetime caches with single construction per key.
//!
//! The map lock is held only long enough to fetch the per-key cell. First
//! construction is serialized by the cell itself, so building one instance
//! never blocks resolution of unrelated keys. A failed initializer leaves
//! its cell empty and the next request tries again.
//!
//! Before a thread blocks on a cell it registers the wait in the process
//! wide wait graph, which turns a cross-thread cycle into an error.
//!
//! Once drained, a cache stays closed: later lookups report it, and an
//! instance whose construction finished after the drain is handed back to
//! the caller for disposal instead of being kept.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::{DiError, DiResult};
use crate::internal::wait_graph::CellId;
use crate::internal::{Building, Waiting};
use crate::key::Key;
use crate::registration::AnyArc;

/// Result of a cache lookup.
pub(crate) enum Lookup {
    Ready(AnyArc),
    /// The cache was drained. Holds an instance built across the drain,
    /// which nobody else will dispose.
    Closed(Option<AnyArc>),
}

#[derive(Default)]
struct Created {
    order: Vec<Key>,
    drained: bool,
}

#[derive(Default)]
pub(crate) struct InstanceCache {
    cells: Mutex<HashMap<Key, Arc<OnceCell<AnyArc>>>>,
    created: Mutex<Created>,
}

fn cell_id(cell: &Arc<OnceCell<AnyArc>>) -> CellId {
    Arc::as_ptr(cell) as CellId
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached instance, if one has been built.
    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<AnyArc> {
        let cell = self.cells.lock().get(key).cloned()?;
        cell.get().cloned()
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.created.lock().drained
    }

    /// Returns the cached instance or runs `init` to build it. Concurrent
    /// callers for the same key wait for the single winner.
    pub(crate) fn get_or_try_init<F>(&self, key: Key, init: F) -> DiResult<Lookup>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        if self.is_drained() {
            return Ok(Lookup::Closed(None));
        }
        let cell = {
            let mut cells = self.cells.lock();
            cells.entry(key).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };
        if let Some(value) = cell.get() {
            return Ok(Lookup::Ready(value.clone()));
        }

        let id = cell_id(&cell);
        let _waiting = Waiting::register(id, key)?;

        let mut built = false;
        let value = cell
            .get_or_try_init(|| {
                let _building = Building::claim(id, key);
                let value = init()?;
                built = true;
                Ok::<_, DiError>(value)
            })?
            .clone();

        let mut created = self.created.lock();
        match (created.drained, built) {
            (false, true) => {
                created.order.push(key);
                Ok(Lookup::Ready(value))
            }
            (false, false) => Ok(Lookup::Ready(value)),
            (true, true) => Ok(Lookup::Closed(Some(value))),
            (true, false) => Ok(Lookup::Closed(None)),
        }
    }

    /// Closes the cache and removes every cached instance, returned in
    /// creation order.
    pub(crate) fn drain(&self) -> Vec<(Key, AnyArc)> {
        let order = {
            let mut created = self.created.lock();
            created.drained = true;
            std::mem::take(&mut created.order)
        };
        let cells = std::mem::take(&mut *self.cells.lock());
        order
            .into_iter()
            .filter_map(|key| {
                let value = cells.get(&key)?.get()?.clone();
                Some((key, value))
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.created.lock().order.len()
    }
}
