//! Cross-thread cycle detection for cached construction.
//!
//! The construction stack only sees one thread. When two threads build the
//! two halves of a cycle at the same time, each one owns a cache cell the
//! other needs. This graph records which thread is building which cell and
//! which cell each thread is about to block on. A thread refuses to block
//! when the chain of owners and waits leads back to itself.
//!
//! Every wait edge is recorded under the graph lock before its thread
//! blocks. A thread claims a cell only while it is not waiting, so the edge
//! that would close a deadlock is always a wait edge, and that is the edge
//! the check runs on.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Identity of one cache cell across every cache in the process.
pub(crate) type CellId = usize;

#[derive(Default)]
struct WaitGraph {
    owners: HashMap<CellId, (ThreadId, Key)>,
    waiting: HashMap<ThreadId, CellId>,
}

static GRAPH: Lazy<Mutex<WaitGraph>> = Lazy::new(|| Mutex::new(WaitGraph::default()));

/// Registered intent to block on a cell. Dropping it clears the edge.
pub(crate) struct Waiting {
    me: ThreadId,
    cell: CellId,
}

impl Waiting {
    /// Records that the current thread is about to wait on `cell`, or fails
    /// with the cycle if that wait could never end.
    pub(crate) fn register(cell: CellId, key: Key) -> DiResult<Self> {
        let me = thread::current().id();
        let mut graph = GRAPH.lock();

        if let Some(path) = graph.cycle_through(me, cell, key) {
            tracing::debug!(service = key.display_name(), "cross-thread dependency cycle");
            return Err(DiError::Circular(path));
        }

        graph.waiting.insert(me, cell);
        Ok(Waiting { me, cell })
    }
}

impl Drop for Waiting {
    fn drop(&mut self) {
        let mut graph = GRAPH.lock();
        if graph.waiting.get(&self.me) == Some(&self.cell) {
            graph.waiting.remove(&self.me);
        }
    }
}

/// Ownership of a cell while its initializer runs.
pub(crate) struct Building {
    cell: CellId,
}

impl Building {
    pub(crate) fn claim(cell: CellId, key: Key) -> Self {
        let me = thread::current().id();
        let mut graph = GRAPH.lock();
        graph.waiting.remove(&me);
        graph.owners.insert(cell, (me, key));
        Building { cell }
    }
}

impl Drop for Building {
    fn drop(&mut self) {
        GRAPH.lock().owners.remove(&self.cell);
    }
}

impl WaitGraph {
    /// Follows owner and wait edges from `cell`. Returns the key path when
    /// they come back to `me`.
    fn cycle_through(&self, me: ThreadId, cell: CellId, key: Key) -> Option<Vec<&'static str>> {
        let mut path = vec![key.display_name()];
        let mut current = cell;

        // one step per owned cell at most; anything longer is not our cycle
        for _ in 0..=self.owners.len() {
            let &(owner, _) = self.owners.get(&current)?;
            if owner == me {
                // the last cell on the path is one we are building
                let closing = path.last().copied().unwrap_or_else(|| key.display_name());
                path.insert(0, closing);
                return Some(path);
            }
            current = *self.waiting.get(&owner)?;
            let &(_, next) = self.owners.get(&current)?;
            path.push(next.display_name());
        }
        None
    }
}
