//! Once-per-generation publication of connectivity snapshots.
//!
//! The first reader after an edit computes the [`BundleMap`]; readers
//! arriving meanwhile block on a condition variable until it is
//! published. A failed computation still publishes (an incomplete
//! placeholder), so waiters are always released; only the reader that
//! ran the computation sees the error. The next reader to arrive after a
//! failure retries.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use circa_core::{ConnectivityError, Generation};

use crate::connectivity::BundleMap;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Computing(Generation),
    Ready(Arc<BundleMap>),
}

/// Single-writer, many-reader cell holding the current snapshot.
#[derive(Debug, Default)]
pub(crate) struct SnapshotCell {
    slot: Mutex<Slot>,
    ready: Condvar,
}

/// Publishes a placeholder if the computing reader unwinds before it
/// publishes a real result.
struct PublishOnDrop<'a> {
    cell: &'a SnapshotCell,
    generation: Generation,
    armed: bool,
}

impl Drop for PublishOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cell
                .publish(Arc::new(BundleMap::degraded(self.generation)));
        }
    }
}

impl SnapshotCell {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, map: Arc<BundleMap>) {
        *self.lock() = Slot::Ready(map);
        self.ready.notify_all();
    }

    /// The snapshot for `generation`, computing it with `compute` if no
    /// complete one is published.
    pub fn get_or_compute<F>(
        &self,
        generation: Generation,
        compute: F,
    ) -> Result<Arc<BundleMap>, ConnectivityError>
    where
        F: FnOnce() -> Result<BundleMap, ConnectivityError>,
    {
        let mut slot = self.lock();
        let mut waited = false;
        loop {
            let in_flight = match &*slot {
                Slot::Ready(map)
                    if map.generation() == generation && (map.is_complete() || waited) =>
                {
                    return Ok(Arc::clone(map));
                }
                Slot::Computing(g) => *g == generation,
                Slot::Empty | Slot::Ready(_) => false,
            };
            if !in_flight {
                break;
            }
            waited = true;
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *slot = Slot::Computing(generation);
        drop(slot);

        let mut guard = PublishOnDrop {
            cell: self,
            generation,
            armed: true,
        };
        let result = compute();
        guard.armed = false;
        match result {
            Ok(map) => {
                let map = Arc::new(map);
                self.publish(Arc::clone(&map));
                Ok(map)
            }
            Err(e) => {
                self.publish(Arc::new(BundleMap::degraded(generation)));
                Err(e)
            }
        }
    }

    /// The published snapshot, if complete and for `generation`.
    pub fn peek(&self, generation: Generation) -> Option<Arc<BundleMap>> {
        match &*self.lock() {
            Slot::Ready(map) if map.generation() == generation && map.is_complete() => {
                Some(Arc::clone(map))
            }
            _ => None,
        }
    }

    /// Drop the published snapshot. Requires exclusive access, which an
    /// edit has.
    pub fn invalidate(&mut self) {
        *self.slot.get_mut().unwrap_or_else(PoisonError::into_inner) = Slot::Empty;
    }
}
