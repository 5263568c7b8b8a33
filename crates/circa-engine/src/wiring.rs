//! Resolution of dirty points through a connectivity snapshot.
//!
//! A point outside every bundle just shows what its drivers assert. A
//! point in an invalid bundle (incompatible or unknown width) shows
//! nothing, and neither does the rest of that bundle. Otherwise every
//! thread of the bundle is re-resolved from the drivers of all bundles
//! the thread passes through, and each affected bundle's value is
//! reassembled bit by bit and written to all of its points.

use circa_circuit::{BundleMap, Circuit, ThreadId};
use circa_core::{Bit, Location, Value};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::state::SimState;

/// Resolve `points` in `state` against `map`.
pub(crate) fn resolve_points(
    state: &mut SimState,
    circuit: &Circuit,
    map: &BundleMap,
    points: impl IntoIterator<Item = Location>,
) {
    let mut dirty_threads: IndexSet<ThreadId> = IndexSet::new();
    for p in points {
        match map.bundle_at(p) {
            None => {
                let raw = state.raw_value(p);
                state.set_value_by_wire(circuit, p, raw);
            }
            Some(b) => {
                let bundle = map.bundle(b);
                if bundle.is_valid() {
                    dirty_threads.extend(bundle.threads().iter().copied());
                } else {
                    for &q in bundle.points() {
                        state.set_value_by_wire(circuit, q, Value::NIL);
                    }
                }
            }
        }
    }
    if dirty_threads.is_empty() {
        return;
    }

    let mut thread_values: IndexMap<ThreadId, Value> = IndexMap::new();
    let mut bundles = IndexSet::new();
    for t in dirty_threads {
        thread_values.insert(t, thread_value(state, map, t));
        bundles.extend(map.thread(t).members().iter().map(|&(b, _)| b));
    }

    for b in bundles {
        let bundle = map.bundle(b);
        if !bundle.is_valid() {
            continue;
        }
        let bits: SmallVec<[Value; 8]> = bundle
            .threads()
            .iter()
            .map(|&t| {
                *thread_values
                    .entry(t)
                    .or_insert_with(|| thread_value(state, map, t))
            })
            .collect();
        let value = Value::from_bits_slice(&bits);
        for &q in bundle.points() {
            state.set_value_by_wire(circuit, q, value);
        }
    }
}

/// Single-bit value of thread `t`: every driver's bit on the thread,
/// combined; floating bits take the thread's pull if it has one.
fn thread_value(state: &SimState, map: &BundleMap, t: ThreadId) -> Value {
    let mut value = Value::UNKNOWN;
    let mut pull = Value::NIL;
    for &(b, bit) in map.thread(t).members() {
        let bundle = map.bundle(b);
        for &p in bundle.points() {
            let out = state.raw_value(p);
            if !out.is_nil() {
                value = value.combine(out.get(bit));
            }
        }
        pull = pull.combine(bundle.pull());
    }
    if !pull.is_nil() && value.bit(0) == Bit::Floating {
        pull.get(0)
    } else {
        value
    }
}
