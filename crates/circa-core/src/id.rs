//! Strongly-typed identifiers.
//!
//! Every arena in the workspace (components in a circuit, circuits in a
//! design, simulation states in a state tree) hands out one of these
//! instead of references, so no structure ever aliases another.

use std::fmt;

/// Identifies a component within one circuit's component arena.
///
/// Allocated from a per-circuit counter and never reused, so an id held
/// by an undo action stays unambiguous after the component is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ComponentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a circuit within a design.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitId(pub u32);

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circuit#{}", self.0)
    }
}

impl From<u32> for CircuitId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one simulation state (one circuit occurrence) within a
/// state tree. Allocated by the tree's own counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// Edit count of a circuit's wire/splitter set.
///
/// Connectivity snapshots are keyed by generation: a snapshot computed
/// for generation `n` is valid until the wire or splitter set changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edit count of a circuit's whole component set (any edit).
///
/// Simulation states remember the last revision they caught up with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(pub u64);

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulated time, in propagation-delay units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimTime(pub u64);

impl SimTime {
    /// This time advanced by `delay` units.
    pub fn after(self, delay: u64) -> Self {
        Self(self.0.saturating_add(delay))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

impl From<u64> for SimTime {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
