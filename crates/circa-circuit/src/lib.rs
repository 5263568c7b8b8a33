//! Circuit graph for the Circa logic simulator.
//!
//! A [`Circuit`] owns a component arena, a canonical wire set, and a
//! [`PointsIndex`] of which ends touch which grid locations. Edits return
//! reversible [`EditAction`]s. Electrical connectivity is derived on
//! demand as an immutable [`BundleMap`] (bundles of wired locations and
//! per-bit threads sewn across splitters), computed once per graph
//! generation and shared between readers on any thread.
//!
//! Leaf components plug in through the [`Behavior`] trait; a [`Design`]
//! groups circuits that instantiate one another as subcircuits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod behavior;
pub mod circuit;
pub mod component;
pub mod connectivity;
pub mod design;
pub mod end;
pub mod points;
pub mod repair;
mod snapshot;
#[cfg(test)]
mod testing;
mod union_find;
pub mod wire;

pub use action::EditAction;
pub use behavior::{Behavior, Capabilities, Capability, PortDirection, PropagateContext};
pub use circuit::{Change, Circuit, JOURNAL_CAPACITY};
pub use component::{
    Component, ComponentKind, Element, SplitterSpec, SubcircuitPort, SubcircuitSpec,
};
pub use connectivity::{Bundle, BundleId, BundleMap, Thread, ThreadId};
pub use design::Design;
pub use end::{EndData, EndKind};
pub use points::{PointsIndex, WidthIncompatibility};
pub use repair::merge_exclusive;
pub use wire::{Axis, Wire};
