//! Event-driven simulation engine for Circa circuits.
//!
//! A [`Simulator`] evaluates one root circuit of a
//! [`Design`](circa_circuit::Design), with a nested state for every
//! subcircuit instance below it. Components schedule value changes with
//! a delay; the simulator applies them in time order, resolves wired
//! values through each circuit's connectivity snapshot, and wakes the
//! components whose inputs changed. Runs that fail to settle within
//! [`SimConfig::iteration_limit`] batches are flagged as oscillating
//! rather than looping forever.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod context;
mod event;
pub mod metrics;
pub mod propagator;
mod state;
mod wiring;

pub use config::{ConfigError, SimConfig, MAX_RANDOM_SHIFT};
pub use metrics::StepMetrics;
pub use propagator::Simulator;
