//! Reference components for the Circa logic simulator.
//!
//! Leaf behaviours that exercise the whole engine: pins (the ports of a
//! circuit used as a subcircuit), probes and constants, the six
//! two-to-32-input gates and an inverter, a clock, pull resistors, and a
//! builder for splitters.
//!
//! Every behaviour is placed with
//! [`Component::leaf`](circa_circuit::Component::leaf) at an anchor;
//! its ends are laid out relative to that anchor.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod clock;
pub mod gates;
pub mod pin;
pub mod probe;
pub mod pull;
pub mod splitter;

pub use clock::{Clock, ClockState};
pub use gates::{Gate, GateKind, Not, MAX_INPUTS, MIN_INPUTS};
pub use pin::Pin;
pub use probe::{Constant, Probe};
pub use pull::PullResistor;
pub use splitter::{even_distribution, SplitterBuilder};
