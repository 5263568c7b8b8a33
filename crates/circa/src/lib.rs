//! Circa: an event-driven digital logic simulator core.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Circa sub-crates. For most users, adding `circa` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use circa::prelude::*;
//!
//! let mut design = Design::new();
//! let main = design.add_circuit("main");
//! let circuit = design.circuit_mut(main).unwrap();
//! let (input, _) = circuit.add_component(Component::leaf(
//!     Location::new(0, 0),
//!     Pin::input(BitWidth::ONE),
//! ));
//! // An inverter at (60,0) reads its input at (30,0).
//! circuit.add_component(Component::leaf(Location::new(60, 0), Not::new(BitWidth::ONE)));
//! circuit.add_component(Component::leaf(Location::new(100, 0), Pin::output(BitWidth::ONE)));
//! circuit.add_wires(&[
//!     Wire::from_coords(0, 0, 30, 0),
//!     Wire::from_coords(60, 0, 100, 0),
//! ]);
//!
//! let mut sim = Simulator::new(&design, main, SimConfig::default()).unwrap();
//! sim.propagate(&design).unwrap();
//! assert_eq!(sim.value_at(Location::new(100, 0)), Value::TRUE);
//!
//! sim.drive(input, Value::TRUE);
//! sim.propagate(&design).unwrap();
//! assert_eq!(sim.value_at(Location::new(100, 0)), Value::FALSE);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `circa-core` | IDs, locations, widths, the value algebra, errors |
//! | [`circuit`] | `circa-circuit` | Circuits, wires, edits, connectivity snapshots |
//! | [`engine`] | `circa-engine` | The simulator and its configuration |
//! | [`components`] | `circa-components` | Pins, gates, clocks, pulls, splitters |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`circa-core`).
///
/// [`types::Value`] and its bit algebra, [`types::BitWidth`],
/// [`types::Location`], identifiers, and the error enums.
pub use circa_core as types;

/// Circuit graph (`circa-circuit`).
///
/// [`circuit::Circuit`] and [`circuit::Design`] for building circuits,
/// the [`circuit::Behavior`] trait for custom components, and
/// [`circuit::BundleMap`] connectivity snapshots.
pub use circa_circuit as circuit;

/// Propagation engine (`circa-engine`).
///
/// [`engine::Simulator`] runs a circuit tree; [`engine::SimConfig`]
/// bounds it.
pub use circa_engine as engine;

/// Reference components (`circa-components`).
pub use circa_components as components;

/// Common imports for typical Circa usage.
///
/// ```rust
/// use circa::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use circa_core::{BitWidth, CircuitId, ComponentId, Location, SimTime, Value};

    // Errors
    pub use circa_core::{ConnectivityError, EditError, StepError};

    // Circuit graph
    pub use circa_circuit::{
        Behavior, Capability, Circuit, Component, Design, EditAction, EndData, PropagateContext,
        Wire,
    };

    // Engine
    pub use circa_engine::{ConfigError, SimConfig, Simulator, StepMetrics};

    // Components
    pub use circa_components::{
        Clock, Constant, Gate, GateKind, Not, Pin, Probe, PullResistor, SplitterBuilder,
    };
}
