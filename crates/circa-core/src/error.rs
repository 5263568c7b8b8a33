//! Error types for the Circa logic simulator.
//!
//! Organised by subsystem: connectivity analysis, simulation steps, and
//! graph construction. Diagnostics that do not stop the simulation
//! (width incompatibilities, oscillation) are not errors; they are
//! recorded as queryable state by the circuit and engine crates.

use std::error::Error;
use std::fmt;

use crate::id::{CircuitId, ComponentId, StateId};
use crate::location::Location;

/// Broken splitter configuration found while sewing threads.
///
/// These are contract violations: the splitter's bit map disagrees with
/// the widths of the bundles at its ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectivityError {
    /// A combined-end bit index beyond the combined bundle's width.
    SplitterBitOutOfRange {
        /// The offending splitter.
        splitter: ComponentId,
        /// Bit index on the combined end.
        bit: usize,
        /// Width of the combined-end bundle.
        width: usize,
    },
    /// A fan-out position beyond the width of the bundle at that end.
    SplitterPositionOutOfRange {
        /// The offending splitter.
        splitter: ComponentId,
        /// Fan-out end index (1-based; 0 is the combined end).
        end: usize,
        /// Position within the end.
        position: usize,
        /// Width of the bundle at that end.
        width: usize,
    },
    /// A bit mapped to an end the splitter does not have.
    SplitterEndOutOfRange {
        /// The offending splitter.
        splitter: ComponentId,
        /// The referenced end index.
        end: usize,
        /// Number of ends the splitter declares.
        ends: usize,
    },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SplitterBitOutOfRange {
                splitter,
                bit,
                width,
            } => write!(
                f,
                "splitter {splitter}: combined bit {bit} out of range for width {width}"
            ),
            Self::SplitterPositionOutOfRange {
                splitter,
                end,
                position,
                width,
            } => write!(
                f,
                "splitter {splitter}: position {position} on end {end} out of range for width {width}"
            ),
            Self::SplitterEndOutOfRange {
                splitter,
                end,
                ends,
            } => write!(f, "splitter {splitter}: end {end} out of range ({ends} ends)"),
        }
    }
}

impl Error for ConnectivityError {}

/// Contract violations that abort a simulation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// The connectivity snapshot for a circuit could not be computed.
    Connectivity {
        /// Circuit whose snapshot failed.
        circuit: CircuitId,
        /// The underlying analyzer error.
        source: ConnectivityError,
    },
    /// A component addressed a port index it does not declare.
    PortOutOfRange {
        /// The propagating component.
        component: ComponentId,
        /// Requested port index.
        port: usize,
        /// Number of declared ports.
        ports: usize,
    },
    /// A component drove a location none of its ends occupies.
    UndeclaredLocation {
        /// The propagating component.
        component: ComponentId,
        /// The location it tried to drive.
        location: Location,
    },
    /// A subcircuit or state references a circuit missing from the design.
    UnknownCircuit {
        /// The missing circuit.
        circuit: CircuitId,
    },
    /// A referenced component is not in the circuit.
    UnknownComponent {
        /// The missing component.
        component: ComponentId,
    },
    /// A referenced simulation state is not in the state tree.
    UnknownState {
        /// The missing state.
        state: StateId,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connectivity { circuit, source } => {
                write!(f, "connectivity of {circuit} failed: {source}")
            }
            Self::PortOutOfRange {
                component,
                port,
                ports,
            } => write!(
                f,
                "component {component} addressed port {port} but declares {ports}"
            ),
            Self::UndeclaredLocation {
                component,
                location,
            } => write!(
                f,
                "component {component} drove {location}, which none of its ends occupies"
            ),
            Self::UnknownCircuit { circuit } => write!(f, "unknown circuit {circuit}"),
            Self::UnknownComponent { component } => write!(f, "unknown component {component}"),
            Self::UnknownState { state } => write!(f, "unknown simulation state {state}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connectivity { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from graph construction helpers.
///
/// The wire canonicalizer itself never fails; these come from building
/// the values handed to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    /// Wire endpoints share neither a row nor a column.
    DiagonalWire {
        /// First endpoint.
        from: Location,
        /// Second endpoint.
        to: Location,
    },
    /// Wire endpoints coincide.
    DegenerateWire {
        /// The shared endpoint.
        at: Location,
    },
    /// The referenced circuit is not in the design.
    UnknownCircuit {
        /// The missing circuit.
        circuit: CircuitId,
    },
    /// Instantiating `child` inside `parent` would make a circuit
    /// contain itself.
    RecursiveSubcircuit {
        /// Circuit receiving the instance.
        parent: CircuitId,
        /// Circuit being instantiated.
        child: CircuitId,
    },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiagonalWire { from, to } => {
                write!(f, "wire {from}-{to} is not axis-aligned")
            }
            Self::DegenerateWire { at } => write!(f, "wire at {at} has zero length"),
            Self::UnknownCircuit { circuit } => write!(f, "unknown circuit {circuit}"),
            Self::RecursiveSubcircuit { parent, child } => {
                write!(f, "{child} cannot be placed inside {parent}: it contains it")
            }
        }
    }
}

impl Error for EditError {}
