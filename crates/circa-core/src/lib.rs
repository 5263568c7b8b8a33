//! Core types for the Circa logic simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary used throughout the Circa workspace:
//! identifiers, grid [`Location`]s, [`BitWidth`], the multi-valued
//! [`Value`] algebra, and the error enums shared by the circuit and
//! engine crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod location;
pub mod value;
pub mod width;

pub use error::{ConnectivityError, EditError, StepError};
pub use id::{CircuitId, ComponentId, Generation, Revision, SimTime, StateId};
pub use location::Location;
pub use value::{Bit, Value};
pub use width::BitWidth;
