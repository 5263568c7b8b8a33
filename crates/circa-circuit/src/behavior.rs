//! The per-component behaviour contract.
//!
//! Leaf components are black boxes to the engine: it hands them a
//! [`PropagateContext`] and they read their input ends and schedule
//! values on their output ends. Everything a component needs to remember
//! between calls (a clock's phase, a register's contents) lives in an
//! opaque per-state data blob, never in the behaviour object itself, so
//! one behaviour can serve every simulation state that instantiates it.

use std::any::Any;
use std::fmt;

use circa_core::{ComponentId, Location, StepError, Value};
use smallvec::SmallVec;

use crate::end::EndData;

/// Capabilities a component may advertise to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Asked whether it flips on every clock tick.
    DrivesClock,
    /// Output is a pure function of inputs.
    Combinational,
    /// Keeps an opaque per-state data blob.
    StatefulData,
    /// Can describe its output as a boolean expression of its inputs.
    ExposesExpression,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Self::DrivesClock => 1,
            Self::Combinational => 2,
            Self::StatefulData => 4,
            Self::ExposesExpression => 8,
        }
    }
}

/// A set of [`Capability`] flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities.
    pub const EMPTY: Capabilities = Capabilities(0);

    /// This set plus `cap`.
    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Whether `cap` is in the set.
    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = [
            Capability::DrivesClock,
            Capability::Combinational,
            Capability::StatefulData,
            Capability::ExposesExpression,
        ];
        f.debug_set()
            .entries(all.into_iter().filter(|c| self.contains(*c)))
            .finish()
    }
}

/// Direction of a subcircuit port, as seen from outside the instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// The parent drives it; the child reads it.
    Input,
    /// The child drives it; the parent reads it.
    Output,
}

/// What a component sees while it propagates.
///
/// Ports are the component's declared ends, indexed in declaration
/// order. Addressing a port or location the component did not declare is
/// a contract violation and fails the step.
pub trait PropagateContext {
    /// The component being propagated.
    fn component(&self) -> ComponentId;

    /// Its declared ends.
    fn ends(&self) -> &[EndData];

    /// Current value at port `port`.
    fn port(&self, port: usize) -> Result<Value, StepError>;

    /// Schedule `value` on port `port` after `delay` time units.
    fn set_port(&mut self, port: usize, value: Value, delay: u32) -> Result<(), StepError>;

    /// Current value at any location of the circuit.
    fn value_at(&self, location: Location) -> Value;

    /// Schedule `value` at `location`, which must be one of the
    /// component's ends.
    fn set_value(&mut self, location: Location, value: Value, delay: u32)
        -> Result<(), StepError>;

    /// The component's data blob in this state, if any.
    fn data(&self) -> Option<&(dyn Any + Send)>;

    /// Mutable access to the data blob.
    fn data_mut(&mut self) -> Option<&mut (dyn Any + Send)>;

    /// Replace the data blob.
    fn set_data(&mut self, data: Box<dyn Any + Send>);

    /// Value driven into this component from outside the circuit, set
    /// for input pins of a subcircuit instance.
    fn external_drive(&self) -> Option<Value>;
}

impl<'a> dyn PropagateContext + 'a {
    /// The data blob downcast to `T`.
    pub fn data_as<T: Any>(&self) -> Option<&T> {
        self.data()?.downcast_ref::<T>()
    }

    /// The data blob downcast to `T`, mutably.
    pub fn data_as_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data_mut()?.downcast_mut::<T>()
    }

    /// The data blob as `T`, installing `init()` first if it is absent
    /// or of another type.
    pub fn data_or_insert_with<T: Any + Send>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        if !self.data().is_some_and(|d| d.is::<T>()) {
            self.set_data(Box::new(init()));
        }
        self.data_mut()
            .and_then(|d| d.downcast_mut::<T>())
            .expect("data blob was just installed")
    }
}

/// Black-box behaviour of a leaf component.
///
/// Implementations must be stateless with respect to simulation: the
/// same behaviour object is shared by every state that instantiates the
/// circuit. Per-state memory goes through [`PropagateContext::set_data`].
pub trait Behavior: Send + Sync + 'static {
    /// Short type name, used in logs.
    fn name(&self) -> &str;

    /// Ends of a component of this kind placed at `anchor`.
    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]>;

    /// Capabilities advertised to the engine.
    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY
    }

    /// Set for pins that become ports of a subcircuit instance.
    fn port_direction(&self) -> Option<PortDirection> {
        None
    }

    /// Pull value applied to the bundle at this component's first end.
    fn pull(&self) -> Option<Value> {
        None
    }

    /// React to the current input values.
    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError>;

    /// Called for [`Capability::DrivesClock`] components on every tick.
    /// Returns whether the component's output changes, in which case the
    /// engine propagates it.
    fn tick(&self, ctx: &mut dyn PropagateContext, ticks: u64) -> Result<bool, StepError> {
        let _ = (ctx, ticks);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set() {
        let caps = Capabilities::EMPTY
            .with(Capability::DrivesClock)
            .with(Capability::StatefulData);
        assert!(caps.contains(Capability::DrivesClock));
        assert!(caps.contains(Capability::StatefulData));
        assert!(!caps.contains(Capability::Combinational));
        assert_eq!(format!("{caps:?}"), "{DrivesClock, StatefulData}");
    }
}
