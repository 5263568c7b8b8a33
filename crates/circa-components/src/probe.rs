//! Read-only observers.

use circa_circuit::{Behavior, Capabilities, Capability, EndData, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// Shows the value at its end. The end takes whatever width the wire
/// carries; the last value seen is kept as the probe's data blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Probe;

impl Probe {
    /// A probe.
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for Probe {
    fn name(&self) -> &str {
        "Probe"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::input(anchor, BitWidth::UNKNOWN)]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY.with(Capability::StatefulData)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        let seen: Value = ctx.port(0)?;
        ctx.set_data(Box::new(seen));
        Ok(())
    }
}

/// Drives a fixed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constant {
    value: Value,
}

impl Constant {
    /// A constant driving `value`.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The driven value.
    pub fn value(&self) -> Value {
        self.value
    }
}

impl Behavior for Constant {
    fn name(&self) -> &str {
        "Constant"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::output(anchor, self.value.width())]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY
            .with(Capability::Combinational)
            .with(Capability::ExposesExpression)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        ctx.set_port(0, self.value, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circa_test_utils::MockContext;

    #[test]
    fn probe_keeps_last_reading() {
        let probe = Probe::new();
        let mut ctx = MockContext::for_behavior(&probe, Location::new(0, 0));
        ctx.set_port_input(0, Value::TRUE);
        probe.propagate(&mut ctx).unwrap();
        ctx.set_port_input(0, Value::ERROR);
        probe.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.data_as::<Value>(), Some(&Value::ERROR));
        assert!(ctx.scheduled().is_empty());
    }

    #[test]
    fn constant_end_width_matches_value() {
        let c = Constant::new(Value::from_bits(BitWidth::bits(5), 17));
        let ends = c.ends(Location::new(0, 0));
        assert_eq!(ends[0].width, BitWidth::bits(5));
        let mut ctx = MockContext::new(ends);
        c.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(c.value()));
    }
}
