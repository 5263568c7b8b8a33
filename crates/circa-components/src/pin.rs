//! Circuit pins: the ports of a circuit used as a subcircuit.
//!
//! An input pin drives its value into the circuit; when the circuit is
//! instantiated, the enclosing instance's drive replaces the pin's own
//! value. An output pin only reads, and keeps the last value it saw as
//! its data blob.

use circa_circuit::{Behavior, Capabilities, Capability, EndData, PortDirection, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// A pin of the given direction and width, anchored at its single end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    direction: PortDirection,
    width: BitWidth,
    initial: Value,
}

impl Pin {
    /// A pin driving `width` zero bits until told otherwise.
    pub fn input(width: BitWidth) -> Self {
        Self {
            direction: PortDirection::Input,
            width,
            initial: Value::from_bits(width, 0),
        }
    }

    /// A pin reading `width` bits.
    pub fn output(width: BitWidth) -> Self {
        Self {
            direction: PortDirection::Output,
            width,
            initial: Value::unknown(width),
        }
    }

    /// Drive `value` (fitted to the pin's width) when no enclosing
    /// instance drives the pin.
    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial = value.extend_width(self.width, Value::FALSE);
        self
    }

    /// The pin's direction seen from an enclosing instance.
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Bit width.
    pub fn width(&self) -> BitWidth {
        self.width
    }
}

impl Behavior for Pin {
    fn name(&self) -> &str {
        "Pin"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        match self.direction {
            PortDirection::Input => smallvec![EndData::output(anchor, self.width)],
            PortDirection::Output => smallvec![EndData::input(anchor, self.width)],
        }
    }

    fn capabilities(&self) -> Capabilities {
        match self.direction {
            PortDirection::Input => Capabilities::EMPTY,
            PortDirection::Output => Capabilities::EMPTY.with(Capability::StatefulData),
        }
    }

    fn port_direction(&self) -> Option<PortDirection> {
        Some(self.direction)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        match self.direction {
            PortDirection::Input => {
                let value = match ctx.external_drive() {
                    Some(v) if !v.is_nil() => v.extend_width(self.width, Value::UNKNOWN),
                    Some(_) => Value::NIL,
                    None => self.initial,
                };
                ctx.set_port(0, value, 1)
            }
            PortDirection::Output => {
                let seen = ctx.port(0)?;
                ctx.set_data(Box::new(seen));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circa_test_utils::MockContext;

    fn origin() -> Location {
        Location::new(0, 0)
    }

    #[test]
    fn input_pin_drives_its_initial_value() {
        let pin = Pin::input(BitWidth::bits(4)).with_initial(Value::from_bits(BitWidth::bits(4), 9));
        let mut ctx = MockContext::for_behavior(&pin, origin());
        pin.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::from_bits(BitWidth::bits(4), 9)));
    }

    #[test]
    fn external_drive_overrides_initial() {
        let pin = Pin::input(BitWidth::ONE).with_initial(Value::TRUE);
        let mut ctx = MockContext::for_behavior(&pin, origin());
        ctx.set_external(Some(Value::FALSE));
        pin.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::FALSE));

        // A disconnected instance port withdraws the pin's drive.
        ctx.set_external(Some(Value::NIL));
        pin.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::NIL));
    }

    #[test]
    fn output_pin_records_what_it_reads() {
        let pin = Pin::output(BitWidth::bits(2));
        let mut ctx = MockContext::for_behavior(&pin, origin());
        ctx.set_port_input(0, Value::from_bits(BitWidth::bits(2), 2));
        pin.propagate(&mut ctx).unwrap();
        assert!(ctx.scheduled().is_empty());
        assert_eq!(
            ctx.data_as::<Value>(),
            Some(&Value::from_bits(BitWidth::bits(2), 2))
        );
    }

    #[test]
    fn end_kind_follows_direction() {
        let anchor = Location::new(10, 20);
        assert!(Pin::input(BitWidth::ONE).ends(anchor)[0].is_output());
        assert!(Pin::output(BitWidth::ONE).ends(anchor)[0].is_input());
        assert_eq!(
            Pin::output(BitWidth::ONE).port_direction(),
            Some(PortDirection::Output)
        );
    }
}
