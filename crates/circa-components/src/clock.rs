//! The clock source.

use circa_circuit::{Behavior, Capabilities, Capability, EndData, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// Per-state phase of a [`Clock`]: the level it currently drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockState {
    /// Driven level.
    pub sending: Value,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            sending: Value::FALSE,
        }
    }
}

/// A one-bit clock, low for `low` ticks then high for `high` ticks.
///
/// The level is decided only by [`Behavior::tick`]; propagation just
/// re-drives the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    high: u32,
    low: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self { high: 1, low: 1 }
    }
}

impl Clock {
    /// A clock with the given phase lengths in ticks (at least 1 each).
    pub fn new(high: u32, low: u32) -> Self {
        Self {
            high: high.max(1),
            low: low.max(1),
        }
    }

    /// Level at absolute tick `ticks`.
    pub fn level_at(&self, ticks: u64) -> Value {
        let period = u64::from(self.high) + u64::from(self.low);
        if ticks % period < u64::from(self.low) {
            Value::FALSE
        } else {
            Value::TRUE
        }
    }
}

impl Behavior for Clock {
    fn name(&self) -> &str {
        "Clock"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::output(anchor, BitWidth::ONE)]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY
            .with(Capability::DrivesClock)
            .with(Capability::StatefulData)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        let sending = ctx.data_or_insert_with(ClockState::default).sending;
        ctx.set_port(0, sending, 1)
    }

    fn tick(&self, ctx: &mut dyn PropagateContext, ticks: u64) -> Result<bool, StepError> {
        let desired = self.level_at(ticks);
        let state = ctx.data_or_insert_with(ClockState::default);
        let changed = state.sending != desired;
        state.sending = desired;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circa_test_utils::MockContext;

    #[test]
    fn duty_cycle() {
        let clock = Clock::new(2, 1);
        let levels: Vec<Value> = (0..6).map(|t| clock.level_at(t)).collect();
        assert_eq!(
            levels,
            vec![
                Value::FALSE,
                Value::TRUE,
                Value::TRUE,
                Value::FALSE,
                Value::TRUE,
                Value::TRUE
            ]
        );
    }

    #[test]
    fn tick_reports_flips_and_propagate_drives_the_level() {
        let clock = Clock::default();
        let mut ctx = MockContext::for_behavior(&clock, Location::new(0, 0));
        clock.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::FALSE));

        assert!(clock.tick(&mut ctx, 1).unwrap());
        assert!(!clock.tick(&mut ctx, 3).unwrap());
        clock.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::TRUE));
        assert_eq!(ctx.data_as::<ClockState>().map(|s| s.sending), Some(Value::TRUE));
    }
}
