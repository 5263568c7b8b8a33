//! Pull resistors.

use circa_circuit::{Behavior, EndData, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// Gives every otherwise floating bit of the attached wire a default
/// level. It never drives; the pull is applied when wire values are
/// resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PullResistor {
    pull: Value,
}

impl PullResistor {
    /// Pull floating bits to `0`.
    pub fn down() -> Self {
        Self { pull: Value::FALSE }
    }

    /// Pull floating bits to `1`.
    pub fn up() -> Self {
        Self { pull: Value::TRUE }
    }

    /// Mark floating bits as errors.
    pub fn error() -> Self {
        Self { pull: Value::ERROR }
    }
}

impl Behavior for PullResistor {
    fn name(&self) -> &str {
        "PullResistor"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::input(anchor, BitWidth::UNKNOWN)]
    }

    fn pull(&self) -> Option<Value> {
        Some(self.pull)
    }

    fn propagate(&self, _ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        Ok(())
    }
}
