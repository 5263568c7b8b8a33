//! Minimal behaviour used by this crate's unit tests.

use circa_core::{Location, StepError, Value};
use smallvec::SmallVec;

use crate::behavior::{Behavior, PortDirection, PropagateContext};
use crate::end::EndData;

/// Declares fixed ends and does nothing.
pub(crate) struct Stub {
    ends: Vec<EndData>,
    pull: Option<Value>,
    port: Option<PortDirection>,
}

impl Stub {
    pub fn new(ends: Vec<EndData>) -> Self {
        Self {
            ends,
            pull: None,
            port: None,
        }
    }

    pub fn with_pull(mut self, pull: Value) -> Self {
        self.pull = Some(pull);
        self
    }

    pub fn with_port(mut self, port: PortDirection) -> Self {
        self.port = Some(port);
        self
    }
}

impl Behavior for Stub {
    fn name(&self) -> &str {
        "Stub"
    }

    fn ends(&self, _anchor: Location) -> SmallVec<[EndData; 4]> {
        self.ends.iter().copied().collect()
    }

    fn port_direction(&self) -> Option<PortDirection> {
        self.port
    }

    fn pull(&self) -> Option<Value> {
        self.pull
    }

    fn propagate(&self, _ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        Ok(())
    }
}
