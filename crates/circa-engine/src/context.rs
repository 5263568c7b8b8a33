//! The [`PropagateContext`] handed to leaf behaviours.

use std::any::Any;

use circa_circuit::{Circuit, EndData, PropagateContext};
use circa_core::{ComponentId, Location, StateId, StepError, Value};

use crate::event::Scheduler;
use crate::state::SimState;

/// One component's view of one state during a propagate or tick.
pub(crate) struct StepContext<'a> {
    pub component: ComponentId,
    pub ends: &'a [EndData],
    pub circuit: &'a Circuit,
    pub state_id: StateId,
    pub state: &'a mut SimState,
    pub scheduler: &'a mut Scheduler,
}

/// Resolved value at `loc`, or all-floating at the location's width.
pub(crate) fn read(state: &SimState, circuit: &Circuit, loc: Location) -> Value {
    state
        .value(loc)
        .unwrap_or_else(|| Value::unknown(circuit.width_at(loc)))
}

impl StepContext<'_> {
    fn end(&self, port: usize) -> Result<&EndData, StepError> {
        self.ends.get(port).ok_or(StepError::PortOutOfRange {
            component: self.component,
            port,
            ports: self.ends.len(),
        })
    }
}

impl PropagateContext for StepContext<'_> {
    fn component(&self) -> ComponentId {
        self.component
    }

    fn ends(&self) -> &[EndData] {
        self.ends
    }

    fn port(&self, port: usize) -> Result<Value, StepError> {
        let loc = self.end(port)?.location;
        Ok(read(self.state, self.circuit, loc))
    }

    fn set_port(&mut self, port: usize, value: Value, delay: u32) -> Result<(), StepError> {
        let loc = self.end(port)?.location;
        self.scheduler
            .schedule(self.state_id, loc, self.component, value, delay, true);
        Ok(())
    }

    fn value_at(&self, location: Location) -> Value {
        read(self.state, self.circuit, location)
    }

    fn set_value(&mut self, location: Location, value: Value, delay: u32) -> Result<(), StepError> {
        if !self.ends.iter().any(|e| e.location == location) {
            return Err(StepError::UndeclaredLocation {
                component: self.component,
                location,
            });
        }
        self.scheduler
            .schedule(self.state_id, location, self.component, value, delay, true);
        Ok(())
    }

    fn data(&self) -> Option<&(dyn Any + Send)> {
        self.state.data.get(&self.component).map(|b| &**b)
    }

    fn data_mut(&mut self) -> Option<&mut (dyn Any + Send)> {
        self.state.data.get_mut(&self.component).map(|b| &mut **b)
    }

    fn set_data(&mut self, data: Box<dyn Any + Send>) {
        self.state.data.insert(self.component, data);
    }

    fn external_drive(&self) -> Option<Value> {
        self.state.external.get(&self.component).copied()
    }
}
