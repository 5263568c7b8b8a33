//! Test utilities and mock types for Circa development.
//!
//! Provides [`MockContext`], a stand-alone [`PropagateContext`] for
//! driving a single [`Behavior`] without a simulator, and the behaviour
//! fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::any::Any;
use std::collections::HashMap;

use circa_circuit::{Behavior, EndData, PropagateContext};
use circa_core::{ComponentId, Location, StepError, Value};

/// One `set_port`/`set_value` call recorded by a [`MockContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub location: Location,
    pub value: Value,
    pub delay: u32,
}

/// Mock implementation of [`PropagateContext`].
///
/// Backed by a `HashMap<Location, Value>` of input values. Pre-populate
/// inputs with [`set_input`](MockContext::set_input), call the behaviour,
/// then inspect what it scheduled with
/// [`scheduled`](MockContext::scheduled). Unset locations read as
/// floating at the width of the end there.
pub struct MockContext {
    component: ComponentId,
    ends: Vec<EndData>,
    values: HashMap<Location, Value>,
    scheduled: Vec<Scheduled>,
    data: Option<Box<dyn Any + Send>>,
    external: Option<Value>,
}

impl MockContext {
    pub fn new(ends: impl IntoIterator<Item = EndData>) -> Self {
        Self {
            component: ComponentId(0),
            ends: ends.into_iter().collect(),
            values: HashMap::new(),
            scheduled: Vec::new(),
            data: None,
            external: None,
        }
    }

    /// A context with the ends `behavior` declares at `anchor`.
    pub fn for_behavior(behavior: &dyn Behavior, anchor: Location) -> Self {
        Self::new(behavior.ends(anchor))
    }

    /// Set the value read at `location`.
    pub fn set_input(&mut self, location: Location, value: Value) {
        self.values.insert(location, value);
    }

    /// Set the value read at port `port`.
    ///
    /// # Panics
    ///
    /// If the context has no such port.
    pub fn set_port_input(&mut self, port: usize, value: Value) {
        let loc = self.ends[port].location;
        self.values.insert(loc, value);
    }

    /// Set the drive an enclosing instance would hand over.
    pub fn set_external(&mut self, value: Option<Value>) {
        self.external = value;
    }

    /// Every scheduled write, in call order.
    pub fn scheduled(&self) -> &[Scheduled] {
        &self.scheduled
    }

    /// The most recent value scheduled on port `port`.
    pub fn last_on_port(&self, port: usize) -> Option<Value> {
        let loc = self.ends.get(port)?.location;
        self.scheduled
            .iter()
            .rev()
            .find(|s| s.location == loc)
            .map(|s| s.value)
    }

    /// Drain the recorded writes.
    pub fn take_scheduled(&mut self) -> Vec<Scheduled> {
        std::mem::take(&mut self.scheduled)
    }

    /// The data blob as `T`.
    pub fn data_as<T: Any>(&self) -> Option<&T> {
        self.data.as_ref()?.downcast_ref::<T>()
    }
}

impl PropagateContext for MockContext {
    fn component(&self) -> ComponentId {
        self.component
    }

    fn ends(&self) -> &[EndData] {
        &self.ends
    }

    fn port(&self, port: usize) -> Result<Value, StepError> {
        let end = self.ends.get(port).ok_or(StepError::PortOutOfRange {
            component: self.component,
            port,
            ports: self.ends.len(),
        })?;
        Ok(self.value_at(end.location))
    }

    fn set_port(&mut self, port: usize, value: Value, delay: u32) -> Result<(), StepError> {
        let location = self
            .ends
            .get(port)
            .ok_or(StepError::PortOutOfRange {
                component: self.component,
                port,
                ports: self.ends.len(),
            })?
            .location;
        self.scheduled.push(Scheduled {
            location,
            value,
            delay,
        });
        Ok(())
    }

    fn value_at(&self, location: Location) -> Value {
        if let Some(v) = self.values.get(&location) {
            return *v;
        }
        self.ends
            .iter()
            .find(|e| e.location == location)
            .map_or(Value::NIL, |e| Value::unknown(e.width))
    }

    fn set_value(&mut self, location: Location, value: Value, delay: u32) -> Result<(), StepError> {
        if !self.ends.iter().any(|e| e.location == location) {
            return Err(StepError::UndeclaredLocation {
                component: self.component,
                location,
            });
        }
        self.scheduled.push(Scheduled {
            location,
            value,
            delay,
        });
        Ok(())
    }

    fn data(&self) -> Option<&(dyn Any + Send)> {
        self.data.as_deref()
    }

    fn data_mut(&mut self) -> Option<&mut (dyn Any + Send)> {
        self.data.as_deref_mut()
    }

    fn set_data(&mut self, data: Box<dyn Any + Send>) {
        self.data = Some(data);
    }

    fn external_drive(&self) -> Option<Value> {
        self.external
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{RelayFixture, StrayFixture};
    use circa_core::BitWidth;

    #[test]
    fn relay_copies_input_with_its_delay() {
        let relay = RelayFixture::new(Location::new(0, 0), Location::new(20, 0), BitWidth::ONE, 3);
        let mut ctx = MockContext::for_behavior(&relay, Location::new(0, 0));
        ctx.set_port_input(0, Value::TRUE);
        relay.propagate(&mut ctx).unwrap();
        assert_eq!(
            ctx.scheduled(),
            &[Scheduled {
                location: Location::new(20, 0),
                value: Value::TRUE,
                delay: 3,
            }]
        );
        assert_eq!(relay.calls(), 1);
    }

    #[test]
    fn unset_inputs_read_floating() {
        let relay = RelayFixture::new(Location::new(0, 0), Location::new(20, 0), BitWidth::bits(4), 1);
        let mut ctx = MockContext::for_behavior(&relay, Location::new(0, 0));
        relay.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(1), Some(Value::unknown(BitWidth::bits(4))));
    }

    #[test]
    fn undeclared_locations_are_rejected() {
        let stray = StrayFixture {
            at: Location::new(0, 0),
            target: Location::new(50, 50),
        };
        let mut ctx = MockContext::for_behavior(&stray, Location::new(0, 0));
        assert_eq!(
            stray.propagate(&mut ctx),
            Err(StepError::UndeclaredLocation {
                component: ComponentId(0),
                location: Location::new(50, 50),
            })
        );
    }
}
