//! Reusable behaviour fixtures.
//!
//! Four small leaf behaviours for engine and circuit tests. Each
//! declares its ends at absolute locations (the anchor is ignored), so a
//! test can place them exactly where its wires end:
//!
//! - [`SourceFixture`] drives a constant on one output end.
//! - [`SinkFixture`] reads one input end and keeps the last value seen.
//! - [`RelayFixture`] copies its input to its output after a delay and
//!   counts its propagations.
//! - [`StrayFixture`] drives a location it never declared.

use std::sync::atomic::{AtomicUsize, Ordering};

use circa_circuit::{Behavior, Capabilities, Capability, EndData, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// Drives `value` on a single output end.
pub struct SourceFixture {
    pub at: Location,
    pub value: Value,
}

impl SourceFixture {
    pub fn new(at: Location, value: Value) -> Self {
        Self { at, value }
    }
}

impl Behavior for SourceFixture {
    fn name(&self) -> &str {
        "SourceFixture"
    }

    fn ends(&self, _anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::output(self.at, self.value.width())]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY.with(Capability::Combinational)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        ctx.set_port(0, self.value, 1)
    }
}

/// Reads one input end; the last value seen is its data blob.
pub struct SinkFixture {
    pub at: Location,
    pub width: BitWidth,
}

impl SinkFixture {
    pub fn new(at: Location, width: BitWidth) -> Self {
        Self { at, width }
    }
}

impl Behavior for SinkFixture {
    fn name(&self) -> &str {
        "SinkFixture"
    }

    fn ends(&self, _anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::input(self.at, self.width)]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY.with(Capability::StatefulData)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        let seen = ctx.port(0)?;
        ctx.set_data(Box::new(seen));
        Ok(())
    }
}

/// Copies its input to its output after `delay`.
///
/// Uses an `AtomicUsize` for the call counter so it satisfies `Sync`;
/// keep an `Arc` to the fixture to read [`calls()`](RelayFixture::calls).
pub struct RelayFixture {
    pub input: Location,
    pub output: Location,
    pub width: BitWidth,
    pub delay: u32,
    call_count: AtomicUsize,
}

impl RelayFixture {
    pub fn new(input: Location, output: Location, width: BitWidth, delay: u32) -> Self {
        Self {
            input,
            output,
            width,
            delay,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `propagate()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Behavior for RelayFixture {
    fn name(&self) -> &str {
        "RelayFixture"
    }

    fn ends(&self, _anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![
            EndData::input(self.input, self.width),
            EndData::output(self.output, self.width),
        ]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::EMPTY.with(Capability::Combinational)
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let v = ctx.port(0)?;
        ctx.set_port(1, v, self.delay)
    }
}

/// Declares one end at `at` but drives `target`.
pub struct StrayFixture {
    pub at: Location,
    pub target: Location,
}

impl Behavior for StrayFixture {
    fn name(&self) -> &str {
        "StrayFixture"
    }

    fn ends(&self, _anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![EndData::output(self.at, BitWidth::ONE)]
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        ctx.set_value(self.target, Value::TRUE, 1)
    }
}
