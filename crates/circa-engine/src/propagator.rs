//! The event-driven simulator.
//!
//! [`Simulator`] owns a tree of simulation states rooted at one circuit
//! of a [`Design`] and a time-ordered queue of pending value changes.
//! Each [`propagate()`](Simulator::propagate) drains the queue batch by
//! batch: the events of the earliest time are applied to their
//! locations' driver lists, and the resulting dirty points and dirty
//! components are worked off in alternation (across every nested state)
//! until nothing is dirty. Components only schedule future events, so
//! each batch settles before simulated time advances.
//!
//! # Ownership model
//!
//! The design is borrowed per call rather than owned: the editor keeps
//! it and may change it between calls. Every state remembers the
//! journal revision and wire generation it last saw and catches up at
//! the start of the next call.
//!
//! # Oscillation
//!
//! A call processes at most [`SimConfig::iteration_limit`] batches. If
//! events are still pending after that, the call returns normally with
//! [`is_oscillating()`](Simulator::is_oscillating) set; the locations
//! touched during the last quarter of the budget are available from
//! [`oscillation_points()`](Simulator::oscillation_points). Pending
//! events stay queued, so a later call continues where this one stopped.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use circa_circuit::{
    BundleMap, Capability, Change, Circuit, Component, ComponentKind, Design, PortDirection,
    SubcircuitSpec,
};
use circa_core::{
    CircuitId, ComponentId, Location, SimTime, StateId, StepError, Value,
};
use indexmap::IndexSet;

use crate::config::{ConfigError, SimConfig};
use crate::context::{read, StepContext};
use crate::event::{Event, Scheduler};
use crate::metrics::StepMetrics;
use crate::state::StateTree;
use crate::wiring;

// Compile-time assertion: a Simulator can move to a simulation thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulator>();
    }
};

// ── Simulator ────────────────────────────────────────────────────

/// Simulation of one root circuit and every subcircuit below it.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulator::new(&design, root, SimConfig::default())?;
/// sim.propagate(&design)?;
/// assert_eq!(sim.value_at(probe_location), Value::TRUE);
/// ```
pub struct Simulator {
    config: SimConfig,
    tree: StateTree,
    scheduler: Scheduler,
    oscillating: bool,
    oscillation_points: IndexSet<(StateId, Location)>,
    ticks: u64,
    metrics: StepMetrics,
}

impl Simulator {
    /// Create a simulator for circuit `root` of `design`.
    ///
    /// Every component starts dirty; nothing is evaluated until the
    /// first [`propagate()`](Simulator::propagate).
    pub fn new(design: &Design, root: CircuitId, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let circuit = design
            .circuit(root)
            .ok_or(ConfigError::UnknownRoot { circuit: root })?;
        let mut tree = StateTree::new(root);
        let root_state = tree.root();
        if let Some(state) = tree.get_mut(root_state) {
            state.prime(circuit);
        }
        let scheduler = Scheduler::new(config.random_shift, config.seed);
        Ok(Self {
            config,
            tree,
            scheduler,
            oscillating: false,
            oscillation_points: IndexSet::new(),
            ticks: 0,
            metrics: StepMetrics::default(),
        })
    }

    /// Run until the queue is empty or the iteration limit is reached.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] on a contract violation: a broken splitter
    /// configuration, a component addressing an end it does not declare,
    /// or a state referring to a circuit missing from `design`. The step
    /// is abandoned where the violation was found.
    pub fn propagate(&mut self, design: &Design) -> Result<StepMetrics, StepError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        self.oscillating = false;
        self.oscillation_points.clear();

        self.catch_up(design)?;
        self.settle(design, &mut metrics)?;

        let limit = self.config.iteration_limit;
        let threshold = self.config.record_threshold();
        while let Some(time) = self.scheduler.queue.peek_time() {
            if metrics.iterations >= limit {
                self.oscillating = true;
                log::warn!(
                    "oscillation: {} events still pending after {limit} iterations at {time}",
                    self.scheduler.queue.len()
                );
                break;
            }
            metrics.iterations += 1;
            let record = metrics.iterations >= threshold;
            self.scheduler.now = time;
            let batch = self.scheduler.queue.pop_batch(time);
            log::trace!("{time}: applying {} events", batch.len());
            for event in &batch {
                if self.apply(design, event) {
                    metrics.events_applied += 1;
                }
                if record {
                    self.oscillation_points
                        .insert((event.state, event.location));
                }
            }
            self.settle(design, &mut metrics)?;
        }

        metrics.final_time = self.scheduler.now;
        metrics.oscillation_points = self.oscillation_points.len();
        metrics.total_us = start.elapsed().as_micros() as u64;
        self.metrics = metrics.clone();
        Ok(metrics)
    }

    /// Ask every clock in the tree for its level at tick `ticks`.
    ///
    /// Clocks whose output changes are marked dirty; the change reaches
    /// the circuit on the next [`propagate()`](Simulator::propagate).
    /// Returns how many clocks changed.
    pub fn tick(&mut self, design: &Design, ticks: u64) -> Result<usize, StepError> {
        self.catch_up(design)?;
        self.ticks = ticks;
        let mut changed = 0;
        for s in self.tree.preorder() {
            let Some(circuit_id) = self.tree.get(s).map(|st| st.circuit) else {
                continue;
            };
            let circuit = design.require(circuit_id)?;
            for (id, component) in circuit.components_with(Capability::DrivesClock) {
                let Some(behavior) = component.behavior() else {
                    continue;
                };
                let state = self
                    .tree
                    .get_mut(s)
                    .ok_or(StepError::UnknownState { state: s })?;
                let mut ctx = StepContext {
                    component: id,
                    ends: component.ends(),
                    circuit,
                    state_id: s,
                    state,
                    scheduler: &mut self.scheduler,
                };
                if behavior.tick(&mut ctx, ticks)? {
                    ctx.state.dirty_components.insert(id);
                    changed += 1;
                }
            }
        }
        log::trace!("tick {ticks}: {changed} clocks changed");
        Ok(changed)
    }

    /// Advance the clocks by one tick and propagate.
    pub fn step_clock(&mut self, design: &Design) -> Result<StepMetrics, StepError> {
        self.tick(design, self.ticks + 1)?;
        self.propagate(design)
    }

    /// Discard every value, driver, data blob, pending event, and nested
    /// state, rewind time to zero, and mark everything dirty.
    pub fn reset(&mut self, design: &Design) -> Result<(), StepError> {
        self.scheduler.clear();
        self.tree.reset();
        self.oscillating = false;
        self.oscillation_points.clear();
        self.ticks = 0;
        let root = self.tree.root();
        let state = self
            .tree
            .get_mut(root)
            .ok_or(StepError::UnknownState { state: root })?;
        state.prime(design.require(state.circuit)?);
        log::debug!("simulation reset");
        Ok(())
    }

    /// Drive input pin `pin` of the root circuit with `value`, as an
    /// enclosing instance would. Takes effect on the next propagate.
    pub fn drive(&mut self, pin: ComponentId, value: Value) {
        let root = self.tree.root();
        if let Some(state) = self.tree.get_mut(root) {
            if state.external.insert(pin, value) != Some(value) {
                state.dirty_components.insert(pin);
            }
        }
    }

    /// Stop driving `pin`; it falls back to its own value.
    pub fn release(&mut self, pin: ComponentId) {
        let root = self.tree.root();
        if let Some(state) = self.tree.get_mut(root) {
            if state.external.shift_remove(&pin).is_some() {
                state.dirty_components.insert(pin);
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Whether the last propagate hit the iteration limit.
    pub fn is_oscillating(&self) -> bool {
        self.oscillating
    }

    /// Locations that kept changing near the end of an oscillating
    /// propagate, with the state they belong to.
    pub fn oscillation_points(&self) -> impl Iterator<Item = (StateId, Location)> + '_ {
        self.oscillation_points.iter().copied()
    }

    /// Resolved value at `loc` in the root circuit; `NIL` where nothing
    /// drives or connects.
    pub fn value_at(&self, loc: Location) -> Value {
        self.tree
            .get(self.tree.root())
            .and_then(|s| s.value(loc))
            .unwrap_or(Value::NIL)
    }

    /// Resolved value at `loc` in the nested state reached by following
    /// subcircuit instances `path` from the root. `None` if the path
    /// does not name a live state.
    pub fn value_at_in(&self, path: &[ComponentId], loc: Location) -> Option<Value> {
        let state = self.tree.get(self.tree.resolve(path)?)?;
        Some(state.value(loc).unwrap_or(Value::NIL))
    }

    /// The state reached by following `path` from the root.
    pub fn state_at(&self, path: &[ComponentId]) -> Option<StateId> {
        self.tree.resolve(path)
    }

    /// The root state.
    pub fn root_state(&self) -> StateId {
        self.tree.root()
    }

    /// Number of live states, the root included.
    pub fn state_count(&self) -> usize {
        self.tree.len()
    }

    /// Component `component`'s data blob in the root state, as `T`.
    pub fn data<T: Any>(&self, component: ComponentId) -> Option<&T> {
        self.data_in(&[], component)
    }

    /// Component `component`'s data blob in the state at `path`, as `T`.
    pub fn data_in<T: Any>(&self, path: &[ComponentId], component: ComponentId) -> Option<&T> {
        let state = self.tree.get(self.tree.resolve(path)?)?;
        state.data.get(&component)?.downcast_ref::<T>()
    }

    /// Simulated time of the last applied batch.
    pub fn current_time(&self) -> SimTime {
        self.scheduler.now
    }

    /// Events still queued.
    pub fn pending_events(&self) -> usize {
        self.scheduler.queue.len()
    }

    /// Tick count last passed to [`tick()`](Simulator::tick).
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Counters of the most recent propagate.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// The configuration this simulator was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ── Internals ────────────────────────────────────────────────

    /// Replay each state's circuit journal since its last visit.
    fn catch_up(&mut self, design: &Design) -> Result<(), StepError> {
        for s in self.tree.preorder() {
            let Some(state) = self.tree.get_mut(s) else {
                continue;
            };
            let circuit = design.require(state.circuit)?;
            let Some(changes) = circuit.changes_since(state.seen_revision) else {
                log::debug!("{s}: fell behind the journal, resyncing");
                let doomed = state.resync(circuit);
                state.seen_revision = circuit.revision();
                state.seen_generation = circuit.generation();
                for child in doomed {
                    self.tree.remove_subtree(child);
                }
                continue;
            };
            let mut doomed = Vec::new();
            for change in changes {
                match change {
                    Change::ComponentAdded(id) => {
                        state.dirty_components.insert(*id);
                    }
                    Change::ComponentRemoved { id, ends } => {
                        state.data.shift_remove(id);
                        state.external.shift_remove(id);
                        state.dirty_components.shift_remove(id);
                        let driven = state.withdraw(*id);
                        state.dirty_points.extend(driven);
                        state.dirty_points.extend(ends.iter().copied());
                        if let Some(child) = state.substates.shift_remove(id) {
                            doomed.push(child);
                        }
                    }
                    Change::WireChanged { ends } => {
                        state.dirty_points.extend(ends.iter().copied());
                    }
                }
            }
            if !changes.is_empty() {
                log::debug!("{s}: caught up with {} changes", changes.len());
            }
            state.seen_revision = circuit.revision();
            if state.seen_generation != circuit.generation() {
                state.seen_generation = circuit.generation();
                state.rewire = true;
            }
            for child in doomed {
                self.tree.remove_subtree(child);
            }
        }
        Ok(())
    }

    /// Record one event in its state's driver list. Events for states
    /// or drivers that no longer exist are dropped.
    fn apply(&mut self, design: &Design, event: &Event) -> bool {
        let Some(state) = self.tree.get_mut(event.state) else {
            return false;
        };
        let live = design
            .circuit(state.circuit)
            .is_some_and(|c| c.component(event.driver).is_some());
        if !live {
            return false;
        }
        let before = state.raw_value(event.location);
        state.set_cause(event.location, event.driver, event.value);
        if state.raw_value(event.location) != before {
            state.dirty_points.insert(event.location);
        }
        true
    }

    /// Alternate point resolution and component propagation over the
    /// whole tree until nothing is dirty.
    fn settle(&mut self, design: &Design, metrics: &mut StepMetrics) -> Result<(), StepError> {
        loop {
            let order = self.tree.preorder();
            let mut busy = false;
            for &s in &order {
                busy |= self.resolve_state(design, s, metrics)?;
            }
            for &s in &order {
                busy |= self.run_components(design, s, metrics)?;
            }
            if !busy {
                return Ok(());
            }
        }
    }

    fn resolve_state(
        &mut self,
        design: &Design,
        s: StateId,
        metrics: &mut StepMetrics,
    ) -> Result<bool, StepError> {
        let Some(state) = self.tree.get_mut(s) else {
            return Ok(false);
        };
        if !state.rewire && state.dirty_points.is_empty() {
            return Ok(false);
        }
        let circuit = design.require(state.circuit)?;
        let map = snapshot(circuit, state.circuit)?;
        let mut points: Vec<Location> = state.dirty_points.drain(..).collect();
        if std::mem::take(&mut state.rewire) {
            points.extend(map.points());
        }
        wiring::resolve_points(state, circuit, &map, points);
        metrics.wire_passes += 1;
        Ok(true)
    }

    fn run_components(
        &mut self,
        design: &Design,
        s: StateId,
        metrics: &mut StepMetrics,
    ) -> Result<bool, StepError> {
        let Some(state) = self.tree.get_mut(s) else {
            return Ok(false);
        };
        if state.dirty_components.is_empty() {
            return Ok(false);
        }
        let circuit_id = state.circuit;
        let dirty = std::mem::take(&mut state.dirty_components);
        let circuit = design.require(circuit_id)?;
        for id in dirty {
            let Some(component) = circuit.component(id) else {
                continue;
            };
            match component.kind() {
                ComponentKind::Leaf(behavior) => {
                    let state = self
                        .tree
                        .get_mut(s)
                        .ok_or(StepError::UnknownState { state: s })?;
                    let mut ctx = StepContext {
                        component: id,
                        ends: component.ends(),
                        circuit,
                        state_id: s,
                        state,
                        scheduler: &mut self.scheduler,
                    };
                    behavior.propagate(&mut ctx)?;
                    let parent = ctx.state.parent;
                    if component.port_direction() == Some(PortDirection::Output) {
                        if let Some((parent, instance)) = parent {
                            if let Some(p) = self.tree.get_mut(parent) {
                                p.dirty_components.insert(instance);
                            }
                        }
                    }
                }
                ComponentKind::Splitter(_) => continue,
                ComponentKind::Subcircuit(spec) => {
                    self.run_instance(design, s, id, component, circuit, spec)?;
                }
            }
            metrics.component_propagations += 1;
        }
        Ok(true)
    }

    /// Exchange port values between instance `id` in state `s` and its
    /// child state, creating the child on first use.
    fn run_instance(
        &mut self,
        design: &Design,
        s: StateId,
        id: ComponentId,
        component: &Component,
        circuit: &Circuit,
        spec: &SubcircuitSpec,
    ) -> Result<(), StepError> {
        let child_circuit = design.require(spec.circuit)?;
        let child = self.tree.child_of(s, id, child_circuit, spec.circuit);
        let ends = component.ends();
        for (i, port) in spec.ports.iter().enumerate() {
            let end = ends.get(i).ok_or(StepError::PortOutOfRange {
                component: id,
                port: i,
                ports: ends.len(),
            })?;
            match port.direction {
                PortDirection::Input => {
                    let parent = self.tree.get(s).ok_or(StepError::UnknownState { state: s })?;
                    let value = read(parent, circuit, end.location);
                    let child_state = self
                        .tree
                        .get_mut(child)
                        .ok_or(StepError::UnknownState { state: child })?;
                    if child_state.external.insert(port.pin, value) != Some(value) {
                        child_state.dirty_components.insert(port.pin);
                    }
                }
                PortDirection::Output => {
                    let child_state = self
                        .tree
                        .get(child)
                        .ok_or(StepError::UnknownState { state: child })?;
                    let value = read(child_state, child_circuit, port.pin_location);
                    self.scheduler
                        .schedule(s, end.location, id, value, 1, false);
                }
            }
        }
        Ok(())
    }
}

/// The complete snapshot for `circuit`. A placeholder published by a
/// failed computation on another thread is retried once, which either
/// succeeds or reports the failure here.
fn snapshot(circuit: &Circuit, id: CircuitId) -> Result<Arc<BundleMap>, StepError> {
    let wrap = |source| StepError::Connectivity { circuit: id, source };
    let map = circuit.connectivity().map_err(wrap)?;
    if map.is_complete() {
        return Ok(map);
    }
    circuit.connectivity().map_err(wrap)
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("states", &self.tree.len())
            .field("time", &self.scheduler.now)
            .field("pending_events", &self.scheduler.queue.len())
            .field("oscillating", &self.oscillating)
            .finish()
    }
}
