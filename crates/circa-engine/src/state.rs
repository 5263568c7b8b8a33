//! Per-occurrence simulation state and the tree that owns it.
//!
//! Each occurrence of a circuit (the root, or one subcircuit instance
//! somewhere below it) has its own [`SimState`]: resolved values, the
//! drivers asserting each location, component data blobs, and dirty
//! sets. States live in a [`StateTree`] arena addressed by [`StateId`];
//! a parent refers to children by id, and a child names its parent and
//! the instance component it belongs to.

use std::any::Any;

use circa_circuit::Circuit;
use circa_core::{CircuitId, ComponentId, Generation, Location, Revision, StateId, Value};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

/// Drivers currently asserting a location, keyed by component.
pub(crate) type Causes = SmallVec<[(ComponentId, Value); 2]>;

// ── SimState ───────────────────────────────────────────────────────

pub(crate) struct SimState {
    pub circuit: CircuitId,
    pub parent: Option<(StateId, ComponentId)>,
    /// Wire-resolved values; absent means "nothing known here".
    pub values: IndexMap<Location, Value>,
    pub causes: IndexMap<Location, Causes>,
    pub data: IndexMap<ComponentId, Box<dyn Any + Send>>,
    pub dirty_components: IndexSet<ComponentId>,
    pub dirty_points: IndexSet<Location>,
    pub substates: IndexMap<ComponentId, StateId>,
    /// Drives handed to input pins by the enclosing instance.
    pub external: IndexMap<ComponentId, Value>,
    /// Every bundle point must be re-resolved at the next wire pass.
    pub rewire: bool,
    pub seen_revision: Revision,
    pub seen_generation: Generation,
}

impl SimState {
    fn new(circuit: CircuitId, parent: Option<(StateId, ComponentId)>) -> Self {
        Self {
            circuit,
            parent,
            values: IndexMap::new(),
            causes: IndexMap::new(),
            data: IndexMap::new(),
            dirty_components: IndexSet::new(),
            dirty_points: IndexSet::new(),
            substates: IndexMap::new(),
            external: IndexMap::new(),
            rewire: true,
            seen_revision: Revision(0),
            seen_generation: Generation(0),
        }
    }

    /// Bring a fresh (or freshly cleared) state in line with `circuit`:
    /// everything is dirty.
    pub fn prime(&mut self, circuit: &Circuit) {
        self.dirty_components
            .extend(circuit.components().map(|(id, _)| id));
        self.rewire = true;
        self.seen_revision = circuit.revision();
        self.seen_generation = circuit.generation();
    }

    /// Forget all simulated values, keeping identity and parent link.
    fn clear(&mut self) {
        self.values.clear();
        self.causes.clear();
        self.data.clear();
        self.dirty_components.clear();
        self.dirty_points.clear();
        self.substates.clear();
        self.external.clear();
    }

    /// Combined output of every driver at `loc`; `NIL` if none.
    pub fn raw_value(&self, loc: Location) -> Value {
        self.causes
            .get(&loc)
            .map_or(Value::NIL, |c| c.iter().fold(Value::NIL, |acc, (_, v)| acc.combine(*v)))
    }

    /// Record `driver` asserting `value` at `loc`, replacing its earlier
    /// assertion. A `NIL` value withdraws the driver.
    pub fn set_cause(&mut self, loc: Location, driver: ComponentId, value: Value) {
        if value.is_nil() {
            if let Some(causes) = self.causes.get_mut(&loc) {
                causes.retain(|(d, _)| *d != driver);
                if causes.is_empty() {
                    self.causes.shift_remove(&loc);
                }
            }
            return;
        }
        let causes = self.causes.entry(loc).or_default();
        match causes.iter_mut().find(|(d, _)| *d == driver) {
            Some(slot) => slot.1 = value,
            None => causes.push((driver, value)),
        }
    }

    /// Drop every assertion of `driver`; returns the locations it drove.
    pub fn withdraw(&mut self, driver: ComponentId) -> Vec<Location> {
        let mut touched = Vec::new();
        self.causes.retain(|loc, causes| {
            let before = causes.len();
            causes.retain(|(d, _)| *d != driver);
            if causes.len() != before {
                touched.push(*loc);
            }
            !causes.is_empty()
        });
        touched
    }

    /// Resolved value at `loc`, or `None` if nothing has been resolved.
    pub fn value(&self, loc: Location) -> Option<Value> {
        self.values.get(&loc).copied()
    }

    /// Store a wire-resolved value; a change wakes every propagated
    /// component with an end at `loc`.
    pub fn set_value_by_wire(&mut self, circuit: &Circuit, loc: Location, value: Value) {
        let changed = if value.is_nil() {
            self.values.shift_remove(&loc).is_some()
        } else {
            self.values.insert(loc, value) != Some(value)
        };
        if changed {
            for id in circuit.components_at(loc) {
                if circuit.component(id).is_some_and(|c| c.is_propagated()) {
                    self.dirty_components.insert(id);
                }
            }
        }
    }

    /// Reconcile with `circuit` without its journal: drop everything
    /// held for components that no longer exist and mark all the rest
    /// dirty. Returns the substates of removed instances.
    pub fn resync(&mut self, circuit: &Circuit) -> Vec<StateId> {
        let gone = |id: &ComponentId| circuit.component(*id).is_none();
        let mut stale: IndexSet<ComponentId> =
            self.data.keys().filter(|id| gone(id)).copied().collect();
        stale.extend(self.external.keys().filter(|id| gone(id)));
        stale.extend(self.substates.keys().filter(|id| gone(id)));
        stale.extend(self.causes.values().flatten().map(|(d, _)| d).filter(|id| gone(id)));

        let mut doomed = Vec::new();
        for id in &stale {
            self.data.shift_remove(id);
            self.external.shift_remove(id);
            self.withdraw(*id);
            if let Some(child) = self.substates.shift_remove(id) {
                doomed.push(child);
            }
        }
        self.dirty_components.retain(|id| !gone(id));
        self.dirty_components.extend(circuit.components().map(|(id, _)| id));
        self.dirty_points.extend(self.values.keys().copied());
        self.dirty_points.extend(self.causes.keys().copied());
        self.rewire = true;
        doomed
    }
}

// ── StateTree ──────────────────────────────────────────────────────

/// Arena of simulation states rooted at one circuit.
pub(crate) struct StateTree {
    states: IndexMap<StateId, SimState>,
    root: StateId,
    next_id: u32,
}

impl StateTree {
    pub fn new(root_circuit: CircuitId) -> Self {
        let root = StateId(0);
        let mut states = IndexMap::new();
        states.insert(root, SimState::new(root_circuit, None));
        Self {
            states,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn get(&self, id: StateId) -> Option<&SimState> {
        self.states.get(&id)
    }

    pub fn get_mut(&mut self, id: StateId) -> Option<&mut SimState> {
        self.states.get_mut(&id)
    }

    /// The child state of instance `component` in `parent`, creating and
    /// priming it against `child` if it does not exist yet.
    pub fn child_of(
        &mut self,
        parent: StateId,
        component: ComponentId,
        child: &Circuit,
        child_id: CircuitId,
    ) -> StateId {
        if let Some(&id) = self
            .states
            .get(&parent)
            .and_then(|s| s.substates.get(&component))
        {
            return id;
        }
        let id = StateId(self.next_id);
        self.next_id += 1;
        let mut state = SimState::new(child_id, Some((parent, component)));
        state.prime(child);
        self.states.insert(id, state);
        if let Some(p) = self.states.get_mut(&parent) {
            p.substates.insert(component, id);
        }
        log::debug!("created {id} for {component} in {parent}");
        id
    }

    /// Remove `id` and everything below it.
    pub fn remove_subtree(&mut self, id: StateId) {
        let mut stack = vec![id];
        while let Some(s) = stack.pop() {
            if let Some(state) = self.states.shift_remove(&s) {
                stack.extend(state.substates.values().copied());
            }
        }
    }

    /// States in pre-order from the root.
    pub fn preorder(&self) -> Vec<StateId> {
        let mut order = Vec::with_capacity(self.states.len());
        let mut stack = vec![self.root];
        while let Some(s) = stack.pop() {
            if let Some(state) = self.states.get(&s) {
                order.push(s);
                stack.extend(state.substates.values().rev().copied());
            }
        }
        order
    }

    /// Follow instance components from the root.
    pub fn resolve(&self, path: &[ComponentId]) -> Option<StateId> {
        path.iter().try_fold(self.root, |s, c| {
            self.states.get(&s)?.substates.get(c).copied()
        })
    }

    /// Drop every child state and clear the root.
    pub fn reset(&mut self) {
        self.states.retain(|id, _| *id == self.root);
        if let Some(root) = self.states.get_mut(&self.root) {
            root.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
}
