//! A single circuit: its component arena, wire set, and derived indexes.

use std::sync::Arc;

use circa_core::{BitWidth, ComponentId, ConnectivityError, Generation, Location, Revision};
use indexmap::{IndexMap, IndexSet};

use crate::action::EditAction;
use crate::behavior::{Capability, PortDirection};
use crate::component::{Component, Element, SubcircuitPort};
use crate::connectivity::{self, BundleMap};
use crate::points::{PointsIndex, WidthIncompatibility};
use crate::repair;
use crate::snapshot::SnapshotCell;
use crate::wire::Wire;

/// Journal entries a circuit keeps. Readers that fall further behind
/// than this see [`Circuit::changes_since`] return `None`.
pub const JOURNAL_CAPACITY: usize = 256;

/// One entry of a circuit's change journal.
///
/// Simulation states replay the journal from the last revision they saw
/// to bring their dirty sets and substates up to date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// A component was inserted.
    ComponentAdded(ComponentId),
    /// A component was removed; `ends` are its former end locations.
    ComponentRemoved {
        /// The removed component.
        id: ComponentId,
        /// Where its ends were.
        ends: Vec<Location>,
    },
    /// A wire was inserted or removed between these endpoints.
    WireChanged {
        /// Both endpoints.
        ends: [Location; 2],
    },
}

// ── Circuit ─────────────────────────────────────────────────────

/// A schematic graph of components and wires.
///
/// Every edit goes through the wire canonicalizer, so the wire set stays
/// non-overlapping and maximally merged, and returns an [`EditAction`]
/// describing exactly what changed. Connectivity is derived lazily and
/// cached per [`Generation`]; [`Circuit::connectivity`] may be called
/// from several threads at once.
#[derive(Debug, Default)]
pub struct Circuit {
    name: String,
    components: IndexMap<ComponentId, Component>,
    wires: IndexSet<Wire>,
    points: PointsIndex,
    next_id: u32,
    generation: Generation,
    journal_base: u64,
    journal: Vec<Change>,
    snapshot: SnapshotCell,
}

impl Circuit {
    /// An empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Edits ───────────────────────────────────────────────────

    /// Place a component, splitting any wire passing through one of its
    /// ends.
    pub fn add_component(&mut self, component: Component) -> (ComponentId, EditAction) {
        let id = ComponentId(self.next_id);
        let ends: Vec<Location> = component.ends().iter().map(|e| e.location).collect();
        log::debug!(
            "{}: add {} {} at {}",
            self.name,
            component.name(),
            id,
            component.location()
        );
        let mut action = EditAction::new();
        action.carry(id, component.clone());
        action.push_addition(Element::Component(id));
        self.insert_component(id, component);
        repair::split_through(self, &ends, &IndexSet::new(), &mut action);
        (id, action)
    }

    /// Remove a component, merging wire pairs it was separating.
    pub fn remove_component(&mut self, id: ComponentId) -> EditAction {
        repair::remove(self, &[Element::Component(id)])
    }

    /// Add wires, canonicalizing the result.
    pub fn add_wires(&mut self, wires: &[Wire]) -> EditAction {
        let action = repair::add_wires(self, wires);
        log::debug!(
            "{}: add {} wires: +{} -{}",
            self.name,
            wires.len(),
            action.net_additions().len(),
            action.net_removals().len()
        );
        action
    }

    /// Remove wires, merging collinear pairs left meeting end to end.
    pub fn remove_wires(&mut self, wires: &[Wire]) -> EditAction {
        let elements: Vec<Element> = wires.iter().map(|&w| Element::Wire(w)).collect();
        repair::remove(self, &elements)
    }

    /// Remove any mix of wires and components.
    pub fn remove(&mut self, elements: &[Element]) -> EditAction {
        repair::remove(self, elements)
    }

    /// Shorten a wire by dragging one endpoint inwards; `drag` is the
    /// part being cut away. `None` when `drag` does not shorten any wire.
    pub fn shorten_wire(&mut self, drag: Wire) -> Option<EditAction> {
        repair::shorten(self, drag)
    }

    /// Replay a recorded action, e.g. the [`EditAction::inverse`] of a
    /// previous edit for undo.
    pub fn apply(&mut self, action: &EditAction) {
        for element in action.net_removals() {
            match element {
                Element::Wire(w) => {
                    self.delete_wire(w);
                }
                Element::Component(id) => {
                    self.delete_component(id);
                }
            }
        }
        for element in action.net_additions() {
            match element {
                Element::Wire(w) => self.insert_wire(w),
                Element::Component(id) => match action.component(id) {
                    Some(c) if !self.components.contains_key(&id) => {
                        self.insert_component(id, c.clone());
                    }
                    Some(_) => {}
                    None => log::warn!("{}: action does not carry {id}", self.name),
                },
            }
        }
        log::debug!("{}: applied action, generation {}", self.name, self.generation);
    }

    // ── Primitive mutations ─────────────────────────────────────

    fn bump(&mut self, change: Change) {
        self.journal.push(change);
        if self.journal.len() > 2 * JOURNAL_CAPACITY {
            let excess = self.journal.len() - JOURNAL_CAPACITY;
            self.journal.drain(..excess);
            self.journal_base += excess as u64;
            log::trace!("{}: journal trimmed to revision {}", self.name, self.journal_base);
        }
        self.generation = self.generation.next();
        self.snapshot.invalidate();
    }

    pub(crate) fn insert_wire(&mut self, wire: Wire) {
        if self.wires.insert(wire) {
            self.points.add_wire(wire);
            self.bump(Change::WireChanged { ends: wire.ends() });
        }
    }

    pub(crate) fn delete_wire(&mut self, wire: Wire) -> bool {
        if self.wires.shift_remove(&wire) {
            self.points.remove_wire(wire);
            self.bump(Change::WireChanged { ends: wire.ends() });
            true
        } else {
            false
        }
    }

    pub(crate) fn insert_component(&mut self, id: ComponentId, component: Component) {
        self.next_id = self.next_id.max(id.0 + 1);
        self.points.add_component(id, component.ends());
        self.components.insert(id, component);
        self.bump(Change::ComponentAdded(id));
    }

    pub(crate) fn delete_component(&mut self, id: ComponentId) -> Option<Component> {
        let component = self.components.shift_remove(&id)?;
        self.points.remove_component(id, component.ends());
        let ends = component.ends().iter().map(|e| e.location).collect();
        self.bump(Change::ComponentRemoved { id, ends });
        Some(component)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Component by id.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    /// All components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components.iter().map(|(&id, c)| (id, c))
    }

    /// Components advertising `cap`.
    pub fn components_with(&self, cap: Capability) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components().filter(move |(_, c)| c.has(cap))
    }

    /// Number of components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// All wires in insertion order.
    pub fn wires(&self) -> impl Iterator<Item = Wire> + '_ {
        self.wires.iter().copied()
    }

    /// Whether exactly this wire is present.
    pub fn has_wire(&self, wire: &Wire) -> bool {
        self.wires.contains(wire)
    }

    /// Wires ending at `loc`.
    pub fn wires_at(&self, loc: Location) -> Vec<Wire> {
        self.points.wires_at(loc)
    }

    /// Components with an end at `loc`.
    pub fn components_at(&self, loc: Location) -> Vec<ComponentId> {
        self.points.components_at(loc)
    }

    /// The points index.
    pub fn points(&self) -> &PointsIndex {
        &self.points
    }

    /// Resolved width at `loc`.
    pub fn width_at(&self, loc: Location) -> BitWidth {
        self.points.width(loc)
    }

    /// Element that fixed the width at `loc`.
    pub fn width_determinant_at(&self, loc: Location) -> Option<Element> {
        self.points.width_determinant(loc)
    }

    /// Component claiming exclusive output use of `loc`; `None` if two
    /// or more components claim it.
    pub fn exclusive_owner_at(&self, loc: Location) -> Option<ComponentId> {
        self.points.exclusive_owner(loc)
    }

    /// Locations where ends disagree on width.
    pub fn width_incompatibilities(&self) -> Vec<WidthIncompatibility> {
        self.points.width_incompatibilities()
    }

    /// Branch points wires may not run through.
    pub fn split_locations(&self) -> Vec<Location> {
        self.points.split_locations()
    }

    /// Ports a subcircuit instance of this circuit exposes: every pin
    /// with a port direction, ordered by location.
    pub fn ports(&self) -> Vec<SubcircuitPort> {
        let mut ports: Vec<SubcircuitPort> = self
            .components()
            .filter_map(|(id, c)| {
                let direction: PortDirection = c.port_direction()?;
                let end = c.ends().first()?;
                Some(SubcircuitPort {
                    pin: id,
                    pin_location: end.location,
                    direction,
                    width: end.width,
                })
            })
            .collect();
        ports.sort_by_key(|p| (p.pin_location, p.pin));
        ports
    }

    /// Edit count of the graph; keys connectivity snapshots.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of changes ever journaled.
    pub fn revision(&self) -> Revision {
        Revision(self.journal_base + self.journal.len() as u64)
    }

    /// Changes recorded after `revision`, or `None` when some of them
    /// have already been dropped from the journal.
    pub fn changes_since(&self, revision: Revision) -> Option<&[Change]> {
        let start = revision.0.checked_sub(self.journal_base)?;
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(self.journal.len());
        Some(&self.journal[start..])
    }

    /// The connectivity snapshot for the current generation, computing
    /// it if needed. Concurrent callers share a single computation.
    pub fn connectivity(&self) -> Result<Arc<BundleMap>, ConnectivityError> {
        self.snapshot
            .get_or_compute(self.generation, || connectivity::compute(self))
            .inspect_err(|e| log::warn!("{}: connectivity failed: {e}", self.name))
    }

    /// The current snapshot if one is already published.
    pub fn cached_connectivity(&self) -> Option<Arc<BundleMap>> {
        self.snapshot.peek(self.generation)
    }
}
