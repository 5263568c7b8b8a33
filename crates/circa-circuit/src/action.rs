//! Reversible descriptions of circuit edits.

use circa_core::ComponentId;
use indexmap::{IndexMap, IndexSet};

use crate::component::{Component, Element};
use crate::wire::Wire;

/// What an edit did to a circuit.
///
/// Requested changes and incidental ones (wires split or merged to keep
/// the wire set canonical) are listed separately, so a caller can
/// highlight what the user asked for while undo restores the exact prior
/// layout. Non-wire components touched by the edit are carried along, so
/// [`EditAction::inverse`] can re-insert a removed component under its
/// original identifier.
#[derive(Clone, Debug, Default)]
pub struct EditAction {
    additions: Vec<Element>,
    removals: Vec<Element>,
    incidental_additions: Vec<Wire>,
    incidental_removals: Vec<Wire>,
    components: IndexMap<ComponentId, Component>,
}

impl EditAction {
    /// An action that does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements the caller asked to add.
    pub fn additions(&self) -> &[Element] {
        &self.additions
    }

    /// Elements the caller asked to remove.
    pub fn removals(&self) -> &[Element] {
        &self.removals
    }

    /// Wires added as a side effect.
    pub fn incidental_additions(&self) -> &[Wire] {
        &self.incidental_additions
    }

    /// Wires removed as a side effect.
    pub fn incidental_removals(&self) -> &[Wire] {
        &self.incidental_removals
    }

    /// The carried copy of component `id`.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub(crate) fn push_addition(&mut self, element: Element) {
        self.additions.push(element);
    }

    pub(crate) fn push_removal(&mut self, element: Element) {
        self.removals.push(element);
    }

    pub(crate) fn push_incidental_addition(&mut self, wire: Wire) {
        self.incidental_additions.push(wire);
    }

    pub(crate) fn push_incidental_removal(&mut self, wire: Wire) {
        self.incidental_removals.push(wire);
    }

    pub(crate) fn carry(&mut self, id: ComponentId, component: Component) {
        self.components.insert(id, component);
    }

    fn all_added(&self) -> IndexSet<Element> {
        self.additions
            .iter()
            .copied()
            .chain(self.incidental_additions.iter().map(|&w| Element::Wire(w)))
            .collect()
    }

    fn all_removed(&self) -> IndexSet<Element> {
        self.removals
            .iter()
            .copied()
            .chain(self.incidental_removals.iter().map(|&w| Element::Wire(w)))
            .collect()
    }

    /// Elements present after the action that were absent before.
    pub fn net_additions(&self) -> Vec<Element> {
        let removed = self.all_removed();
        self.all_added()
            .into_iter()
            .filter(|e| !removed.contains(e))
            .collect()
    }

    /// Elements absent after the action that were present before.
    pub fn net_removals(&self) -> Vec<Element> {
        let added = self.all_added();
        self.all_removed()
            .into_iter()
            .filter(|e| !added.contains(e))
            .collect()
    }

    /// Whether the action changes nothing.
    pub fn is_empty(&self) -> bool {
        self.net_additions().is_empty() && self.net_removals().is_empty()
    }

    /// Compose: `self` followed by `other`.
    pub fn append(&mut self, other: EditAction) {
        self.additions.extend(other.additions);
        self.removals.extend(other.removals);
        self.incidental_additions.extend(other.incidental_additions);
        self.incidental_removals.extend(other.incidental_removals);
        for (id, c) in other.components {
            self.components.entry(id).or_insert(c);
        }
    }

    /// The action that undoes this one.
    pub fn inverse(&self) -> EditAction {
        EditAction {
            additions: self.removals.clone(),
            removals: self.additions.clone(),
            incidental_additions: self.incidental_removals.clone(),
            incidental_removals: self.incidental_additions.clone(),
            components: self.components.clone(),
        }
    }
}
