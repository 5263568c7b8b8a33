//! A design: the set of circuits that may instantiate one another.

use circa_core::{CircuitId, ComponentId, EditError, Location, StepError};
use indexmap::{IndexMap, IndexSet};

use crate::action::EditAction;
use crate::circuit::Circuit;
use crate::component::{Component, SubcircuitSpec};

/// Arena of circuits addressed by [`CircuitId`].
#[derive(Debug, Default)]
pub struct Design {
    circuits: IndexMap<CircuitId, Circuit>,
    next_id: u32,
}

impl Design {
    /// An empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty circuit.
    pub fn add_circuit(&mut self, name: impl Into<String>) -> CircuitId {
        let id = CircuitId(self.next_id);
        self.next_id += 1;
        self.circuits.insert(id, Circuit::new(name));
        id
    }

    /// Circuit by id.
    pub fn circuit(&self, id: CircuitId) -> Option<&Circuit> {
        self.circuits.get(&id)
    }

    /// Mutable circuit by id, for edits.
    pub fn circuit_mut(&mut self, id: CircuitId) -> Option<&mut Circuit> {
        self.circuits.get_mut(&id)
    }

    /// Circuit by id, as a simulation step needs it.
    pub fn require(&self, id: CircuitId) -> Result<&Circuit, StepError> {
        self.circuit(id)
            .ok_or(StepError::UnknownCircuit { circuit: id })
    }

    /// All circuits in creation order.
    pub fn circuits(&self) -> impl Iterator<Item = (CircuitId, &Circuit)> {
        self.circuits.iter().map(|(&id, c)| (id, c))
    }

    /// Whether `outer` is `inner` or instantiates it at any depth.
    pub fn contains(&self, outer: CircuitId, inner: CircuitId) -> bool {
        let mut seen: IndexSet<CircuitId> = IndexSet::new();
        let mut stack = vec![outer];
        while let Some(id) = stack.pop() {
            if id == inner {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(c) = self.circuits.get(&id) {
                stack.extend(
                    c.components()
                        .filter_map(|(_, comp)| comp.as_subcircuit().map(|s| s.circuit)),
                );
            }
        }
        false
    }

    /// Place an instance of `child` in `parent` at `anchor`.
    ///
    /// The instance's ends mirror the child's port pins, ordered by
    /// location and offset so the first port sits on `anchor`. The ends
    /// are fixed at placement time.
    pub fn instantiate(
        &mut self,
        parent: CircuitId,
        child: CircuitId,
        anchor: Location,
    ) -> Result<(ComponentId, EditAction), EditError> {
        let ports = self
            .circuit(child)
            .ok_or(EditError::UnknownCircuit { circuit: child })?
            .ports();
        if !self.circuits.contains_key(&parent) {
            return Err(EditError::UnknownCircuit { circuit: parent });
        }
        if self.contains(child, parent) {
            return Err(EditError::RecursiveSubcircuit { parent, child });
        }
        let spec = SubcircuitSpec {
            circuit: child,
            ports,
        };
        let target = self
            .circuits
            .get_mut(&parent)
            .ok_or(EditError::UnknownCircuit { circuit: parent })?;
        Ok(target.add_component(Component::subcircuit(anchor, spec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::PortDirection;
    use crate::end::EndData;
    use crate::testing::Stub;
    use circa_core::BitWidth;

    fn with_pins(design: &mut Design, id: CircuitId) {
        let c = design.circuit_mut(id).unwrap();
        let a = Location::new(0, 0);
        let b = Location::new(60, 0);
        c.add_component(Component::leaf(
            a,
            Stub::new(vec![EndData::output(a, BitWidth::ONE)]).with_port(PortDirection::Input),
        ));
        c.add_component(Component::leaf(
            b,
            Stub::new(vec![EndData::input(b, BitWidth::ONE)]).with_port(PortDirection::Output),
        ));
    }

    #[test]
    fn instance_ends_follow_child_ports() {
        let mut d = Design::new();
        let top = d.add_circuit("top");
        let half = d.add_circuit("half");
        with_pins(&mut d, half);
        let (id, _) = d.instantiate(top, half, Location::new(200, 100)).unwrap();
        let inst = d.circuit(top).unwrap().component(id).unwrap();
        let ends: Vec<Location> = inst.ends().iter().map(|e| e.location).collect();
        assert_eq!(ends, vec![Location::new(200, 100), Location::new(260, 100)]);
        assert!(d.contains(top, half));
        assert!(!d.contains(half, top));
    }

    #[test]
    fn recursion_is_rejected() {
        let mut d = Design::new();
        let a = d.add_circuit("a");
        let b = d.add_circuit("b");
        d.instantiate(a, b, Location::new(0, 0)).unwrap();
        assert_eq!(
            d.instantiate(b, a, Location::new(0, 0)).unwrap_err(),
            EditError::RecursiveSubcircuit { parent: b, child: a }
        );
        assert_eq!(
            d.instantiate(a, a, Location::new(0, 0)).unwrap_err(),
            EditError::RecursiveSubcircuit { parent: a, child: a }
        );
    }

    #[test]
    fn unknown_circuits() {
        let mut d = Design::new();
        let a = d.add_circuit("a");
        assert_eq!(
            d.instantiate(a, CircuitId(9), Location::new(0, 0)).unwrap_err(),
            EditError::UnknownCircuit { circuit: CircuitId(9) }
        );
        assert!(d.require(CircuitId(9)).is_err());
    }
}
