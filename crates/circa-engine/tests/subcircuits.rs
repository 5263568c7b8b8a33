//! Subcircuit instances: port transfer in both directions and the
//! lifetime of child states.

use circa_circuit::{Component, Design, Wire};
use circa_components::{Not, Pin, Probe};
use circa_core::{BitWidth, CircuitId, ComponentId, EditError, Location, Value};
use circa_engine::{SimConfig, Simulator};

fn loc(x: i32, y: i32) -> Location {
    Location::new(x, y)
}

struct Fixture {
    design: Design,
    top: CircuitId,
    inverter: CircuitId,
    input: ComponentId,
    instance: ComponentId,
    child_out: ComponentId,
}

/// `inverter`: in (0,0) -> NOT -> out (100,0).
/// `top`: pin (100,0) -> instance at (200,0) -> probe (340,0).
fn fixture() -> Fixture {
    let mut design = Design::new();
    let inverter = design.add_circuit("inverter");
    let child_out = {
        let c = design.circuit_mut(inverter).unwrap();
        c.add_component(Component::leaf(loc(0, 0), Pin::input(BitWidth::ONE)));
        c.add_component(Component::leaf(loc(60, 0), Not::new(BitWidth::ONE)));
        let (out, _) = c.add_component(Component::leaf(loc(100, 0), Pin::output(BitWidth::ONE)));
        c.add_wires(&[Wire::from_coords(0, 0, 30, 0), Wire::from_coords(60, 0, 100, 0)]);
        out
    };

    let top = design.add_circuit("top");
    let input = design
        .circuit_mut(top)
        .unwrap()
        .add_component(Component::leaf(
            loc(100, 0),
            Pin::input(BitWidth::ONE).with_initial(Value::TRUE),
        ))
        .0;
    let (instance, _) = design.instantiate(top, inverter, loc(200, 0)).unwrap();
    {
        let c = design.circuit_mut(top).unwrap();
        c.add_component(Component::leaf(loc(340, 0), Probe::new()));
        c.add_wires(&[
            Wire::from_coords(100, 0, 200, 0),
            Wire::from_coords(300, 0, 340, 0),
        ]);
    }
    Fixture {
        design,
        top,
        inverter,
        input,
        instance,
        child_out,
    }
}

#[test]
fn instance_ends_mirror_the_child_ports() {
    let f = fixture();
    let c = f.design.circuit(f.top).unwrap();
    let ends: Vec<Location> = c
        .component(f.instance)
        .unwrap()
        .ends()
        .iter()
        .map(|e| e.location)
        .collect();
    assert_eq!(ends, vec![loc(200, 0), loc(300, 0)]);
}

#[test]
fn values_cross_the_instance_boundary() {
    let f = fixture();
    let mut sim = Simulator::new(&f.design, f.top, SimConfig::default()).unwrap();
    sim.propagate(&f.design).unwrap();

    assert_eq!(sim.state_count(), 2);
    assert_eq!(sim.value_at(loc(340, 0)), Value::FALSE);
    assert_eq!(sim.value_at_in(&[f.instance], loc(30, 0)), Some(Value::TRUE));
    assert_eq!(sim.value_at_in(&[f.instance], loc(100, 0)), Some(Value::FALSE));
    assert_eq!(
        sim.data_in::<Value>(&[f.instance], f.child_out),
        Some(&Value::FALSE)
    );
    assert!(sim.state_at(&[f.instance]).is_some());
    assert!(sim.state_at(&[f.child_out]).is_none());
}

#[test]
fn driving_the_outer_pin_reaches_the_child() {
    let f = fixture();
    let mut sim = Simulator::new(&f.design, f.top, SimConfig::default()).unwrap();
    sim.propagate(&f.design).unwrap();

    sim.drive(f.input, Value::FALSE);
    sim.propagate(&f.design).unwrap();
    assert_eq!(sim.value_at_in(&[f.instance], loc(0, 0)), Some(Value::FALSE));
    assert_eq!(sim.value_at(loc(340, 0)), Value::TRUE);
}

#[test]
fn removing_the_instance_drops_its_state() {
    let mut f = fixture();
    let mut sim = Simulator::new(&f.design, f.top, SimConfig::default()).unwrap();
    sim.propagate(&f.design).unwrap();
    assert_eq!(sim.state_count(), 2);

    f.design
        .circuit_mut(f.top)
        .unwrap()
        .remove_component(f.instance);
    sim.propagate(&f.design).unwrap();
    assert_eq!(sim.state_count(), 1);
    assert_eq!(sim.value_at_in(&[f.instance], loc(0, 0)), None);
    // The probe's wire lost its only fixed width.
    assert_eq!(sim.value_at(loc(340, 0)), Value::NIL);
}

#[test]
fn two_instances_get_independent_states() {
    let mut f = fixture();
    let (second, _) = f.design.instantiate(f.top, f.inverter, loc(200, 100)).unwrap();
    f.design
        .circuit_mut(f.top)
        .unwrap()
        .add_component(Component::leaf(
            loc(200, 100),
            Pin::input(BitWidth::ONE),
        ));
    let mut sim = Simulator::new(&f.design, f.top, SimConfig::default()).unwrap();
    sim.propagate(&f.design).unwrap();

    assert_eq!(sim.state_count(), 3);
    assert_eq!(sim.value_at_in(&[f.instance], loc(100, 0)), Some(Value::FALSE));
    assert_eq!(sim.value_at_in(&[second], loc(100, 0)), Some(Value::TRUE));
}

#[test]
fn recursive_instantiation_is_rejected() {
    let mut f = fixture();
    let err = f
        .design
        .instantiate(f.inverter, f.top, loc(0, 100))
        .unwrap_err();
    assert!(matches!(err, EditError::RecursiveSubcircuit { .. }));
    assert!(f.design.instantiate(f.inverter, f.inverter, loc(0, 100)).is_err());
}
