//! Feedback loops: ones that settle and ones that never do.

use circa_circuit::{Component, Design, Wire};
use circa_components::{Not, Pin, PullResistor};
use circa_core::{BitWidth, CircuitId, Location, Value};
use circa_engine::{SimConfig, Simulator};

fn loc(x: i32, y: i32) -> Location {
    Location::new(x, y)
}

/// An inverter whose output feeds its own input at (70,0).
fn inverter_loop(pulled: bool) -> (Design, CircuitId) {
    let mut design = Design::new();
    let main = design.add_circuit("main");
    let c = design.circuit_mut(main).unwrap();
    c.add_component(Component::leaf(loc(100, 0), Not::new(BitWidth::ONE)));
    if pulled {
        c.add_component(Component::leaf(loc(70, 0), PullResistor::down()));
    }
    c.add_wires(&[Wire::from_coords(70, 0, 100, 0)]);
    (design, main)
}

fn limited(limit: u32) -> SimConfig {
    SimConfig {
        iteration_limit: limit,
        ..SimConfig::default()
    }
}

#[test]
fn pulled_inverter_loop_oscillates() {
    let (design, main) = inverter_loop(true);
    let mut sim = Simulator::new(&design, main, limited(40)).unwrap();
    let metrics = sim.propagate(&design).unwrap();

    assert!(sim.is_oscillating());
    assert_eq!(metrics.iterations, 40);
    assert!(sim.pending_events() > 0);
    assert!(sim.pending_events() <= 4);

    let points: Vec<_> = sim.oscillation_points().collect();
    assert!(!points.is_empty());
    assert!(points.iter().all(|&(s, _)| s == sim.root_state()));
    assert!(points.iter().any(|&(_, l)| l == loc(100, 0)));
    assert_eq!(metrics.oscillation_points, points.len());
}

#[test]
fn inverter_rewired_onto_itself_oscillates() {
    let mut design = Design::new();
    let main = design.add_circuit("main");
    let c = design.circuit_mut(main).unwrap();
    let (pin, _) = c.add_component(Component::leaf(loc(70, 0), Pin::input(BitWidth::ONE)));
    c.add_component(Component::leaf(loc(100, 0), Not::new(BitWidth::ONE)));
    let mut sim = Simulator::new(&design, main, limited(100)).unwrap();
    sim.propagate(&design).unwrap();
    assert_eq!(sim.value_at(loc(100, 0)), Value::TRUE);

    // Replace the driver with a wire from the output while the level is defined.
    let c = design.circuit_mut(main).unwrap();
    c.remove_component(pin);
    c.add_wires(&[Wire::from_coords(70, 0, 100, 0)]);
    let metrics = sim.propagate(&design).unwrap();

    assert!(sim.is_oscillating());
    assert_eq!(metrics.iterations, 100);
    assert!(sim.pending_events() <= 4);
    assert!(sim.oscillation_points().any(|(_, l)| l == loc(100, 0)));
}

#[test]
fn oscillation_resumes_where_it_stopped() {
    let (design, main) = inverter_loop(true);
    let mut sim = Simulator::new(&design, main, limited(10)).unwrap();
    let first = sim.propagate(&design).unwrap();
    let second = sim.propagate(&design).unwrap();
    assert!(sim.is_oscillating());
    assert!(second.final_time > first.final_time);
}

#[test]
fn bare_inverter_loop_oscillates_from_reset() {
    let (design, main) = inverter_loop(false);
    let mut sim = Simulator::new(&design, main, SimConfig::default()).unwrap();
    let metrics = sim.propagate(&design).unwrap();

    assert!(sim.is_oscillating());
    assert_eq!(metrics.iterations, SimConfig::default().iteration_limit);
    assert!(sim.pending_events() > 0);
    assert!(sim.pending_events() <= 4);
    // The floating wire reads low, so the loop toggles between defined levels.
    let level = sim.value_at(loc(70, 0));
    assert!(level == Value::TRUE || level == Value::FALSE);
    assert!(sim.oscillation_points().any(|(_, l)| l == loc(100, 0)));
}

#[test]
fn inverter_fed_an_error_settles() {
    let mut design = Design::new();
    let main = design.add_circuit("main");
    let c = design.circuit_mut(main).unwrap();
    c.add_component(Component::leaf(loc(100, 0), Not::new(BitWidth::ONE)));
    c.add_component(Component::leaf(loc(70, 0), PullResistor::error()));
    c.add_wires(&[Wire::from_coords(40, 0, 70, 0)]);
    let mut sim = Simulator::new(&design, main, limited(40)).unwrap();
    sim.propagate(&design).unwrap();

    assert!(!sim.is_oscillating());
    assert_eq!(sim.pending_events(), 0);
    assert_eq!(sim.value_at(loc(70, 0)), Value::ERROR);
    assert_eq!(sim.value_at(loc(100, 0)), Value::ERROR);
    assert_eq!(sim.oscillation_points().count(), 0);
}

#[test]
fn breaking_the_loop_lets_it_settle() {
    let (mut design, main) = inverter_loop(true);
    let mut sim = Simulator::new(&design, main, limited(40)).unwrap();
    sim.propagate(&design).unwrap();
    assert!(sim.is_oscillating());

    design
        .circuit_mut(main)
        .unwrap()
        .remove_wires(&[Wire::from_coords(70, 0, 100, 0)]);
    sim.propagate(&design).unwrap();

    assert!(!sim.is_oscillating());
    assert_eq!(sim.pending_events(), 0);
    // The pulled input reads 0, so the detached output is driven high.
    assert_eq!(sim.value_at(loc(70, 0)), Value::FALSE);
    assert_eq!(sim.value_at(loc(100, 0)), Value::TRUE);
}
