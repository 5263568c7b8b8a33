//! Benchmark circuits for the Circa logic simulator.
//!
//! - [`inverter_chain`]: a pin feeding `n` inverters in series
//! - [`bus_fanout`]: a `width`-bit bus split into one wire per bit

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use circa_circuit::{Component, Design, Wire};
use circa_components::{Not, Pin, SplitterBuilder};
use circa_core::{BitWidth, CircuitId, ComponentId, Location};

/// A built benchmark circuit.
pub struct BenchCircuit {
    /// The design holding the circuit.
    pub design: Design,
    /// The circuit to simulate.
    pub root: CircuitId,
    /// The input pin driving the circuit.
    pub input: ComponentId,
    /// Where the result can be read.
    pub output: Location,
}

/// A one-bit input pin at (0,0) followed by `n` inverters spaced 60
/// apart, ending in an output pin.
pub fn inverter_chain(n: usize) -> BenchCircuit {
    let mut design = Design::new();
    let root = design.add_circuit("inverter_chain");
    let c = design
        .circuit_mut(root)
        .expect("circuit was just added");
    let (input, _) = c.add_component(Component::leaf(
        Location::new(0, 0),
        Pin::input(BitWidth::ONE),
    ));
    let mut wires = Vec::with_capacity(n + 1);
    for i in 0..n as i32 {
        let x = 60 * i;
        c.add_component(Component::leaf(
            Location::new(x + 60, 0),
            Not::new(BitWidth::ONE),
        ));
        wires.push(Wire::from_coords(x, 0, x + 30, 0));
    }
    let end = 60 * n as i32;
    let output = Location::new(end + 40, 0);
    c.add_component(Component::leaf(output, Pin::output(BitWidth::ONE)));
    wires.push(Wire::from_coords(end, 0, end + 40, 0));
    c.add_wires(&wires);
    BenchCircuit {
        design,
        root,
        input,
        output,
    }
}

/// A `width`-bit input pin at (0,0) split into `width` one-bit output
/// pins stacked 20 apart at x = 80.
pub fn bus_fanout(width: u8) -> BenchCircuit {
    let width = width.clamp(1, BitWidth::MAX);
    let mut design = Design::new();
    let root = design.add_circuit("bus_fanout");
    let c = design
        .circuit_mut(root)
        .expect("circuit was just added");
    let (input, _) = c.add_component(Component::leaf(
        Location::new(0, 0),
        Pin::input(BitWidth::bits(width)),
    ));
    let fan_out: Vec<Location> = (0..i32::from(width))
        .map(|k| Location::new(40, 20 * k))
        .collect();
    let splitter = SplitterBuilder::new(Location::new(20, 0), BitWidth::bits(width))
        .fan_out(fan_out.clone())
        .build()
        .expect("one end per bit is always a valid map");
    c.add_component(splitter);
    let mut wires = vec![Wire::from_coords(0, 0, 20, 0)];
    for end in &fan_out {
        let pin = end.translate(40, 0);
        c.add_component(Component::leaf(pin, Pin::output(BitWidth::ONE)));
        wires.push(Wire::new(*end, pin).expect("horizontal"));
    }
    c.add_wires(&wires);
    BenchCircuit {
        design,
        root,
        input,
        output: Location::new(80, 20 * (i32::from(width) - 1)),
    }
}
