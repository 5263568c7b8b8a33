//! Criterion benchmarks for the wire canonicalizer and bundle analysis.

use circa_bench::{bus_fanout, inverter_chain};
use circa_circuit::Wire;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_snapshot_after_edit(c: &mut Criterion) {
    let mut bench = inverter_chain(1000);
    let root = bench.root;
    // A stub off the last output; adding and removing it bumps the
    // generation each time.
    let end = bench.output.translate(-40, 0);
    let stub = Wire::new(end, end.translate(0, 20)).unwrap();

    c.bench_function("snapshot_chain_1000_after_edit", |b| {
        b.iter(|| {
            let circuit = bench.design.circuit_mut(root).unwrap();
            circuit.add_wires(&[stub]);
            black_box(circuit.connectivity().unwrap());
            circuit.remove_wires(&[stub]);
            black_box(circuit.connectivity().unwrap());
        });
    });
}

fn bench_snapshot_bus(c: &mut Criterion) {
    let mut bench = bus_fanout(64);
    let root = bench.root;
    let stub = Wire::from_coords(0, 0, 0, -20);

    c.bench_function("snapshot_bus_64_after_edit", |b| {
        b.iter(|| {
            let circuit = bench.design.circuit_mut(root).unwrap();
            circuit.add_wires(&[stub]);
            black_box(circuit.connectivity().unwrap());
            circuit.remove_wires(&[stub]);
            black_box(circuit.connectivity().unwrap());
        });
    });
}

fn bench_split_long_wire(c: &mut Criterion) {
    let mut bench = inverter_chain(0);
    let root = bench.root;
    let long = Wire::from_coords(0, 100, 100_000, 100);
    let taps: Vec<Wire> = (1..200)
        .map(|i| Wire::from_coords(i * 500, 100, i * 500, 120))
        .collect();
    c.bench_function("split_long_wire_200_taps", |b| {
        b.iter(|| {
            let circuit = bench.design.circuit_mut(root).unwrap();
            circuit.add_wires(&[long]);
            circuit.add_wires(&taps);
            black_box(circuit.wires().count());
            let wires: Vec<Wire> = circuit.wires().filter(|w| w.e0().y >= 100).collect();
            circuit.remove_wires(&wires);
        });
    });
}

criterion_group!(
    benches,
    bench_snapshot_after_edit,
    bench_snapshot_bus,
    bench_split_long_wire
);
criterion_main!(benches);
