//! Bundle and thread analysis.
//!
//! A [`BundleMap`] is computed from scratch for one circuit generation:
//! wires are unioned into bundles of electrically identical locations,
//! bundle widths are resolved from the ends touching them, and splitters
//! sew individual bits of different bundles into shared threads.
//!
//! The map is immutable once built and is shared between every
//! simulation state of the circuit through an `Arc`.

use circa_core::{BitWidth, ComponentId, ConnectivityError, Generation, Location, Value};
use indexmap::IndexMap;

use crate::circuit::Circuit;
use crate::component::SplitterSpec;
use crate::points::WidthIncompatibility;
use crate::union_find::UnionFind;

/// Index of a bundle within one [`BundleMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(pub u32);

/// Index of a thread within one [`BundleMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u32);

/// A set of locations connected by wires alone.
#[derive(Clone, Debug)]
pub struct Bundle {
    points: Vec<Location>,
    width: BitWidth,
    width_determinant: Option<Location>,
    incompatibility: Option<WidthIncompatibility>,
    threads: Vec<ThreadId>,
    pull: Value,
}

impl Bundle {
    fn new() -> Self {
        Self {
            points: Vec::new(),
            width: BitWidth::UNKNOWN,
            width_determinant: None,
            incompatibility: None,
            threads: Vec::new(),
            pull: Value::NIL,
        }
    }

    fn set_width(&mut self, width: BitWidth, at: Location) {
        if !width.is_known() {
            return;
        }
        if let Some(inc) = &mut self.incompatibility {
            inc.points.push((at, width));
            return;
        }
        if self.width.is_known() {
            if self.width != width {
                let first = self.width_determinant.unwrap_or(at);
                self.incompatibility = Some(WidthIncompatibility {
                    points: vec![(first, self.width), (at, width)],
                });
            }
            return;
        }
        self.width = width;
        self.width_determinant = Some(at);
    }

    /// Member locations, in location order.
    pub fn points(&self) -> &[Location] {
        &self.points
    }

    /// Resolved width; unknown if no end fixes it.
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Location of the end that first fixed the width.
    pub fn width_determinant(&self) -> Option<Location> {
        self.width_determinant
    }

    /// Whether the bundle carries a resolved value. Invalid bundles
    /// drive `NIL` at every member location.
    pub fn is_valid(&self) -> bool {
        self.incompatibility.is_none() && self.width.is_known()
    }

    /// Conflicting widths found on this bundle.
    pub fn incompatibility(&self) -> Option<&WidthIncompatibility> {
        self.incompatibility.as_ref()
    }

    /// Thread carrying each bit; empty for invalid bundles.
    pub fn threads(&self) -> &[ThreadId] {
        &self.threads
    }

    /// Combined pull value of resistors attached here, or `NIL`.
    pub fn pull(&self) -> Value {
        self.pull
    }
}

/// One electrical node per bit, shared across splitters.
#[derive(Clone, Debug, Default)]
pub struct Thread {
    members: Vec<(BundleId, usize)>,
}

impl Thread {
    /// Every `(bundle, bit)` pair carrying this node.
    pub fn members(&self) -> &[(BundleId, usize)] {
        &self.members
    }
}

/// Full connectivity of one circuit generation.
#[derive(Clone, Debug)]
pub struct BundleMap {
    generation: Generation,
    bundles: Vec<Bundle>,
    by_location: IndexMap<Location, BundleId>,
    threads: Vec<Thread>,
    incompatibilities: Vec<WidthIncompatibility>,
    complete: bool,
}

impl BundleMap {
    /// Placeholder published when a computation fails, so that waiting
    /// readers are released. Contains no bundles.
    pub(crate) fn degraded(generation: Generation) -> Self {
        Self {
            generation,
            bundles: Vec::new(),
            by_location: IndexMap::new(),
            threads: Vec::new(),
            incompatibilities: Vec::new(),
            complete: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }

    /// Circuit generation this map describes.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// False for the placeholder left behind by a failed computation.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Bundle containing `loc`.
    pub fn bundle_at(&self, loc: Location) -> Option<BundleId> {
        self.by_location.get(&loc).copied()
    }

    /// Bundle by id.
    pub fn bundle(&self, id: BundleId) -> &Bundle {
        &self.bundles[id.0 as usize]
    }

    /// All bundles in discovery order.
    pub fn bundles(&self) -> impl Iterator<Item = (BundleId, &Bundle)> {
        self.bundles
            .iter()
            .enumerate()
            .map(|(i, b)| (BundleId(i as u32), b))
    }

    /// Thread by id.
    pub fn thread(&self, id: ThreadId) -> &Thread {
        &self.threads[id.0 as usize]
    }

    /// Number of threads.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Every location belonging to some bundle.
    pub fn points(&self) -> impl Iterator<Item = Location> + '_ {
        self.by_location.keys().copied()
    }

    /// Width conflicts from the points index and from bundles.
    pub fn width_incompatibilities(&self) -> &[WidthIncompatibility] {
        &self.incompatibilities
    }

    /// Bundle point sets in canonical order, for comparing two maps.
    pub fn groupings(&self) -> Vec<Vec<Location>> {
        let mut out: Vec<Vec<Location>> = self.bundles.iter().map(|b| b.points.clone()).collect();
        out.sort();
        out
    }
}

fn node_at(nodes: &mut IndexMap<Location, u32>, uf: &mut UnionFind, loc: Location) -> u32 {
    *nodes.entry(loc).or_insert_with(|| uf.push())
}

/// Build the bundle map of `circuit` at its current generation.
pub(crate) fn compute(circuit: &Circuit) -> Result<BundleMap, ConnectivityError> {
    let points = circuit.points();

    // Bundles: wires union their endpoints; splitter and pull ends seed
    // singleton bundles of their own.
    let mut nodes: IndexMap<Location, u32> = IndexMap::new();
    let mut uf = UnionFind::new();
    for wire in circuit.wires() {
        let a = node_at(&mut nodes, &mut uf, wire.e0());
        let b = node_at(&mut nodes, &mut uf, wire.e1());
        uf.union(a, b);
    }
    let splitters: Vec<(ComponentId, &SplitterSpec)> = circuit
        .components()
        .filter_map(|(id, c)| c.as_splitter().map(|s| (id, s)))
        .collect();
    for (_, spec) in &splitters {
        node_at(&mut nodes, &mut uf, spec.combined());
        for &loc in spec.fan_out() {
            node_at(&mut nodes, &mut uf, loc);
        }
    }
    for (_, c) in circuit.components() {
        if let (Some(_), Some(end)) = (c.pull(), c.ends().first()) {
            node_at(&mut nodes, &mut uf, end.location);
        }
    }

    let mut bundles: Vec<Bundle> = Vec::new();
    let mut root_bundle: IndexMap<u32, BundleId> = IndexMap::new();
    let mut by_location: IndexMap<Location, BundleId> = IndexMap::with_capacity(nodes.len());
    for (&loc, &node) in &nodes {
        let root = uf.find(node);
        let id = *root_bundle.entry(root).or_insert_with(|| {
            bundles.push(Bundle::new());
            BundleId(bundles.len() as u32 - 1)
        });
        bundles[id.0 as usize].points.push(loc);
        by_location.insert(loc, id);
    }
    for b in &mut bundles {
        b.points.sort();
    }

    // Widths: splitter declarations first, then every fixed-width end.
    for (_, c) in circuit.components().filter(|(_, c)| c.is_splitter()) {
        for end in c.ends() {
            let id = by_location[&end.location];
            bundles[id.0 as usize].set_width(end.width, end.location);
        }
    }
    for b in &mut bundles {
        for i in 0..b.points.len() {
            let loc = b.points[i];
            for w in points.known_widths(loc) {
                b.set_width(w, loc);
            }
        }
    }

    // Threads: one per bit of each valid bundle, then sewn by splitters.
    let mut tuf = UnionFind::new();
    let raw: Vec<Vec<u32>> = bundles
        .iter()
        .map(|b| {
            if b.is_valid() {
                (0..b.width.width()).map(|_| tuf.push()).collect()
            } else {
                Vec::new()
            }
        })
        .collect();
    for (id, spec) in &splitters {
        let ends = spec.fan_out().len();
        let from = by_location[&spec.combined()];
        for (bit, &end) in spec.bit_end().iter().enumerate() {
            let end = end as usize;
            if end == 0 {
                continue;
            }
            if end > ends {
                return Err(ConnectivityError::SplitterEndOutOfRange {
                    splitter: *id,
                    end,
                    ends,
                });
            }
            let to = by_location[&spec.fan_out()[end - 1]];
            let (from_bits, to_bits) = (&raw[from.0 as usize], &raw[to.0 as usize]);
            if !bundles[from.0 as usize].is_valid() || !bundles[to.0 as usize].is_valid() {
                continue;
            }
            if bit >= from_bits.len() {
                return Err(ConnectivityError::SplitterBitOutOfRange {
                    splitter: *id,
                    bit,
                    width: from_bits.len(),
                });
            }
            let position = spec.position(bit);
            if position >= to_bits.len() {
                return Err(ConnectivityError::SplitterPositionOutOfRange {
                    splitter: *id,
                    end,
                    position,
                    width: to_bits.len(),
                });
            }
            tuf.union(from_bits[bit], to_bits[position]);
        }
    }

    let mut threads: Vec<Thread> = Vec::new();
    let mut root_thread: IndexMap<u32, ThreadId> = IndexMap::new();
    for (b, handles) in raw.iter().enumerate() {
        for (bit, &h) in handles.iter().enumerate() {
            let root = tuf.find(h);
            let tid = *root_thread.entry(root).or_insert_with(|| {
                threads.push(Thread::default());
                ThreadId(threads.len() as u32 - 1)
            });
            threads[tid.0 as usize].members.push((BundleId(b as u32), bit));
            bundles[b].threads.push(tid);
        }
    }

    for (_, c) in circuit.components() {
        if let (Some(pull), Some(end)) = (c.pull(), c.ends().first()) {
            let id = by_location[&end.location];
            let b = &mut bundles[id.0 as usize];
            b.pull = b.pull.combine(pull);
        }
    }

    let mut incompatibilities = points.width_incompatibilities();
    for b in &bundles {
        if let Some(inc) = &b.incompatibility {
            if !incompatibilities.contains(inc) {
                incompatibilities.push(inc.clone());
            }
        }
    }

    log::debug!(
        "connectivity generation {}: {} points, {} bundles, {} threads, {} width conflicts",
        circuit.generation(),
        uf.len(),
        bundles.len(),
        threads.len(),
        incompatibilities.len()
    );

    Ok(BundleMap {
        generation: circuit.generation(),
        bundles,
        by_location,
        threads,
        incompatibilities,
        complete: true,
    })
}
