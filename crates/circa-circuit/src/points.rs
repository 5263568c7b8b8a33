//! Per-location registry of the ends touching each grid point.
//!
//! Purely structural bookkeeping: which elements meet where, which width
//! a location resolves to, who claims exclusive output use of it, and
//! where two fixed-width ends disagree. The connectivity analyzer and the
//! wire canonicalizer read it; nothing here knows about values.

use std::collections::BTreeMap;

use circa_core::{BitWidth, ComponentId, Location};
use smallvec::SmallVec;

use crate::component::Element;
use crate::end::EndData;
use crate::wire::Wire;

/// Conflicting widths among ends that must agree.
///
/// Reported both by the points index (two ends at one location) and by
/// the connectivity analyzer (two ends of one bundle).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidthIncompatibility {
    /// Each conflicting end's location and declared width.
    pub points: Vec<(Location, BitWidth)>,
}

impl WidthIncompatibility {
    /// The distinct widths involved.
    pub fn widths(&self) -> Vec<BitWidth> {
        let mut out: Vec<BitWidth> = self.points.iter().map(|&(_, w)| w).collect();
        out.sort();
        out.dedup();
        out
    }
}

#[derive(Clone, Debug, Default)]
struct PointEntry {
    ends: SmallVec<[(Element, EndData); 4]>,
    width: BitWidth,
    determinant: Option<Element>,
    exclusive: Option<ComponentId>,
    incompatible: bool,
}

impl PointEntry {
    fn recompute(&mut self) {
        self.width = BitWidth::UNKNOWN;
        self.determinant = None;
        self.exclusive = None;
        self.incompatible = false;
        let mut contested = false;
        for (elem, end) in &self.ends {
            if end.width.is_known() {
                if self.determinant.is_none() {
                    self.width = end.width;
                    self.determinant = Some(*elem);
                } else if end.width != self.width {
                    self.incompatible = true;
                }
            }
            if let (true, Element::Component(id)) = (end.exclusive, elem) {
                match self.exclusive {
                    None if !contested => self.exclusive = Some(*id),
                    Some(owner) if owner != *id => {
                        self.exclusive = None;
                        contested = true;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Index from location to the elements whose ends touch it.
#[derive(Clone, Debug, Default)]
pub struct PointsIndex {
    map: BTreeMap<Location, PointEntry>,
}

impl PointsIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both endpoints of `wire`.
    pub fn add_wire(&mut self, wire: Wire) {
        for loc in wire.ends() {
            self.add_end(Element::Wire(wire), EndData::bidirectional(loc, BitWidth::UNKNOWN));
        }
    }

    /// Unregister both endpoints of `wire`.
    pub fn remove_wire(&mut self, wire: Wire) {
        for loc in wire.ends() {
            self.remove_end(Element::Wire(wire), loc);
        }
    }

    /// Register every end of component `id`.
    pub fn add_component(&mut self, id: ComponentId, ends: &[EndData]) {
        for end in ends {
            self.add_end(Element::Component(id), *end);
        }
    }

    /// Unregister every end of component `id`.
    pub fn remove_component(&mut self, id: ComponentId, ends: &[EndData]) {
        for end in ends {
            self.remove_end(Element::Component(id), end.location);
        }
    }

    /// Register a single end.
    pub fn add_end(&mut self, element: Element, end: EndData) {
        let entry = self.map.entry(end.location).or_default();
        entry.ends.push((element, end));
        entry.recompute();
    }

    /// Unregister `element`'s end at `location`.
    pub fn remove_end(&mut self, element: Element, location: Location) {
        let Some(entry) = self.map.get_mut(&location) else {
            return;
        };
        if let Some(i) = entry.ends.iter().position(|(e, _)| *e == element) {
            entry.ends.remove(i);
        }
        if entry.ends.is_empty() {
            self.map.remove(&location);
        } else {
            entry.recompute();
        }
    }

    /// Resolved width at `loc`. Unknown where nothing fixes a width or
    /// where fixed widths disagree.
    pub fn width(&self, loc: Location) -> BitWidth {
        match self.map.get(&loc) {
            Some(e) if !e.incompatible => e.width,
            _ => BitWidth::UNKNOWN,
        }
    }

    /// The element whose end first fixed the width at `loc`.
    pub fn width_determinant(&self, loc: Location) -> Option<Element> {
        self.map.get(&loc).and_then(|e| e.determinant)
    }

    /// The component claiming exclusive output use of `loc`; `None` when
    /// nobody does or when two components both claim it.
    pub fn exclusive_owner(&self, loc: Location) -> Option<ComponentId> {
        self.map.get(&loc).and_then(|e| e.exclusive)
    }

    /// Every known width declared by an end at `loc`, with duplicates.
    pub fn known_widths(&self, loc: Location) -> impl Iterator<Item = BitWidth> + '_ {
        self.map
            .get(&loc)
            .into_iter()
            .flat_map(|e| e.ends.iter().map(|(_, end)| end.width))
            .filter(|w| w.is_known())
    }

    /// Locations where fixed-width ends disagree, in location order.
    pub fn width_incompatibilities(&self) -> Vec<WidthIncompatibility> {
        self.map
            .iter()
            .filter(|(_, e)| e.incompatible)
            .map(|(&loc, e)| WidthIncompatibility {
                points: e
                    .ends
                    .iter()
                    .filter(|(_, end)| end.width.is_known())
                    .map(|(_, end)| (loc, end.width))
                    .collect(),
            })
            .collect()
    }

    /// Elements with an end at `loc`, in registration order.
    pub fn elements_at(&self, loc: Location) -> impl Iterator<Item = Element> + '_ {
        self.map
            .get(&loc)
            .into_iter()
            .flat_map(|e| e.ends.iter().map(|(elem, _)| *elem))
    }

    /// Wires ending at `loc`.
    pub fn wires_at(&self, loc: Location) -> Vec<Wire> {
        self.elements_at(loc)
            .filter_map(|e| match e {
                Element::Wire(w) => Some(w),
                Element::Component(_) => None,
            })
            .collect()
    }

    /// Components with an end at `loc`.
    pub fn components_at(&self, loc: Location) -> Vec<ComponentId> {
        let mut out: Vec<ComponentId> = self
            .elements_at(loc)
            .filter_map(|e| match e {
                Element::Component(id) => Some(id),
                Element::Wire(_) => None,
            })
            .collect();
        out.dedup();
        out
    }

    /// Whether any non-wire end sits at `loc`.
    pub fn has_component_at(&self, loc: Location) -> bool {
        self.elements_at(loc)
            .any(|e| matches!(e, Element::Component(_)))
    }

    /// Whether `loc` is a branch point that wires must not run through
    /// unsplit: any component end, or two or more wire ends other than
    /// a plain collinear pass-through of exactly two wires.
    pub fn is_split_location(&self, loc: Location) -> bool {
        if self.has_component_at(loc) {
            return true;
        }
        let wires = self.wires_at(loc);
        match wires.as_slice() {
            [] | [_] => false,
            [a, b] => !a.is_collinear(b),
            _ => true,
        }
    }

    /// All split locations, in location order.
    pub fn split_locations(&self) -> Vec<Location> {
        self.map
            .keys()
            .copied()
            .filter(|&loc| self.is_split_location(loc))
            .collect()
    }

    /// Every occupied location, in location order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.map.keys().copied()
    }

    /// Occupied locations on `wire`, endpoints included.
    pub(crate) fn locations_on(&self, wire: &Wire) -> Vec<Location> {
        let (lo, hi) = (wire.e0(), wire.e1());
        self.map
            .range(lo..=hi)
            .map(|(&loc, _)| loc)
            .filter(|&loc| wire.contains(loc))
            .collect()
    }
}
