//! Components placed in a circuit.

use std::fmt;
use std::sync::Arc;

use circa_core::{BitWidth, CircuitId, ComponentId, Location, Value};
use smallvec::SmallVec;

use crate::behavior::{Behavior, Capabilities, Capability, PortDirection};
use crate::end::EndData;

/// Bit map of a splitter: one combined end fanned out to narrower ends.
///
/// `bit_end[i]` names the fan-out end (1-based) carrying combined bit
/// `i`, or 0 when the bit is not connected. A bit's position within its
/// end is the number of lower combined bits mapped to the same end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitterSpec {
    combined: Location,
    width: BitWidth,
    fan_out: Vec<Location>,
    bit_end: Vec<u8>,
}

impl SplitterSpec {
    /// A splitter with the given geometry and bit map. The map is not
    /// checked here; inconsistencies surface when connectivity is
    /// computed.
    pub fn new(combined: Location, width: BitWidth, fan_out: Vec<Location>, bit_end: Vec<u8>) -> Self {
        Self {
            combined,
            width,
            fan_out,
            bit_end,
        }
    }

    /// Location of the combined end.
    pub fn combined(&self) -> Location {
        self.combined
    }

    /// Declared width of the combined end.
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Locations of the fan-out ends, end 1 first.
    pub fn fan_out(&self) -> &[Location] {
        &self.fan_out
    }

    /// The combined-bit to end map.
    pub fn bit_end(&self) -> &[u8] {
        &self.bit_end
    }

    /// Number of combined bits routed to fan-out end `end` (1-based).
    pub fn end_width(&self, end: usize) -> BitWidth {
        let n = self.bit_end.iter().filter(|&&e| e as usize == end).count();
        BitWidth::bits(n.min(BitWidth::MAX as usize) as u8)
    }

    /// Position of combined bit `bit` within the end it is routed to.
    pub fn position(&self, bit: usize) -> usize {
        let end = self.bit_end[bit];
        self.bit_end[..bit].iter().filter(|&&e| e == end).count()
    }

    fn ends(&self) -> SmallVec<[EndData; 4]> {
        let mut ends = SmallVec::with_capacity(self.fan_out.len() + 1);
        ends.push(EndData::bidirectional(self.combined, self.width));
        for (j, &loc) in self.fan_out.iter().enumerate() {
            ends.push(EndData::bidirectional(loc, self.end_width(j + 1)));
        }
        ends
    }
}

/// One port of a subcircuit instance, backed by a pin in the child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubcircuitPort {
    /// The child pin.
    pub pin: ComponentId,
    /// Where the pin's end sits inside the child.
    pub pin_location: Location,
    /// Data direction seen from the parent.
    pub direction: PortDirection,
    /// Port width.
    pub width: BitWidth,
}

/// An instance of another circuit of the same design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubcircuitSpec {
    /// The instantiated circuit.
    pub circuit: CircuitId,
    /// Ports in canonical order; port `i` is instance end `i`.
    pub ports: Vec<SubcircuitPort>,
}

impl SubcircuitSpec {
    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        let Some(first) = self.ports.first() else {
            return SmallVec::new();
        };
        let origin = first.pin_location;
        self.ports
            .iter()
            .map(|p| {
                let loc = anchor.translate(p.pin_location.x - origin.x, p.pin_location.y - origin.y);
                match p.direction {
                    PortDirection::Input => EndData::input(loc, p.width),
                    PortDirection::Output => EndData::output(loc, p.width),
                }
            })
            .collect()
    }
}

/// What a component is.
#[derive(Clone)]
pub enum ComponentKind {
    /// A black box with its own behaviour.
    Leaf(Arc<dyn Behavior>),
    /// A splitter; handled by the connectivity analyzer, never propagated.
    Splitter(SplitterSpec),
    /// An instance of another circuit.
    Subcircuit(SubcircuitSpec),
}

/// A non-wire element of a circuit.
#[derive(Clone)]
pub struct Component {
    location: Location,
    ends: SmallVec<[EndData; 4]>,
    kind: ComponentKind,
}

impl Component {
    /// A leaf component at `anchor`.
    pub fn leaf(anchor: Location, behavior: impl Behavior) -> Self {
        Self::from_behavior(anchor, Arc::new(behavior))
    }

    /// A leaf component sharing an existing behaviour object.
    pub fn from_behavior(anchor: Location, behavior: Arc<dyn Behavior>) -> Self {
        Self {
            location: anchor,
            ends: behavior.ends(anchor),
            kind: ComponentKind::Leaf(behavior),
        }
    }

    /// A splitter anchored at its combined end.
    pub fn splitter(spec: SplitterSpec) -> Self {
        Self {
            location: spec.combined(),
            ends: spec.ends(),
            kind: ComponentKind::Splitter(spec),
        }
    }

    pub(crate) fn subcircuit(anchor: Location, spec: SubcircuitSpec) -> Self {
        Self {
            location: anchor,
            ends: spec.ends(anchor),
            kind: ComponentKind::Subcircuit(spec),
        }
    }

    /// Anchor location.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Declared ends, in port order.
    pub fn ends(&self) -> &[EndData] {
        &self.ends
    }

    /// Index of the end at `loc`, if any.
    pub fn end_index_at(&self, loc: Location) -> Option<usize> {
        self.ends.iter().position(|e| e.location == loc)
    }

    /// The variant.
    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Type name used in logs.
    pub fn name(&self) -> &str {
        match &self.kind {
            ComponentKind::Leaf(b) => b.name(),
            ComponentKind::Splitter(_) => "Splitter",
            ComponentKind::Subcircuit(_) => "Subcircuit",
        }
    }

    /// Leaf behaviour, if this is a leaf.
    pub fn behavior(&self) -> Option<&Arc<dyn Behavior>> {
        match &self.kind {
            ComponentKind::Leaf(b) => Some(b),
            _ => None,
        }
    }

    /// Splitter map, if this is a splitter.
    pub fn as_splitter(&self) -> Option<&SplitterSpec> {
        match &self.kind {
            ComponentKind::Splitter(s) => Some(s),
            _ => None,
        }
    }

    /// Subcircuit instance data, if this is one.
    pub fn as_subcircuit(&self) -> Option<&SubcircuitSpec> {
        match &self.kind {
            ComponentKind::Subcircuit(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a splitter.
    pub fn is_splitter(&self) -> bool {
        matches!(self.kind, ComponentKind::Splitter(_))
    }

    /// Capabilities; only leaves advertise any.
    pub fn capabilities(&self) -> Capabilities {
        self.behavior()
            .map_or(Capabilities::EMPTY, |b| b.capabilities())
    }

    /// Whether the component advertises `cap`.
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities().contains(cap)
    }

    /// Port direction, for pins.
    pub fn port_direction(&self) -> Option<PortDirection> {
        self.behavior().and_then(|b| b.port_direction())
    }

    /// Pull value, for pull resistors.
    pub fn pull(&self) -> Option<Value> {
        self.behavior().and_then(|b| b.pull())
    }

    /// Whether the engine should call this component's behaviour or
    /// subcircuit logic when its inputs change.
    pub fn is_propagated(&self) -> bool {
        !self.is_splitter()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("location", &self.location)
            .field("ends", &self.ends.len())
            .finish()
    }
}

/// Either kind of circuit element; used by the points index and edit
/// actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    /// A wire segment.
    Wire(crate::wire::Wire),
    /// A non-wire component.
    Component(ComponentId),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(w) => write!(f, "wire {w}"),
            Self::Component(id) => write!(f, "{id}"),
        }
    }
}
