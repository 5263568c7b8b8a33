//! Component end descriptors.

use circa_core::{BitWidth, Location};

/// Direction of data through a component end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndKind {
    /// The component reads this end.
    Input,
    /// The component drives this end.
    Output,
    /// Both, e.g. a splitter end or a wire endpoint.
    InputOutput,
}

/// One connection point of a component: where it is, how wide, which way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EndData {
    /// Grid position of the end.
    pub location: Location,
    /// Declared width; [`BitWidth::UNKNOWN`] for wire endpoints.
    pub width: BitWidth,
    /// Data direction.
    pub kind: EndKind,
    /// Claims sole output use of the location.
    pub exclusive: bool,
}

impl EndData {
    /// An input end.
    pub fn input(location: Location, width: BitWidth) -> Self {
        Self {
            location,
            width,
            kind: EndKind::Input,
            exclusive: false,
        }
    }

    /// An exclusive output end.
    pub fn output(location: Location, width: BitWidth) -> Self {
        Self {
            location,
            width,
            kind: EndKind::Output,
            exclusive: true,
        }
    }

    /// A bidirectional, non-exclusive end.
    pub fn bidirectional(location: Location, width: BitWidth) -> Self {
        Self {
            location,
            width,
            kind: EndKind::InputOutput,
            exclusive: false,
        }
    }

    /// The same end with a different exclusivity claim.
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Whether the component reads this end.
    pub fn is_input(&self) -> bool {
        matches!(self.kind, EndKind::Input | EndKind::InputOutput)
    }

    /// Whether the component drives this end.
    pub fn is_output(&self) -> bool {
        matches!(self.kind, EndKind::Output | EndKind::InputOutput)
    }
}
