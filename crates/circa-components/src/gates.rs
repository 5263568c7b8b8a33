//! Combinational logic gates.
//!
//! A gate's output end sits at its anchor; its inputs are stacked 30
//! units to the left, 20 units apart and centred on the anchor's row.
//! Inputs and output share one width; inputs are combined bitwise with
//! the [`Value`] gate algebra, so a floating or error input yields error
//! bits unless a dominating bit decides the result.

use circa_circuit::{Behavior, Capabilities, Capability, EndData, PropagateContext};
use circa_core::{BitWidth, Location, StepError, Value};
use smallvec::{smallvec, SmallVec};

/// Fewest inputs a gate accepts.
pub const MIN_INPUTS: usize = 2;
/// Most inputs a gate accepts.
pub const MAX_INPUTS: usize = 32;

const GATE_CAPS: Capabilities = Capabilities::EMPTY
    .with(Capability::Combinational)
    .with(Capability::ExposesExpression);

/// The boolean function a [`Gate`] computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// All inputs high.
    And,
    /// Any input high.
    Or,
    /// Odd number of inputs high.
    Xor,
    /// Negated AND.
    Nand,
    /// Negated OR.
    Nor,
    /// Negated XOR.
    Xnor,
}

impl GateKind {
    fn fold(self, acc: Value, v: Value) -> Value {
        match self {
            Self::And | Self::Nand => acc.and(v),
            Self::Or | Self::Nor => acc.or(v),
            Self::Xor | Self::Xnor => acc.xor(v),
        }
    }

    fn negated(self) -> bool {
        matches!(self, Self::Nand | Self::Nor | Self::Xnor)
    }

    fn name(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xnor => "XNOR",
        }
    }
}

/// A multi-input gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    kind: GateKind,
    width: BitWidth,
    inputs: usize,
}

impl Gate {
    /// A gate of `kind` over `width`-bit values. `inputs` is clamped to
    /// `[MIN_INPUTS, MAX_INPUTS]`.
    pub fn new(kind: GateKind, width: BitWidth, inputs: usize) -> Self {
        Self {
            kind,
            width,
            inputs: inputs.clamp(MIN_INPUTS, MAX_INPUTS),
        }
    }

    /// A two-input AND.
    pub fn and(width: BitWidth) -> Self {
        Self::new(GateKind::And, width, 2)
    }

    /// A two-input OR.
    pub fn or(width: BitWidth) -> Self {
        Self::new(GateKind::Or, width, 2)
    }

    /// A two-input XOR.
    pub fn xor(width: BitWidth) -> Self {
        Self::new(GateKind::Xor, width, 2)
    }

    /// A two-input NAND.
    pub fn nand(width: BitWidth) -> Self {
        Self::new(GateKind::Nand, width, 2)
    }

    /// A two-input NOR.
    pub fn nor(width: BitWidth) -> Self {
        Self::new(GateKind::Nor, width, 2)
    }

    /// A two-input XNOR.
    pub fn xnor(width: BitWidth) -> Self {
        Self::new(GateKind::Xnor, width, 2)
    }

    /// The function computed.
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Number of inputs.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Location of input `i` (0-based) for a gate anchored at `anchor`.
    pub fn input_location(&self, anchor: Location, i: usize) -> Location {
        let dy = 20 * i as i32 - 10 * (self.inputs as i32 - 1);
        anchor.translate(-30, dy)
    }
}

impl Behavior for Gate {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        let mut ends = SmallVec::with_capacity(self.inputs + 1);
        ends.push(EndData::output(anchor, self.width));
        for i in 0..self.inputs {
            ends.push(EndData::input(self.input_location(anchor, i), self.width));
        }
        ends
    }

    fn capabilities(&self) -> Capabilities {
        GATE_CAPS
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        let mut out = ctx.port(1)?;
        for port in 2..=self.inputs {
            out = self.kind.fold(out, ctx.port(port)?);
        }
        if self.kind.negated() {
            out = out.not();
        }
        ctx.set_port(0, out, 1)
    }
}

/// An inverter: input 30 units left of the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Not {
    width: BitWidth,
}

impl Not {
    /// An inverter over `width`-bit values.
    pub fn new(width: BitWidth) -> Self {
        Self { width }
    }
}

impl Behavior for Not {
    fn name(&self) -> &str {
        "NOT"
    }

    fn ends(&self, anchor: Location) -> SmallVec<[EndData; 4]> {
        smallvec![
            EndData::output(anchor, self.width),
            EndData::input(anchor.translate(-30, 0), self.width),
        ]
    }

    fn capabilities(&self) -> Capabilities {
        GATE_CAPS
    }

    fn propagate(&self, ctx: &mut dyn PropagateContext) -> Result<(), StepError> {
        let v = ctx.port(1)?;
        ctx.set_port(0, v.not(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circa_test_utils::MockContext;
    use proptest::prelude::*;

    fn run(gate: &Gate, inputs: &[Value]) -> Value {
        let mut ctx = MockContext::for_behavior(gate, Location::new(100, 100));
        for (i, v) in inputs.iter().enumerate() {
            ctx.set_port_input(i + 1, *v);
        }
        gate.propagate(&mut ctx).unwrap();
        ctx.last_on_port(0).unwrap()
    }

    #[test]
    fn truth_tables() {
        let (f, t) = (Value::FALSE, Value::TRUE);
        let cases = [
            (GateKind::And, [f, f, f, t]),
            (GateKind::Or, [f, t, t, t]),
            (GateKind::Xor, [f, t, t, f]),
            (GateKind::Nand, [t, t, t, f]),
            (GateKind::Nor, [t, f, f, f]),
            (GateKind::Xnor, [t, f, f, t]),
        ];
        for (kind, expected) in cases {
            let gate = Gate::new(kind, BitWidth::ONE, 2);
            for (i, want) in expected.iter().enumerate() {
                let a = if i & 2 != 0 { t } else { f };
                let b = if i & 1 != 0 { t } else { f };
                assert_eq!(run(&gate, &[a, b]), *want, "{kind:?}({a}, {b})");
            }
        }
    }

    #[test]
    fn dominating_bits_hide_floating_inputs() {
        let and = Gate::and(BitWidth::ONE);
        assert_eq!(run(&and, &[Value::FALSE, Value::UNKNOWN]), Value::FALSE);
        assert_eq!(run(&and, &[Value::TRUE, Value::UNKNOWN]), Value::ERROR);
        let or = Gate::or(BitWidth::ONE);
        assert_eq!(run(&or, &[Value::UNKNOWN, Value::TRUE]), Value::TRUE);
    }

    #[test]
    fn input_count_is_clamped_and_ends_distinct() {
        assert_eq!(Gate::new(GateKind::Or, BitWidth::ONE, 1).inputs(), MIN_INPUTS);
        assert_eq!(Gate::new(GateKind::Or, BitWidth::ONE, 99).inputs(), MAX_INPUTS);
        let gate = Gate::new(GateKind::And, BitWidth::ONE, 3);
        let ends = gate.ends(Location::new(0, 0));
        assert_eq!(ends.len(), 4);
        assert_eq!(ends[1].location, Location::new(-30, -20));
        assert_eq!(ends[2].location, Location::new(-30, 0));
        assert_eq!(ends[3].location, Location::new(-30, 20));
    }

    #[test]
    fn not_inverts_and_drives_floating_high() {
        let not = Not::new(BitWidth::bits(2));
        let mut ctx = MockContext::for_behavior(&not, Location::new(0, 0));
        ctx.set_port_input(1, Value::from_bits(BitWidth::bits(2), 0b01));
        not.propagate(&mut ctx).unwrap();
        assert_eq!(ctx.last_on_port(0), Some(Value::from_bits(BitWidth::bits(2), 0b10)));

        let mut floating = MockContext::for_behavior(&not, Location::new(0, 0));
        not.propagate(&mut floating).unwrap();
        assert_eq!(
            floating.last_on_port(0),
            Some(Value::from_bits(BitWidth::bits(2), 0b11))
        );

        let mut broken = MockContext::for_behavior(&not, Location::new(0, 0));
        broken.set_port_input(1, Value::error(BitWidth::bits(2)));
        not.propagate(&mut broken).unwrap();
        assert_eq!(broken.last_on_port(0), Some(Value::error(BitWidth::bits(2))));
    }

    proptest! {
        #[test]
        fn wide_and_matches_integer_and(a in 0u64..256, b in 0u64..256, c in 0u64..256) {
            let w = BitWidth::bits(8);
            let gate = Gate::new(GateKind::And, w, 3);
            let out = run(&gate, &[Value::from_bits(w, a), Value::from_bits(w, b), Value::from_bits(w, c)]);
            prop_assert_eq!(out.to_u64(), Some(a & b & c));
        }

        #[test]
        fn xnor_is_negated_xor(a in 0u64..16, b in 0u64..16) {
            let w = BitWidth::bits(4);
            let (x, y) = (Value::from_bits(w, a), Value::from_bits(w, b));
            let xor = run(&Gate::xor(w), &[x, y]);
            let xnor = run(&Gate::xnor(w), &[x, y]);
            prop_assert_eq!(xnor, xor.not());
        }
    }
}
