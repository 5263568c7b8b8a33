//! Random edit sequences keep the wire set canonical.

use circa_circuit::{Axis, Circuit, Wire};
use circa_core::Location;
use proptest::prelude::*;

fn check_canonical(c: &Circuit) -> Result<(), TestCaseError> {
    let wires: Vec<Wire> = c.wires().collect();
    for (i, a) in wires.iter().enumerate() {
        for b in &wires[i + 1..] {
            prop_assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
        for b in &wires {
            for end in b.ends() {
                prop_assert!(!a.contains_interior(end), "{b} ends inside {a}");
            }
        }
    }
    for loc in c.points().locations() {
        let at = c.wires_at(loc);
        if c.components_at(loc).is_empty() && at.len() == 2 {
            prop_assert!(
                !at[0].is_collinear(&at[1]),
                "{} and {} should have merged at {loc}",
                at[0],
                at[1]
            );
        }
    }
    Ok(())
}

fn arb_wire() -> impl Strategy<Value = Wire> {
    (0i32..5, 0i32..5, 1i32..4, any::<bool>()).prop_map(|(x, y, len, horizontal)| {
        let a = Location::new(x * 10, y * 10);
        let b = if horizontal {
            a.translate(len * 10, 0)
        } else {
            a.translate(0, len * 10)
        };
        Wire::new(a, b).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn additions_stay_canonical(batches in prop::collection::vec(prop::collection::vec(arb_wire(), 1..3), 1..8)) {
        let mut c = Circuit::new("p");
        for batch in &batches {
            c.add_wires(batch);
            check_canonical(&c)?;
        }
        prop_assert!(c.connectivity().is_ok());
    }

    #[test]
    fn removals_stay_canonical(
        adds in prop::collection::vec(arb_wire(), 1..10),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..4),
    ) {
        let mut c = Circuit::new("p");
        for w in &adds {
            c.add_wires(&[*w]);
        }
        for pick in &picks {
            let wires: Vec<Wire> = c.wires().collect();
            if wires.is_empty() {
                break;
            }
            c.remove_wires(&[wires[pick.index(wires.len())]]);
            check_canonical(&c)?;
        }
    }

    #[test]
    fn undo_restores_wire_set(before in prop::collection::vec(arb_wire(), 0..6), extra in arb_wire()) {
        let mut c = Circuit::new("p");
        for w in &before {
            c.add_wires(&[*w]);
        }
        let mut snapshot: Vec<Wire> = c.wires().collect();
        snapshot.sort();
        let action = c.add_wires(&[extra]);
        c.apply(&action.inverse());
        let mut after: Vec<Wire> = c.wires().collect();
        after.sort();
        prop_assert_eq!(snapshot, after);
    }

    #[test]
    fn undo_restores_shortened_wire(
        before in prop::collection::vec(arb_wire(), 1..6),
        pick in any::<prop::sample::Index>(),
        cut in 1i32..4,
        from_start in any::<bool>(),
    ) {
        let mut c = Circuit::new("p");
        for w in &before {
            c.add_wires(&[*w]);
        }
        let mut snapshot: Vec<Wire> = c.wires().collect();
        snapshot.sort();
        let target = snapshot[pick.index(snapshot.len())];
        let cut = (cut * 10).min(target.length() as i32);
        let (dx, dy) = match target.axis() {
            Axis::Horizontal => (cut, 0),
            Axis::Vertical => (0, cut),
        };
        let drag = if from_start {
            Wire::new(target.e0(), target.e0().translate(dx, dy)).unwrap()
        } else {
            Wire::new(target.e1().translate(-dx, -dy), target.e1()).unwrap()
        };

        let action = c.shorten_wire(drag);
        prop_assert!(action.is_some(), "{drag} should shorten {target}");
        check_canonical(&c)?;
        c.apply(&action.unwrap().inverse());
        let mut after: Vec<Wire> = c.wires().collect();
        after.sort();
        prop_assert_eq!(snapshot, after);
    }
}
