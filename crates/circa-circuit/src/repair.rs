//! Wire canonicalization.
//!
//! After every edit the wire set satisfies:
//!
//! - no two wires overlap;
//! - no wire runs through a component end, or through a point where some
//!   other wire ends (a T junction is always split at the junction);
//! - two collinear wires meeting end to end with nothing else at the
//!   meeting point are merged into one.
//!
//! Wires that merely cross are left alone. Changes the caller did not
//! ask for (splits and merges) are recorded as incidental so an undo
//! restores the exact prior layout.

use std::collections::BTreeMap;

use circa_core::Location;
use indexmap::IndexSet;

use crate::action::EditAction;
use crate::circuit::Circuit;
use crate::component::Element;
use crate::wire::{Axis, Wire};

/// Add `requested` wires to `circuit`.
pub(crate) fn add_wires(circuit: &mut Circuit, requested: &[Wire]) -> EditAction {
    let mut action = EditAction::new();
    let fresh: IndexSet<Wire> = requested
        .iter()
        .copied()
        .filter(|w| !circuit.has_wire(w))
        .collect();
    if fresh.is_empty() {
        return action;
    }

    let mut by_line: BTreeMap<(Axis, i32), Vec<Wire>> = BTreeMap::new();
    for &w in &fresh {
        by_line.entry(w.line_key()).or_default().push(w);
    }

    let mut removed: IndexSet<Wire> = IndexSet::new();
    let mut added: IndexSet<Wire> = IndexSet::new();
    for (key, news) in &by_line {
        let existing: Vec<Wire> = circuit.wires().filter(|w| w.line_key() == *key).collect();
        for run in runs(&existing, news) {
            removed.extend(run.members.iter().copied().filter(|w| circuit.has_wire(w)));
            let cuts = cuts_on(circuit, &run.span, &fresh);
            added.extend(segments(&run.span, &cuts));
        }
    }

    // Pieces identical to a removed wire are simply kept.
    let unchanged: Vec<Wire> = removed.intersection(&added).copied().collect();
    for w in &unchanged {
        removed.shift_remove(w);
        added.shift_remove(w);
    }
    for &w in &removed {
        circuit.delete_wire(w);
        action.push_incidental_removal(w);
    }
    for &w in &added {
        circuit.insert_wire(w);
        if fresh.iter().any(|f| f.overlaps(&w)) {
            action.push_addition(Element::Wire(w));
        } else {
            action.push_incidental_addition(w);
        }
    }

    let ends: Vec<Location> = added.iter().flat_map(|w| w.ends()).collect();
    split_through(circuit, &ends, &fresh, &mut action);
    action
}

/// A maximal group of collinear wires whose closed spans intersect,
/// containing at least one requested wire.
struct Run {
    span: Wire,
    members: Vec<Wire>,
}

struct OpenRun {
    lo: i32,
    hi: i32,
    members: Vec<Wire>,
    any_new: bool,
}

impl OpenRun {
    fn close(self) -> Option<Run> {
        let sample = self.members[0];
        self.any_new.then(|| Run {
            span: Wire::from_span(sample.axis(), sample.line(), self.lo, self.hi),
            members: self.members,
        })
    }
}

fn runs(existing: &[Wire], news: &[Wire]) -> Vec<Run> {
    let mut all: Vec<(Wire, bool)> = existing
        .iter()
        .map(|&w| (w, false))
        .chain(news.iter().map(|&w| (w, true)))
        .collect();
    all.sort_by_key(|(w, _)| w.span());

    let mut out = Vec::new();
    let mut open: Option<OpenRun> = None;
    for (w, is_new) in all {
        let (lo, hi) = w.span();
        match open.as_mut() {
            Some(run) if lo <= run.hi => {
                run.hi = run.hi.max(hi);
                run.members.push(w);
                run.any_new |= is_new;
            }
            _ => {
                out.extend(open.take().and_then(OpenRun::close));
                open = Some(OpenRun {
                    lo,
                    hi,
                    members: vec![w],
                    any_new: is_new,
                });
            }
        }
    }
    out.extend(open.and_then(OpenRun::close));
    out
}

/// Interior points of `span` where it must be cut: component ends, and
/// ends of wires off its line (existing or being added).
fn cuts_on(circuit: &Circuit, span: &Wire, fresh: &IndexSet<Wire>) -> Vec<Location> {
    let points = circuit.points();
    let mut cuts: Vec<Location> = points
        .locations_on(span)
        .into_iter()
        .filter(|&p| span.contains_interior(p))
        .filter(|&p| {
            points.has_component_at(p)
                || points.wires_at(p).iter().any(|w| !w.is_collinear(span))
        })
        .collect();
    cuts.extend(
        fresh
            .iter()
            .filter(|w| !w.is_collinear(span))
            .flat_map(|w| w.ends())
            .filter(|&p| span.contains_interior(p)),
    );
    cuts.sort_by_key(|&p| span.coord_of(p));
    cuts.dedup();
    cuts
}

fn segments(span: &Wire, cuts: &[Location]) -> Vec<Wire> {
    let mut out = Vec::with_capacity(cuts.len() + 1);
    let mut start = span.e0();
    for &c in cuts {
        out.push(Wire::between(start, c));
        start = c;
    }
    out.push(Wire::between(start, span.e1()));
    out
}

/// Split every wire running through one of `locations` when a component
/// end or another wire's end sits there. Pieces of wires overlapping a
/// `requested` wire count as requested additions.
pub(crate) fn split_through(
    circuit: &mut Circuit,
    locations: &[Location],
    requested: &IndexSet<Wire>,
    action: &mut EditAction,
) {
    let mut locations = locations.to_vec();
    locations.sort();
    locations.dedup();
    for p in locations {
        let occupied = {
            let points = circuit.points();
            points.has_component_at(p) || !points.wires_at(p).is_empty()
        };
        if !occupied {
            continue;
        }
        let through: Vec<Wire> = circuit.wires().filter(|w| w.contains_interior(p)).collect();
        for w in through {
            let Some((a, b)) = w.split_at(p) else {
                continue;
            };
            log::trace!("{}: split {w} at {p}", circuit.name());
            circuit.delete_wire(w);
            action.push_incidental_removal(w);
            for piece in [a, b] {
                circuit.insert_wire(piece);
                if requested.iter().any(|r| r.overlaps(&piece)) {
                    action.push_addition(Element::Wire(piece));
                } else {
                    action.push_incidental_addition(piece);
                }
            }
        }
    }
}

/// Remove `elements`, then merge collinear pairs left meeting at the
/// freed points.
pub(crate) fn remove(circuit: &mut Circuit, elements: &[Element]) -> EditAction {
    let mut action = EditAction::new();
    let mut freed = Vec::new();
    for &e in elements {
        match e {
            Element::Wire(w) => {
                if circuit.delete_wire(w) {
                    action.push_removal(e);
                    freed.extend(w.ends());
                }
            }
            Element::Component(id) => {
                if let Some(c) = circuit.delete_component(id) {
                    log::debug!("{}: remove {} {id}", circuit.name(), c.name());
                    freed.extend(c.ends().iter().map(|end| end.location));
                    action.push_removal(e);
                    action.carry(id, c);
                }
            }
        }
    }
    merge_at(circuit, &freed, &mut action);
    action
}

/// Merge the two wires at each of `locations` when they are collinear
/// and nothing else is there.
fn merge_at(circuit: &mut Circuit, locations: &[Location], action: &mut EditAction) {
    let mut locations = locations.to_vec();
    locations.sort();
    locations.dedup();
    for p in locations {
        if circuit.points().has_component_at(p) {
            continue;
        }
        let wires = circuit.wires_at(p);
        let [a, b] = wires.as_slice() else {
            continue;
        };
        if !a.is_collinear(b) {
            continue;
        }
        let merged = Wire::between(a.other_end(p), b.other_end(p));
        log::trace!("{}: merge {a} and {b} into {merged}", circuit.name());
        for w in [*a, *b] {
            circuit.delete_wire(w);
            action.push_incidental_removal(w);
        }
        circuit.insert_wire(merged);
        action.push_incidental_addition(merged);
    }
}

/// Shorten the wire `drag` was cut from.
pub(crate) fn shorten(circuit: &mut Circuit, drag: Wire) -> Option<EditAction> {
    let target = circuit.wires().find(|w| {
        w.is_collinear(&drag)
            && w.contains(drag.e0())
            && w.contains(drag.e1())
            && (drag.e0() == w.e0() || drag.e1() == w.e1())
    })?;

    let mut action = EditAction::new();
    circuit.delete_wire(target);
    action.push_removal(Element::Wire(target));

    let freed = if drag == target {
        target.ends().to_vec()
    } else {
        let fixed = if drag.e0() == target.e0() {
            target.e1()
        } else {
            target.e0()
        };
        let shared = target.other_end(fixed);
        let new_end = drag.other_end(shared);
        let remainder = Wire::between(fixed, new_end);
        circuit.insert_wire(remainder);
        action.push_addition(Element::Wire(remainder));

        // The new end landing mid-span on another wire joins it there.
        let crossed: Option<Wire> = circuit
            .wires()
            .find(|w| *w != remainder && w.contains_interior(new_end));
        if let Some(w) = crossed {
            if let Some((a, b)) = w.split_at(new_end) {
                circuit.delete_wire(w);
                action.push_incidental_removal(w);
                circuit.insert_wire(a);
                circuit.insert_wire(b);
                action.push_incidental_addition(a);
                action.push_incidental_addition(b);
            }
        }
        vec![shared]
    };
    merge_at(circuit, &freed, &mut action);
    Some(action)
}

/// Coalesce collinear wires sharing exactly one endpoint until no two
/// can be merged. Does not consult any circuit.
pub fn merge_exclusive(wires: &[Wire]) -> Vec<Wire> {
    let mut out: Vec<Wire> = wires.to_vec();
    loop {
        let mut found = None;
        'search: for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                if !out[i].is_collinear(&out[j]) {
                    continue;
                }
                if let Some(p) = out[i].shared_end(&out[j]) {
                    found = Some((i, j, Wire::between(out[i].other_end(p), out[j].other_end(p))));
                    break 'search;
                }
            }
        }
        match found {
            Some((i, j, merged)) => {
                out.remove(j);
                out[i] = merged;
            }
            None => return out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::end::EndData;
    use crate::testing::Stub;
    use circa_core::BitWidth;
    use proptest::prelude::*;

    fn w(x0: i32, y0: i32, x1: i32, y1: i32) -> Wire {
        Wire::from_coords(x0, y0, x1, y1)
    }

    fn wires(c: &Circuit) -> Vec<Wire> {
        let mut v: Vec<Wire> = c.wires().collect();
        v.sort();
        v
    }

    fn probe_at(c: &mut Circuit, x: i32, y: i32) {
        let p = Location::new(x, y);
        c.add_component(Component::leaf(p, Stub::new(vec![EndData::input(p, BitWidth::ONE)])));
    }

    #[test]
    fn identical_wire_is_a_no_op() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        let action = c.add_wires(&[w(40, 0, 0, 0)]);
        assert!(action.net_additions().is_empty());
        assert!(action.net_removals().is_empty());
        assert!(action.is_empty());
    }

    #[test]
    fn covered_wire_is_a_no_op() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        assert!(c.add_wires(&[w(10, 0, 30, 0)]).is_empty());
        assert_eq!(wires(&c), vec![w(0, 0, 40, 0)]);
    }

    #[test]
    fn collinear_extension_merges() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 20, 0)]);
        let action = c.add_wires(&[w(20, 0, 50, 0)]);
        assert_eq!(wires(&c), vec![w(0, 0, 50, 0)]);
        assert_eq!(action.additions(), &[Element::Wire(w(0, 0, 50, 0))]);
        assert_eq!(action.incidental_removals(), &[w(0, 0, 20, 0)]);
    }

    #[test]
    fn overlapping_wires_merge() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 30, 0)]);
        c.add_wires(&[w(20, 0, 60, 0)]);
        assert_eq!(wires(&c), vec![w(0, 0, 60, 0)]);
    }

    #[test]
    fn extension_stops_at_component_end() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 20, 0)]);
        probe_at(&mut c, 20, 0);
        let action = c.add_wires(&[w(20, 0, 50, 0)]);
        assert_eq!(wires(&c), vec![w(0, 0, 20, 0), w(20, 0, 50, 0)]);
        assert!(action.incidental_removals().is_empty());
    }

    #[test]
    fn t_junction_splits_the_crossed_wire() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        let action = c.add_wires(&[w(20, 0, 20, 30)]);
        assert_eq!(wires(&c), vec![w(0, 0, 20, 0), w(20, 0, 40, 0), w(20, 0, 20, 30)]);
        assert_eq!(action.additions(), &[Element::Wire(w(20, 0, 20, 30))]);
        assert_eq!(action.incidental_removals(), &[w(0, 0, 40, 0)]);
        assert_eq!(action.incidental_additions().len(), 2);
    }

    #[test]
    fn new_wire_is_split_at_existing_branch() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(20, -20, 20, 0)]);
        c.add_wires(&[w(0, 0, 40, 0)]);
        assert_eq!(wires(&c), vec![w(20, -20, 20, 0), w(0, 0, 20, 0), w(20, 0, 40, 0)]);
    }

    #[test]
    fn crossing_wires_stay_whole() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 20, 40, 20)]);
        c.add_wires(&[w(20, 0, 20, 40)]);
        assert_eq!(wires(&c), vec![w(20, 0, 20, 40), w(0, 20, 40, 20)]);
    }

    #[test]
    fn component_splits_wire_it_lands_on() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        probe_at(&mut c, 10, 0);
        assert_eq!(wires(&c), vec![w(0, 0, 10, 0), w(10, 0, 40, 0)]);
    }

    #[test]
    fn removing_component_merges_collinear_pair() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        let (id, _) = c.add_component(Component::leaf(
            Location::new(10, 0),
            Stub::new(vec![EndData::input(Location::new(10, 0), BitWidth::ONE)]),
        ));
        let action = c.remove_component(id);
        assert_eq!(wires(&c), vec![w(0, 0, 40, 0)]);
        assert_eq!(action.incidental_additions(), &[w(0, 0, 40, 0)]);
    }

    #[test]
    fn removing_branch_component_between_perpendicular_wires_never_merges() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 20, 0), w(20, 0, 20, 30)]);
        let (id, _) = c.add_component(Component::leaf(
            Location::new(20, 0),
            Stub::new(vec![EndData::input(Location::new(20, 0), BitWidth::ONE)]),
        ));
        let action = c.remove_component(id);
        assert_eq!(wires(&c), vec![w(0, 0, 20, 0), w(20, 0, 20, 30)]);
        assert!(action.incidental_additions().is_empty());
    }

    #[test]
    fn removing_branch_merges_the_straight_pair() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        c.add_wires(&[w(20, 0, 20, 30)]);
        let action = c.remove_wires(&[w(20, 0, 20, 30)]);
        assert_eq!(wires(&c), vec![w(0, 0, 40, 0)]);
        assert_eq!(action.removals(), &[Element::Wire(w(20, 0, 20, 30))]);
        assert_eq!(action.incidental_removals().len(), 2);
    }

    #[test]
    fn undo_restores_prior_layout() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 40, 0)]);
        let before = wires(&c);
        let action = c.add_wires(&[w(20, 0, 20, 30)]);
        c.apply(&action.inverse());
        assert_eq!(wires(&c), before);
        c.apply(&action);
        assert_eq!(wires(&c).len(), 3);
    }

    #[test]
    fn shorten_from_one_end() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 50, 0)]);
        let action = c.shorten_wire(w(30, 0, 50, 0)).unwrap();
        assert_eq!(wires(&c), vec![w(0, 0, 30, 0)]);
        assert_eq!(action.removals(), &[Element::Wire(w(0, 0, 50, 0))]);
        assert_eq!(action.additions(), &[Element::Wire(w(0, 0, 30, 0))]);
    }

    #[test]
    fn shorten_unrelated_drag_is_none() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 50, 0)]);
        assert!(c.shorten_wire(w(10, 0, 20, 0)).is_none());
        assert!(c.shorten_wire(w(0, 10, 20, 10)).is_none());
    }

    #[test]
    fn shorten_whole_wire_removes_and_merges_freed_corner() {
        let mut c = Circuit::new("t");
        // Vertical pass-through at (20, 0) held apart by a horizontal stub.
        c.add_wires(&[w(20, -30, 20, 30)]);
        c.add_wires(&[w(20, 0, 50, 0)]);
        assert_eq!(wires(&c).len(), 3);
        let action = c.shorten_wire(w(20, 0, 50, 0)).unwrap();
        assert_eq!(wires(&c), vec![w(20, -30, 20, 30)]);
        assert_eq!(action.incidental_additions(), &[w(20, -30, 20, 30)]);
    }

    #[test]
    fn shortened_end_landing_mid_span_splits() {
        let mut c = Circuit::new("t");
        c.add_wires(&[w(0, 0, 60, 0)]);
        c.add_wires(&[w(45, -10, 45, 10)]);
        // Plain crossing: nothing split yet.
        assert_eq!(wires(&c).len(), 2);
        c.shorten_wire(w(45, 0, 60, 0)).unwrap();
        assert_eq!(wires(&c), vec![w(45, -10, 45, 0), w(0, 0, 45, 0), w(45, 0, 45, 10)]);
    }

    #[test]
    fn merge_exclusive_chains() {
        let merged = merge_exclusive(&[w(0, 0, 10, 0), w(20, 0, 30, 0), w(10, 0, 20, 0)]);
        assert_eq!(merged, vec![w(0, 0, 30, 0)]);
        let perpendicular = [w(0, 0, 10, 0), w(10, 0, 10, 10)];
        assert_eq!(merge_exclusive(&perpendicular), perpendicular.to_vec());
    }

    proptest! {
        #[test]
        fn merge_exclusive_spans_both_ends(a in -100i32..100, len1 in 1i32..50, len2 in 1i32..50, y in -20i32..20) {
            let first = w(a, y, a + len1, y);
            let second = w(a + len1, y, a + len1 + len2, y);
            let merged = merge_exclusive(&[first, second]);
            prop_assert_eq!(merged.clone(), vec![w(a, y, a + len1 + len2, y)]);
            prop_assert_eq!(merge_exclusive(&merged), merged);
        }
    }
}
