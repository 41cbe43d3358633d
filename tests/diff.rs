//! Integration tests for diffing constraints across a single-object edit.

use std::collections::BTreeSet;

use layout_intent::layout::{ContainmentConstraint, SpacingConstraint};
use layout_intent::{
    compute_constraint_diff, detect_constraints, Axis, Constraint, ConstraintKind, LayoutObject,
};
use pretty_assertions::assert_eq;

fn row() -> Vec<LayoutObject> {
    vec![
        LayoutObject::new("a", 0.0, 0.0, 40.0, 20.0),
        LayoutObject::new("b", 60.0, 0.0, 40.0, 20.0),
        LayoutObject::new("c", 120.0, 0.0, 40.0, 20.0),
        LayoutObject::new("x", 0.0, 200.0, 40.0, 20.0),
        LayoutObject::new("y", 60.0, 200.0, 40.0, 20.0),
    ]
}

fn moved(objects: &[LayoutObject], id: &str, dx: f64, dy: f64) -> Vec<LayoutObject> {
    objects
        .iter()
        .map(|o| if o.id == id { o.translated(dx, dy) } else { o.clone() })
        .collect()
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn horizontal_spacing(first: &str, second: &str, distance: f64) -> Constraint {
    Constraint::Spacing(SpacingConstraint {
        spacing_type: Axis::Horizontal,
        object1: first.to_string(),
        object2: second.to_string(),
        distance,
        tolerance: 3.0,
    })
}

#[test]
fn test_diff_locality() {
    let touches_x = horizontal_spacing("x", "y", 20.0);
    let elsewhere = horizontal_spacing("a", "b", 20.0);
    let after = moved(&row(), "x", -30.0, 0.0);

    let diff = compute_constraint_diff(&[touches_x.clone(), elsewhere.clone()], &after, "x");

    assert_eq!(diff.preserved, vec![elsewhere]);
    assert_eq!(diff.violated, vec![touches_x]);
    assert_eq!(diff.affected_objects, set(&["x", "y"]));
    assert_eq!(diff.moved_object, "x");
}

#[test]
fn test_small_move_keeps_constraints() {
    let before = detect_constraints(&row());
    let after = moved(&row(), "b", 1.0, 1.0);

    let diff = compute_constraint_diff(&before, &after, "b");

    assert!(diff.violated.is_empty(), "violated: {:?}", diff.violated);
    assert_eq!(diff.preserved.len(), before.len());
    assert_eq!(diff.affected_objects, set(&["b"]));
}

#[test]
fn test_dragging_away_breaks_its_relationships() {
    let before = detect_constraints(&row());
    let after = moved(&row(), "c", 50.0, 100.0);

    let diff = compute_constraint_diff(&before, &after, "c");

    let violated_kinds: BTreeSet<String> =
        diff.violated.iter().map(|c| c.kind().to_string()).collect();
    assert!(violated_kinds.contains("alignment"));
    assert!(violated_kinds.contains("distribution"));
    assert!(diff.affected_objects.contains("a"));
    assert!(diff.affected_objects.contains("b"));

    // the untouched bottom pair survives without being re-checked
    assert!(diff
        .preserved
        .iter()
        .any(|c| c.references("x") && c.references("y")));
}

#[test]
fn test_new_constraints_are_a_full_detection() {
    let before = detect_constraints(&row());
    let after = moved(&row(), "x", 0.0, 0.0);

    let diff = compute_constraint_diff(&before, &after, "x");

    // nothing moved: everything rediscovered, nothing deduplicated
    assert_eq!(diff.new_constraints, before);
    assert!(diff.novel_constraints().is_empty());
}

#[test]
fn test_novel_constraints_skip_rediscovered_relationships() {
    let before = detect_constraints(&row());
    // z completes the bottom row under c
    let mut after = row();
    after.push(LayoutObject::new("z", 120.0, 200.0, 40.0, 20.0));

    let diff = compute_constraint_diff(&before, &after, "z");

    let novel: Vec<&Constraint> = diff.novel_constraints();
    assert!(novel.iter().all(|c| c.references("z")));
    assert!(novel
        .iter()
        .any(|c| c.kind() == ConstraintKind::Distribution));
}

#[test]
fn test_violated_containment_affects_container_and_children() {
    let containment = Constraint::Containment(ContainmentConstraint {
        container: "a".to_string(),
        children: vec!["b".to_string()],
        tolerance: 0.0,
    });
    let diff = compute_constraint_diff(&[containment], &row(), "b");

    assert_eq!(diff.violated.len(), 1);
    assert_eq!(diff.affected_objects, set(&["a", "b"]));
}
