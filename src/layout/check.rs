//! Constraint satisfaction checks
//!
//! Ids that no longer resolve are dropped, which can shrink a constraint
//! below its minimum cardinality and make it vacuously satisfied.

use super::types::{
    AlignmentConstraint, Constraint, ContainmentConstraint, DistributionConstraint,
    GridConstraint, LayoutObject, ObjectMap, SpacingConstraint,
};

/// Decide whether `constraint` holds for the given objects, within its tolerance
pub fn is_constraint_satisfied(constraint: &Constraint, objects_by_id: &ObjectMap) -> bool {
    match constraint {
        Constraint::Alignment(c) => is_alignment_satisfied(c, objects_by_id),
        Constraint::Spacing(c) => is_spacing_satisfied(c, objects_by_id),
        Constraint::Distribution(c) => is_distribution_satisfied(c, objects_by_id),
        Constraint::Grid(c) => is_grid_satisfied(c, objects_by_id),
        Constraint::Containment(c) => is_containment_satisfied(c, objects_by_id),
    }
}

/// Resolve ids in order, skipping the ones that are missing
pub(crate) fn resolve<'a>(ids: &[String], objects_by_id: &'a ObjectMap) -> Vec<&'a LayoutObject> {
    ids.iter().filter_map(|id| objects_by_id.get(id)).collect()
}

/// Every member within tolerance of the group mean, not of a fixed anchor
fn is_alignment_satisfied(c: &AlignmentConstraint, objects_by_id: &ObjectMap) -> bool {
    let values: Vec<f64> = resolve(&c.objects, objects_by_id)
        .into_iter()
        .map(|o| c.alignment_type.coordinate(o))
        .collect();
    if values.len() < 2 {
        return true;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().all(|v| (v - mean).abs() <= c.tolerance)
}

fn is_spacing_satisfied(c: &SpacingConstraint, objects_by_id: &ObjectMap) -> bool {
    let (Some(first), Some(second)) =
        (objects_by_id.get(&c.object1), objects_by_id.get(&c.object2))
    else {
        return true;
    };
    let actual = c.spacing_type.gap(first, second);
    (actual - c.distance).abs() <= c.tolerance
}

/// Gaps are taken in stored order, never re-sorted
fn is_distribution_satisfied(c: &DistributionConstraint, objects_by_id: &ObjectMap) -> bool {
    let members = resolve(&c.objects, objects_by_id);
    if members.len() < 3 {
        return true;
    }
    let axis = c.distribution_type;
    members
        .windows(2)
        .all(|pair| (axis.gap(pair[0], pair[1]) - c.spacing).abs() <= c.tolerance)
}

/// Existence only: cell geometry is not re-validated
fn is_grid_satisfied(c: &GridConstraint, objects_by_id: &ObjectMap) -> bool {
    if c.objects.len() < 2 || c.objects.iter().any(|row| row.len() < 2) {
        return true;
    }
    c.objects
        .iter()
        .flatten()
        .all(|id| objects_by_id.contains_key(id))
}

fn is_containment_satisfied(c: &ContainmentConstraint, objects_by_id: &ObjectMap) -> bool {
    let Some(container) = objects_by_id.get(&c.container) else {
        return true;
    };
    let bounds = container.bounds();
    resolve(&c.children, objects_by_id)
        .into_iter()
        .all(|child| bounds.contains_box(&child.bounds(), c.tolerance))
}
