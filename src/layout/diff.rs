//! Constraint diffing across a single edit

use std::collections::BTreeSet;

use tracing::debug;

use super::check::is_constraint_satisfied;
use super::config::DetectorConfig;
use super::detect::ConstraintDetector;
use super::index_objects;
use super::types::{Constraint, ConstraintDiffResult, LayoutObject};

/// Classify `before_constraints` against the after-state of one moved object.
///
/// Constraints that do not reference the moved object are preserved without
/// re-checking, since nothing they touch has moved. `new_constraints` is a
/// fresh detection over `after_objects` and may repeat preserved ones.
pub fn compute_constraint_diff(
    before_constraints: &[Constraint],
    after_objects: &[LayoutObject],
    moved_object_id: &str,
) -> ConstraintDiffResult {
    compute_constraint_diff_with_config(
        before_constraints,
        after_objects,
        moved_object_id,
        &DetectorConfig::default(),
    )
}

/// [`compute_constraint_diff`] with a custom detector configuration
pub fn compute_constraint_diff_with_config(
    before_constraints: &[Constraint],
    after_objects: &[LayoutObject],
    moved_object_id: &str,
    config: &DetectorConfig,
) -> ConstraintDiffResult {
    let after_by_id = index_objects(after_objects);

    let (preserved, violated): (Vec<Constraint>, Vec<Constraint>) = before_constraints
        .iter()
        .cloned()
        .partition(|c| {
            !c.references(moved_object_id) || is_constraint_satisfied(c, &after_by_id)
        });

    let mut affected_objects = BTreeSet::from([moved_object_id.to_string()]);
    for constraint in &violated {
        affected_objects.extend(constraint.object_ids().into_iter().map(str::to_string));
    }

    let new_constraints = ConstraintDetector::new(config.clone()).detect(after_objects);

    debug!(
        moved = moved_object_id,
        preserved = preserved.len(),
        violated = violated.len(),
        new = new_constraints.len(),
        affected = affected_objects.len(),
        "computed constraint diff"
    );

    ConstraintDiffResult {
        preserved,
        violated,
        new_constraints,
        affected_objects,
        moved_object: moved_object_id.to_string(),
    }
}
