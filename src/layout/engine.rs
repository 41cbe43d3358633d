//! Solve orchestration
//!
//! Solving runs in two phases:
//! 1. The deterministic quick-solver handles homogeneous alignment, spacing
//!    and distribution lists.
//! 2. Anything it declines or leaves unsatisfied escalates to a
//!    [`FallbackSolver`]. [`CassowaryFallback`] is the bundled one.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::check::is_constraint_satisfied;
use super::collector::ConstraintCollector;
use super::error::LayoutError;
use super::index_objects;
use super::quick::quick_solve;
use super::solver::{ConstraintSolver, SolverError};
use super::types::{satisfaction_score, Adjustment, Constraint, LayoutObject, SolveResult};

/// Smallest position change reported as an adjustment
const POSITION_EPSILON: f64 = 1e-6;

/// A solver that is consulted when the quick-solver cannot finish the job.
///
/// Implementations receive the original constraints and objects, never the
/// quick-solver's partial result.
pub trait FallbackSolver {
    fn solve(
        &self,
        constraints: &[Constraint],
        objects: &[LayoutObject],
        fixed_object_ids: &HashSet<String>,
    ) -> Result<SolveResult, SolverError>;
}

/// Which phase produced a [`SolveOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SolveMethod {
    Quick,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutcome {
    pub result: SolveResult,
    pub method: SolveMethod,
}

/// Cassowary-backed fallback.
///
/// Fixed objects are pinned, movable ones are pulled towards where they are
/// now, and every layout constraint is a strong linear relation. Whatever
/// the solver could not honour shows up as unsatisfied after re-checking
/// the solved geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CassowaryFallback;

impl FallbackSolver for CassowaryFallback {
    fn solve(
        &self,
        constraints: &[Constraint],
        objects: &[LayoutObject],
        fixed_object_ids: &HashSet<String>,
    ) -> Result<SolveResult, SolverError> {
        if constraints.is_empty() {
            return Ok(SolveResult::empty());
        }
        let by_id = index_objects(objects);

        // Phase 1: translate layout constraints into solver relations
        let mut collector = ConstraintCollector::new(&by_id, fixed_object_ids);
        collector.collect(constraints);
        debug!(
            constraints = constraints.len(),
            relations = collector.constraints.len(),
            "fallback collected solver constraints"
        );

        let mut solver = ConstraintSolver::new();
        for constraint in collector.constraints {
            solver.add_constraint(constraint)?;
        }

        // Phase 2: solve and read back moved objects
        let solution = solver.solve()?;
        let referenced: HashSet<&str> = constraints.iter().flat_map(|c| c.object_ids()).collect();

        let mut working = by_id.clone();
        let mut adjustments = Vec::new();
        for object in objects {
            if fixed_object_ids.contains(&object.id) || !referenced.contains(object.id.as_str()) {
                continue;
            }
            let (new_x, new_y) = solution.position(&object.id)?;
            if (new_x - object.x).abs() <= POSITION_EPSILON
                && (new_y - object.y).abs() <= POSITION_EPSILON
            {
                continue;
            }
            trace!(object = %object.id, new_x, new_y, "fallback move");
            adjustments.push(Adjustment {
                object_id: object.id.clone(),
                new_x,
                new_y,
                reasoning: format!(
                    "moved {} from ({:.1}, {:.1}) to ({:.1}, {:.1}) to satisfy constraints",
                    object.id, object.x, object.y, new_x, new_y
                ),
            });
            working.insert(
                object.id.clone(),
                LayoutObject {
                    x: new_x,
                    y: new_y,
                    ..object.clone()
                },
            );
        }

        // Phase 3: classify against the solved geometry
        let (satisfied, unsatisfied): (Vec<Constraint>, Vec<Constraint>) = constraints
            .iter()
            .cloned()
            .partition(|c| is_constraint_satisfied(c, &working));

        Ok(SolveResult {
            score: satisfaction_score(satisfied.len(), constraints.len()),
            adjustments,
            satisfied,
            unsatisfied,
        })
    }
}

/// Solve `constraints`, quick path first.
///
/// The fallback runs when the quick-solver declines or leaves constraints
/// unsatisfied. Its result replaces the quick one unless it scores lower.
pub fn solve(
    constraints: &[Constraint],
    objects: &[LayoutObject],
    fixed_object_ids: &HashSet<String>,
    fallback: &dyn FallbackSolver,
) -> Result<SolveOutcome, LayoutError> {
    validate_objects(objects)?;
    validate_constraints(constraints)?;

    let quick = quick_solve(constraints, objects, fixed_object_ids);
    if let Some(result) = &quick {
        if result.unsatisfied.is_empty() {
            return Ok(SolveOutcome {
                result: result.clone(),
                method: SolveMethod::Quick,
            });
        }
        debug!(
            unsatisfied = result.unsatisfied.len(),
            "quick-solve left constraints unsatisfied, escalating"
        );
    }

    let escalated = fallback.solve(constraints, objects, fixed_object_ids)?;
    debug!(score = escalated.score, "fallback finished");

    match quick {
        Some(result) if result.score > escalated.score => Ok(SolveOutcome {
            result,
            method: SolveMethod::Quick,
        }),
        _ => Ok(SolveOutcome {
            result: escalated,
            method: SolveMethod::Fallback,
        }),
    }
}

/// Apply adjustments in order; later entries for the same object win and
/// unknown ids are ignored.
pub fn apply_adjustments(objects: &[LayoutObject], adjustments: &[Adjustment]) -> Vec<LayoutObject> {
    let mut updated = objects.to_vec();
    for adjustment in adjustments {
        if let Some(object) = updated.iter_mut().find(|o| o.id == adjustment.object_id) {
            object.x = adjustment.new_x;
            object.y = adjustment.new_y;
        }
    }
    updated
}

fn validate_objects(objects: &[LayoutObject]) -> Result<(), LayoutError> {
    for object in objects {
        for (field, value) in [
            ("x", object.x),
            ("y", object.y),
            ("width", object.width),
            ("height", object.height),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::invalid_object(
                    &object.id,
                    format!("{} is not finite", field),
                ));
            }
        }
        if object.width < 0.0 || object.height < 0.0 {
            return Err(LayoutError::invalid_object(&object.id, "size is negative"));
        }
    }
    Ok(())
}

fn validate_constraints(constraints: &[Constraint]) -> Result<(), LayoutError> {
    for constraint in constraints {
        let kind = constraint.kind();
        let tolerance = constraint.tolerance();
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(LayoutError::invalid_constraint(
                kind,
                format!("tolerance {} must be a non-negative number", tolerance),
            ));
        }
        let values: Vec<(&str, f64)> = match constraint {
            Constraint::Alignment(c) => vec![("coordinate", c.coordinate)],
            Constraint::Spacing(c) => vec![("distance", c.distance)],
            Constraint::Distribution(c) => vec![("spacing", c.spacing)],
            Constraint::Grid(c) => vec![("row gap", c.row_gap), ("column gap", c.column_gap)],
            Constraint::Containment(_) => vec![],
        };
        if let Some((name, value)) = values.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(LayoutError::invalid_constraint(
                kind,
                format!("{} {} is not finite", name, value),
            ));
        }
    }
    Ok(())
}
