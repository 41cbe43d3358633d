//! Deterministic quick-solver
//!
//! Repairs homogeneous constraint lists (all alignment, all spacing, or all
//! distribution) with direct geometric moves. Anything else returns `None`,
//! which tells the caller to escalate to a fallback solver.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::check::{is_constraint_satisfied, resolve};
use super::index_objects;
use super::types::{
    satisfaction_score, Adjustment, AlignmentConstraint, Axis, Constraint, ConstraintKind,
    DistributionConstraint, LayoutObject, ObjectMap, SolveResult, SpacingConstraint,
};

/// Moves smaller than this are not recorded
const POSITION_EPSILON: f64 = 1e-6;

/// Solve a homogeneous constraint list, or return `None` to escalate.
///
/// Grid and containment constraints always escalate. An empty list is
/// trivially solved with score 100.
pub fn quick_solve(
    constraints: &[Constraint],
    objects: &[LayoutObject],
    fixed_object_ids: &HashSet<String>,
) -> Option<SolveResult> {
    let Some(first) = constraints.first() else {
        return Some(SolveResult::empty());
    };

    let kind = first.kind();
    if let Some(other) = constraints.iter().find(|c| c.kind() != kind) {
        debug!(%kind, other = %other.kind(), "quick-solve declined: mixed constraint kinds");
        return None;
    }
    if matches!(kind, ConstraintKind::Grid | ConstraintKind::Containment) {
        debug!(%kind, "quick-solve declined: no quick path");
        return None;
    }

    let mut solver = QuickSolver::new(objects, fixed_object_ids);
    for constraint in constraints {
        let outcome = match constraint {
            Constraint::Alignment(c) => solver.solve_alignment(c),
            Constraint::Spacing(c) => solver.solve_spacing(c),
            Constraint::Distribution(c) => solver.solve_distribution(c),
            Constraint::Grid(_) | Constraint::Containment(_) => return None,
        };
        solver.record(constraint, outcome);
    }

    let result = solver.finish(constraints.len());
    debug!(
        %kind,
        score = result.score,
        adjustments = result.adjustments.len(),
        unsatisfied = result.unsatisfied.len(),
        "quick-solve finished"
    );
    Some(result)
}

/// Whether a processed constraint could be repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Held once its own moves were applied
    Satisfied,
    /// Nothing to move: too few resolvable members, or every member fixed
    Vacuous,
    Impossible,
}

struct QuickSolver<'a> {
    working: ObjectMap,
    fixed: &'a HashSet<String>,
    adjustments: Vec<Adjustment>,
    outcomes: Vec<(Constraint, Outcome)>,
}

impl<'a> QuickSolver<'a> {
    fn new(objects: &[LayoutObject], fixed: &'a HashSet<String>) -> Self {
        Self {
            working: index_objects(objects),
            fixed,
            adjustments: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    fn is_fixed(&self, id: &str) -> bool {
        self.fixed.contains(id)
    }

    fn record(&mut self, constraint: &Constraint, outcome: Outcome) {
        self.outcomes.push((constraint.clone(), outcome));
    }

    /// Classify against the final working copy.
    ///
    /// A later constraint can move an object an earlier one already placed,
    /// so a repaired constraint only counts as satisfied if it still holds
    /// once every move has been applied.
    fn finish(self, total: usize) -> SolveResult {
        let mut satisfied = Vec::new();
        let mut unsatisfied = Vec::new();
        for (constraint, outcome) in self.outcomes {
            let holds = match outcome {
                Outcome::Vacuous => true,
                Outcome::Satisfied => {
                    let holds = is_constraint_satisfied(&constraint, &self.working);
                    if !holds {
                        debug!(%constraint, "quick-solve: broken by a later move");
                    }
                    holds
                }
                Outcome::Impossible => false,
            };
            if holds {
                satisfied.push(constraint);
            } else {
                unsatisfied.push(constraint);
            }
        }

        SolveResult {
            score: satisfaction_score(satisfied.len(), total),
            adjustments: self.adjustments,
            satisfied,
            unsatisfied,
        }
    }

    /// Shift one object in the working copy and record the adjustment
    fn shift(&mut self, id: &str, axis: Axis, delta: f64, reasoning: String) {
        let Some(object) = self.working.get(id) else {
            return;
        };
        let moved = axis.shift(object, delta);
        trace!(object = id, %axis, delta, "quick-solve move");
        self.adjustments.push(Adjustment {
            object_id: id.to_string(),
            new_x: moved.x,
            new_y: moved.y,
            reasoning,
        });
        self.working.insert(id.to_string(), moved);
    }

    // ========================================================================
    // Alignment
    // ========================================================================

    /// Pull movable members onto the first fixed member, or onto the group
    /// mean when none is fixed.
    ///
    /// The fixed members decide the result. When every member is fixed there
    /// is nothing to move, so the constraint is vacuously satisfied, even if
    /// those members disagree. When some members can move, the movable ones
    /// are snapped to the anchor and the constraint is re-checked; fixed
    /// members that disagree with the anchor then leave it impossible.
    fn solve_alignment(&mut self, c: &AlignmentConstraint) -> Outcome {
        let members: Vec<(String, f64)> = resolve(&c.objects, &self.working)
            .into_iter()
            .map(|o| (o.id.clone(), c.alignment_type.coordinate(o)))
            .collect();
        if members.len() < 2 || members.iter().all(|(id, _)| self.is_fixed(id)) {
            return Outcome::Vacuous;
        }

        let anchor = members.iter().find(|(id, _)| self.is_fixed(id));
        let target = match anchor {
            Some((_, value)) => *value,
            None => members.iter().map(|(_, v)| v).sum::<f64>() / members.len() as f64,
        };
        let target_source = match anchor {
            Some((id, _)) => format!("fixed object {}", id),
            None => "group mean".to_string(),
        };

        let axis = c.alignment_type.axis();
        for (id, value) in &members {
            if self.is_fixed(id) || (value - target).abs() <= c.tolerance {
                continue;
            }
            let reasoning = format!(
                "align {} to {} {:.1} ({})",
                id, c.alignment_type, target, target_source
            );
            self.shift(id, axis, target - value, reasoning);
        }

        let constraint = Constraint::Alignment(c.clone());
        if is_constraint_satisfied(&constraint, &self.working) {
            return Outcome::Satisfied;
        }

        // Members left inside the band can still straddle the new mean; snap them too
        for (id, _) in &members {
            if self.is_fixed(id) {
                continue;
            }
            let Some(current) = self.working.get(id).map(|o| c.alignment_type.coordinate(o))
            else {
                continue;
            };
            if (current - target).abs() > POSITION_EPSILON {
                let reasoning = format!("snap {} to {} {:.1}", id, c.alignment_type, target);
                self.shift(id, axis, target - current, reasoning);
            }
        }

        // Several fixed members that disagree cannot be reconciled
        if is_constraint_satisfied(&constraint, &self.working) {
            Outcome::Satisfied
        } else {
            Outcome::Impossible
        }
    }

    // ========================================================================
    // Spacing
    // ========================================================================

    fn solve_spacing(&mut self, c: &SpacingConstraint) -> Outcome {
        let (Some(first), Some(second)) =
            (self.working.get(&c.object1), self.working.get(&c.object2))
        else {
            return Outcome::Vacuous;
        };
        let axis = c.spacing_type;
        let actual = axis.gap(first, second);
        if (actual - c.distance).abs() <= c.tolerance {
            return Outcome::Satisfied;
        }

        let delta = c.distance - actual;
        if !self.is_fixed(&c.object2) {
            let reasoning = format!(
                "move {} so the {} gap from {} is {:.1} (was {:.1})",
                c.object2, axis, c.object1, c.distance, actual
            );
            self.shift(&c.object2, axis, delta, reasoning);
        } else if !self.is_fixed(&c.object1) {
            let reasoning = format!(
                "move {} so the {} gap to {} is {:.1} (was {:.1})",
                c.object1, axis, c.object2, c.distance, actual
            );
            self.shift(&c.object1, axis, -delta, reasoning);
        } else {
            return Outcome::Impossible;
        }
        Outcome::Satisfied
    }

    // ========================================================================
    // Distribution
    // ========================================================================

    /// Single leading-to-trailing sweep; anchored distributions are left for escalation
    fn solve_distribution(&mut self, c: &DistributionConstraint) -> Outcome {
        let axis = c.distribution_type;
        let mut members: Vec<LayoutObject> = resolve(&c.objects, &self.working)
            .into_iter()
            .cloned()
            .collect();
        if members.len() < 3 {
            return Outcome::Vacuous;
        }
        if members.iter().any(|o| self.is_fixed(&o.id)) {
            return Outcome::Impossible;
        }

        members.sort_by(|a, b| axis.position(a).total_cmp(&axis.position(b)));
        let mut current_edge = axis.trailing(&members[0]);
        for object in &members[1..] {
            let target = current_edge + c.spacing;
            let delta = target - axis.position(object);
            if delta.abs() > POSITION_EPSILON {
                let reasoning = format!(
                    "distribute {} with {} spacing {:.1}",
                    object.id, axis, c.spacing
                );
                self.shift(&object.id, axis, delta, reasoning);
            }
            current_edge = target + axis.extent(object);
        }
        Outcome::Satisfied
    }
}
