//! Constraint solver integration for fallback repair
//!
//! This module provides a wrapper around the kasuari Cassowary constraint solver,
//! translating position relations between objects into the solver's format and
//! extracting solutions.

use std::collections::HashMap;

use kasuari::{
    Solver as KasuariSolver, Strength, Variable as KasuariVariable, WeightedRelation::*,
};
use thiserror::Error;

/// Properties that can be constrained. Sizes never change, so only
/// positions are variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutProperty {
    X,
    Y,
}

/// A variable in the constraint system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutVariable {
    pub object_id: String,
    pub property: LayoutProperty,
}

impl LayoutVariable {
    pub fn new(object_id: impl Into<String>, property: LayoutProperty) -> Self {
        Self {
            object_id: object_id.into(),
            property,
        }
    }

    /// Create variable for an object's X position
    pub fn x(object_id: impl Into<String>) -> Self {
        Self::new(object_id, LayoutProperty::X)
    }

    /// Create variable for an object's Y position
    pub fn y(object_id: impl Into<String>) -> Self {
        Self::new(object_id, LayoutProperty::Y)
    }
}

/// A variable plus a constant, e.g. `a.x + a.width` for a right edge
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTerm {
    pub variable: LayoutVariable,
    pub offset: f64,
}

impl LayoutTerm {
    pub fn new(variable: LayoutVariable, offset: f64) -> Self {
        Self { variable, offset }
    }
}

/// Tracks where a solver constraint came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSource {
    /// Index of the originating layout constraint, if any
    pub index: Option<usize>,
    /// Human-readable description
    pub description: String,
}

impl ConstraintSource {
    /// Derived from the layout constraint at `index`
    pub fn relation(index: usize, description: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            description: description.into(),
        }
    }

    /// Derived from an object's current position
    pub fn position(description: impl Into<String>) -> Self {
        Self {
            index: None,
            description: description.into(),
        }
    }
}

/// A constraint in the solver system
#[derive(Debug, Clone)]
pub enum LayoutConstraint {
    /// Variable = constant, must hold
    Fixed {
        variable: LayoutVariable,
        value: f64,
        source: ConstraintSource,
    },

    /// Variable should stay near constant
    Suggested {
        variable: LayoutVariable,
        value: f64,
        source: ConstraintSource,
    },

    /// left = right + offset
    Equal {
        left: LayoutTerm,
        right: LayoutTerm,
        offset: f64,
        source: ConstraintSource,
    },

    /// left >= right
    GreaterOrEqual {
        left: LayoutTerm,
        right: LayoutTerm,
        source: ConstraintSource,
    },

    /// left <= right
    LessOrEqual {
        left: LayoutTerm,
        right: LayoutTerm,
        source: ConstraintSource,
    },
}

impl LayoutConstraint {
    /// Get the source of this constraint
    pub fn source(&self) -> &ConstraintSource {
        match self {
            LayoutConstraint::Fixed { source, .. } => source,
            LayoutConstraint::Suggested { source, .. } => source,
            LayoutConstraint::Equal { source, .. } => source,
            LayoutConstraint::GreaterOrEqual { source, .. } => source,
            LayoutConstraint::LessOrEqual { source, .. } => source,
        }
    }
}

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable constraints: {reason}")]
    Unsatisfiable {
        conflicting: Vec<ConstraintSource>,
        reason: String,
    },

    #[error("No solved position for object '{0}'")]
    UnknownObject(String),

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<LayoutVariable, KasuariVariable>,
    /// Tracks constraint sources for error reporting
    sources: Vec<ConstraintSource>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            sources: Vec::new(),
        }
    }

    /// Get or create a kasuari variable for our layout variable
    fn get_or_create_var(&mut self, var: &LayoutVariable) -> KasuariVariable {
        if let Some(&kvar) = self.variables.get(var) {
            kvar
        } else {
            let kvar = KasuariVariable::new();
            self.variables.insert(var.clone(), kvar);
            kvar
        }
    }

    /// Create a kasuari expression for `variable + offset`
    fn get_expression(&mut self, term: &LayoutTerm) -> kasuari::Expression {
        let expr: kasuari::Expression = self.get_or_create_var(&term.variable).into();
        expr + term.offset
    }

    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        source: &ConstraintSource,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                let mut conflicting = vec![source.clone()];
                conflicting.extend(self.sources.iter().cloned());
                SolverError::Unsatisfiable {
                    conflicting,
                    reason: format!(
                        "Cannot satisfy {}: conflicts with existing constraints",
                        source.description
                    ),
                }
            }
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("Duplicate constraint: {}", source.description))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal(
                format!("Internal solver error for {}: {}", source.description, msg),
            ),
        }
    }

    /// Add a constraint to the solver.
    ///
    /// Fixed positions are required; relations between objects are strong and
    /// suggestions medium, so relations win over staying put.
    pub fn add_constraint(&mut self, constraint: LayoutConstraint) -> Result<(), SolverError> {
        match &constraint {
            LayoutConstraint::Fixed {
                variable,
                value,
                source,
            } => {
                let kvar = self.get_or_create_var(variable);
                self.solver
                    .add_constraint(kvar | EQ(Strength::REQUIRED) | *value)
                    .map_err(|e| self.convert_kasuari_error(e, source))?;
            }

            LayoutConstraint::Suggested {
                variable,
                value,
                source,
            } => {
                let kvar = self.get_or_create_var(variable);
                self.solver
                    .add_edit_variable(kvar, Strength::MEDIUM)
                    .map_err(|e| {
                        SolverError::Internal(format!(
                            "Failed to add edit variable for {}: {}",
                            source.description, e
                        ))
                    })?;
                self.solver.suggest_value(kvar, *value).map_err(|e| {
                    SolverError::Internal(format!(
                        "Failed to suggest value for {}: {}",
                        source.description, e
                    ))
                })?;
            }

            LayoutConstraint::Equal {
                left,
                right,
                offset,
                source,
            } => {
                let left_expr = self.get_expression(left);
                let right_expr = self.get_expression(right);
                self.solver
                    .add_constraint(left_expr | EQ(Strength::STRONG) | right_expr + *offset)
                    .map_err(|e| self.convert_kasuari_error(e, source))?;
            }

            LayoutConstraint::GreaterOrEqual {
                left,
                right,
                source,
            } => {
                let left_expr = self.get_expression(left);
                let right_expr = self.get_expression(right);
                self.solver
                    .add_constraint(left_expr | GE(Strength::STRONG) | right_expr)
                    .map_err(|e| self.convert_kasuari_error(e, source))?;
            }

            LayoutConstraint::LessOrEqual {
                left,
                right,
                source,
            } => {
                let left_expr = self.get_expression(left);
                let right_expr = self.get_expression(right);
                self.solver
                    .add_constraint(left_expr | LE(Strength::STRONG) | right_expr)
                    .map_err(|e| self.convert_kasuari_error(e, source))?;
            }
        }
        self.sources.push(constraint.source().clone());
        Ok(())
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solution from the constraint solver
pub struct Solution {
    pub values: HashMap<LayoutVariable, f64>,
}

impl Solution {
    /// Get value for a variable
    pub fn get(&self, var: &LayoutVariable) -> Option<f64> {
        self.values.get(var).copied()
    }

    /// Get value by object ID and property
    pub fn get_by_id(&self, object_id: &str, property: LayoutProperty) -> Option<f64> {
        self.values
            .get(&LayoutVariable::new(object_id, property))
            .copied()
    }

    /// Solved `(x, y)` of an object that took part in the solve
    pub fn position(&self, object_id: &str) -> Result<(f64, f64), SolverError> {
        match (
            self.get_by_id(object_id, LayoutProperty::X),
            self.get_by_id(object_id, LayoutProperty::Y),
        ) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(SolverError::UnknownObject(object_id.to_string())),
        }
    }
}

impl ConstraintSolver {
    /// Solve the constraint system.
    ///
    /// kasuari only reports variables whose value moved away from zero, so
    /// every known variable starts at zero in the solution.
    pub fn solve(&mut self) -> Result<Solution, SolverError> {
        let mut values: HashMap<LayoutVariable, f64> = self
            .variables
            .keys()
            .map(|var| (var.clone(), 0.0))
            .collect();

        let changes = self.solver.fetch_changes();
        for (kvar, value) in changes {
            // Find our variable for this kasuari variable
            if let Some((our_var, _)) = self.variables.iter().find(|(_, &k)| k == *kvar) {
                values.insert(our_var.clone(), *value);
            }
        }

        Ok(Solution { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(variable: LayoutVariable) -> LayoutTerm {
        LayoutTerm::new(variable, 0.0)
    }

    #[test]
    fn test_fixed_constraint() {
        let mut solver = ConstraintSolver::new();
        let var = LayoutVariable::x("box");

        solver
            .add_constraint(LayoutConstraint::Fixed {
                variable: var.clone(),
                value: 100.0,
                source: ConstraintSource::position("test"),
            })
            .unwrap();

        let solution = solver.solve().unwrap();
        assert!((solution.get(&var).unwrap() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_equal_constraint_with_term_offset() {
        let mut solver = ConstraintSolver::new();
        let a = LayoutVariable::x("a");
        let b = LayoutVariable::x("b");

        solver
            .add_constraint(LayoutConstraint::Fixed {
                variable: a.clone(),
                value: 10.0,
                source: ConstraintSource::position("a x"),
            })
            .unwrap();

        // b.x = (a.x + 80) + 20
        solver
            .add_constraint(LayoutConstraint::Equal {
                left: at(b.clone()),
                right: LayoutTerm::new(a.clone(), 80.0),
                offset: 20.0,
                source: ConstraintSource::relation(0, "a-b spacing"),
            })
            .unwrap();

        solver
            .add_constraint(LayoutConstraint::Suggested {
                variable: b.clone(),
                value: 300.0,
                source: ConstraintSource::position("b x"),
            })
            .unwrap();

        let solution = solver.solve().unwrap();
        assert!((solution.get(&b).unwrap() - 110.0).abs() < 0.001);
    }

    #[test]
    fn test_suggestion_holds_without_relations() {
        let mut solver = ConstraintSolver::new();
        let y = LayoutVariable::y("box");

        solver
            .add_constraint(LayoutConstraint::Suggested {
                variable: y.clone(),
                value: 42.0,
                source: ConstraintSource::position("box y"),
            })
            .unwrap();

        let solution = solver.solve().unwrap();
        assert!((solution.get_by_id("box", LayoutProperty::Y).unwrap() - 42.0).abs() < 0.001);
    }

    #[test]
    fn test_inequality_constraint() {
        let mut solver = ConstraintSolver::new();
        let frame = LayoutVariable::x("frame");
        let child = LayoutVariable::x("child");

        solver
            .add_constraint(LayoutConstraint::Fixed {
                variable: frame.clone(),
                value: 50.0,
                source: ConstraintSource::position("frame x"),
            })
            .unwrap();
        solver
            .add_constraint(LayoutConstraint::Suggested {
                variable: child.clone(),
                value: 30.0,
                source: ConstraintSource::position("child x"),
            })
            .unwrap();

        // child.x >= frame.x
        solver
            .add_constraint(LayoutConstraint::GreaterOrEqual {
                left: at(child.clone()),
                right: at(frame.clone()),
                source: ConstraintSource::relation(0, "containment"),
            })
            .unwrap();

        let solution = solver.solve().unwrap();
        assert!(solution.get(&child).unwrap() >= 50.0 - 0.001);
    }

    #[test]
    fn test_unmoved_zero_variable_is_reported() {
        let mut solver = ConstraintSolver::new();
        let x = LayoutVariable::x("origin");

        solver
            .add_constraint(LayoutConstraint::Fixed {
                variable: x.clone(),
                value: 0.0,
                source: ConstraintSource::position("origin x"),
            })
            .unwrap();

        let solution = solver.solve().unwrap();
        assert_eq!(solution.get(&x), Some(0.0));
    }

    #[test]
    fn test_position_of_unknown_object() {
        let mut solver = ConstraintSolver::new();
        let solution = solver.solve().unwrap();
        assert!(matches!(
            solution.position("ghost"),
            Err(SolverError::UnknownObject(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_conflicting_fixed_constraints_error() {
        let mut solver = ConstraintSolver::new();
        let x = LayoutVariable::x("box");

        solver
            .add_constraint(LayoutConstraint::Fixed {
                variable: x.clone(),
                value: 100.0,
                source: ConstraintSource::position("first pin"),
            })
            .unwrap();

        let result = solver.add_constraint(LayoutConstraint::Fixed {
            variable: x.clone(),
            value: 200.0,
            source: ConstraintSource::position("second pin"),
        });

        match result.unwrap_err() {
            SolverError::Unsatisfiable { reason, conflicting } => {
                assert!(reason.contains("conflicts"));
                assert!(!conflicting.is_empty());
            }
            other => panic!("Expected Unsatisfiable error, got: {:?}", other),
        }
    }
}
