//! Error types for the solve orchestration

use thiserror::Error;

use super::solver::SolverError;
use super::types::ConstraintKind;

/// Errors that can occur while solving a constraint list
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A constraint carries values no solver can work with
    #[error("invalid {kind} constraint: {reason}")]
    InvalidConstraint { kind: ConstraintKind, reason: String },

    /// An object with a non-finite position or a negative size
    #[error("invalid object '{object}': {reason}")]
    InvalidObject { object: String, reason: String },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    SolverError(#[from] SolverError),
}

impl LayoutError {
    /// Create an invalid constraint error
    pub fn invalid_constraint(kind: ConstraintKind, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            kind,
            reason: reason.into(),
        }
    }

    /// Create an invalid object error
    pub fn invalid_object(object: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidObject {
            object: object.into(),
            reason: reason.into(),
        }
    }

    /// Create a solver error from a SolverError
    pub fn solver_error(e: SolverError) -> Self {
        Self::SolverError(e)
    }
}
