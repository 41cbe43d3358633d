//! Layout Intent - constraint inference and repair for 2D layouts
//!
//! This library infers geometric relationships (alignment, spacing,
//! distribution, grid) among positioned rectangles, checks and repairs them
//! after an edit, and diffs them across edits.
//!
//! # Example
//!
//! ```rust
//! use layout_intent::{detect_constraints, LayoutObject};
//!
//! let objects = vec![
//!     LayoutObject::new("a", 10.0, 0.0, 40.0, 20.0),
//!     LayoutObject::new("b", 10.0, 40.0, 60.0, 20.0),
//!     LayoutObject::new("c", 10.0, 80.0, 30.0, 20.0),
//! ];
//! let constraints = detect_constraints(&objects);
//! assert!(constraints.iter().any(|c| c.to_string().starts_with("left alignment")));
//! ```

pub mod error;
pub mod layout;
pub mod scene;

pub use error::{ConfigError, SceneError};
pub use layout::{
    apply_adjustments, compute_constraint_diff, compute_constraint_diff_with_config,
    detect_constraints, detect_constraints_with_config, index_objects, is_constraint_satisfied,
    quick_solve, solve, Adjustment, AlignmentType, Axis, CassowaryFallback, Constraint,
    ConstraintDiffResult, ConstraintKind, DetectorConfig, FallbackSolver, LayoutError,
    LayoutObject, ObjectMap, SolveMethod, SolveOutcome, SolveResult, SolverError,
};
pub use scene::{load_constraints, parse_constraints, Scene, SceneFormat};

/// Repair the given constraints on a scene, returning a copy with the objects moved.
///
/// Convenience wrapper around [`solve`] using the bundled
/// [`CassowaryFallback`] and the scene's own fixed ids.
///
/// # Example
///
/// ```rust
/// use layout_intent::{repair_scene, Constraint, LayoutObject, Scene};
/// use layout_intent::layout::SpacingConstraint;
/// use layout_intent::Axis;
///
/// let scene = Scene::new(vec![
///     LayoutObject::new("a", 0.0, 0.0, 10.0, 10.0),
///     LayoutObject::new("b", 45.0, 0.0, 10.0, 10.0),
/// ]);
/// let spacing = Constraint::Spacing(SpacingConstraint {
///     spacing_type: Axis::Horizontal,
///     object1: "a".to_string(),
///     object2: "b".to_string(),
///     distance: 20.0,
///     tolerance: 3.0,
/// });
/// let repaired = repair_scene(&scene, &[spacing]).unwrap();
/// assert_eq!(repaired.objects[1].x, 30.0);
/// ```
pub fn repair_scene(scene: &Scene, constraints: &[Constraint]) -> Result<Scene, LayoutError> {
    let outcome = solve(
        constraints,
        &scene.objects,
        &scene.fixed_ids(),
        &CassowaryFallback,
    )?;
    Ok(scene.apply(&outcome.result.adjustments))
}
