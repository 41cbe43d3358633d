//! Constraint inference and repair for axis-aligned layouts
//!
//! This module takes a flat list of positioned rectangles, infers the
//! relationships between them, checks and repairs those relationships after
//! an edit, and reports which of them survived.

pub mod check;
pub mod collector;
pub mod config;
pub mod detect;
pub mod diff;
pub mod engine;
pub mod error;
pub mod quick;
pub mod solver;
pub mod types;

pub use check::is_constraint_satisfied;
pub use config::DetectorConfig;
pub use detect::{detect_constraints, detect_constraints_with_config, ConstraintDetector};
pub use diff::{compute_constraint_diff, compute_constraint_diff_with_config};
pub use engine::{
    apply_adjustments, solve, CassowaryFallback, FallbackSolver, SolveMethod, SolveOutcome,
};
pub use error::LayoutError;
pub use quick::quick_solve;
pub use solver::SolverError;
pub use types::*;

use std::collections::HashSet;

/// Index objects by id; a later duplicate replaces an earlier one
pub fn index_objects(objects: &[LayoutObject]) -> ObjectMap {
    objects
        .iter()
        .map(|object| (object.id.clone(), object.clone()))
        .collect()
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }

    dp[m][n]
}

/// Find object ids within a maximum edit distance of `target`, closest first
pub fn find_similar<'a>(
    known: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = known
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            if dist <= max_distance && dist > 0 {
                Some((name, dist))
            } else {
                None
            }
        })
        .collect();

    candidates.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}

/// Ids referenced by `constraints` that are not in `objects`, in first-seen order
pub fn dangling_references<'a>(
    constraints: &'a [Constraint],
    objects: &ObjectMap,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    constraints
        .iter()
        .flat_map(|c| c.object_ids())
        .filter(|id| !objects.contains_key(*id) && seen.insert(*id))
        .collect()
}
