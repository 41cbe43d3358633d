//! Constraint detection
//!
//! Infers alignment, spacing, distribution and grid relationships from a set
//! of positioned objects. Every pass is a pure function of the input; the
//! greedy first-fit clustering makes output follow input order.

use tracing::debug;

use super::config::DetectorConfig;
use super::types::{
    AlignmentConstraint, AlignmentType, Axis, Constraint, DistributionConstraint, GridConstraint,
    LayoutObject, SpacingConstraint,
};

/// A greedy cluster keyed on its first member's value
struct Cluster<'a> {
    reference: f64,
    members: Vec<&'a LayoutObject>,
}

/// Single-pass first-fit clustering: each object joins the first cluster whose
/// reference is within `tolerance`, else starts a new one.
fn cluster_by<'a>(
    objects: &'a [LayoutObject],
    tolerance: f64,
    key: impl Fn(&LayoutObject) -> f64,
) -> Vec<Cluster<'a>> {
    let mut clusters: Vec<Cluster<'a>> = Vec::new();
    for object in objects {
        let value = key(object);
        match clusters
            .iter_mut()
            .find(|c| (value - c.reference).abs() <= tolerance)
        {
            Some(cluster) => cluster.members.push(object),
            None => clusters.push(Cluster {
                reference: value,
                members: vec![object],
            }),
        }
    }
    clusters
}

fn ids(members: &[&LayoutObject]) -> Vec<String> {
    members.iter().map(|o| o.id.clone()).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Detects constraints with a fixed configuration
pub struct ConstraintDetector {
    config: DetectorConfig,
}

impl ConstraintDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run all four passes and concatenate their results
    pub fn detect(&self, objects: &[LayoutObject]) -> Vec<Constraint> {
        let alignments = self.detect_alignments(objects);
        let spacings = self.detect_spacings(objects);
        let distributions = self.detect_distributions(objects);
        let grid = self.detect_grid(objects);

        debug!(
            objects = objects.len(),
            alignments = alignments.len(),
            spacings = spacings.len(),
            distributions = distributions.len(),
            grid = grid.is_some(),
            "detected constraints"
        );

        let mut constraints = alignments;
        constraints.extend(spacings);
        constraints.extend(distributions);
        constraints.extend(grid);
        constraints
    }

    // ========================================================================
    // Alignment
    // ========================================================================

    pub fn detect_alignments(&self, objects: &[LayoutObject]) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for alignment_type in AlignmentType::ALL {
            let clusters = cluster_by(objects, self.config.alignment_threshold, |o| {
                alignment_type.coordinate(o)
            });
            for cluster in clusters.into_iter().filter(|c| c.members.len() >= 2) {
                constraints.push(Constraint::Alignment(AlignmentConstraint {
                    alignment_type,
                    objects: ids(&cluster.members),
                    coordinate: cluster.reference,
                    tolerance: self.config.alignment_tolerance,
                }));
            }
        }
        constraints
    }

    // ========================================================================
    // Spacing
    // ========================================================================

    pub fn detect_spacings(&self, objects: &[LayoutObject]) -> Vec<Constraint> {
        let mut constraints = self.detect_spacings_along(objects, Axis::Horizontal);
        constraints.extend(self.detect_spacings_along(objects, Axis::Vertical));
        constraints
    }

    /// Only immediately-adjacent pairs in sorted order are considered
    fn detect_spacings_along(&self, objects: &[LayoutObject], axis: Axis) -> Vec<Constraint> {
        let mut sorted: Vec<&LayoutObject> = objects.iter().collect();
        sorted.sort_by(|a, b| axis.position(a).total_cmp(&axis.position(b)));

        sorted
            .windows(2)
            .filter_map(|pair| {
                let (first, second) = (pair[0], pair[1]);
                if !axis.cross_overlap(first, second) {
                    return None;
                }
                let gap = axis.gap(first, second);
                if gap <= 0.0 || gap >= self.config.max_spacing_gap {
                    return None;
                }
                Some(Constraint::Spacing(SpacingConstraint {
                    spacing_type: axis,
                    object1: first.id.clone(),
                    object2: second.id.clone(),
                    distance: gap,
                    tolerance: self.config.spacing_tolerance,
                }))
            })
            .collect()
    }

    // ========================================================================
    // Distribution
    // ========================================================================

    pub fn detect_distributions(&self, objects: &[LayoutObject]) -> Vec<Constraint> {
        let mut constraints = self.detect_distributions_along(objects, Axis::Horizontal);
        constraints.extend(self.detect_distributions_along(objects, Axis::Vertical));
        constraints
    }

    fn detect_distributions_along(&self, objects: &[LayoutObject], axis: Axis) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        for line in self.lines(objects, axis) {
            if line.len() < 3 {
                continue;
            }
            let gaps: Vec<f64> = line.windows(2).map(|p| axis.gap(p[0], p[1])).collect();
            let spacing = mean(&gaps);
            let consistent = gaps
                .iter()
                .all(|gap| (gap - spacing).abs() <= self.config.distribution_tolerance);
            if consistent {
                constraints.push(Constraint::Distribution(DistributionConstraint {
                    distribution_type: axis,
                    objects: ids(&line),
                    spacing,
                    tolerance: self.config.distribution_tolerance,
                }));
            }
        }
        constraints
    }

    /// Rows (horizontal) or columns (vertical), each sorted along `axis`,
    /// in cluster creation order
    fn lines<'a>(&self, objects: &'a [LayoutObject], axis: Axis) -> Vec<Vec<&'a LayoutObject>> {
        cluster_by(objects, self.config.row_tolerance, |o| axis.cross_center(o))
            .into_iter()
            .map(|cluster| {
                let mut members = cluster.members;
                members.sort_by(|a, b| axis.position(a).total_cmp(&axis.position(b)));
                members
            })
            .collect()
    }

    // ========================================================================
    // Grid
    // ========================================================================

    pub fn detect_grid(&self, objects: &[LayoutObject]) -> Option<Constraint> {
        let mut clusters = cluster_by(objects, self.config.row_tolerance, |o| o.center_y());
        clusters.sort_by(|a, b| a.reference.total_cmp(&b.reference));
        let rows: Vec<Vec<&LayoutObject>> = clusters
            .into_iter()
            .map(|cluster| {
                let mut members = cluster.members;
                members.sort_by(|a, b| a.x.total_cmp(&b.x));
                members
            })
            .collect();

        if rows.len() < 2 {
            return None;
        }
        let columns = rows[0].len();
        if columns < 2 || rows.iter().any(|row| row.len() != columns) {
            return None;
        }

        let columns_agree = rows.iter().skip(1).all(|row| {
            row.iter()
                .zip(&rows[0])
                .all(|(cell, head)| (cell.x - head.x).abs() <= self.config.grid_tolerance)
        });
        if !columns_agree {
            return None;
        }

        let column_gaps: Vec<f64> = rows[0]
            .windows(2)
            .map(|p| Axis::Horizontal.gap(p[0], p[1]))
            .collect();
        let row_gaps: Vec<f64> = rows
            .windows(2)
            .map(|p| Axis::Vertical.gap(p[0][0], p[1][0]))
            .collect();

        Some(Constraint::Grid(GridConstraint {
            rows: rows.len(),
            columns,
            objects: rows.iter().map(|row| ids(row)).collect(),
            row_gap: mean(&row_gaps),
            column_gap: mean(&column_gaps),
            tolerance: self.config.grid_tolerance,
        }))
    }
}

impl Default for ConstraintDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Detect constraints with the default configuration
pub fn detect_constraints(objects: &[LayoutObject]) -> Vec<Constraint> {
    ConstraintDetector::default().detect(objects)
}

/// Detect constraints with a custom configuration
pub fn detect_constraints_with_config(
    objects: &[LayoutObject],
    config: &DetectorConfig,
) -> Vec<Constraint> {
    ConstraintDetector::new(config.clone()).detect(objects)
}
