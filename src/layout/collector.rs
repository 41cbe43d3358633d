//! Collects solver constraints from layout constraints
//!
//! Every object touched by a constraint contributes its current position,
//! either pinned (fixed objects) or suggested (movable ones). Each layout
//! constraint then becomes a set of linear relations between positions:
//! - Alignment: every member's edge equals the first member's edge
//! - Spacing: `object2` starts `distance` after `object1` ends
//! - Distribution: a chain of equal gaps in stored order
//! - Grid: row tops and column lefts aligned, gaps between neighbours
//! - Containment: children bounded by the container on all four sides

use std::collections::HashSet;

use super::solver::{
    ConstraintSource, LayoutConstraint, LayoutProperty, LayoutTerm, LayoutVariable,
};
use super::types::{
    AlignmentConstraint, Axis, Constraint, ContainmentConstraint, DistributionConstraint,
    GridConstraint, LayoutObject, ObjectMap, SpacingConstraint,
};

/// Collects all solver constraints for one solve
pub struct ConstraintCollector<'a> {
    pub constraints: Vec<LayoutConstraint>,
    objects: &'a ObjectMap,
    fixed_object_ids: &'a HashSet<String>,
}

impl<'a> ConstraintCollector<'a> {
    pub fn new(objects: &'a ObjectMap, fixed_object_ids: &'a HashSet<String>) -> Self {
        Self {
            constraints: Vec::new(),
            objects,
            fixed_object_ids,
        }
    }

    /// Collect positions and relations for `constraints`
    pub fn collect(&mut self, constraints: &[Constraint]) {
        // 1. Current positions of every referenced object
        self.collect_positions(constraints);

        // 2. Relations, one group per layout constraint
        for (index, constraint) in constraints.iter().enumerate() {
            match constraint {
                Constraint::Alignment(c) => self.collect_alignment(index, c),
                Constraint::Spacing(c) => self.collect_spacing(index, c),
                Constraint::Distribution(c) => self.collect_distribution(index, c),
                Constraint::Grid(c) => self.collect_grid(index, c),
                Constraint::Containment(c) => self.collect_containment(index, c),
            }
        }
    }

    fn collect_positions(&mut self, constraints: &[Constraint]) {
        let mut seen = HashSet::new();
        let referenced: Vec<&LayoutObject> = constraints
            .iter()
            .flat_map(|c| c.object_ids())
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.objects.get(id))
            .collect();

        for object in referenced {
            let fixed = self.fixed_object_ids.contains(&object.id);
            for (variable, value) in [
                (LayoutVariable::x(&object.id), object.x),
                (LayoutVariable::y(&object.id), object.y),
            ] {
                let constraint = if fixed {
                    LayoutConstraint::Fixed {
                        source: ConstraintSource::position(format!(
                            "{} pinned at {}",
                            object.id, value
                        )),
                        variable,
                        value,
                    }
                } else {
                    LayoutConstraint::Suggested {
                        source: ConstraintSource::position(format!(
                            "{} currently at {}",
                            object.id, value
                        )),
                        variable,
                        value,
                    }
                };
                self.constraints.push(constraint);
            }
        }
    }

    fn collect_alignment(&mut self, index: usize, c: &AlignmentConstraint) {
        let members = self.resolve(&c.objects);
        let Some((first, rest)) = members.split_first() else {
            return;
        };
        let property = property_for(c.alignment_type.axis());
        let anchor = LayoutTerm::new(
            LayoutVariable::new(&first.id, property),
            c.alignment_type.offset(first),
        );

        for member in rest {
            self.constraints.push(LayoutConstraint::Equal {
                left: LayoutTerm::new(
                    LayoutVariable::new(&member.id, property),
                    c.alignment_type.offset(member),
                ),
                right: anchor.clone(),
                offset: 0.0,
                source: ConstraintSource::relation(
                    index,
                    format!("{} aligned ({}) with {}", member.id, c.alignment_type, first.id),
                ),
            });
        }
    }

    fn collect_spacing(&mut self, index: usize, c: &SpacingConstraint) {
        let (Some(first), Some(second)) =
            (self.objects.get(&c.object1), self.objects.get(&c.object2))
        else {
            return;
        };
        let axis = c.spacing_type;
        self.constraints.push(LayoutConstraint::Equal {
            left: leading(second, axis),
            right: trailing(first, axis),
            offset: c.distance,
            source: ConstraintSource::relation(
                index,
                format!("{} spaced {} after {}", second.id, c.distance, first.id),
            ),
        });
    }

    fn collect_distribution(&mut self, index: usize, c: &DistributionConstraint) {
        let members = self.resolve(&c.objects);
        if members.len() < 3 {
            return;
        }
        let axis = c.distribution_type;
        for pair in members.windows(2) {
            self.constraints.push(LayoutConstraint::Equal {
                left: leading(pair[1], axis),
                right: trailing(pair[0], axis),
                offset: c.spacing,
                source: ConstraintSource::relation(
                    index,
                    format!("{} distributed after {}", pair[1].id, pair[0].id),
                ),
            });
        }
    }

    /// Grids are pinned to their first row and first column: every cell shares
    /// its row's top and its column's left, and neighbouring rows and columns
    /// keep the detected gaps.
    fn collect_grid(&mut self, index: usize, c: &GridConstraint) {
        if c.objects.len() < 2 || c.objects.iter().any(|row| row.len() < 2) {
            return;
        }
        let objects = self.objects;
        let rows: Vec<Vec<Option<&'a LayoutObject>>> = c
            .objects
            .iter()
            .map(|row| row.iter().map(|id| objects.get(id)).collect())
            .collect();

        for (r, row) in rows.iter().enumerate() {
            for (col, cell) in row.iter().enumerate() {
                let Some(cell) = cell else { continue };

                // Same row: tops match the row's first cell
                if col > 0 {
                    if let Some(Some(head)) = row.first() {
                        self.push_equal(
                            index,
                            leading(cell, Axis::Vertical),
                            leading(head, Axis::Vertical),
                            0.0,
                            format!("{} shares row {} with {}", cell.id, r, head.id),
                        );
                    }
                }

                // Same column: lefts match the first row's cell
                if r > 0 {
                    if let Some(Some(top)) = rows[0].get(col) {
                        self.push_equal(
                            index,
                            leading(cell, Axis::Horizontal),
                            leading(top, Axis::Horizontal),
                            0.0,
                            format!("{} shares column {} with {}", cell.id, col, top.id),
                        );
                    }
                }
            }
        }

        // Column gaps along the first row
        for pair in rows[0].windows(2) {
            if let (Some(left), Some(right)) = (pair[0], pair[1]) {
                self.push_equal(
                    index,
                    leading(right, Axis::Horizontal),
                    trailing(left, Axis::Horizontal),
                    c.column_gap,
                    format!("{} one column after {}", right.id, left.id),
                );
            }
        }

        // Row gaps down the first column
        for pair in rows.windows(2) {
            if let (Some(Some(upper)), Some(Some(lower))) = (pair[0].first(), pair[1].first()) {
                self.push_equal(
                    index,
                    leading(lower, Axis::Vertical),
                    trailing(upper, Axis::Vertical),
                    c.row_gap,
                    format!("{} one row below {}", lower.id, upper.id),
                );
            }
        }
    }

    fn collect_containment(&mut self, index: usize, c: &ContainmentConstraint) {
        let Some(container) = self.objects.get(&c.container) else {
            return;
        };
        let children = self.resolve(&c.children);
        for child in children {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                let property = property_for(axis);
                // child starts no earlier than the container
                self.constraints.push(LayoutConstraint::GreaterOrEqual {
                    left: LayoutTerm::new(LayoutVariable::new(&child.id, property), 0.0),
                    right: LayoutTerm::new(
                        LayoutVariable::new(&container.id, property),
                        -c.tolerance,
                    ),
                    source: ConstraintSource::relation(
                        index,
                        format!("{} {} start inside {}", child.id, axis, container.id),
                    ),
                });
                // and ends no later
                self.constraints.push(LayoutConstraint::LessOrEqual {
                    left: trailing(child, axis),
                    right: LayoutTerm::new(
                        LayoutVariable::new(&container.id, property),
                        axis.extent(container) + c.tolerance,
                    ),
                    source: ConstraintSource::relation(
                        index,
                        format!("{} {} end inside {}", child.id, axis, container.id),
                    ),
                });
            }
        }
    }

    fn push_equal(
        &mut self,
        index: usize,
        left: LayoutTerm,
        right: LayoutTerm,
        offset: f64,
        description: String,
    ) {
        self.constraints.push(LayoutConstraint::Equal {
            left,
            right,
            offset,
            source: ConstraintSource::relation(index, description),
        });
    }

    fn resolve(&self, ids: &[String]) -> Vec<&'a LayoutObject> {
        ids.iter().filter_map(|id| self.objects.get(id)).collect()
    }
}

fn property_for(axis: Axis) -> LayoutProperty {
    match axis {
        Axis::Horizontal => LayoutProperty::X,
        Axis::Vertical => LayoutProperty::Y,
    }
}

/// The object's leading edge along `axis`
fn leading(object: &LayoutObject, axis: Axis) -> LayoutTerm {
    LayoutTerm::new(LayoutVariable::new(&object.id, property_for(axis)), 0.0)
}

/// The object's trailing edge along `axis`; sizes are constants
fn trailing(object: &LayoutObject, axis: Axis) -> LayoutTerm {
    LayoutTerm::new(
        LayoutVariable::new(&object.id, property_for(axis)),
        axis.extent(object),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::index_objects;
    use crate::layout::types::AlignmentType;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn relations(constraints: &[LayoutConstraint]) -> Vec<&LayoutConstraint> {
        constraints
            .iter()
            .filter(|c| c.source().index.is_some())
            .collect()
    }

    #[test]
    fn test_collect_positions_pins_fixed_objects() {
        let objects = index_objects(&[
            LayoutObject::new("a", 0.0, 0.0, 10.0, 10.0),
            LayoutObject::new("b", 30.0, 0.0, 10.0, 10.0),
            LayoutObject::new("unrelated", 90.0, 90.0, 10.0, 10.0),
        ]);
        let fixed = HashSet::from(["a".to_string()]);
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Spacing(SpacingConstraint {
            spacing_type: Axis::Horizontal,
            object1: "a".to_string(),
            object2: "b".to_string(),
            distance: 20.0,
            tolerance: 3.0,
        })]);

        let pinned = collector
            .constraints
            .iter()
            .filter(|c| matches!(c, LayoutConstraint::Fixed { .. }))
            .count();
        let suggested = collector
            .constraints
            .iter()
            .filter(|c| matches!(c, LayoutConstraint::Suggested { .. }))
            .count();
        assert_eq!(pinned, 2, "a pinned on both axes");
        assert_eq!(suggested, 2, "b suggested on both axes, unrelated skipped");
    }

    #[test]
    fn test_collect_spacing_uses_trailing_edge() {
        let objects = index_objects(&[
            LayoutObject::new("a", 0.0, 0.0, 80.0, 10.0),
            LayoutObject::new("b", 100.0, 0.0, 10.0, 10.0),
        ]);
        let fixed = HashSet::new();
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Spacing(SpacingConstraint {
            spacing_type: Axis::Horizontal,
            object1: "a".to_string(),
            object2: "b".to_string(),
            distance: 20.0,
            tolerance: 3.0,
        })]);

        let rel = relations(&collector.constraints);
        assert_eq!(rel.len(), 1);
        match rel[0] {
            LayoutConstraint::Equal {
                left,
                right,
                offset,
                ..
            } => {
                assert_eq!(left.variable, LayoutVariable::x("b"));
                assert_eq!(right.variable, LayoutVariable::x("a"));
                assert_eq!(right.offset, 80.0);
                assert_eq!(*offset, 20.0);
            }
            other => panic!("Expected Equal, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_alignment_center_offsets() {
        let objects = index_objects(&[
            LayoutObject::new("a", 0.0, 0.0, 40.0, 10.0),
            LayoutObject::new("b", 10.0, 30.0, 20.0, 10.0),
        ]);
        let fixed = HashSet::new();
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Alignment(AlignmentConstraint {
            alignment_type: AlignmentType::CenterX,
            objects: ids(&["a", "b"]),
            coordinate: 20.0,
            tolerance: 2.0,
        })]);

        let rel = relations(&collector.constraints);
        assert_eq!(rel.len(), 1);
        match rel[0] {
            LayoutConstraint::Equal { left, right, .. } => {
                assert_eq!(left.offset, 10.0);
                assert_eq!(right.offset, 20.0);
            }
            other => panic!("Expected Equal, got {:?}", other),
        }
    }

    #[test]
    fn test_collect_grid_relations() {
        let objects = index_objects(&[
            LayoutObject::new("a", 0.0, 0.0, 10.0, 10.0),
            LayoutObject::new("b", 20.0, 0.0, 10.0, 10.0),
            LayoutObject::new("c", 0.0, 20.0, 10.0, 10.0),
            LayoutObject::new("d", 20.0, 20.0, 10.0, 10.0),
        ]);
        let fixed = HashSet::new();
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Grid(GridConstraint {
            rows: 2,
            columns: 2,
            objects: vec![ids(&["a", "b"]), ids(&["c", "d"])],
            row_gap: 10.0,
            column_gap: 10.0,
            tolerance: 5.0,
        })]);

        // b row, c column, d row, d column, a-b column gap, a-c row gap
        assert_eq!(relations(&collector.constraints).len(), 6);
    }

    #[test]
    fn test_collect_skips_unresolved_members() {
        let objects = index_objects(&[LayoutObject::new("a", 0.0, 0.0, 10.0, 10.0)]);
        let fixed = HashSet::new();
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Distribution(DistributionConstraint {
            distribution_type: Axis::Vertical,
            objects: ids(&["a", "gone", "missing"]),
            spacing: 10.0,
            tolerance: 5.0,
        })]);

        assert!(relations(&collector.constraints).is_empty());
    }

    #[test]
    fn test_collect_containment_bounds_each_side() {
        let objects = index_objects(&[
            LayoutObject::new("frame", 0.0, 0.0, 100.0, 100.0),
            LayoutObject::new("a", 10.0, 10.0, 20.0, 20.0),
        ]);
        let fixed = HashSet::new();
        let mut collector = ConstraintCollector::new(&objects, &fixed);
        collector.collect(&[Constraint::Containment(ContainmentConstraint {
            container: "frame".to_string(),
            children: ids(&["a"]),
            tolerance: 0.0,
        })]);

        assert_eq!(relations(&collector.constraints).len(), 4);
    }
}
