//! Core types for the constraint engine

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A bounding box representing the spatial extent of an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point as `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check whether `other` lies inside this box grown by `tolerance` on every side
    pub fn contains_box(&self, other: &BoundingBox, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }

    /// Check if the x-extents of the two boxes overlap (open intervals)
    pub fn overlaps_horizontally(&self, other: &BoundingBox) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// Check if the y-extents of the two boxes overlap (open intervals)
    pub fn overlaps_vertically(&self, other: &BoundingBox) -> bool {
        self.y < other.bottom() && other.y < self.bottom()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// A design element's frame, as read from the host document.
///
/// Objects are immutable inputs: the engine produces new objects or
/// [`Adjustment`] records instead of mutating them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutObject {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            x,
            y,
            width,
            height,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    /// A copy of this object shifted by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }
}

/// Objects indexed by id
pub type ObjectMap = HashMap<String, LayoutObject>;

/// Axis of a spacing or distribution relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Leading edge along this axis (x or y)
    pub fn position(self, object: &LayoutObject) -> f64 {
        match self {
            Axis::Horizontal => object.x,
            Axis::Vertical => object.y,
        }
    }

    /// Extent along this axis (width or height)
    pub fn extent(self, object: &LayoutObject) -> f64 {
        match self {
            Axis::Horizontal => object.width,
            Axis::Vertical => object.height,
        }
    }

    /// Trailing edge along this axis (right or bottom)
    pub fn trailing(self, object: &LayoutObject) -> f64 {
        self.position(object) + self.extent(object)
    }

    /// Center on the other axis, used to group objects into rows or columns
    pub fn cross_center(self, object: &LayoutObject) -> f64 {
        match self {
            Axis::Horizontal => object.center_y(),
            Axis::Vertical => object.center_x(),
        }
    }

    /// Signed gap from `first`'s trailing edge to `second`'s leading edge
    pub fn gap(self, first: &LayoutObject, second: &LayoutObject) -> f64 {
        self.position(second) - self.trailing(first)
    }

    /// Whether the two objects share extent on the other axis
    pub fn cross_overlap(self, a: &LayoutObject, b: &LayoutObject) -> bool {
        match self {
            Axis::Horizontal => a.bounds().overlaps_vertically(&b.bounds()),
            Axis::Vertical => a.bounds().overlaps_horizontally(&b.bounds()),
        }
    }

    /// A copy of `object` shifted by `delta` along this axis
    pub fn shift(self, object: &LayoutObject, delta: f64) -> LayoutObject {
        match self {
            Axis::Horizontal => object.translated(delta, 0.0),
            Axis::Vertical => object.translated(0.0, delta),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// Edge or center coordinate shared by aligned objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentType {
    Left,
    Right,
    CenterX,
    Top,
    Bottom,
    CenterY,
}

impl AlignmentType {
    /// All alignment types, in detection order
    pub const ALL: [AlignmentType; 6] = [
        AlignmentType::Left,
        AlignmentType::Right,
        AlignmentType::CenterX,
        AlignmentType::Top,
        AlignmentType::Bottom,
        AlignmentType::CenterY,
    ];

    /// Value of this coordinate on `object`
    pub fn coordinate(self, object: &LayoutObject) -> f64 {
        self.axis().position(object) + self.offset(object)
    }

    /// Distance from the object's position to this coordinate
    pub fn offset(self, object: &LayoutObject) -> f64 {
        match self {
            AlignmentType::Left | AlignmentType::Top => 0.0,
            AlignmentType::Right => object.width,
            AlignmentType::Bottom => object.height,
            AlignmentType::CenterX => object.width / 2.0,
            AlignmentType::CenterY => object.height / 2.0,
        }
    }

    /// Axis along which objects move to satisfy this alignment
    pub fn axis(self) -> Axis {
        match self {
            AlignmentType::Left | AlignmentType::Right | AlignmentType::CenterX => {
                Axis::Horizontal
            }
            AlignmentType::Top | AlignmentType::Bottom | AlignmentType::CenterY => Axis::Vertical,
        }
    }
}

impl fmt::Display for AlignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlignmentType::Left => "left",
            AlignmentType::Right => "right",
            AlignmentType::CenterX => "center-x",
            AlignmentType::Top => "top",
            AlignmentType::Bottom => "bottom",
            AlignmentType::CenterY => "center-y",
        };
        write!(f, "{}", name)
    }
}

/// Objects sharing the same edge or center coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentConstraint {
    pub alignment_type: AlignmentType,
    pub objects: Vec<String>,
    /// Reference coordinate at detection time
    pub coordinate: f64,
    pub tolerance: f64,
}

/// Fixed gap between two objects along an axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingConstraint {
    pub spacing_type: Axis,
    pub object1: String,
    pub object2: String,
    /// Signed gap from object1's trailing edge to object2's leading edge
    pub distance: f64,
    pub tolerance: f64,
}

/// Objects evenly spaced along an axis, stored in position order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConstraint {
    pub distribution_type: Axis,
    pub objects: Vec<String>,
    pub spacing: f64,
    pub tolerance: f64,
}

/// Objects arranged in aligned rows and columns with uniform gaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConstraint {
    pub rows: usize,
    pub columns: usize,
    /// Row-major id matrix
    pub objects: Vec<Vec<String>>,
    pub row_gap: f64,
    pub column_gap: f64,
    pub tolerance: f64,
}

/// Children kept inside a container's bounds.
///
/// Never produced by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainmentConstraint {
    pub container: String,
    pub children: Vec<String>,
    pub tolerance: f64,
}

/// An inferred geometric relationship among objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Constraint {
    Alignment(AlignmentConstraint),
    Spacing(SpacingConstraint),
    Distribution(DistributionConstraint),
    Grid(GridConstraint),
    Containment(ContainmentConstraint),
}

/// Discriminant of [`Constraint`], used for homogeneity checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    Alignment,
    Spacing,
    Distribution,
    Grid,
    Containment,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Alignment => "alignment",
            ConstraintKind::Spacing => "spacing",
            ConstraintKind::Distribution => "distribution",
            ConstraintKind::Grid => "grid",
            ConstraintKind::Containment => "containment",
        };
        write!(f, "{}", name)
    }
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Alignment(_) => ConstraintKind::Alignment,
            Constraint::Spacing(_) => ConstraintKind::Spacing,
            Constraint::Distribution(_) => ConstraintKind::Distribution,
            Constraint::Grid(_) => ConstraintKind::Grid,
            Constraint::Containment(_) => ConstraintKind::Containment,
        }
    }

    /// Pixel band within which the relationship counts as satisfied
    pub fn tolerance(&self) -> f64 {
        match self {
            Constraint::Alignment(c) => c.tolerance,
            Constraint::Spacing(c) => c.tolerance,
            Constraint::Distribution(c) => c.tolerance,
            Constraint::Grid(c) => c.tolerance,
            Constraint::Containment(c) => c.tolerance,
        }
    }

    /// Every object id this constraint references.
    ///
    /// Grids are flattened row-major; containment yields the container first.
    pub fn object_ids(&self) -> Vec<&str> {
        match self {
            Constraint::Alignment(c) => c.objects.iter().map(String::as_str).collect(),
            Constraint::Spacing(c) => vec![c.object1.as_str(), c.object2.as_str()],
            Constraint::Distribution(c) => c.objects.iter().map(String::as_str).collect(),
            Constraint::Grid(c) => c.objects.iter().flatten().map(String::as_str).collect(),
            Constraint::Containment(c) => std::iter::once(c.container.as_str())
                .chain(c.children.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Check whether the constraint mentions `id`
    pub fn references(&self, id: &str) -> bool {
        self.object_ids().contains(&id)
    }
}

fn join_ids(ids: &[String]) -> String {
    ids.join(", ")
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Alignment(c) => write!(
                f,
                "{} alignment of [{}] at {}",
                c.alignment_type,
                join_ids(&c.objects),
                c.coordinate
            ),
            Constraint::Spacing(c) => write!(
                f,
                "{} spacing {} -> {} = {}",
                c.spacing_type, c.object1, c.object2, c.distance
            ),
            Constraint::Distribution(c) => write!(
                f,
                "{} distribution of [{}] with spacing {}",
                c.distribution_type,
                join_ids(&c.objects),
                c.spacing
            ),
            Constraint::Grid(c) => {
                let rows: Vec<String> = c
                    .objects
                    .iter()
                    .map(|row| format!("[{}]", join_ids(row)))
                    .collect();
                write!(
                    f,
                    "{}x{} grid [{}] (row gap {}, column gap {})",
                    c.rows,
                    c.columns,
                    rows.join(", "),
                    c.row_gap,
                    c.column_gap
                )
            }
            Constraint::Containment(c) => write!(
                f,
                "containment of [{}] in {}",
                join_ids(&c.children),
                c.container
            ),
        }
    }
}

/// A position change for one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub object_id: String,
    pub new_x: f64,
    pub new_y: f64,
    pub reasoning: String,
}

/// Outcome of a solve: adjustments plus per-constraint classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    /// Absolute positions in move order; later entries for the same object win
    pub adjustments: Vec<Adjustment>,
    /// Percentage of input constraints satisfied after solving
    pub score: u8,
    pub satisfied: Vec<Constraint>,
    pub unsatisfied: Vec<Constraint>,
}

impl SolveResult {
    /// Result for an empty constraint list
    pub fn empty() -> Self {
        Self {
            adjustments: vec![],
            score: 100,
            satisfied: vec![],
            unsatisfied: vec![],
        }
    }
}

/// Percentage of satisfied constraints, rounded; 100 when there are none
pub fn satisfaction_score(satisfied: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (100.0 * satisfied as f64 / total as f64).round() as u8
}

/// Before/after reconciliation of constraints across one edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDiffResult {
    pub preserved: Vec<Constraint>,
    pub violated: Vec<Constraint>,
    /// Everything the detector finds in the after-state, not deduplicated
    pub new_constraints: Vec<Constraint>,
    pub affected_objects: BTreeSet<String>,
    pub moved_object: String,
}

impl ConstraintDiffResult {
    /// New constraints that do not repeat a preserved one
    pub fn novel_constraints(&self) -> Vec<&Constraint> {
        self.new_constraints
            .iter()
            .filter(|candidate| {
                !self
                    .preserved
                    .iter()
                    .any(|kept| same_relationship(kept, candidate))
            })
            .collect()
    }
}

/// Same kind over the same objects, ignoring measured values
fn same_relationship(a: &Constraint, b: &Constraint) -> bool {
    match (a, b) {
        (Constraint::Alignment(a), Constraint::Alignment(b)) => {
            a.alignment_type == b.alignment_type && a.objects == b.objects
        }
        (Constraint::Spacing(a), Constraint::Spacing(b)) => {
            a.spacing_type == b.spacing_type && a.object1 == b.object1 && a.object2 == b.object2
        }
        (Constraint::Distribution(a), Constraint::Distribution(b)) => {
            a.distribution_type == b.distribution_type && a.objects == b.objects
        }
        (Constraint::Grid(a), Constraint::Grid(b)) => a.objects == b.objects,
        (Constraint::Containment(a), Constraint::Containment(b)) => {
            a.container == b.container && a.children == b.children
        }
        _ => false,
    }
}
