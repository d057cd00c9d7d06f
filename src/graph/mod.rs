//! The mutable working graph the plane-cut core operates on.
//!
//! Entities live in [`slotmap`] arenas and reference each other through
//! typed generational keys, replacing raw-pointer circular lists with
//! index-based adjacency: a point knows its incident lines, a line knows
//! its two endpoints and two adjoining polygons, and a polygon owns an
//! ordered boundary loop of [`LineRef`]s. One store is built per
//! construction call and dropped with it, freeing every node at once.

pub mod convert;
pub mod line;
pub mod point;
pub mod polygon;

pub use line::{LinePlanarity, LineKey, WorkingLine};
pub use point::{PointKey, WorkingPoint};
pub use polygon::{PolygonKey, WorkingPolygon};

use slotmap::SlotMap;

/// A directed use of a line within a polygon's boundary loop.
///
/// `end` selects the endpoint the polygon reaches when traversing the
/// line, mirroring the endpoint selector of the indexed output form. The
/// polygon owning the reference sits in the line's `polygons[end]` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRef {
    pub line: LineKey,
    pub end: u8,
}

impl LineRef {
    #[must_use]
    pub fn new(line: LineKey, end: u8) -> Self {
        Self { line, end }
    }
}

/// Arena that owns all working-graph entities for one construction call.
///
/// Accessors index the arenas directly: passing a stale key is a
/// programming-invariant violation and panics, matching the engine's
/// debug-assertion error model rather than threading `Result` through
/// the cut inner loops.
#[derive(Debug, Default)]
pub struct GraphStore {
    points: SlotMap<PointKey, WorkingPoint>,
    lines: SlotMap<LineKey, WorkingLine>,
    polygons: SlotMap<PolygonKey, WorkingPolygon>,
}

impl GraphStore {
    /// Creates a new, empty graph store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Points ---

    pub fn add_point(&mut self, data: WorkingPoint) -> PointKey {
        self.points.insert(data)
    }

    #[must_use]
    pub fn point(&self, key: PointKey) -> &WorkingPoint {
        &self.points[key]
    }

    pub fn point_mut(&mut self, key: PointKey) -> &mut WorkingPoint {
        &mut self.points[key]
    }

    pub fn remove_point(&mut self, key: PointKey) {
        self.points.remove(key);
    }

    #[must_use]
    pub fn contains_point(&self, key: PointKey) -> bool {
        self.points.contains_key(key)
    }

    pub fn points(&self) -> impl Iterator<Item = (PointKey, &WorkingPoint)> {
        self.points.iter()
    }

    pub fn points_mut(&mut self) -> impl Iterator<Item = (PointKey, &mut WorkingPoint)> {
        self.points.iter_mut()
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    // --- Lines ---

    pub fn add_line(&mut self, data: WorkingLine) -> LineKey {
        self.lines.insert(data)
    }

    #[must_use]
    pub fn line(&self, key: LineKey) -> &WorkingLine {
        &self.lines[key]
    }

    pub fn line_mut(&mut self, key: LineKey) -> &mut WorkingLine {
        &mut self.lines[key]
    }

    pub fn remove_line(&mut self, key: LineKey) {
        self.lines.remove(key);
    }

    #[must_use]
    pub fn contains_line(&self, key: LineKey) -> bool {
        self.lines.contains_key(key)
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineKey, &WorkingLine)> {
        self.lines.iter()
    }

    pub fn lines_mut(&mut self) -> impl Iterator<Item = (LineKey, &mut WorkingLine)> {
        self.lines.iter_mut()
    }

    pub fn line_keys(&self) -> impl Iterator<Item = LineKey> + '_ {
        self.lines.keys()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    // --- Polygons ---

    pub fn add_polygon(&mut self, data: WorkingPolygon) -> PolygonKey {
        self.polygons.insert(data)
    }

    #[must_use]
    pub fn polygon(&self, key: PolygonKey) -> &WorkingPolygon {
        &self.polygons[key]
    }

    pub fn polygon_mut(&mut self, key: PolygonKey) -> &mut WorkingPolygon {
        &mut self.polygons[key]
    }

    pub fn remove_polygon(&mut self, key: PolygonKey) {
        self.polygons.remove(key);
    }

    #[must_use]
    pub fn contains_polygon(&self, key: PolygonKey) -> bool {
        self.polygons.contains_key(key)
    }

    pub fn polygons(&self) -> impl Iterator<Item = (PolygonKey, &WorkingPolygon)> {
        self.polygons.iter()
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    // --- Traversal helpers ---

    /// The endpoint a polygon reaches when traversing this reference.
    #[must_use]
    pub fn ref_end(&self, line_ref: LineRef) -> PointKey {
        self.lines[line_ref.line].points[line_ref.end as usize]
    }

    /// The endpoint a polygon leaves when traversing this reference.
    #[must_use]
    pub fn ref_start(&self, line_ref: LineRef) -> PointKey {
        self.lines[line_ref.line].points[1 - line_ref.end as usize]
    }

    /// Removes `line` from `point`'s fan, if present.
    pub fn unfan_line(&mut self, point: PointKey, line: LineKey) {
        if let Some(p) = self.points.get_mut(point) {
            p.fan.retain(|&l| l != line);
        }
    }
}
