//! The compact, immutable indexed mesh the clipping engine outputs.
//!
//! A [`Polyhedron`] is four parallel arrays: vertex positions, undirected
//! lines (two vertex indices), line references (line index plus an
//! endpoint selector) grouped into contiguous per-polygon spans, and the
//! polygons themselves. One physical line serves both adjoining polygons,
//! each traversing it toward the opposite endpoint.

use crate::error::{Result, TopologyError};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An undirected edge: two vertex indices, no implied direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedLine {
    pub vertices: [u32; 2],
}

/// A directed use of a line by one polygon.
///
/// `end` selects the endpoint of the line that the owning polygon reaches
/// when walking its boundary, so the two polygons sharing a line carry
/// opposite selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedLineReference {
    pub line: u32,
    pub end: u8,
}

/// A polygon: outward normal plus a contiguous span of line references.
///
/// Consecutive references share an endpoint and the span closes into a
/// loop whose Newell normal points outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPolygon {
    pub normal: Vector3,
    pub first_ref: u32,
    pub ref_count: u32,
}

/// A convex polyhedron in indexed form.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    vertices: Vec<Point3>,
    lines: Vec<IndexedLine>,
    line_refs: Vec<IndexedLineReference>,
    polygons: Vec<IndexedPolygon>,
}

impl Polyhedron {
    /// Assembles a polyhedron directly from its four arrays.
    ///
    /// Intended for the graph conversion path; general callers should
    /// prefer [`Polyhedron::from_faces`]. The arrays are trusted here and
    /// checked by [`Polyhedron::validate`] in debug builds.
    #[must_use]
    pub(crate) fn from_raw_parts(
        vertices: Vec<Point3>,
        lines: Vec<IndexedLine>,
        line_refs: Vec<IndexedLineReference>,
        polygons: Vec<IndexedPolygon>,
    ) -> Self {
        let polyhedron = Self {
            vertices,
            lines,
            line_refs,
            polygons,
        };
        debug_assert!(polyhedron.validate().is_ok());
        polyhedron
    }

    /// Builds a polyhedron from vertex positions and per-face vertex
    /// loops, deriving the shared lines and line references.
    ///
    /// Each face is a loop of vertex indices wound so that its Newell
    /// normal points out of the solid. Faces sharing an edge traverse it
    /// in opposite directions, which is how the shared line's two
    /// reference slots get claimed.
    ///
    /// # Errors
    ///
    /// Returns an error if a face has fewer than 3 vertices, an index is
    /// out of bounds, or an edge is not shared by exactly two faces.
    pub fn from_faces(vertices: Vec<Point3>, faces: &[Vec<usize>]) -> Result<Self> {
        let mut lines: Vec<IndexedLine> = Vec::new();
        let mut line_refs: Vec<IndexedLineReference> = Vec::new();
        let mut polygons: Vec<IndexedPolygon> = Vec::with_capacity(faces.len());
        let mut line_use_counts: Vec<u8> = Vec::new();

        for face in faces {
            if face.len() < 3 {
                return Err(TopologyError::InvalidTopology(format!(
                    "face has {} vertices, need at least 3",
                    face.len()
                ))
                .into());
            }

            let first_ref = u32::try_from(line_refs.len()).map_err(|_| {
                TopologyError::InvalidTopology("too many line references".into())
            })?;

            for (slot, &from) in face.iter().enumerate() {
                let to = face[(slot + 1) % face.len()];
                if from >= vertices.len() || to >= vertices.len() {
                    return Err(TopologyError::IndexOutOfBounds(format!(
                        "face vertex index {}",
                        from.max(to)
                    ))
                    .into());
                }
                let (a, b) = (from as u32, to as u32);

                // Find the line this edge shares with an earlier face, or
                // create it with this face claiming the forward slot.
                let existing = lines.iter().position(|line| {
                    line.vertices == [a, b] || line.vertices == [b, a]
                });
                let (line_index, end) = match existing {
                    Some(i) => {
                        if line_use_counts[i] >= 2 {
                            return Err(TopologyError::InvalidTopology(format!(
                                "edge {a}-{b} used by more than two faces"
                            ))
                            .into());
                        }
                        line_use_counts[i] += 1;
                        let end = u8::from(lines[i].vertices[1] == b);
                        (i as u32, end)
                    }
                    None => {
                        lines.push(IndexedLine { vertices: [a, b] });
                        line_use_counts.push(1);
                        ((lines.len() - 1) as u32, 1)
                    }
                };
                line_refs.push(IndexedLineReference {
                    line: line_index,
                    end,
                });
            }

            let loop_verts: Vec<Point3> = face.iter().map(|&i| vertices[i]).collect();
            polygons.push(IndexedPolygon {
                normal: newell_normal(&loop_verts),
                first_ref,
                ref_count: face.len() as u32,
            });
        }

        if let Some(i) = line_use_counts.iter().position(|&c| c != 2) {
            return Err(TopologyError::InvalidTopology(format!(
                "line {i} referenced {} times, expected 2",
                line_use_counts[i]
            ))
            .into());
        }

        let polyhedron = Self {
            vertices,
            lines,
            line_refs,
            polygons,
        };
        polyhedron.validate()?;
        Ok(polyhedron)
    }

    /// Verifies the structural invariants of the indexed form.
    ///
    /// Every line must be referenced by exactly two polygon spans with
    /// opposite endpoint selectors, and every polygon span must close:
    /// each reference starts on the endpoint the previous one reached.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        let mut slot_uses = vec![[0u8; 2]; self.lines.len()];

        for line in &self.lines {
            for &v in &line.vertices {
                if v as usize >= self.vertices.len() {
                    return Err(TopologyError::IndexOutOfBounds(format!(
                        "line vertex index {v}"
                    ))
                    .into());
                }
            }
        }

        for polygon in &self.polygons {
            let first = polygon.first_ref as usize;
            let count = polygon.ref_count as usize;
            if first + count > self.line_refs.len() {
                return Err(TopologyError::IndexOutOfBounds(
                    "polygon reference span".into(),
                )
                .into());
            }
            if count < 2 {
                return Err(TopologyError::InvalidTopology(
                    "polygon with fewer than 2 lines".into(),
                )
                .into());
            }

            let span = &self.line_refs[first..first + count];
            for (i, line_ref) in span.iter().enumerate() {
                let line = self
                    .lines
                    .get(line_ref.line as usize)
                    .ok_or_else(|| {
                        TopologyError::IndexOutOfBounds(format!(
                            "line reference to line {}",
                            line_ref.line
                        ))
                    })?;
                if line_ref.end > 1 {
                    return Err(TopologyError::InvalidTopology(format!(
                        "endpoint selector {}",
                        line_ref.end
                    ))
                    .into());
                }
                slot_uses[line_ref.line as usize][line_ref.end as usize] += 1;

                // This reference must start where the previous one ended.
                let next = span[(i + 1) % count];
                let next_line = self.lines[next.line as usize];
                let reached = line.vertices[line_ref.end as usize];
                let next_start = next_line.vertices[1 - next.end as usize];
                if reached != next_start {
                    return Err(TopologyError::OpenBoundaryLoop.into());
                }
            }
        }

        for (i, uses) in slot_uses.iter().enumerate() {
            if *uses != [1, 1] {
                return Err(TopologyError::InvalidTopology(format!(
                    "line {i} polygon back-references are {uses:?}, expected one per side"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Undirected lines.
    #[must_use]
    pub fn lines(&self) -> &[IndexedLine] {
        &self.lines
    }

    /// Line references, grouped into per-polygon spans.
    #[must_use]
    pub fn line_refs(&self) -> &[IndexedLineReference] {
        &self.line_refs
    }

    /// Polygons.
    #[must_use]
    pub fn polygons(&self) -> &[IndexedPolygon] {
        &self.polygons
    }

    /// The vertex loop of one polygon, in boundary order.
    ///
    /// Each line reference contributes the endpoint it reaches, so the
    /// result is the closed loop of corner positions.
    #[must_use]
    pub fn polygon_vertices(&self, polygon: usize) -> Vec<Point3> {
        let Some(p) = self.polygons.get(polygon) else {
            return Vec::new();
        };
        let first = p.first_ref as usize;
        self.line_refs[first..first + p.ref_count as usize]
            .iter()
            .map(|r| {
                let line = self.lines[r.line as usize];
                self.vertices[line.vertices[r.end as usize] as usize]
            })
            .collect()
    }

    /// Center of the polyhedron's axis-aligned bounding box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        match self.aabb() {
            Some((mins, maxs)) => Point3::from((mins.coords + maxs.coords) * 0.5),
            None => Point3::origin(),
        }
    }

    /// Axis-aligned bounding box, or `None` for an empty vertex set.
    #[must_use]
    pub fn aabb(&self) -> Option<(Point3, Point3)> {
        let first = self.vertices.first()?;
        let mut mins = *first;
        let mut maxs = *first;
        for v in &self.vertices[1..] {
            mins = Point3::new(mins.x.min(v.x), mins.y.min(v.y), mins.z.min(v.z));
            maxs = Point3::new(maxs.x.max(v.x), maxs.y.max(v.y), maxs.z.max(v.z));
        }
        Some((mins, maxs))
    }

    /// Enclosed volume via the signed tetrahedron method.
    ///
    /// Each polygon is fan-triangulated and every triangle contributes
    /// `v0 · (v1 × v2) / 6` against the origin; outward winding makes the
    /// sum positive.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let mut signed = 0.0;
        for i in 0..self.polygons.len() {
            let corners = self.polygon_vertices(i);
            for k in 1..corners.len().saturating_sub(1) {
                let v0 = corners[0].coords;
                let v1 = corners[k].coords;
                let v2 = corners[k + 1].coords;
                signed += v0.dot(&v1.cross(&v2));
            }
        }
        signed / 6.0
    }
}

/// Polygon normal by summing cross products of consecutive boundary
/// positions (Newell). Robust to slight non-planarity, unlike a 3-point
/// normal. Returns a zero vector for a degenerate loop.
#[must_use]
pub fn newell_normal(loop_verts: &[Point3]) -> Vector3 {
    let mut sum = Vector3::zeros();
    for i in 0..loop_verts.len() {
        let a = loop_verts[i].coords;
        let b = loop_verts[(i + 1) % loop_verts.len()].coords;
        sum += a.cross(&b);
    }
    let len = sum.norm();
    if len < TOLERANCE {
        Vector3::zeros()
    } else {
        sum / len
    }
}
