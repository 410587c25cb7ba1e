// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The BRep store: one table per entity kind plus shared geometry columns.
//!
//! Tables map a [`Handle`](crate::handle::Handle) to a plain data record.
//! Records hold downward references exactly as they arrived in the entity
//! stream, and upward references filled in by the bottom-up derivation in
//! [`adjacency`](crate::adjacency). Geometry is referenced through
//! [`GeometryRange`]s into the [`GeometryStore`].
//!
//! Lookups of unknown handles never fail: relationship accessors return an
//! empty slice, vertex accessors return the invalid handle and geometry
//! accessors return empty views.

use nalgebra::{Point2, Point3};
use rustc_hash::FxHashMap;

use crate::bounds::BoundsCache;
use crate::geometry::{GeometryRange, GeometryStore, Triangle};
use crate::handle::*;

/// Data stored for an assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyData {
    pub parts: Vec<PartHandle>,
    pub source: String,
}

/// Data stored for a part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartData {
    pub bodies: Vec<BodyHandle>,
}

/// Data stored for a body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyData {
    pub faces: Vec<FaceHandle>,
    /// Generated shells grouping subsets of `faces`.
    pub shells: Vec<ShellHandle>,
    /// Derived: union of the edges of every face, ascending.
    pub edges: Vec<EdgeHandle>,
    /// Derived: valid endpoints of `edges`, ascending.
    pub vertices: Vec<VertexHandle>,
}

/// Data stored for a face: its triangulated surface and its boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceData {
    pub edges: Vec<EdgeHandle>,
    /// Generated loops, in record order.
    pub loops: Vec<LoopHandle>,
    /// Derived: bodies listing this face, ascending.
    pub bodies: Vec<BodyHandle>,
    pub points: GeometryRange,
    pub triangles: GeometryRange,
    pub normals: GeometryRange,
    pub parameters: GeometryRange,
}

/// Data stored for an edge: its sampled curve and end vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    /// Invalid when the edge has no start vertex.
    pub start: VertexHandle,
    /// Invalid when the edge has no end vertex.
    pub end: VertexHandle,
    /// Derived: faces listing this edge, ascending.
    pub faces: Vec<FaceHandle>,
    pub points: GeometryRange,
    pub parameters: GeometryRange,
}

/// Data stored for a vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexData {
    /// Row in the point column, `None` if the record carried no point.
    pub point: Option<usize>,
    /// Derived: edges starting or ending here, ascending.
    pub edges: Vec<EdgeHandle>,
}

/// An ordered cycle of edges bounding one face region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopData {
    pub edges: Vec<EdgeHandle>,
}

/// A connected group of faces of one body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellData {
    pub faces: Vec<FaceHandle>,
}

/// Borrowed triangulated surface of a face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry<'a> {
    pub points: &'a [Point3<f64>],
    pub triangles: &'a [Triangle],
}

impl FaceGeometry<'_> {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.triangles.is_empty()
    }
}

/// Build-once, query-many BRep topology store.
///
/// # Example
///
/// ```
/// use brep_lite_store::proto::{Assembly, BrepEntity, Part};
/// use brep_lite_store::{AssemblyHandle, BrepStore, PartHandle};
///
/// let records: Vec<BrepEntity> = vec![
///     Assembly { id: 1, parts: vec![10], ..Default::default() }.into(),
///     Part { id: 10, bodies: vec![] }.into(),
/// ];
///
/// let mut store = BrepStore::new();
/// let report = store.build_from_entities(&records);
/// assert!(report.is_success());
/// assert_eq!(store.assembly_parts(AssemblyHandle::new(1)), &[PartHandle::new(10)]);
/// ```
#[derive(Debug, Default)]
pub struct BrepStore {
    pub(crate) geometry: GeometryStore,

    pub(crate) assemblies: FxHashMap<AssemblyHandle, AssemblyData>,
    pub(crate) parts: FxHashMap<PartHandle, PartData>,
    pub(crate) bodies: FxHashMap<BodyHandle, BodyData>,
    pub(crate) faces: FxHashMap<FaceHandle, FaceData>,
    pub(crate) edges: FxHashMap<EdgeHandle, EdgeData>,
    pub(crate) vertices: FxHashMap<VertexHandle, VertexData>,
    pub(crate) loops: FxHashMap<LoopHandle, LoopData>,
    pub(crate) shells: FxHashMap<ShellHandle, ShellData>,

    /// Next value handed out to a generated loop or shell; `None` once
    /// the id space above the largest record id is used up.
    pub(crate) next_generated_id: Option<i64>,

    pub(crate) bounds_cache: BoundsCache,
    pub(crate) ready: bool,
}

impl BrepStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every table, the geometry columns and the bounding-box cache.
    pub fn reset(&mut self) {
        self.geometry.clear();
        self.assemblies.clear();
        self.parts.clear();
        self.bodies.clear();
        self.faces.clear();
        self.edges.clear();
        self.vertices.clear();
        self.loops.clear();
        self.shells.clear();
        self.next_generated_id = None;
        self.bounds_cache.clear();
        self.ready = false;
    }

    /// Returns `true` once a build has completed and until the next reset
    /// or failed load.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The shared geometry columns.
    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    // --- Enumeration (table order, not sorted) ---

    pub fn assemblies(&self) -> impl Iterator<Item = AssemblyHandle> + '_ {
        self.assemblies.keys().copied()
    }

    pub fn parts(&self) -> impl Iterator<Item = PartHandle> + '_ {
        self.parts.keys().copied()
    }

    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.keys().copied()
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        self.faces.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.edges.keys().copied()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        self.vertices.keys().copied()
    }

    pub fn loops(&self) -> impl Iterator<Item = LoopHandle> + '_ {
        self.loops.keys().copied()
    }

    pub fn shells(&self) -> impl Iterator<Item = ShellHandle> + '_ {
        self.shells.keys().copied()
    }

    // --- Counts ---

    pub fn assembly_count(&self) -> usize {
        self.assemblies.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn shell_count(&self) -> usize {
        self.shells.len()
    }

    // --- Records ---

    pub fn assembly(&self, h: AssemblyHandle) -> Option<&AssemblyData> {
        self.assemblies.get(&h)
    }

    pub fn part(&self, h: PartHandle) -> Option<&PartData> {
        self.parts.get(&h)
    }

    pub fn body(&self, h: BodyHandle) -> Option<&BodyData> {
        self.bodies.get(&h)
    }

    pub fn face(&self, h: FaceHandle) -> Option<&FaceData> {
        self.faces.get(&h)
    }

    pub fn edge(&self, h: EdgeHandle) -> Option<&EdgeData> {
        self.edges.get(&h)
    }

    pub fn vertex(&self, h: VertexHandle) -> Option<&VertexData> {
        self.vertices.get(&h)
    }

    pub fn loop_data(&self, h: LoopHandle) -> Option<&LoopData> {
        self.loops.get(&h)
    }

    pub fn shell(&self, h: ShellHandle) -> Option<&ShellData> {
        self.shells.get(&h)
    }

    /// Returns `true` if the handle resolves to a stored entity.
    pub fn contains(&self, h: EntityHandle) -> bool {
        match h {
            EntityHandle::Part(h) => self.parts.contains_key(&h),
            EntityHandle::Body(h) => self.bodies.contains_key(&h),
            EntityHandle::Face(h) => self.faces.contains_key(&h),
            EntityHandle::Edge(h) => self.edges.contains_key(&h),
            EntityHandle::Vertex(h) => self.vertices.contains_key(&h),
        }
    }

    // --- Downward relationships ---

    pub fn assembly_parts(&self, h: AssemblyHandle) -> &[PartHandle] {
        self.assemblies.get(&h).map(|a| a.parts.as_slice()).unwrap_or(&[])
    }

    /// Free-form source description of an assembly.
    pub fn assembly_source(&self, h: AssemblyHandle) -> Option<&str> {
        self.assemblies.get(&h).map(|a| a.source.as_str())
    }

    pub fn part_bodies(&self, h: PartHandle) -> &[BodyHandle] {
        self.parts.get(&h).map(|p| p.bodies.as_slice()).unwrap_or(&[])
    }

    pub fn body_faces(&self, h: BodyHandle) -> &[FaceHandle] {
        self.bodies.get(&h).map(|b| b.faces.as_slice()).unwrap_or(&[])
    }

    pub fn body_shells(&self, h: BodyHandle) -> &[ShellHandle] {
        self.bodies.get(&h).map(|b| b.shells.as_slice()).unwrap_or(&[])
    }

    pub fn shell_faces(&self, h: ShellHandle) -> &[FaceHandle] {
        self.shells.get(&h).map(|s| s.faces.as_slice()).unwrap_or(&[])
    }

    pub fn face_edges(&self, h: FaceHandle) -> &[EdgeHandle] {
        self.faces.get(&h).map(|f| f.edges.as_slice()).unwrap_or(&[])
    }

    pub fn face_loops(&self, h: FaceHandle) -> &[LoopHandle] {
        self.faces.get(&h).map(|f| f.loops.as_slice()).unwrap_or(&[])
    }

    pub fn loop_edges(&self, h: LoopHandle) -> &[EdgeHandle] {
        self.loops.get(&h).map(|l| l.edges.as_slice()).unwrap_or(&[])
    }

    /// Start vertex of an edge; invalid if the edge has none or is unknown.
    pub fn start_vertex(&self, h: EdgeHandle) -> VertexHandle {
        self.edges.get(&h).map(|e| e.start).unwrap_or_default()
    }

    /// End vertex of an edge; invalid if the edge has none or is unknown.
    pub fn end_vertex(&self, h: EdgeHandle) -> VertexHandle {
        self.edges.get(&h).map(|e| e.end).unwrap_or_default()
    }

    // --- Upward and derived relationships ---

    pub fn vertex_edges(&self, h: VertexHandle) -> &[EdgeHandle] {
        self.vertices.get(&h).map(|v| v.edges.as_slice()).unwrap_or(&[])
    }

    pub fn edge_faces(&self, h: EdgeHandle) -> &[FaceHandle] {
        self.edges.get(&h).map(|e| e.faces.as_slice()).unwrap_or(&[])
    }

    pub fn face_bodies(&self, h: FaceHandle) -> &[BodyHandle] {
        self.faces.get(&h).map(|f| f.bodies.as_slice()).unwrap_or(&[])
    }

    pub fn body_edges(&self, h: BodyHandle) -> &[EdgeHandle] {
        self.bodies.get(&h).map(|b| b.edges.as_slice()).unwrap_or(&[])
    }

    pub fn body_vertices(&self, h: BodyHandle) -> &[VertexHandle] {
        self.bodies.get(&h).map(|b| b.vertices.as_slice()).unwrap_or(&[])
    }

    // --- Geometry views ---

    /// Points and triangles of a face. Empty for an unknown face.
    pub fn face_geometry(&self, h: FaceHandle) -> FaceGeometry<'_> {
        match self.faces.get(&h) {
            Some(f) => FaceGeometry {
                points: self.geometry.points(f.points),
                triangles: self.geometry.triangles(f.triangles),
            },
            None => FaceGeometry {
                points: &[],
                triangles: &[],
            },
        }
    }

    pub fn face_normals(&self, h: FaceHandle) -> &[Point3<f64>] {
        self.faces
            .get(&h)
            .map(|f| self.geometry.normals(f.normals))
            .unwrap_or(&[])
    }

    pub fn face_parameters(&self, h: FaceHandle) -> &[Point2<f64>] {
        self.faces
            .get(&h)
            .map(|f| self.geometry.face_params(f.parameters))
            .unwrap_or(&[])
    }

    /// Curve samples of an edge. Empty for an unknown edge.
    pub fn edge_geometry(&self, h: EdgeHandle) -> &[Point3<f64>] {
        self.edges
            .get(&h)
            .map(|e| self.geometry.points(e.points))
            .unwrap_or(&[])
    }

    pub fn edge_parameters(&self, h: EdgeHandle) -> &[f64] {
        self.edges
            .get(&h)
            .map(|e| self.geometry.edge_params(e.parameters))
            .unwrap_or(&[])
    }

    pub fn vertex_point(&self, h: VertexHandle) -> Option<Point3<f64>> {
        let index = self.vertices.get(&h)?.point?;
        self.geometry.point(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = BrepStore::new();
        assert_eq!(store.assembly_count(), 0);
        assert_eq!(store.part_count(), 0);
        assert_eq!(store.body_count(), 0);
        assert_eq!(store.face_count(), 0);
        assert_eq!(store.edge_count(), 0);
        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.loop_count(), 0);
        assert_eq!(store.shell_count(), 0);
        assert!(!store.is_ready());
    }

    #[test]
    fn unknown_handles_resolve_to_empty_values() {
        let store = BrepStore::new();
        assert!(store.part_bodies(PartHandle::new(1)).is_empty());
        assert!(store.body_faces(BodyHandle::new(1)).is_empty());
        assert!(store.face_edges(FaceHandle::new(1)).is_empty());
        assert!(store.vertex_edges(VertexHandle::new(1)).is_empty());
        assert!(!store.start_vertex(EdgeHandle::new(1)).is_valid());
        assert!(!store.end_vertex(EdgeHandle::new(1)).is_valid());
        assert!(store.face_geometry(FaceHandle::new(1)).is_empty());
        assert!(store.edge_geometry(EdgeHandle::new(1)).is_empty());
        assert!(store.vertex_point(VertexHandle::new(1)).is_none());
        assert!(store.assembly_source(AssemblyHandle::new(1)).is_none());
        assert!(!store.contains(EntityHandle::Face(FaceHandle::new(1))));
    }

    #[test]
    fn geometry_views_follow_ranges() {
        let mut store = BrepStore::new();
        let points = store.geometry.extend_points([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let triangles = store.geometry.extend_triangles([[0, 1, 2]]);
        store.faces.insert(
            FaceHandle::new(5),
            FaceData {
                points,
                triangles,
                ..Default::default()
            },
        );

        let geom = store.face_geometry(FaceHandle::new(5));
        assert_eq!(geom.points.len(), 3);
        assert_eq!(geom.triangles, &[[0, 1, 2]]);
        assert!(store.contains(FaceHandle::new(5).into()));
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = BrepStore::new();
        store.geometry.extend_points([Point3::origin()]);
        store.vertices.insert(
            VertexHandle::new(0),
            VertexData {
                point: Some(0),
                edges: Vec::new(),
            },
        );
        store.next_generated_id = Some(17);
        store.ready = true;

        store.reset();

        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.geometry().point_count(), 0);
        assert_eq!(store.next_generated_id, None);
        assert!(!store.is_ready());
    }
}
