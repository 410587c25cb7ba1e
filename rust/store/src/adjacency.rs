// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bottom-up derivation of upward and aggregate relationships.
//!
//! The entity stream only says which children a parent has. After
//! population this pass fills in:
//!
//! - vertex → incident edges
//! - edge → adjacent faces
//! - face → owning bodies
//! - body → edges and body → vertices
//!
//! Every derived list is deduplicated and sorted by handle value, so the
//! result depends only on table contents and never on hash order.

use std::collections::{BTreeMap, BTreeSet};

use crate::handle::*;
use crate::store::BrepStore;

/// Inverts a parent → children relation into child → parents sets.
/// Invalid child handles are skipped.
fn invert<'a, P, C, I>(relations: I) -> BTreeMap<Handle<C>, BTreeSet<Handle<P>>>
where
    P: EntityKind,
    C: EntityKind,
    I: Iterator<Item = (Handle<P>, &'a [Handle<C>])>,
{
    let mut inverse: BTreeMap<Handle<C>, BTreeSet<Handle<P>>> = BTreeMap::new();
    for (parent, children) in relations {
        for &child in children.iter().filter(|c| c.is_valid()) {
            inverse.entry(child).or_default().insert(parent);
        }
    }
    inverse
}

impl BrepStore {
    /// Recomputes every derived relationship from the top-down tables.
    ///
    /// Previously derived lists are discarded first, so running this twice
    /// gives the same result as running it once.
    pub fn build_bottom_up_topology(&mut self) {
        for vertex in self.vertices.values_mut() {
            vertex.edges.clear();
        }
        for edge in self.edges.values_mut() {
            edge.faces.clear();
        }
        for face in self.faces.values_mut() {
            face.bodies.clear();
        }
        for body in self.bodies.values_mut() {
            body.edges.clear();
            body.vertices.clear();
        }

        // Vertex -> edges. A degenerate edge starting and ending at the
        // same vertex is listed once.
        let mut vertex_edges: BTreeMap<VertexHandle, BTreeSet<EdgeHandle>> = BTreeMap::new();
        for (&eh, edge) in &self.edges {
            for v in [edge.start, edge.end] {
                if v.is_valid() {
                    vertex_edges.entry(v).or_default().insert(eh);
                }
            }
        }
        for (vh, edges) in vertex_edges {
            if let Some(vertex) = self.vertices.get_mut(&vh) {
                vertex.edges = edges.into_iter().collect();
            }
        }

        // Edge -> faces.
        let edge_faces = invert(self.faces.iter().map(|(&fh, f)| (fh, f.edges.as_slice())));
        for (eh, faces) in edge_faces {
            if let Some(edge) = self.edges.get_mut(&eh) {
                edge.faces = faces.into_iter().collect();
            }
        }

        // Face -> bodies.
        let face_bodies = invert(self.bodies.iter().map(|(&bh, b)| (bh, b.faces.as_slice())));
        for (fh, bodies) in face_bodies {
            if let Some(face) = self.faces.get_mut(&fh) {
                face.bodies = bodies.into_iter().collect();
            }
        }

        // Body -> edges and vertices. Faces and edges missing from their
        // tables contribute nothing.
        let mut body_sets = Vec::with_capacity(self.bodies.len());
        for (&bh, body) in &self.bodies {
            let edges: BTreeSet<EdgeHandle> = body
                .faces
                .iter()
                .filter_map(|fh| self.faces.get(fh))
                .flat_map(|face| face.edges.iter().copied())
                .filter(Handle::is_valid)
                .collect();
            let vertices: BTreeSet<VertexHandle> = edges
                .iter()
                .filter_map(|eh| self.edges.get(eh))
                .flat_map(|edge| [edge.start, edge.end])
                .filter(Handle::is_valid)
                .collect();
            body_sets.push((bh, edges, vertices));
        }
        for (bh, edges, vertices) in body_sets {
            if let Some(body) = self.bodies.get_mut(&bh) {
                body.edges = edges.into_iter().collect();
                body.vertices = vertices.into_iter().collect();
            }
        }

        tracing::debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            faces = self.faces.len(),
            bodies = self.bodies.len(),
            "Derived bottom-up topology"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{self, BrepEntity};

    fn edge(id: i64, start: i64, end: i64) -> BrepEntity {
        proto::Edge {
            id,
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
        .into()
    }

    fn vertex(id: i64) -> BrepEntity {
        proto::Vertex { id, point: None }.into()
    }

    fn face(id: i64, edges: Vec<i64>) -> BrepEntity {
        proto::Face {
            id,
            edges,
            ..Default::default()
        }
        .into()
    }

    fn body(id: i64, faces: Vec<i64>) -> BrepEntity {
        proto::Body {
            id,
            faces,
            shells: vec![],
        }
        .into()
    }

    /// Two triangles sharing edge 11, both in body 100.
    fn two_triangles() -> Vec<BrepEntity> {
        vec![
            vertex(1),
            vertex(2),
            vertex(3),
            vertex(4),
            edge(10, 1, 2),
            edge(11, 2, 3),
            edge(12, 3, 1),
            edge(13, 3, 4),
            edge(14, 4, 2),
            face(20, vec![10, 11, 12]),
            face(21, vec![11, 13, 14]),
            body(100, vec![20, 21]),
        ]
    }

    #[test]
    fn vertex_edges_are_inverse_of_endpoints() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&two_triangles());
        assert_eq!(
            store.vertex_edges(VertexHandle::new(2)),
            &[EdgeHandle::new(10), EdgeHandle::new(11), EdgeHandle::new(14)]
        );
        assert_eq!(
            store.vertex_edges(VertexHandle::new(4)),
            &[EdgeHandle::new(13), EdgeHandle::new(14)]
        );
    }

    #[test]
    fn shared_edge_lists_both_faces() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&two_triangles());
        assert_eq!(
            store.edge_faces(EdgeHandle::new(11)),
            &[FaceHandle::new(20), FaceHandle::new(21)]
        );
        assert_eq!(store.edge_faces(EdgeHandle::new(10)), &[FaceHandle::new(20)]);
        assert_eq!(store.face_bodies(FaceHandle::new(21)), &[BodyHandle::new(100)]);
    }

    #[test]
    fn body_edges_and_vertices_are_deduplicated_unions() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&two_triangles());
        let b = BodyHandle::new(100);
        assert_eq!(
            store.body_edges(b),
            &[10, 11, 12, 13, 14].map(EdgeHandle::new)
        );
        assert_eq!(store.body_vertices(b), &[1, 2, 3, 4].map(VertexHandle::new));
    }

    #[test]
    fn degenerate_edge_listed_once() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&[vertex(1), edge(5, 1, 1)]);
        assert_eq!(store.vertex_edges(VertexHandle::new(1)), &[EdgeHandle::new(5)]);
    }

    #[test]
    fn invalid_endpoints_do_not_contribute() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&[
            vertex(1),
            edge(5, 1, -1),
            face(6, vec![5]),
            body(7, vec![6]),
        ]);
        assert_eq!(store.vertex_edges(VertexHandle::new(1)), &[EdgeHandle::new(5)]);
        assert_eq!(store.body_vertices(BodyHandle::new(7)), &[VertexHandle::new(1)]);
    }

    #[test]
    fn missing_children_are_skipped() {
        let mut store = BrepStore::new();
        // Face 6 references edge 99 which is never supplied; body 7 lists
        // face 98 which is also missing.
        let _ = store.build_from_entities(&[face(6, vec![99]), body(7, vec![6, 98])]);
        assert_eq!(store.body_edges(BodyHandle::new(7)), &[EdgeHandle::new(99)]);
        assert!(store.body_vertices(BodyHandle::new(7)).is_empty());
        assert!(store.edge_faces(EdgeHandle::new(99)).is_empty());
        assert_eq!(store.face_bodies(FaceHandle::new(6)), &[BodyHandle::new(7)]);
    }

    #[test]
    fn rerun_is_idempotent() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&two_triangles());
        let before = store.snapshot();
        store.build_bottom_up_topology();
        store.build_bottom_up_topology();
        assert_eq!(store.snapshot(), before);
    }
}
