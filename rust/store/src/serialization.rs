// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of a built store.
//!
//! A snapshot lists every table sorted by handle value together with the
//! raw geometry columns. Two stores built from the same records produce
//! equal snapshots, which makes snapshots the natural way to compare store
//! contents in tests and to inspect a store by hand.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::GeometryRange;
use crate::handle::{EntityKind, Handle};
use crate::store::BrepStore;

/// Serializable image of the full store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub assemblies: Vec<AssemblySnapshot>,
    pub parts: Vec<PartSnapshot>,
    pub bodies: Vec<BodySnapshot>,
    pub faces: Vec<FaceSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub vertices: Vec<VertexSnapshot>,
    pub loops: Vec<GroupSnapshot>,
    pub shells: Vec<GroupSnapshot>,
    pub geometry: GeometrySnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySnapshot {
    pub id: i64,
    pub parts: Vec<i64>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub id: i64,
    pub bodies: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: i64,
    pub faces: Vec<i64>,
    pub shells: Vec<i64>,
    pub edges: Vec<i64>,
    pub vertices: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub id: i64,
    pub edges: Vec<i64>,
    pub loops: Vec<i64>,
    pub bodies: Vec<i64>,
    pub points: [usize; 2],
    pub triangles: [usize; 2],
    pub normals: [usize; 2],
    pub parameters: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: i64,
    pub start: i64,
    pub end: i64,
    pub faces: Vec<i64>,
    pub points: [usize; 2],
    pub parameters: [usize; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub point: Option<usize>,
    pub edges: Vec<i64>,
}

/// A loop (edge ids) or a shell (face ids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: i64,
    pub members: Vec<i64>,
}

/// Geometry columns, one fixed-size array per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub points: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub face_params: Vec<[f64; 2]>,
    pub edge_params: Vec<f64>,
}

fn ids<K: EntityKind>(handles: &[Handle<K>]) -> Vec<i64> {
    handles.iter().map(Handle::value).collect()
}

fn span(range: GeometryRange) -> [usize; 2] {
    [range.start, range.len]
}

/// Table entries in ascending handle order.
fn sorted<K, V>(table: &FxHashMap<K, V>) -> Vec<(&K, &V)>
where
    K: Ord + Hash,
{
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries
}

impl BrepStore {
    /// Builds a handle-sorted snapshot of every table and geometry column.
    pub fn snapshot(&self) -> StoreSnapshot {
        let (points, triangles, normals, face_params, edge_params) = self.geometry.columns();

        StoreSnapshot {
            assemblies: sorted(&self.assemblies)
                .into_iter()
                .map(|(h, a)| AssemblySnapshot {
                    id: h.value(),
                    parts: ids(&a.parts),
                    source: a.source.clone(),
                })
                .collect(),
            parts: sorted(&self.parts)
                .into_iter()
                .map(|(h, p)| PartSnapshot {
                    id: h.value(),
                    bodies: ids(&p.bodies),
                })
                .collect(),
            bodies: sorted(&self.bodies)
                .into_iter()
                .map(|(h, b)| BodySnapshot {
                    id: h.value(),
                    faces: ids(&b.faces),
                    shells: ids(&b.shells),
                    edges: ids(&b.edges),
                    vertices: ids(&b.vertices),
                })
                .collect(),
            faces: sorted(&self.faces)
                .into_iter()
                .map(|(h, f)| FaceSnapshot {
                    id: h.value(),
                    edges: ids(&f.edges),
                    loops: ids(&f.loops),
                    bodies: ids(&f.bodies),
                    points: span(f.points),
                    triangles: span(f.triangles),
                    normals: span(f.normals),
                    parameters: span(f.parameters),
                })
                .collect(),
            edges: sorted(&self.edges)
                .into_iter()
                .map(|(h, e)| EdgeSnapshot {
                    id: h.value(),
                    start: e.start.value(),
                    end: e.end.value(),
                    faces: ids(&e.faces),
                    points: span(e.points),
                    parameters: span(e.parameters),
                })
                .collect(),
            vertices: sorted(&self.vertices)
                .into_iter()
                .map(|(h, v)| VertexSnapshot {
                    id: h.value(),
                    point: v.point,
                    edges: ids(&v.edges),
                })
                .collect(),
            loops: sorted(&self.loops)
                .into_iter()
                .map(|(h, l)| GroupSnapshot {
                    id: h.value(),
                    members: ids(&l.edges),
                })
                .collect(),
            shells: sorted(&self.shells)
                .into_iter()
                .map(|(h, s)| GroupSnapshot {
                    id: h.value(),
                    members: ids(&s.faces),
                })
                .collect(),
            geometry: GeometrySnapshot {
                points: points.iter().map(|p| [p.x, p.y, p.z]).collect(),
                triangles: triangles.to_vec(),
                normals: normals.iter().map(|n| [n.x, n.y, n.z]).collect(),
                face_params: face_params.iter().map(|uv| [uv.x, uv.y]).collect(),
                edge_params: edge_params.to_vec(),
            },
        }
    }

    /// Serializes [`snapshot`](Self::snapshot) as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{self, Curve, Vector3};

    #[test]
    fn snapshot_is_sorted_by_handle() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&[
            proto::Part { id: 30, bodies: vec![] }.into(),
            proto::Part { id: 10, bodies: vec![] }.into(),
            proto::Part { id: 20, bodies: vec![] }.into(),
        ]);
        let ids: Vec<i64> = store.snapshot().parts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn json_contains_geometry() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&[proto::Edge {
            id: 1,
            curve: Some(Curve {
                points: vec![Vector3::new(0.5, 0.0, 0.0)],
                parameters: vec![0.25],
            }),
            start: None,
            end: None,
        }
        .into()]);

        let json = store.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["edges"][0]["id"], 1);
        assert_eq!(value["edges"][0]["start"], -1);
        assert_eq!(value["geometry"]["points"][0][0], 0.5);
        assert_eq!(value["geometry"]["edge_params"][0], 0.25);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = BrepStore::new();
        let _ = store.build_from_entities(&[proto::Assembly {
            id: 1,
            parts: vec![2],
            source: "demo".to_string(),
        }
        .into()]);
        let snapshot = store.snapshot();
        let parsed: StoreSnapshot = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
