// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire records of the BRep entity stream.
//!
//! Each record is a protobuf `BRepEntity` message holding exactly one of the
//! six externally supplied entity kinds. Records only reference each other
//! by integer id and only carry the parent-to-child relationships known to
//! the exporter.
//!
//! ```text
//! message Vector3   { double x = 1; double y = 2; double z = 3; }
//! message Vector2   { double u = 1; double v = 2; }
//! message Facet     { uint32 i = 1; uint32 j = 2; uint32 k = 3; }
//! message Surface   { repeated Vector3 points = 1; repeated Facet triangles = 2;
//!                     repeated Vector2 parameters = 3; repeated Vector3 normals = 4; }
//! message Curve     { repeated Vector3 points = 1; repeated double parameters = 2; }
//! message Loop      { repeated int64 edges = 1; }
//! message Shell     { repeated int64 faces = 1; }
//! message Assembly  { int64 id = 1; repeated int64 parts = 2; string source = 3; }
//! message Part      { int64 id = 1; repeated int64 bodies = 2; }
//! message Body      { int64 id = 1; repeated int64 faces = 2; repeated Shell shells = 3; }
//! message Face      { int64 id = 1; Surface surface = 2; repeated int64 edges = 3;
//!                     repeated Loop loops = 4; }
//! message Edge      { int64 id = 1; Curve curve = 2; optional int64 start = 3;
//!                     optional int64 end = 4; }
//! message Vertex    { int64 id = 1; Vector3 point = 2; }
//! message BRepEntity {
//!   oneof entity { Assembly assembly = 1; Part part = 2; Body body = 3;
//!                  Face face = 4; Edge edge = 5; Vertex vertex = 6; }
//! }
//! ```

use nalgebra::{Point2, Point3};

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Vector3 {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<&Vector3> for Point3<f64> {
    fn from(v: &Vector3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Vector2 {
    #[prost(double, tag = "1")]
    pub u: f64,
    #[prost(double, tag = "2")]
    pub v: f64,
}

impl From<&Vector2> for Point2<f64> {
    fn from(p: &Vector2) -> Self {
        Point2::new(p.u, p.v)
    }
}

/// Triangle indices, local to the owning surface's point list.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Facet {
    #[prost(uint32, tag = "1")]
    pub i: u32,
    #[prost(uint32, tag = "2")]
    pub j: u32,
    #[prost(uint32, tag = "3")]
    pub k: u32,
}

/// Triangulated surface of a face.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Surface {
    #[prost(message, repeated, tag = "1")]
    pub points: Vec<Vector3>,
    #[prost(message, repeated, tag = "2")]
    pub triangles: Vec<Facet>,
    #[prost(message, repeated, tag = "3")]
    pub parameters: Vec<Vector2>,
    #[prost(message, repeated, tag = "4")]
    pub normals: Vec<Vector3>,
}

/// Sampled curve of an edge.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Curve {
    #[prost(message, repeated, tag = "1")]
    pub points: Vec<Vector3>,
    #[prost(double, repeated, tag = "2")]
    pub parameters: Vec<f64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Loop {
    #[prost(int64, repeated, tag = "1")]
    pub edges: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Shell {
    #[prost(int64, repeated, tag = "1")]
    pub faces: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Assembly {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, repeated, tag = "2")]
    pub parts: Vec<i64>,
    /// Free-form description of where the assembly came from.
    #[prost(string, tag = "3")]
    pub source: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Part {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, repeated, tag = "2")]
    pub bodies: Vec<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Body {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(int64, repeated, tag = "2")]
    pub faces: Vec<i64>,
    #[prost(message, repeated, tag = "3")]
    pub shells: Vec<Shell>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Face {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "2")]
    pub surface: Option<Surface>,
    #[prost(int64, repeated, tag = "3")]
    pub edges: Vec<i64>,
    #[prost(message, repeated, tag = "4")]
    pub loops: Vec<Loop>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Edge {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "2")]
    pub curve: Option<Curve>,
    /// Start vertex id; absent or negative means none.
    #[prost(int64, optional, tag = "3")]
    pub start: Option<i64>,
    /// End vertex id; absent or negative means none.
    #[prost(int64, optional, tag = "4")]
    pub end: Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vertex {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(message, optional, tag = "2")]
    pub point: Option<Vector3>,
}

/// One record of the entity stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BrepEntity {
    #[prost(oneof = "brep_entity::Entity", tags = "1, 2, 3, 4, 5, 6")]
    pub entity: Option<brep_entity::Entity>,
}

pub mod brep_entity {
    /// The populated case of a [`BrepEntity`](super::BrepEntity).
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Entity {
        #[prost(message, tag = "1")]
        Assembly(super::Assembly),
        #[prost(message, tag = "2")]
        Part(super::Part),
        #[prost(message, tag = "3")]
        Body(super::Body),
        #[prost(message, tag = "4")]
        Face(super::Face),
        #[prost(message, tag = "5")]
        Edge(super::Edge),
        #[prost(message, tag = "6")]
        Vertex(super::Vertex),
    }
}

pub use brep_entity::Entity;

impl BrepEntity {
    /// Identifier of the contained entity, or `None` for an empty record.
    pub fn id(&self) -> Option<i64> {
        self.entity.as_ref().map(|entity| match entity {
            Entity::Assembly(a) => a.id,
            Entity::Part(p) => p.id,
            Entity::Body(b) => b.id,
            Entity::Face(f) => f.id,
            Entity::Edge(e) => e.id,
            Entity::Vertex(v) => v.id,
        })
    }
}

impl From<Entity> for BrepEntity {
    fn from(entity: Entity) -> Self {
        Self {
            entity: Some(entity),
        }
    }
}

macro_rules! impl_into_record {
    ($($name:ident),*) => {
        $(
            impl From<$name> for BrepEntity {
                fn from(value: $name) -> Self {
                    Entity::$name(value).into()
                }
            }
        )*
    };
}

impl_into_record!(Assembly, Part, Body, Face, Edge, Vertex);

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn record_id_by_kind() {
        let rec: BrepEntity = Part {
            id: 10,
            bodies: vec![100],
        }
        .into();
        assert_eq!(rec.id(), Some(10));
        assert_eq!(BrepEntity::default().id(), None);
    }

    #[test]
    fn absent_edge_endpoints_decode_as_none() {
        let edge = Edge {
            id: 3,
            start: Some(0),
            ..Default::default()
        };
        let bytes = BrepEntity::from(edge).encode_to_vec();
        let decoded = BrepEntity::decode(bytes.as_slice()).unwrap();
        match decoded.entity {
            Some(Entity::Edge(e)) => {
                assert_eq!(e.start, Some(0));
                assert_eq!(e.end, None);
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn empty_record_has_no_entity() {
        let decoded = BrepEntity::decode(&b""[..]).unwrap();
        assert!(decoded.entity.is_none());
    }

    #[test]
    fn vector_conversions() {
        let p: Point3<f64> = (&Vector3::new(1.0, 2.0, 3.0)).into();
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
        let uv: Point2<f64> = (&Vector2 { u: 0.5, v: 0.25 }).into();
        assert_eq!(uv, Point2::new(0.5, 0.25));
    }
}
