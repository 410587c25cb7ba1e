// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BRep-Lite Store
//!
//! Build-once, query-many store for boundary representation (B-Rep)
//! topology.
//!
//! A store is filled from a stream of exported entity records (assemblies,
//! parts, bodies, faces, edges and vertices) that only state which children
//! each parent has. Ingestion keeps every record in a per-kind table, puts
//! all points, triangles and parameters in shared geometry columns, and
//! then derives the upward relationships (vertex to edges, edge to faces,
//! face to bodies) and each body's edge and vertex sets.
//!
//! After a build the store is read-only apart from the memoized bounding
//! boxes, which may be queried from many threads at once.
//!
//! ```no_run
//! use brep_lite_store::BrepStore;
//!
//! let mut store = BrepStore::new();
//! let report = store.load_file("model.brep")?;
//! if !report.is_success() {
//!     eprintln!("{} records skipped", report.failures.len());
//! }
//! for assembly in store.assemblies() {
//!     let bbox = store.bounding_box(assembly);
//!     println!("{assembly}: {:?} volume {}", bbox.center(), bbox.volume());
//! }
//! # Ok::<_, brep_lite_store::Error>(())
//! ```

pub mod adjacency;
pub mod bounds;
pub mod error;
pub mod geometry;
pub mod handle;
pub mod ingest;
pub mod proto;
pub mod serialization;
pub mod store;
pub mod stream;

pub use bounds::{Aabb, BoundedKind};
pub use error::{Error, Result};
pub use geometry::{GeometryRange, GeometryStore, Triangle};
pub use handle::{
    AssemblyHandle, BodyHandle, EdgeHandle, EntityHandle, EntityKind, EntityType, FaceHandle,
    Handle, LoopHandle, PartHandle, ShellHandle, VertexHandle,
};
pub use ingest::{IngestCounts, IngestReport};
pub use serialization::StoreSnapshot;
pub use store::{BrepStore, FaceGeometry};
pub use stream::{decode_entities, encode_entities, write_entities, StreamConfig};
