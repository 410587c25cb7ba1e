// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ingestion of decoded entity records into a [`BrepStore`].
//!
//! A build resets the store, populates one table entry per record, then
//! runs the bottom-up derivation. Records are populated in stream order and
//! a later record with the same handle replaces the earlier one in full.

use nalgebra::{Point2, Point3};

use crate::error::{Error, Result};
use crate::handle::*;
use crate::proto::{self, BrepEntity, Entity};
use crate::store::{
    AssemblyData, BodyData, BrepStore, EdgeData, FaceData, LoopData, PartData, ShellData,
    VertexData,
};

/// Number of records ingested per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestCounts {
    pub assemblies: usize,
    pub parts: usize,
    pub bodies: usize,
    pub faces: usize,
    pub edges: usize,
    pub vertices: usize,
}

impl IngestCounts {
    pub fn total(&self) -> usize {
        self.assemblies + self.parts + self.bodies + self.faces + self.edges + self.vertices
    }

    fn record(&mut self, entity: &Entity) {
        match entity {
            Entity::Assembly(_) => self.assemblies += 1,
            Entity::Part(_) => self.parts += 1,
            Entity::Body(_) => self.bodies += 1,
            Entity::Face(_) => self.faces += 1,
            Entity::Edge(_) => self.edges += 1,
            Entity::Vertex(_) => self.vertices += 1,
        }
    }
}

/// Outcome of one build.
#[must_use]
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records seen, including failed ones.
    pub records: usize,
    pub counts: IngestCounts,
    /// Per-record failures, in stream order.
    pub failures: Vec<Error>,
}

impl IngestReport {
    /// `true` if every record was ingested.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// First value handed to generated loop and shell handles: one past the
/// largest record id, or 0 when there is no non-negative id. `None` when a
/// record already uses `i64::MAX`, leaving no id to generate.
pub(crate) fn first_generated_id(records: &[BrepEntity]) -> Option<i64> {
    let max = records
        .iter()
        .filter_map(BrepEntity::id)
        .fold(-1_i64, i64::max);
    max.checked_add(1)
}

/// Wraps a reference list. Negative ids become the invalid handle.
fn handles<K: EntityKind>(ids: &[i64]) -> Vec<Handle<K>> {
    ids.iter().map(|&id| Handle::from_reference(Some(id))).collect()
}

impl BrepStore {
    /// Rebuilds the store from a decoded record sequence.
    ///
    /// Records of no recognized kind are skipped and listed in the report;
    /// every other record is still ingested. The store is ready afterward
    /// either way.
    pub fn build_from_entities(&mut self, records: &[BrepEntity]) -> IngestReport {
        self.reset();
        self.next_generated_id = first_generated_id(records);

        let mut report = IngestReport {
            records: records.len(),
            ..Default::default()
        };
        for (index, record) in records.iter().enumerate() {
            match self.add_entity(index, record) {
                Ok(()) => {
                    if let Some(entity) = &record.entity {
                        report.counts.record(entity);
                    }
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "Skipping entity record");
                    report.failures.push(err);
                }
            }
        }

        self.build_bottom_up_topology();
        self.ready = true;

        tracing::debug!(
            records = report.records,
            assemblies = self.assembly_count(),
            parts = self.part_count(),
            bodies = self.body_count(),
            faces = self.face_count(),
            edges = self.edge_count(),
            vertices = self.vertex_count(),
            loops = self.loop_count(),
            shells = self.shell_count(),
            failures = report.failures.len(),
            "Built BRep store"
        );
        report
    }

    /// Dispatches one record to the populator of its kind.
    pub(crate) fn add_entity(&mut self, index: usize, record: &BrepEntity) -> Result<()> {
        match &record.entity {
            Some(Entity::Assembly(a)) => self.add_assembly(a),
            Some(Entity::Part(p)) => self.add_part(p),
            Some(Entity::Body(b)) => self.add_body(index, b)?,
            Some(Entity::Face(f)) => self.add_face(index, f)?,
            Some(Entity::Edge(e)) => self.add_edge(e),
            Some(Entity::Vertex(v)) => self.add_vertex(v),
            None => return Err(Error::UnrecognizedRecordKind { index }),
        }
        Ok(())
    }

    pub(crate) fn add_assembly(&mut self, assembly: &proto::Assembly) {
        let data = AssemblyData {
            parts: handles(&assembly.parts),
            source: assembly.source.clone(),
        };
        self.assemblies.insert(AssemblyHandle::new(assembly.id), data);
    }

    pub(crate) fn add_part(&mut self, part: &proto::Part) {
        let data = PartData {
            bodies: handles(&part.bodies),
        };
        self.parts.insert(PartHandle::new(part.id), data);
    }

    pub(crate) fn add_body(&mut self, index: usize, body: &proto::Body) -> Result<()> {
        let shells: Vec<ShellHandle> = self.generate_handles(index, body.shells.len())?;

        let h = BodyHandle::new(body.id);
        if let Some(previous) = self.bodies.remove(&h) {
            for shell in previous.shells {
                self.shells.remove(&shell);
            }
        }

        for (&sh, shell) in shells.iter().zip(&body.shells) {
            self.shells.insert(
                sh,
                ShellData {
                    faces: handles(&shell.faces),
                },
            );
        }

        let data = BodyData {
            faces: handles(&body.faces),
            shells,
            ..Default::default()
        };
        self.bodies.insert(h, data);
        Ok(())
    }

    pub(crate) fn add_face(&mut self, index: usize, face: &proto::Face) -> Result<()> {
        let loops: Vec<LoopHandle> = self.generate_handles(index, face.loops.len())?;

        let h = FaceHandle::new(face.id);
        if let Some(previous) = self.faces.remove(&h) {
            for lp in previous.loops {
                self.loops.remove(&lp);
            }
        }

        let mut data = FaceData {
            edges: handles(&face.edges),
            ..Default::default()
        };
        // A face without a surface still gets empty ranges at the column ends.
        let empty = proto::Surface::default();
        let surface = face.surface.as_ref().unwrap_or(&empty);
        data.points = self
            .geometry
            .extend_points(surface.points.iter().map(Point3::from));
        data.triangles = self
            .geometry
            .extend_triangles(surface.triangles.iter().map(|t| [t.i, t.j, t.k]));
        data.normals = self
            .geometry
            .extend_normals(surface.normals.iter().map(Point3::from));
        data.parameters = self
            .geometry
            .extend_face_params(surface.parameters.iter().map(Point2::from));

        for (&lh, lp) in loops.iter().zip(&face.loops) {
            self.loops.insert(
                lh,
                LoopData {
                    edges: handles(&lp.edges),
                },
            );
        }
        data.loops = loops;

        self.faces.insert(h, data);
        Ok(())
    }

    pub(crate) fn add_edge(&mut self, edge: &proto::Edge) {
        let empty = proto::Curve::default();
        let curve = edge.curve.as_ref().unwrap_or(&empty);
        let data = EdgeData {
            start: VertexHandle::from_reference(edge.start),
            end: VertexHandle::from_reference(edge.end),
            faces: Vec::new(),
            points: self
                .geometry
                .extend_points(curve.points.iter().map(Point3::from)),
            parameters: self
                .geometry
                .extend_edge_params(curve.parameters.iter().copied()),
        };
        self.edges.insert(EdgeHandle::new(edge.id), data);
    }

    pub(crate) fn add_vertex(&mut self, vertex: &proto::Vertex) {
        let point = vertex.point.as_ref().map(|p| {
            let (range, rows) = self.geometry.append_points(1);
            rows[0] = Point3::from(p);
            range.start
        });
        self.vertices.insert(
            VertexHandle::new(vertex.id),
            VertexData {
                point,
                edges: Vec::new(),
            },
        );
    }

    /// Takes the next `n` values of the generated loop/shell counter.
    ///
    /// Either all `n` handles are handed out or none are, so a record that
    /// runs past `i64::MAX` fails without touching the store.
    pub(crate) fn generate_handles<K: EntityKind>(
        &mut self,
        index: usize,
        n: usize,
    ) -> Result<Vec<Handle<K>>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let exhausted = || Error::GeneratedIdsExhausted { index };
        let start = self.next_generated_id.ok_or_else(exhausted)?;
        let last = i64::try_from(n - 1)
            .ok()
            .and_then(|extra| start.checked_add(extra))
            .ok_or_else(exhausted)?;
        self.next_generated_id = last.checked_add(1);
        Ok((start..=last).map(Handle::new).collect())
    }
}
