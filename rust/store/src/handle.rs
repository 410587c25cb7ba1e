// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed entity handles.
//!
//! A [`Handle`] is an integer identifier tagged with the entity kind it
//! refers to. The kind lives in the type, so an `EdgeHandle` and a
//! `FaceHandle` with the same numeric value never compare equal and cannot
//! be passed for one another without an explicit [`Handle::cast`].
//!
//! Assembly, part, body, face, edge and vertex handles come from the input
//! stream. Loop and shell handles are generated during ingestion.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker trait implemented by the zero-sized entity kind tags in [`kind`].
pub trait EntityKind: 'static {
    /// Kind of entity this tag stands for.
    const TYPE: EntityType;
}

/// Zero-sized kind tags used as the `K` parameter of [`Handle`].
pub mod kind {
    use super::{EntityKind, EntityType};

    macro_rules! entity_kinds {
        ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
            $(
                $(#[$doc])*
                #[derive(Debug)]
                pub enum $name {}

                impl EntityKind for $name {
                    const TYPE: EntityType = EntityType::$name;
                }
            )*
        };
    }

    entity_kinds! {
        /// Top-level grouping of parts.
        Assembly,
        /// Grouping of bodies.
        Part,
        /// A solid or sheet made of faces.
        Body,
        /// A triangulated surface patch.
        Face,
        /// A sampled curve bounding faces.
        Edge,
        /// A single point where edges meet.
        Vertex,
        /// One closed cycle of edges bounding a face.
        Loop,
        /// A connected group of faces within a body.
        Shell,
    }
}

/// Integer identifier of one entity of kind `K`.
///
/// The value `-1` is the invalid sentinel and is what [`Handle::default`]
/// produces.
pub struct Handle<K: EntityKind> {
    value: i64,
    _kind: PhantomData<fn() -> K>,
}

pub type AssemblyHandle = Handle<kind::Assembly>;
pub type PartHandle = Handle<kind::Part>;
pub type BodyHandle = Handle<kind::Body>;
pub type FaceHandle = Handle<kind::Face>;
pub type EdgeHandle = Handle<kind::Edge>;
pub type VertexHandle = Handle<kind::Vertex>;
pub type LoopHandle = Handle<kind::Loop>;
pub type ShellHandle = Handle<kind::Shell>;

impl<K: EntityKind> Handle<K> {
    /// Numeric value of the invalid handle.
    pub const INVALID_VALUE: i64 = -1;

    /// Wraps a raw identifier.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    /// The invalid (empty) handle.
    #[inline]
    pub const fn invalid() -> Self {
        Self::new(Self::INVALID_VALUE)
    }

    /// Wraps an optional wire reference. Absent and negative values map to
    /// the invalid handle rather than to handle 0.
    #[inline]
    pub fn from_reference(value: Option<i64>) -> Self {
        match value {
            Some(v) if v >= 0 => Self::new(v),
            _ => Self::invalid(),
        }
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.value != Self::INVALID_VALUE
    }

    /// Raw identifier.
    #[inline]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Resets this handle to the invalid sentinel.
    #[inline]
    pub fn invalidate(&mut self) {
        self.value = Self::INVALID_VALUE;
    }

    /// Re-wraps the same identifier as a handle of another kind.
    #[inline]
    pub const fn cast<T: EntityKind>(self) -> Handle<T> {
        Handle::new(self.value)
    }

    /// Kind of entity this handle refers to.
    #[inline]
    pub const fn entity_type(&self) -> EntityType {
        K::TYPE
    }
}

impl<K: EntityKind> Default for Handle<K> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<K: EntityKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: EntityKind> Copy for Handle<K> {}

impl<K: EntityKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K: EntityKind> Eq for Handle<K> {}

impl<K: EntityKind> PartialOrd for Handle<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: EntityKind> Ord for Handle<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<K: EntityKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K: EntityKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", K::TYPE, self.value)
    }
}

impl<K: EntityKind> fmt::Display for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Discriminant for entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Assembly = 0,
    Part = 1,
    Body = 2,
    Face = 3,
    Edge = 4,
    Vertex = 5,
    Loop = 6,
    Shell = 7,
}

impl EntityType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Assembly => "Assembly",
            EntityType::Part => "Part",
            EntityType::Body => "Body",
            EntityType::Face => "Face",
            EntityType::Edge => "Edge",
            EntityType::Vertex => "Vertex",
            EntityType::Loop => "Loop",
            EntityType::Shell => "Shell",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handle to any one of the part, body, face, edge or vertex kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityHandle {
    Part(PartHandle),
    Body(BodyHandle),
    Face(FaceHandle),
    Edge(EdgeHandle),
    Vertex(VertexHandle),
}

impl EntityHandle {
    /// Returns the kind of entity referenced.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityHandle::Part(_) => EntityType::Part,
            EntityHandle::Body(_) => EntityType::Body,
            EntityHandle::Face(_) => EntityType::Face,
            EntityHandle::Edge(_) => EntityType::Edge,
            EntityHandle::Vertex(_) => EntityType::Vertex,
        }
    }

    /// Raw identifier, whatever the kind.
    pub fn value(&self) -> i64 {
        match self {
            EntityHandle::Part(h) => h.value(),
            EntityHandle::Body(h) => h.value(),
            EntityHandle::Face(h) => h.value(),
            EntityHandle::Edge(h) => h.value(),
            EntityHandle::Vertex(h) => h.value(),
        }
    }
}

impl From<PartHandle> for EntityHandle {
    fn from(h: PartHandle) -> Self {
        EntityHandle::Part(h)
    }
}

impl From<BodyHandle> for EntityHandle {
    fn from(h: BodyHandle) -> Self {
        EntityHandle::Body(h)
    }
}

impl From<FaceHandle> for EntityHandle {
    fn from(h: FaceHandle) -> Self {
        EntityHandle::Face(h)
    }
}

impl From<EdgeHandle> for EntityHandle {
    fn from(h: EdgeHandle) -> Self {
        EntityHandle::Edge(h)
    }
}

impl From<VertexHandle> for EntityHandle {
    fn from(h: VertexHandle) -> Self {
        EntityHandle::Vertex(h)
    }
}
