// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes with per-kind memoization.
//!
//! Faces and edges are bounded by their own point samples. Bodies, parts and
//! assemblies are bounded by the union of their children's boxes, so a query
//! on an assembly recursively fills the caches of everything below it.
//!
//! The caches are the one piece of the store that changes after a build.
//! Each kind has its own `RwLock`ed map: hits only take the read lock, a
//! miss computes without any lock held and then inserts under the write
//! lock. Two threads racing on the same handle compute identical boxes, so
//! whichever insert lands last is correct. Entries are dropped only by
//! [`BrepStore::reset`].

use std::fmt;
use std::sync::{PoisonError, RwLock};

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::handle::{kind, EntityKind, Handle};
use crate::store::BrepStore;

/// An axis-aligned bounding box.
///
/// The empty box has `min = +inf` and `max = -inf` on every axis, so that
/// extending it by any point yields a box around exactly that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// The empty box.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; empty for no points.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        points.iter().fold(Self::empty(), |mut acc, p| {
            acc.extend_point(p);
            acc
        })
    }

    /// Returns `true` if the box contains no point at all.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend_point(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Grows this box to also contain `other`. Merging an empty box is a
    /// no-op.
    pub fn extend(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.extend_point(&other.min);
        self.extend_point(&other.max);
    }

    /// Union of two boxes.
    pub fn union(mut self, other: &Aabb) -> Aabb {
        self.extend(other);
        self
    }

    /// Center point, `None` for the empty box.
    pub fn center(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        Some(Point3::from((self.min.coords + self.max.coords) * 0.5))
    }

    /// Edge lengths along each axis; zero for the empty box.
    pub fn extent(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Enclosed volume; zero for the empty box.
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }
}

/// Memoized boxes for one entity kind.
pub struct KindCache<K: EntityKind> {
    entries: RwLock<FxHashMap<Handle<K>, Aabb>>,
}

impl<K: EntityKind> Default for KindCache<K> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<K: EntityKind> fmt::Debug for KindCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindCache")
            .field("kind", &K::TYPE)
            .field("len", &self.len())
            .finish()
    }
}

impl<K: EntityKind> KindCache<K> {
    pub fn get(&self, h: Handle<K>) -> Option<Aabb> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&h)
            .copied()
    }

    pub fn insert(&self, h: Handle<K>, bbox: Aabb) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(h, bbox);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// One [`KindCache`] per boundable kind.
#[derive(Debug, Default)]
pub struct BoundsCache {
    assemblies: KindCache<kind::Assembly>,
    parts: KindCache<kind::Part>,
    bodies: KindCache<kind::Body>,
    faces: KindCache<kind::Face>,
    edges: KindCache<kind::Edge>,
}

impl BoundsCache {
    pub fn clear(&mut self) {
        self.assemblies.clear();
        self.parts.clear();
        self.bodies.clear();
        self.faces.clear();
        self.edges.clear();
    }

    /// Total number of memoized boxes across all kinds.
    pub fn len(&self) -> usize {
        self.assemblies.len()
            + self.parts.len()
            + self.bodies.len()
            + self.faces.len()
            + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::kind::Assembly {}
    impl Sealed for super::kind::Part {}
    impl Sealed for super::kind::Body {}
    impl Sealed for super::kind::Face {}
    impl Sealed for super::kind::Edge {}
}

/// Entity kinds that [`BrepStore::bounding_box`] accepts.
pub trait BoundedKind: EntityKind + Sized + sealed::Sealed {
    /// The memo table for this kind.
    fn cache(cache: &BoundsCache) -> &KindCache<Self>;

    /// Computes the box of an existing entity, `None` if it is unknown.
    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb>;
}

/// Union of the boxes of `children`.
fn union_of<K: BoundedKind>(store: &BrepStore, children: &[Handle<K>]) -> Aabb {
    children
        .iter()
        .fold(Aabb::empty(), |acc, &child| acc.union(&store.bounding_box(child)))
}

impl BoundedKind for kind::Assembly {
    fn cache(cache: &BoundsCache) -> &KindCache<Self> {
        &cache.assemblies
    }

    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb> {
        let data = store.assemblies.get(&h)?;
        Some(union_of(store, &data.parts))
    }
}

impl BoundedKind for kind::Part {
    fn cache(cache: &BoundsCache) -> &KindCache<Self> {
        &cache.parts
    }

    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb> {
        let data = store.parts.get(&h)?;
        Some(union_of(store, &data.bodies))
    }
}

impl BoundedKind for kind::Body {
    fn cache(cache: &BoundsCache) -> &KindCache<Self> {
        &cache.bodies
    }

    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb> {
        let data = store.bodies.get(&h)?;
        Some(union_of(store, &data.faces))
    }
}

impl BoundedKind for kind::Face {
    fn cache(cache: &BoundsCache) -> &KindCache<Self> {
        &cache.faces
    }

    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb> {
        let data = store.faces.get(&h)?;
        Some(Aabb::from_points(store.geometry.points(data.points)))
    }
}

impl BoundedKind for kind::Edge {
    fn cache(cache: &BoundsCache) -> &KindCache<Self> {
        &cache.edges
    }

    fn compute(store: &BrepStore, h: Handle<Self>) -> Option<Aabb> {
        let data = store.edges.get(&h)?;
        Some(Aabb::from_points(store.geometry.points(data.points)))
    }
}

impl BrepStore {
    /// Bounding box of an assembly, part, body, face or edge.
    ///
    /// Unknown handles and entities without geometry yield [`Aabb::empty`].
    /// Results for existing entities are memoized until the next reset.
    pub fn bounding_box<K: BoundedKind>(&self, h: Handle<K>) -> Aabb {
        let cache = K::cache(&self.bounds_cache);
        if let Some(bbox) = cache.get(h) {
            return bbox;
        }
        match K::compute(self, h) {
            Some(bbox) => {
                cache.insert(h, bbox);
                bbox
            }
            None => Aabb::empty(),
        }
    }

    /// Number of memoized bounding boxes.
    pub fn cached_bounds_count(&self) -> usize {
        self.bounds_cache.len()
    }
}
