// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Columnar geometry storage.
//!
//! All points, triangles and parameters of every entity live in a handful of
//! shared growable columns. An entity only remembers the [`GeometryRange`]
//! of rows it owns, so the columns can reallocate as they grow without
//! invalidating any entity record. Views handed out by the accessors borrow
//! the store and therefore cannot outlive the next mutation.

use nalgebra::{Point2, Point3};

/// A contiguous run of rows in one geometry column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeometryRange {
    pub start: usize,
    pub len: usize,
}

impl GeometryRange {
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last row.
    #[inline]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Triangle as three point indices, local to the owning face's point range.
pub type Triangle = [u32; 3];

/// Append-only point, triangle, normal and parameter columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryStore {
    points: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
    normals: Vec<Point3<f64>>,
    face_params: Vec<Point2<f64>>,
    edge_params: Vec<f64>,
}

/// Reserves `n` default rows at the end of `column` and returns the new
/// block together with a mutable view of it for the caller to fill.
fn reserve<T: Clone>(column: &mut Vec<T>, n: usize, fill: T) -> (GeometryRange, &mut [T]) {
    let start = column.len();
    column.resize(start + n, fill);
    (GeometryRange::new(start, n), &mut column[start..])
}

fn extend<T, I>(column: &mut Vec<T>, rows: I) -> GeometryRange
where
    I: IntoIterator<Item = T>,
{
    let start = column.len();
    column.extend(rows);
    GeometryRange::new(start, column.len() - start)
}

/// Clamped window; a range that falls outside the column yields an empty
/// slice rather than panicking.
#[inline]
fn window<T>(column: &[T], range: GeometryRange) -> &[T] {
    column.get(range.as_range()).unwrap_or(&[])
}

impl GeometryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every row in every column.
    pub fn clear(&mut self) {
        self.points.clear();
        self.triangles.clear();
        self.normals.clear();
        self.face_params.clear();
        self.edge_params.clear();
    }

    // --- Reservation ---

    /// Reserves `n` point rows (initialized to the origin) and returns the
    /// block to fill.
    pub fn append_points(&mut self, n: usize) -> (GeometryRange, &mut [Point3<f64>]) {
        reserve(&mut self.points, n, Point3::origin())
    }

    /// Reserves `n` triangle rows (initialized to `[0, 0, 0]`).
    pub fn append_triangles(&mut self, n: usize) -> (GeometryRange, &mut [Triangle]) {
        reserve(&mut self.triangles, n, [0; 3])
    }

    /// Reserves `n` normal rows (initialized to the origin).
    pub fn append_normals(&mut self, n: usize) -> (GeometryRange, &mut [Point3<f64>]) {
        reserve(&mut self.normals, n, Point3::origin())
    }

    /// Reserves `n` face (u, v) parameter rows.
    pub fn append_face_params(&mut self, n: usize) -> (GeometryRange, &mut [Point2<f64>]) {
        reserve(&mut self.face_params, n, Point2::origin())
    }

    /// Reserves `n` edge parameter rows.
    pub fn append_edge_params(&mut self, n: usize) -> (GeometryRange, &mut [f64]) {
        reserve(&mut self.edge_params, n, 0.0)
    }

    // --- Bulk append ---

    pub fn extend_points<I>(&mut self, rows: I) -> GeometryRange
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        extend(&mut self.points, rows)
    }

    pub fn extend_triangles<I>(&mut self, rows: I) -> GeometryRange
    where
        I: IntoIterator<Item = Triangle>,
    {
        extend(&mut self.triangles, rows)
    }

    pub fn extend_normals<I>(&mut self, rows: I) -> GeometryRange
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        extend(&mut self.normals, rows)
    }

    pub fn extend_face_params<I>(&mut self, rows: I) -> GeometryRange
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        extend(&mut self.face_params, rows)
    }

    pub fn extend_edge_params<I>(&mut self, rows: I) -> GeometryRange
    where
        I: IntoIterator<Item = f64>,
    {
        extend(&mut self.edge_params, rows)
    }

    // --- Views ---

    #[inline]
    pub fn points(&self, range: GeometryRange) -> &[Point3<f64>] {
        window(&self.points, range)
    }

    #[inline]
    pub fn triangles(&self, range: GeometryRange) -> &[Triangle] {
        window(&self.triangles, range)
    }

    #[inline]
    pub fn normals(&self, range: GeometryRange) -> &[Point3<f64>] {
        window(&self.normals, range)
    }

    #[inline]
    pub fn face_params(&self, range: GeometryRange) -> &[Point2<f64>] {
        window(&self.face_params, range)
    }

    #[inline]
    pub fn edge_params(&self, range: GeometryRange) -> &[f64] {
        window(&self.edge_params, range)
    }

    /// Single point by row index.
    #[inline]
    pub fn point(&self, index: usize) -> Option<&Point3<f64>> {
        self.points.get(index)
    }

    // --- Column sizes ---

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    pub fn face_param_count(&self) -> usize {
        self.face_params.len()
    }

    pub fn edge_param_count(&self) -> usize {
        self.edge_params.len()
    }

    /// Whole columns, for snapshots.
    pub(crate) fn columns(
        &self,
    ) -> (
        &[Point3<f64>],
        &[Triangle],
        &[Point3<f64>],
        &[Point2<f64>],
        &[f64],
    ) {
        (
            &self.points,
            &self.triangles,
            &self.normals,
            &self.face_params,
            &self.edge_params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_consecutive_blocks() {
        let mut store = GeometryStore::new();
        let (a, rows) = store.append_points(2);
        rows[0] = Point3::new(1.0, 2.0, 3.0);
        rows[1] = Point3::new(4.0, 5.0, 6.0);
        let (b, rows) = store.append_points(3);
        rows[2] = Point3::new(7.0, 8.0, 9.0);

        assert_eq!(a, GeometryRange::new(0, 2));
        assert_eq!(b, GeometryRange::new(2, 3));
        assert_eq!(store.point_count(), 5);
        assert_eq!(store.points(a)[1], Point3::new(4.0, 5.0, 6.0));
        assert_eq!(store.points(b)[2], Point3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn growth_keeps_earlier_ranges_valid() {
        let mut store = GeometryStore::new();
        let first = store.extend_points([Point3::new(1.0, 1.0, 1.0)]);
        for i in 0..1000 {
            store.extend_points([Point3::new(i as f64, 0.0, 0.0)]);
        }
        assert_eq!(store.points(first), &[Point3::new(1.0, 1.0, 1.0)]);
    }

    #[test]
    fn zero_sized_append_is_empty() {
        let mut store = GeometryStore::new();
        store.extend_edge_params([0.5, 1.0]);
        let (range, rows) = store.append_edge_params(0);
        assert!(rows.is_empty());
        assert!(range.is_empty());
        assert_eq!(range.start, 2);
        assert!(store.edge_params(range).is_empty());
    }

    #[test]
    fn out_of_bounds_view_is_empty() {
        let mut store = GeometryStore::new();
        store.extend_triangles([[0, 1, 2]]);
        assert!(store.triangles(GeometryRange::new(5, 3)).is_empty());
        assert!(store.triangles(GeometryRange::new(0, 2)).is_empty());
    }

    #[test]
    fn columns_are_independent() {
        let mut store = GeometryStore::new();
        let p = store.extend_points([Point3::origin(); 4]);
        let uv = store.extend_face_params([Point2::new(0.25, 0.75)]);
        let n = store.extend_normals([Point3::new(0.0, 0.0, 1.0)]);

        assert_eq!(p, GeometryRange::new(0, 4));
        assert_eq!(uv, GeometryRange::new(0, 1));
        assert_eq!(n, GeometryRange::new(0, 1));
        assert_eq!(store.face_params(uv)[0], Point2::new(0.25, 0.75));
    }

    #[test]
    fn clear_empties_all_columns() {
        let mut store = GeometryStore::new();
        store.extend_points([Point3::origin()]);
        store.extend_triangles([[0, 0, 0]]);
        store.extend_edge_params([1.0]);
        store.clear();
        assert_eq!(store, GeometryStore::default());
    }

    #[test]
    fn range_helpers() {
        let r = GeometryRange::new(3, 4);
        assert_eq!(r.end(), 7);
        assert_eq!(r.as_range(), 3..7);
        assert!(!r.is_empty());
    }
}
