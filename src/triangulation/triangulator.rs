use nalgebra::Point3;

use crate::{
    mesh::Mesh,
    misc::{FloatingPoint, PolygonBoundary},
};

/// A constrained triangulator consumed by the meshing pipeline.
pub trait Triangulator<T: FloatingPoint> {
    /// Triangulate `points` so that every constraint `[a, b]` becomes a mesh edge.
    ///
    /// Triangles outside the closed constraint loops and triangles whose centroid lies in one of
    /// `holes` are dropped. Points left without a triangle are removed, so the returned mesh may
    /// have fewer points than the input (or more, when Steiner points are added).
    fn triangulate(
        &self,
        points: &[Point3<T>],
        constraints: &[[usize; 2]],
        holes: &[PolygonBoundary<T>],
    ) -> anyhow::Result<Mesh<T>>;
}
