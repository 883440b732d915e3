use std::collections::HashMap;

use crate::{
    mesh::{Cell, Mesh},
    misc::{centroid, lerp, FloatingPoint},
};

/// Split every cell into quads by connecting its edge midpoints to its centroid.
///
/// Midpoints are appended first, edge by edge in ascending `(lower, higher)` point order,
/// followed by one centroid per cell. Input points keep their indices.
pub fn split_to_quads<T: FloatingPoint>(mesh: &Mesh<T>) -> Mesh<T> {
    let mut points = mesh.points().to_vec();
    let half = T::from_f64(0.5).unwrap();

    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
    for (p, neighbors) in mesh.point_neighbors().iter().enumerate() {
        for &q in neighbors.iter().filter(|q| **q > p) {
            let mid = lerp(&points[p], &points[q], half);
            midpoints.insert((p, q), points.len());
            points.push(mid);
        }
    }
    let midpoint = |a: usize, b: usize| midpoints[&(a.min(b), a.max(b))];

    let mut cells = Vec::with_capacity(mesh.num_cells() * 4);
    for cell in mesh.cells() {
        let vertices = cell.vertices();
        let center = points.len();
        points.push(centroid(vertices.iter().map(|v| &mesh.points()[*v])));

        let n = vertices.len();
        let quads = (0..n).map(|i| {
            let current = vertices[i];
            let next = vertices[(i + 1) % n];
            let prev = vertices[(i + n - 1) % n];
            Cell::Quad([
                current,
                midpoint(current, next),
                center,
                midpoint(prev, current),
            ])
        });
        cells.extend(quads);
    }

    Mesh::new_unchecked(points, cells)
}
