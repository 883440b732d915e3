use nalgebra::Point3;

use super::{Cell, Mesh};

/// Row-major grid of `nx * ny` points with the given spacing.
pub fn grid_points(nx: usize, ny: usize, spacing: f64) -> Vec<Point3<f64>> {
    (0..ny)
        .flat_map(|j| (0..nx).map(move |i| Point3::new(i as f64 * spacing, j as f64 * spacing, 0.)))
        .collect()
}

/// Each grid square split into (a, b, c) and (b, d, c),
/// a lower-left, b lower-right, c upper-left, d upper-right.
pub fn grid_triangles(nx: usize, ny: usize) -> Vec<[usize; 3]> {
    (0..ny - 1)
        .flat_map(|j| {
            (0..nx - 1).flat_map(move |i| {
                let a = j * nx + i;
                let b = a + 1;
                let c = a + nx;
                let d = c + 1;
                [[a, b, c], [b, d, c]]
            })
        })
        .collect()
}

pub fn triangle_grid(nx: usize, ny: usize, spacing: f64) -> Mesh<f64> {
    Mesh::new_unchecked(
        grid_points(nx, ny, spacing),
        grid_triangles(nx, ny).into_iter().map(Cell::Triangle).collect(),
    )
}

pub fn quad_grid(nx: usize, ny: usize, spacing: f64) -> Mesh<f64> {
    let cells = (0..ny - 1)
        .flat_map(|j| {
            (0..nx - 1).map(move |i| {
                let a = j * nx + i;
                Cell::Quad([a, a + 1, a + nx + 1, a + nx])
            })
        })
        .collect();
    Mesh::new_unchecked(grid_points(nx, ny, spacing), cells)
}
