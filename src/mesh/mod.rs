pub mod cell;
pub mod edge_statistics;

pub use cell::*;
pub use edge_statistics::*;

use itertools::Itertools;
use nalgebra::Point3;

use crate::{error::MeshingError, misc::FloatingPoint};

/// A 2D mesh made of triangles and quadrilaterals.
/// Points keep their z value through every transform, while algorithms work in the xy plane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh<T: FloatingPoint> {
    points: Vec<Point3<T>>,
    cells: Vec<Cell>,
}

impl<T: FloatingPoint> Mesh<T> {
    /// Create a mesh, checking that every index is valid and no cell repeats a vertex.
    /// ```
    /// use nalgebra::Point3;
    /// use quadro::prelude::{Cell, Mesh};
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 0., 0.),
    ///     Point3::new(0., 1., 0.),
    /// ];
    /// assert!(Mesh::try_new(points.clone(), vec![Cell::Triangle([0, 1, 2])]).is_ok());
    /// assert!(Mesh::try_new(points.clone(), vec![Cell::Triangle([0, 1, 3])]).is_err());
    /// assert!(Mesh::try_new(points, vec![Cell::Triangle([0, 1, 1])]).is_err());
    /// ```
    pub fn try_new(points: Vec<Point3<T>>, cells: Vec<Cell>) -> anyhow::Result<Self> {
        let n = points.len();
        for (i, cell) in cells.iter().enumerate() {
            let v = cell.vertices();
            if let Some(bad) = v.iter().find(|v| **v >= n) {
                anyhow::bail!(MeshingError::InvalidInput(format!(
                    "cell {} references point {} but the mesh has {} points",
                    i, bad, n
                )));
            }
            anyhow::ensure!(
                v.iter().all_unique(),
                MeshingError::InvalidInput(format!("cell {} repeats a vertex: {:?}", i, v))
            );
        }
        Ok(Self { points, cells })
    }

    /// Create a mesh from triangles given as index triplets.
    pub fn try_from_triangles(
        points: Vec<Point3<T>>,
        triangles: &[[usize; 3]],
    ) -> anyhow::Result<Self> {
        Self::try_new(points, triangles.iter().map(|t| Cell::Triangle(*t)).collect())
    }

    /// Trusted constructor for connectivity built inside the crate.
    pub(crate) fn new_unchecked(points: Vec<Point3<T>>, cells: Vec<Cell>) -> Self {
        Self { points, cells }
    }

    pub fn points(&self) -> &[Point3<T>] {
        &self.points
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_parts(self) -> (Vec<Point3<T>>, Vec<Cell>) {
        (self.points, self.cells)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.cells.iter().filter(|c| c.is_triangle()).count()
    }

    pub fn num_quads(&self) -> usize {
        self.cells.iter().filter(|c| c.is_quad()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.cells.is_empty()
    }

    /// Edge counts over the cells of the mesh.
    pub fn edge_statistics(&self) -> EdgeStatistics {
        EdgeStatistics::new(&self.cells)
    }

    /// Unique undirected edges sorted by (lower index, higher index).
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.edge_statistics()
            .count()
            .keys()
            .copied()
            .sorted()
            .collect_vec()
    }

    /// Cells adjacent to each point, in ascending cell order.
    pub fn point_cells(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![vec![]; self.points.len()];
        self.cells.iter().enumerate().for_each(|(i, cell)| {
            cell.vertices().iter().for_each(|v| adjacency[*v].push(i));
        });
        adjacency
    }

    /// Points sharing an edge with each point, in ascending order.
    pub fn point_neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency: Vec<Vec<usize>> = vec![vec![]; self.points.len()];
        self.cells.iter().for_each(|cell| {
            cell.edges().for_each(|(a, b)| {
                adjacency[a].push(b);
                adjacency[b].push(a);
            });
        });
        adjacency.iter_mut().for_each(|n| {
            n.sort_unstable();
            n.dedup();
        });
        adjacency
    }

    /// Number of points sharing an edge with each point.
    /// The count is negated for points on the mesh boundary.
    pub fn adjacent_point_counts(&self) -> Vec<i64> {
        let stats = self.edge_statistics();
        self.point_neighbors()
            .iter()
            .enumerate()
            .map(|(p, neighbors)| {
                let count = neighbors.len() as i64;
                if neighbors.iter().any(|n| stats.is_boundary(p, *n)) {
                    -count
                } else {
                    count
                }
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
