use std::collections::HashMap;

use super::Cell;

/// Statistics of edges in a mesh
/// HashMap<(usize, usize), usize> -> ((lower index, higher index), count of adjacent cells)
#[derive(Debug, Clone, Default)]
pub struct EdgeStatistics(HashMap<(usize, usize), usize>);

impl EdgeStatistics {
    /// Count occurrences of each undirected edge over the cells
    pub fn new(cells: &[Cell]) -> Self {
        let mut edge_count: HashMap<(usize, usize), usize> = Default::default();
        for cell in cells {
            for (a, b) in cell.edges() {
                *edge_count.entry(key(a, b)).or_insert(0) += 1;
            }
        }
        Self(edge_count)
    }

    /// Get the count of edges
    pub fn count(&self) -> &HashMap<(usize, usize), usize> {
        &self.0
    }

    /// Number of cells sharing the undirected edge (a, b).
    pub fn cells_on_edge(&self, a: usize, b: usize) -> usize {
        self.0.get(&key(a, b)).copied().unwrap_or(0)
    }

    /// An edge used by a single cell lies on the mesh boundary.
    pub fn is_boundary(&self, a: usize, b: usize) -> bool {
        self.cells_on_edge(a, b) == 1
    }

    /// Number of unique edges.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
