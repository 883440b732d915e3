use itertools::Itertools;

/// A mesh face: a triangle or a quadrilateral given by point indices,
/// counter-clockwise by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl Cell {
    /// Build a cell from 3 or 4 indices.
    pub fn from_slice(indices: &[usize]) -> Option<Self> {
        match *indices {
            [a, b, c] => Some(Cell::Triangle([a, b, c])),
            [a, b, c, d] => Some(Cell::Quad([a, b, c, d])),
            _ => None,
        }
    }

    /// Build a cell from a ring of corners where neighboring corners may coincide,
    /// as left behind when points are merged. Repeats are collapsed.
    /// Returns `None` when fewer than three distinct corners remain or a corner comes back later in the ring.
    pub fn from_ring(vertices: impl IntoIterator<Item = usize>) -> Option<Self> {
        let mut corners = vertices.into_iter().collect_vec();
        corners.dedup();
        while corners.len() > 1 && corners.first() == corners.last() {
            corners.pop();
        }
        if !corners.iter().all_unique() {
            return None;
        }
        Self::from_slice(&corners)
    }

    pub fn vertices(&self) -> &[usize] {
        match self {
            Cell::Triangle(v) => v,
            Cell::Quad(v) => v,
        }
    }

    pub fn vertices_mut(&mut self) -> &mut [usize] {
        match self {
            Cell::Triangle(v) => v,
            Cell::Quad(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices().len()
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self, Cell::Triangle(_))
    }

    pub fn is_quad(&self) -> bool {
        matches!(self, Cell::Quad(_))
    }

    /// Position of a point in this cell.
    pub fn position(&self, point: usize) -> Option<usize> {
        self.vertices().iter().position(|v| *v == point)
    }

    /// Directed edges of the cell boundary, `(v[i], v[i + 1])`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let v = self.vertices();
        (0..v.len()).map(move |i| (v[i], v[(i + 1) % v.len()]))
    }

    /// Apply a point index mapping to every vertex.
    pub fn map(&self, f: impl Fn(usize) -> usize) -> Self {
        match self {
            Cell::Triangle([a, b, c]) => Cell::Triangle([f(*a), f(*b), f(*c)]),
            Cell::Quad([a, b, c, d]) => Cell::Quad([f(*a), f(*b), f(*c), f(*d)]),
        }
    }
}
