use std::collections::HashMap;

use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    mesh::{Cell, Mesh},
    misc::{distance_squared_xy, FloatingPoint},
};

/// Diagonal ratio below which a quad is considered degenerate.
pub const DEFAULT_MAX_ASPECT: f64 = 0.7;

/// Collapse state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellState {
    Unset,
    /// a triangle, never collapsed itself
    NotQuad,
    /// already collapsed, or next to a collapse
    Frozen,
    /// number of valence-3 corners, and the corner that may collapse
    Candidate { threes: usize, point: Option<usize> },
}

/// Removes badly shaped quads by collapsing them onto one of their diagonals.
///
/// A quad is collapsed when
/// - it has an interior corner shared by only two cells, or
/// - it has two opposite corners with three neighbours each and its diagonals are too uneven.
///
/// Quads with a single valence-3 corner are collapsed afterwards when none of their neighbours
/// has been touched.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let points = vec![
///     Point3::new(-10., 0., 0.),
///     Point3::new(10., 0., 0.),
///     Point3::new(0., 10., 0.),
///     Point3::new(0., 20., 0.),
/// ];
/// let mesh = Mesh::try_new(points, vec![Cell::Quad([0, 2, 1, 3]), Cell::Triangle([0, 1, 2])]).unwrap();
/// let cleaned = BadQuadRemover::new(&mesh).remove_bad_quads(0.7).unwrap();
/// assert_eq!(cleaned.cells(), &[Cell::Triangle([0, 1, 2])]);
/// assert_eq!(cleaned.num_points(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct BadQuadRemover<'a, T: FloatingPoint> {
    mesh: &'a Mesh<T>,
    adjacent_counts: Vec<i64>,
    point_cells: Vec<Vec<usize>>,
    edge_cells: HashMap<(usize, usize), Vec<usize>>,
}

impl<'a, T: FloatingPoint> BadQuadRemover<'a, T> {
    pub fn new(mesh: &'a Mesh<T>) -> Self {
        let mut edge_cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        mesh.cells().iter().enumerate().for_each(|(i, cell)| {
            cell.edges().for_each(|(a, b)| {
                edge_cells.entry((a.min(b), a.max(b))).or_default().push(i);
            });
        });
        Self {
            mesh,
            adjacent_counts: mesh.adjacent_point_counts(),
            point_cells: mesh.point_cells(),
            edge_cells,
        }
    }

    /// Collapse bad quads and return the rebuilt mesh.
    /// `max_aspect` bounds the ratio of the short diagonal to the long one; zero disables the check.
    pub fn remove_bad_quads(&self, max_aspect: T) -> anyhow::Result<Mesh<T>> {
        anyhow::ensure!(
            max_aspect >= T::zero(),
            MeshingError::invalid_parameter("max_aspect", max_aspect, "must not be negative")
        );

        let mut state = CollapseState::new(self.mesh);
        let max_aspect = max_aspect * max_aspect;

        for cell in 0..self.mesh.num_cells() {
            if state.cells[cell] == CellState::Unset {
                self.compute_cell_state(&mut state, cell, max_aspect);
            }
        }

        loop {
            let mut collapsed = 0;
            for cell in 0..self.mesh.num_cells() {
                if state.deleted[cell] {
                    continue;
                }
                if let CellState::Candidate {
                    threes: 1,
                    point: Some(point),
                } = state.cells[cell]
                {
                    if self.can_collapse(&state, cell, point) {
                        if self.collapse_from_point(&mut state, cell, point) {
                            collapsed += 1;
                        } else {
                            state.cells[cell] = CellState::Frozen;
                        }
                    }
                }
            }
            if collapsed == 0 {
                break;
            }
        }

        let mesh = state.build(self.mesh)?;

        #[cfg(feature = "log")]
        log::debug!(
            "bad quad removal: {} cells -> {} cells",
            self.mesh.num_cells(),
            mesh.num_cells()
        );

        Ok(mesh)
    }

    /// The cell across edge `i` of `cell`.
    fn edge_adjacent_cell(&self, cell: usize, i: usize) -> Option<usize> {
        let v = self.mesh.cells()[cell].vertices();
        let (a, b) = (v[i], v[(i + 1) % v.len()]);
        self.edge_cells
            .get(&(a.min(b), a.max(b)))
            .and_then(|cells| cells.iter().find(|c| **c != cell).copied())
    }

    fn compute_cell_state(&self, state: &mut CollapseState<T>, cell: usize, max_aspect: T) {
        let points = self.mesh.points();
        let Cell::Quad(v) = self.mesh.cells()[cell] else {
            state.cells[cell] = CellState::NotQuad;
            return;
        };

        let mut aspect_ok = [true; 4];
        let mut diagonals = [T::zero(); 2];
        if max_aspect > T::zero() {
            let d0 = distance_squared_xy(&points[v[0]], &points[v[2]]);
            let d1 = distance_squared_xy(&points[v[1]], &points[v[3]]);
            diagonals = [d0, d1];
            let even = d0 / d1 <= max_aspect;
            let odd = d1 / d0 <= max_aspect;
            aspect_ok = [even, odd, even, odd];
        }

        let mut corners = [false; 4];
        let mut threes = 0;
        let mut point_w3 = None;
        for i in 0..4 {
            let point = v[i];
            let count = self.adjacent_counts[point];
            let on_boundary = count < 0;
            let count = count.abs();

            if count == 2 && !on_boundary {
                let opposing = v[(i + 2) % 4];
                if let Some(adjacent) = self.edge_adjacent_cell(cell, i) {
                    match self.mesh.cells()[adjacent] {
                        Cell::Triangle(_) => {
                            if state.replace_point(opposing, point) {
                                state.move_point(point, points[opposing]);
                                state.deleted[cell] = true;
                            }
                            state.cells[cell] = CellState::Frozen;
                            state.cells[adjacent] = CellState::Frozen;
                            return;
                        }
                        Cell::Quad(adjacent_vertices) => {
                            // diagonal left once both shared edges are gone
                            let position = adjacent_vertices
                                .iter()
                                .position(|p| *p == point)
                                .unwrap_or(0);
                            let adjacent_opposing = adjacent_vertices[(position + 2) % 4];
                            let d0 =
                                distance_squared_xy(&points[adjacent_opposing], &points[opposing]);
                            let d1 = diagonals[(i + 1) & 1];
                            if d0 / d1 < T::one() {
                                if state.replace_point(point, opposing) {
                                    state.deleted[cell] = true;
                                    state.cells[adjacent] = CellState::Frozen;
                                    state.cells[cell] = CellState::Frozen;
                                }
                                return;
                            }
                        }
                    }
                }
            }

            if count == 2 && on_boundary {
                threes += 1;
                corners[i] = aspect_ok[i];
            }

            if count == 3 && !on_boundary {
                threes += 1;
                if aspect_ok[i] {
                    corners[i] = true;
                    point_w3 = Some(point);
                }
            }
        }

        let opposite = corners == [true, false, true, false] || corners == [false, true, false, true];
        if let Some(point) = point_w3 {
            if threes == 2 && opposite {
                self.collapse_from_point(state, cell, point);
                return;
            }
        }

        state.cells[cell] = CellState::Candidate {
            threes,
            point: point_w3,
        };
    }

    /// A single valence-3 corner may collapse when every other cell around it is untouched
    /// and has at most one valence-3 corner.
    fn can_collapse(&self, state: &CollapseState<T>, cell: usize, point: usize) -> bool {
        if self.adjacent_counts[point] < 0 {
            return false;
        }
        self.point_cells[point]
            .iter()
            .filter(|c| **c != cell)
            .all(|c| matches!(state.cells[*c], CellState::Candidate { threes, .. } if threes <= 1))
    }

    /// Merge `point` into the opposite corner of the quad and delete the quad.
    /// Returns false when either point has already been merged.
    fn collapse_from_point(&self, state: &mut CollapseState<T>, cell: usize, point: usize) -> bool {
        let vertices = self.mesh.cells()[cell].vertices();
        let Some(position) = vertices.iter().position(|v| *v == point) else {
            return false;
        };
        let diagonal = vertices[(position + 2) % vertices.len()];
        if !state.replace_point(point, diagonal) {
            return false;
        }

        let diagonal_count = self.adjacent_counts[diagonal];
        let point_count = self.adjacent_counts[point];
        if diagonal_count > 0 {
            let points = self.mesh.points();
            let sum = T::from_i64(diagonal_count + point_count).unwrap();
            let w_point = T::from_i64(point_count).unwrap() / sum;
            let w_diagonal = T::from_i64(diagonal_count).unwrap() / sum;
            let moved = Point3::from(
                points[diagonal].coords * w_diagonal + points[point].coords * w_point,
            );
            state.move_point(diagonal, moved);
        }
        state.deleted[cell] = true;
        for adjacent in self.point_cells[point].iter() {
            state.cells[*adjacent] = CellState::Frozen;
        }
        true
    }
}

/// Recorded edits, applied when the mesh is rebuilt.
#[derive(Debug, Clone)]
struct CollapseState<T: FloatingPoint> {
    cells: Vec<CellState>,
    deleted: Vec<bool>,
    replaced: Vec<Option<usize>>,
    moved: Vec<(usize, Point3<T>)>,
}

impl<T: FloatingPoint> CollapseState<T> {
    fn new(mesh: &Mesh<T>) -> Self {
        Self {
            cells: vec![CellState::Unset; mesh.num_cells()],
            deleted: vec![false; mesh.num_cells()],
            replaced: vec![None; mesh.num_points()],
            moved: vec![],
        }
    }

    /// Redirect `point` to `target`, unless either has been redirected already.
    fn replace_point(&mut self, point: usize, target: usize) -> bool {
        if self.replaced[point].is_none() && self.replaced[target].is_none() {
            self.replaced[point] = Some(target);
            true
        } else {
            false
        }
    }

    fn move_point(&mut self, point: usize, location: Point3<T>) {
        self.moved.push((point, location));
    }

    /// The point that `point` ends up as, following chained replacements.
    fn survivor(&self, point: usize) -> usize {
        let mut current = point;
        // chains cannot loop, the bound only guards against a broken state
        for _ in 0..self.replaced.len() {
            match self.replaced[current] {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Drop deleted cells and redirected points, renumbering the survivors densely.
    /// Cells that lose corners to a collapse shrink to triangles, or vanish when nothing is left.
    fn build(&self, mesh: &Mesh<T>) -> anyhow::Result<Mesh<T>> {
        let mut locations = mesh.points().to_vec();
        for (point, location) in self.moved.iter() {
            locations[*point] = *location;
        }

        let mut lookup = vec![0; locations.len()];
        let mut points = Vec::with_capacity(locations.len());
        for (i, location) in locations.iter().enumerate() {
            if self.replaced[i].is_none() {
                lookup[i] = points.len();
                points.push(*location);
            }
        }
        for i in 0..self.replaced.len() {
            if self.replaced[i].is_some() {
                lookup[i] = lookup[self.survivor(i)];
            }
        }

        let cells = mesh
            .cells()
            .iter()
            .zip(self.deleted.iter())
            .filter(|(_, deleted)| !**deleted)
            .filter_map(|(cell, _)| Cell::from_ring(cell.vertices().iter().map(|v| lookup[*v])))
            .collect_vec();

        Mesh::try_new(points, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::quad_grid;
    use approx::assert_relative_eq;

    fn mesh(points: &[[f64; 2]], faces: &[&[usize]]) -> Mesh<f64> {
        Mesh::try_new(
            points.iter().map(|p| Point3::new(p[0], p[1], 0.)).collect(),
            faces.iter().filter_map(|f| Cell::from_slice(f)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_regular_grid_untouched() {
        let grid = quad_grid(4, 4, 10.);
        let cleaned = BadQuadRemover::new(&grid).remove_bad_quads(0.7).unwrap();
        assert_eq!(cleaned, grid);
    }

    #[test]
    fn test_negative_aspect() {
        let grid = quad_grid(3, 3, 10.);
        assert!(BadQuadRemover::new(&grid).remove_bad_quads(-0.5).is_err());
    }

    /// replaced points are dropped and the survivors renumbered densely
    #[test]
    fn test_replace_points() {
        let input = mesh(
            &[
                [0., 0.],
                [10., 0.],
                [20., 0.],
                [30., 0.],
                [30., 20.],
                [0., 10.],
                [10., 10.],
                [15., 10.],
                [25., 10.],
                [30., 10.],
                [0., 20.],
                [10., 20.],
                [20., 20.],
                [5., 3.],
            ],
            &[
                &[0, 1, 6, 13],
                &[0, 13, 6, 5],
                &[1, 2, 7, 6],
                &[2, 3, 9, 8],
                &[5, 6, 11, 10],
                &[6, 7, 12, 11],
                &[2, 8, 12, 7],
                &[8, 9, 4, 12],
            ],
        );
        let mut state = CollapseState::new(&input);
        state.move_point(8, Point3::new(20., 10., 0.));
        assert!(state.replace_point(7, 8));
        state.deleted[6] = true;
        assert!(state.replace_point(13, 1));
        state.deleted[0] = true;
        assert!(!state.replace_point(13, 2));

        let output = state.build(&input).unwrap();
        let expected = [
            [0., 0.],
            [10., 0.],
            [20., 0.],
            [30., 0.],
            [30., 20.],
            [0., 10.],
            [10., 10.],
            [20., 10.],
            [30., 10.],
            [0., 20.],
            [10., 20.],
            [20., 20.],
        ];
        assert_eq!(output.num_points(), expected.len());
        output.points().iter().zip(expected).for_each(|(p, e)| {
            assert_relative_eq!(p.x, e[0]);
            assert_relative_eq!(p.y, e[1]);
        });
        assert_eq!(
            output.cells(),
            &[
                Cell::Quad([0, 1, 6, 5]),
                Cell::Quad([1, 2, 7, 6]),
                Cell::Quad([2, 3, 8, 7]),
                Cell::Quad([5, 6, 10, 9]),
                Cell::Quad([6, 7, 11, 10]),
                Cell::Quad([7, 8, 4, 11]),
            ]
        );
    }

    /// a quad folded over a triangle collapses into the triangle
    #[test]
    fn test_collapse_quad_triangle() {
        let input = mesh(
            &[[-10., 0.], [10., 0.], [0., 10.], [0., 20.]],
            &[&[0, 2, 1, 3], &[0, 1, 2]],
        );
        let output = BadQuadRemover::new(&input).remove_bad_quads(0.7).unwrap();
        assert_eq!(output.cells(), &[Cell::Triangle([0, 1, 2])]);
        let expected = [[-10., 0.], [10., 0.], [0., 20.]];
        output.points().iter().zip(expected).for_each(|(p, e)| {
            assert_relative_eq!(p.x, e[0]);
            assert_relative_eq!(p.y, e[1]);
        });
    }

    /// a point replaced by one that is itself replaced lands on the last one
    #[test]
    fn test_chained_replacement() {
        let input = mesh(
            &[[0., 0.], [10., 0.], [0., 10.], [10., 10.], [20., 0.]],
            &[&[0, 1, 2], &[1, 4, 3, 2]],
        );
        let mut state = CollapseState::new(&input);
        assert!(state.replace_point(1, 3));
        assert!(state.replace_point(3, 4));
        assert_eq!(state.survivor(1), 4);

        let output = state.build(&input).unwrap();
        assert_eq!(output.num_points(), 3);
        assert_relative_eq!(output.points()[2].x, 20.);
        assert_eq!(output.cells(), &[Cell::Triangle([0, 2, 1])]);
    }

    /// a quad losing one corner becomes a triangle
    #[test]
    fn test_collapsed_corner_shrinks_quad() {
        let input = mesh(
            &[[0., 0.], [10., 0.], [10., 10.], [0., 10.], [12., 5.]],
            &[&[0, 1, 2, 3], &[1, 4, 2]],
        );
        let mut state = CollapseState::new(&input);
        assert!(state.replace_point(4, 2));
        state.deleted[1] = true;

        let output = state.build(&input).unwrap();
        assert_eq!(output.num_points(), 4);
        assert_eq!(output.cells(), &[Cell::Quad([0, 1, 2, 3])]);

        let mut state = CollapseState::new(&input);
        assert!(state.replace_point(3, 2));
        let output = state.build(&input).unwrap();
        assert_eq!(
            output.cells(),
            &[Cell::Triangle([0, 1, 2]), Cell::Triangle([1, 3, 2])]
        );
    }

    /// two rows of quads with diamonds, pinched pairs, and quads that must survive
    #[test]
    fn test_collapse() {
        let mut points = vec![];
        for y in [20., 10., 0.] {
            for i in 0..10 {
                points.push([i as f64 * 10., y]);
            }
        }
        for (i, dx) in [
            (10, -3.),
            (11, -3.),
            (12, -3.),
            (13, -3.),
            (14, 3.),
            (15, 1.5),
            (17, -1.5),
            (18, -3.),
            (19, 5.),
        ] {
            points[i][0] += dx;
        }
        points.extend([
            [3., 10.],
            [33., 10.],
            [82., 10.],
            [90., 12.],
            [90., 8.],
            [15., 15.],
            [15., 5.],
            [100., 10.],
            [70., -10.],
            [80., -10.],
            [73., -3.],
            [76., -4.],
            [77., -7.],
            [74., -6.],
        ]);
        let faces: Vec<&[usize]> = vec![
            &[10, 20, 30, 0],
            &[30, 11, 1, 0],
            &[35, 12, 2, 1],
            &[11, 12, 35, 1],
            &[12, 13, 3, 2],
            &[31, 14, 4, 3],
            &[14, 15, 5, 4],
            &[15, 16, 6, 5],
            &[16, 17, 7, 6],
            &[17, 18, 8, 7],
            &[32, 33, 9, 8],
            &[20, 21, 11, 30],
            &[36, 22, 12, 11],
            &[21, 22, 36, 11],
            &[22, 23, 13, 12],
            &[13, 23, 31, 3],
            &[23, 24, 14, 31],
            &[24, 25, 15, 14],
            &[25, 26, 16, 15],
            &[26, 27, 17, 16],
            &[27, 28, 18, 17],
            &[18, 28, 32, 8],
            &[28, 29, 34, 32],
            &[34, 19, 33, 32],
            &[33, 19, 37, 9],
            &[34, 29, 37, 19],
            &[40, 41, 28, 27],
            &[41, 42, 39, 28],
            &[42, 43, 38, 39],
            &[38, 43, 40, 27],
            &[43, 42, 41, 40],
        ];
        let input = mesh(&points, &faces);
        let output = BadQuadRemover::new(&input).remove_bad_quads(0.7).unwrap();

        let expected_points = [
            [0., 20.],
            [10., 20.],
            [20., 20.],
            [30., 20.],
            [40., 20.],
            [50., 20.],
            [60., 20.],
            [70., 20.],
            [80., 20.],
            [90., 20.],
            [-3., 10.],
            [7., 10.],
            [17., 10.],
            [30., 10.],
            [43., 10.],
            [51.5, 10.],
            [60., 10.],
            [68.5, 10.],
            [95., 10.],
            [0., 0.],
            [10., 0.],
            [20., 0.],
            [30., 0.],
            [40., 0.],
            [50., 0.],
            [60., 0.],
            [70., 0.],
            [80., 0.],
            [90., 0.],
            [79.857142857, 10.],
            [90., 12.],
            [90., 8.],
            [15., 15.],
            [100., 10.],
            [70., -10.],
            [80., -10.],
            [73., -3.],
            [76., -4.],
            [77., -7.],
            [74., -6.],
        ];
        assert_eq!(output.num_points(), expected_points.len());
        output
            .points()
            .iter()
            .zip(expected_points)
            .for_each(|(p, e)| {
                assert_relative_eq!(p.x, e[0], epsilon = 1e-4);
                assert_relative_eq!(p.y, e[1], epsilon = 1e-4);
            });

        let expected_cells = [
            [10, 11, 1, 0],
            [32, 12, 2, 1],
            [11, 12, 32, 1],
            [12, 13, 3, 2],
            [13, 14, 4, 3],
            [14, 15, 5, 4],
            [15, 16, 6, 5],
            [16, 17, 7, 6],
            [17, 29, 8, 7],
            [29, 30, 9, 8],
            [19, 20, 11, 10],
            [20, 21, 12, 11],
            [21, 22, 13, 12],
            [22, 23, 14, 13],
            [23, 24, 15, 14],
            [24, 25, 16, 15],
            [25, 26, 17, 16],
            [26, 27, 29, 17],
            [27, 28, 31, 29],
            [31, 18, 30, 29],
            [30, 18, 33, 9],
            [31, 28, 33, 18],
            [36, 37, 27, 26],
            [37, 38, 35, 27],
            [38, 39, 34, 35],
            [34, 39, 36, 26],
            [39, 38, 37, 36],
        ]
        .map(Cell::Quad);
        assert_eq!(output.cells(), &expected_cells);
    }
}
