use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    mesh::{Cell, Mesh},
    misc::{cross_xy, FloatingPoint},
    progress::Progress,
};

use super::{
    dual_graph::{DualGraph, InteriorEdge},
    eta_angle, eta_distance, split_to_quads, WeightMatcher, WeightedEdge,
};

/// Weight of a split option while the graph is built ahead of `make_quads`.
const PRELIMINARY_SPLIT_WEIGHT: i64 = -1000;

/// Options for converting triangles to quads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadOptions {
    /// Allow boundary points to be split so that triangles left alone on the boundary become quads.
    split_boundary_points: bool,
    /// Score candidate quads by their angles instead of their side lengths.
    use_angle_cost: bool,
    /// Weight of a boundary point split in the matching.
    split_weight: i64,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            split_boundary_points: true,
            use_angle_cost: false,
            split_weight: -10,
        }
    }
}

impl QuadOptions {
    pub fn split_boundary_points(&self) -> bool {
        self.split_boundary_points
    }

    pub fn use_angle_cost(&self) -> bool {
        self.use_angle_cost
    }

    pub fn split_weight(&self) -> i64 {
        self.split_weight
    }

    pub fn with_split_boundary_points(mut self, split: bool) -> Self {
        self.split_boundary_points = split;
        self
    }

    pub fn with_use_angle_cost(mut self, use_angle: bool) -> Self {
        self.use_angle_cost = use_angle;
        self
    }

    pub fn with_split_weight(mut self, weight: i64) -> Self {
        self.split_weight = weight;
        self
    }
}

/// Converts an all-triangle mesh into a mostly quad mesh by pairing adjacent triangles.
///
/// Adjacent triangles are nodes of a dual graph whose edges are weighted by the quality of the
/// quad they would form. A maximum weight matching picks the pairs to merge.
/// Boundary points can optionally be split, so that two boundary triangles around the same point
/// also become quads.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let points = vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(10., 0., 0.),
///     Point3::new(0., 10., 0.),
///     Point3::new(10., 10., 0.),
/// ];
/// let mesh = Mesh::try_from_triangles(points, &[[2, 0, 3], [3, 0, 1]]).unwrap();
/// let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
/// assert_eq!(blossom.pre_make_quads().unwrap(), 4);
/// let quads = blossom.make_quads(&QuadOptions::default()).unwrap();
/// assert_eq!(quads.cells(), &[Cell::Quad([0, 1, 3, 2])]);
/// ```
#[derive(Debug)]
pub struct QuadBlossom<T: FloatingPoint> {
    points: Vec<Point3<T>>,
    triangles: Vec<[usize; 3]>,
    graph: Option<DualGraph<T>>,
    progress: Option<Progress>,
}

impl<T: FloatingPoint> QuadBlossom<T> {
    /// Create a converter from a mesh made of triangles only.
    pub fn try_new(mesh: &Mesh<T>) -> anyhow::Result<Self> {
        let triangles = mesh
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Cell::Triangle(t) => Ok(*t),
                Cell::Quad(_) => Err(MeshingError::InvalidInput(format!(
                    "cell {} is not a triangle",
                    i
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            points: mesh.points().to_vec(),
            triangles,
            graph: None,
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Build the dual graph and return the number of boundary edges.
    /// An odd count means at least one triangle remains unless boundary points are split.
    pub fn pre_make_quads(&mut self) -> anyhow::Result<usize> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => self.build_graph(PRELIMINARY_SPLIT_WEIGHT)?,
        };
        let count = graph.boundary.len();
        self.graph = Some(graph);
        Ok(count)
    }

    /// Merge matched triangle pairs into quads.
    pub fn make_quads(&mut self, options: &QuadOptions) -> anyhow::Result<Mesh<T>> {
        let graph = match self.graph.take() {
            Some(mut graph) => {
                graph.set_split_weight(options.split_weight());
                graph
            }
            None => self.build_graph(options.split_weight())?,
        };

        let eta: fn(&Point3<T>, &Point3<T>, &Point3<T>, &Point3<T>) -> i64 =
            if options.use_angle_cost() {
                eta_angle::<T>
            } else {
                eta_distance::<T>
            };
        let p = &self.points;
        let mut edges = graph
            .interior
            .iter()
            .map(|e| {
                let weight = eta(&p[e.p_left], &p[e.p0], &p[e.p1], &p[e.p_right]);
                WeightedEdge::new(e.f_left, e.f_right, weight)
            })
            .collect_vec();
        if options.split_boundary_points() {
            edges.extend(
                graph
                    .splits
                    .iter()
                    .map(|s| WeightedEdge::new(s.first.cell, s.last.cell, s.weight)),
            );
        }

        let matcher = WeightMatcher::new(&edges);
        let matcher = match self.progress.as_ref() {
            Some(progress) => matcher.with_progress(progress),
            None => matcher,
        };
        let matching = matcher.solve(options.split_boundary_points())?;
        let eliminate = matching.matched_edges();

        #[cfg(feature = "log")]
        log::debug!(
            "quad blossom: {} triangles, {} candidate edges, {} pairs matched",
            self.triangles.len(),
            edges.len(),
            eliminate.len()
        );

        let mesh = self.eliminate_edges(&graph, &eliminate);
        self.graph = Some(graph);
        Ok(mesh)
    }

    /// Rough time to convert a mesh of `num_points` points, in minutes.
    pub fn estimated_run_time_in_minutes(num_points: usize) -> f64 {
        let n = num_points as f64;
        6.8e-11 * n * n * n
    }

    /// Split every cell into quads through its edge midpoints and centroid.
    pub fn split_to_quads(mesh: &Mesh<T>) -> Mesh<T> {
        split_to_quads(mesh)
    }

    fn build_graph(&self, split_weight: i64) -> anyhow::Result<DualGraph<T>> {
        let graph = DualGraph::try_new(
            &self.points,
            &self.triangles,
            split_weight,
            self.progress.as_ref(),
        )?;

        #[cfg(feature = "log")]
        log::debug!(
            "dual graph: {} interior edges, {} boundary edges, {} split options",
            graph.interior.len(),
            graph.boundary.len(),
            graph.splits.len()
        );

        Ok(graph)
    }

    /// Apply accepted splits, then turn matched pairs into quads and compact the cells.
    /// A split that would fold any of the cells around its point is skipped,
    /// and its two triangles stay as they are.
    fn eliminate_edges(&self, graph: &DualGraph<T>, eliminate: &[usize]) -> Mesh<T> {
        let n_interior = graph.interior.len();
        let mut points = self.points.clone();
        let mut cells = self
            .triangles
            .iter()
            .map(|t| Some(Cell::Triangle(*t)))
            .collect_vec();
        let mut redirect = (0..points.len()).collect_vec();

        let merged = eliminate
            .iter()
            .filter(|k| **k < n_interior)
            .map(|k| &graph.interior[*k])
            .collect_vec();
        let mut matched = vec![false; cells.len()];
        let mut merged_around = vec![vec![]; points.len()];
        for (i, edge) in merged.iter().enumerate() {
            matched[edge.f_left] = true;
            matched[edge.f_right] = true;
            for p in [edge.p0, edge.p1, edge.p_left, edge.p_right] {
                merged_around[p].push(i);
            }
        }

        for split in eliminate
            .iter()
            .filter(|k| **k >= n_interior)
            .map(|k| &graph.splits[k - n_interior])
        {
            let p = split.point;
            if redirect[p] != p {
                continue;
            }
            let px = points.len();
            points.push(split.location);
            let (first, last) = (split.first, split.last);
            // corners shared with an earlier split follow it to its new point
            let q_first = [redirect[first.next], redirect[first.prior], p, px];
            let q_last = [p, redirect[last.next], redirect[last.prior], px];
            let lone = split
                .middle
                .iter()
                .copied()
                .filter(|c| !matched[*c])
                .collect_vec();

            let at = |v: usize| if v == p { px } else { redirect[v] };
            let moved_triangles = lone.iter().map(|c| self.triangles[*c].map(at).to_vec());
            let moved_quads = merged_around[p]
                .iter()
                .map(|i| merged_quad(merged[*i]).map(at).to_vec());
            let folded = [q_first.to_vec(), q_last.to_vec()]
                .into_iter()
                .chain(moved_triangles)
                .chain(moved_quads)
                .any(|polygon| signed_area(&points, &polygon) <= T::zero());
            if folded {
                points.pop();
                continue;
            }

            cells[first.cell] = Some(Cell::Quad(q_first));
            cells[last.cell] = Some(Cell::Quad(q_last));
            matched[first.cell] = true;
            matched[last.cell] = true;
            for c in lone {
                cells[c] = Some(Cell::Triangle(self.triangles[c].map(at)));
            }
            redirect[p] = px;
        }

        for edge in merged {
            cells[edge.f_left] = Some(Cell::Quad(merged_quad(edge).map(|v| redirect[v])));
            cells[edge.f_right] = None;
        }

        Mesh::new_unchecked(points, cells.into_iter().flatten().collect())
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> Option<&DualGraph<T>> {
        self.graph.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn eliminate(&mut self, eliminate: &[usize]) -> anyhow::Result<Mesh<T>> {
        let graph = match self.graph.take() {
            Some(graph) => graph,
            None => self.build_graph(PRELIMINARY_SPLIT_WEIGHT)?,
        };
        let mesh = self.eliminate_edges(&graph, eliminate);
        self.graph = Some(graph);
        Ok(mesh)
    }
}

fn merged_quad(edge: &InteriorEdge) -> [usize; 4] {
    [edge.p0, edge.p_right, edge.p1, edge.p_left]
}

/// Twice the signed area of a polygon in the xy plane.
fn signed_area<T: FloatingPoint>(points: &[Point3<T>], polygon: &[usize]) -> T {
    let origin = &points[polygon[0]];
    polygon
        .windows(2)
        .skip(1)
        .fold(T::zero(), |acc, w| {
            acc + cross_xy(origin, &points[w[0]], &points[w[1]])
        })
}
