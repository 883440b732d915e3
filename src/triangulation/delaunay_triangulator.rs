use itertools::Itertools;
use nalgebra::Point3;
use num_traits::Float;
use spade::{
    handles::FixedFaceHandle, handles::InnerTag, ConstrainedDelaunayTriangulation, HasPosition,
    Point2, PositionInTriangulation, RefinementParameters, Triangulation,
};

use crate::{
    error::MeshingError,
    mesh::{Cell, Mesh},
    misc::{centroid, cross_xy, lerp, FloatingPoint, PolygonBoundary},
};

use super::Triangulator;

type Cdt<T> = ConstrainedDelaunayTriangulation<Vertex<T>>;

/// Triangulation vertex keeping the elevation of its point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vertex<T: FloatingPoint> {
    point: Point3<T>,
}

impl<T: FloatingPoint> HasPosition for Vertex<T> {
    type Scalar = T;

    fn position(&self) -> Point2<Self::Scalar> {
        Point2::new(self.point.x, self.point.y)
    }
}

/// Steiner points inserted by refinement start flat and get their elevation afterwards.
impl<T: FloatingPoint> From<Point2<T>> for Vertex<T> {
    fn from(p: Point2<T>) -> Self {
        Self {
            point: Point3::new(p.x, p.y, T::zero()),
        }
    }
}

impl<T: FloatingPoint> Default for Vertex<T> {
    fn default() -> Self {
        Self {
            point: Point3::origin(),
        }
    }
}

/// Constrained Delaunay triangulator backed by `spade`.
///
/// With a maximum area, triangles inside the constraint loops are refined until none is larger.
/// Refinement points are draped linearly over the unrefined triangulation.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let points = vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(10., 0., 0.),
///     Point3::new(10., 10., 0.),
///     Point3::new(0., 10., 0.),
/// ];
/// let constraints = [[0, 1], [1, 2], [2, 3], [3, 0]];
/// let mesh = DelaunayTriangulator::default()
///     .triangulate(&points, &constraints, &[])
///     .unwrap();
/// assert_eq!(mesh.num_triangles(), 2);
///
/// let refined = DelaunayTriangulator::default()
///     .with_max_area(5.)
///     .triangulate(&points, &constraints, &[])
///     .unwrap();
/// assert!(refined.num_triangles() >= 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelaunayTriangulator<T> {
    max_area: Option<T>,
}

impl<T> Default for DelaunayTriangulator<T> {
    fn default() -> Self {
        Self { max_area: None }
    }
}

impl<T: FloatingPoint> DelaunayTriangulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_area(&self) -> Option<T> {
        self.max_area
    }

    pub fn with_max_area(mut self, max_area: T) -> Self {
        self.max_area = Some(max_area);
        self
    }
}

impl<T: FloatingPoint + Float> Triangulator<T> for DelaunayTriangulator<T> {
    fn triangulate(
        &self,
        points: &[Point3<T>],
        constraints: &[[usize; 2]],
        holes: &[PolygonBoundary<T>],
    ) -> anyhow::Result<Mesh<T>> {
        anyhow::ensure!(
            points.len() >= 3,
            MeshingError::InvalidInput(format!(
                "at least 3 points are required to triangulate, got {}",
                points.len()
            ))
        );
        if let Some([a, b]) = constraints
            .iter()
            .find(|[a, b]| *a >= points.len() || *b >= points.len())
        {
            anyhow::bail!(MeshingError::InvalidInput(format!(
                "constraint ({}, {}) references a point out of {}",
                a,
                b,
                points.len()
            )));
        }
        if let Some(area) = self.max_area {
            anyhow::ensure!(
                area > T::zero(),
                MeshingError::invalid_parameter("max_area", area, "must be positive")
            );
        }

        let mut cdt = Cdt::<T>::default();
        let handles = points
            .iter()
            .map(|p| {
                cdt.insert(Vertex { point: *p }).map_err(|e| {
                    MeshingError::InvalidInput(format!("cannot insert point {:?}: {:?}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for [a, b] in constraints.iter() {
            let (ha, hb) = (handles[*a], handles[*b]);
            if ha != hb && cdt.can_add_constraint(ha, hb) {
                cdt.add_constraint(ha, hb);
            } else {
                #[cfg(feature = "log")]
                log::warn!("constraint ({}, {}) could not be added to the triangulation", a, b);
            }
        }

        let source = match self.max_area {
            Some(area) => {
                let source = cdt.clone();
                let parameters = RefinementParameters::<T>::new()
                    .with_max_allowed_area(area)
                    .exclude_outer_faces(!constraints.is_empty());

                #[cfg(feature = "log")]
                {
                    let result = cdt.refine(parameters);
                    log::debug!(
                        "refinement added {} points (complete: {})",
                        cdt.num_vertices() - source.num_vertices(),
                        result.refinement_complete
                    );
                }
                #[cfg(not(feature = "log"))]
                cdt.refine(parameters);

                Some(source)
            }
            None => None,
        };

        let outside = if constraints.is_empty() {
            vec![false; cdt.num_all_faces()]
        } else {
            outside_faces(&cdt)
        };

        let faces = cdt
            .inner_faces()
            .filter(|f| !outside[f.fix().index()])
            .filter_map(|f| {
                let vs = f.vertices();
                let tri = vs.iter().map(|v| v.data().point).collect_vec();
                if cross_xy(&tri[0], &tri[1], &tri[2]) <= T::zero() {
                    return None;
                }
                let center = centroid(tri.iter());
                if holes.iter().any(|hole| hole.contains(&center)) {
                    return None;
                }
                Some(vs.map(|v| v.fix().index()))
            })
            .collect_vec();

        // drop isolated vertices, keeping the insertion order of the others
        let mut remap = vec![None; cdt.num_vertices()];
        faces.iter().flatten().for_each(|v| remap[*v] = Some(0));
        let mut vertices = vec![];
        for (i, v) in cdt.vertices().enumerate() {
            if let Some(slot) = remap[i].as_mut() {
                *slot = vertices.len();
                let mut point = v.data().point;
                if let Some(source) = source.as_ref() {
                    if i >= source.num_vertices() {
                        point.z = interpolate_elevation(source, &point);
                    }
                }
                vertices.push(point);
            }
        }
        let cells = faces
            .into_iter()
            .filter_map(|face| {
                face.iter()
                    .map(|v| remap[*v])
                    .collect::<Option<Vec<_>>>()
                    .and_then(|v| Cell::from_slice(&v))
            })
            .collect_vec();

        #[cfg(feature = "log")]
        log::debug!(
            "triangulated {} points into {} triangles over {} points",
            points.len(),
            cells.len(),
            vertices.len()
        );

        Ok(Mesh::new_unchecked(vertices, cells))
    }
}

/// Marks the inner faces reachable from the convex hull without crossing a constraint edge.
fn outside_faces<T: FloatingPoint>(cdt: &Cdt<T>) -> Vec<bool> {
    let mut outside = vec![false; cdt.num_all_faces()];
    let mut stack: Vec<FixedFaceHandle<InnerTag>> = cdt
        .inner_faces()
        .filter(|f| {
            f.adjacent_edges().iter().any(|e| {
                e.rev().face().is_outer() && !cdt.is_constraint_edge(e.as_undirected().fix())
            })
        })
        .map(|f| f.fix())
        .collect();

    while let Some(face) = stack.pop() {
        if outside[face.index()] {
            continue;
        }
        outside[face.index()] = true;
        for e in cdt.face(face).adjacent_edges() {
            if cdt.is_constraint_edge(e.as_undirected().fix()) {
                continue;
            }
            if let Some(next) = e.rev().face().as_inner() {
                if !outside[next.fix().index()] {
                    stack.push(next.fix());
                }
            }
        }
    }
    outside
}

/// Linear interpolation of the elevation over the triangulation containing `point`.
fn interpolate_elevation<T: FloatingPoint>(cdt: &Cdt<T>, point: &Point3<T>) -> T {
    match cdt.locate(Point2::new(point.x, point.y)) {
        PositionInTriangulation::OnVertex(v) => cdt.vertex(v).data().point.z,
        PositionInTriangulation::OnEdge(e) | PositionInTriangulation::OutsideOfConvexHull(e) => {
            let e = cdt.directed_edge(e);
            let (a, b) = (e.from().data().point, e.to().data().point);
            let ab = b - a;
            let len = ab.x * ab.x + ab.y * ab.y;
            if len <= T::zero() {
                return a.z;
            }
            let t = ((point.x - a.x) * ab.x + (point.y - a.y) * ab.y) / len;
            let t = t.clamp(T::zero(), T::one());
            lerp(&a, &b, t).z
        }
        PositionInTriangulation::OnFace(f) => {
            let [a, b, c] = cdt.face(f).vertices().map(|v| v.data().point);
            let area = cross_xy(&a, &b, &c);
            if area <= T::zero() {
                return centroid([a, b, c].iter()).z;
            }
            let wa = cross_xy(point, &b, &c) / area;
            let wb = cross_xy(&a, point, &c) / area;
            let wc = T::one() - wa - wb;
            a.z * wa + b.z * wb + c.z * wc
        }
        PositionInTriangulation::NoTriangulation => T::zero(),
    }
}
