use std::collections::HashMap;

use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    mesh::{Cell, Mesh},
    misc::{centroid, FloatingPoint, PolygonBoundary},
    progress::Progress,
    quad::{BadQuadRemover, QuadBlossom},
    redistribute::PolyRedistributer,
    topology::{open_ring, Diagnostic, TopologyValidator},
    triangulation::{DelaunayTriangulator, Triangulator},
};

use super::{MesherOptions, PolyInput};

/// Result of a meshing run.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshingOutcome<T: FloatingPoint> {
    Mesh(Mesh<T>),
    /// The polygons failed validation and nothing was meshed.
    TopologyConflict(Vec<Diagnostic>),
}

impl<T: FloatingPoint> MeshingOutcome<T> {
    pub fn mesh(&self) -> Option<&Mesh<T>> {
        match self {
            MeshingOutcome::Mesh(mesh) => Some(mesh),
            MeshingOutcome::TopologyConflict(_) => None,
        }
    }

    pub fn into_mesh(self) -> Option<Mesh<T>> {
        match self {
            MeshingOutcome::Mesh(mesh) => Some(mesh),
            MeshingOutcome::TopologyConflict(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            MeshingOutcome::Mesh(_) => &[],
            MeshingOutcome::TopologyConflict(diagnostics) => diagnostics,
        }
    }
}

/// Meshes a set of polygons into one mesh.
///
/// Each polygon goes through these steps:
/// 1. its rings are redistributed by the polygon's size policy,
/// 2. it is triangulated with its inner rings as holes,
/// 3. its points are draped over the polygon's elevation function.
///
/// Points shared by neighboring polygons are merged. The merged mesh is then optionally turned
/// into quads and cleaned of bad quads.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let square = PolygonInput::new(vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(100., 0., 0.),
///     Point3::new(100., 100., 0.),
///     Point3::new(0., 100., 0.),
/// ]);
/// let input = PolyInput::new(square).with_size_policy(SizePolicy::constant(25.));
/// let outcome = MultiPolyMesher::new(MesherOptions::default())
///     .mesh(&[input])
///     .unwrap();
/// let mesh = outcome.mesh().unwrap();
/// assert_eq!(mesh.num_points(), 16);
/// assert_eq!(mesh.num_triangles(), 14);
/// ```
#[derive(Debug)]
pub struct MultiPolyMesher<T: FloatingPoint, R = DelaunayTriangulator<T>> {
    options: MesherOptions<T>,
    triangulator: R,
    progress: Option<Progress>,
}

impl<T: FloatingPoint> MultiPolyMesher<T> {
    /// Create a mesher triangulating with `spade`.
    pub fn new(options: MesherOptions<T>) -> Self {
        let triangulator = match options.max_area() {
            Some(area) => DelaunayTriangulator::new().with_max_area(area),
            None => DelaunayTriangulator::new(),
        };
        Self {
            options,
            triangulator,
            progress: None,
        }
    }
}

impl<T: FloatingPoint, R: Triangulator<T>> MultiPolyMesher<T, R> {
    /// Replace the triangulator. The maximum area of the options is left to the new one.
    pub fn with_triangulator<S: Triangulator<T>>(self, triangulator: S) -> MultiPolyMesher<T, S> {
        MultiPolyMesher {
            options: self.options,
            triangulator,
            progress: self.progress,
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn options(&self) -> &MesherOptions<T> {
        &self.options
    }

    pub fn triangulator(&self) -> &R {
        &self.triangulator
    }

    pub fn mesh(&self, inputs: &[PolyInput<T>]) -> anyhow::Result<MeshingOutcome<T>> {
        if self.options.check_topology() {
            let polygons = inputs.iter().map(|i| i.polygon().clone()).collect_vec();
            let diagnostics = TopologyValidator::new().validate_input(&polygons);
            if !diagnostics.is_empty() {
                #[cfg(feature = "log")]
                log::warn!(
                    "topology check found {} conflicts, nothing meshed",
                    diagnostics.len()
                );
                return Ok(MeshingOutcome::TopologyConflict(diagnostics));
            }
        }
        anyhow::ensure!(
            !inputs.is_empty(),
            MeshingError::InvalidInput("no polygons to mesh".to_string())
        );

        let mut merged = MergedMesh::default();
        for (i, input) in inputs.iter().enumerate() {
            if let Some(progress) = self.progress.as_ref() {
                progress.report(i, inputs.len(), "meshing polygons")?;
            }
            let mesh = self.mesh_polygon(input)?;

            #[cfg(feature = "log")]
            log::debug!(
                "polygon {}: {} points, {} triangles",
                i,
                mesh.num_points(),
                mesh.num_triangles()
            );

            merged.append(mesh);
        }
        let mut mesh = merged.into_mesh()?;

        if let Some(quads) = self.options.quads() {
            let mut blossom = QuadBlossom::try_new(&mesh)?;
            if let Some(progress) = self.progress.as_ref() {
                blossom = blossom.with_progress(progress.clone());
            }
            #[cfg(feature = "log")]
            {
                let boundary = blossom.pre_make_quads()?;
                log::debug!(
                    "converting to quads: {} boundary edges, about {:.2} minutes",
                    boundary,
                    QuadBlossom::<T>::estimated_run_time_in_minutes(mesh.num_points())
                );
            }

            mesh = blossom.make_quads(quads)?;
        }
        if let Some(aspect) = self.options.bad_quad_aspect() {
            mesh = BadQuadRemover::new(&mesh).remove_bad_quads(aspect)?;
        }

        if let Some(progress) = self.progress.as_ref() {
            progress.report(inputs.len(), inputs.len(), "meshing polygons")?;
        }
        Ok(MeshingOutcome::Mesh(mesh))
    }

    fn mesh_polygon(&self, input: &PolyInput<T>) -> anyhow::Result<Mesh<T>> {
        let rings = input
            .polygon()
            .rings()
            .map(|ring| redistribute_ring(ring, input.redistributer()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut points = vec![];
        let mut constraints = vec![];
        for ring in rings.iter() {
            let start = points.len();
            let n = ring.len();
            constraints.extend((0..n).map(|i| [start + i, start + (i + 1) % n]));
            points.extend(ring.iter().cloned());
        }
        points.extend(input.refine_points().iter().cloned());
        let holes = rings
            .iter()
            .skip(1)
            .map(|ring| PolygonBoundary::new(ring.clone()))
            .collect_vec();

        let mesh = self
            .triangulator
            .triangulate(&points, &constraints, &holes)?;

        match input.elevation() {
            Some(elevation) => {
                let (mut points, cells) = mesh.into_parts();
                points.iter_mut().for_each(|p| p.z = elevation.size_at(p));
                Ok(Mesh::new_unchecked(points, cells))
            }
            None => Ok(mesh),
        }
    }
}

/// Index of the polygon holding each cell of a mesh made from `inputs`, found from the cell centroid.
/// A cell whose centroid lies outside every polygon, or inside a hole, gets `None`.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let square = |x: f64| {
///     PolyInput::new(PolygonInput::new(vec![
///         Point3::new(x, 0., 0.),
///         Point3::new(x + 10., 0., 0.),
///         Point3::new(x + 10., 10., 0.),
///         Point3::new(x, 10., 0.),
///     ]))
/// };
/// let inputs = [square(0.), square(20.)];
/// let mesh = MultiPolyMesher::new(MesherOptions::default())
///     .mesh(&inputs)
///     .unwrap()
///     .into_mesh()
///     .unwrap();
/// let ids = cell_polygons(&mesh, &inputs);
/// assert_eq!(ids, vec![Some(0), Some(0), Some(1), Some(1)]);
/// ```
pub fn cell_polygons<T: FloatingPoint>(mesh: &Mesh<T>, inputs: &[PolyInput<T>]) -> Vec<Option<usize>> {
    let regions = inputs
        .iter()
        .map(|input| {
            let polygon = input.polygon();
            let outer = PolygonBoundary::new(polygon.outer().to_vec());
            let holes = polygon
                .inners()
                .iter()
                .map(|ring| PolygonBoundary::new(ring.clone()))
                .collect_vec();
            (outer, holes)
        })
        .collect_vec();
    mesh.cells()
        .iter()
        .map(|cell| {
            let center = centroid(cell.vertices().iter().map(|v| &mesh.points()[*v]));
            regions.iter().position(|(outer, holes)| {
                outer.contains(&center) && !holes.iter().any(|hole| hole.contains(&center))
            })
        })
        .collect()
}

/// Redistributes a closed ring, falling back to the ring itself when too few points would remain.
fn redistribute_ring<T: FloatingPoint>(
    ring: &[Point3<T>],
    redistributer: Option<&PolyRedistributer<T>>,
) -> anyhow::Result<Vec<Point3<T>>> {
    let ring = open_ring(ring);
    let Some(redistributer) = redistributer else {
        return Ok(ring.to_vec());
    };
    anyhow::ensure!(
        !ring.is_empty(),
        MeshingError::InvalidInput("cannot redistribute an empty ring".to_string())
    );

    let mut closed = ring.to_vec();
    closed.push(ring[0]);
    let mut redistributed = redistributer.redistribute(&closed)?;
    redistributed.pop();
    if redistributed.len() < 3 {
        #[cfg(feature = "log")]
        log::warn!(
            "ring of {} points would keep {} points after redistribution, left as is",
            ring.len(),
            redistributed.len()
        );
        return Ok(ring.to_vec());
    }
    Ok(redistributed)
}

/// Accumulates polygon meshes, merging points that share the same xy location.
#[derive(Debug)]
struct MergedMesh<T: FloatingPoint> {
    points: Vec<Point3<T>>,
    cells: Vec<Cell>,
    index: HashMap<(u64, u64), usize>,
}

impl<T: FloatingPoint> Default for MergedMesh<T> {
    fn default() -> Self {
        Self {
            points: vec![],
            cells: vec![],
            index: HashMap::new(),
        }
    }
}

impl<T: FloatingPoint> MergedMesh<T> {
    fn append(&mut self, mesh: Mesh<T>) {
        let (points, cells) = mesh.into_parts();
        let remap = points
            .into_iter()
            .map(|p| {
                let key = (location_bits(p.x), location_bits(p.y));
                *self.index.entry(key).or_insert_with(|| {
                    self.points.push(p);
                    self.points.len() - 1
                })
            })
            .collect_vec();
        self.cells.extend(
            cells
                .iter()
                .filter_map(|cell| Cell::from_ring(cell.vertices().iter().map(|v| remap[*v]))),
        );
    }

    fn into_mesh(self) -> anyhow::Result<Mesh<T>> {
        Mesh::try_new(self.points, self.cells)
    }
}

/// Bit pattern of a coordinate with both zeros folded together.
fn location_bits<T: FloatingPoint>(v: T) -> u64 {
    let v = v.to_f64().unwrap_or(f64::NAN);
    if v == 0. {
        0
    } else {
        v.to_bits()
    }
}
