use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{
    error::MeshingError,
    mesh::Mesh,
    misc::{distance_xy, FloatingPoint},
    progress::Progress,
};

/// Number of settled points between two progress checkpoints.
const CHECKPOINT_INTERVAL: usize = 1024;

/// Which end of the field is held while the rest relaxes toward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorType {
    /// Small values spread outward, larger values are lowered.
    #[default]
    Min,
    /// Large values spread outward, smaller values are raised.
    Max,
    /// `Min` followed by `Max`.
    Both,
}

/// Options for smoothing a scalar field over a mesh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothOptions {
    anchor: AnchorType,
    /// Points whose value is never modified. They still constrain their neighbors.
    fixed: Option<Vec<bool>>,
}

impl SmoothOptions {
    pub fn anchor(&self) -> AnchorType {
        self.anchor
    }

    pub fn fixed(&self) -> Option<&[bool]> {
        self.fixed.as_deref()
    }

    pub fn with_anchor(mut self, anchor: AnchorType) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_fixed(mut self, fixed: Vec<bool>) -> Self {
        self.fixed = Some(fixed);
        self
    }
}

/// Frontier entry ordered so that the max-heap pops the value closest to the anchor first.
#[derive(Debug, Clone, Copy)]
struct Frontier<T> {
    key: T,
    point: usize,
}

impl<T: FloatingPoint> PartialEq for Frontier<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: FloatingPoint> Eq for Frontier<T> {}

impl<T: FloatingPoint> PartialOrd for Frontier<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: FloatingPoint> Ord for Frontier<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .partial_cmp(&other.key)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.point.cmp(&self.point))
    }
}

/// Smooths size or elevation fields so that neighboring values differ by a bounded amount.
///
/// Values are relaxed from the anchored end of the field outward, like a multi-source Dijkstra
/// search over the mesh edges. With `AnchorType::Min` the result is the lower envelope
/// `f'(v) = min(f(v), min_u f'(u) + bound(u, v))`; `AnchorType::Max` gives the upper one.
/// ```
/// use quadro::prelude::*;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(10., 0., 0.),
///     Point3::new(0., 10., 0.),
/// ];
/// let mesh = Mesh::try_from_triangles(points, &[[0, 1, 2]]).unwrap();
/// let smoother = FieldSmoother::new(SmoothOptions::default());
/// let elevations = smoother.smooth_elevation(&mesh, &[0., 100., 1.], 0.5).unwrap();
/// assert_eq!(elevations, vec![0., 5., 1.]);
/// ```
#[derive(Debug, Default)]
pub struct FieldSmoother {
    options: SmoothOptions,
    progress: Option<Progress>,
}

impl FieldSmoother {
    pub fn new(options: SmoothOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn options(&self) -> &SmoothOptions {
        &self.options
    }

    /// Limits the growth of element sizes so that the area of adjacent elements changes
    /// by at most `size_ratio`.
    ///
    /// The growth factor is `g = sqrt(1 / size_ratio)`, and a size `s` bounds a neighbor at
    /// distance `l` by `s ± l·ln(g)`. Sizes below `min_size` are raised to it.
    pub fn smooth_size<T: FloatingPoint>(
        &self,
        mesh: &Mesh<T>,
        sizes: &[T],
        size_ratio: T,
        min_size: T,
    ) -> anyhow::Result<Vec<T>> {
        anyhow::ensure!(
            size_ratio > T::zero() && size_ratio < T::one(),
            MeshingError::invalid_parameter("size_ratio", size_ratio, "must be in (0, 1)")
        );
        anyhow::ensure!(
            min_size > T::zero(),
            MeshingError::invalid_parameter("min_size", min_size, "must be positive")
        );
        self.validate(mesh, sizes)?;

        let growth = (T::one() / size_ratio).sqrt();
        let mut values = sizes.to_vec();
        for (i, v) in values.iter_mut().enumerate() {
            if !self.is_fixed(i) && *v < min_size {
                *v = min_size;
            }
        }
        self.smooth(mesh, values, growth.ln())
    }

    /// Limits the slope between neighboring elevations to `max_slope`.
    pub fn smooth_elevation<T: FloatingPoint>(
        &self,
        mesh: &Mesh<T>,
        elevations: &[T],
        max_slope: T,
    ) -> anyhow::Result<Vec<T>> {
        anyhow::ensure!(
            max_slope > T::zero(),
            MeshingError::invalid_parameter("max_slope", max_slope, "must be positive")
        );
        self.validate(mesh, elevations)?;
        self.smooth(mesh, elevations.to_vec(), max_slope)
    }

    fn validate<T: FloatingPoint>(&self, mesh: &Mesh<T>, field: &[T]) -> anyhow::Result<()> {
        anyhow::ensure!(
            !mesh.is_empty() && !field.is_empty(),
            MeshingError::InvalidInput("cannot smooth an empty field".to_string())
        );
        anyhow::ensure!(
            field.len() == mesh.num_points(),
            MeshingError::LengthMismatch {
                expected: mesh.num_points(),
                actual: field.len(),
            }
        );
        if let Some(fixed) = self.options.fixed() {
            anyhow::ensure!(
                fixed.len() == mesh.num_points(),
                MeshingError::LengthMismatch {
                    expected: mesh.num_points(),
                    actual: fixed.len(),
                }
            );
        }
        Ok(())
    }

    fn is_fixed(&self, point: usize) -> bool {
        self.options
            .fixed()
            .map(|fixed| fixed[point])
            .unwrap_or(false)
    }

    fn smooth<T: FloatingPoint>(
        &self,
        mesh: &Mesh<T>,
        mut values: Vec<T>,
        rate: T,
    ) -> anyhow::Result<Vec<T>> {
        let neighbors = mesh.point_neighbors();
        let passes: &[bool] = match self.options.anchor() {
            AnchorType::Min => &[true],
            AnchorType::Max => &[false],
            AnchorType::Both => &[true, false],
        };
        for &ascending in passes {
            #[cfg(feature = "log")]
            {
                let changed = self.relax(mesh, &neighbors, &mut values, rate, ascending)?;
                log::debug!(
                    "smoothing {} pass settled {} points, {} values changed",
                    if ascending { "min" } else { "max" },
                    values.len(),
                    changed
                );
            }
            #[cfg(not(feature = "log"))]
            self.relax(mesh, &neighbors, &mut values, rate, ascending)?;
        }
        Ok(values)
    }

    /// One relaxation pass. Returns the number of points whose value changed.
    fn relax<T: FloatingPoint>(
        &self,
        mesh: &Mesh<T>,
        neighbors: &[Vec<usize>],
        values: &mut [T],
        rate: T,
        ascending: bool,
    ) -> anyhow::Result<usize> {
        // +1 lets values grow away from the minimum, -1 shrink away from the maximum
        let direction = if ascending { T::one() } else { -T::one() };
        let points = mesh.points();
        let n = values.len();

        let mut heap: BinaryHeap<Frontier<T>> = values
            .iter()
            .enumerate()
            .map(|(point, v)| Frontier {
                key: -direction * *v,
                point,
            })
            .collect();
        let mut settled = vec![false; n];
        let mut changed = vec![false; n];
        let mut count = 0;

        while let Some(Frontier { key, point }) = heap.pop() {
            if settled[point] || key != -direction * values[point] {
                continue;
            }
            settled[point] = true;
            count += 1;
            if count % CHECKPOINT_INTERVAL == 0 {
                if let Some(progress) = self.progress.as_ref() {
                    progress.report(count, n, "smoothing field")?;
                }
            }

            let value = values[point];
            for &next in neighbors[point].iter() {
                if settled[next] || self.is_fixed(next) {
                    continue;
                }
                let bound = value + direction * rate * distance_xy(&points[point], &points[next]);
                if direction * (bound - values[next]) < T::zero() {
                    values[next] = bound;
                    changed[next] = true;
                    heap.push(Frontier {
                        key: -direction * bound,
                        point: next,
                    });
                }
            }
        }

        Ok(changed.iter().filter(|c| **c).count())
    }
}
