use std::fmt;

use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    misc::{distance_xy, lerp, FloatingPoint},
};

use super::{redistribute_by_curvature, CurvatureOptions, PolygonSizeField, SizeFunction};

/// How the target spacing along a polyline is chosen.
pub enum SizePolicy<T: FloatingPoint> {
    /// The same spacing everywhere.
    Constant(T),
    /// Spacing sampled from an arbitrary size function at every input point.
    Function(Box<dyn SizeFunction<T> + Send + Sync>),
    /// Spacing inferred from the edge lengths of a polygon.
    FromPolygon(PolygonSizeField<T>),
    /// Point density driven by the curvature of the polyline itself.
    Curvature(CurvatureOptions<T>),
}

impl<T: FloatingPoint> SizePolicy<T> {
    pub fn constant(size: T) -> Self {
        Self::Constant(size)
    }

    pub fn function<F>(f: F) -> Self
    where
        F: SizeFunction<T> + Send + Sync + 'static,
    {
        Self::Function(Box::new(f))
    }

    pub fn from_polygon(outer: &[Point3<T>], inners: &[Vec<Point3<T>>], bias: T) -> anyhow::Result<Self> {
        Ok(Self::FromPolygon(PolygonSizeField::try_new(outer, inners, bias)?))
    }

    pub fn curvature(options: CurvatureOptions<T>) -> Self {
        Self::Curvature(options)
    }
}

impl<T: FloatingPoint> fmt::Debug for SizePolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(size) => f.debug_tuple("Constant").field(size).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
            Self::FromPolygon(field) => f.debug_tuple("FromPolygon").field(field).finish(),
            Self::Curvature(options) => f.debug_tuple("Curvature").field(options).finish(),
        }
    }
}

/// Redistributes the points of a polyline to match a target spacing.
///
/// A polyline whose last point equals its first is treated as closed,
/// and the output then also ends on its first point.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let square = vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(0., 10., 0.),
///     Point3::new(10., 10., 0.),
///     Point3::new(10., 0., 0.),
///     Point3::new(0., 0., 0.),
/// ];
/// let redistributer = PolyRedistributer::new(SizePolicy::constant(5.));
/// let points = redistributer.redistribute(&square).unwrap();
/// assert_eq!(points.len(), 9);
/// assert_eq!(points.first(), points.last());
/// ```
#[derive(Debug)]
pub struct PolyRedistributer<T: FloatingPoint> {
    policy: SizePolicy<T>,
}

impl<T: FloatingPoint> PolyRedistributer<T> {
    pub fn new(policy: SizePolicy<T>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SizePolicy<T> {
        &self.policy
    }

    /// Target size at a point.
    /// Fails for curvature redistribution, which has no size field.
    pub fn size_at(&self, point: &Point3<T>) -> anyhow::Result<T> {
        match &self.policy {
            SizePolicy::Constant(size) => Ok(*size),
            SizePolicy::Function(f) => Ok(f.size_at(point)),
            SizePolicy::FromPolygon(field) => Ok(field.size_at(point)),
            SizePolicy::Curvature(_) => Err(MeshingError::InvalidInput(
                "curvature redistribution does not define a size field".to_string(),
            )
            .into()),
        }
    }

    pub fn redistribute(&self, points: &[Point3<T>]) -> anyhow::Result<Vec<Point3<T>>> {
        anyhow::ensure!(
            points.len() >= 2,
            MeshingError::InvalidInput(format!(
                "a polyline needs at least 2 points, got {}",
                points.len()
            ))
        );

        let sizes = match &self.policy {
            SizePolicy::Constant(size) => {
                anyhow::ensure!(
                    *size > T::zero(),
                    MeshingError::invalid_parameter("size", *size, "must be positive")
                );
                vec![*size; points.len()]
            }
            SizePolicy::Function(f) => f.sizes_along(points),
            SizePolicy::FromPolygon(field) => field.sizes_along(points),
            SizePolicy::Curvature(options) => return redistribute_by_curvature(points, options),
        };

        if let Some((i, size)) = sizes
            .iter()
            .find_position(|s| !(**s > T::zero() && s.is_finite()))
        {
            anyhow::bail!(MeshingError::InvalidInput(format!(
                "size at point {} must be positive, got {:?}",
                i, size
            )));
        }

        let redistributed = redistribute_with_sizes(points, &sizes)?;

        #[cfg(feature = "log")]
        log::debug!(
            "redistributed polyline: {} points -> {} points",
            points.len(),
            redistributed.len()
        );

        Ok(redistributed)
    }
}

/// Walks a segment of length `length` spanning `[t_start, t_end]`, where the size blends
/// linearly from `w_start` to `w_end`, and appends a parameter every time a whole element fits.
/// `carried` is the fraction of an element left over from the previous segment.
/// Returns the fraction left over at the end of this segment.
fn t_values_for_segment<T: FloatingPoint>(
    mut length: T,
    mut t_start: T,
    t_end: T,
    mut w_start: T,
    w_end: T,
    mut carried: T,
    t_values: &mut Vec<T>,
) -> T {
    let two = T::from_f64(2.).unwrap();
    loop {
        let filled = carried + two * length / (w_start + w_end);
        if filled < T::one() {
            return filled;
        }
        let scale = T::one() - carried;
        let step = two * scale * w_start * length / (two * length + scale * (w_start - w_end));
        let fraction = step / length;
        let t = t_start + fraction * (t_end - t_start);
        t_values.push(t);
        w_start = w_start + fraction * (w_end - w_start);
        t_start = t;
        length -= step;
        carried = T::zero();
    }
}

/// Places points along `points` so that consecutive spacing follows `sizes`, given per input point.
pub(crate) fn redistribute_with_sizes<T: FloatingPoint>(
    points: &[Point3<T>],
    sizes: &[T],
) -> anyhow::Result<Vec<Point3<T>>> {
    anyhow::ensure!(
        points.len() == sizes.len(),
        MeshingError::LengthMismatch {
            expected: points.len(),
            actual: sizes.len(),
        }
    );
    let lengths = points
        .windows(2)
        .map(|w| distance_xy(&w[0], &w[1]))
        .collect_vec();
    let total = lengths.iter().fold(T::zero(), |acc, l| acc + *l);
    anyhow::ensure!(
        total > T::zero(),
        MeshingError::InvalidInput("polyline has zero length".to_string())
    );

    let mut starts = Vec::with_capacity(lengths.len());
    let mut station = T::zero();
    for l in lengths.iter() {
        starts.push(station / total);
        station += *l;
    }

    let mut t_values = vec![T::zero()];
    let mut carried = T::zero();
    for (i, l) in lengths.iter().enumerate() {
        let t_end = starts.get(i + 1).copied().unwrap_or_else(T::one);
        carried = t_values_for_segment(
            *l,
            starts[i],
            t_end,
            sizes[i],
            sizes[i + 1],
            carried,
            &mut t_values,
        );
    }

    let endpoints = || vec![points[0], points[points.len() - 1]];
    if t_values.len() < 2 {
        return Ok(endpoints());
    }

    let average = t_values[t_values.len() - 1] / T::from_usize(t_values.len() - 1).unwrap();
    let mut leftover = T::one() - t_values[t_values.len() - 1];
    // the last t lands on the end point when the length is an exact fit,
    // otherwise a short final element is merged into the previous ones
    if carried < T::from_f64(0.5).unwrap() {
        t_values.pop();
        leftover = T::one() - t_values[t_values.len() - 1];
    }

    let single_interior = t_values.len() == 2 && lengths.len() <= 3;
    if t_values.len() > 2 || single_interior {
        let n = T::from_usize(t_values.len()).unwrap();
        let shift = (leftover - average) / n;
        for (i, t) in t_values.iter_mut().enumerate() {
            *t += T::from_usize(i).unwrap() * shift;
        }
    } else if lengths.len() > 3 {
        t_values = vec![
            T::zero(),
            T::one() / T::from_f64(3.).unwrap(),
            T::from_f64(2.).unwrap() / T::from_f64(3.).unwrap(),
        ];
    }

    if t_values.len() < 2 {
        return Ok(endpoints());
    }
    t_values.push(T::one());

    let last = t_values.len() - 1;
    let mut result = Vec::with_capacity(t_values.len());
    result.push(points[0]);
    let mut segment = 0;
    for t in t_values.iter().take(last).skip(1) {
        while segment + 1 < lengths.len() && starts[segment + 1] <= *t {
            segment += 1;
        }
        let local = if lengths[segment] > T::zero() {
            (*t - starts[segment]) * total / lengths[segment]
        } else {
            T::zero()
        };
        result.push(lerp(
            &points[segment],
            &points[segment + 1],
            local.max(T::zero()).min(T::one()),
        ));
    }
    result.push(points[points.len() - 1]);
    Ok(result)
}
