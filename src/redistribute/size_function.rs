use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    misc::{distance_squared_xy, distance_xy, Extents, FloatingPoint},
};

/// A target element size sampled at arbitrary locations.
pub trait SizeFunction<T: FloatingPoint> {
    fn size_at(&self, point: &Point3<T>) -> T;

    /// Sizes at every point of a polyline.
    fn sizes_along(&self, points: &[Point3<T>]) -> Vec<T> {
        points.iter().map(|p| self.size_at(p)).collect()
    }
}

impl<T: FloatingPoint, F> SizeFunction<T> for F
where
    F: Fn(&Point3<T>) -> T,
{
    fn size_at(&self, point: &Point3<T>) -> T {
        self(point)
    }
}

/// Squared distance below which a sample is treated as coincident with the query.
fn coincident_distance_squared<T: FloatingPoint>() -> T {
    T::from_f64(1e-7).unwrap()
}

/// Weight of a sample at squared distance `d2`.
fn inverse_distance_weight<T: FloatingPoint>(d2: T) -> T {
    if d2 < coincident_distance_squared() {
        T::from_f64(1e11).unwrap()
    } else {
        T::one() / d2
    }
}

/// Inverse distance weighted interpolation of scattered values, with weight `1/d²`.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let idw = InverseDistanceWeighted::try_new(
///     vec![Point3::new(0., 0., 0.), Point3::new(10., 0., 0.)],
///     vec![1f64, 3.],
/// )
/// .unwrap();
/// assert!((idw.size_at(&Point3::new(5., 0., 0.)) - 2.).abs() < 1e-12);
/// assert!((idw.size_at(&Point3::new(10., 0., 0.)) - 3.).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InverseDistanceWeighted<T: FloatingPoint> {
    points: Vec<Point3<T>>,
    values: Vec<T>,
}

impl<T: FloatingPoint> InverseDistanceWeighted<T> {
    pub fn try_new(points: Vec<Point3<T>>, values: Vec<T>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !points.is_empty(),
            MeshingError::InvalidInput("no sample points to interpolate from".to_string())
        );
        anyhow::ensure!(
            points.len() == values.len(),
            MeshingError::LengthMismatch {
                expected: points.len(),
                actual: values.len(),
            }
        );
        Ok(Self { points, values })
    }

    pub fn points(&self) -> &[Point3<T>] {
        &self.points
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: FloatingPoint> SizeFunction<T> for InverseDistanceWeighted<T> {
    fn size_at(&self, point: &Point3<T>) -> T {
        let (sum, weights) = self.points.iter().zip(self.values.iter()).fold(
            (T::zero(), T::zero()),
            |(sum, weights), (p, v)| {
                let w = inverse_distance_weight(distance_squared_xy(point, p));
                (sum + *v * w, weights + w)
            },
        );
        sum / weights
    }
}

/// Implicit size field built from the edge lengths of a polygon and its holes.
///
/// Every ring point carries the mean length of its two edges.
/// When all lengths are within 5% of each other the field is constant;
/// otherwise the point lengths are blended by inverse distance, favouring short edges
/// as `bias` goes to zero, and clamped to the range of edge lengths.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonSizeField<T: FloatingPoint> {
    points: Vec<Point3<T>>,
    lengths: Vec<T>,
    min_length: T,
    max_length: T,
    bias: T,
    constant: Option<T>,
    /// queries closer than this to the previous one reuse its size
    reuse_distance_squared: T,
}

impl<T: FloatingPoint> PolygonSizeField<T> {
    pub fn try_new(outer: &[Point3<T>], inners: &[Vec<Point3<T>>], bias: T) -> anyhow::Result<Self> {
        let mut points = vec![];
        let mut lengths = vec![];
        let mut edge_lengths = vec![];

        for ring in std::iter::once(outer).chain(inners.iter().map(|r| r.as_slice())) {
            let ring = match ring {
                [first, .., last] if first == last => &ring[..ring.len() - 1],
                _ => ring,
            };
            let n = ring.len();
            let start = lengths.len();
            lengths.extend(std::iter::repeat(T::zero()).take(n));
            for i in 0..n {
                let next = (i + 1) % n;
                let l = distance_xy(&ring[i], &ring[next]);
                edge_lengths.push(l);
                let half = l * T::from_f64(0.5).unwrap();
                lengths[start + i] += half;
                lengths[start + next] += half;
            }
            points.extend_from_slice(ring);
        }

        anyhow::ensure!(
            !points.is_empty(),
            MeshingError::InvalidInput("polygon for the size field is empty".to_string())
        );

        let (min_length, max_length) = edge_lengths
            .iter()
            .skip(1)
            .fold((edge_lengths[0], edge_lengths[0]), |(lo, hi), l| {
                (lo.min(*l), hi.max(*l))
            });
        let constant = if (max_length - min_length) / min_length < T::from_f64(0.05).unwrap() {
            Some((max_length + min_length) * T::from_f64(0.5).unwrap())
        } else {
            None
        };
        let diagonal = Extents::from_points(points.iter()).diagonal();

        Ok(Self {
            points,
            lengths,
            min_length,
            max_length,
            bias,
            constant,
            reuse_distance_squared: T::from_f64(1e-4).unwrap() * diagonal * diagonal,
        })
    }

    pub fn bias(&self) -> T {
        self.bias
    }

    pub fn min_length(&self) -> T {
        self.min_length
    }

    pub fn max_length(&self) -> T {
        self.max_length
    }

    /// The size everywhere, when the polygon edges are nearly uniform.
    pub fn constant(&self) -> Option<T> {
        self.constant
    }

    fn interpolate(&self, point: &Point3<T>) -> T {
        let (sum, weights) = self.points.iter().zip(self.lengths.iter()).fold(
            (T::zero(), T::zero()),
            |(sum, weights), (p, l)| {
                let factor = self.min_length + self.bias * (*l - self.min_length);
                let w = inverse_distance_weight(distance_squared_xy(point, p)) * factor;
                (sum + *l * w, weights + w)
            },
        );
        (sum / weights).max(self.min_length).min(self.max_length)
    }
}

impl<T: FloatingPoint> SizeFunction<T> for PolygonSizeField<T> {
    fn size_at(&self, point: &Point3<T>) -> T {
        match self.constant {
            Some(size) => size,
            None => self.interpolate(point),
        }
    }

    fn sizes_along(&self, points: &[Point3<T>]) -> Vec<T> {
        if let Some(size) = self.constant {
            return vec![size; points.len()];
        }
        let mut last: Option<(Point3<T>, T)> = None;
        points
            .iter()
            .map(|p| match last {
                Some((q, size)) if distance_squared_xy(p, &q) < self.reuse_distance_squared => size,
                _ => {
                    let size = self.interpolate(p);
                    last = Some((*p, size));
                    size
                }
            })
            .collect_vec()
    }
}
