use itertools::Itertools;
use nalgebra::Point3;

use crate::{
    error::MeshingError,
    misc::{circumcircle_curvature, distance_xy, lerp, Extents, FloatingPoint},
};

/// Options for redistributing a polyline by its curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvatureOptions<T> {
    /// half-width of the window used to measure curvature
    feature_size: T,
    /// average spacing of the output points
    mean_spacing: T,
    minimum_curvature: T,
    smooth: bool,
}

impl<T: FloatingPoint> Default for CurvatureOptions<T> {
    fn default() -> Self {
        Self {
            feature_size: T::one(),
            mean_spacing: T::one(),
            minimum_curvature: T::from_f64(0.001).unwrap(),
            smooth: false,
        }
    }
}

impl<T: FloatingPoint> CurvatureOptions<T> {
    pub fn new(feature_size: T, mean_spacing: T) -> Self {
        Self {
            feature_size,
            mean_spacing,
            ..Default::default()
        }
    }

    pub fn feature_size(&self) -> T {
        self.feature_size
    }

    pub fn mean_spacing(&self) -> T {
        self.mean_spacing
    }

    pub fn minimum_curvature(&self) -> T {
        self.minimum_curvature
    }

    pub fn smooth(&self) -> bool {
        self.smooth
    }

    pub fn with_feature_size(mut self, feature_size: T) -> Self {
        self.feature_size = feature_size;
        self
    }

    pub fn with_mean_spacing(mut self, mean_spacing: T) -> Self {
        self.mean_spacing = mean_spacing;
        self
    }

    pub fn with_minimum_curvature(mut self, minimum_curvature: T) -> Self {
        self.minimum_curvature = minimum_curvature;
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub(crate) fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.feature_size > T::zero(),
            MeshingError::invalid_parameter("feature_size", self.feature_size, "must be positive")
        );
        anyhow::ensure!(
            self.mean_spacing > T::zero(),
            MeshingError::invalid_parameter("mean_spacing", self.mean_spacing, "must be positive")
        );
        anyhow::ensure!(
            self.minimum_curvature >= T::zero(),
            MeshingError::invalid_parameter(
                "minimum_curvature",
                self.minimum_curvature,
                "must not be negative"
            )
        );
        Ok(())
    }
}

/// A curvature value sampled at a normalized arc-length parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CurvatureSample<T> {
    pub parameter: T,
    pub curvature: T,
}

/// Arc-length parameterization of a polyline used to distribute points by curvature.
#[derive(Debug, Clone)]
pub(crate) struct CurvatureProfile<'a, T: FloatingPoint> {
    points: &'a [Point3<T>],
    /// accumulated length at the start of each segment
    stations: Vec<T>,
    segment_lengths: Vec<T>,
    length: T,
    closed: bool,
    tolerance: T,
}

impl<'a, T: FloatingPoint> CurvatureProfile<'a, T> {
    pub fn new(points: &'a [Point3<T>]) -> Self {
        let segment_lengths = points
            .windows(2)
            .map(|w| distance_xy(&w[0], &w[1]))
            .collect_vec();
        let mut stations = Vec::with_capacity(segment_lengths.len());
        let mut length = T::zero();
        for l in segment_lengths.iter() {
            stations.push(length);
            length += *l;
        }
        let closed = points.len() > 2 && points.first() == points.last();
        let tolerance = Extents::from_points(points.iter()).diagonal() * T::from_f64(1e-9).unwrap();
        Self {
            points,
            stations,
            segment_lengths,
            length,
            closed,
            tolerance,
        }
    }

    pub fn length(&self) -> T {
        self.length
    }

    /// Point at normalized arc-length `t`, clamped to `[0, 1]`.
    pub fn point_at(&self, t: T) -> Point3<T> {
        let t = t.max(T::zero()).min(T::one());
        let station = t * self.length;
        let segment = self
            .stations
            .iter()
            .rposition(|s| *s < station)
            .unwrap_or(0);
        let l = self.segment_lengths[segment];
        let local = if l > T::zero() {
            (station - self.stations[segment]) / l
        } else {
            T::zero()
        };
        lerp(
            &self.points[segment],
            &self.points[segment + 1],
            local.max(T::zero()).min(T::one()),
        )
    }

    /// Parameters where curvature changes: the vertices, plus points near the ends of long segments
    /// (or segment midpoints) where the curvature is zero.
    /// Returns the parameters with a flag telling whether the curvature must be measured there.
    pub fn significant_parameters(&self, feature_size: T) -> Vec<(T, bool)> {
        let half = T::from_f64(0.5).unwrap();
        let mut parameters = vec![];
        for (i, l) in self.segment_lengths.iter().enumerate() {
            let start = self.stations[i] / self.length;
            parameters.push((start, true));
            let end = (self.stations[i] + *l) / self.length;
            if *l > feature_size {
                let offset = feature_size * half / self.length;
                parameters.push((start + offset, false));
                parameters.push((end - offset, false));
            } else {
                parameters.push(((start + end) * half, false));
            }
        }
        parameters.push((T::one(), true));
        parameters
    }

    fn curvature_at(&self, parameter: T, feature_size: T, minimum_curvature: T) -> T {
        let interval = feature_size / self.length;
        let mut start = parameter - interval;
        let mut end = parameter + interval;
        let mut middle = parameter;
        if self.closed {
            if start < T::zero() {
                start += T::one();
            }
            if end > T::one() {
                end -= T::one();
            }
        } else if start < T::zero() {
            start = T::zero();
            middle = (start + end) * T::from_f64(0.5).unwrap();
        } else if end > T::one() {
            end = T::one();
            middle = (start + end) * T::from_f64(0.5).unwrap();
        }
        let k = circumcircle_curvature(
            &self.point_at(start),
            &self.point_at(middle),
            &self.point_at(end),
            self.tolerance,
        );
        minimum_curvature.max(k.abs())
    }

    pub fn curvatures(&self, feature_size: T, minimum_curvature: T) -> Vec<CurvatureSample<T>> {
        self.significant_parameters(feature_size)
            .into_iter()
            .map(|(parameter, measured)| CurvatureSample {
                parameter,
                curvature: if measured {
                    self.curvature_at(parameter, feature_size, minimum_curvature)
                } else {
                    T::zero()
                },
            })
            .collect()
    }

    /// Moves every sample to the middle of its interval and accumulates curvature along the line.
    pub fn accumulate(&self, samples: &[CurvatureSample<T>]) -> Vec<CurvatureSample<T>> {
        let half = T::from_f64(0.5).unwrap();
        let n = samples.len();
        let mid = |i: usize| (samples[i - 1].parameter + samples[i].parameter) * half;
        let sample = |parameter: T, curvature: T| CurvatureSample {
            parameter,
            curvature,
        };

        if !self.closed {
            let mut accumulated = Vec::with_capacity(n + 1);
            accumulated.push(sample(T::zero(), T::zero()));
            let mut total = T::zero();
            for i in 1..n {
                total += samples[i - 1].curvature;
                accumulated.push(sample(mid(i), total));
            }
            accumulated.push(sample(T::one(), total));
            return accumulated;
        }

        // the wrapped sample at zero blends the last interval into the first one
        let last = &samples[n - 2];
        let tail = T::one() - last.parameter;
        let wrapped = last.curvature
            + tail / (tail + samples[1].parameter) * (samples[0].curvature - last.curvature);

        let mut shifted = Vec::with_capacity(n + 1);
        shifted.push(sample(T::zero(), wrapped));
        shifted.extend((1..n).map(|i| sample(mid(i), samples[i - 1].curvature)));
        shifted.push(sample(T::one(), wrapped));

        let mut accumulated = Vec::with_capacity(shifted.len());
        accumulated.push(sample(T::zero(), T::zero()));
        let mut total = shifted[1].curvature - shifted[0].curvature;
        accumulated.push(sample(shifted[1].parameter, total));
        for s in shifted.iter().skip(2) {
            total += s.curvature;
            accumulated.push(sample(s.parameter, total));
        }
        accumulated
    }

    /// `n` points spaced so that each interval holds the same amount of accumulated curvature.
    /// Both end points are kept. A line without curvature gets evenly spaced points.
    pub fn place_points(&self, accumulated: &[CurvatureSample<T>], n: usize) -> Vec<Point3<T>> {
        let n = n.max(2);
        let steps = T::from_usize(n - 1).unwrap();
        let total = accumulated
            .last()
            .map(|s| s.curvature)
            .unwrap_or_else(T::zero);

        let mut points = Vec::with_capacity(n);
        points.push(self.points[0]);
        if total > T::zero() {
            let delta = total / steps;
            let tolerance = (total - delta * steps).abs() * T::from_f64(10.).unwrap();
            let mut threshold = delta;
            'windows: for w in accumulated.windows(2) {
                let (a, b) = (&w[0], &w[1]);
                while b.curvature - threshold > tolerance {
                    if points.len() >= n - 1 {
                        break 'windows;
                    }
                    let span = b.curvature - a.curvature;
                    let t = if span > T::zero() {
                        (threshold - a.curvature) / span
                    } else {
                        T::zero()
                    };
                    points.push(self.point_at(a.parameter + t * (b.parameter - a.parameter)));
                    threshold += delta;
                }
            }
        } else {
            points.extend((1..n - 1).map(|i| self.point_at(T::from_usize(i).unwrap() / steps)));
        }
        points.push(self.points[self.points.len() - 1]);
        points
    }
}

/// Rolling `[¼, ½, ¼]` average of the interior curvature values.
pub(crate) fn smooth_samples<T: FloatingPoint>(samples: &[CurvatureSample<T>]) -> Vec<CurvatureSample<T>> {
    let quarter = T::from_f64(0.25).unwrap();
    let half = T::from_f64(0.5).unwrap();
    let mut smoothed = samples.to_vec();
    for i in 1..samples.len().saturating_sub(1) {
        smoothed[i].curvature = (samples[i - 1].curvature + samples[i + 1].curvature) * quarter
            + samples[i].curvature * half;
    }
    smoothed
}

/// Redistributes a polyline so that the point density follows its curvature.
pub fn redistribute_by_curvature<T: FloatingPoint>(
    points: &[Point3<T>],
    options: &CurvatureOptions<T>,
) -> anyhow::Result<Vec<Point3<T>>> {
    options.validate()?;
    let profile = CurvatureProfile::new(points);
    anyhow::ensure!(
        profile.length() > T::zero(),
        MeshingError::InvalidInput("polyline has zero length".to_string())
    );

    let n = (profile.length() / options.mean_spacing())
        .floor()
        .to_usize()
        .unwrap_or(2);
    let samples = profile.curvatures(options.feature_size(), options.minimum_curvature());
    let accumulated = profile.accumulate(&samples);
    let accumulated = if options.smooth() {
        smooth_samples(&accumulated)
    } else {
        accumulated
    };
    let placed = profile.place_points(&accumulated, n);

    #[cfg(feature = "log")]
    log::debug!(
        "curvature redistribution: {} points -> {} points",
        points.len(),
        placed.len()
    );

    Ok(placed)
}
