use nalgebra::Point3;

use super::FloatingPoint;

/// Squared distance between two points, ignoring z.
pub fn distance_squared_xy<T: FloatingPoint>(a: &Point3<T>, b: &Point3<T>) -> T {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Distance between two points, ignoring z.
pub fn distance_xy<T: FloatingPoint>(a: &Point3<T>, b: &Point3<T>) -> T {
    distance_squared_xy(a, b).sqrt()
}

/// Linear interpolation between two points, z included.
pub fn lerp<T: FloatingPoint>(a: &Point3<T>, b: &Point3<T>, t: T) -> Point3<T> {
    a + (b - a) * t
}

/// Average of a set of points, z included.
pub fn centroid<'a, T: FloatingPoint>(points: impl IntoIterator<Item = &'a Point3<T>>) -> Point3<T> {
    let (sum, n) = points
        .into_iter()
        .fold((Point3::<T>::origin().coords, 0usize), |(sum, n), p| {
            (sum + p.coords, n + 1)
        });
    if n == 0 {
        return Point3::origin();
    }
    (sum / T::from_usize(n).unwrap()).into()
}

/// Twice the signed area of the triangle (a, b, c) in the xy plane.
pub fn cross_xy<T: FloatingPoint>(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>) -> T {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Curvature (inverse circumradius) of the circle through three points.
/// Returns zero when the points are collinear or any two of them are closer than `tolerance`.
pub fn circumcircle_curvature<T: FloatingPoint>(
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    tolerance: T,
) -> T {
    let ab = distance_xy(a, b);
    let bc = distance_xy(b, c);
    let ca = distance_xy(c, a);
    if ab <= tolerance || bc <= tolerance || ca <= tolerance {
        return T::zero();
    }
    let two = T::from_f64(2.0).unwrap();
    two * cross_xy(a, b, c).abs() / (ab * bc * ca)
}

/// Counter-clockwise angle swept from `pc -> p0` to `pc -> p1`, in `[0, 2π)`.
pub fn angle_between<T: FloatingPoint>(p0: &Point3<T>, pc: &Point3<T>, p1: &Point3<T>) -> T {
    let a0 = (p0.y - pc.y).atan2(p0.x - pc.x);
    let a1 = (p1.y - pc.y).atan2(p1.x - pc.x);
    let mut angle = a0 - a1;
    let tau = T::two_pi();
    while angle < T::zero() {
        angle += tau;
    }
    while angle >= tau {
        angle -= tau;
    }
    angle
}

/// Axis aligned xy extents of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents<T> {
    pub min_x: T,
    pub min_y: T,
    pub max_x: T,
    pub max_y: T,
}

impl<T: FloatingPoint> Extents<T> {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<T>>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self {
                min_x: T::zero(),
                min_y: T::zero(),
                max_x: T::zero(),
                max_y: T::zero(),
            };
        };
        iter.fold(
            Self {
                min_x: first.x,
                min_y: first.y,
                max_x: first.x,
                max_y: first.y,
            },
            |e, p| Self {
                min_x: e.min_x.min(p.x),
                min_y: e.min_y.min(p.y),
                max_x: e.max_x.max(p.x),
                max_y: e.max_y.max(p.y),
            },
        )
    }

    /// Inclusive overlap test.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> T {
        let dx = self.max_x - self.min_x;
        let dy = self.max_y - self.min_y;
        (dx * dx + dy * dy).sqrt()
    }
}
