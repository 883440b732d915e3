use nalgebra::Point3;

use crate::misc::{angle_between, distance_squared_xy, FloatingPoint};

/// Quality of the quad formed by two triangles `(p0, p1, p2)` and `(p3, p2, p1)`
/// sharing the edge `(p1, p2)`, measured by its interior angles.
/// A square scores 1000 and the score falls to 0 as the quad degenerates.
pub fn eta_angle<T: FloatingPoint>(
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
    p3: &Point3<T>,
) -> i64 {
    let pi = T::pi();
    let half_pi = T::frac_pi_2();
    let fold = |a: T| if a > pi { a - pi } else { a };
    let angles = [
        fold(angle_between(p1, p0, p2)),
        fold(angle_between(p3, p1, p0)),
        fold(angle_between(p0, p2, p3)),
        fold(angle_between(p2, p3, p1)),
    ];
    let deviation = angles
        .iter()
        .map(|a| (half_pi - *a).abs())
        .fold(T::zero(), |m, d| m.max(d));
    let eta = (T::one() - deviation / half_pi).max(T::zero());
    round(T::from_f64(1000.0).unwrap() * eta)
}

/// Quality of the quad formed by two triangles `(p0, p1, p2)` and `(p3, p2, p1)`,
/// measured by how far the squared sides are from the squared diagonals.
pub fn eta_distance<T: FloatingPoint>(
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
    p3: &Point3<T>,
) -> i64 {
    let a = distance_squared_xy(p1, p0);
    let b = distance_squared_xy(p0, p2);
    let c = distance_squared_xy(p1, p3);
    let d = distance_squared_xy(p3, p2);
    let e = distance_squared_xy(p1, p2);
    let f = distance_squared_xy(p0, p3);
    let ratio = |sides: T, diagonal: T| (sides / diagonal).max(diagonal / sides);
    let inverse = (ratio(a + b, e) + ratio(c + d, e)).max(ratio(a + c, f) + ratio(b + d, f));
    round(T::from_f64(2000.0).unwrap() / inverse)
}

fn round<T: FloatingPoint>(v: T) -> i64 {
    (v + T::from_f64(0.5).unwrap()).floor().to_i64().unwrap_or(0)
}
