use nalgebra::Point3;
use num_traits::NumCast;
use robust::{orient2d, Coord};

use super::FloatingPoint;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

impl Orientation {
    /// Returns true if both orientations put their points strictly on the same side.
    pub fn same_side(&self, other: &Orientation) -> bool {
        matches!(
            (self, other),
            (Orientation::Clockwise, Orientation::Clockwise)
                | (Orientation::CounterClockwise, Orientation::CounterClockwise)
        )
    }
}

fn coord<T: FloatingPoint>(p: &Point3<T>) -> Coord<f64> {
    Coord {
        x: <f64 as NumCast>::from(p.x).unwrap(),
        y: <f64 as NumCast>::from(p.y).unwrap(),
    }
}

/// Robust orientation test for three points projected onto the xy plane.
/// implementation from geo crate. (https://github.com/georust/geo)
pub fn orientation<T: FloatingPoint>(p: &Point3<T>, q: &Point3<T>, r: &Point3<T>) -> Orientation {
    let orientation = orient2d(coord(p), coord(q), coord(r));

    if orientation < 0. {
        Orientation::Clockwise
    } else if orientation > 0. {
        Orientation::CounterClockwise
    } else {
        Orientation::Collinear
    }
}
