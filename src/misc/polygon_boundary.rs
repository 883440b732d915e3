use itertools::Itertools;
use nalgebra::Point3;

use super::{orientation, FloatingPoint, Orientation};

/// A closed ring of points used for point-in-polygon queries in the xy plane.
/// Either winding is accepted and a duplicated closing point is harmless.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonBoundary<T: FloatingPoint> {
    vertices: Vec<Point3<T>>,
}

impl<T: FloatingPoint> PolygonBoundary<T> {
    pub fn new(vertices: Vec<Point3<T>>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point3<T>] {
        &self.vertices
    }

    /// Check if a point is contained in the ring by its winding number.
    /// ```
    /// use nalgebra::Point3;
    /// use quadro::prelude::PolygonBoundary;
    /// let boundary = PolygonBoundary::new(vec![
    ///   Point3::new(0., 0., 0.),
    ///   Point3::new(1., 0., 0.),
    ///   Point3::new(1., 1., 0.),
    ///   Point3::new(0., 1., 0.),
    /// ]);
    /// assert!(boundary.contains(&Point3::new(0.5, 0.5, 0.)));
    /// assert!(!boundary.contains(&Point3::new(0.5, 1.5, 0.)));
    /// ```
    pub fn contains(&self, c: &Point3<T>) -> bool {
        let winding_number = self.vertices.iter().circular_tuple_windows().fold(
            0_i32,
            move |winding_number, (p0, p1)| {
                if p0.y <= c.y {
                    if p1.y >= c.y {
                        let o = orientation(p0, p1, c);
                        if o == Orientation::CounterClockwise && p1.y != c.y {
                            return winding_number + 1;
                        }
                    }
                } else if p1.y <= c.y {
                    let o = orientation(p0, p1, c);
                    if o == Orientation::Clockwise {
                        return winding_number - 1;
                    }
                }
                winding_number
            },
        );
        winding_number != 0
    }
}

impl<T: FloatingPoint> FromIterator<Point3<T>> for PolygonBoundary<T> {
    fn from_iter<I: IntoIterator<Item = Point3<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
