use nalgebra::Point3;

use super::{orientation, Extents, FloatingPoint, Orientation};

/// A straight segment between two points, tested in the xy plane.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a, T: FloatingPoint> {
    start: &'a Point3<T>,
    end: &'a Point3<T>,
}

impl<'a, T: FloatingPoint> Segment<'a, T> {
    pub fn new(start: &'a Point3<T>, end: &'a Point3<T>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> &Point3<T> {
        self.start
    }

    pub fn end(&self) -> &Point3<T> {
        self.end
    }

    /// Returns the xy extents of the segment.
    pub fn extents(&self) -> Extents<T> {
        Extents::from_points([self.start, self.end])
    }

    fn has_endpoint(&self, p: &Point3<T>) -> bool {
        (self.start.x == p.x && self.start.y == p.y) || (self.end.x == p.x && self.end.y == p.y)
    }

    /// Robust intersection test between two segments.
    ///
    /// Proper crossings and collinear overlaps intersect. A contact at a vertex
    /// shared by both segments does not, while an endpoint touching the interior
    /// of the other segment does.
    pub fn intersects(&self, other: &Segment<'_, T>) -> bool {
        if !self.extents().overlaps(&other.extents()) {
            return false;
        }

        let p_q1 = orientation(self.start, self.end, other.start);
        let p_q2 = orientation(self.start, self.end, other.end);
        if p_q1.same_side(&p_q2) {
            return false;
        }

        let q_p1 = orientation(other.start, other.end, self.start);
        let q_p2 = orientation(other.start, other.end, self.end);
        if q_p1.same_side(&q_p2) {
            return false;
        }

        let collinear = Orientation::Collinear;
        if p_q1 == collinear && p_q2 == collinear && q_p1 == collinear && q_p2 == collinear {
            return self.collinear_overlap(other);
        }

        // a single contact point: ignore it when it is a vertex of both segments
        let shared = (p_q1 == collinear && self.has_endpoint(other.start))
            || (p_q2 == collinear && self.has_endpoint(other.end))
            || (q_p1 == collinear && other.has_endpoint(self.start))
            || (q_p2 == collinear && other.has_endpoint(self.end));
        !shared
    }

    /// Length of the common stretch of two collinear segments is positive.
    fn collinear_overlap(&self, other: &Segment<'_, T>) -> bool {
        let dx = (self.end.x - self.start.x).abs() + (other.end.x - other.start.x).abs();
        let dy = (self.end.y - self.start.y).abs() + (other.end.y - other.start.y).abs();
        let key = |p: &Point3<T>| if dx >= dy { p.x } else { p.y };
        let (a0, a1) = ordered(key(self.start), key(self.end));
        let (b0, b1) = ordered(key(other.start), key(other.end));
        a0.max(b0) < a1.min(b1)
    }
}

fn ordered<T: FloatingPoint>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
