use nalgebra::Point3;

use crate::misc::FloatingPoint;

/// An outer ring with optional holes.
///
/// Rings are implicitly closed and their orientation does not matter.
/// A closing point repeating the first one is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonInput<T: FloatingPoint> {
    outer: Vec<Point3<T>>,
    inners: Vec<Vec<Point3<T>>>,
}

impl<T: FloatingPoint> PolygonInput<T> {
    pub fn new(outer: Vec<Point3<T>>) -> Self {
        Self {
            outer,
            inners: vec![],
        }
    }

    pub fn with_inner(mut self, inner: Vec<Point3<T>>) -> Self {
        self.inners.push(inner);
        self
    }

    pub fn with_inners(mut self, inners: Vec<Vec<Point3<T>>>) -> Self {
        self.inners.extend(inners);
        self
    }

    pub fn outer(&self) -> &[Point3<T>] {
        &self.outer
    }

    pub fn inners(&self) -> &[Vec<Point3<T>>] {
        &self.inners
    }

    /// The outer ring followed by the inner rings.
    pub fn rings(&self) -> impl Iterator<Item = &[Point3<T>]> {
        std::iter::once(self.outer.as_slice()).chain(self.inners.iter().map(|r| r.as_slice()))
    }
}

/// Drops a closing point equal to the first one.
pub(crate) fn open_ring<T: FloatingPoint>(ring: &[Point3<T>]) -> &[Point3<T>] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}
