use itertools::Itertools;
use nalgebra::Point3;

use crate::misc::{FloatingPoint, Segment};

use super::{open_ring, Diagnostic, PolygonInput, RingRef, SegmentRef};

/// A ring segment with its address, in flat enumeration order.
struct IndexedSegment<'a, T: FloatingPoint> {
    segment: Segment<'a, T>,
    address: SegmentRef,
}

/// Checks polygons for self-intersections and mutual intersections.
///
/// Segments are enumerated polygon by polygon, outer ring first and then the inner rings in order,
/// segment `j` of a ring joining point `j` to point `j + 1` and the last one closing back to 0.
/// Every pair of segments is tested once, so diagnostics come out in that flat order.
/// ```
/// use nalgebra::Point3;
/// use quadro::prelude::*;
///
/// let bowtie = PolygonInput::new(vec![
///     Point3::new(0., 0., 0.),
///     Point3::new(100., 0., 0.),
///     Point3::new(100., 10., 0.),
///     Point3::new(0., -10., 0.),
/// ]);
/// let diagnostics = TopologyValidator::new().validate(&[bowtie]);
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(
///     diagnostics[0].to_string(),
///     "Error: Input polygon segments intersect. The segment defined by points 0 and 1 of outer polygon 0 intersects with the segment defined by points 2 and 3 of outer polygon 0."
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyValidator;

impl TopologyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Reports every pair of intersecting segments. Rings with fewer than 3 points are skipped.
    pub fn validate<T: FloatingPoint>(&self, polygons: &[PolygonInput<T>]) -> Vec<Diagnostic> {
        let segments = polygons
            .iter()
            .enumerate()
            .flat_map(|(polygon, input)| {
                input.rings().enumerate().flat_map(move |(i, ring)| {
                    let ring_ref = if i == 0 {
                        RingRef::Outer { polygon }
                    } else {
                        RingRef::Inner {
                            polygon,
                            inner: i - 1,
                        }
                    };
                    ring_segments(ring, ring_ref)
                })
            })
            .collect_vec();

        let extents = segments.iter().map(|s| s.segment.extents()).collect_vec();
        let mut diagnostics = vec![];
        for (a, first) in segments.iter().enumerate() {
            for (b, second) in segments.iter().enumerate().skip(a + 1) {
                if extents[a].overlaps(&extents[b]) && first.segment.intersects(&second.segment) {
                    diagnostics.push(Diagnostic::Intersection {
                        first: first.address,
                        second: second.address,
                    });
                }
            }
        }

        #[cfg(feature = "log")]
        log::debug!(
            "topology check: {} segments, {} intersections",
            segments.len(),
            diagnostics.len()
        );

        diagnostics
    }

    /// Checks for missing polygons and degenerate rings before looking for intersections.
    pub fn validate_input<T: FloatingPoint>(&self, polygons: &[PolygonInput<T>]) -> Vec<Diagnostic> {
        if polygons.is_empty() {
            return vec![Diagnostic::NoPolygons];
        }

        let mut diagnostics = vec![];
        for (polygon, input) in polygons.iter().enumerate() {
            for (i, ring) in input.rings().enumerate() {
                let ring_ref = if i == 0 {
                    RingRef::Outer { polygon }
                } else {
                    RingRef::Inner {
                        polygon,
                        inner: i - 1,
                    }
                };
                if ring.is_empty() {
                    diagnostics.push(Diagnostic::EmptyRing(ring_ref));
                } else if distinct_points(ring) < 3 {
                    diagnostics.push(Diagnostic::TooFewPoints(ring_ref));
                }
            }
        }

        diagnostics.extend(self.validate(polygons));
        diagnostics
    }
}

fn ring_segments<T: FloatingPoint>(
    ring: &[Point3<T>],
    ring_ref: RingRef,
) -> impl Iterator<Item = IndexedSegment<'_, T>> {
    let ring = open_ring(ring);
    let n = if ring.len() < 3 { 0 } else { ring.len() };
    (0..n).map(move |start| {
        let end = (start + 1) % n;
        IndexedSegment {
            segment: Segment::new(&ring[start], &ring[end]),
            address: SegmentRef {
                ring: ring_ref,
                start,
                end,
            },
        }
    })
}

fn distinct_points<T: FloatingPoint>(ring: &[Point3<T>]) -> usize {
    let mut distinct: Vec<&Point3<T>> = vec![];
    for p in ring {
        if !distinct.iter().any(|q| q.x == p.x && q.y == p.y) {
            distinct.push(p);
        }
    }
    distinct.len()
}
