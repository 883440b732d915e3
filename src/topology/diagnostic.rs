use std::fmt;

/// A ring of the input, addressed by polygon index and inner ring index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RingRef {
    Outer { polygon: usize },
    Inner { polygon: usize, inner: usize },
}

impl RingRef {
    pub fn polygon(&self) -> usize {
        match self {
            RingRef::Outer { polygon } | RingRef::Inner { polygon, .. } => *polygon,
        }
    }
}

impl fmt::Display for RingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingRef::Outer { polygon } => write!(f, "outer polygon {}", polygon),
            RingRef::Inner { polygon, inner } => {
                write!(f, "inner polygon {} of outer polygon {}", inner, polygon)
            }
        }
    }
}

/// A ring segment running from point `start` to point `end` of the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentRef {
    pub ring: RingRef,
    pub start: usize,
    pub end: usize,
}

/// A problem found in the input polygons.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Diagnostic {
    /// Two segments cross, touch or overlap.
    Intersection { first: SegmentRef, second: SegmentRef },
    /// No polygons were given.
    NoPolygons,
    /// A ring without points.
    EmptyRing(RingRef),
    /// A ring with fewer than 3 distinct points.
    TooFewPoints(RingRef),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Intersection { first, second } => write!(
                f,
                "Error: Input polygon segments intersect. The segment defined by points {} and {} of {} intersects with the segment defined by points {} and {} of {}.",
                first.start, first.end, first.ring, second.start, second.end, second.ring
            ),
            Diagnostic::NoPolygons => {
                write!(f, "Error: Per polygon input is empty. No polygons to mesh.")
            }
            Diagnostic::EmptyRing(ring) => write!(f, "Error: {} is empty.", Capitalized(ring)),
            Diagnostic::TooFewPoints(ring) => {
                write!(f, "Error: {} has fewer than 3 points.", Capitalized(ring))
            }
        }
    }
}

/// Ring name at the start of a sentence.
struct Capitalized<'a>(&'a RingRef);

impl fmt::Display for Capitalized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RingRef::Outer { polygon } => write!(f, "Outer polygon {}", polygon),
            RingRef::Inner { polygon, inner } => {
                write!(f, "Inner polygon {} of outer polygon {}", inner, polygon)
            }
        }
    }
}

/// Renders diagnostics one per line, behind a `---` separator.
/// An empty report renders nothing.
/// ```
/// use quadro::prelude::*;
///
/// let report = Report::new(vec![Diagnostic::NoPolygons]);
/// assert_eq!(
///     report.to_string(),
///     "---Error: Per polygon input is empty. No polygons to mesh.\n"
/// );
/// assert_eq!(Report::new(vec![]).to_string(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl From<Vec<Diagnostic>> for Report {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return Ok(());
        }
        write!(f, "---")?;
        for d in self.diagnostics.iter() {
            writeln!(f, "{}", d)?;
        }
        Ok(())
    }
}
