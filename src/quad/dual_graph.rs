use nalgebra::Point3;

use crate::{
    misc::{centroid, FloatingPoint},
    progress::Progress,
};

/// Triangle incident to a point, seen from that point:
/// the vertex before it, the vertex after it, and the triangle index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FanEntry {
    pub prior: usize,
    pub next: usize,
    pub cell: usize,
}

impl FanEntry {
    fn new(prior: usize, next: usize, cell: usize) -> Self {
        Self { prior, next, cell }
    }
}

/// Edge shared by two triangles, `(p0, p1)` with `p_left` and `p_right` opposite to it
/// in the left and right triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InteriorEdge {
    pub p0: usize,
    pub p1: usize,
    pub f_left: usize,
    pub f_right: usize,
    pub p_left: usize,
    pub p_right: usize,
}

/// Edge owned by a single triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundaryEdge {
    pub p0: usize,
    pub p1: usize,
    pub cell: usize,
    pub p_left: usize,
}

/// Two boundary triangles around a boundary point, not sharing an edge,
/// that become quads if the point is split in two.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitOption<T: FloatingPoint> {
    pub point: usize,
    pub first: FanEntry,
    pub last: FanEntry,
    /// triangles of the fan between `first` and `last`
    pub middle: Vec<usize>,
    pub location: Point3<T>,
    pub weight: i64,
}

/// Dual graph of a triangulation: triangles are nodes and shared edges are arcs.
#[derive(Debug, Clone)]
pub(crate) struct DualGraph<T: FloatingPoint> {
    pub interior: Vec<InteriorEdge>,
    pub boundary: Vec<BoundaryEdge>,
    pub splits: Vec<SplitOption<T>>,
}

impl<T: FloatingPoint> DualGraph<T> {
    /// Walk the triangle fan of every point.
    /// Interior edges are emitted once, by their lower point.
    pub fn try_new(
        points: &[Point3<T>],
        triangles: &[[usize; 3]],
        split_weight: i64,
        progress: Option<&Progress>,
    ) -> anyhow::Result<Self> {
        let fans = point_fans(points.len(), triangles);

        let n = fans.len();
        let mut interior_blocks = Vec::with_capacity(n);
        let mut boundary_blocks = Vec::with_capacity(n);
        let mut splits = vec![];
        for (p, fan) in fans.into_iter().enumerate() {
            if let Some(progress) = progress {
                if p % 256 == 0 {
                    progress.report(p, n, "building dual graph")?;
                }
            }
            let chains = sort_into_chains(fan);
            let (interior, boundary) =
                process_chains(p, chains, points, split_weight, &mut splits);
            interior_blocks.push(interior);
            boundary_blocks.push(boundary);
        }

        // later points come first
        let interior = interior_blocks.into_iter().rev().flatten().collect();
        let boundary = boundary_blocks.into_iter().rev().flatten().collect();

        Ok(Self {
            interior,
            boundary,
            splits,
        })
    }

    pub fn set_split_weight(&mut self, weight: i64) {
        self.splits.iter_mut().for_each(|s| s.weight = weight);
    }
}

/// Triangles incident to each point, in triangle order.
pub(crate) fn point_fans(num_points: usize, triangles: &[[usize; 3]]) -> Vec<Vec<FanEntry>> {
    let mut fans = vec![vec![]; num_points];
    triangles.iter().enumerate().for_each(|(i, &[p0, p1, p2])| {
        fans[p0].push(FanEntry::new(p2, p1, i));
        fans[p1].push(FanEntry::new(p0, p2, i));
        fans[p2].push(FanEntry::new(p1, p0, i));
    });
    fans
}

/// Sort the fan of a point into chains where each entry's `next` is the following entry's `prior`.
/// A point with several chains is a pinch point between boundary segments.
pub(crate) fn sort_into_chains(fan: Vec<FanEntry>) -> Vec<Vec<FanEntry>> {
    let mut chains: Vec<Vec<FanEntry>> = vec![];
    let mut remaining = fan;
    let mut chain = vec![];
    let mut index = 0;
    while !remaining.is_empty() {
        let entry = remaining.remove(index);
        let p = entry.next;
        chain.push(entry);
        match remaining.iter().position(|e| e.prior == p) {
            Some(i) => index = i,
            None => {
                index = 0;
                let finished = std::mem::take(&mut chain);
                match chains.iter_mut().find(|c| c[0].prior == p) {
                    Some(head) => {
                        head.splice(0..0, finished);
                    }
                    None => chains.push(finished),
                }
            }
        }
    }
    chains
}

fn process_chains<T: FloatingPoint>(
    p: usize,
    mut chains: Vec<Vec<FanEntry>>,
    points: &[Point3<T>],
    split_weight: i64,
    splits: &mut Vec<SplitOption<T>>,
) -> (Vec<InteriorEdge>, Vec<BoundaryEdge>) {
    match chains.len() {
        0 => (vec![], vec![]),
        1 => {
            let mut chain = chains.remove(0);
            let (first, last) = (chain[0], chain[chain.len() - 1]);
            if last.next == first.prior {
                // closed fan around an interior point
                chain.push(first);
                (interior_edges(p, &chain), vec![])
            } else {
                let interior = interior_edges(p, &chain);
                let boundary = boundary_edge(p, &chain, points, split_weight, splits);
                (interior, vec![boundary])
            }
        }
        _ => {
            let mut interior = vec![];
            let mut boundary = vec![];
            for chain in chains.iter() {
                interior.splice(0..0, interior_edges(p, chain));
                boundary.push(boundary_edge(p, chain, points, split_weight, splits));
            }
            (interior, boundary)
        }
    }
}

fn interior_edges(p: usize, chain: &[FanEntry]) -> Vec<InteriorEdge> {
    chain
        .windows(2)
        .filter(|w| w[1].prior > p)
        .map(|w| InteriorEdge {
            p0: p,
            p1: w[1].prior,
            f_left: w[0].cell,
            f_right: w[1].cell,
            p_left: w[0].prior,
            p_right: w[1].next,
        })
        .collect()
}

fn boundary_edge<T: FloatingPoint>(
    p: usize,
    chain: &[FanEntry],
    points: &[Point3<T>],
    split_weight: i64,
    splits: &mut Vec<SplitOption<T>>,
) -> BoundaryEdge {
    let first = chain[0];
    let last = chain[chain.len() - 1];

    if chain.len() > 2 {
        let middle = chain[chain.len() >> 1];
        let location = if chain.len() % 2 == 1 {
            centroid([&points[p], &points[middle.prior], &points[middle.next]])
        } else {
            centroid([&points[p], &points[middle.prior]])
        };
        splits.push(SplitOption {
            point: p,
            first,
            last,
            middle: chain[1..chain.len() - 1].iter().map(|e| e.cell).collect(),
            location,
            weight: split_weight,
        });
    }

    BoundaryEdge {
        p0: p,
        p1: last.next,
        cell: last.cell,
        p_left: last.prior,
    }
}
