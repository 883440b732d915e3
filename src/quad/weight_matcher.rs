//! Maximum weight matching in general graphs.
//!
//! Edmonds' blossom algorithm with dual variables, `O(n³)`. The search runs as a
//! state machine over index arrays: vertices are `0..n`, blossoms are `n..2n`,
//! and every edge `k` owns the two endpoint slots `2k` and `2k + 1`.

use itertools::Itertools;

use crate::progress::Progress;

const NONE: usize = usize::MAX;

/// An undirected weighted edge between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEdge {
    pub i: usize,
    pub j: usize,
    pub weight: i64,
}

impl WeightedEdge {
    pub fn new(i: usize, j: usize, weight: i64) -> Self {
        Self { i, j, weight }
    }
}

impl From<(usize, usize, i64)> for WeightedEdge {
    fn from((i, j, weight): (usize, usize, i64)) -> Self {
        Self::new(i, j, weight)
    }
}

/// Result of a matching: the partner of every node and the edge used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matching {
    mates: Vec<Option<usize>>,
    edges: Vec<Option<usize>>,
}

impl Matching {
    /// Partner of each node, `None` if the node is unmatched.
    pub fn mates(&self) -> &[Option<usize>] {
        &self.mates
    }

    /// Index of the matched edge at each node.
    pub fn edges(&self) -> &[Option<usize>] {
        &self.edges
    }

    /// Matched edge indices, each reported once, ordered by their lower node.
    pub fn matched_edges(&self) -> Vec<usize> {
        self.mates
            .iter()
            .enumerate()
            .filter_map(|(i, mate)| match mate {
                Some(j) if *j > i => self.edges[i],
                _ => None,
            })
            .collect_vec()
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.mates.iter().flatten().count() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maximum weight matcher.
///
/// With `max_cardinality` set, only maximum-cardinality matchings are considered
/// and the heaviest among them is returned.
/// ```
/// use quadro::prelude::{WeightMatcher, WeightedEdge};
/// let edges = [(1, 2, 5), (2, 3, 11), (3, 4, 5)].map(WeightedEdge::from);
/// let matching = WeightMatcher::new(&edges).solve(false).unwrap();
/// assert_eq!(matching.mates(), &[None, None, Some(3), Some(2), None]);
/// let matching = WeightMatcher::new(&edges).solve(true).unwrap();
/// assert_eq!(matching.mates(), &[None, Some(2), Some(1), Some(4), Some(3)]);
/// ```
pub struct WeightMatcher<'a> {
    edges: &'a [WeightedEdge],
    progress: Option<&'a Progress>,
}

impl<'a> WeightMatcher<'a> {
    pub fn new(edges: &'a [WeightedEdge]) -> Self {
        Self {
            edges,
            progress: None,
        }
    }

    /// Poll a progress callback once per stage.
    pub fn with_progress(mut self, progress: &'a Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn solve(&self, max_cardinality: bool) -> anyhow::Result<Matching> {
        if self.edges.is_empty() {
            return Ok(Matching::default());
        }
        anyhow::ensure!(
            self.edges.iter().all(|e| e.i != e.j),
            crate::error::MeshingError::InvalidInput("matching graph contains a self loop".into())
        );
        let mut state = State::new(self.edges);
        state.run(max_cardinality, self.progress)?;
        Ok(state.into_matching())
    }
}

struct State<'a> {
    edges: &'a [WeightedEdge],
    n: usize,
    endpoint: Vec<usize>,
    neighbend: Vec<Vec<usize>>,
    /// endpoint slot of the matched partner
    mate: Vec<usize>,
    /// 0 free, 1 S, 2 T, 5 S while scanning, -1 expanded
    label: Vec<i8>,
    labelend: Vec<usize>,
    inblossom: Vec<usize>,
    blossomparent: Vec<usize>,
    blossomchilds: Vec<Vec<usize>>,
    blossombase: Vec<usize>,
    blossomendps: Vec<Vec<usize>>,
    bestedge: Vec<usize>,
    blossombestedges: Vec<Option<Vec<usize>>>,
    unusedblossoms: Vec<usize>,
    dualvar: Vec<i64>,
    allowedge: Vec<bool>,
    queue: Vec<usize>,
}

impl<'a> State<'a> {
    fn new(edges: &'a [WeightedEdge]) -> Self {
        let n = edges.iter().map(|e| e.i.max(e.j) + 1).max().unwrap_or(0);
        let max_weight = edges.iter().map(|e| e.weight).max().unwrap_or(0).max(0);
        let endpoint = edges.iter().flat_map(|e| [e.i, e.j]).collect_vec();
        let mut neighbend = vec![vec![]; n];
        edges.iter().enumerate().for_each(|(k, e)| {
            neighbend[e.i].push(2 * k + 1);
            neighbend[e.j].push(2 * k);
        });

        Self {
            edges,
            n,
            endpoint,
            neighbend,
            mate: vec![NONE; n],
            label: vec![0; 2 * n],
            labelend: vec![NONE; 2 * n],
            inblossom: (0..n).collect(),
            blossomparent: vec![NONE; 2 * n],
            blossomchilds: vec![vec![]; 2 * n],
            blossombase: (0..n).chain(std::iter::repeat(NONE).take(n)).collect(),
            blossomendps: vec![vec![]; 2 * n],
            bestedge: vec![NONE; 2 * n],
            blossombestedges: vec![None; 2 * n],
            unusedblossoms: (n..2 * n).collect(),
            dualvar: std::iter::repeat(max_weight)
                .take(n)
                .chain(std::iter::repeat(0).take(n))
                .collect(),
            allowedge: vec![false; edges.len()],
            queue: vec![],
        }
    }

    fn into_matching(self) -> Matching {
        let mates = self
            .mate
            .iter()
            .map(|p| (*p != NONE).then(|| self.endpoint[*p]))
            .collect();
        let edges = self
            .mate
            .iter()
            .map(|p| (*p != NONE).then_some(*p / 2))
            .collect();
        Matching { mates, edges }
    }

    fn slack(&self, k: usize) -> i64 {
        let e = &self.edges[k];
        self.dualvar[e.i] + self.dualvar[e.j] - 2 * e.weight
    }

    /// Vertices contained in a (possibly nested) blossom, depth first.
    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        let mut leaves = vec![];
        self.collect_leaves(b, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, b: usize, leaves: &mut Vec<usize>) {
        if b < self.n {
            leaves.push(b);
        } else {
            for &t in &self.blossomchilds[b] {
                self.collect_leaves(t, leaves);
            }
        }
    }

    fn assign_label(&mut self, w: usize, t: i8, p: usize) {
        let b = self.inblossom[w];
        debug_assert!(self.label[w] == 0 && self.label[b] == 0);
        self.label[w] = t;
        self.label[b] = t;
        self.labelend[w] = p;
        self.labelend[b] = p;
        self.bestedge[w] = NONE;
        self.bestedge[b] = NONE;
        if t == 1 {
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
        } else if t == 2 {
            let base = self.blossombase[b];
            let mate = self.mate[base];
            debug_assert!(mate != NONE);
            self.assign_label(self.endpoint[mate], 1, mate ^ 1);
        }
    }

    /// Trace back from v and w to discover a new blossom or an augmenting path.
    /// Returns the base vertex of the new blossom, or NONE.
    fn scan_blossom(&mut self, mut v: usize, mut w: usize) -> usize {
        let mut path = vec![];
        let mut base = NONE;
        while v != NONE || w != NONE {
            let mut b = self.inblossom[v];
            if self.label[b] & 4 != 0 {
                base = self.blossombase[b];
                break;
            }
            debug_assert_eq!(self.label[b], 1);
            path.push(b);
            self.label[b] = 5;
            if self.labelend[b] == NONE {
                v = NONE;
            } else {
                v = self.endpoint[self.labelend[b]];
                b = self.inblossom[v];
                debug_assert_eq!(self.label[b], 2);
                v = self.endpoint[self.labelend[b]];
            }
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        path.into_iter().for_each(|b| self.label[b] = 1);
        base
    }

    fn add_blossom(&mut self, base: usize, k: usize) {
        let WeightedEdge { i: mut v, j: mut w, .. } = self.edges[k];
        let bb = self.inblossom[base];
        let mut bv = self.inblossom[v];
        let mut bw = self.inblossom[w];
        let Some(b) = self.unusedblossoms.pop() else {
            return;
        };
        self.blossombase[b] = base;
        self.blossomparent[b] = NONE;
        self.blossomparent[bb] = b;

        let mut path = vec![];
        let mut endps = vec![];
        while bv != bb {
            self.blossomparent[bv] = b;
            path.push(bv);
            endps.push(self.labelend[bv]);
            v = self.endpoint[self.labelend[bv]];
            bv = self.inblossom[v];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);
        while bw != bb {
            self.blossomparent[bw] = b;
            path.push(bw);
            endps.push(self.labelend[bw] ^ 1);
            w = self.endpoint[self.labelend[bw]];
            bw = self.inblossom[w];
        }
        debug_assert_eq!(self.label[bb], 1);
        self.blossomchilds[b] = path.clone();
        self.blossomendps[b] = endps;
        self.label[b] = 1;
        self.labelend[b] = self.labelend[bb];
        self.dualvar[b] = 0;

        for v in self.blossom_leaves(b) {
            if self.label[self.inblossom[v]] == 2 {
                // T-vertices become S-vertices inside the new blossom
                self.queue.push(v);
            }
            self.inblossom[v] = b;
        }

        // least-slack edges to neighbouring S-blossoms
        let mut bestedgeto = vec![NONE; 2 * self.n];
        for &bv in &path {
            let nblists: Vec<Vec<usize>> = match self.blossombestedges[bv].take() {
                Some(list) => vec![list],
                None => self
                    .blossom_leaves(bv)
                    .into_iter()
                    .map(|v| self.neighbend[v].iter().map(|p| p / 2).collect())
                    .collect(),
            };
            for k in nblists.into_iter().flatten() {
                let WeightedEdge { i, j, .. } = self.edges[k];
                let j = if self.inblossom[j] == b { i } else { j };
                let bj = self.inblossom[j];
                if bj != b
                    && self.label[bj] == 1
                    && (bestedgeto[bj] == NONE || self.slack(k) < self.slack(bestedgeto[bj]))
                {
                    bestedgeto[bj] = k;
                }
            }
            self.bestedge[bv] = NONE;
        }
        let best = bestedgeto.into_iter().filter(|k| *k != NONE).collect_vec();
        self.bestedge[b] = NONE;
        for &k in &best {
            if self.bestedge[b] == NONE || self.slack(k) < self.slack(self.bestedge[b]) {
                self.bestedge[b] = k;
            }
        }
        self.blossombestedges[b] = Some(best);
    }

    fn expand_blossom(&mut self, b: usize, endstage: bool) {
        let childs = self.blossomchilds[b].clone();
        for &s in &childs {
            self.blossomparent[s] = NONE;
            if s < self.n {
                self.inblossom[s] = s;
            } else if endstage && self.dualvar[s] == 0 {
                self.expand_blossom(s, endstage);
            } else {
                for v in self.blossom_leaves(s) {
                    self.inblossom[v] = s;
                }
            }
        }

        // relabel the sub-blossoms of an expanded T-blossom in mid-stage
        if !endstage && self.label[b] == 2 {
            let len = childs.len() as isize;
            let entrychild = self.inblossom[self.endpoint[self.labelend[b] ^ 1]];
            let Some(start) = childs.iter().position(|c| *c == entrychild) else {
                return;
            };
            let mut j = start as isize;
            let (jstep, endptrick): (isize, usize) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };
            let at = |j: isize| -> usize { j.rem_euclid(len) as usize };
            let endps = self.blossomendps[b].clone();
            let endp = |j: isize| -> usize { endps[at(j - endptrick as isize)] };

            let mut p = self.labelend[b];
            while j != 0 {
                // relabel the T-sub-blossom
                let q = endp(j);
                self.label[self.endpoint[p ^ 1]] = 0;
                self.label[self.endpoint[q ^ endptrick ^ 1]] = 0;
                self.assign_label(self.endpoint[p ^ 1], 2, p);
                self.allowedge[q / 2] = true;
                j += jstep;
                p = endp(j) ^ endptrick;
                self.allowedge[p / 2] = true;
                j += jstep;
            }
            let bv = childs[at(j)];
            let v = self.endpoint[p ^ 1];
            self.label[v] = 2;
            self.label[bv] = 2;
            self.labelend[v] = p;
            self.labelend[bv] = p;
            self.bestedge[bv] = NONE;
            j += jstep;
            while childs[at(j)] != entrychild {
                let bv = childs[at(j)];
                if self.label[bv] == 1 {
                    j += jstep;
                    continue;
                }
                let leaves = self.blossom_leaves(bv);
                let v = leaves
                    .iter()
                    .copied()
                    .find(|v| self.label[*v] != 0)
                    .or_else(|| leaves.last().copied());
                if let Some(v) = v {
                    if self.label[v] != 0 {
                        debug_assert_eq!(self.label[v], 2);
                        self.label[v] = 0;
                        let base_mate = self.mate[self.blossombase[bv]];
                        self.label[self.endpoint[base_mate]] = 0;
                        self.assign_label(v, 2, self.labelend[v]);
                    }
                }
                j += jstep;
            }
        }

        self.label[b] = -1;
        self.labelend[b] = NONE;
        self.blossomchilds[b].clear();
        self.blossomendps[b].clear();
        self.blossombase[b] = NONE;
        self.blossombestedges[b] = None;
        self.bestedge[b] = NONE;
        self.unusedblossoms.push(b);
    }

    /// Swap matched and unmatched edges along the even path from v to the base of b.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossomparent[t] != b {
            t = self.blossomparent[t];
        }
        if t >= self.n {
            self.augment_blossom(t, v);
        }
        let len = self.blossomchilds[b].len() as isize;
        let Some(i) = self.blossomchilds[b].iter().position(|c| *c == t) else {
            return;
        };
        let mut j = i as isize;
        let (jstep, endptrick): (isize, usize) = if i & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };
        let at = |j: isize| -> usize { j.rem_euclid(len) as usize };
        while j != 0 {
            j += jstep;
            let t = self.blossomchilds[b][at(j)];
            let p = self.blossomendps[b][at(j - endptrick as isize)] ^ endptrick;
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p]);
            }
            j += jstep;
            let t = self.blossomchilds[b][at(j)];
            if t >= self.n {
                self.augment_blossom(t, self.endpoint[p ^ 1]);
            }
            self.mate[self.endpoint[p]] = p ^ 1;
            self.mate[self.endpoint[p ^ 1]] = p;
        }
        self.blossomchilds[b].rotate_left(i);
        self.blossomendps[b].rotate_left(i);
        self.blossombase[b] = self.blossombase[self.blossomchilds[b][0]];
        debug_assert_eq!(self.blossombase[b], v);
    }

    fn augment_matching(&mut self, k: usize) {
        let WeightedEdge { i: v, j: w, .. } = self.edges[k];
        for (mut s, mut p) in [(v, 2 * k + 1), (w, 2 * k)] {
            loop {
                let bs = self.inblossom[s];
                debug_assert_eq!(self.label[bs], 1);
                if bs >= self.n {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.labelend[bs] == NONE {
                    // reached a single vertex
                    break;
                }
                let t = self.endpoint[self.labelend[bs]];
                let bt = self.inblossom[t];
                debug_assert_eq!(self.label[bt], 2);
                s = self.endpoint[self.labelend[bt]];
                let j = self.endpoint[self.labelend[bt] ^ 1];
                if bt >= self.n {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.labelend[bt];
                p = self.labelend[bt] ^ 1;
            }
        }
    }

    fn run(&mut self, max_cardinality: bool, progress: Option<&Progress>) -> anyhow::Result<()> {
        let n = self.n;
        for stage in 0..n {
            if let Some(progress) = progress {
                progress.report(stage, n, "matching")?;
            }

            self.label.iter_mut().for_each(|l| *l = 0);
            self.bestedge.iter_mut().for_each(|e| *e = NONE);
            self.blossombestedges[n..].iter_mut().for_each(|e| *e = None);
            self.allowedge.iter_mut().for_each(|a| *a = false);
            self.queue.clear();

            for v in 0..n {
                if self.mate[v] == NONE && self.label[self.inblossom[v]] == 0 {
                    self.assign_label(v, 1, NONE);
                }
            }

            let mut augmented = false;
            loop {
                while !augmented {
                    let Some(v) = self.queue.pop() else {
                        break;
                    };
                    debug_assert_eq!(self.label[self.inblossom[v]], 1);
                    for idx in 0..self.neighbend[v].len() {
                        let p = self.neighbend[v][idx];
                        let k = p / 2;
                        let w = self.endpoint[p];
                        if self.inblossom[v] == self.inblossom[w] {
                            continue;
                        }
                        let mut kslack = 0;
                        if !self.allowedge[k] {
                            kslack = self.slack(k);
                            if kslack <= 0 {
                                self.allowedge[k] = true;
                            }
                        }
                        if self.allowedge[k] {
                            if self.label[self.inblossom[w]] == 0 {
                                self.assign_label(w, 2, p ^ 1);
                            } else if self.label[self.inblossom[w]] == 1 {
                                let base = self.scan_blossom(v, w);
                                if base != NONE {
                                    self.add_blossom(base, k);
                                } else {
                                    self.augment_matching(k);
                                    augmented = true;
                                    break;
                                }
                            } else if self.label[w] == 0 {
                                self.label[w] = 2;
                                self.labelend[w] = p ^ 1;
                            }
                        } else if self.label[self.inblossom[w]] == 1 {
                            let b = self.inblossom[v];
                            if self.bestedge[b] == NONE || kslack < self.slack(self.bestedge[b]) {
                                self.bestedge[b] = k;
                            }
                        } else if self.label[w] == 0
                            && (self.bestedge[w] == NONE || kslack < self.slack(self.bestedge[w]))
                        {
                            self.bestedge[w] = k;
                        }
                    }
                }
                if augmented {
                    break;
                }

                match self.next_delta(max_cardinality) {
                    Delta::Done => break,
                    Delta::FreeVertex(k) => {
                        self.allowedge[k] = true;
                        let WeightedEdge { i, j, .. } = self.edges[k];
                        let i = if self.label[self.inblossom[i]] == 0 {
                            j
                        } else {
                            i
                        };
                        self.queue.push(i);
                    }
                    Delta::SBlossoms(k) => {
                        self.allowedge[k] = true;
                        self.queue.push(self.edges[k].i);
                    }
                    Delta::TBlossom(b) => self.expand_blossom(b, false),
                }
            }

            if !augmented {
                break;
            }

            // expand S-blossoms with zero dual at the end of the stage
            for b in n..2 * n {
                if self.blossomparent[b] == NONE
                    && self.blossombase[b] != NONE
                    && self.label[b] == 1
                    && self.dualvar[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }
        Ok(())
    }

    /// Choose the dual update, apply it, and report which constraint became tight.
    fn next_delta(&mut self, max_cardinality: bool) -> Delta {
        let n = self.n;
        let mut delta: Option<(i64, Delta)> = None;

        // 1: minimum dual of a vertex
        if !max_cardinality {
            let d = self.dualvar[..n].iter().copied().min().unwrap_or(0);
            delta = Some((d, Delta::Done));
        }

        // 2: S-vertex to free vertex
        for v in 0..n {
            if self.label[self.inblossom[v]] == 0 && self.bestedge[v] != NONE {
                let d = self.slack(self.bestedge[v]);
                if delta.as_ref().map_or(true, |(current, _)| d < *current) {
                    delta = Some((d, Delta::FreeVertex(self.bestedge[v])));
                }
            }
        }

        // 3: half the slack between two S-blossoms
        for b in 0..2 * n {
            if self.blossomparent[b] == NONE && self.label[b] == 1 && self.bestedge[b] != NONE {
                let d = self.slack(self.bestedge[b]) / 2;
                if delta.as_ref().map_or(true, |(current, _)| d < *current) {
                    delta = Some((d, Delta::SBlossoms(self.bestedge[b])));
                }
            }
        }

        // 4: minimum dual of a T-blossom
        for b in n..2 * n {
            if self.blossombase[b] != NONE
                && self.blossomparent[b] == NONE
                && self.label[b] == 2
                && delta.as_ref().map_or(true, |(current, _)| self.dualvar[b] < *current)
            {
                delta = Some((self.dualvar[b], Delta::TBlossom(b)));
            }
        }

        let (d, kind) = delta.unwrap_or_else(|| {
            // no further improvement possible; max-cardinality optimum reached
            let d = self.dualvar[..n].iter().copied().min().unwrap_or(0).max(0);
            (d, Delta::Done)
        });

        for v in 0..n {
            match self.label[self.inblossom[v]] {
                1 => self.dualvar[v] -= d,
                2 => self.dualvar[v] += d,
                _ => {}
            }
        }
        for b in n..2 * n {
            if self.blossombase[b] != NONE && self.blossomparent[b] == NONE {
                match self.label[b] {
                    1 => self.dualvar[b] += d,
                    2 => self.dualvar[b] -= d,
                    _ => {}
                }
            }
        }
        kind
    }
}

enum Delta {
    Done,
    FreeVertex(usize),
    SBlossoms(usize),
    TBlossom(usize),
}
