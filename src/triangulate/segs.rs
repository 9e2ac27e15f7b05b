use ahash::AHashSet;

use super::nodes::NodeTable;

/// Undirected constraint segments between node indices, without duplicates.
#[derive(Debug, Clone, Default)]
pub struct SegmentList {
    segs: Vec<(usize, usize)>,
    seen: AHashSet<(usize, usize)>,
}

impl SegmentList {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn len(&self) -> usize { self.segs.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.segs.is_empty() }

    /// Segments in insertion order.
    #[inline] pub fn segments(&self) -> &[(usize, usize)] { &self.segs }

    /// Add `a-b` unless it (or `b-a`) is already present or degenerate.
    pub fn unique_add(&mut self, a: usize, b: usize) -> bool {
        if a == b { return false }
        let key = (a.min(b), a.max(b));
        if !self.seen.insert(key) { return false }
        self.segs.push((a, b));
        true
    }

    /// Add `a-b`, first splitting it at every node lying within `epsilon` of
    /// the open segment so no node sits in the middle of a constraint.
    pub fn unique_divide_and_add(&mut self, nodes: &NodeTable, a: usize, b: usize, epsilon: f64) {
        if a == b { return }
        let (pa, pb) = (nodes.get(a), nodes.get(b));
        let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 { return }
        let len = len2.sqrt();

        let min = [pa.x.min(pb.x) - epsilon, pa.y.min(pb.y) - epsilon];
        let max = [pa.x.max(pb.x) + epsilon, pa.y.max(pb.y) + epsilon];

        let mut splits: Vec<(f64, usize)> = nodes.within(min, max)
            .filter(|&n| n != a && n != b)
            .filter_map(|n| {
                let p = nodes.get(n);
                let (qx, qy) = (p.x - pa.x, p.y - pa.y);
                let t = (qx * dx + qy * dy) / len2;
                let off = (dx * qy - dy * qx).abs() / len;
                (t > 0.0 && t < 1.0 && off < epsilon).then_some((t, n))
            })
            .collect();

        splits.sort_by(|l, r| l.0.total_cmp(&r.0).then(l.1.cmp(&r.1)));

        let mut prev = a;
        for (_, n) in splits {
            self.unique_add(prev, n);
            prev = n;
        }
        self.unique_add(prev, b);
    }
}
