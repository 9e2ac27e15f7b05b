//! Greedy triangle-fan stripping.
//!
//! A fan is a node list `[c, v1, v2, ..., vk]` encoding the triangles
//! `(c, v1, v2), (c, v2, v3), ...`. Stripping repeatedly picks the node used
//! by the most remaining triangles, walks the longest connected run of
//! triangles around it, and emits that run as one fan.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::{adj::Incidence, ele::TriEle};

/// Node indices of one triangle fan; `fan[0]` is the shared center.
pub type Fan = Vec<usize>;

// ----------------------------------------------------------------------------
// Candidate queue
// ----------------------------------------------------------------------------

/// Heap entry: a node and the live degree it had when pushed.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Candidate {
    degree: usize,
    node: usize,
}

impl Ord for Candidate {
    /// Larger degree first, then lower node index.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.degree, Reverse(self.node)).cmp(&(other.degree, Reverse(other.node)))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

// ----------------------------------------------------------------------------
// Fan building
// ----------------------------------------------------------------------------

/// Partition `tris` into fans. Every triangle ends up in exactly one fan, in
/// its original winding. The result depends only on the input order.
///
/// Center choice: the node with the most remaining incident triangles, ties
/// to the lowest node index. The fan around it starts from whichever incident
/// triangle gives the longest walk, ties to the earliest triangle.
pub fn greedy_build(tris: &[TriEle]) -> Vec<Fan> {
    let num_nodes = tris.iter().map(|t| t.max_node() + 1).max().unwrap_or(0);
    let incidence = Incidence::build(num_nodes, tris);

    let mut used = vec![false; tris.len()];
    let mut degree: Vec<usize> = (0..num_nodes).map(|n| incidence.degree(n)).collect();

    // lazy max-heap: stale entries are skipped when their degree is outdated
    let mut heap: BinaryHeap<Candidate> = degree.iter().enumerate()
        .filter(|&(_, &d)| d > 0)
        .map(|(node, &degree)| Candidate { degree, node })
        .collect();

    let mut fans = Vec::new();
    while let Some(Candidate { degree: d, node: center }) = heap.pop() {
        if d == 0 || d != degree[center] { continue }

        let incident: Vec<usize> = incidence.triangles(center).filter(|&t| !used[t]).collect();
        let walk = longest_walk(tris, center, &incident);

        let first = match tris[walk[0]].canonify(center) {
            Some(first) => first,
            None => continue,
        };
        let mut fan = Vec::with_capacity(walk.len() + 2);
        fan.extend_from_slice(&first);
        for &t in &walk[1..] {
            if let Some([_, _, n3]) = tris[t].canonify(center) { fan.push(n3); }
        }

        for &t in &walk {
            used[t] = true;
            for n in tris[t].nodes() {
                degree[n] -= 1;
                if n != center && degree[n] > 0 {
                    heap.push(Candidate { degree: degree[n], node: n });
                }
            }
        }
        if degree[center] > 0 {
            heap.push(Candidate { degree: degree[center], node: center });
        }

        fans.push(fan);
    }

    fans
}

/// Longest run of triangles around `center`, following shared edges in
/// winding order, over every possible starting triangle.
fn longest_walk(tris: &[TriEle], center: usize, incident: &[usize]) -> Vec<usize> {
    let canon = |t: usize| tris[t].canonify(center).unwrap_or(tris[t].nodes());

    let mut best: Vec<usize> = Vec::new();
    for &start in incident {
        let mut walk = vec![start];
        let mut cur = canon(start);

        // the next triangle shares the edge (center, cur[2])
        while let Some(&next) = incident.iter()
            .find(|&&t| !walk.contains(&t) && canon(t)[1] == cur[2])
        {
            walk.push(next);
            cur = canon(next);
        }

        if walk.len() > best.len() { best = walk; }
    }

    best
}

// ----------------------------------------------------------------------------
// Fan inspection
// ----------------------------------------------------------------------------

/// Expand a fan back into its triangles.
pub fn fan_triangles(fan: &[usize]) -> impl Iterator<Item = [usize; 3]> + '_ {
    let center = fan.first().copied().unwrap_or(0);
    fan.get(1..).unwrap_or(&[]).windows(2).map(move |w| [center, w[0], w[1]])
}

/// Mean number of node indices per fan; `0.0` for no fans.
pub fn average_fan_size(fans: &[Fan]) -> f64 {
    if fans.is_empty() { return 0.0 }
    fans.iter().map(Vec::len).sum::<usize>() as f64 / fans.len() as f64
}
