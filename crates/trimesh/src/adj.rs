use crate::ele::TriEle;

/// Read-only CSR (Compressed Sparse Row) node → triangle incidence.
///
/// `offsets[n]..offsets[n+1]` indexes into `tris` to give the triangles that
/// use node `n`, in ascending triangle order. Built in one counting-sort pass.
#[derive(Debug, Clone, Default)]
pub struct Incidence {
    /// CSR row offsets; length = `num_nodes + 1`.
    offsets: Vec<u32>,
    /// Flattened triangle lists.
    tris: Vec<u32>,
}

impl Incidence {
    /// Incidence over all of `tris`, for a node table of `num_nodes` entries.
    pub fn build(num_nodes: usize, tris: &[TriEle]) -> Self {
        Self::build_subset(num_nodes, tris, 0..tris.len())
    }

    /// Incidence restricted to the triangles listed in `subset` (indices
    /// into `tris`, which keep their original numbering).
    pub fn build_subset(num_nodes: usize, tris: &[TriEle], subset: impl IntoIterator<Item = usize> + Clone) -> Self {
        let mut counts = vec![0u32; num_nodes + 1];
        for t in subset.clone() {
            for n in tris[t].nodes() {
                debug_assert!(n < num_nodes, "node {n} out of range in {}", tris[t]);
                counts[n + 1] += 1;
            }
        }

        // prefix sum into offsets
        for i in 1..counts.len() { counts[i] += counts[i - 1]; }
        let offsets = counts;

        let mut cursor = offsets.clone();
        let mut flat = vec![0u32; *offsets.last().unwrap_or(&0) as usize];
        for t in subset {
            for n in tris[t].nodes() {
                flat[cursor[n] as usize] = t as u32;
                cursor[n] += 1;
            }
        }

        Self { offsets, tris: flat }
    }

    /// Number of nodes covered.
    #[inline] pub fn num_nodes(&self) -> usize { self.offsets.len().saturating_sub(1) }

    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Number of triangles using `node`.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Triangles using `node`, ascending.
    #[inline]
    pub fn triangles(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.tris[self.range(node)].iter().map(|&t| t as usize)
    }
}
