use ahash::AHashMap;
use trimesh::{average_fan_size, fan_triangles, greedy_build, Incidence, TriEle};

/// A hexagon around a center node.
///
/// ```
///    2---1
///   / \ / \
///  3---0---6
///   \ / \ /
///    4---5
/// ```
/// Six counter-clockwise triangles (0, k, k+1), wrapping at 6 → 1.
fn hexagon() -> Vec<TriEle> {
    (1..=6).map(|k| TriEle::new(0, k, if k == 6 { 1 } else { k + 1 }, 0)).collect()
}

/// An `n x n` grid of quads over `(n+1)^2` nodes, each quad split into two
/// counter-clockwise triangles.
fn grid(n: usize) -> Vec<TriEle> {
    let id = |i: usize, j: usize| j * (n + 1) + i;
    let mut tris = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let (a, b, c, d) = (id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1));
            tris.push(TriEle::new(a, b, c, 1));
            tris.push(TriEle::new(a, c, d, 1));
        }
    }
    tris
}

/// Count of each oriented triangle, keyed rotation-invariantly.
fn multiset(tris: impl IntoIterator<Item = [usize; 3]>) -> AHashMap<[usize; 3], usize> {
    let mut map = AHashMap::new();
    for [a, b, c] in tris {
        *map.entry(TriEle::new(a, b, c, 0).key()).or_insert(0) += 1;
    }
    map
}

fn assert_bijection(tris: &[TriEle]) {
    let fans = greedy_build(tris);
    let expanded = fans.iter().flat_map(|f| fan_triangles(f));
    assert_eq!(multiset(expanded), multiset(tris.iter().map(TriEle::nodes)));
}

#[test]
fn closed_hexagon_is_one_fan() {
    let fans = greedy_build(&hexagon());
    assert_eq!(fans.len(), 1);
    // one walk from the first triangle covers all six, emitting 2 + 6 nodes
    assert_eq!(fans[0], vec![0, 1, 2, 3, 4, 5, 6, 1]);
}

#[test]
fn hexagon_fans_cover_every_triangle_once() {
    assert_bijection(&hexagon());
}

#[test]
fn grid_fans_cover_every_triangle_once() {
    for n in [1, 2, 5, 9] {
        assert_bijection(&grid(n));
    }
}

#[test]
fn fans_preserve_winding() {
    // reversing the input orientation must reverse every emitted triangle
    let flipped: Vec<_> = grid(4).iter().map(|t| TriEle::new(t.n1, t.n3, t.n2, 0)).collect();
    assert_bijection(&flipped);
}

#[test]
fn disconnected_triangles_are_separate_fans() {
    let tris = [TriEle::new(0, 1, 2, 0), TriEle::new(3, 4, 5, 0)];
    let fans = greedy_build(&tris);
    assert_eq!(fans.len(), 2);
    assert!(fans.iter().all(|f| f.len() == 3));
    assert_eq!(average_fan_size(&fans), 3.0);
}

#[test]
fn ties_break_to_lowest_node() {
    // node 1 and node 2 both touch two triangles; node 1 wins
    let tris = [TriEle::new(0, 1, 2, 0), TriEle::new(2, 1, 3, 0)];
    let fans = greedy_build(&tris);
    assert_eq!(fans[0][0], 1);
    assert_eq!(fans.len(), 1);
}

#[test]
fn build_is_deterministic() {
    let tris = grid(6);
    assert_eq!(greedy_build(&tris), greedy_build(&tris));
}

#[test]
fn grid_fans_beat_plain_triangles() {
    let fans = greedy_build(&grid(8));
    // an interior grid node is shared by six triangles
    assert!(average_fan_size(&fans) > 3.0);
    assert!(fans.len() < grid(8).len());
}

#[test]
fn empty_input() {
    assert!(greedy_build(&[]).is_empty());
    assert_eq!(Incidence::build(0, &[]).num_nodes(), 0);
}
