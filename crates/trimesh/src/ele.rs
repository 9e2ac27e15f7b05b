//! Triangle elements: three node indices into a shared node table plus an
//! integer attribute (region / material tag).

use std::fmt;

/// A triangle referencing nodes by index, in counter-clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriEle {
    pub n1: usize,
    pub n2: usize,
    pub n3: usize,
    /// Region tag carried through from the triangulator.
    pub attribute: u32,
}

impl TriEle {
    #[inline]
    pub fn new(n1: usize, n2: usize, n3: usize, attribute: u32) -> Self {
        Self { n1, n2, n3, attribute }
    }

    #[inline] pub fn nodes(&self) -> [usize; 3] { [self.n1, self.n2, self.n3] }

    /// Largest node index referenced.
    #[inline] pub fn max_node(&self) -> usize { self.n1.max(self.n2).max(self.n3) }

    #[inline]
    pub fn has_node(&self, node: usize) -> bool {
        self.n1 == node || self.n2 == node || self.n3 == node
    }

    /// Rotate the node list so `center` comes first. Rotation keeps the
    /// winding; the triangle is never reflected. `None` if `center` is not
    /// one of the triangle's nodes.
    #[inline]
    pub fn canonify(&self, center: usize) -> Option<[usize; 3]> {
        match center {
            c if c == self.n1 => Some([self.n1, self.n2, self.n3]),
            c if c == self.n2 => Some([self.n2, self.n3, self.n1]),
            c if c == self.n3 => Some([self.n3, self.n1, self.n2]),
            _ => None,
        }
    }

    /// Rotation-invariant identity: rotated so the smallest index is first.
    /// Two elements describe the same oriented triangle iff their keys match.
    #[inline]
    pub fn key(&self) -> [usize; 3] {
        let min = self.n1.min(self.n2).min(self.n3);
        self.canonify(min).unwrap_or(self.nodes())
    }
}

impl fmt::Display for TriEle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriEle({} {} {} @{})", self.n1, self.n2, self.n3, self.attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonify_rotates_without_reflecting() {
        let t = TriEle::new(4, 7, 9, 0);
        assert_eq!(t.canonify(4), Some([4, 7, 9]));
        assert_eq!(t.canonify(7), Some([7, 9, 4]));
        assert_eq!(t.canonify(9), Some([9, 4, 7]));
        assert_eq!(t.canonify(5), None);
    }

    #[test]
    fn key_is_rotation_invariant_but_orientation_sensitive() {
        assert_eq!(TriEle::new(7, 9, 4, 0).key(), TriEle::new(4, 7, 9, 1).key());
        assert_ne!(TriEle::new(4, 9, 7, 0).key(), TriEle::new(4, 7, 9, 0).key());
    }

    #[test]
    fn display() {
        assert_eq!(TriEle::new(1, 2, 3, 5).to_string(), "TriEle(1 2 3 @5)");
    }
}
