//!
//! Pedigree descriptor
//!
use derive_new::new;

///
/// Pedigree topology for one family: father, mother and ordered children,
/// as indices into the caller's per-sample model array, plus per-member
/// disease status. Immutable per site/run.
///
#[derive(Debug, Clone, new)]
pub struct Family {
    pub father: usize,
    pub mother: usize,
    pub children: Vec<usize>,
    /// disease flag per sample index
    pub diseased: Vec<bool>,
}

impl Family {
    /// father + mother + children
    pub fn size(&self) -> usize {
        2 + self.children.len()
    }
    pub fn n_children(&self) -> usize {
        self.children.len()
    }
    pub fn is_diseased(&self, sample: usize) -> bool {
        self.diseased.get(sample).copied().unwrap_or(false)
    }
    /// true if exactly one parent is diseased (the disease caller's target
    /// configuration)
    pub fn one_parent_diseased(&self) -> bool {
        self.is_diseased(self.father) != self.is_diseased(self.mother)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_basics() {
        let f = Family::new(0, 1, vec![2, 3], vec![true, false, true, false]);
        assert_eq!(f.size(), 4);
        assert_eq!(f.n_children(), 2);
        assert!(f.is_diseased(0));
        assert!(!f.is_diseased(1));
        assert!(f.one_parent_diseased());
        assert!(!f.is_diseased(99));
    }
}
