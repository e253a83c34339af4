//!
//! Genotype encoding
//!
//! A site is described by a `Code`: a bijection between genotype ids and
//! unordered allele pairs over the site's allele range (reference plus
//! alternates). `Hypotheses` restricts the code to one sample's ploidy and
//! carries the sample's reference hypothesis index.
//!
use crate::lattice::AlleleSet;
use std::sync::Arc;

///
/// Number of allele copies a sample carries at a locus.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ploidy {
    /// no copy of this locus (e.g. a daughter at a Y-linked site)
    None,
    Haploid,
    Diploid,
}

impl Ploidy {
    /// number of allele copies
    pub fn count(self) -> usize {
        match self {
            Ploidy::None => 0,
            Ploidy::Haploid => 1,
            Ploidy::Diploid => 2,
        }
    }
}

///
/// Bijection between a genotype id and an unordered allele pair `(a, bc)`.
///
/// Ids `0..n` are the homozygous genotypes (`a == bc == id`), ids
/// `n..n(n+1)/2` the heterozygous pairs `(a, bc)` with `a < bc` in
/// lexicographic order. Allele `0` is the reference allele.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    n: usize,
}

impl Code {
    pub fn new(range_size: usize) -> Code {
        assert!(range_size >= 1, "code needs at least the reference allele");
        Code { n: range_size }
    }
    /// number of distinct alleles including the reference
    pub fn range_size(&self) -> usize {
        self.n
    }
    /// number of diploid genotype ids
    pub fn size(&self) -> usize {
        self.n * (self.n + 1) / 2
    }
    pub fn homozygous(&self, id: usize) -> bool {
        assert!(id < self.size());
        id < self.n
    }
    /// first allele of the pair
    pub fn a(&self, id: usize) -> usize {
        assert!(id < self.size());
        if id < self.n {
            id
        } else {
            self.het_pair(id - self.n).0
        }
    }
    /// second allele of the pair (equals `a` for homozygous ids)
    pub fn bc(&self, id: usize) -> usize {
        assert!(id < self.size());
        if id < self.n {
            id
        } else {
            self.het_pair(id - self.n).1
        }
    }
    /// genotype id of the unordered pair `{x, y}`
    pub fn code(&self, x: usize, y: usize) -> usize {
        assert!(x < self.n && y < self.n);
        if x == y {
            return x;
        }
        let (a, b) = if x < y { (x, y) } else { (y, x) };
        let mut k = 0;
        for i in 0..a {
            k += self.n - 1 - i;
        }
        self.n + k + (b - a - 1)
    }
    fn het_pair(&self, mut k: usize) -> (usize, usize) {
        for a in 0..self.n {
            let row = self.n - 1 - a;
            if k < row {
                return (a, a + 1 + k);
            }
            k -= row;
        }
        panic!("het genotype id out of range");
    }
    /// allele bitmask of genotype `id`
    pub fn alleles(&self, id: usize) -> AlleleSet {
        let mut set = AlleleSet::empty();
        set.insert(self.a(id));
        set.insert(self.bc(id));
        set
    }
}

///
/// Finite ordered enumeration of genotypes for one sample at one site.
///
/// Shared (`Arc`) between all samples using the same ploidy at a site.
///
#[derive(Debug, Clone)]
pub struct Hypotheses {
    code: Arc<Code>,
    ploidy: Ploidy,
    reference: usize,
}

impl Hypotheses {
    pub fn new(code: Arc<Code>, ploidy: Ploidy, reference: usize) -> Hypotheses {
        let h = Hypotheses {
            code,
            ploidy,
            reference,
        };
        assert!(h.reference < h.size(), "reference hypothesis out of range");
        h
    }
    pub fn code(&self) -> &Code {
        &self.code
    }
    pub fn ploidy(&self) -> Ploidy {
        self.ploidy
    }
    /// index of the reference hypothesis
    pub fn reference(&self) -> usize {
        self.reference
    }
    /// number of hypotheses for this ploidy
    pub fn size(&self) -> usize {
        match self.ploidy {
            Ploidy::None => 1,
            Ploidy::Haploid => self.code.range_size(),
            Ploidy::Diploid => self.code.size(),
        }
    }
    /// allele bitmask of hypothesis `hyp` (empty for `Ploidy::None`)
    pub fn alleles(&self, hyp: usize) -> AlleleSet {
        match self.ploidy {
            Ploidy::None => AlleleSet::empty(),
            _ => self.code.alleles(hyp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_bijection() {
        let code = Code::new(4);
        assert_eq!(code.size(), 10);
        assert_eq!(code.range_size(), 4);
        for id in 0..code.size() {
            let (a, bc) = (code.a(id), code.bc(id));
            assert_eq!(code.code(a, bc), id);
            assert_eq!(code.code(bc, a), id);
            assert_eq!(code.homozygous(id), a == bc);
        }
    }
    #[test]
    fn code_het_order() {
        let code = Code::new(3);
        // hom 0,1,2 then (0,1),(0,2),(1,2)
        assert_eq!((code.a(3), code.bc(3)), (0, 1));
        assert_eq!((code.a(4), code.bc(4)), (0, 2));
        assert_eq!((code.a(5), code.bc(5)), (1, 2));
    }
    #[test]
    fn code_alleles() {
        let code = Code::new(3);
        assert!(code.alleles(0).contains(0));
        assert!(!code.alleles(0).contains(1));
        let het = code.alleles(code.code(0, 2));
        assert!(het.contains(0) && het.contains(2) && !het.contains(1));
    }
    #[test]
    fn hypotheses_sizes() {
        let code = Arc::new(Code::new(3));
        assert_eq!(Hypotheses::new(code.clone(), Ploidy::Diploid, 0).size(), 6);
        assert_eq!(Hypotheses::new(code.clone(), Ploidy::Haploid, 0).size(), 3);
        assert_eq!(Hypotheses::new(code.clone(), Ploidy::None, 0).size(), 1);
    }
    #[test]
    fn ploidy_counts() {
        assert_eq!(Ploidy::None.count(), 0);
        assert_eq!(Ploidy::Haploid.count(), 1);
        assert_eq!(Ploidy::Diploid.count(), 2);
    }
}
