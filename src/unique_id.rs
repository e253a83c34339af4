//!
//! First-seen canonical allele relabeling
//!
//! The Mendelian transition tables are indexed by canonical allele ids
//! `0, 1, 2, ...` assigned in first-seen order, so that tables depend only
//! on the sharing pattern between family members and not on the actual
//! allele identifiers. The seeding order (mother-a, mother-bc, father-a,
//! father-bc, child-a, child-bc) is part of each table's contract and must
//! match between table construction and query.
//!
use arrayvec::ArrayVec;

/// maximum number of distinct alleles a single canonicalization can see
pub const MAX_SLOTS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct UniqueId {
    seen: ArrayVec<usize, MAX_SLOTS>,
}

impl UniqueId {
    pub fn new() -> UniqueId {
        UniqueId {
            seen: ArrayVec::new(),
        }
    }
    ///
    /// Canonical id of `allele`, allocating the next id on first sight.
    ///
    pub fn id(&mut self, allele: usize) -> usize {
        match self.seen.iter().position(|&a| a == allele) {
            Some(i) => i,
            None => {
                self.seen.push(allele);
                self.seen.len() - 1
            }
        }
    }
    ///
    /// Canonical id of `allele` if already seen.
    ///
    pub fn get(&self, allele: usize) -> Option<usize> {
        self.seen.iter().position(|&a| a == allele)
    }
    /// number of distinct alleles seen so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
