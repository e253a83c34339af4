//!
//! Mendelian transition models
//!
//! `M(father, mother, child)`: the probability of a child genotype given
//! the parental genotypes under Mendelian segregation, as a pure function
//! of the three genotype ids and their `Code`. A value of zero
//! (`ln M = -inf`) encodes a Mendelian-impossible transition.
//!
//! Implementations are stateless singletons, one per supported
//! (father-ploidy, mother-ploidy, child-ploidy) triple, selected once via
//! `mendelian_lookup`. The de novo variants (`denovo_lookup`) replace the
//! impossible cells with the probability mass of a single-base de novo
//! mutation in a transmitted allele.
//!
//! Tables are indexed by canonical allele ids assigned in first-seen order
//! (mother-a, mother-bc, father-a, father-bc, child-a, child-bc), so a
//! single small table serves every concrete allele labeling. Built once,
//! immutable afterwards, safe for concurrent readers.
//!
pub mod denovo;
pub mod diploid;
pub mod haploid;

use crate::code::{Code, Ploidy};
use crate::prob::Prob;

///
/// `ln M(father, mother, child)` for one ploidy triple.
///
/// Genotype ids must belong to hypotheses of the ploidies the
/// implementation was selected for; out-of-range ids for the selected
/// ploidy are a programmer error.
///
pub trait MendelianAlleleProbability: Sync {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob;
    ///
    /// Does this (father, mother, child) combination require a de novo
    /// mutation?
    ///
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool;
}

///
/// Select the Mendelian transition for a ploidy triple
/// `(father, mother, child)`. Unsupported triples are a pipeline bug and
/// panic immediately.
///
pub fn mendelian_lookup(
    father: Ploidy,
    mother: Ploidy,
    child: Ploidy,
) -> &'static dyn MendelianAlleleProbability {
    use Ploidy::*;
    match (father, mother, child) {
        (Diploid, Diploid, Diploid) => &diploid::AutosomeDiploid,
        (Haploid, Diploid, Haploid) => &haploid::XMaleChild,
        (Haploid, Diploid, Diploid) => &haploid::XFemaleChild,
        (Haploid, None, Haploid) => &haploid::YMaleChild,
        (Haploid, None, None) => &haploid::YFemaleChild,
        (None, Haploid, Haploid) => &haploid::MitoChild,
        (None, Haploid, None) => &haploid::MitoNone,
        _ => panic!(
            "unsupported ploidy combination: father={:?} mother={:?} child={:?}",
            father, mother, child
        ),
    }
}

///
/// De novo variant of `mendelian_lookup` for the same triple.
///
pub fn denovo_lookup(
    father: Ploidy,
    mother: Ploidy,
    child: Ploidy,
) -> &'static dyn MendelianAlleleProbability {
    use Ploidy::*;
    match (father, mother, child) {
        (Diploid, Diploid, Diploid) => &denovo::AutosomeDiploidDeNovo,
        (Haploid, Diploid, Haploid) => &denovo::XMaleChildDeNovo,
        (Haploid, Diploid, Diploid) => &denovo::XFemaleChildDeNovo,
        (Haploid, None, Haploid) => &denovo::YMaleChildDeNovo,
        // no transmitted copy: nothing to mutate
        (Haploid, None, None) => &denovo::NoCopyDeNovo,
        (None, Haploid, Haploid) => &denovo::MitoChildDeNovo,
        (None, Haploid, None) => &denovo::NoCopyDeNovo,
        _ => panic!(
            "unsupported ploidy combination: father={:?} mother={:?} child={:?}",
            father, mother, child
        ),
    }
}

///
/// Is the canonical-id sequence reachable as a first-seen relabeling?
/// (every id is at most one greater than everything seen before)
///
pub(crate) fn canonical_ok(seq: &[usize]) -> bool {
    let mut max_seen: Option<usize> = Option::None;
    for &s in seq {
        match max_seen {
            Option::None => {
                if s != 0 {
                    return false;
                }
                max_seen = Some(0);
            }
            Some(m) => {
                if s > m + 1 {
                    return false;
                }
                max_seen = Some(m.max(s));
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Code;
    use test_case::test_case;

    #[test]
    fn canonical_sequences() {
        assert!(canonical_ok(&[0]));
        assert!(canonical_ok(&[0, 0, 1, 2]));
        assert!(canonical_ok(&[0, 1, 0, 2]));
        assert!(!canonical_ok(&[1]));
        assert!(!canonical_ok(&[0, 2]));
        assert!(!canonical_ok(&[0, 1, 3]));
    }

    #[test_case(Ploidy::Diploid, Ploidy::Diploid, Ploidy::Diploid)]
    #[test_case(Ploidy::Haploid, Ploidy::Diploid, Ploidy::Haploid)]
    #[test_case(Ploidy::Haploid, Ploidy::Diploid, Ploidy::Diploid)]
    #[test_case(Ploidy::Haploid, Ploidy::None, Ploidy::Haploid)]
    #[test_case(Ploidy::Haploid, Ploidy::None, Ploidy::None)]
    #[test_case(Ploidy::None, Ploidy::Haploid, Ploidy::Haploid)]
    fn lookup_supported(f: Ploidy, m: Ploidy, c: Ploidy) {
        // both variants exist and agree on possibility of the all-reference case
        let code = Code::new(2);
        let mendel = mendelian_lookup(f, m, c);
        let denovo = denovo_lookup(f, m, c);
        assert!(!mendel.probability_ln(&code, 0, 0, 0).is_zero());
        assert!(!mendel.is_denovo(&code, 0, 0, 0));
        assert!(!denovo.is_denovo(&code, 0, 0, 0));
    }

    #[test_case(Ploidy::Haploid, Ploidy::None, Ploidy::None)]
    #[test_case(Ploidy::None, Ploidy::Haploid, Ploidy::None)]
    fn no_copy_child_has_no_denovo_mass(f: Ploidy, m: Ploidy, c: Ploidy) {
        // a child without the locus transmits nothing that could mutate
        let code = Code::new(2);
        let denovo = denovo_lookup(f, m, c);
        for child in 0..code.range_size() {
            assert!(denovo.probability_ln(&code, 0, 0, child).is_zero());
            assert!(!denovo.is_denovo(&code, 0, 0, child));
        }
        let mendel = mendelian_lookup(f, m, c);
        assert!(mendel.probability_ln(&code, 0, 0, 0).is_one());
    }

    #[test]
    #[should_panic]
    fn lookup_both_parents_none() {
        mendelian_lookup(Ploidy::None, Ploidy::None, Ploidy::Haploid);
    }
    #[test]
    #[should_panic]
    fn lookup_unsupported_triple() {
        mendelian_lookup(Ploidy::Diploid, Ploidy::Diploid, Ploidy::Haploid);
    }
}
