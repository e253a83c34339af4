//!
//! Diploid-by-diploid Mendelian segregation (autosomes)
//!
use super::{canonical_ok, MendelianAlleleProbability};
use crate::code::Code;
use crate::prob::Prob;
use crate::unique_id::UniqueId;
use once_cell::sync::Lazy;

/// canonical table type: `[mo1][fa0][fa1][ch0][ch1]`
pub(super) type DiploidTable = [[[[[Prob; 6]; 6]; 4]; 4]; 2];

///
/// Unordered child-genotype probabilities for one canonical parental
/// configuration. `probs[x][y]` is the probability of the child multiset
/// `{x, y}`, stored symmetrically, so each of the four equally likely
/// transmissions contributes 1/4.
///
pub(super) fn diploid_cell_probs(mo1: usize, fa0: usize, fa1: usize) -> [[f64; 6]; 6] {
    let mut probs = [[0.0; 6]; 6];
    for &tm in &[0, mo1] {
        for &tf in &[fa0, fa1] {
            if tm == tf {
                probs[tm][tf] += 0.25;
            } else {
                probs[tm][tf] += 0.25;
                probs[tf][tm] += 0.25;
            }
        }
    }
    probs
}

static TABLE: Lazy<Box<DiploidTable>> = Lazy::new(|| {
    let mut table: Box<DiploidTable> = Box::new([[[[[Prob::zero(); 6]; 6]; 4]; 4]; 2]);
    for mo1 in 0..2 {
        for fa0 in 0..4 {
            for fa1 in 0..4 {
                if !canonical_ok(&[0, mo1, fa0, fa1]) {
                    continue;
                }
                let probs = diploid_cell_probs(mo1, fa0, fa1);
                for ch0 in 0..6 {
                    for ch1 in 0..6 {
                        if probs[ch0][ch1] > 0.0 {
                            table[mo1][fa0][fa1][ch0][ch1] = Prob::from_prob(probs[ch0][ch1]);
                        }
                    }
                }
            }
        }
    }
    table
});

///
/// Canonicalize one (father, mother, child) diploid triple into the table
/// index space. Seeding order is mother-a, mother-bc, father-a, father-bc,
/// child-a, child-bc.
///
pub(super) fn canonical_diploid(
    code: &Code,
    father: usize,
    mother: usize,
    child: usize,
) -> (usize, usize, usize, usize, usize) {
    let mut uid = UniqueId::new();
    let mo0 = uid.id(code.a(mother));
    debug_assert_eq!(mo0, 0);
    let mo1 = uid.id(code.bc(mother));
    let fa0 = uid.id(code.a(father));
    let fa1 = uid.id(code.bc(father));
    let ch0 = uid.id(code.a(child));
    let ch1 = uid.id(code.bc(child));
    (mo1, fa0, fa1, ch0, ch1)
}

///
/// Autosomal case: both parents and the child diploid.
///
pub struct AutosomeDiploid;

impl MendelianAlleleProbability for AutosomeDiploid {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        let (mo1, fa0, fa1, ch0, ch1) = canonical_diploid(code, father, mother, child);
        if fa0 > 3 || fa1 > 3 {
            // parent contribution outside the canonical table: impossible
            return Prob::zero();
        }
        TABLE[mo1][fa0][fa1][ch0][ch1]
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        self.probability_ln(code, father, mother, child).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(code: &Code, f: usize, mo: usize, c: usize) -> Prob {
        AutosomeDiploid.probability_ln(code, f, mo, c)
    }

    #[test]
    fn hom_ref_parents() {
        let code = Code::new(2);
        // {0,0} x {0,0} -> {0,0} with certainty
        assert!(m(&code, 0, 0, 0).is_one());
        assert!(m(&code, 0, 0, 1).is_zero());
        assert!(m(&code, 0, 0, code.code(0, 1)).is_zero());
    }
    #[test]
    fn het_by_het() {
        let code = Code::new(2);
        let het = code.code(0, 1);
        assert_abs_diff_eq!(m(&code, het, het, 0).to_value(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(m(&code, het, het, het).to_value(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m(&code, het, het, 1).to_value(), 0.25, epsilon = 1e-12);
    }
    #[test]
    fn hom_by_het() {
        let code = Code::new(2);
        let het = code.code(0, 1);
        assert_abs_diff_eq!(m(&code, 0, het, 0).to_value(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m(&code, 0, het, het).to_value(), 0.5, epsilon = 1e-12);
        assert!(m(&code, 0, het, 1).is_zero());
    }
    #[test]
    fn hom_by_hom_distinct() {
        let code = Code::new(2);
        // {0,0} x {1,1} -> child must be het
        assert!(m(&code, 1, 0, 0).is_zero());
        assert!(m(&code, 1, 0, 1).is_zero());
        assert!(m(&code, 1, 0, code.code(0, 1)).is_one());
    }
    #[test]
    fn relabeling_symmetry() {
        // the same sharing pattern with different allele labels gives the
        // same probability
        let code = Code::new(4);
        let a = m(&code, code.code(0, 1), code.code(0, 1), 0);
        let b = m(&code, code.code(2, 3), code.code(2, 3), 2);
        assert_abs_diff_eq!(a, b);
        let c = m(&code, code.code(1, 2), 3, code.code(1, 3));
        let d = m(&code, code.code(0, 2), 1, code.code(0, 1));
        assert_abs_diff_eq!(c, d);
    }
    #[test]
    fn sums_to_one_over_children() {
        let code = Code::new(4);
        for father in 0..code.size() {
            for mother in 0..code.size() {
                let total: Prob = (0..code.size()).map(|c| m(&code, father, mother, c)).sum();
                assert_abs_diff_eq!(total.to_log_value(), 0.0, epsilon = 1e-9);
            }
        }
    }
    #[test]
    fn impossible_flags_denovo() {
        let code = Code::new(2);
        assert!(AutosomeDiploid.is_denovo(&code, 0, 0, 1));
        assert!(!AutosomeDiploid.is_denovo(&code, 0, 0, 0));
    }
}
