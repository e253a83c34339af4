//!
//! Sex-chromosome and mitochondrial Mendelian transitions
//!
use super::{canonical_ok, MendelianAlleleProbability};
use crate::code::Code;
use crate::prob::Prob;
use crate::unique_id::UniqueId;
use once_cell::sync::Lazy;

///
/// Haploid-child probabilities for one canonical mother configuration:
/// `probs[ch]` = P(mother transmits canonical allele `ch`).
///
pub(super) fn haploid_cell_probs(mo1: usize) -> [f64; 4] {
    let mut probs = [0.0; 4];
    probs[0] += 0.5;
    probs[mo1] += 0.5;
    probs
}

///
/// Diploid-child probabilities with a haploid father: `probs[x][y]` =
/// P(child multiset `{x, y}`), stored symmetrically. The father
/// contributes his single allele, the mother one of hers.
///
pub(super) fn haploid_father_cell_probs(mo1: usize, fa: usize) -> [[f64; 5]; 5] {
    let mut probs = [[0.0; 5]; 5];
    for &tm in &[0, mo1] {
        if tm == fa {
            probs[tm][fa] += 0.5;
        } else {
            probs[tm][fa] += 0.5;
            probs[fa][tm] += 0.5;
        }
    }
    probs
}

static X_MALE_TABLE: Lazy<[[Prob; 4]; 2]> = Lazy::new(|| {
    let mut table = [[Prob::zero(); 4]; 2];
    for mo1 in 0..2 {
        let probs = haploid_cell_probs(mo1);
        for ch in 0..4 {
            if probs[ch] > 0.0 {
                table[mo1][ch] = Prob::from_prob(probs[ch]);
            }
        }
    }
    table
});

static X_FEMALE_TABLE: Lazy<Box<[[[[Prob; 5]; 5]; 3]; 2]>> = Lazy::new(|| {
    let mut table: Box<[[[[Prob; 5]; 5]; 3]; 2]> = Box::new([[[[Prob::zero(); 5]; 5]; 3]; 2]);
    for mo1 in 0..2 {
        for fa in 0..3 {
            if !canonical_ok(&[0, mo1, fa]) {
                continue;
            }
            let probs = haploid_father_cell_probs(mo1, fa);
            for ch0 in 0..5 {
                for ch1 in 0..5 {
                    if probs[ch0][ch1] > 0.0 {
                        table[mo1][fa][ch0][ch1] = Prob::from_prob(probs[ch0][ch1]);
                    }
                }
            }
        }
    }
    table
});

///
/// Canonicalize with a haploid father and haploid child:
/// mother-a, mother-bc, father, child.
///
pub(super) fn canonical_x_male(
    code: &Code,
    father: usize,
    mother: usize,
    child: usize,
) -> (usize, usize) {
    let mut uid = UniqueId::new();
    uid.id(code.a(mother));
    let mo1 = uid.id(code.bc(mother));
    uid.id(code.a(father));
    let ch = uid.id(code.a(child));
    (mo1, ch)
}

///
/// X chromosome, male child: father haploid, mother diploid, child
/// haploid drawn from the mother.
///
pub struct XMaleChild;

impl MendelianAlleleProbability for XMaleChild {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        debug_assert!(father < code.range_size() && child < code.range_size());
        let (mo1, ch) = canonical_x_male(code, father, mother, child);
        X_MALE_TABLE[mo1][ch]
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        self.probability_ln(code, father, mother, child).is_zero()
    }
}

///
/// X chromosome, female child: father haploid, mother diploid, child
/// diploid (father's allele plus one of the mother's).
///
pub struct XFemaleChild;

impl MendelianAlleleProbability for XFemaleChild {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        debug_assert!(father < code.range_size());
        let mut uid = UniqueId::new();
        uid.id(code.a(mother));
        let mo1 = uid.id(code.bc(mother));
        let fa = uid.id(code.a(father));
        let ch0 = uid.id(code.a(child));
        let ch1 = uid.id(code.bc(child));
        if fa > 2 {
            return Prob::zero();
        }
        X_FEMALE_TABLE[mo1][fa][ch0][ch1]
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        self.probability_ln(code, father, mother, child).is_zero()
    }
}

///
/// Y chromosome, male child: the child is a copy of the father.
///
pub struct YMaleChild;

impl MendelianAlleleProbability for YMaleChild {
    fn probability_ln(&self, code: &Code, father: usize, _mother: usize, child: usize) -> Prob {
        debug_assert!(father < code.range_size() && child < code.range_size());
        if father == child {
            Prob::one()
        } else {
            Prob::zero()
        }
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        self.probability_ln(code, father, mother, child).is_zero()
    }
}

///
/// Y chromosome, female child: the child has no copy of the locus.
///
pub struct YFemaleChild;

impl MendelianAlleleProbability for YFemaleChild {
    fn probability_ln(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> Prob {
        Prob::one()
    }
    fn is_denovo(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> bool {
        false
    }
}

///
/// Mitochondrial inheritance: the child is a copy of the mother.
///
pub struct MitoChild;

impl MendelianAlleleProbability for MitoChild {
    fn probability_ln(&self, code: &Code, _father: usize, mother: usize, child: usize) -> Prob {
        debug_assert!(mother < code.range_size() && child < code.range_size());
        if mother == child {
            Prob::one()
        } else {
            Prob::zero()
        }
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        self.probability_ln(code, father, mother, child).is_zero()
    }
}

///
/// Mitochondrial locus for a sample carrying no copy.
///
pub struct MitoNone;

impl MendelianAlleleProbability for MitoNone {
    fn probability_ln(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> Prob {
        Prob::one()
    }
    fn is_denovo(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_male_het_mother() {
        // mother heterozygous: each of her alleles with probability 1/2,
        // anything else impossible
        let code = Code::new(3);
        let het = code.code(0, 1);
        let m = XMaleChild;
        assert_abs_diff_eq!(
            m.probability_ln(&code, 2, het, 0).to_value(),
            0.5,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            m.probability_ln(&code, 2, het, 1).to_value(),
            0.5,
            epsilon = 1e-12
        );
        assert!(m.probability_ln(&code, 2, het, 2).is_zero());
    }
    #[test]
    fn x_male_hom_mother() {
        let code = Code::new(2);
        let m = XMaleChild;
        assert!(m.probability_ln(&code, 1, 0, 0).is_one());
        assert!(m.probability_ln(&code, 1, 0, 1).is_zero());
    }
    #[test]
    fn x_female() {
        let code = Code::new(2);
        let het = code.code(0, 1);
        let m = XFemaleChild;
        // father 1, mother {0,0}: child always {0,1}
        assert!(m.probability_ln(&code, 1, 0, het).is_one());
        assert!(m.probability_ln(&code, 1, 0, 0).is_zero());
        // father 0, mother {0,1}: child {0,0} or {0,1}, each 1/2
        assert_abs_diff_eq!(
            m.probability_ln(&code, 0, het, 0).to_value(),
            0.5,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            m.probability_ln(&code, 0, het, het).to_value(),
            0.5,
            epsilon = 1e-12
        );
        assert!(m.probability_ln(&code, 0, het, 1).is_zero());
    }
    #[test]
    fn y_male_copies_father() {
        let code = Code::new(3);
        let m = YMaleChild;
        for x in 0..3 {
            for y in 0..3 {
                if x == y {
                    assert!(m.probability_ln(&code, x, 0, y).is_one());
                } else {
                    assert!(m.probability_ln(&code, x, 0, y).is_zero());
                    assert!(m.is_denovo(&code, x, 0, y));
                }
            }
        }
    }
    #[test]
    fn mito_copies_mother() {
        let code = Code::new(2);
        let m = MitoChild;
        assert!(m.probability_ln(&code, 0, 1, 1).is_one());
        assert!(m.probability_ln(&code, 0, 1, 0).is_zero());
    }
    #[test]
    fn no_copy_is_certain() {
        let code = Code::new(2);
        assert!(YFemaleChild.probability_ln(&code, 0, 0, 0).is_one());
        assert!(MitoNone.probability_ln(&code, 0, 0, 0).is_one());
    }
}
