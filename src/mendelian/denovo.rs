//!
//! De novo variants of the Mendelian transitions
//!
//! Each Mendelian-impossible cell is replaced by the mass of reaching the
//! observed child genotype by one single-base de novo mutation in a
//! transmitted allele: the sum over "sibling" genotypes one substitution
//! away of their Mendelian probability, halved over the two positions for
//! diploid children. At query time the mass is spread uniformly over the
//! `range_size - 1` candidate de novo alleles; the caller supplies the
//! ref/non-ref de novo log prior separately.
//!
use super::diploid::{canonical_diploid, diploid_cell_probs, DiploidTable};
use super::haploid::{canonical_x_male, haploid_cell_probs, haploid_father_cell_probs};
use super::{canonical_ok, haploid, MendelianAlleleProbability};
use crate::code::Code;
use crate::prob::Prob;
use crate::unique_id::UniqueId;
use once_cell::sync::Lazy;

fn spread(value: Prob, code: &Code) -> Prob {
    if code.range_size() < 2 {
        // no candidate de novo allele at a monomorphic site
        Prob::zero()
    } else {
        value / (code.range_size() - 1)
    }
}

static DIPLOID_DENOVO_TABLE: Lazy<Box<DiploidTable>> = Lazy::new(|| {
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
                            continue;
                        }
                        if !canonical_ok(&[0, mo1, fa0, fa1, ch0, ch1]) {
                            continue;
                        }
                        // siblings one substitution away, either position
                        let mut sum = 0.0;
                        for r in 0..6 {
                            sum += probs[r][ch1];
                            sum += probs[ch0][r];
                        }
                        if sum > 0.0 {
                            table[mo1][fa0][fa1][ch0][ch1] = Prob::from_prob(sum / 2.0);
                        }
                    }
                }
            }
        }
    }
    table
});

///
/// Autosomal de novo: diploid trio, one mutated transmitted allele.
///
pub struct AutosomeDiploidDeNovo;

impl MendelianAlleleProbability for AutosomeDiploidDeNovo {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        let (mo1, fa0, fa1, ch0, ch1) = canonical_diploid(code, father, mother, child);
        if fa0 > 3 || fa1 > 3 {
            return Prob::zero();
        }
        spread(DIPLOID_DENOVO_TABLE[mo1][fa0][fa1][ch0][ch1], code)
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        super::diploid::AutosomeDiploid
            .probability_ln(code, father, mother, child)
            .is_zero()
    }
}

///
/// X male-child de novo: the single maternally transmitted allele mutated.
/// Every maternal allele can be the origin, so the sibling sum is 1.
///
pub struct XMaleChildDeNovo;

impl MendelianAlleleProbability for XMaleChildDeNovo {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        let (mo1, ch) = canonical_x_male(code, father, mother, child);
        if haploid_cell_probs(mo1)[ch] > 0.0 {
            // Mendelian-reachable: no de novo mass
            Prob::zero()
        } else {
            spread(Prob::one(), code)
        }
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        haploid::XMaleChild
            .probability_ln(code, father, mother, child)
            .is_zero()
    }
}

static X_FEMALE_DENOVO_TABLE: Lazy<Box<[[[[Prob; 5]; 5]; 3]; 2]>> = Lazy::new(|| {
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
                        continue;
                    }
                    if !canonical_ok(&[0, mo1, fa, ch0, ch1]) {
                        continue;
                    }
                    let mut sum = 0.0;
                    for r in 0..5 {
                        sum += probs[r][ch1];
                        sum += probs[ch0][r];
                    }
                    if sum > 0.0 {
                        table[mo1][fa][ch0][ch1] = Prob::from_prob(sum / 2.0);
                    }
                }
            }
        }
    }
    table
});

///
/// X female-child de novo: one of the two transmitted alleles mutated.
///
pub struct XFemaleChildDeNovo;

impl MendelianAlleleProbability for XFemaleChildDeNovo {
    fn probability_ln(&self, code: &Code, father: usize, mother: usize, child: usize) -> Prob {
        let mut uid = UniqueId::new();
        uid.id(code.a(mother));
        let mo1 = uid.id(code.bc(mother));
        let fa = uid.id(code.a(father));
        let ch0 = uid.id(code.a(child));
        let ch1 = uid.id(code.bc(child));
        if fa > 2 {
            return Prob::zero();
        }
        spread(X_FEMALE_DENOVO_TABLE[mo1][fa][ch0][ch1], code)
    }
    fn is_denovo(&self, code: &Code, father: usize, mother: usize, child: usize) -> bool {
        haploid::XFemaleChild
            .probability_ln(code, father, mother, child)
            .is_zero()
    }
}

///
/// Y male-child de novo: flat `ln(1/3)` on father/child mismatch.
/// Only correct for single-nucleotide alleles; kept as the established
/// approximation.
///
pub struct YMaleChildDeNovo;

impl MendelianAlleleProbability for YMaleChildDeNovo {
    fn probability_ln(&self, code: &Code, father: usize, _mother: usize, child: usize) -> Prob {
        debug_assert!(father < code.range_size() && child < code.range_size());
        if father == child {
            Prob::zero()
        } else {
            Prob::from_prob(1.0 / 3.0)
        }
    }
    fn is_denovo(&self, _code: &Code, father: usize, _mother: usize, child: usize) -> bool {
        father != child
    }
}

///
/// Mitochondrial de novo: same flat single-nucleotide approximation.
///
pub struct MitoChildDeNovo;

impl MendelianAlleleProbability for MitoChildDeNovo {
    fn probability_ln(&self, code: &Code, _father: usize, mother: usize, child: usize) -> Prob {
        debug_assert!(mother < code.range_size() && child < code.range_size());
        if mother == child {
            Prob::zero()
        } else {
            Prob::from_prob(1.0 / 3.0)
        }
    }
    fn is_denovo(&self, _code: &Code, _father: usize, mother: usize, child: usize) -> bool {
        mother != child
    }
}

///
/// De novo model for a child carrying no copy of the locus: with nothing
/// transmitted there is nothing to mutate, so every cell has zero mass.
///
pub struct NoCopyDeNovo;

impl MendelianAlleleProbability for NoCopyDeNovo {
    fn probability_ln(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> Prob {
        Prob::zero()
    }
    fn is_denovo(&self, _code: &Code, _father: usize, _mother: usize, _child: usize) -> bool {
        false
    }
}
