//!
//! Generative prior over parental genotype pairs
//!
//! `P†(code, ref, father, mother)`: the prior probability of observing
//! this specific unordered parental pair, independent of transmission.
//! Every parental chromosome is taken uniform over the allele set implied
//! by the pair (the parents' alleles plus the reference); heterozygous
//! diploid genotypes count their two orderings. Multi-allelic pairs imply
//! a larger set and therefore a smaller prior, which is the point.
//!
use crate::code::{Code, Ploidy};
use crate::lattice::AlleleSet;
use crate::prob::Prob;

///
/// `ln P†` for one (father-ploidy, mother-ploidy) pair. Stateless
/// singletons, selected once via `allele_prob_lookup`.
///
pub trait AlleleProbability: Sync {
    fn probability_ln(&self, code: &Code, reference: usize, father: usize, mother: usize) -> Prob;
}

///
/// Select the parental-pair prior for a ploidy pair; both parents
/// `Ploidy::None` is unsupported and panics.
///
pub fn allele_prob_lookup(father: Ploidy, mother: Ploidy) -> &'static dyn AlleleProbability {
    use Ploidy::*;
    match (father, mother) {
        (Haploid, Haploid) => &PAIR_HH,
        (Haploid, Diploid) => &PAIR_HD,
        (Diploid, Haploid) => &PAIR_DH,
        (Diploid, Diploid) => &PAIR_DD,
        (Haploid, None) => &PAIR_HN,
        (None, Haploid) => &PAIR_NH,
        (Diploid, None) => &PAIR_DN,
        (None, Diploid) => &PAIR_ND,
        (None, None) => panic!("unsupported ploidy combination: both parents NONE"),
    }
}

///
/// The shared density: `m_f * m_m / |S|^k` with `S` the implied allele
/// set and `k` the total parental haploid slots.
///
struct PairPrior {
    father: Ploidy,
    mother: Ploidy,
}

static PAIR_HH: PairPrior = PairPrior {
    father: Ploidy::Haploid,
    mother: Ploidy::Haploid,
};
static PAIR_HD: PairPrior = PairPrior {
    father: Ploidy::Haploid,
    mother: Ploidy::Diploid,
};
static PAIR_DH: PairPrior = PairPrior {
    father: Ploidy::Diploid,
    mother: Ploidy::Haploid,
};
static PAIR_DD: PairPrior = PairPrior {
    father: Ploidy::Diploid,
    mother: Ploidy::Diploid,
};
static PAIR_HN: PairPrior = PairPrior {
    father: Ploidy::Haploid,
    mother: Ploidy::None,
};
static PAIR_NH: PairPrior = PairPrior {
    father: Ploidy::None,
    mother: Ploidy::Haploid,
};
static PAIR_DN: PairPrior = PairPrior {
    father: Ploidy::Diploid,
    mother: Ploidy::None,
};
static PAIR_ND: PairPrior = PairPrior {
    father: Ploidy::None,
    mother: Ploidy::Diploid,
};

fn genotype_alleles(code: &Code, ploidy: Ploidy, hyp: usize) -> AlleleSet {
    match ploidy {
        Ploidy::None => AlleleSet::empty(),
        Ploidy::Haploid => AlleleSet::singleton(code.a(hyp)),
        Ploidy::Diploid => code.alleles(hyp),
    }
}

fn orderings(code: &Code, ploidy: Ploidy, hyp: usize) -> usize {
    match ploidy {
        Ploidy::Diploid if !code.homozygous(hyp) => 2,
        _ => 1,
    }
}

impl AlleleProbability for PairPrior {
    fn probability_ln(&self, code: &Code, reference: usize, father: usize, mother: usize) -> Prob {
        let set = genotype_alleles(code, self.father, father)
            .union(genotype_alleles(code, self.mother, mother))
            .union(AlleleSet::singleton(reference));
        let slots = self.father.count() + self.mother.count();
        let m = orderings(code, self.father, father) * orderings(code, self.mother, mother);
        Prob::from_prob(m as f64) / set.len().pow(slots as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::p;

    #[test]
    fn diploid_pair_reference_only() {
        let code = Code::new(2);
        let p_dd = allele_prob_lookup(Ploidy::Diploid, Ploidy::Diploid);
        // both hom-ref: S = {ref}, prior 1
        assert!(p_dd.probability_ln(&code, 0, 0, 0).is_one());
    }
    #[test]
    fn diploid_pair_multiallelic_penalized() {
        let code = Code::new(3);
        let p_dd = allele_prob_lookup(Ploidy::Diploid, Ploidy::Diploid);
        let bi = p_dd.probability_ln(&code, 0, code.code(0, 1), 0);
        let tri = p_dd.probability_ln(&code, 0, code.code(0, 1), code.code(0, 2));
        assert!(bi > tri);
        // het x hom-ref over S={0,1}: 2 / 2^4
        assert_abs_diff_eq!(bi, p(2.0 / 16.0), epsilon = 1e-12);
        // het x het over S={0,1,2}: 4 / 3^4
        assert_abs_diff_eq!(tri, p(4.0 / 81.0), epsilon = 1e-12);
    }
    #[test]
    fn haploid_none_pair() {
        let code = Code::new(2);
        let p_hn = allele_prob_lookup(Ploidy::Haploid, Ploidy::None);
        assert!(p_hn.probability_ln(&code, 0, 0, 0).is_one());
        // father alt: S = {0,1}, one slot
        assert_abs_diff_eq!(p_hn.probability_ln(&code, 0, 1, 0), p(0.5), epsilon = 1e-12);
    }
    #[test]
    fn haploid_diploid_pair() {
        let code = Code::new(2);
        let p_hd = allele_prob_lookup(Ploidy::Haploid, Ploidy::Diploid);
        let het = code.code(0, 1);
        // father ref, mother het: 2 / 2^3
        assert_abs_diff_eq!(
            p_hd.probability_ln(&code, 0, 0, het),
            p(0.25),
            epsilon = 1e-12
        );
    }
    #[test]
    #[should_panic]
    fn both_none_unsupported() {
        allele_prob_lookup(Ploidy::None, Ploidy::None);
    }
}
