//!
//! Mendelian-consistency diagnostic
//!
//! Given fixed parental genotypes, the observed multiset of child
//! genotypes should look like draws from the Mendelian transmission
//! distribution. The segregation score is the log multinomial probability
//! of the observed counts under that distribution; small values flag
//! sample mixups and systematic calling errors across large sibships.
//!
use crate::binomial::log_factorial;
use crate::code::Hypotheses;
use crate::mendelian::mendelian_lookup;
use crate::prob::Prob;

///
/// Running tally of child genotypes against fixed parents.
///
pub trait Segregation {
    /// record one child called as `child_hyp`
    fn increment(&mut self, child_hyp: usize);
    ///
    /// Log multinomial probability of the recorded counts. `-inf` when a
    /// recorded child is Mendelian-impossible for the parents.
    ///
    fn ln_probability(&self) -> f64;
}

///
/// Multinomial over child genotype ids with Mendelian cell probabilities.
///
/// One scorer handles every supported ploidy triple, the transmission
/// distribution comes straight from the Mendelian table; with no
/// transmitted copy the single hypothesis has probability one and the
/// score is zero.
///
#[derive(Debug)]
pub struct SegregationScore {
    lnp: Vec<Prob>,
    counts: Vec<usize>,
    total: usize,
}

impl SegregationScore {
    ///
    /// Scorer for children of `(father, mother)` called as genotype ids
    /// `f` and `m`.
    ///
    pub fn new(
        father: &Hypotheses,
        mother: &Hypotheses,
        child: &Hypotheses,
        f: usize,
        m: usize,
    ) -> SegregationScore {
        let model = mendelian_lookup(father.ploidy(), mother.ploidy(), child.ploidy());
        let code = father.code();
        let lnp = (0..child.size())
            .map(|h| model.probability_ln(code, f, m, h))
            .collect::<Vec<_>>();
        let counts = vec![0; lnp.len()];
        SegregationScore {
            lnp,
            counts,
            total: 0,
        }
    }
}

impl Segregation for SegregationScore {
    fn increment(&mut self, child_hyp: usize) {
        self.counts[child_hyp] += 1;
        self.total += 1;
    }
    fn ln_probability(&self) -> f64 {
        let mut sum = log_factorial(self.total);
        for (h, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            if self.lnp[h].is_zero() {
                return f64::NEG_INFINITY;
            }
            sum += count as f64 * self.lnp[h].to_log_value() - log_factorial(count);
        }
        sum
    }
}

///
/// Render a segregation log-probability for the `SGP` VCF INFO field.
///
pub fn format_segregation(ln_p: f64, decimals: usize) -> String {
    if ln_p == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:.*}", decimals, ln_p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Code, Ploidy};
    use crate::mocks::{diploid_hypotheses, haploid_hypotheses, none_hypotheses};
    use std::sync::Arc;

    #[test]
    fn het_by_het_children() {
        // het x het: child probs 1/4 hom-ref, 1/4 hom-alt, 1/2 het
        let code = Arc::new(Code::new(2));
        let h = diploid_hypotheses(&code);
        let het = code.code(0, 1);
        let mut s = SegregationScore::new(&h, &h, &h, het, het);
        s.increment(0);
        s.increment(1);
        s.increment(het);
        s.increment(het);
        // 4!/(1!1!2!) * (1/4)(1/4)(1/2)^2 = 12/64
        assert_abs_diff_eq!(s.ln_probability(), (12f64 / 64.0).ln(), epsilon = 1e-9);
    }
    #[test]
    fn impossible_child_is_minus_infinity() {
        let code = Arc::new(Code::new(2));
        let h = diploid_hypotheses(&code);
        // hom-ref x hom-ref cannot produce a het child
        let mut s = SegregationScore::new(&h, &h, &h, 0, 0);
        s.increment(code.code(0, 1));
        assert_eq!(s.ln_probability(), f64::NEG_INFINITY);
    }
    #[test]
    fn consistent_children_of_hom_parents() {
        let code = Arc::new(Code::new(2));
        let h = diploid_hypotheses(&code);
        let mut s = SegregationScore::new(&h, &h, &h, 0, 0);
        s.increment(0);
        s.increment(0);
        s.increment(0);
        assert_abs_diff_eq!(s.ln_probability(), 0.0, epsilon = 1e-12);
    }
    #[test]
    fn x_linked_sons_from_het_mother() {
        // sons draw one allele from a het mother, 1/2 each
        let code = Arc::new(Code::new(2));
        let father = haploid_hypotheses(&code);
        let mother = diploid_hypotheses(&code);
        let son = haploid_hypotheses(&code);
        let het = code.code(0, 1);
        let mut s = SegregationScore::new(&father, &mother, &son, 0, het);
        s.increment(0);
        s.increment(1);
        // 2!/(1!1!) * (1/2)^2 = 1/2
        assert_abs_diff_eq!(s.ln_probability(), 0.5f64.ln(), epsilon = 1e-9);
    }
    #[test]
    fn y_daughters_score_zero() {
        // no transmitted copy: the single hypothesis always fits
        let code = Arc::new(Code::new(1));
        let father = haploid_hypotheses(&code);
        let mother = none_hypotheses(&code);
        let daughter = none_hypotheses(&code);
        assert_eq!(father.ploidy(), Ploidy::Haploid);
        let mut s = SegregationScore::new(&father, &mother, &daughter, 0, 0);
        s.increment(0);
        s.increment(0);
        assert_abs_diff_eq!(s.ln_probability(), 0.0, epsilon = 1e-12);
    }
    #[test]
    fn expected_ratios_score_highest() {
        // het x het with 8 children: the expected 2:2:4 split beats every
        // one-child perturbation of it
        let code = Arc::new(Code::new(2));
        let h = diploid_hypotheses(&code);
        let het = code.code(0, 1);
        let score_of = |counts: [usize; 3]| {
            let mut s = SegregationScore::new(&h, &h, &h, het, het);
            for (hyp, &count) in counts.iter().enumerate() {
                for _ in 0..count {
                    s.increment(hyp);
                }
            }
            s.ln_probability()
        };
        let expected = score_of([2, 2, 4]);
        for &perturbed in &[
            [3, 2, 3],
            [2, 3, 3],
            [1, 2, 5],
            [2, 1, 5],
            [3, 1, 4],
            [1, 3, 4],
        ] {
            assert!(expected > score_of(perturbed), "{:?}", perturbed);
        }
    }
    #[test]
    fn format_default_decimals() {
        assert_eq!(format_segregation(-1.23456, 3), "-1.235");
        assert_eq!(format_segregation(0.0, 3), "0.000");
        assert_eq!(format_segregation(f64::NEG_INFINITY, 3), "-inf");
    }
}
