//!
//! Mock sample models for tests
//!
use crate::code::{Code, Hypotheses, Ploidy};
use crate::family::Family;
use crate::model::Model;
use crate::prob::Prob;
use std::sync::Arc;

///
/// In-memory `Model` with explicit per-hypothesis posteriors.
///
#[derive(Debug, Clone)]
pub struct MockModel {
    hypotheses: Hypotheses,
    posteriors: Vec<Prob>,
    counts: Vec<f64>,
}

impl MockModel {
    pub fn new(hypotheses: Hypotheses, posteriors: Vec<Prob>, counts: Vec<f64>) -> MockModel {
        assert_eq!(posteriors.len(), hypotheses.size());
        MockModel {
            hypotheses,
            posteriors,
            counts,
        }
    }
    ///
    /// Mass `peak` on the called hypothesis, the remainder spread evenly
    /// over the others.
    ///
    pub fn peaked(hypotheses: Hypotheses, call: usize, peak: Prob, counts: Vec<f64>) -> MockModel {
        let size = hypotheses.size();
        assert!(call < size);
        let rest = if size > 1 {
            Prob::one().sub_prob(peak) / (size - 1)
        } else {
            Prob::zero()
        };
        let posteriors = (0..size).map(|h| if h == call { peak } else { rest }).collect();
        MockModel::new(hypotheses, posteriors, counts)
    }
}

impl Model for MockModel {
    fn hypotheses(&self) -> &Hypotheses {
        &self.hypotheses
    }
    fn posterior_ln0(&self, hyp: usize) -> Prob {
        self.posteriors[hyp]
    }
    fn allele_counts(&self) -> &[f64] {
        &self.counts
    }
}

pub fn diploid_hypotheses(code: &Arc<Code>) -> Hypotheses {
    Hypotheses::new(code.clone(), Ploidy::Diploid, 0)
}

pub fn haploid_hypotheses(code: &Arc<Code>) -> Hypotheses {
    Hypotheses::new(code.clone(), Ploidy::Haploid, 0)
}

pub fn none_hypotheses(code: &Arc<Code>) -> Hypotheses {
    Hypotheses::new(code.clone(), Ploidy::None, 0)
}

/// one observed read per allele
pub fn uniform_counts(range_size: usize) -> Vec<f64> {
    vec![1.0; range_size]
}

/// father, mother, one child, nobody diseased
pub fn mock_trio() -> Family {
    mock_family(1)
}

pub fn mock_family(n_children: usize) -> Family {
    Family::new(
        0,
        1,
        (2..2 + n_children).collect(),
        vec![false; 2 + n_children],
    )
}

/// flags are per sample index: father, mother, then children
pub fn mock_disease_family(flags: &[bool]) -> Family {
    assert!(flags.len() >= 2);
    Family::new(0, 1, (2..flags.len()).collect(), flags.to_vec())
}

///
/// One diploid `MockModel` per `(call, peak)` pair, in sample order.
///
pub fn mock_models_diploid(
    code: &Arc<Code>,
    calls: &[(usize, Prob)],
    counts: Vec<f64>,
) -> Vec<MockModel> {
    calls
        .iter()
        .map(|&(call, peak)| {
            MockModel::peaked(diploid_hypotheses(code), call, peak, counts.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prob::p;

    #[test]
    fn peaked_model_sums_to_one() {
        let code = Arc::new(Code::new(2));
        let m = MockModel::peaked(diploid_hypotheses(&code), 2, p(0.9), uniform_counts(2));
        let total: Prob = (0..3).map(|h| m.posterior_ln0(h)).sum();
        assert_abs_diff_eq!(total.to_value(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.posterior_ln0(2).to_value(), 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(m.posterior_ln0(0).to_value(), 0.05, epsilon = 1e-12);
        assert_eq!(m.reference(), 0);
    }
    #[test]
    fn disease_family_indices() {
        let f = mock_disease_family(&[true, false, true, false]);
        assert_eq!(f.children, vec![2, 3]);
        assert!(f.is_diseased(0) && f.is_diseased(2));
        assert!(f.one_parent_diseased());
    }
}
