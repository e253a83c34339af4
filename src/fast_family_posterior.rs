//!
//! Linear-in-children marginalization
//!
//! Given fixed parental genotypes the children are conditionally
//! independent, so the joint sum over child combinations factorizes into a
//! product of per-child totals. Prefix and suffix products of those totals
//! recover each child's "everyone else" factor, reducing the per-cell work
//! from the product of the child hypothesis counts to their sum.
//!
use crate::family::Family;
use crate::family_posterior::{
    needs_denovo_pass, process_cell, Accumulator, DeNovoStatus, HypothesisScore, SiteContext,
};
use crate::model::Model;
use crate::params::FamilyParams;
use crate::prob::Prob;
use itertools::iproduct;

///
/// Family posterior computed over the full parental grid with the
/// linear-in-children cell decomposition. Agrees with the brute-force
/// `FamilyPosterior` path to floating-point accuracy.
///
pub struct FastFamilyPosterior {
    father_marginal: Vec<Prob>,
    mother_marginal: Vec<Prob>,
    child_marginals: Vec<Vec<Prob>>,
    child_denovo: Vec<Vec<Prob>>,
    child_nondenovo: Vec<Vec<Prob>>,
    denovo_pass: bool,
    identity: Prob,
    non_identity: Prob,
    father_ref: usize,
    mother_ref: usize,
    child_refs: Vec<usize>,
}

impl FastFamilyPosterior {
    pub fn new<M: Model>(
        family: &Family,
        models: &[M],
        params: &FamilyParams,
    ) -> FastFamilyPosterior {
        let ctx = SiteContext::new(family, models, params);
        let mut acc = compute(&ctx, false);
        if needs_denovo_pass(&ctx, &acc) {
            acc = compute(&ctx, true);
        }
        FastFamilyPosterior {
            father_marginal: acc.father,
            mother_marginal: acc.mother,
            child_marginals: acc.children,
            child_denovo: acc.child_denovo,
            child_nondenovo: acc.child_nondenovo,
            denovo_pass: acc.denovo_accounting,
            identity: acc.identity,
            non_identity: acc.non_identity,
            father_ref: ctx.father_hyp().reference(),
            mother_ref: ctx.mother_hyp().reference(),
            child_refs: ctx
                .children
                .iter()
                .map(|c| c.hypotheses().reference())
                .collect(),
        }
    }

    fn score(marginal: &[Prob]) -> HypothesisScore {
        let (hypothesis, &best) = marginal
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1))
            .expect("empty marginal");
        let total: Prob = marginal.iter().sum();
        HypothesisScore {
            hypothesis,
            posterior: best.ratio(total.sub_prob(best)),
            denovo: DeNovoStatus::Unspecified,
        }
    }
    pub fn best_father(&self) -> HypothesisScore {
        Self::score(&self.father_marginal)
    }
    pub fn best_mother(&self) -> HypothesisScore {
        Self::score(&self.mother_marginal)
    }
    pub fn best_child(&self, i: usize) -> HypothesisScore {
        let mut score = Self::score(&self.child_marginals[i]);
        if self.denovo_pass {
            let h = score.hypothesis;
            score.denovo = if self.child_denovo[i][h] > self.child_nondenovo[i][h] {
                DeNovoStatus::IsDeNovo
            } else {
                DeNovoStatus::NotDeNovo
            };
        }
        score
    }
    pub fn is_interesting(&self) -> bool {
        self.best_father().hypothesis != self.father_ref
            || self.best_mother().hypothesis != self.mother_ref
            || (0..self.child_marginals.len())
                .any(|i| self.best_child(i).hypothesis != self.child_refs[i])
    }
    pub fn non_identity_posterior(&self) -> f64 {
        self.non_identity.ratio(self.identity)
    }
    pub fn father_marginal(&self) -> &[Prob] {
        &self.father_marginal
    }
    pub fn mother_marginal(&self) -> &[Prob] {
        &self.mother_marginal
    }
    pub fn child_marginal(&self, i: usize) -> &[Prob] {
        &self.child_marginals[i]
    }
}

fn compute<M: Model>(ctx: &SiteContext<M>, denovo_accounting: bool) -> Accumulator {
    let mut acc = Accumulator::new(ctx, denovo_accounting);
    for (f, m) in iproduct!(0..ctx.father_hyp().size(), 0..ctx.mother_hyp().size()) {
        process_cell(ctx, &mut acc, f, m);
    }
    acc
}
