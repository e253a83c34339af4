//!
//! Priors and tuning constants for the family caller
//!
use crate::prob::{p, Prob};

///
/// Priors shared by all sites of a run.
///
/// The early-termination constants of the best-first search are
/// empirically tuned values carried as named fields; they are not derived
/// from first principles.
///
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FamilyParams {
    /// geometric decay base of the allele-frequency prior
    pub theta: f64,
    /// prior of a de novo mutation to the reference allele
    pub denovo_ref: Prob,
    /// prior of a de novo mutation to a non-reference allele
    pub denovo_nonref: Prob,
    /// per-read probability of contrary evidence
    pub contrary: Prob,
    /// prior probability that no allele explains the disease
    pub no_disease: f64,
    /// margin (natural-log units) of the best-first stopping rule
    pub term_threshold: f64,
    /// side of the fully-computed square around the reference cell
    pub square_first: usize,
    /// always compute the first cell of every row and column
    pub first_hyp_fully: bool,
}

impl FamilyParams {
    pub fn new(
        theta: f64,
        denovo_ref: Prob,
        denovo_nonref: Prob,
        contrary: Prob,
        no_disease: f64,
    ) -> FamilyParams {
        assert!(theta > 0.0 && theta < 1.0);
        assert!(no_disease > 0.0 && no_disease < 1.0);
        FamilyParams {
            theta,
            denovo_ref,
            denovo_nonref,
            contrary,
            no_disease,
            term_threshold: 10.0,
            square_first: 4,
            first_hyp_fully: true,
        }
    }
    ///
    /// Log prior of seeing `n` distinct non-reference alleles in the
    /// parental pair: `theta^n`.
    ///
    pub fn allele_frequency_ln(&self, n: usize) -> Prob {
        Prob::from_log_prob(self.theta.ln() * n as f64)
    }
}

impl Default for FamilyParams {
    fn default() -> Self {
        // theta is loose enough that two confident carrier parents beat
        // the combined pair prior at a biallelic site; no_disease assumes
        // the caller only visits candidate sites
        FamilyParams::new(1e-2, p(1e-8), p(1e-9), p(1e-2), 0.5)
    }
}
