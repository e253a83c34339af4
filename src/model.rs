//!
//! Per-sample likelihood contract
//!
use crate::code::Hypotheses;
use crate::prob::Prob;

///
/// Black box turning one sample's read pileup into per-hypothesis
/// unnormalized log posteriors. Implemented by the calling pipeline;
/// this crate only consumes it.
///
pub trait Model {
    fn hypotheses(&self) -> &Hypotheses;
    ///
    /// Unnormalized log posterior (likelihood times flat prior) of
    /// hypothesis `hyp`.
    ///
    fn posterior_ln0(&self, hyp: usize) -> Prob;
    /// index of the reference hypothesis
    fn reference(&self) -> usize {
        self.hypotheses().reference()
    }
    ///
    /// Observed read count per allele id, used by the contrary-evidence
    /// adjustment.
    ///
    fn allele_counts(&self) -> &[f64];
}
