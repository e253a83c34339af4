//!
//! Per-site Bayesian genotype posteriors over a pedigree.
//!
//! Per-sample genotype posteriors (`model::Model`) are combined with
//! Mendelian transmission tables (`mendelian`), parental-pair priors
//! (`allele_prob`) and population priors (`params`) into joint family
//! marginals: `family_posterior` and `fast_family_posterior` for genotype
//! calls, `disease` for which allele explains a disease phenotype, and
//! `segregation` for a Mendelian-consistency score over a sibship.
//!
pub mod allele_prob;
pub mod binomial;
pub mod code;
pub mod disease;
pub mod family;
pub mod family_posterior;
pub mod fast_family_posterior;
pub mod lattice;
pub mod mendelian;
pub mod mocks;
pub mod model;
pub mod params;
pub mod prob;
pub mod segregation;
pub mod unique_id;

#[macro_use]
extern crate approx;
extern crate arrayvec;
