//!
//! End-to-end family calling tests
//!
#[macro_use]
extern crate approx;

use pedcall::code::Code;
use pedcall::disease::FastDiseasedFamilyPosterior;
use pedcall::family_posterior::{DeNovoStatus, FamilyPosterior};
use pedcall::fast_family_posterior::FastFamilyPosterior;
use pedcall::mocks::{
    diploid_hypotheses, mock_disease_family, mock_family, mock_models_diploid, mock_trio,
    uniform_counts, MockModel,
};
use pedcall::params::FamilyParams;
use pedcall::prob::{p, Prob};
use rayon::prelude::*;
use std::sync::Arc;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn marginals_agree(a: &[Prob], b: &[Prob], epsilon: f64) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!(x.log_diff(*y) < epsilon, "marginal {} vs {}", x, y);
    }
}

#[test]
fn brute_force_and_linear_decomposition_agree() {
    init();
    let params = FamilyParams::default();
    let family = mock_family(2);
    let code = Arc::new(Code::new(2));
    let het = code.code(0, 1);
    let models = mock_models_diploid(
        &code,
        &[(het, p(0.8)), (0, p(0.7)), (1, p(0.6)), (0, p(0.9))],
        uniform_counts(2),
    );
    // grid is 3x3, so this takes the exhaustive recursive path
    let slow = FamilyPosterior::new(&family, &models, &params);
    let fast = FastFamilyPosterior::new(&family, &models, &params);
    marginals_agree(slow.father_marginal(), fast.father_marginal(), 1e-6);
    marginals_agree(slow.mother_marginal(), fast.mother_marginal(), 1e-6);
    for i in 0..family.n_children() {
        marginals_agree(slow.child_marginal(i), fast.child_marginal(i), 1e-6);
    }
    assert_eq!(slow.is_interesting(), fast.is_interesting());
    assert_abs_diff_eq!(
        slow.non_identity_posterior(),
        fast.non_identity_posterior(),
        epsilon = 1e-6
    );
}

///
/// The truncated marginal can only underestimate, and any hypothesis
/// within `t` log units of the best must agree closely: the stopping rule
/// keeps unexplored mass below `best * exp(-t)`.
///
fn truncated_marginal_close(truncated: &[Prob], full: &[Prob], t: f64) {
    assert_eq!(truncated.len(), full.len());
    let best = full.iter().copied().max().unwrap();
    let floor = best * Prob::from_log_prob(-t);
    for (x, y) in truncated.iter().zip(full.iter()) {
        assert!(x.to_log_value() <= y.to_log_value() + 1e-9, "{} > {}", x, y);
        if *x >= floor {
            assert!(x.log_diff(*y) < 1.0, "marginal {} vs {}", x, y);
        }
    }
}

#[test]
fn best_first_search_matches_full_grid() {
    init();
    let params = FamilyParams::default();
    let family = mock_trio();
    // 5 alleles: 15 diploid genotypes, a 225-cell parental grid, so
    // FamilyPosterior walks it best-first; the posteriors are sharp
    // enough that it stops early
    let code = Arc::new(Code::new(5));
    let het03 = code.code(0, 3);
    let models = mock_models_diploid(
        &code,
        &[
            (het03, p(1.0 - 1e-6)),
            (0, p(1.0 - 1e-6)),
            (het03, p(1.0 - 1e-4)),
        ],
        uniform_counts(5),
    );
    let truncated = FamilyPosterior::new(&family, &models, &params);
    let full = FastFamilyPosterior::new(&family, &models, &params);
    let t = params.term_threshold;
    truncated_marginal_close(truncated.father_marginal(), full.father_marginal(), t);
    truncated_marginal_close(truncated.mother_marginal(), full.mother_marginal(), t);
    truncated_marginal_close(truncated.child_marginal(0), full.child_marginal(0), t);
    assert_eq!(
        truncated.best_father().hypothesis,
        full.best_father().hypothesis
    );
    assert_eq!(
        truncated.best_mother().hypothesis,
        full.best_mother().hypothesis
    );
    assert_eq!(
        truncated.best_child(0).hypothesis,
        full.best_child(0).hypothesis
    );
    assert_eq!(truncated.is_interesting(), full.is_interesting());
    assert!(
        (truncated.best_father().posterior - full.best_father().posterior).abs() < t,
        "decided log-odds {} vs {}",
        truncated.best_father().posterior,
        full.best_father().posterior
    );
    assert_eq!(truncated.best_father().hypothesis, het03);
    assert_eq!(truncated.best_child(0).hypothesis, het03);
}

#[test]
fn confident_reference_trio_is_not_interesting() {
    init();
    let params = FamilyParams::default();
    let family = mock_trio();
    let code = Arc::new(Code::new(2));
    let models = mock_models_diploid(
        &code,
        &[(0, p(0.999)), (0, p(0.999)), (0, p(0.999))],
        uniform_counts(2),
    );
    let post = FastFamilyPosterior::new(&family, &models, &params);
    assert!(!post.is_interesting());
    assert!(post.non_identity_posterior() < 0.0);
    assert_eq!(post.best_child(0).denovo, DeNovoStatus::Unspecified);
}

#[test]
fn confident_de_novo_child_gets_flagged() {
    init();
    let params = FamilyParams::default();
    let family = mock_trio();
    let code = Arc::new(Code::new(2));
    let het = code.code(0, 1);
    // both parents all but certainly hom-ref with no reads of the alt
    // allele, the child all but certainly het
    let certain = |call: usize| {
        let mut post = vec![p(1e-14); 3];
        post[call] = Prob::one();
        MockModel::new(diploid_hypotheses(&code), post, vec![10.0, 0.0])
    };
    let models = vec![certain(0), certain(0), certain(het)];
    let post = FastFamilyPosterior::new(&family, &models, &params);
    let child = post.best_child(0);
    assert_eq!(child.hypothesis, het);
    assert_eq!(child.denovo, DeNovoStatus::IsDeNovo);
    assert!(post.is_interesting());
}

#[test]
fn inherited_alt_is_not_de_novo() {
    init();
    let params = FamilyParams::default();
    let family = mock_trio();
    let code = Arc::new(Code::new(2));
    let het = code.code(0, 1);
    let models = mock_models_diploid(
        &code,
        &[(het, p(0.99)), (0, p(0.99)), (het, p(0.99))],
        uniform_counts(2),
    );
    let post = FastFamilyPosterior::new(&family, &models, &params);
    let child = post.best_child(0);
    assert_eq!(child.hypothesis, het);
    assert_ne!(child.denovo, DeNovoStatus::IsDeNovo);
}

#[test]
fn disease_allele_called_from_phenotypes() {
    init();
    let params = FamilyParams::default();
    // diseased father and first child, healthy mother and second child
    let family = mock_disease_family(&[true, false, true, false]);
    let code = Arc::new(Code::new(2));
    let het = code.code(0, 1);
    let models = mock_models_diploid(
        &code,
        &[(het, p(0.9)), (0, p(0.9)), (1, p(0.9)), (0, p(0.9))],
        uniform_counts(2),
    );
    let post = FastDiseasedFamilyPosterior::new(&family, &models, &params);
    assert_eq!(post.best_disease().allele, Some(1));
    assert!(post.any_disease_posterior_ratio() > 0.0);
    assert!(post.is_interesting());
}

#[test]
fn sites_are_independent_under_rayon() {
    init();
    let params = FamilyParams::default();
    let family = mock_trio();
    let code = Arc::new(Code::new(2));
    let het = code.code(0, 1);
    // even sites are all-reference, odd sites carry an inherited alt
    let results: Vec<bool> = (0..64usize)
        .into_par_iter()
        .map(|site| {
            let call = if site % 2 == 0 { 0 } else { het };
            let models = mock_models_diploid(
                &code,
                &[(call, p(0.99)), (0, p(0.99)), (call, p(0.99))],
                uniform_counts(2),
            );
            FastFamilyPosterior::new(&family, &models, &params).is_interesting()
        })
        .collect();
    for (site, interesting) in results.iter().enumerate() {
        assert_eq!(*interesting, site % 2 != 0, "site {}", site);
    }
}
