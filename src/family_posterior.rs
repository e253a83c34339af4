//!
//! Full family marginalization
//!
//! For one genomic site, computes the unnormalized log-marginal mass of
//! every hypothesis of every family member, summed over all configurations
//! of the rest of the family weighted by per-sample posteriors, Mendelian
//! transitions and the parental-pair priors.
//!
//! Two paths share the accumulator: `compute_alleles` enumerates every
//! child combination recursively and is used for small parental grids;
//! `compute_super_alleles` walks the (father, mother) grid best-first and
//! stops once the remaining unexplored mass can no longer change the
//! answers by more than `term_threshold` log units.
//!
use crate::allele_prob::{allele_prob_lookup, AlleleProbability};
use crate::binomial::log_binomial;
use crate::code::Hypotheses;
use crate::family::Family;
use crate::lattice::AlleleSet;
use crate::mendelian::{denovo_lookup, mendelian_lookup, MendelianAlleleProbability};
use crate::model::Model;
use crate::params::FamilyParams;
use crate::prob::Prob;
use fnv::FnvHashSet;
use itertools::iproduct;
use log::debug;
use std::collections::BinaryHeap;

/// parental grids below this size are enumerated exhaustively
pub const BRUTE_FORCE_LIMIT: usize = 100;

/// how often the best-first loop re-evaluates its stopping rule
const TERMINATION_CHECK_INTERVAL: usize = 16;

///
/// De novo status of a scored hypothesis. `Unspecified` until the
/// de novo accounting pass has run.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeNovoStatus {
    Unspecified,
    IsDeNovo,
    NotDeNovo,
}

///
/// Best hypothesis of one family member with its score.
///
#[derive(Debug, Clone, Copy)]
pub struct HypothesisScore {
    pub hypothesis: usize,
    /// log-odds of the best hypothesis against the rest of the marginal
    pub posterior: f64,
    pub denovo: DeNovoStatus,
}

///
/// Per-site immutable context shared by all computation paths.
///
pub(crate) struct SiteContext<'a, M: Model> {
    pub father: &'a M,
    pub mother: &'a M,
    pub children: Vec<&'a M>,
    pub mendelian: Vec<&'static dyn MendelianAlleleProbability>,
    pub denovo: Vec<&'static dyn MendelianAlleleProbability>,
    pub allele_prob: &'static dyn AlleleProbability,
    pub params: &'a FamilyParams,
    /// total parental haploid slots
    pub slots: usize,
    /// the site's reference allele id
    pub ref_allele: usize,
    pub father_post: Vec<Prob>,
    pub mother_post: Vec<Prob>,
}

impl<'a, M: Model> SiteContext<'a, M> {
    pub fn new(family: &Family, models: &'a [M], params: &'a FamilyParams) -> SiteContext<'a, M> {
        let father = &models[family.father];
        let mother = &models[family.mother];
        let children: Vec<&M> = family.children.iter().map(|&c| &models[c]).collect();
        let fh = father.hypotheses();
        let mh = mother.hypotheses();
        assert_eq!(
            fh.code().range_size(),
            mh.code().range_size(),
            "family members must share one site code"
        );
        let mendelian = children
            .iter()
            .map(|c| {
                assert_eq!(
                    c.hypotheses().code().range_size(),
                    fh.code().range_size(),
                    "family members must share one site code"
                );
                mendelian_lookup(fh.ploidy(), mh.ploidy(), c.hypotheses().ploidy())
            })
            .collect();
        let denovo = children
            .iter()
            .map(|c| denovo_lookup(fh.ploidy(), mh.ploidy(), c.hypotheses().ploidy()))
            .collect();
        let father_post = (0..fh.size()).map(|h| father.posterior_ln0(h)).collect();
        let mother_post = (0..mh.size()).map(|h| mother.posterior_ln0(h)).collect();
        // reference allele from a parent that actually carries the locus
        let ref_allele = if fh.ploidy() != crate::code::Ploidy::None {
            fh.code().a(fh.reference())
        } else {
            mh.code().a(mh.reference())
        };
        SiteContext {
            father,
            mother,
            children,
            mendelian,
            denovo,
            allele_prob: allele_prob_lookup(fh.ploidy(), mh.ploidy()),
            params,
            slots: fh.ploidy().count() + mh.ploidy().count(),
            ref_allele,
            father_post,
            mother_post,
        }
    }
    pub fn father_hyp(&self) -> &Hypotheses {
        self.father.hypotheses()
    }
    pub fn mother_hyp(&self) -> &Hypotheses {
        self.mother.hypotheses()
    }
    pub fn n_children(&self) -> usize {
        self.children.len()
    }
    ///
    /// Parental cell base term: sample posteriors, allele-count prior,
    /// combinatorial correction and the pair prior.
    ///
    pub fn base(&self, f: usize, m: usize) -> Prob {
        let union = self
            .father_hyp()
            .alleles(f)
            .union(self.mother_hyp().alleles(m));
        let nonref = union.len() - if union.contains(self.ref_allele) { 1 } else { 0 };
        debug_assert!(nonref <= self.slots);
        self.father_post[f]
            * self.mother_post[m]
            * Prob::from_log_prob(-log_binomial(self.slots, nonref))
            * self.params.allele_frequency_ln(nonref)
            * self
                .allele_prob
                .probability_ln(self.father_hyp().code(), self.ref_allele, f, m)
    }
    ///
    /// Contrary-evidence adjustment for one child hypothesis: each child
    /// allele absent from both parental genotypes is penalized by the
    /// parents' read support for it.
    ///
    pub fn contrary(&self, child: usize, hyp: usize, parents: AlleleSet) -> Prob {
        let novel = self.children[child]
            .hypotheses()
            .alleles(hyp)
            .intersection(parents.complement_within(crate::lattice::MAX_ALLELES));
        if novel.is_empty() {
            return Prob::one();
        }
        let fc = self.father.allele_counts();
        let mc = self.mother.allele_counts();
        let reads: f64 = novel
            .iter()
            .map(|a| fc.get(a).copied().unwrap_or(0.0) + mc.get(a).copied().unwrap_or(0.0))
            .sum();
        Prob::from_log_prob(self.params.contrary.to_log_value() * reads)
    }
    ///
    /// Combined transition for one child hypothesis: Mendelian mass plus
    /// de novo mass weighted by the ref/non-ref de novo prior.
    ///
    pub fn transition(&self, child: usize, f: usize, m: usize, hyp: usize) -> Prob {
        let code = self.father_hyp().code();
        let mendel = self.mendelian[child].probability_ln(code, f, m, hyp);
        let denovo = self.denovo[child].probability_ln(code, f, m, hyp);
        if denovo.is_zero() {
            return mendel;
        }
        let parents = self
            .father_hyp()
            .alleles(f)
            .union(self.mother_hyp().alleles(m));
        let novel = self.children[child]
            .hypotheses()
            .alleles(hyp)
            .intersection(parents.complement_within(crate::lattice::MAX_ALLELES));
        let to_ref = novel.is_empty() || (novel.len() == 1 && novel.contains(self.ref_allele));
        let prior = if to_ref {
            self.params.denovo_ref
        } else {
            self.params.denovo_nonref
        };
        mendel + denovo * prior
    }
    /// is the (f, m, hyp) transition of `child` only reachable de novo?
    pub fn is_denovo(&self, child: usize, f: usize, m: usize, hyp: usize) -> bool {
        self.denovo[child]
            .is_denovo(self.father_hyp().code(), f, m, hyp)
    }
    ///
    /// Per-child leaf weight: sample posterior, transition and contrary
    /// evidence.
    ///
    pub fn child_weight(&self, child: usize, f: usize, m: usize, hyp: usize) -> Prob {
        let parents = self.father_hyp().alleles(f).union(self.mother_hyp().alleles(m));
        self.children[child].posterior_ln0(hyp)
            * self.transition(child, f, m, hyp)
            * self.contrary(child, hyp, parents)
    }
    ///
    /// Upper bound of any single cell's total mass, divided by the
    /// parental posteriors (transitions and priors never exceed 1).
    ///
    pub fn child_mass_bound(&self) -> Prob {
        self.children
            .iter()
            .map(|c| (0..c.hypotheses().size()).map(|h| c.posterior_ln0(h)).sum::<Prob>())
            .product()
    }
}

///
/// Marginal accumulator. Entries only ever grow (monotone log-add).
///
pub(crate) struct Accumulator {
    pub father: Vec<Prob>,
    pub mother: Vec<Prob>,
    pub children: Vec<Vec<Prob>>,
    pub child_denovo: Vec<Vec<Prob>>,
    pub child_nondenovo: Vec<Vec<Prob>>,
    pub identity: Prob,
    pub non_identity: Prob,
    pub denovo_accounting: bool,
}

impl Accumulator {
    pub fn new<M: Model>(ctx: &SiteContext<M>, denovo_accounting: bool) -> Accumulator {
        let child_sizes: Vec<usize> = ctx.children.iter().map(|c| c.hypotheses().size()).collect();
        Accumulator {
            father: vec![Prob::zero(); ctx.father_hyp().size()],
            mother: vec![Prob::zero(); ctx.mother_hyp().size()],
            children: child_sizes.iter().map(|&s| vec![Prob::zero(); s]).collect(),
            child_denovo: child_sizes.iter().map(|&s| vec![Prob::zero(); s]).collect(),
            child_nondenovo: child_sizes.iter().map(|&s| vec![Prob::zero(); s]).collect(),
            identity: Prob::zero(),
            non_identity: Prob::zero(),
            denovo_accounting,
        }
    }
}

///
/// Process one (father, mother) cell with the linear-in-children
/// decomposition: children are conditionally independent given the
/// parents, so per-child totals multiply.
///
pub(crate) fn process_cell<M: Model>(
    ctx: &SiteContext<M>,
    acc: &mut Accumulator,
    f: usize,
    m: usize,
) {
    let n = ctx.n_children();
    let base = ctx.base(f, m);
    if base.is_zero() {
        return;
    }
    // rh[c][h] and per-child totals r[c]
    let mut rh: Vec<Vec<Prob>> = Vec::with_capacity(n);
    let mut r: Vec<Prob> = Vec::with_capacity(n);
    for c in 0..n {
        let hyps: Vec<Prob> = (0..ctx.children[c].hypotheses().size())
            .map(|h| ctx.child_weight(c, f, m, h))
            .collect();
        r.push(hyps.iter().sum());
        rh.push(hyps);
    }
    // prefix and suffix products of the per-child totals
    let mut r_forward = vec![Prob::one(); n + 1];
    for c in 0..n {
        r_forward[c + 1] = r_forward[c] * r[c];
    }
    let mut r_reverse = vec![Prob::one(); n + 1];
    for c in (0..n).rev() {
        r_reverse[c] = r_reverse[c + 1] * r[c];
    }
    let cell_total = base * r_forward[n];
    if cell_total.is_zero() {
        return;
    }
    debug_assert!(!cell_total.to_log_value().is_nan());
    acc.father[f] += cell_total;
    acc.mother[m] += cell_total;
    for c in 0..n {
        let other = base * r_forward[c] * r_reverse[c + 1];
        for (h, &w) in rh[c].iter().enumerate() {
            if w.is_zero() {
                continue;
            }
            let mass = other * w;
            acc.children[c][h] += mass;
            if acc.denovo_accounting {
                if ctx.is_denovo(c, f, m, h) {
                    acc.child_denovo[c][h] += mass;
                } else {
                    acc.child_nondenovo[c][h] += mass;
                }
            }
        }
    }
    // identity/non-identity split
    if f == ctx.father_hyp().reference() && m == ctx.mother_hyp().reference() {
        let mut identity_leaf = base;
        for c in 0..n {
            identity_leaf = identity_leaf * rh[c][ctx.children[c].hypotheses().reference()];
        }
        acc.identity += identity_leaf;
        acc.non_identity += cell_total.sub_prob(identity_leaf);
    } else {
        acc.non_identity += cell_total;
    }
}

///
/// Joint family posterior for one site. Fully computed on construction.
///
pub struct FamilyPosterior {
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

impl FamilyPosterior {
    pub fn new<M: Model>(family: &Family, models: &[M], params: &FamilyParams) -> FamilyPosterior {
        let ctx = SiteContext::new(family, models, params);
        let brute = ctx.father_hyp().size() * ctx.mother_hyp().size() < BRUTE_FORCE_LIMIT;
        let mut acc = Accumulator::new(&ctx, false);
        if brute {
            compute_alleles(&ctx, &mut acc);
        } else {
            compute_super_alleles(&ctx, &mut acc);
        }
        // detect-then-recompute: de novo accounting costs more per leaf and
        // is rare, so only rerun when a best child hypothesis needs it
        if needs_denovo_pass(&ctx, &acc) {
            debug!("rerunning site with de novo accounting");
            acc = Accumulator::new(&ctx, true);
            if brute {
                compute_alleles(&ctx, &mut acc);
            } else {
                compute_super_alleles(&ctx, &mut acc);
            }
        }
        FamilyPosterior {
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

    fn score(marginal: &[Prob], denovo: DeNovoStatus) -> HypothesisScore {
        let (hypothesis, &best) = marginal
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1))
            .expect("empty marginal");
        let total: Prob = marginal.iter().sum();
        HypothesisScore {
            hypothesis,
            posterior: best.ratio(total.sub_prob(best)),
            denovo,
        }
    }
    pub fn best_father(&self) -> HypothesisScore {
        Self::score(&self.father_marginal, DeNovoStatus::Unspecified)
    }
    pub fn best_mother(&self) -> HypothesisScore {
        Self::score(&self.mother_marginal, DeNovoStatus::Unspecified)
    }
    pub fn best_child(&self, i: usize) -> HypothesisScore {
        let mut score = Self::score(&self.child_marginals[i], DeNovoStatus::Unspecified);
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
    /// true iff the best joint call is not all-reference
    pub fn is_interesting(&self) -> bool {
        self.best_father().hypothesis != self.father_ref
            || self.best_mother().hypothesis != self.mother_ref
            || (0..self.child_marginals.len())
                .any(|i| self.best_child(i).hypothesis != self.child_refs[i])
    }
    /// log-odds of non-reference vs all-reference for the whole family
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

pub(crate) fn needs_denovo_pass<M: Model>(ctx: &SiteContext<M>, acc: &Accumulator) -> bool {
    let best_f = argmax(&acc.father);
    let best_m = argmax(&acc.mother);
    (0..ctx.n_children()).any(|c| {
        let best_c = argmax(&acc.children[c]);
        ctx.is_denovo(c, best_f, best_m, best_c)
    })
}

pub(crate) fn argmax(xs: &[Prob]) -> usize {
    xs.iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .expect("empty marginal")
}

///
/// Brute-force path: recursive enumeration of every child combination.
///
pub(crate) fn compute_alleles<M: Model>(ctx: &SiteContext<M>, acc: &mut Accumulator) {
    for (f, m) in iproduct!(0..ctx.father_hyp().size(), 0..ctx.mother_hyp().size()) {
        let base = ctx.base(f, m);
        if base.is_zero() {
            continue;
        }
        let mut chosen = Vec::with_capacity(ctx.n_children());
        enumerate_children(ctx, acc, f, m, base, &mut chosen);
    }
}

fn enumerate_children<M: Model>(
    ctx: &SiteContext<M>,
    acc: &mut Accumulator,
    f: usize,
    m: usize,
    weight: Prob,
    chosen: &mut Vec<usize>,
) {
    let c = chosen.len();
    if c == ctx.n_children() {
        if weight.is_zero() {
            return;
        }
        debug_assert!(!weight.to_log_value().is_nan());
        acc.father[f] += weight;
        acc.mother[m] += weight;
        let mut identity = f == ctx.father_hyp().reference() && m == ctx.mother_hyp().reference();
        for (i, &h) in chosen.iter().enumerate() {
            acc.children[i][h] += weight;
            identity &= h == ctx.children[i].hypotheses().reference();
            if acc.denovo_accounting {
                if ctx.is_denovo(i, f, m, h) {
                    acc.child_denovo[i][h] += weight;
                } else {
                    acc.child_nondenovo[i][h] += weight;
                }
            }
        }
        if identity {
            acc.identity += weight;
        } else {
            acc.non_identity += weight;
        }
        return;
    }
    for h in 0..ctx.children[c].hypotheses().size() {
        let w = ctx.child_weight(c, f, m, h);
        if w.is_zero() {
            continue;
        }
        chosen.push(h);
        enumerate_children(ctx, acc, f, m, weight * w, chosen);
        chosen.pop();
    }
}

///
/// Heap entry of the best-first frontier: the best unexplored cell of one
/// father row.
///
#[derive(PartialEq, Eq)]
struct FrontierCell {
    priority: Prob,
    frow: usize,
    mcol: usize,
}

impl Ord for FrontierCell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority)
    }
}
impl PartialOrd for FrontierCell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

///
/// Best-first path for large parental grids.
///
/// Rows and columns are the parents' hypotheses sorted by sample
/// posterior; a per-row pointer tracks the next unexplored column, so the
/// heap always holds each row's best remaining cell. Stops when, for both
/// parents simultaneously, the best hypothesis, the reference/non-reference
/// comparison and the best-vs-total comparison are all decided by more
/// than `term_threshold` log units against the worst case remaining mass.
///
pub(crate) fn compute_super_alleles<M: Model>(ctx: &SiteContext<M>, acc: &mut Accumulator) {
    let fsize = ctx.father_hyp().size();
    let msize = ctx.mother_hyp().size();
    let mut forder: Vec<usize> = (0..fsize).collect();
    forder.sort_by(|&a, &b| ctx.father_post[b].cmp(&ctx.father_post[a]));
    let mut morder: Vec<usize> = (0..msize).collect();
    morder.sort_by(|&a, &b| ctx.mother_post[b].cmp(&ctx.mother_post[a]));
    let frank_of_ref = forder
        .iter()
        .position(|&f| f == ctx.father_hyp().reference())
        .unwrap();
    let mrank_of_ref = morder
        .iter()
        .position(|&m| m == ctx.mother_hyp().reference())
        .unwrap();

    // suffix log-sums of the sorted mother posteriors
    let mut msuffix = vec![Prob::zero(); msize + 1];
    for j in (0..msize).rev() {
        msuffix[j] = msuffix[j + 1] + ctx.mother_post[morder[j]];
    }
    let child_bound = ctx.child_mass_bound();

    let mut explored: FnvHashSet<(usize, usize)> = FnvHashSet::default();
    let process = |acc: &mut Accumulator,
                   explored: &mut FnvHashSet<(usize, usize)>,
                   i: usize,
                   j: usize| {
        if explored.insert((i, j)) {
            process_cell(ctx, acc, forder[i], morder[j]);
        }
    };

    // prime: the square around the reference cell, plus the first cell of
    // every row and column so each hypothesis has a known mass early
    let square = ctx.params.square_first;
    let frows: Vec<usize> = (0..fsize.min(square)).chain(std::iter::once(frank_of_ref)).collect();
    let mcols: Vec<usize> = (0..msize.min(square)).chain(std::iter::once(mrank_of_ref)).collect();
    for &i in &frows {
        for &j in &mcols {
            process(acc, &mut explored, i, j);
        }
    }
    if ctx.params.first_hyp_fully {
        for i in 0..fsize {
            process(acc, &mut explored, i, 0);
        }
        for j in 0..msize {
            process(acc, &mut explored, 0, j);
        }
    }

    // best-first frontier over the remaining cells
    let mut next_col = vec![0usize; fsize];
    let mut heap: BinaryHeap<FrontierCell> = BinaryHeap::new();
    for i in 0..fsize {
        while next_col[i] < msize && explored.contains(&(i, next_col[i])) {
            next_col[i] += 1;
        }
        if next_col[i] < msize {
            heap.push(FrontierCell {
                priority: ctx.father_post[forder[i]] * ctx.mother_post[morder[next_col[i]]],
                frow: i,
                mcol: next_col[i],
            });
        }
    }

    let t = ctx.params.term_threshold;
    let mut processed = 0usize;
    while let Some(cell) = heap.pop() {
        let i = cell.frow;
        process(acc, &mut explored, i, cell.mcol);
        processed += 1;
        next_col[i] = cell.mcol + 1;
        while next_col[i] < msize && explored.contains(&(i, next_col[i])) {
            next_col[i] += 1;
        }
        if next_col[i] < msize {
            heap.push(FrontierCell {
                priority: ctx.father_post[forder[i]] * ctx.mother_post[morder[next_col[i]]],
                frow: i,
                mcol: next_col[i],
            });
        }
        if processed % TERMINATION_CHECK_INTERVAL != 0 {
            continue;
        }
        // worst-case unexplored mass from the per-row pointers
        let remaining: Prob = (0..fsize)
            .map(|row| ctx.father_post[forder[row]] * msuffix[next_col[row]] * child_bound)
            .sum();
        if parent_decided(&acc.father, ctx.father_hyp().reference(), remaining, t)
            && parent_decided(&acc.mother, ctx.mother_hyp().reference(), remaining, t)
        {
            debug!(
                "best-first termination after {} of {} cells",
                explored.len(),
                fsize * msize
            );
            break;
        }
    }
}

///
/// All three stopping comparisons for one parent: best vs runner-up,
/// reference vs non-reference, and best vs everything else.
///
fn parent_decided(marginal: &[Prob], reference: usize, remaining: Prob, t: f64) -> bool {
    let best_i = argmax(marginal);
    let best = marginal[best_i];
    if best.is_zero() {
        return false;
    }
    let total: Prob = marginal.iter().sum();
    let rest = total.sub_prob(best);
    let runner_up = marginal
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != best_i)
        .map(|(_, &w)| w)
        .max()
        .unwrap_or(Prob::zero());
    let ref_mass = marginal[reference];
    let nonref_mass = total.sub_prob(ref_mass);
    decided(best, runner_up, remaining, t)
        && decided(ref_mass, nonref_mass, remaining, t)
        && decided(best, rest, remaining, t)
}

/// is `max(x, y)` ahead of `min(x, y)` even if all remaining mass were
/// added to the loser?
fn decided(x: Prob, y: Prob, remaining: Prob, t: f64) -> bool {
    let (hi, lo) = if x >= y { (x, y) } else { (y, x) };
    hi.ratio(lo + remaining) > t
}
