//!
//! Disease-explanation marginalization
//!
//! Instead of asking for each member's genotype, this caller asks which
//! single allele (or none) explains the family's disease phenotypes: a
//! diseased member must carry the explaining allele, a healthy member must
//! not. Each member enters the sum with its own genotype evidence only;
//! inheritance transitions stay in the genotype caller, where genotype
//! configurations already pay for Mendelian consistency. For fixed parents
//! the per-child consistency constraints are allele-subset masks, so the
//! whole sum vectorizes over a `WeightedLattice` and an `SFunction` gives
//! every exclude-one-child product in O(n) lattice products.
//!
//! `DiseasedFamilyPosterior` is the direct enumeration of the same sum and
//! serves as the reference for the lattice engine.
//!
use crate::code::Code;
use crate::family::Family;
use crate::family_posterior::{argmax, DeNovoStatus, HypothesisScore, SiteContext};
use crate::lattice::{AlleleSet, SFunction, WeightedLattice};
use crate::model::Model;
use crate::params::FamilyParams;
use crate::prob::Prob;
use itertools::iproduct;

///
/// Prior over disease explanations. Index 0 is "no disease", index
/// `allele + 1` is "this allele explains the disease"; the reference
/// allele cannot be the explanation.
///
#[derive(Debug, Clone)]
pub struct HypothesesDisease {
    priors: Vec<Prob>,
    reference: usize,
}

impl HypothesesDisease {
    pub fn new(code: &Code, reference: usize, no_disease: f64) -> HypothesesDisease {
        let n = code.range_size();
        let mut priors = vec![Prob::zero(); n + 1];
        priors[0] = Prob::from_prob(no_disease);
        if n > 1 {
            let each = Prob::from_prob(1.0 - no_disease) / (n - 1);
            for a in 0..n {
                if a != reference {
                    priors[a + 1] = each;
                }
            }
        }
        HypothesesDisease { priors, reference }
    }
    /// explanations including "no disease"
    pub fn size(&self) -> usize {
        self.priors.len()
    }
    pub fn prior(&self, explanation: usize) -> Prob {
        self.priors[explanation]
    }
    pub fn reference(&self) -> usize {
        self.reference
    }
    ///
    /// Combined prior of a consistent-allele set: "no disease" when empty,
    /// the explanation priors of the member alleles otherwise.
    ///
    pub fn set_prior(&self, set: AlleleSet) -> Prob {
        if set.is_empty() {
            self.priors[0]
        } else {
            set.iter().map(|a| self.priors[a + 1]).sum()
        }
    }
}

///
/// Best disease explanation: `allele` is `None` for "no disease".
///
#[derive(Debug, Clone, Copy)]
pub struct DiseaseScore {
    pub allele: Option<usize>,
    /// log-odds of the best explanation against the rest
    pub posterior: f64,
}

struct DiseaseAccumulator {
    explanation: Vec<Prob>,
    father: Vec<Prob>,
    mother: Vec<Prob>,
    children: Vec<Vec<Prob>>,
}

impl DiseaseAccumulator {
    fn new<M: Model>(ctx: &SiteContext<M>, n_explanations: usize) -> DiseaseAccumulator {
        DiseaseAccumulator {
            explanation: vec![Prob::zero(); n_explanations],
            father: vec![Prob::zero(); ctx.father_hyp().size()],
            mother: vec![Prob::zero(); ctx.mother_hyp().size()],
            children: ctx
                .children
                .iter()
                .map(|c| vec![Prob::zero(); c.hypotheses().size()])
                .collect(),
        }
    }
}

///
/// Shared per-site pieces of both disease engines.
///
struct DiseaseContext<'a, M: Model> {
    ctx: SiteContext<'a, M>,
    disease: HypothesesDisease,
    father_diseased: bool,
    mother_diseased: bool,
    child_diseased: Vec<bool>,
    universe: usize,
}

impl<'a, M: Model> DiseaseContext<'a, M> {
    fn new(family: &Family, models: &'a [M], params: &'a FamilyParams) -> DiseaseContext<'a, M> {
        assert!(
            family.one_parent_diseased(),
            "disease caller needs exactly one diseased parent"
        );
        let ctx = SiteContext::new(family, models, params);
        let code = ctx.father_hyp().code();
        let universe = code.range_size();
        assert!(
            universe <= crate::lattice::MAX_UNIVERSE,
            "too many alleles for the disease lattice"
        );
        let disease = HypothesesDisease::new(code, ctx.ref_allele, params.no_disease);
        DiseaseContext {
            disease,
            father_diseased: family.is_diseased(family.father),
            mother_diseased: family.is_diseased(family.mother),
            child_diseased: family.children.iter().map(|&c| family.is_diseased(c)).collect(),
            universe,
            ctx,
        }
    }
    ///
    /// Candidate disease alleles for fixed parents: alleles of every
    /// diseased parent, minus alleles of every healthy parent, minus the
    /// reference.
    ///
    fn init_set(&self, f: usize, m: usize) -> AlleleSet {
        let mut set = AlleleSet::full(self.universe);
        let fa = self.ctx.father_hyp().alleles(f);
        let ma = self.ctx.mother_hyp().alleles(m);
        if self.father_diseased {
            set = set.intersection(fa);
        } else {
            set = set.intersection(fa.complement_within(self.universe));
        }
        if self.mother_diseased {
            set = set.intersection(ma);
        } else {
            set = set.intersection(ma.complement_within(self.universe));
        }
        set.intersection(AlleleSet::singleton(self.ctx.ref_allele).complement_within(self.universe))
    }
    /// alleles a child genotype allows as the disease explanation
    fn child_set(&self, child: usize, hyp: usize) -> AlleleSet {
        let alleles = self.ctx.children[child].hypotheses().alleles(hyp);
        if self.child_diseased[child] {
            alleles.intersection(AlleleSet::full(self.universe))
        } else {
            alleles.complement_within(self.universe)
        }
    }
    /// genotype evidence of one parental cell, no site-level priors
    fn base(&self, f: usize, m: usize) -> Prob {
        self.ctx.father_post[f] * self.ctx.mother_post[m]
    }
    /// genotype evidence of one child hypothesis
    fn child_weight(&self, child: usize, hyp: usize) -> Prob {
        self.ctx.children[child].posterior_ln0(hyp)
    }
}

macro_rules! disease_accessors {
    () => {
        pub fn best_father(&self) -> HypothesisScore {
            score(&self.acc.father)
        }
        pub fn best_mother(&self) -> HypothesisScore {
            score(&self.acc.mother)
        }
        pub fn best_child(&self, i: usize) -> HypothesisScore {
            score(&self.acc.children[i])
        }
        ///
        /// Best disease explanation over the explanation marginal.
        ///
        pub fn best_disease(&self) -> DiseaseScore {
            let scored = self.scored_explanations();
            let best = argmax(&scored);
            let total: Prob = scored.iter().sum();
            DiseaseScore {
                allele: if best == 0 { None } else { Some(best - 1) },
                posterior: scored[best].ratio(total.sub_prob(scored[best])),
            }
        }
        /// log-odds of any-disease vs no-disease
        pub fn any_disease_posterior_ratio(&self) -> f64 {
            let scored = self.scored_explanations();
            let any: Prob = scored.iter().skip(1).sum();
            any.ratio(scored[0])
        }
        pub fn is_interesting(&self) -> bool {
            self.best_disease().allele.is_some()
        }
        fn scored_explanations(&self) -> Vec<Prob> {
            self.acc
                .explanation
                .iter()
                .enumerate()
                .map(|(d, &w)| w * self.disease_priors.prior(d))
                .collect()
        }
    };
}

fn score(marginal: &[Prob]) -> HypothesisScore {
    let best = argmax(marginal);
    let total: Prob = marginal.iter().sum();
    HypothesisScore {
        hypothesis: best,
        posterior: marginal[best].ratio(total.sub_prob(marginal[best])),
        denovo: DeNovoStatus::Unspecified,
    }
}

///
/// Reference implementation: direct enumeration over child combinations.
///
pub struct DiseasedFamilyPosterior {
    acc: DiseaseAccumulator,
    disease_priors: HypothesesDisease,
}

impl DiseasedFamilyPosterior {
    pub fn new<M: Model>(
        family: &Family,
        models: &[M],
        params: &FamilyParams,
    ) -> DiseasedFamilyPosterior {
        let dctx = DiseaseContext::new(family, models, params);
        let mut acc = DiseaseAccumulator::new(&dctx.ctx, dctx.disease.size());
        for (f, m) in iproduct!(
            0..dctx.ctx.father_hyp().size(),
            0..dctx.ctx.mother_hyp().size()
        ) {
            let base = dctx.base(f, m);
            if base.is_zero() {
                continue;
            }
            let mut chosen = Vec::with_capacity(dctx.ctx.n_children());
            enumerate(&dctx, &mut acc, f, m, base, dctx.init_set(f, m), &mut chosen);
        }
        DiseasedFamilyPosterior {
            acc,
            disease_priors: dctx.disease,
        }
    }
    disease_accessors!();
}

fn enumerate<M: Model>(
    dctx: &DiseaseContext<M>,
    acc: &mut DiseaseAccumulator,
    f: usize,
    m: usize,
    weight: Prob,
    set: AlleleSet,
    chosen: &mut Vec<usize>,
) {
    let c = chosen.len();
    if c == dctx.ctx.n_children() {
        if weight.is_zero() {
            return;
        }
        // a combination either fails to single out any allele ("no
        // disease") or supports each member of its consistent set
        if set.is_empty() {
            acc.explanation[0] += weight;
        } else {
            for a in set.iter() {
                acc.explanation[a + 1] += weight;
            }
        }
        let prior = dctx.disease.set_prior(set);
        let mass = weight * prior;
        acc.father[f] += mass;
        acc.mother[m] += mass;
        for (i, &h) in chosen.iter().enumerate() {
            acc.children[i][h] += mass;
        }
        return;
    }
    for h in 0..dctx.ctx.children[c].hypotheses().size() {
        let w = dctx.child_weight(c, h);
        if w.is_zero() {
            continue;
        }
        chosen.push(h);
        enumerate(
            dctx,
            acc,
            f,
            m,
            weight * w,
            set.intersection(dctx.child_set(c, h)),
            chosen,
        );
        chosen.pop();
    }
}

///
/// Lattice engine: one `SFunction` per parental cell.
///
pub struct FastDiseasedFamilyPosterior {
    acc: DiseaseAccumulator,
    disease_priors: HypothesesDisease,
}

impl FastDiseasedFamilyPosterior {
    pub fn new<M: Model>(
        family: &Family,
        models: &[M],
        params: &FamilyParams,
    ) -> FastDiseasedFamilyPosterior {
        let dctx = DiseaseContext::new(family, models, params);
        let mut acc = DiseaseAccumulator::new(&dctx.ctx, dctx.disease.size());
        let n = dctx.ctx.n_children();
        // child lattices do not depend on the parental cell
        let children: Vec<WeightedLattice> = (0..n)
            .map(|c| {
                let mut l = WeightedLattice::new(dctx.universe);
                for h in 0..dctx.ctx.children[c].hypotheses().size() {
                    let w = dctx.child_weight(c, h);
                    if !w.is_zero() {
                        l.add(dctx.child_set(c, h), w);
                    }
                }
                l
            })
            .collect();
        for (f, m) in iproduct!(
            0..dctx.ctx.father_hyp().size(),
            0..dctx.ctx.mother_hyp().size()
        ) {
            let base = dctx.base(f, m);
            if base.is_zero() {
                continue;
            }
            let mut init = WeightedLattice::new(dctx.universe);
            init.add(dctx.init_set(f, m), base);
            let s = SFunction::new(init, children.clone());
            let mut cell_member_mass = Prob::zero();
            s.all().visit(|set, w| {
                if set.is_empty() {
                    acc.explanation[0] += w;
                } else {
                    for a in set.iter() {
                        acc.explanation[a + 1] += w;
                    }
                }
                cell_member_mass += w * dctx.disease.set_prior(set);
            });
            acc.father[f] += cell_member_mass;
            acc.mother[m] += cell_member_mass;
            for c in 0..n {
                let ex = s.exclude_child(c);
                for h in 0..dctx.ctx.children[c].hypotheses().size() {
                    let w = dctx.child_weight(c, h);
                    if w.is_zero() {
                        continue;
                    }
                    let hyp_set = dctx.child_set(c, h);
                    let mut mass = Prob::zero();
                    ex.visit(|set, we| {
                        mass += we * w * dctx.disease.set_prior(set.intersection(hyp_set));
                    });
                    acc.children[c][h] += mass;
                }
            }
        }
        FastDiseasedFamilyPosterior {
            acc,
            disease_priors: dctx.disease,
        }
    }
    disease_accessors!();
}
