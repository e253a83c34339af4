//!
//! Weighted allele-subset lattice
//!
//! A `WeightedLattice` maps subsets of a small allele universe to log-space
//! weights; the `product` of two lattices intersects masks and multiplies
//! weights. `SFunction` precomputes forward prefix products and reverse
//! suffix products over a list of per-child lattices so that both the
//! whole-family product and every "exclude child i" product come out of
//! O(n) lattice products:
//!
//! ```text
//! forward[i] = init * child[0] * ... * child[i-1]
//! reverse[i] = child[i] * ... * child[n-1]
//! all        = forward[n]
//! exclude(i) = forward[i] * reverse[i+1]
//! ```
//!
use crate::prob::Prob;

/// hard capacity of the bitmask representation
pub const MAX_ALLELES: usize = 32;

/// practical universe bound for the dense lattice storage
pub const MAX_UNIVERSE: usize = 16;

///
/// Subset of allele ids as an explicit `u32` bitmask.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct AlleleSet(u32);

impl AlleleSet {
    pub fn empty() -> AlleleSet {
        AlleleSet(0)
    }
    /// set of all alleles `0..universe`
    pub fn full(universe: usize) -> AlleleSet {
        assert!(universe <= MAX_ALLELES);
        if universe == MAX_ALLELES {
            AlleleSet(u32::MAX)
        } else {
            AlleleSet((1u32 << universe) - 1)
        }
    }
    pub fn singleton(allele: usize) -> AlleleSet {
        let mut s = AlleleSet::empty();
        s.insert(allele);
        s
    }
    pub fn insert(&mut self, allele: usize) {
        assert!(allele < MAX_ALLELES, "allele id {} exceeds capacity", allele);
        self.0 |= 1 << allele;
    }
    pub fn contains(self, allele: usize) -> bool {
        allele < MAX_ALLELES && self.0 & (1 << allele) != 0
    }
    pub fn union(self, other: AlleleSet) -> AlleleSet {
        AlleleSet(self.0 | other.0)
    }
    pub fn intersection(self, other: AlleleSet) -> AlleleSet {
        AlleleSet(self.0 & other.0)
    }
    pub fn complement_within(self, universe: usize) -> AlleleSet {
        AlleleSet(!self.0 & AlleleSet::full(universe).0)
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn is_subset_of(self, other: AlleleSet) -> bool {
        self.0 & !other.0 == 0
    }
    /// iterate over member allele ids, ascending
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_ALLELES).filter(move |&i| self.contains(i))
    }
    pub fn mask(self) -> u32 {
        self.0
    }
    pub fn from_mask(mask: u32) -> AlleleSet {
        AlleleSet(mask)
    }
}

///
/// Dense map from allele subset to log-space weight.
///
/// The universe (number of allele ids at the site) is small, so every
/// subset gets a slot.
///
#[derive(Debug, Clone)]
pub struct WeightedLattice {
    universe: usize,
    weights: Vec<Prob>,
}

impl WeightedLattice {
    pub fn new(universe: usize) -> WeightedLattice {
        assert!(universe <= MAX_UNIVERSE, "lattice universe too large");
        WeightedLattice {
            universe,
            weights: vec![Prob::zero(); 1 << universe],
        }
    }
    /// weight 1 at the full-universe mask: identity of `product`
    pub fn identity(universe: usize) -> WeightedLattice {
        let mut l = WeightedLattice::new(universe);
        l.weights[AlleleSet::full(universe).mask() as usize] = Prob::one();
        l
    }
    pub fn universe(&self) -> usize {
        self.universe
    }
    /// log-add `weight` into the slot of `set`
    pub fn add(&mut self, set: AlleleSet, weight: Prob) {
        debug_assert!(set.is_subset_of(AlleleSet::full(self.universe)));
        let slot = &mut self.weights[set.mask() as usize];
        *slot = *slot + weight;
    }
    pub fn get(&self, set: AlleleSet) -> Prob {
        self.weights[set.mask() as usize]
    }
    ///
    /// Pointwise convolution over set intersection:
    /// `out[a & b] += self[a] * other[b]`.
    ///
    pub fn product(&self, other: &WeightedLattice) -> WeightedLattice {
        assert_eq!(self.universe, other.universe);
        let mut out = WeightedLattice::new(self.universe);
        for (a, &wa) in self.weights.iter().enumerate() {
            if wa.is_zero() {
                continue;
            }
            for (b, &wb) in other.weights.iter().enumerate() {
                if wb.is_zero() {
                    continue;
                }
                let slot = &mut out.weights[a & b];
                *slot = *slot + wa * wb;
            }
        }
        out
    }
    /// visit every non-zero entry
    pub fn visit<F: FnMut(AlleleSet, Prob)>(&self, mut f: F) {
        for (mask, &w) in self.weights.iter().enumerate() {
            if !w.is_zero() {
                f(AlleleSet::from_mask(mask as u32), w);
            }
        }
    }
    /// total mass over all subsets
    pub fn sum(&self) -> Prob {
        self.weights.iter().sum()
    }
    #[cfg(test)]
    fn approx_eq(&self, other: &WeightedLattice, epsilon: f64) -> bool {
        self.universe == other.universe
            && self
                .weights
                .iter()
                .zip(other.weights.iter())
                .all(|(a, b)| a.log_diff(*b) < epsilon)
    }
}

///
/// Forward/reverse product decomposition over `[init, child_0, ..]`.
///
#[derive(Debug)]
pub struct SFunction {
    forward: Vec<WeightedLattice>,
    reverse: Vec<WeightedLattice>,
}

impl SFunction {
    pub fn new(init: WeightedLattice, children: Vec<WeightedLattice>) -> SFunction {
        let n = children.len();
        let universe = init.universe();
        let mut forward = Vec::with_capacity(n + 1);
        forward.push(init);
        for i in 0..n {
            let next = forward[i].product(&children[i]);
            forward.push(next);
        }
        let mut reverse = vec![WeightedLattice::identity(universe); n + 1];
        for i in (0..n).rev() {
            reverse[i] = children[i].product(&reverse[i + 1]);
        }
        SFunction { forward, reverse }
    }
    /// product over init and every child
    pub fn all(&self) -> &WeightedLattice {
        self.forward.last().unwrap()
    }
    /// product over init and every child except child `i`
    pub fn exclude_child(&self, i: usize) -> WeightedLattice {
        self.forward[i].product(&self.reverse[i + 1])
    }
    /// forward/backward decomposition consistency
    pub fn check(&self) -> bool {
        let direct = self.forward[0].product(&self.reverse[0]);
        let all = self.all();
        let mut ok = true;
        direct.visit(|set, w| {
            if all.get(set).log_diff(w) > 1e-9 {
                ok = false;
            }
        });
        all.visit(|set, w| {
            if direct.get(set).log_diff(w) > 1e-9 {
                ok = false;
            }
        });
        ok
    }
}
