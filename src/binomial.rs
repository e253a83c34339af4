//!
//! Cached log-binomial and log-factorial tables
//!
//! `ln C(n, a)` for small `a` is needed once per (father, mother) cell of
//! the marginalization grid, so it is precomputed for the whole range of
//! plausible arguments. The cache is built with the Pascal recurrence
//! `C(n, a) = C(n-1, a-1) + C(n-1, a)` evaluated in log space.
//!
use crate::prob::Prob;
use once_cell::sync::Lazy;

/// number of rows kept in the caches
pub const LENGTH: usize = 200;

/// columns of the Pascal cache, `a < SMALL_A`
pub const SMALL_A: usize = 6;

static LOG_BINOMIAL: Lazy<Vec<[Prob; SMALL_A]>> = Lazy::new(|| {
    let mut rows: Vec<[Prob; SMALL_A]> = Vec::with_capacity(LENGTH);
    for n in 0..LENGTH {
        let mut row = [Prob::zero(); SMALL_A];
        row[0] = Prob::one();
        for a in 1..SMALL_A {
            if a > n {
                continue;
            }
            if a == n {
                row[a] = Prob::one();
            } else {
                let prev = &rows[n - 1];
                row[a] = prev[a - 1] + prev[a];
            }
        }
        rows.push(row);
    }
    rows
});

static LOG_FACTORIAL: Lazy<Vec<f64>> = Lazy::new(|| {
    let mut v = Vec::with_capacity(LENGTH);
    v.push(0.0);
    for n in 1..LENGTH {
        v.push(v[n - 1] + (n as f64).ln());
    }
    v
});

///
/// `ln n!` for `n < LENGTH`
///
pub fn log_factorial(n: usize) -> f64 {
    assert!(n < LENGTH, "log_factorial: n={} out of cached range", n);
    LOG_FACTORIAL[n]
}

///
/// `ln C(n, a)`, cached for `a < SMALL_A`, factorial form otherwise.
///
pub fn log_binomial(n: usize, a: usize) -> f64 {
    assert!(a <= n, "log_binomial: a={} > n={}", a, n);
    assert!(n < LENGTH, "log_binomial: n={} out of cached range", n);
    if a < SMALL_A {
        LOG_BINOMIAL[n][a].to_log_value()
    } else {
        log_factorial(n) - log_factorial(a) - log_factorial(n - a)
    }
}
