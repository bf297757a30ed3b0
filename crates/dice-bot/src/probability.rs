//! Binomial tail used to price a bid against the dice we cannot see.

/// Chance that a single hidden die shows a given face.
pub const FACE_PROBABILITY: f64 = 1.0 / 6.0;

/// Probability that at least `needed` of `available` hidden dice show the bid face.
///
/// `needed` is signed: our own dice may already cover the bid.
pub fn bid_probability(needed: i64, available: usize) -> f64 {
    if needed <= 0 {
        return 1.0;
    }
    let needed = needed as usize;
    if needed > available {
        return 0.0;
    }

    // Summed from the tail so the result is exactly monotone in `needed`.
    let tail: f64 = log_pmf(available, FACE_PROBABILITY)
        .into_iter()
        .skip(needed)
        .rev()
        .map(f64::exp)
        .sum();
    debug_assert!(tail.is_finite(), "binomial tail diverged: {tail}");
    tail.min(1.0)
}

/// `ln P(X = i)` for `i = 0..=trials`.
///
/// Each term comes from its predecessor by the ratio `(n - i) / (i + 1) * p / (1 - p)`,
/// so neither `C(n, i)` nor `p^i` is ever formed on large tables.
fn log_pmf(trials: usize, p: f64) -> Vec<f64> {
    let odds = (p / (1.0 - p)).ln();
    let mut terms = Vec::with_capacity(trials + 1);
    let mut current = trials as f64 * (1.0 - p).ln();
    terms.push(current);
    for hits in 0..trials {
        current += ((trials - hits) as f64 / (hits + 1) as f64).ln() + odds;
        terms.push(current);
    }
    terms
}
