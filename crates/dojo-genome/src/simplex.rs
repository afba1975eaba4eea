//! Probability-vector helpers.
//!
//! These are the building blocks that keep the genome's transition rows on the
//! probability simplex (non-negative, summing to 1.0):
//!
//! - **Sampling**: [`random_simplex_vector`] draws a fresh random distribution
//! - **Normalization**: [`normalize`] and [`normalize_in_place`] rescale an
//!   arbitrary non-negative vector into a distribution
//!
//! # Stick-Breaking Bias
//!
//! [`random_simplex_vector`] uses a stick-breaking construction: each slot takes a
//! uniform fraction of whatever mass is left. The result always lies on the
//! simplex but is *not* uniformly distributed over it. Earlier slots are
//! stochastically larger than later ones (the expected value of slot `i` is
//! `2^-(i+1)` for all but the last slot). Evolved populations are seeded with this
//! bias, so it is kept as is.

use rand::Rng;

/// Draws a random probability vector of length `size` by stick breaking.
///
/// Starting from a remaining mass of 1.0, each of the first `size - 1` slots
/// takes a uniform fraction of the remaining mass. The last slot receives
/// whatever is left.
///
/// Returns an empty vector when `size` is zero.
///
/// # Examples
///
/// ```
/// use dojo_genome::simplex;
///
/// let v = simplex::random_simplex_vector(4, &mut rand::rng());
/// assert_eq!(v.len(), 4);
/// assert!((v.iter().sum::<f64>() - 1.0).abs() < 1e-9);
/// ```
pub fn random_simplex_vector<R>(size: usize, rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    let Some(last) = size.checked_sub(1) else {
        return vec![];
    };
    let mut values = Vec::with_capacity(size);
    let mut remaining = 1.0;
    for _ in 0..last {
        let r = remaining * rng.random::<f64>();
        values.push(r);
        remaining -= r;
    }
    values.push(remaining);
    values
}

/// Returns `values` rescaled so that they sum to 1.0.
///
/// If the sum is exactly zero, a uniform vector (`1 / len` in every slot) is
/// returned instead of dividing by zero.
///
/// # Examples
///
/// ```
/// use dojo_genome::simplex;
///
/// assert_eq!(simplex::normalize(&[1.0, 3.0]), vec![0.25, 0.75]);
/// assert_eq!(simplex::normalize(&[0.0, 0.0]), vec![0.5, 0.5]);
/// ```
#[must_use]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    normalize_in_place(&mut values);
    values
}

/// In-place variant of [`normalize`].
#[expect(clippy::cast_precision_loss)]
pub fn normalize_in_place(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        let uniform = 1.0 / values.len() as f64;
        values.fill(uniform);
        return;
    }
    for v in values {
        *v /= sum;
    }
}
