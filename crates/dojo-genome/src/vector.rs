//! Flat real-vector encoding for continuous optimizers.
//!
//! A genome with `N` states is laid out as `2·N² + N + 1` reals:
//!
//! ```text
//! [ Tc (N², row-major) | Td (N², row-major) | emissions (N) | initial action (1) ]
//! ```
//!
//! The trailing scalar is 0.0 for [`Action::Cooperate`] and 1.0 for
//! [`Action::Defect`]. The initial state is not encoded; decoded genomes start
//! in state 0.
//!
//! # Normalization on Decode
//!
//! A continuous optimizer moves freely inside the `[0, 1]` box, so decoding
//! re-normalizes every transition row *and the emission slice as a whole*. The
//! latter differs from mutation, which treats emissions as independent
//! probabilities. A genome whose emissions do not already sum to 1.0 therefore
//! comes back with different emissions after an encode/decode round trip.
//!
//! # Dimension Recovery
//!
//! Optimizers that only hand back a vector lose `N`. [`recover_num_states`]
//! solves `2N² + N + (1 − L) = 0` for the positive root and rounds it.

use crate::{action::Action, hmm::HmmGenome, simplex};

/// Length of the flat encoding of a genome with `num_states` states.
///
/// Saturates at `usize::MAX`, which no `f64` slice can reach, so an absurd
/// state count simply fails the length check.
#[must_use]
pub fn vector_len(num_states: usize) -> usize {
    num_states
        .saturating_mul(num_states)
        .saturating_mul(2)
        .saturating_add(num_states)
        .saturating_add(1)
}

/// Result of recovering the state count from a vector length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionRecovery {
    /// Nearest state count to the positive root of the length equation.
    pub num_states: usize,
    /// Whether `vector_len(num_states)` equals the length exactly.
    pub exact: bool,
}

/// Recovers the number of states from the length of a flat vector.
///
/// # Examples
///
/// ```
/// use dojo_genome::vector::recover_num_states;
///
/// let recovery = recover_num_states(11);
/// assert_eq!(recovery.num_states, 2);
/// assert!(recovery.exact);
///
/// let recovery = recover_num_states(12);
/// assert_eq!(recovery.num_states, 2);
/// assert!(!recovery.exact);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn recover_num_states(len: usize) -> DimensionRecovery {
    let (a, b, c) = (2.0, 1.0, 1.0 - len as f64);
    // Lengths below 1 have no real root; clamp so they recover zero states.
    let discriminant = f64::max(b * b - 4.0 * a * c, 0.0);
    let root = (-b + discriminant.sqrt()) / (2.0 * a);
    let num_states = root.round().max(0.0) as usize;
    DimensionRecovery {
        num_states,
        exact: vector_len(num_states) == len,
    }
}

/// Lower and upper box constraints for each coordinate of a flat vector.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorBounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl VectorBounds {
    /// Bounds of `[0, 1]` on every coordinate of a `len`-long vector.
    #[must_use]
    pub fn unit(len: usize) -> Self {
        Self {
            lower: vec![0.0; len],
            upper: vec![1.0; len],
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.lower, self.upper)
    }
}

impl HmmGenome {
    /// Encodes the genome as a flat vector of length [`vector_len`]`(N)`.
    #[must_use]
    pub fn to_vector(&self) -> Vec<f64> {
        let mut vector = Vec::with_capacity(vector_len(self.num_states()));
        vector.extend(self.transitions_cooperate().iter().flatten());
        vector.extend(self.transitions_defect().iter().flatten());
        vector.extend(self.emissions());
        vector.push(match self.initial_action() {
            Action::Cooperate => 0.0,
            Action::Defect => 1.0,
        });
        vector
    }

    /// Decodes a flat vector for a known number of states.
    ///
    /// Transition rows and the emission slice are normalized. The trailing
    /// scalar is rounded half-to-even, so anything up to and including 0.5
    /// decodes as [`Action::Cooperate`] and everything else as
    /// [`Action::Defect`]. The initial state is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use dojo_genome::{Action, HmmGenome};
    ///
    /// let vector = [2.0, 0.0, 3.0, 0.7];
    /// let genome = HmmGenome::from_vector(&vector, 1).unwrap();
    /// assert_eq!(genome.transitions_cooperate(), &[vec![1.0]]);
    /// assert_eq!(genome.transitions_defect(), &[vec![1.0]]);
    /// assert_eq!(genome.initial_action(), Action::Defect);
    /// # assert!(HmmGenome::from_vector(&vector, 2).is_err());
    /// ```
    pub fn from_vector(vector: &[f64], num_states: usize) -> Result<Self, VectorDecodeError> {
        if num_states == 0 {
            return Err(VectorDecodeError::NoStates);
        }
        let expected = vector_len(num_states);
        if vector.len() != expected {
            return Err(VectorDecodeError::LengthMismatch {
                num_states,
                expected,
                actual: vector.len(),
            });
        }

        let matrix_len = num_states * num_states;
        let (cooperate, rest) = vector.split_at(matrix_len);
        let (defect, rest) = rest.split_at(matrix_len);
        let (emissions, action) = rest.split_at(num_states);

        let read_matrix = |values: &[f64]| {
            values
                .chunks_exact(num_states)
                .map(simplex::normalize)
                .collect::<Vec<_>>()
        };
        let initial_action = if action[0].round_ties_even() == 0.0 {
            Action::Cooperate
        } else {
            Action::Defect
        };

        Ok(Self::from_parts(
            read_matrix(cooperate),
            read_matrix(defect),
            simplex::normalize(emissions),
            0,
            initial_action,
        ))
    }

    /// Decodes a flat vector, recovering the number of states from its length.
    ///
    /// If the length does not correspond to any state count, a warning is logged
    /// and decoding proceeds with the nearest state count, which then fails
    /// with [`VectorDecodeError::LengthMismatch`].
    pub fn from_vector_infer_dimension(vector: &[f64]) -> Result<Self, VectorDecodeError> {
        let recovery = recover_num_states(vector.len());
        if !recovery.exact {
            log::warn!(
                "vector length {} does not match any state count (2N²+N+1); proceeding with nearest N = {}",
                vector.len(),
                recovery.num_states
            );
        }
        Self::from_vector(vector, recovery.num_states)
    }

    /// Box constraints for the flat encoding of this genome: all zeros and all ones.
    #[must_use]
    pub fn bounds(&self) -> VectorBounds {
        VectorBounds::unit(vector_len(self.num_states()))
    }
}

/// Returned when a flat vector cannot be decoded into a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum VectorDecodeError {
    #[display("genome must have at least one state")]
    NoStates,
    #[display(
        "vector of length {actual} does not encode {num_states} states (expected length {expected})"
    )]
    LengthMismatch {
        num_states: usize,
        expected: usize,
        actual: usize,
    },
}
