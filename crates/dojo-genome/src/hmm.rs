//! The hidden-Markov genome and its variation operators.
//!
//! An [`HmmGenome`] parameterizes a probabilistic finite-state strategy for the
//! iterated prisoner's dilemma:
//!
//! - two `N×N` row-stochastic transition matrices, one used after the opponent
//!   cooperated and one used after the opponent defected
//! - `N` emission probabilities, the chance of cooperating in each state
//! - the initial state and the action played on the very first turn
//!
//! # Operators
//!
//! - [`HmmGenome::random`] builds a fresh genome from stick-broken rows
//! - [`HmmGenome::mutate`] perturbs entries in place and re-normalizes rows
//! - [`HmmGenome::crossover`] splices rows of two parents at random crosspoints
//!
//! Every operator keeps the transition rows on the probability simplex and the
//! emissions inside `[0, 1]`. Emissions are independent Bernoulli parameters and
//! are never normalized as a group here.
//!
//! # Randomness
//!
//! All operators take an explicit `rng`. Seeding one generator and threading it
//! through every call reproduces an evolutionary run exactly.

use rand::Rng;

use crate::{action::Action, simplex};

/// Largest absolute perturbation added to an entry by [`HmmGenome::mutate`].
pub const MAX_PERTURBATION: f64 = 0.25;

/// Returns the default per-entry mutation rate for `num_states` states.
///
/// The rate is `10 / N²`, which keeps the expected number of mutated
/// transition entries per genome roughly constant as `N` grows. For `N <= 3`
/// the rate exceeds 1.0, meaning every entry is perturbed.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn default_mutation_rate(num_states: usize) -> f64 {
    10.0 / (num_states * num_states) as f64
}

/// Settings needed to create a random [`HmmGenome`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HmmConfig {
    /// Number of hidden states.
    pub num_states: usize,
    /// Per-entry mutation rate. Falls back to [`default_mutation_rate`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_rate: Option<f64>,
}

impl HmmConfig {
    #[must_use]
    pub fn new(num_states: usize) -> Self {
        Self {
            num_states,
            mutation_rate: None,
        }
    }

    #[must_use]
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = Some(mutation_rate);
        self
    }

    /// Returns the configured mutation rate, or the default for `num_states`.
    #[must_use]
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
            .unwrap_or_else(|| default_mutation_rate(self.num_states))
    }
}

/// Parameters of a probabilistic finite-state (hidden-Markov) strategy.
///
/// Cloning produces an independent deep copy. Equality compares every field,
/// including the mutation rate, which the text form does not encode.
#[derive(Debug, Clone, PartialEq)]
pub struct HmmGenome {
    num_states: usize,
    transitions_cooperate: Vec<Vec<f64>>,
    transitions_defect: Vec<Vec<f64>>,
    emissions: Vec<f64>,
    initial_state: usize,
    initial_action: Action,
    mutation_rate: f64,
}

impl HmmGenome {
    /// Creates a genome from explicit parameters.
    ///
    /// Only the shape is checked: both matrices must be `N×N`, the emission
    /// vector must have `N` entries and `initial_state` must be below `N`, where
    /// `N` is the row count of `transitions_cooperate`. Values are taken
    /// literally; rows are not normalized.
    ///
    /// The mutation rate defaults to [`default_mutation_rate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dojo_genome::{Action, HmmGenome};
    ///
    /// let genome = HmmGenome::new(
    ///     vec![vec![0.5, 0.5], vec![0.3, 0.7]],
    ///     vec![vec![1.0, 0.0], vec![0.0, 1.0]],
    ///     vec![0.9, 0.1],
    ///     0,
    ///     Action::Cooperate,
    /// )
    /// .unwrap();
    /// assert_eq!(genome.num_states(), 2);
    /// assert_eq!(genome.mutation_rate(), 2.5);
    /// ```
    pub fn new(
        transitions_cooperate: Vec<Vec<f64>>,
        transitions_defect: Vec<Vec<f64>>,
        emissions: Vec<f64>,
        initial_state: usize,
        initial_action: Action,
    ) -> Result<Self, ShapeError> {
        let num_states = transitions_cooperate.len();
        if num_states == 0 {
            return Err(ShapeError::NoStates);
        }
        check_square(&transitions_cooperate, Action::Cooperate, num_states)?;
        check_square(&transitions_defect, Action::Defect, num_states)?;
        if emissions.len() != num_states {
            return Err(ShapeError::EmissionLength {
                len: emissions.len(),
                expected: num_states,
            });
        }
        if initial_state >= num_states {
            return Err(ShapeError::InitialState {
                state: initial_state,
                num_states,
            });
        }
        Ok(Self::from_parts(
            transitions_cooperate,
            transitions_defect,
            emissions,
            initial_state,
            initial_action,
        ))
    }

    /// Assembles a genome whose shape the caller has already guaranteed.
    pub(crate) fn from_parts(
        transitions_cooperate: Vec<Vec<f64>>,
        transitions_defect: Vec<Vec<f64>>,
        emissions: Vec<f64>,
        initial_state: usize,
        initial_action: Action,
    ) -> Self {
        let num_states = transitions_cooperate.len();
        debug_assert_eq!(transitions_defect.len(), num_states);
        debug_assert_eq!(emissions.len(), num_states);
        Self {
            num_states,
            transitions_cooperate,
            transitions_defect,
            emissions,
            initial_state,
            initial_action,
            mutation_rate: default_mutation_rate(num_states),
        }
    }

    /// Creates a random genome with `num_states` states and the default mutation rate.
    ///
    /// Each transition row is drawn with [`simplex::random_simplex_vector`] and
    /// each emission probability uniformly from `[0, 1)`. The initial state is
    /// uniform over all states. The initial action is always
    /// [`Action::Cooperate`]; only mutation can produce a defecting opener.
    ///
    /// # Panics
    ///
    /// Panics if `num_states` is zero.
    pub fn random<R>(num_states: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::random_with_config(&HmmConfig::new(num_states), rng)
    }

    /// Like [`Self::random`], but takes the state count and mutation rate from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config.num_states` is zero.
    pub fn random_with_config<R>(config: &HmmConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let num_states = config.num_states;
        assert!(num_states > 0, "genome must have at least one state");

        let mut transitions_cooperate = Vec::with_capacity(num_states);
        let mut transitions_defect = Vec::with_capacity(num_states);
        let mut emissions = Vec::with_capacity(num_states);
        for _ in 0..num_states {
            transitions_cooperate.push(simplex::random_simplex_vector(num_states, rng));
            transitions_defect.push(simplex::random_simplex_vector(num_states, rng));
            emissions.push(rng.random::<f64>());
        }
        let initial_state = rng.random_range(0..num_states);

        Self::from_parts(
            transitions_cooperate,
            transitions_defect,
            emissions,
            initial_state,
            Action::Cooperate,
        )
        .with_mutation_rate(config.mutation_rate())
    }

    /// Replaces the per-entry mutation rate.
    #[must_use]
    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Transition matrix used after the opponent cooperated.
    #[must_use]
    pub fn transitions_cooperate(&self) -> &[Vec<f64>] {
        &self.transitions_cooperate
    }

    /// Transition matrix used after the opponent defected.
    #[must_use]
    pub fn transitions_defect(&self) -> &[Vec<f64>] {
        &self.transitions_defect
    }

    /// Transition matrix selected by the opponent's last action.
    #[must_use]
    pub fn transitions(&self, opponent_action: Action) -> &[Vec<f64>] {
        match opponent_action {
            Action::Cooperate => &self.transitions_cooperate,
            Action::Defect => &self.transitions_defect,
        }
    }

    /// Probability of cooperating in each state.
    #[must_use]
    pub fn emissions(&self) -> &[f64] {
        &self.emissions
    }

    #[must_use]
    pub fn initial_state(&self) -> usize {
        self.initial_state
    }

    #[must_use]
    pub fn initial_action(&self) -> Action {
        self.initial_action
    }

    #[must_use]
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Mutates the genome in place.
    ///
    /// Every transition entry and every emission is perturbed with probability
    /// `mutation_rate` by a value drawn uniformly from
    /// `[-MAX_PERTURBATION, MAX_PERTURBATION]` and clipped to `[0, 1]`.
    /// Rows that had an entry perturbed are re-normalized afterwards; untouched
    /// rows and the emissions are left bit-for-bit as they were.
    ///
    /// Two structural mutations follow, each far rarer than the entry-level ones:
    ///
    /// - the initial action flips with probability `mutation_rate / 10`
    /// - the initial state is redrawn with probability `mutation_rate / (10·N)`
    #[expect(clippy::cast_precision_loss)]
    pub fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let rate = self.mutation_rate;
        for row in self
            .transitions_cooperate
            .iter_mut()
            .chain(&mut self.transitions_defect)
        {
            if perturb_entries(row, rate, rng) {
                simplex::normalize_in_place(row);
            }
        }
        perturb_entries(&mut self.emissions, rate, rng);

        if rng.random::<f64>() < rate / 10.0 {
            self.initial_action = self.initial_action.flip();
        }
        if rng.random::<f64>() < rate / (10.0 * self.num_states as f64) {
            self.initial_state = rng.random_range(0..self.num_states);
        }
    }

    /// Creates a child by one-point crossover of `self` and `other`.
    ///
    /// Each transition matrix gets its own crosspoint `c` drawn from `[0, N)`:
    /// rows before `c` come from `self` and the rest from `other`. The emission
    /// vector is spliced the same way at an independent crosspoint. Whole rows are
    /// copied, so the child needs no re-normalization.
    ///
    /// The child inherits initial state, initial action and mutation rate from `self`.
    ///
    /// Returns an error if the parents have different state counts.
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, DimensionMismatchError>
    where
        R: Rng + ?Sized,
    {
        if self.num_states != other.num_states {
            return Err(DimensionMismatchError {
                left: self.num_states,
                right: other.num_states,
            });
        }

        let transitions_cooperate =
            splice(&self.transitions_cooperate, &other.transitions_cooperate, rng);
        let transitions_defect = splice(&self.transitions_defect, &other.transitions_defect, rng);
        let emissions = splice(&self.emissions, &other.emissions, rng);

        Ok(Self {
            num_states: self.num_states,
            transitions_cooperate,
            transitions_defect,
            emissions,
            initial_state: self.initial_state,
            initial_action: self.initial_action,
            mutation_rate: self.mutation_rate,
        })
    }
}

fn check_square(matrix: &[Vec<f64>], which: Action, num_states: usize) -> Result<(), ShapeError> {
    if matrix.len() != num_states {
        return Err(ShapeError::RowCount {
            matrix: which,
            rows: matrix.len(),
            expected: num_states,
        });
    }
    if let Some((row, values)) = matrix
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != num_states)
    {
        return Err(ShapeError::RowLength {
            matrix: which,
            row,
            len: values.len(),
            expected: num_states,
        });
    }
    Ok(())
}

/// Returns whether any entry was perturbed.
fn perturb_entries<R>(values: &mut [f64], rate: f64, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    let mut perturbed = false;
    for v in values {
        if rng.random::<f64>() < rate {
            let delta = rng.random_range(-MAX_PERTURBATION..=MAX_PERTURBATION);
            *v = (*v + delta).clamp(0.0, 1.0);
            perturbed = true;
        }
    }
    perturbed
}

/// Takes `left[..c]` followed by `right[c..]` for a crosspoint `c` in `[0, len)`.
fn splice<T, R>(left: &[T], right: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    assert_eq!(left.len(), right.len());
    let crosspoint = rng.random_range(0..left.len());
    left[..crosspoint]
        .iter()
        .chain(&right[crosspoint..])
        .cloned()
        .collect()
}

/// Returned when a genome's parts do not agree on the number of states.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("genome must have at least one state")]
    NoStates,
    #[display("{matrix} transition matrix has {rows} rows, expected {expected}")]
    RowCount {
        matrix: Action,
        rows: usize,
        expected: usize,
    },
    #[display("row {row} of the {matrix} transition matrix has {len} entries, expected {expected}")]
    RowLength {
        matrix: Action,
        row: usize,
        len: usize,
        expected: usize,
    },
    #[display("emission vector has {len} entries, expected {expected}")]
    EmissionLength { len: usize, expected: usize },
    #[display("initial state {state} is out of range for {num_states} states")]
    InitialState { state: usize, num_states: usize },
}

/// Returned when crossing genomes with different state counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot cross a {left}-state genome with a {right}-state genome")]
pub struct DimensionMismatchError {
    pub left: usize,
    pub right: usize,
}
