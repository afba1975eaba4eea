//! A runnable strategy built from an [`HmmGenome`].
//!
//! The player opens with the genome's initial action. On every later turn it
//! looks at the opponent's previous move, samples its next hidden state from
//! the matching transition row, and cooperates with that state's emission
//! probability.

use rand::{
    Rng,
    distr::{Distribution as _, weighted::WeightedIndex},
};

use crate::{action::Action, hmm::HmmGenome};

/// Tolerance for a transition row to count as summing to 1.0.
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// A hidden-Markov strategy ready to play a match.
#[derive(Debug, Clone)]
pub struct HmmPlayer {
    transitions_cooperate: Vec<WeightedIndex<f64>>,
    transitions_defect: Vec<WeightedIndex<f64>>,
    emissions: Vec<f64>,
    initial_state: usize,
    initial_action: Action,
    state: usize,
    history: Vec<Action>,
}

impl HmmPlayer {
    /// Builds a player from a genome.
    ///
    /// Returns an error unless every transition row is a probability
    /// distribution and every emission lies in `[0, 1]`.
    pub fn new(genome: &HmmGenome) -> Result<Self, MalformedHmmError> {
        let transitions_cooperate = sampler_rows(genome, Action::Cooperate)?;
        let transitions_defect = sampler_rows(genome, Action::Defect)?;
        if let Some((state, &value)) = genome
            .emissions()
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(MalformedHmmError::Emission { state, value });
        }

        Ok(Self {
            transitions_cooperate,
            transitions_defect,
            emissions: genome.emissions().to_vec(),
            initial_state: genome.initial_state(),
            initial_action: genome.initial_action(),
            state: genome.initial_state(),
            history: vec![],
        })
    }

    /// Current hidden state.
    #[must_use]
    pub fn state(&self) -> usize {
        self.state
    }

    /// Moves played so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// Plays one turn.
    ///
    /// `opponent_last` is the opponent's move in the previous round, or `None`
    /// on the first round of a match. The first round always plays the initial
    /// action without changing state.
    pub fn play<R>(&mut self, opponent_last: Option<Action>, rng: &mut R) -> Action
    where
        R: Rng + ?Sized,
    {
        let action = match opponent_last {
            None => self.initial_action,
            Some(opponent) => {
                let rows = match opponent {
                    Action::Cooperate => &self.transitions_cooperate,
                    Action::Defect => &self.transitions_defect,
                };
                self.state = rows[self.state].sample(rng);
                if rng.random_bool(self.emissions[self.state]) {
                    Action::Cooperate
                } else {
                    Action::Defect
                }
            }
        };
        self.history.push(action);
        action
    }

    /// Plays a whole match against a fixed sequence of opponent moves.
    ///
    /// Returns one move per opponent move. The player is reset first.
    pub fn play_against<R>(&mut self, opponent: &[Action], rng: &mut R) -> Vec<Action>
    where
        R: Rng + ?Sized,
    {
        self.reset();
        let previous = std::iter::once(None).chain(opponent.iter().copied().map(Some));
        previous
            .take(opponent.len())
            .map(|last| self.play(last, rng))
            .collect()
    }

    /// Returns to the initial state and forgets the history.
    pub fn reset(&mut self) {
        self.state = self.initial_state;
        self.history.clear();
    }
}

fn sampler_rows(
    genome: &HmmGenome,
    matrix: Action,
) -> Result<Vec<WeightedIndex<f64>>, MalformedHmmError> {
    genome
        .transitions(matrix)
        .iter()
        .enumerate()
        .map(|(row, values)| {
            let sum: f64 = values.iter().sum();
            let in_range = values.iter().all(|v| (0.0..=1.0).contains(v));
            if !in_range || (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(MalformedHmmError::Transition { matrix, row, sum });
            }
            WeightedIndex::new(values).map_err(|_| MalformedHmmError::Transition { matrix, row, sum })
        })
        .collect()
}

/// Returned when a genome's values do not describe a valid hidden-Markov model.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MalformedHmmError {
    #[display("row {row} of the {matrix} transition matrix is not a distribution (sum {sum})")]
    Transition { matrix: Action, row: usize, sum: f64 },
    #[display("emission probability {value} of state {state} is outside [0, 1]")]
    Emission { state: usize, value: f64 },
}
