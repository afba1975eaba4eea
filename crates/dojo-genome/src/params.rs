//! The capability set optimizers require from a genome family.
//!
//! Both the genetic algorithm and the particle-swarm optimizer are written
//! against [`Params`], not against [`HmmGenome`] directly. The genetic algorithm
//! uses the structured operators (`randomize`, `mutate`, `crossover`, text
//! round trips for checkpoints), while the swarm only sees flat vectors
//! (`to_vector`, `from_vector_infer_dimension`, `bounds`). Both hand the decoded
//! genome to the objective through `instantiate`.

use std::error::Error;

use rand::Rng;

use crate::{
    hmm::{DimensionMismatchError, HmmConfig, HmmGenome},
    player::{HmmPlayer, MalformedHmmError},
    text::ParseGenomeError,
    vector::{VectorBounds, VectorDecodeError},
};

/// A genome representation that can be evolved by the optimizers.
///
/// `Clone` must produce an independent deep copy.
pub trait Params: Clone {
    /// Shape and hyper-parameters needed to create a genome.
    type Config;
    /// Runnable strategy handed to the objective function.
    type Player;
    type TextError: Error + Send + Sync + 'static;
    type VectorError: Error + Send + Sync + 'static;
    type PlayerError: Error + Send + Sync + 'static;

    /// Creates a random genome.
    fn randomize<R>(config: &Self::Config, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;

    /// Mutates the genome in place.
    fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized;

    /// Recombines two genomes of the same shape into a child.
    fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, DimensionMismatchError>
    where
        R: Rng + ?Sized;

    /// Canonical, round-trippable text form.
    fn to_text(&self) -> String;

    fn from_text(text: &str) -> Result<Self, Self::TextError>;

    /// Flat encoding for continuous optimizers.
    fn to_vector(&self) -> Vec<f64>;

    fn from_vector(vector: &[f64], config: &Self::Config) -> Result<Self, Self::VectorError>;

    /// Like [`Self::from_vector`], but recovers the shape from the vector length.
    fn from_vector_infer_dimension(vector: &[f64]) -> Result<Self, Self::VectorError>;

    /// Box constraints matching [`Self::to_vector`].
    fn bounds(&self) -> VectorBounds;

    fn instantiate(&self) -> Result<Self::Player, Self::PlayerError>;
}

impl Params for HmmGenome {
    type Config = HmmConfig;
    type Player = HmmPlayer;
    type TextError = ParseGenomeError;
    type VectorError = VectorDecodeError;
    type PlayerError = MalformedHmmError;

    fn randomize<R>(config: &HmmConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        HmmGenome::random_with_config(config, rng)
    }

    fn mutate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        HmmGenome::mutate(self, rng);
    }

    fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, DimensionMismatchError>
    where
        R: Rng + ?Sized,
    {
        HmmGenome::crossover(self, other, rng)
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, ParseGenomeError> {
        text.parse()
    }

    fn to_vector(&self) -> Vec<f64> {
        HmmGenome::to_vector(self)
    }

    /// Decodes with `config.num_states`; a configured mutation rate is applied
    /// to the decoded genome.
    fn from_vector(vector: &[f64], config: &HmmConfig) -> Result<Self, VectorDecodeError> {
        HmmGenome::from_vector(vector, config.num_states)
            .map(|genome| genome.with_mutation_rate(config.mutation_rate()))
    }

    fn from_vector_infer_dimension(vector: &[f64]) -> Result<Self, VectorDecodeError> {
        HmmGenome::from_vector_infer_dimension(vector)
    }

    fn bounds(&self) -> VectorBounds {
        HmmGenome::bounds(self)
    }

    fn instantiate(&self) -> Result<HmmPlayer, MalformedHmmError> {
        HmmPlayer::new(self)
    }
}
