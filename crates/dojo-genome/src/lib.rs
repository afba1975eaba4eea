//! Hidden-Markov genomes for evolving iterated prisoner's dilemma strategies.
//!
//! This crate holds the genome side of the tournament optimizers: the genome
//! representation itself, the stochastic operators a genetic algorithm applies
//! to it, and the codecs that let other tools store or search over it.
//!
//! # Overview
//!
//! ```text
//! HmmConfig ──random──▶ HmmGenome ──mutate / crossover──▶ HmmGenome
//!                           │
//!        ┌──────────────────┼───────────────────┐
//!        ▼                  ▼                   ▼
//!   text form          flat vector          HmmPlayer
//!  (checkpoints)    (particle swarm)     (plays matches)
//! ```
//!
//! - [`hmm`] defines [`HmmGenome`] and the variation operators
//! - [`simplex`] samples and normalizes probability vectors
//! - [`text`] is the canonical `state:action:Tc:Td:emissions` form
//! - [`vector`] flattens a genome for continuous optimizers and recovers `N`
//!   from a vector length
//! - [`player`] turns a genome into a runnable strategy
//! - [`params`] is the trait optimizers are written against
//! - [`checkpoint`] reads and writes per-generation summary rows
//!
//! # Example
//!
//! ```
//! use dojo_genome::{Action, HmmGenome, HmmPlayer};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg64;
//!
//! let mut rng = Pcg64::seed_from_u64(0);
//! let mut genome = HmmGenome::random(3, &mut rng);
//! genome.mutate(&mut rng);
//!
//! let text = genome.to_string();
//! assert_eq!(text.parse::<HmmGenome>().unwrap(), genome);
//!
//! let mut player = HmmPlayer::new(&genome).unwrap();
//! let moves = player.play_against(&[Action::Cooperate, Action::Defect], &mut rng);
//! assert_eq!(moves[0], Action::Cooperate);
//! ```

pub mod action;
pub mod checkpoint;
pub mod hmm;
pub mod params;
pub mod player;
pub mod simplex;
pub mod text;
pub mod vector;

pub use self::{
    action::{Action, ParseActionError},
    checkpoint::CheckpointRecord,
    hmm::{DimensionMismatchError, HmmConfig, HmmGenome, ShapeError},
    params::Params,
    player::{HmmPlayer, MalformedHmmError},
    text::ParseGenomeError,
    vector::{VectorBounds, VectorDecodeError},
};
