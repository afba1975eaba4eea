use clap::{Parser, Subcommand};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use self::{
    checkpoint::BestArg,
    codec::{DecodeArg, EncodeArg},
    operators::{CrossoverArg, MutateArg, RandomArg},
    play::PlayArg,
};

mod checkpoint;
mod codec;
mod operators;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate a random genome
    Random(#[clap(flatten)] RandomArg),
    /// Mutate a genome
    Mutate(#[clap(flatten)] MutateArg),
    /// Cross two genomes of the same size
    Crossover(#[clap(flatten)] CrossoverArg),
    /// Encode a genome as a flat vector with its bounds
    Encode(#[clap(flatten)] EncodeArg),
    /// Decode a flat vector into a genome
    Decode(#[clap(flatten)] DecodeArg),
    /// Print the best genomes recorded in a checkpoint file
    Best(#[clap(flatten)] BestArg),
    /// Play a genome against a fixed sequence of moves
    Play(#[clap(flatten)] PlayArg),
}

/// Seed shared by every command that draws random numbers.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SeedArg {
    /// Seed for the random number generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

impl SeedArg {
    pub(crate) fn rng(&self) -> Pcg64 {
        match self.seed {
            Some(seed) => {
                log::debug!("seeding generator with {seed}");
                Pcg64::seed_from_u64(seed)
            }
            None => {
                log::debug!("no seed given, seeding generator from the thread rng");
                Pcg64::from_rng(&mut rand::rng())
            }
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Random(arg) => operators::run_random(&arg)?,
        Mode::Mutate(arg) => operators::run_mutate(&arg)?,
        Mode::Crossover(arg) => operators::run_crossover(&arg)?,
        Mode::Encode(arg) => codec::run_encode(&arg)?,
        Mode::Decode(arg) => codec::run_decode(&arg)?,
        Mode::Best(arg) => checkpoint::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_decode_args() {
        let args = CommandArgs::try_parse_from(["hmm-dojo", "decode", "--vector", "[1, 0]"]).unwrap();
        assert!(matches!(args.mode, Mode::Decode(_)));
        assert!(CommandArgs::try_parse_from(["hmm-dojo", "mutate", "--genome", "0:C"]).is_err());
    }
}
