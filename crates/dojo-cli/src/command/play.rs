use anyhow::Context as _;
use dojo_genome::{Action, HmmGenome, Params as _};

use super::SeedArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Genome in text form
    #[arg(long)]
    genome: HmmGenome,
    /// Opponent moves, one `C` or `D` per round
    #[arg(long, value_parser = parse_moves)]
    opponent: Moves,
    #[clap(flatten)]
    seed: SeedArg,
}

#[derive(Debug, Clone)]
struct Moves(Vec<Action>);

fn parse_moves(s: &str) -> anyhow::Result<Moves> {
    s.chars()
        .map(Action::from_char)
        .collect::<Result<_, _>>()
        .map(Moves)
        .with_context(|| format!("invalid move sequence {s:?}"))
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        genome,
        opponent: Moves(opponent),
        seed,
    } = arg;
    let mut player = genome.instantiate()?;
    let moves = player.play_against(opponent, &mut seed.rng());

    let cooperations = moves.iter().filter(|m| m.is_cooperate()).count();
    eprintln!("Cooperated in {cooperations} of {} rounds", moves.len());
    println!("{}", moves.iter().copied().map(Action::as_char).collect::<String>());
    Ok(())
}
