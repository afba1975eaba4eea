use dojo_genome::{HmmConfig, HmmGenome};

use super::SeedArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RandomArg {
    /// Number of hidden states
    #[arg(long)]
    states: usize,
    /// Per-entry mutation rate (defaults to 10 / N^2)
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[clap(flatten)]
    seed: SeedArg,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MutateArg {
    /// Genome in text form
    #[arg(long)]
    genome: HmmGenome,
    /// Number of successive mutations to apply
    #[arg(long, default_value_t = 1)]
    rounds: usize,
    /// Per-entry mutation rate (defaults to 10 / N^2)
    #[arg(long)]
    mutation_rate: Option<f64>,
    #[clap(flatten)]
    seed: SeedArg,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CrossoverArg {
    /// First parent; the child inherits its initial state and action
    #[arg(long)]
    left: HmmGenome,
    /// Second parent
    #[arg(long)]
    right: HmmGenome,
    #[clap(flatten)]
    seed: SeedArg,
}

pub(crate) fn run_random(arg: &RandomArg) -> anyhow::Result<()> {
    let RandomArg {
        states,
        mutation_rate,
        seed,
    } = arg;
    anyhow::ensure!(*states > 0, "--states must be at least 1");

    let mut config = HmmConfig::new(*states);
    if let Some(rate) = mutation_rate {
        config = config.with_mutation_rate(*rate);
    }
    let genome = HmmGenome::random_with_config(&config, &mut seed.rng());
    eprintln!(
        "Generated genome with {} states (mutation rate {:.4})",
        genome.num_states(),
        genome.mutation_rate()
    );
    println!("{genome}");
    Ok(())
}

pub(crate) fn run_mutate(arg: &MutateArg) -> anyhow::Result<()> {
    let MutateArg {
        genome,
        rounds,
        mutation_rate,
        seed,
    } = arg;
    let mut genome = match mutation_rate {
        Some(rate) => genome.clone().with_mutation_rate(*rate),
        None => genome.clone(),
    };
    let mut rng = seed.rng();
    for _ in 0..*rounds {
        genome.mutate(&mut rng);
    }
    eprintln!("Applied {rounds} mutation rounds");
    println!("{genome}");
    Ok(())
}

pub(crate) fn run_crossover(arg: &CrossoverArg) -> anyhow::Result<()> {
    let CrossoverArg { left, right, seed } = arg;
    let child = left.crossover(right, &mut seed.rng())?;
    println!("{child}");
    Ok(())
}
