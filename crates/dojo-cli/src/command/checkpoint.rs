use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context as _;
use dojo_genome::{HmmGenome, checkpoint};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BestArg {
    /// Checkpoint file written by a training run
    #[arg(long)]
    checkpoint: PathBuf,
    /// Number of genomes to print
    #[arg(long, default_value_t = 1)]
    num: usize,
}

pub(crate) fn run(arg: &BestArg) -> anyhow::Result<()> {
    let BestArg { checkpoint, num } = arg;
    let file = File::open(checkpoint)
        .with_context(|| format!("Failed to open checkpoint file: {}", checkpoint.display()))?;
    let best = checkpoint::load_best::<HmmGenome, _>(BufReader::new(file), *num)
        .with_context(|| format!("Failed to load checkpoint: {}", checkpoint.display()))?;

    eprintln!("Loaded {} genomes from {}", best.len(), checkpoint.display());
    for genome in &best {
        println!("{genome}");
    }
    Ok(())
}
