use std::path::PathBuf;

use anyhow::Context as _;
use dojo_genome::HmmGenome;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EncodeArg {
    /// Genome in text form
    #[arg(long)]
    genome: HmmGenome,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DecodeArg {
    /// Flat vector as a JSON array of numbers
    #[arg(long)]
    vector: String,
    /// Number of hidden states (recovered from the vector length when omitted)
    #[arg(long)]
    states: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct EncodedGenome {
    num_states: usize,
    vector: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

pub(crate) fn run_encode(arg: &EncodeArg) -> anyhow::Result<()> {
    let EncodeArg { genome, output } = arg;
    let (lower, upper) = genome.bounds().into_parts();
    let encoded = EncodedGenome {
        num_states: genome.num_states(),
        vector: genome.to_vector(),
        lower,
        upper,
    };
    Output::save_json(&encoded, output.clone())?;

    if let Some(path) = output {
        eprintln!(
            "Encoded {} values to {}",
            encoded.vector.len(),
            path.display()
        );
    }
    Ok(())
}

pub(crate) fn run_decode(arg: &DecodeArg) -> anyhow::Result<()> {
    let DecodeArg { vector, states } = arg;
    let vector: Vec<f64> =
        serde_json::from_str(vector).context("Failed to parse vector as a JSON array")?;
    let genome = match states {
        Some(num_states) => HmmGenome::from_vector(&vector, *num_states),
        None => HmmGenome::from_vector_infer_dimension(&vector),
    }
    .with_context(|| format!("Failed to decode vector of length {}", vector.len()))?;
    println!("{genome}");
    Ok(())
}
