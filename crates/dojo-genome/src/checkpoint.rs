//! Checkpoint rows written by the population controller.
//!
//! Each generation appends one comma-separated row:
//!
//! ```text
//! generation,mean_score,std_dev_score,max_score,best_genome_text
//! ```
//!
//! The last column is the genome's canonical text form, which never contains a
//! comma. [`load_best`] reads a whole checkpoint file back and re-hydrates the
//! champions so they can seed a new run.

use std::{
    error::Error,
    fmt,
    io::{self, BufRead},
    num::{ParseFloatError, ParseIntError},
    str::FromStr,
};

use dojo_stats::descriptive::DescriptiveStats;

use crate::params::Params;

/// One row of a checkpoint file.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    pub generation: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub max: f64,
    /// Canonical text form of the best genome of the generation.
    pub genome: String,
}

impl CheckpointRecord {
    /// Summarizes a generation's scores.
    ///
    /// The standard deviation is the population standard deviation. NaN scores
    /// are dropped with a warning. Returns `None` when no other score remains.
    ///
    /// # Examples
    ///
    /// ```
    /// use dojo_genome::{HmmGenome, checkpoint::CheckpointRecord};
    ///
    /// let best = HmmGenome::random(2, &mut rand::rng());
    /// let record = CheckpointRecord::summarize(7, [1.0, 2.0, 3.0], &best).unwrap();
    /// assert_eq!(record.generation, 7);
    /// assert_eq!(record.mean, 2.0);
    /// assert_eq!(record.max, 3.0);
    /// assert_eq!(record.genome, best.to_string());
    /// ```
    pub fn summarize<P, I>(generation: usize, scores: I, best: &P) -> Option<Self>
    where
        P: Params,
        I: IntoIterator<Item = f64>,
    {
        let mut dropped = 0;
        let scores = scores.into_iter().filter(|score| {
            let keep = !score.is_nan();
            if !keep {
                dropped += 1;
            }
            keep
        });
        let stats = DescriptiveStats::new(scores);
        if dropped > 0 {
            log::warn!("generation {generation}: ignored {dropped} NaN scores");
        }
        let stats = stats?;
        Some(Self {
            generation,
            mean: stats.mean,
            std_dev: stats.std_dev,
            max: stats.max,
            genome: best.to_text(),
        })
    }

    /// Decodes the genome column.
    pub fn parse_genome<P>(&self) -> Result<P, P::TextError>
    where
        P: Params,
    {
        P::from_text(&self.genome)
    }
}

impl fmt::Display for CheckpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.generation, self.mean, self.std_dev, self.max, self.genome
        )
    }
}

impl FromStr for CheckpointRecord {
    type Err = ParseCheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let columns = s.trim_end().split(',').collect::<Vec<_>>();
        let &[generation, mean, std_dev, max, genome] = columns.as_slice() else {
            return Err(ParseCheckpointError::ColumnCount {
                found: columns.len(),
            });
        };
        let generation = generation
            .trim()
            .parse()
            .map_err(|source| ParseCheckpointError::Generation { source })?;
        let score = |column: &'static str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|source| ParseCheckpointError::Score { column, source })
        };
        Ok(Self {
            generation,
            mean: score("mean", mean)?,
            std_dev: score("std_dev", std_dev)?,
            max: score("max", max)?,
            genome: genome.trim().to_owned(),
        })
    }
}

/// Reads every row of a checkpoint and returns the `num` genomes with the
/// highest max score, best first.
///
/// Blank lines are skipped. Rows with equal max scores keep file order.
pub fn load_best<P, R>(reader: R, num: usize) -> Result<Vec<P>, CheckpointError<P::TextError>>
where
    P: Params,
    R: BufRead,
{
    let mut records = vec![];
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(CheckpointError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = line
            .parse::<CheckpointRecord>()
            .map_err(|source| CheckpointError::Row {
                line: index + 1,
                source,
            })?;
        records.push((index + 1, record));
    }
    log::debug!("read {} checkpoint rows", records.len());

    records.sort_by(|(_, a), (_, b)| b.max.total_cmp(&a.max));
    records
        .into_iter()
        .take(num)
        .map(|(line, record)| {
            record
                .parse_genome()
                .map_err(|source| CheckpointError::Genome { line, source })
        })
        .collect()
}

/// Returned when a checkpoint row is malformed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseCheckpointError {
    #[display("expected 5 comma-separated columns, found {found}")]
    ColumnCount { found: usize },
    #[display("invalid generation number")]
    Generation { source: ParseIntError },
    #[display("invalid {column} score")]
    Score {
        column: &'static str,
        source: ParseFloatError,
    },
}

/// Returned by [`load_best`].
#[derive(Debug)]
pub enum CheckpointError<E> {
    Io(io::Error),
    Row {
        line: usize,
        source: ParseCheckpointError,
    },
    Genome {
        line: usize,
        source: E,
    },
}

impl<E> fmt::Display for CheckpointError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => write!(f, "failed to read checkpoint"),
            Self::Row { line, .. } => write!(f, "malformed checkpoint row at line {line}"),
            Self::Genome { line, .. } => write!(f, "malformed genome at line {line}"),
        }
    }
}

impl<E> Error for CheckpointError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            Self::Row { source, .. } => Some(source),
            Self::Genome { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::{hmm::HmmGenome, hmm::tests::example_genome, text::ParseGenomeError};

    #[test]
    fn test_record_round_trip() {
        let record = CheckpointRecord {
            generation: 3,
            mean: 2.25,
            std_dev: 0.5,
            max: 3.125,
            genome: example_genome().to_string(),
        };
        let line = record.to_string();
        assert_eq!(line, "3,2.25,0.5,3.125,0:C:0.5_0.5|0.3_0.7:1_0|0_1:0.9_0.1");
        assert_eq!(line.parse::<CheckpointRecord>(), Ok(record));
    }

    #[test]
    fn test_summarize_uses_population_std_dev() {
        let record = CheckpointRecord::summarize(1, [1.0, 3.0], &example_genome()).unwrap();
        assert_eq!(record.mean, 2.0);
        assert_eq!(record.std_dev, 1.0);
        assert_eq!(record.max, 3.0);
        assert_eq!(record.parse_genome::<HmmGenome>(), Ok(example_genome()));
        assert!(CheckpointRecord::summarize(1, [], &example_genome()).is_none());
    }

    #[test]
    fn test_summarize_ignores_nan_scores() {
        let record =
            CheckpointRecord::summarize(2, [1.0, f64::NAN, 3.0], &example_genome()).unwrap();
        assert_eq!(record.mean, 2.0);
        assert_eq!(record.max, 3.0);
        assert!(CheckpointRecord::summarize(2, [f64::NAN], &example_genome()).is_none());
    }

    #[test]
    fn test_rejects_malformed_rows() {
        assert_eq!(
            "1,2,3".parse::<CheckpointRecord>(),
            Err(ParseCheckpointError::ColumnCount { found: 3 })
        );
        assert!(matches!(
            "x,1,1,1,g".parse::<CheckpointRecord>(),
            Err(ParseCheckpointError::Generation { .. })
        ));
        assert!(matches!(
            "1,1,nope,1,g".parse::<CheckpointRecord>(),
            Err(ParseCheckpointError::Score {
                column: "std_dev",
                ..
            })
        ));
    }

    #[test]
    fn test_load_best_orders_by_max_score() {
        let mut rng = Pcg64::seed_from_u64(61);
        let genomes = (0..4)
            .map(|_| HmmGenome::random(2, &mut rng))
            .collect::<Vec<_>>();
        let maxes = [1.5, 4.0, 2.5, 3.0];
        let file = genomes
            .iter()
            .zip(maxes)
            .enumerate()
            .map(|(generation, (genome, max))| {
                format!("{}\n", CheckpointRecord::summarize(generation, [0.0, max], genome).unwrap())
            })
            .collect::<String>();

        for num in 1..=4 {
            let best = load_best::<HmmGenome, _>(Cursor::new(&file), num).unwrap();
            assert_eq!(best.len(), num);
        }
        let best = load_best::<HmmGenome, _>(Cursor::new(&file), 10).unwrap();
        assert_eq!(
            best,
            vec![
                genomes[1].clone(),
                genomes[3].clone(),
                genomes[2].clone(),
                genomes[0].clone()
            ]
        );
    }

    #[test]
    fn test_load_best_reports_line_numbers() {
        let file = "0,1,0,1,0:C:1:1:0.5\n\n2,1,0,2,0:C:1:1\n";
        match load_best::<HmmGenome, _>(Cursor::new(file), 2) {
            Err(CheckpointError::Genome {
                line: 3,
                source: ParseGenomeError::FieldCount { found: 4 },
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }

        let file = "0,1,0,1\n";
        assert!(matches!(
            load_best::<HmmGenome, _>(Cursor::new(file), 1),
            Err(CheckpointError::Row { line: 1, .. })
        ));
    }
}
