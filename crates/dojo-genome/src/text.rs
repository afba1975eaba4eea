//! Canonical text form of an [`HmmGenome`].
//!
//! ```text
//! initial_state:initial_action:rows(Tc):rows(Td):emissions
//! ```
//!
//! Entries within a row are joined with `_` and rows with `|`. Floats are
//! written with the shortest representation that parses back to the same
//! `f64`, so encoding followed by decoding is bit-exact.
//!
//! The text form is also the genome's serde representation and the last column
//! of a checkpoint row.

use std::{
    fmt,
    num::{ParseFloatError, ParseIntError},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    action::{Action, ParseActionError},
    hmm::{HmmGenome, ShapeError},
};

const FIELD_SEPARATOR: char = ':';
const ROW_SEPARATOR: char = '|';
const ENTRY_SEPARATOR: char = '_';

impl fmt::Display for HmmGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}",
            self.initial_state(),
            self.initial_action()
        )?;
        write_rows(f, self.transitions_cooperate())?;
        write!(f, "{FIELD_SEPARATOR}")?;
        write_rows(f, self.transitions_defect())?;
        write!(f, "{FIELD_SEPARATOR}")?;
        write_row(f, self.emissions())
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[Vec<f64>]) -> fmt::Result {
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            write!(f, "{ROW_SEPARATOR}")?;
        }
        write_row(f, row)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[f64]) -> fmt::Result {
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            write!(f, "{ENTRY_SEPARATOR}")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

impl FromStr for HmmGenome {
    type Err = ParseGenomeError;

    /// Parses the canonical text form.
    ///
    /// The number of states is the row count of the first matrix. Values are
    /// taken literally (no normalization) and the mutation rate is the default
    /// for that number of states. The text form does not carry the mutation
    /// rate, so a round trip preserves every encoded field but not a custom rate.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(FIELD_SEPARATOR).collect::<Vec<_>>();
        let &[initial_state, initial_action, cooperate, defect, emissions] = fields.as_slice() else {
            return Err(ParseGenomeError::FieldCount {
                found: fields.len(),
            });
        };

        let initial_state =
            initial_state
                .parse::<usize>()
                .map_err(|source| ParseGenomeError::InitialState {
                    input: initial_state.to_owned(),
                    source,
                })?;
        let initial_action = initial_action
            .parse::<Action>()
            .map_err(ParseGenomeError::InitialAction)?;
        let transitions_cooperate = parse_matrix(cooperate)?;
        let transitions_defect = parse_matrix(defect)?;
        let emissions = parse_row(emissions)?;

        HmmGenome::new(
            transitions_cooperate,
            transitions_defect,
            emissions,
            initial_state,
            initial_action,
        )
        .map_err(ParseGenomeError::Shape)
    }
}

fn parse_matrix(s: &str) -> Result<Vec<Vec<f64>>, ParseGenomeError> {
    s.split(ROW_SEPARATOR).map(parse_row).collect()
}

fn parse_row(s: &str) -> Result<Vec<f64>, ParseGenomeError> {
    s.split(ENTRY_SEPARATOR)
        .map(|entry| {
            entry
                .parse::<f64>()
                .map_err(|source| ParseGenomeError::Number {
                    input: entry.to_owned(),
                    source,
                })
        })
        .collect()
}

impl Serialize for HmmGenome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HmmGenome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid genome {text:?}: {e}")))
    }
}

/// Returned when text does not hold a well-formed genome.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGenomeError {
    #[display("expected 5 `:`-separated fields, found {found}")]
    FieldCount { found: usize },
    #[display("invalid initial state {input:?}")]
    InitialState {
        input: String,
        source: ParseIntError,
    },
    #[display("invalid initial action")]
    InitialAction(ParseActionError),
    #[display("invalid number {input:?}")]
    Number {
        input: String,
        source: ParseFloatError,
    },
    #[display("malformed genome shape")]
    Shape(ShapeError),
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{any, prop_assert_eq, proptest};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;
    use crate::hmm::{HmmConfig, default_mutation_rate, tests::example_genome};

    const EXAMPLE_TEXT: &str = "0:C:0.5_0.5|0.3_0.7:1_0|0_1:0.9_0.1";

    #[test]
    fn test_example_encoding() {
        let text = example_genome().to_string();
        assert_eq!(text, EXAMPLE_TEXT);
        let fields = text.split(':').collect::<Vec<_>>();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "0");
        assert_eq!(fields[1], "C");
    }

    #[test]
    fn test_example_decoding() {
        let genome: HmmGenome = EXAMPLE_TEXT.parse().unwrap();
        assert_eq!(genome, example_genome());
    }

    #[test]
    fn test_accepts_trailing_zero_decimals() {
        let genome: HmmGenome = "1:D:0.5_0.5|0.3_0.7:1.0_0.0|0.0_1.0:0.9_0.1"
            .parse()
            .unwrap();
        assert_eq!(genome.initial_state(), 1);
        assert_eq!(genome.initial_action(), Action::Defect);
        assert_eq!(genome.transitions_defect(), example_genome().transitions_defect());
    }

    #[test]
    fn test_decoding_does_not_normalize() {
        let genome: HmmGenome = "1:C:2_2|1_1:0_0|0_0:5_3".parse().unwrap();
        assert_eq!(genome.num_states(), 2);
        assert_eq!(genome.transitions_cooperate(), &[vec![2.0, 2.0], vec![1.0, 1.0]]);
        assert_eq!(genome.transitions_defect(), &[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(genome.emissions(), &[5.0, 3.0]);
    }

    #[test]
    fn test_round_trip_resets_custom_mutation_rate() {
        let config = HmmConfig::new(3).with_mutation_rate(0.05);
        let genome = HmmGenome::random_with_config(&config, &mut Pcg64::seed_from_u64(7));
        let decoded: HmmGenome = genome.to_string().parse().unwrap();
        assert_eq!(decoded.mutation_rate(), default_mutation_rate(3));
        assert_ne!(decoded, genome);
        assert_eq!(decoded, genome.with_mutation_rate(default_mutation_rate(3)));
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert_eq!(
            "0:C:1:1".parse::<HmmGenome>(),
            Err(ParseGenomeError::FieldCount { found: 4 })
        );
        assert_eq!(
            "0:C:1:1:1:1".parse::<HmmGenome>(),
            Err(ParseGenomeError::FieldCount { found: 6 })
        );
        assert_eq!(
            "".parse::<HmmGenome>(),
            Err(ParseGenomeError::FieldCount { found: 1 })
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            "x:C:1:1:1".parse::<HmmGenome>(),
            Err(ParseGenomeError::InitialState { .. })
        ));
        assert!(matches!(
            "0:Q:1:1:1".parse::<HmmGenome>(),
            Err(ParseGenomeError::InitialAction(_))
        ));
        assert!(matches!(
            "0:C:1:abc:1".parse::<HmmGenome>(),
            Err(ParseGenomeError::Number { input, .. }) if input == "abc"
        ));
        assert!(matches!(
            "0:C:1::1".parse::<HmmGenome>(),
            Err(ParseGenomeError::Number { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            "0:C:0.5_0.5|1:0.5_0.5|0.5_0.5:0.1_0.2".parse::<HmmGenome>(),
            Err(ParseGenomeError::Shape(ShapeError::RowLength { row: 1, .. }))
        ));
        assert!(matches!(
            "0:C:1_0|0_1:1_0|0_1:0.1".parse::<HmmGenome>(),
            Err(ParseGenomeError::Shape(ShapeError::EmissionLength { .. }))
        ));
        assert!(matches!(
            "3:C:1_0|0_1:1_0|0_1:0.1_0.2".parse::<HmmGenome>(),
            Err(ParseGenomeError::Shape(ShapeError::InitialState { state: 3, .. }))
        ));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&example_genome()).unwrap();
        assert_eq!(json, format!("\"{EXAMPLE_TEXT}\""));
        let genome: HmmGenome = serde_json::from_str(&json).unwrap();
        assert_eq!(genome, example_genome());
        assert!(serde_json::from_str::<HmmGenome>("\"0:C\"").is_err());
    }

    proptest! {
        #[test]
        fn text_round_trip_is_exact(n in 1usize..8, rounds in 0usize..4, seed in any::<u64>()) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let mut genome = HmmGenome::random(n, &mut rng);
            let other = HmmGenome::random(n, &mut rng);
            for _ in 0..rounds {
                genome.mutate(&mut rng);
                genome = genome.crossover(&other, &mut rng).unwrap();
            }
            let decoded: HmmGenome = genome.to_string().parse().unwrap();
            prop_assert_eq!(decoded, genome);
        }
    }
}
