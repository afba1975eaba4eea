use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A move in the iterated prisoner's dilemma.
///
/// The text form is a single character: `C` for [`Action::Cooperate`] and
/// `D` for [`Action::Defect`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Action {
    #[default]
    Cooperate,
    Defect,
}

impl Action {
    /// Returns the opposite action.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Cooperate => Self::Defect,
            Self::Defect => Self::Cooperate,
        }
    }

    /// Returns the single-character text form of this action.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Cooperate => 'C',
            Self::Defect => 'D',
        }
    }

    /// Parses an action from its single-character text form.
    pub fn from_char(c: char) -> Result<Self, ParseActionError> {
        match c {
            'C' => Ok(Self::Cooperate),
            'D' => Ok(Self::Defect),
            _ => Err(ParseActionError {
                input: c.to_string(),
            }),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Err(ParseActionError {
                input: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid action {input:?}: expected `C` or `D`")]
pub struct ParseActionError {
    input: String,
}
