use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Atlantic Canada jurisdictions covered by the corpus.
///
/// Declaration order is the canonical output order of the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Province {
    #[serde(rename = "NB")]
    NewBrunswick,
    #[serde(rename = "NL")]
    NewfoundlandAndLabrador,
    #[serde(rename = "NS")]
    NovaScotia,
    #[serde(rename = "PEI")]
    PrinceEdwardIsland,
}

impl Province {
    pub const ALL: [Province; 4] = [
        Province::NewBrunswick,
        Province::NewfoundlandAndLabrador,
        Province::NovaScotia,
        Province::PrinceEdwardIsland,
    ];

    /// Directory and serialization code (e.g. `NB`)
    pub fn code(&self) -> &'static str {
        match self {
            Province::NewBrunswick => "NB",
            Province::NewfoundlandAndLabrador => "NL",
            Province::NovaScotia => "NS",
            Province::PrinceEdwardIsland => "PEI",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Province::NewBrunswick => "New Brunswick",
            Province::NewfoundlandAndLabrador => "Newfoundland and Labrador",
            Province::NovaScotia => "Nova Scotia",
            Province::PrinceEdwardIsland => "Prince Edward Island",
        }
    }

    /// Look up a province by its exact directory code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

impl FromStr for Province {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| IndexError::UnknownProvince(s.to_string()))
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
