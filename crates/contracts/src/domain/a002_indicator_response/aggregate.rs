use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Answer recorded for one indicator. Serialized as `0`, `1`, `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Evaluation {
    No,
    Maybe,
    Yes,
}

impl Evaluation {
    pub const ALL: [Evaluation; 3] = [Evaluation::Yes, Evaluation::Maybe, Evaluation::No];

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::No => "No",
            Evaluation::Maybe => "Maybe",
            Evaluation::Yes => "Yes",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            Evaluation::No => "لا",
            Evaluation::Maybe => "إلى حد ما",
            Evaluation::Yes => "نعم",
        }
    }
}

impl TryFrom<u8> for Evaluation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Evaluation::No),
            1 => Ok(Evaluation::Maybe),
            2 => Ok(Evaluation::Yes),
            other => Err(format!("Invalid evaluation value: {}", other)),
        }
    }
}

impl From<Evaluation> for u8 {
    fn from(value: Evaluation) -> Self {
        match value {
            Evaluation::No => 0,
            Evaluation::Maybe => 1,
            Evaluation::Yes => 2,
        }
    }
}

/// One program's recorded answer to one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResponse {
    pub id: i64,
    pub domain_id: i64,
    pub indicator_id: i64,
    pub program_id: i64,
    pub evaluation: Evaluation,
    #[serde(default)]
    pub comment: Option<String>,
    /// Row version for stale-write detection; absent on older backends
    #[serde(default)]
    pub version: Option<i64>,
}

/// Body of `POST qualitative/responses` (create or update by program + indicator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponseRequest {
    pub domain_id: i64,
    pub indicator_id: i64,
    pub program_id: i64,
    pub evaluation: Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}
