use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter rating reported by the catalog for nutrition and environmental impact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
    #[default]
    Unknown,
}

impl Grade {
    /// Parses a catalog grade letter. Anything outside `a..=e` is `Unknown`.
    pub fn from_letter(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    /// Numeric value on the 1..=5 scale, higher is better. `Unknown` takes the worst value.
    pub fn value(self) -> f64 {
        match self {
            Self::A => 5.0,
            Self::B => 4.0,
            Self::C => 3.0,
            Self::D => 2.0,
            Self::E | Self::Unknown => 1.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// NOVA processing group, 1 (unprocessed) through 4 (ultra-processed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProcessingLevel(u8);

impl ProcessingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ProcessingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("processing level {value} is outside 1..=4"))
    }
}

impl From<ProcessingLevel> for u8 {
    fn from(value: ProcessingLevel) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub name: String,
    pub nutrition_grade: Grade,
    pub processing_level: Option<ProcessingLevel>,
    pub eco_grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands: Option<String>,
}

impl CandidateRecord {
    pub fn new(
        name: impl Into<String>,
        nutrition_grade: Grade,
        processing_level: Option<ProcessingLevel>,
        eco_grade: Grade,
    ) -> Self {
        Self {
            name: name.into(),
            nutrition_grade,
            processing_level,
            eco_grade,
            code: None,
            brands: None,
        }
    }
}
