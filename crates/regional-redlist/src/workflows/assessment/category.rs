use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regional risk categories, from most to least at risk, plus Data Deficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedListCategory {
    #[serde(rename = "CR")]
    CriticallyEndangered,
    #[serde(rename = "EN")]
    Endangered,
    #[serde(rename = "VU")]
    Vulnerable,
    #[serde(rename = "NT")]
    NearThreatened,
    #[serde(rename = "LC")]
    LeastConcern,
    #[serde(rename = "DD")]
    DataDeficient,
}

/// Adjustment scale; index 0 is the most at risk. Data Deficient sits outside it.
pub const SCALE: [RedListCategory; 5] = [
    RedListCategory::CriticallyEndangered,
    RedListCategory::Endangered,
    RedListCategory::Vulnerable,
    RedListCategory::NearThreatened,
    RedListCategory::LeastConcern,
];

impl RedListCategory {
    pub const fn code(self) -> &'static str {
        match self {
            Self::CriticallyEndangered => "CR",
            Self::Endangered => "EN",
            Self::Vulnerable => "VU",
            Self::NearThreatened => "NT",
            Self::LeastConcern => "LC",
            Self::DataDeficient => "DD",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CriticallyEndangered => "Critically Endangered",
            Self::Endangered => "Endangered",
            Self::Vulnerable => "Vulnerable",
            Self::NearThreatened => "Near Threatened",
            Self::LeastConcern => "Least Concern",
            Self::DataDeficient => "Data Deficient",
        }
    }

    /// Position on [`SCALE`], `None` for categories the adjustment step never touches.
    pub fn scale_index(self) -> Option<usize> {
        SCALE.iter().position(|category| *category == self)
    }

    pub fn is_threatened(self) -> bool {
        matches!(
            self,
            Self::CriticallyEndangered | Self::Endangered | Self::Vulnerable
        )
    }

    /// True when `self` sits strictly closer to Critically Endangered than `other`.
    pub fn is_more_severe_than(self, other: Self) -> bool {
        match (self.scale_index(), other.scale_index()) {
            (Some(lhs), Some(rhs)) => lhs < rhs,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// One step toward Least Concern, clamped at the end of the scale.
    pub fn step_toward_least_concern(self) -> Self {
        match self.scale_index() {
            Some(index) => SCALE[(index + 1).min(SCALE.len() - 1)],
            None => self,
        }
    }

    /// One step toward Critically Endangered, clamped at the start of the scale.
    pub fn step_toward_critical(self) -> Self {
        match self.scale_index() {
            Some(index) => SCALE[index.saturating_sub(1)],
            None => self,
        }
    }
}

impl fmt::Display for RedListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized red list category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for RedListCategory {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CR" => Ok(Self::CriticallyEndangered),
            "EN" => Ok(Self::Endangered),
            "VU" => Ok(Self::Vulnerable),
            "NT" => Ok(Self::NearThreatened),
            "LC" => Ok(Self::LeastConcern),
            "DD" => Ok(Self::DataDeficient),
            _ => Err(UnknownCategory(value.to_string())),
        }
    }
}
