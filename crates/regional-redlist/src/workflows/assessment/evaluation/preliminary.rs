use serde::{Deserialize, Serialize};

use super::super::category::RedListCategory;
use super::super::domain::RegionalMetrics;

pub const INSUFFICIENT_DATA_LABEL: &str = "Insufficient data";
pub const LEAST_CONCERN_LABEL: &str = "None (Least Concern)";

/// Simplified sub-criteria evaluated in Step 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PopulationDecline,
    GeographicRange,
    SmallPopulation,
}

impl Criterion {
    pub const fn letter(self) -> &'static str {
        match self {
            Self::PopulationDecline => "A",
            Self::GeographicRange => "B",
            Self::SmallPopulation => "C",
        }
    }
}

/// A sub-criterion that fired, kept so the label can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionFinding {
    pub criterion: Criterion,
    pub category: RedListCategory,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreliminaryAssessment {
    pub category: RedListCategory,
    pub criteria_met: String,
    pub findings: Vec<CriterionFinding>,
}

/// Numeric view of the metrics with unset values read as zero.
struct Signals {
    population: f64,
    decline: f64,
    eoo: f64,
    locations: f64,
    fragmented: bool,
}

impl Signals {
    fn from_metrics(metrics: &RegionalMetrics) -> Self {
        Self {
            population: metrics.population_size.unwrap_or(0.0),
            decline: metrics.decline_percent.unwrap_or(0.0),
            eoo: metrics.eoo.unwrap_or(0.0),
            locations: metrics.locations.map(f64::from).unwrap_or(0.0),
            fragmented: metrics.severely_fragmented,
        }
    }

    fn range_restricted(&self, max_eoo: f64, max_locations: f64) -> bool {
        self.eoo < max_eoo && (self.locations <= max_locations || self.fragmented)
    }
}

/// A tier may only assign its category when nothing more severe is already held.
fn admits(current: Option<RedListCategory>, tier: RedListCategory) -> bool {
    current.map_or(true, |held| !held.is_more_severe_than(tier))
}

/// Evaluates the decline, range, and population-size sub-criteria and keeps the most
/// severe result. Every sub-criterion that fires adds its letter to the label, even when
/// another sub-criterion decides the final category.
pub fn evaluate_preliminary(metrics: &RegionalMetrics) -> PreliminaryAssessment {
    if metrics.population_size.is_none()
        && metrics.decline_percent.is_none()
        && metrics.eoo.is_none()
        && metrics.aoo.is_none()
    {
        return PreliminaryAssessment {
            category: RedListCategory::DataDeficient,
            criteria_met: INSUFFICIENT_DATA_LABEL.to_string(),
            findings: Vec::new(),
        };
    }

    let signals = Signals::from_metrics(metrics);
    let mut current: Option<RedListCategory> = None;
    let mut findings = Vec::new();

    let decline_tier = if signals.decline >= 80.0 {
        Some(RedListCategory::CriticallyEndangered)
    } else if signals.decline >= 50.0 {
        Some(RedListCategory::Endangered)
    } else if signals.decline >= 30.0 {
        Some(RedListCategory::Vulnerable)
    } else {
        None
    };
    if let Some(category) = decline_tier {
        current = Some(category);
        findings.push(CriterionFinding {
            criterion: Criterion::PopulationDecline,
            category,
            notes: format!("regional decline of {}%", signals.decline),
        });
    }

    let range_tier = if signals.range_restricted(100.0, 1.0)
        && admits(current, RedListCategory::CriticallyEndangered)
    {
        Some(RedListCategory::CriticallyEndangered)
    } else if signals.range_restricted(5_000.0, 5.0)
        && admits(current, RedListCategory::Endangered)
    {
        Some(RedListCategory::Endangered)
    } else if signals.range_restricted(20_000.0, 10.0)
        && admits(current, RedListCategory::Vulnerable)
    {
        Some(RedListCategory::Vulnerable)
    } else {
        None
    };
    if let Some(category) = range_tier {
        current = Some(category);
        findings.push(CriterionFinding {
            criterion: Criterion::GeographicRange,
            category,
            notes: format!(
                "EOO {} km² across {} location(s){}",
                signals.eoo,
                signals.locations,
                if signals.fragmented {
                    ", severely fragmented"
                } else {
                    ""
                }
            ),
        });
    }

    let population_tier = if signals.population < 250.0
        && admits(current, RedListCategory::CriticallyEndangered)
    {
        Some(RedListCategory::CriticallyEndangered)
    } else if signals.population < 2_500.0
        && signals.decline >= 25.0
        && admits(current, RedListCategory::Endangered)
    {
        Some(RedListCategory::Endangered)
    } else if signals.population < 10_000.0
        && signals.decline >= 10.0
        && admits(current, RedListCategory::Vulnerable)
    {
        Some(RedListCategory::Vulnerable)
    } else {
        None
    };
    if let Some(category) = population_tier {
        current = Some(category);
        findings.push(CriterionFinding {
            criterion: Criterion::SmallPopulation,
            category,
            notes: format!(
                "{} mature individuals with {}% decline",
                signals.population, signals.decline
            ),
        });
    }

    match current {
        Some(category) => PreliminaryAssessment {
            category,
            criteria_met: findings
                .iter()
                .map(|finding| finding.criterion.letter())
                .collect::<Vec<_>>()
                .join(", "),
            findings,
        },
        None => PreliminaryAssessment {
            category: RedListCategory::LeastConcern,
            criteria_met: LEAST_CONCERN_LABEL.to_string(),
            findings,
        },
    }
}

/// Coverage heuristic: points for every metric that has been supplied, capped at 100.
pub fn confidence_score(metrics: &RegionalMetrics) -> u8 {
    let mut score: u32 = 0;
    if metrics.population_size.is_some() {
        score += 20;
    }
    if metrics.decline_percent.is_some() {
        score += 20;
    }
    if metrics.eoo.is_some() {
        score += 15;
    }
    if metrics.aoo.is_some() {
        score += 15;
    }
    if metrics.locations.is_some() {
        score += 10;
    }
    if metrics.threats.chars().count() > 50 {
        score += 20;
    }

    score.min(100) as u8
}
