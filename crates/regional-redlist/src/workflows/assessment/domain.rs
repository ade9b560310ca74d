use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::RedListCategory;
use super::summary::AssessmentSummary;

/// Identifier wrapper for assessment records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tri-state answer to a yes/no question that may not have been answered yet.
///
/// Deserializes from `true`/`false`/`null` as well as from the variant names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "AnswerRepr")]
pub enum Answer {
    Yes,
    No,
    #[default]
    Unanswered,
}

impl Answer {
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    pub const fn is_no(self) -> bool {
        matches!(self, Self::No)
    }

    pub const fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

impl From<Option<bool>> for Answer {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unanswered,
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::from(Some(value))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerRepr {
    Flag(Option<bool>),
    Named(NamedAnswer),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum NamedAnswer {
    Yes,
    No,
    Unanswered,
}

impl From<AnswerRepr> for Answer {
    fn from(value: AnswerRepr) -> Self {
        match value {
            AnswerRepr::Flag(flag) => Self::from(flag),
            AnswerRepr::Named(NamedAnswer::Yes) => Self::Yes,
            AnswerRepr::Named(NamedAnswer::No) => Self::No,
            AnswerRepr::Named(NamedAnswer::Unanswered) => Self::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationTrend {
    Increasing,
    Stable,
    Declining,
    #[default]
    Unknown,
}

/// Whether extra-regional populations could rescue the regional one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueEffect {
    Yes,
    No,
    Uncertain,
    #[default]
    Unanswered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentStatus {
    #[default]
    Draft,
    ReadyForReview,
    Completed,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ReadyForReview => "ready-for-review",
            Self::Completed => "completed",
        }
    }
}

/// Workflow stages. Serialized as the 1-based stage number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    Eligibility = 1,
    PreliminaryCategory = 2,
    RegionalAdjustment = 3,
    Output = 4,
}

impl Stage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Eligibility,
            Self::PreliminaryCategory,
            Self::RegionalAdjustment,
            Self::Output,
        ]
    }

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Eligibility => "Step 1: Eligibility",
            Self::PreliminaryCategory => "Step 2: Preliminary Category",
            Self::RegionalAdjustment => "Step 3: Regional Adjustment",
            Self::Output => "Output",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Eligibility => Some(Self::PreliminaryCategory),
            Self::PreliminaryCategory => Some(Self::RegionalAdjustment),
            Self::RegionalAdjustment => Some(Self::Output),
            Self::Output => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Eligibility => None,
            Self::PreliminaryCategory => Some(Self::Eligibility),
            Self::RegionalAdjustment => Some(Self::PreliminaryCategory),
            Self::Output => Some(Self::RegionalAdjustment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stage must be between 1 and 4, found {0}")]
pub struct InvalidStage(pub u8);

impl TryFrom<u8> for Stage {
    type Error = InvalidStage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Eligibility),
            2 => Ok(Self::PreliminaryCategory),
            3 => Ok(Self::RegionalAdjustment),
            4 => Ok(Self::Output),
            other => Err(InvalidStage(other)),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

/// Step 1 questions deciding whether the taxon can be assessed regionally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAnswers {
    #[serde(default)]
    pub is_native: Answer,
    #[serde(default)]
    pub has_breeding: Answer,
    #[serde(default)]
    pub has_visiting: Answer,
    #[serde(default)]
    pub is_vagrant: Answer,
}

/// Confirmed Step 1 result. `eligible` is always derived from `answers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step1Result {
    pub answers: EligibilityAnswers,
    pub eligible: bool,
    pub rationale: String,
}

/// Regional population and range metrics collected in Step 2.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalMetrics {
    #[serde(default)]
    pub population_size: Option<f64>,
    #[serde(default)]
    pub population_trend: PopulationTrend,
    #[serde(default)]
    pub decline_percent: Option<f64>,
    #[serde(default)]
    pub eoo: Option<f64>,
    #[serde(default)]
    pub aoo: Option<f64>,
    #[serde(default)]
    pub locations: Option<u32>,
    #[serde(default)]
    pub severely_fragmented: bool,
    #[serde(default)]
    pub threats: String,
}

impl RegionalMetrics {
    pub fn has_threats(&self) -> bool {
        !self.threats.trim().is_empty()
    }
}

/// Confirmed Step 2 result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step2Result {
    pub metrics: RegionalMetrics,
    pub preliminary_category: RedListCategory,
    pub criteria_met: String,
    pub confidence: u8,
}

/// Step 3 answers about extra-regional populations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueAnswers {
    #[serde(default)]
    pub rescue_effect: RescueEffect,
    #[serde(default)]
    pub immigration_likely: Answer,
    #[serde(default)]
    pub source_stable: Answer,
    #[serde(default)]
    pub is_sink: Answer,
}

impl RescueAnswers {
    /// Clears follow-up answers whose question is not reachable from the earlier answers.
    pub fn gated(self) -> Self {
        let immigration_reachable = self.rescue_effect == RescueEffect::Yes;
        let immigration_likely = if immigration_reachable {
            self.immigration_likely
        } else {
            Answer::Unanswered
        };
        let source_stable = if immigration_reachable {
            self.source_stable
        } else {
            Answer::Unanswered
        };
        let is_sink = if immigration_likely.is_yes() && source_stable.is_yes() {
            self.is_sink
        } else {
            Answer::Unanswered
        };

        Self {
            rescue_effect: self.rescue_effect,
            immigration_likely,
            source_stable,
            is_sink,
        }
    }
}

/// Confirmed Step 3 result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step3Result {
    pub answers: RescueAnswers,
    pub adjustment_rationale: String,
    pub final_category: RedListCategory,
    pub adjustment_steps: i8,
}

/// Unit of work persisted after every confirmed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    #[serde(default)]
    pub taxon_name: String,
    #[serde(default)]
    pub scientific_name: String,
    pub status: AssessmentStatus,
    pub current_stage: Stage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step1: Option<Step1Result>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step2: Option<Step2Result>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step3: Option<Step3Result>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AssessmentSummary>,
}

impl AssessmentRecord {
    pub fn new_draft(
        id: AssessmentId,
        taxon_name: impl Into<String>,
        scientific_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            taxon_name: taxon_name.into(),
            scientific_name: scientific_name.into(),
            status: AssessmentStatus::Draft,
            current_stage: Stage::Eligibility,
            created_at: now,
            updated_at: now,
            step1: None,
            step2: None,
            step3: None,
            summary: None,
        }
    }

    /// Furthest stage the confirmed results allow the record to sit on.
    pub fn reachable_stage(&self) -> Stage {
        let eligible = self.step1.as_ref().is_some_and(|step| step.eligible);
        match (eligible, &self.step2, &self.step3) {
            (true, Some(_), Some(_)) => Stage::Output,
            (true, Some(_), None) => Stage::RegionalAdjustment,
            (true, None, _) => Stage::PreliminaryCategory,
            (false, _, _) => Stage::Eligibility,
        }
    }

    /// Category as it currently stands: final if adjusted, otherwise preliminary.
    pub fn current_category(&self) -> Option<RedListCategory> {
        self.step3
            .as_ref()
            .map(|step| step.final_category)
            .or_else(|| self.step2.as_ref().map(|step| step.preliminary_category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serializes_as_number() {
        let json = serde_json::to_string(&Stage::RegionalAdjustment).expect("serialize");
        assert_eq!(json, "3");
        let stage: Stage = serde_json::from_str("4").expect("deserialize");
        assert_eq!(stage, Stage::Output);
        assert!(serde_json::from_str::<Stage>("5").is_err());
    }

    #[test]
    fn answers_accept_nullable_booleans() {
        assert_eq!(Answer::from(Some(true)), Answer::Yes);
        assert_eq!(Answer::from(Some(false)), Answer::No);
        assert_eq!(Answer::from(None), Answer::Unanswered);

        let parsed: Vec<Answer> =
            serde_json::from_str(r#"[true, false, null, "yes", "unanswered"]"#)
                .expect("deserialize");
        assert_eq!(
            parsed,
            vec![
                Answer::Yes,
                Answer::No,
                Answer::Unanswered,
                Answer::Yes,
                Answer::Unanswered
            ]
        );
    }

    #[test]
    fn rescue_gating_clears_unreachable_follow_ups() {
        let answers = RescueAnswers {
            rescue_effect: RescueEffect::Uncertain,
            immigration_likely: Answer::Yes,
            source_stable: Answer::Yes,
            is_sink: Answer::No,
        };
        assert_eq!(
            answers.gated(),
            RescueAnswers {
                rescue_effect: RescueEffect::Uncertain,
                ..RescueAnswers::default()
            }
        );

        let partial = RescueAnswers {
            rescue_effect: RescueEffect::Yes,
            immigration_likely: Answer::Yes,
            source_stable: Answer::No,
            is_sink: Answer::Yes,
        };
        let gated = partial.gated();
        assert_eq!(gated.source_stable, Answer::No);
        assert_eq!(gated.is_sink, Answer::Unanswered);
    }

    #[test]
    fn status_labels_are_kebab_case() {
        assert_eq!(AssessmentStatus::ReadyForReview.label(), "ready-for-review");
        let json = serde_json::to_string(&AssessmentStatus::ReadyForReview).expect("serialize");
        assert_eq!(json, "\"ready-for-review\"");
    }
}
