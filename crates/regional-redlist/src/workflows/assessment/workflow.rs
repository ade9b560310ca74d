use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::RedListCategory;
use super::domain::{
    AssessmentRecord, AssessmentStatus, EligibilityAnswers, RegionalMetrics, RescueAnswers,
    RescueEffect, Stage, Step1Result, Step2Result, Step3Result,
};
use super::evaluation::{
    adjust_category, confidence_score, evaluate_eligibility, evaluate_preliminary,
    AdjustmentInputs, AdjustmentOutcome, EligibilityVerdict, PreliminaryAssessment,
};
use super::summary::AssessmentSummary;

/// In-progress Step 1 inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityDraft {
    #[serde(default)]
    pub answers: EligibilityAnswers,
    #[serde(default)]
    pub rationale: String,
}

/// In-progress Step 3 inputs, kept as entered; gating is applied on evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueDraft {
    #[serde(default)]
    pub answers: RescueAnswers,
    #[serde(default)]
    pub rationale: String,
}

/// Draft inputs for every stage. Survive backward navigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDrafts {
    pub eligibility: EligibilityDraft,
    pub metrics: RegionalMetrics,
    pub rescue: RescueDraft,
}

impl WorkflowDrafts {
    fn from_record(record: &AssessmentRecord) -> Self {
        let eligibility = record
            .step1
            .as_ref()
            .map(|step| EligibilityDraft {
                answers: step.answers,
                rationale: step.rationale.clone(),
            })
            .unwrap_or_default();
        let metrics = record
            .step2
            .as_ref()
            .map(|step| step.metrics.clone())
            .unwrap_or_default();
        let rescue = record
            .step3
            .as_ref()
            .map(|step| RescueDraft {
                answers: step.answers,
                rationale: step.adjustment_rationale.clone(),
            })
            .unwrap_or_default();

        Self {
            eligibility,
            metrics,
            rescue,
        }
    }
}

/// Replacement draft for a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "draft", rename_all = "snake_case")]
pub enum StageDraft {
    Eligibility(EligibilityDraft),
    PreliminaryCategory(RegionalMetrics),
    RegionalAdjustment(RescueDraft),
}

impl StageDraft {
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Eligibility(_) => Stage::Eligibility,
            Self::PreliminaryCategory(_) => Stage::PreliminaryCategory,
            Self::RegionalAdjustment(_) => Stage::RegionalAdjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreliminaryPreview {
    pub assessment: PreliminaryAssessment,
    pub confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentPreview {
    pub preliminary_category: RedListCategory,
    pub answers: RescueAnswers,
    pub outcome: AdjustmentOutcome,
}

/// Output stage view. Until the terminal action runs, the summary is provisional and
/// stamped with the record's last update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPreview {
    pub finalized: bool,
    pub summary: Option<AssessmentSummary>,
}

/// Derived values for the open stage, computed from its draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "preview", rename_all = "snake_case")]
pub enum StagePreview {
    Eligibility(EligibilityVerdict),
    PreliminaryCategory(PreliminaryPreview),
    RegionalAdjustment(AdjustmentPreview),
    Output(OutputPreview),
}

/// Unmet guard on the open stage's forward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Blocker {
    NotEligible,
    MissingEligibilityRationale,
    MissingPopulationSize,
    MissingDeclinePercent,
    MissingThreats,
    MissingRescueEffect,
    MissingAdjustmentRationale,
    AwaitingCompletion,
    Finalized,
}

impl Blocker {
    pub const fn summary(self) -> &'static str {
        match self {
            Self::NotEligible => "taxon is not eligible for regional assessment",
            Self::MissingEligibilityRationale => "eligibility rationale is required",
            Self::MissingPopulationSize => "regional population size is required",
            Self::MissingDeclinePercent => "population decline percentage is required",
            Self::MissingThreats => "threats must be described",
            Self::MissingRescueEffect => "rescue effect must be answered",
            Self::MissingAdjustmentRationale => "adjustment rationale is required",
            Self::AwaitingCompletion => "assessment is ready for review and must be completed",
            Self::Finalized => "assessment has been completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Advanced { from: Stage, to: Stage },
    Held { stage: Stage, blockers: Vec<Blocker> },
}

impl Transition {
    pub fn advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("{requested:?} is not the open stage ({open:?})")]
    StageNotOpen { open: Stage, requested: Stage },
    #[error("assessment cannot be completed from {stage:?}")]
    NotReadyForCompletion { stage: Stage },
    #[error("assessment has been completed and can no longer change")]
    Finalized,
}

/// Everything a caller needs to render the open stage.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub assessment: AssessmentRecord,
    pub open_stage: Stage,
    pub drafts: WorkflowDrafts,
    pub preview: StagePreview,
    pub blockers: Vec<Blocker>,
}

/// Linear stage machine over one assessment record.
///
/// Forward transitions are guarded and merge the open stage's confirmed result into the
/// record; backward transitions only move the open stage. Earlier confirmed results are
/// never recomputed.
#[derive(Debug, Clone)]
pub struct AssessmentWorkflow {
    record: AssessmentRecord,
    open_stage: Stage,
    drafts: WorkflowDrafts,
}

impl AssessmentWorkflow {
    pub fn resume(record: AssessmentRecord) -> Self {
        let open_stage = record.current_stage.min(record.reachable_stage());
        let drafts = WorkflowDrafts::from_record(&record);

        Self {
            record,
            open_stage,
            drafts,
        }
    }

    pub fn record(&self) -> &AssessmentRecord {
        &self.record
    }

    pub fn into_record(self) -> AssessmentRecord {
        self.record
    }

    pub fn open_stage(&self) -> Stage {
        self.open_stage
    }

    pub fn drafts(&self) -> &WorkflowDrafts {
        &self.drafts
    }

    pub fn is_finalized(&self) -> bool {
        self.record.status == AssessmentStatus::Completed
    }

    pub fn update_draft(&mut self, draft: StageDraft) -> Result<StagePreview, WorkflowError> {
        if self.is_finalized() {
            return Err(WorkflowError::Finalized);
        }
        if draft.stage() != self.open_stage {
            return Err(WorkflowError::StageNotOpen {
                open: self.open_stage,
                requested: draft.stage(),
            });
        }

        match draft {
            StageDraft::Eligibility(eligibility) => self.drafts.eligibility = eligibility,
            StageDraft::PreliminaryCategory(metrics) => self.drafts.metrics = metrics,
            StageDraft::RegionalAdjustment(rescue) => self.drafts.rescue = rescue,
        }

        Ok(self.preview())
    }

    pub fn preview(&self) -> StagePreview {
        match self.open_stage {
            Stage::Eligibility => {
                StagePreview::Eligibility(evaluate_eligibility(&self.drafts.eligibility.answers))
            }
            Stage::PreliminaryCategory => StagePreview::PreliminaryCategory(PreliminaryPreview {
                assessment: evaluate_preliminary(&self.drafts.metrics),
                confidence: confidence_score(&self.drafts.metrics),
            }),
            Stage::RegionalAdjustment => {
                let preliminary_category = self.preliminary_category();
                let answers = self.drafts.rescue.answers.gated();
                StagePreview::RegionalAdjustment(AdjustmentPreview {
                    preliminary_category,
                    answers,
                    outcome: adjust_category(&AdjustmentInputs::gated(
                        preliminary_category,
                        &answers,
                    )),
                })
            }
            Stage::Output => StagePreview::Output(OutputPreview {
                finalized: self.is_finalized(),
                summary: self.record.summary.clone().or_else(|| {
                    AssessmentSummary::from_record(&self.record, self.record.updated_at)
                }),
            }),
        }
    }

    pub fn blockers(&self) -> Vec<Blocker> {
        if self.is_finalized() {
            return vec![Blocker::Finalized];
        }

        let mut blockers = Vec::new();
        match self.open_stage {
            Stage::Eligibility => {
                let draft = &self.drafts.eligibility;
                if !evaluate_eligibility(&draft.answers).eligible {
                    blockers.push(Blocker::NotEligible);
                }
                if draft.rationale.trim().is_empty() {
                    blockers.push(Blocker::MissingEligibilityRationale);
                }
            }
            Stage::PreliminaryCategory => {
                let metrics = &self.drafts.metrics;
                if metrics.population_size.is_none() {
                    blockers.push(Blocker::MissingPopulationSize);
                }
                if metrics.decline_percent.is_none() {
                    blockers.push(Blocker::MissingDeclinePercent);
                }
                if !metrics.has_threats() {
                    blockers.push(Blocker::MissingThreats);
                }
            }
            Stage::RegionalAdjustment => {
                let draft = &self.drafts.rescue;
                if draft.answers.rescue_effect == RescueEffect::Unanswered {
                    blockers.push(Blocker::MissingRescueEffect);
                }
                if draft.rationale.trim().is_empty() {
                    blockers.push(Blocker::MissingAdjustmentRationale);
                }
            }
            Stage::Output => blockers.push(Blocker::AwaitingCompletion),
        }

        blockers
    }

    pub fn can_advance(&self) -> bool {
        self.blockers().is_empty()
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> Transition {
        let from = self.open_stage;
        let blockers = self.blockers();
        if !blockers.is_empty() {
            return Transition::Held {
                stage: from,
                blockers,
            };
        }

        let to = match from {
            Stage::Eligibility => {
                let draft = &self.drafts.eligibility;
                self.record.step1 = Some(Step1Result {
                    answers: draft.answers,
                    eligible: evaluate_eligibility(&draft.answers).eligible,
                    rationale: draft.rationale.trim().to_string(),
                });
                Stage::PreliminaryCategory
            }
            Stage::PreliminaryCategory => {
                let metrics = self.drafts.metrics.clone();
                let assessment = evaluate_preliminary(&metrics);
                let confidence = confidence_score(&metrics);
                self.record.step2 = Some(Step2Result {
                    metrics,
                    preliminary_category: assessment.category,
                    criteria_met: assessment.criteria_met,
                    confidence,
                });
                // A confirmed adjustment must follow the new preliminary category.
                if let Some(step3) = self.record.step3.as_mut() {
                    let outcome = adjust_category(&AdjustmentInputs::gated(
                        assessment.category,
                        &step3.answers,
                    ));
                    step3.final_category = outcome.final_category;
                    step3.adjustment_steps = outcome.adjustment_steps;
                }
                Stage::RegionalAdjustment
            }
            Stage::RegionalAdjustment => {
                let preliminary = self.preliminary_category();
                let answers = self.drafts.rescue.answers.gated();
                let outcome = adjust_category(&AdjustmentInputs::gated(preliminary, &answers));
                self.record.step3 = Some(Step3Result {
                    answers,
                    adjustment_rationale: self.drafts.rescue.rationale.trim().to_string(),
                    final_category: outcome.final_category,
                    adjustment_steps: outcome.adjustment_steps,
                });
                Stage::Output
            }
            Stage::Output => {
                return Transition::Held {
                    stage: from,
                    blockers: vec![Blocker::AwaitingCompletion],
                }
            }
        };

        self.record.current_stage = to;
        self.record.status = if to == Stage::Output {
            AssessmentStatus::ReadyForReview
        } else {
            AssessmentStatus::Draft
        };
        self.record.updated_at = now;
        self.open_stage = to;

        Transition::Advanced { from, to }
    }

    /// Moves the open stage back one step. Drafts and the record are left untouched.
    pub fn back(&mut self) -> Stage {
        if let Some(previous) = self.open_stage.previous() {
            self.open_stage = previous;
        }
        self.open_stage
    }

    /// Freezes the final category and rationale into the record's summary.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<AssessmentSummary, WorkflowError> {
        if self.is_finalized() {
            return Err(WorkflowError::Finalized);
        }
        if self.open_stage != Stage::Output || self.record.current_stage != Stage::Output {
            return Err(WorkflowError::NotReadyForCompletion {
                stage: self.open_stage,
            });
        }

        let summary = AssessmentSummary::from_record(&self.record, now).ok_or(
            WorkflowError::NotReadyForCompletion {
                stage: self.open_stage,
            },
        )?;

        self.record.summary = Some(summary.clone());
        self.record.status = AssessmentStatus::Completed;
        self.record.updated_at = now;

        Ok(summary)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            assessment: self.record.clone(),
            open_stage: self.open_stage,
            drafts: self.drafts.clone(),
            preview: self.preview(),
            blockers: self.blockers(),
        }
    }

    fn preliminary_category(&self) -> RedListCategory {
        self.record
            .step2
            .as_ref()
            .map(|step| step.preliminary_category)
            .unwrap_or(RedListCategory::DataDeficient)
    }
}
