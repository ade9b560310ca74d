//! Regional red-list assessment: eligibility gate, preliminary category rules,
//! extra-regional adjustment, and the stage machine that sequences them.

pub mod category;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod service;
pub mod summary;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use category::{RedListCategory, UnknownCategory, SCALE};
pub use domain::{
    Answer, AssessmentId, AssessmentRecord, AssessmentStatus, EligibilityAnswers, InvalidStage,
    PopulationTrend, RegionalMetrics, RescueAnswers, RescueEffect, Stage, Step1Result,
    Step2Result, Step3Result,
};
pub use evaluation::{
    adjust_category, confidence_score, evaluate_eligibility, evaluate_preliminary, is_eligible,
    AdjustmentInputs, AdjustmentOutcome, AdjustmentRule, Criterion, CriterionFinding,
    EligibilityExclusion, EligibilityVerdict, PreliminaryAssessment,
};
pub use repository::{
    AssessmentEvent, AssessmentEventKind, AssessmentRepository, EventError, EventPublisher,
    RepositoryError,
};
pub use router::assessment_router;
pub use service::{AssessmentService, AssessmentServiceError, NewAssessment};
pub use summary::{AssessmentStatusView, AssessmentSummary, ADJUSTMENT_MARKER};
pub use workflow::{
    AssessmentWorkflow, Blocker, EligibilityDraft, RescueDraft, StageDraft, StagePreview,
    Transition, WorkflowDrafts, WorkflowError, WorkflowSnapshot,
};
