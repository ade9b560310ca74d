mod adjustment;
mod eligibility;
mod preliminary;

pub use adjustment::{adjust_category, AdjustmentInputs, AdjustmentOutcome, AdjustmentRule};
pub use eligibility::{
    evaluate_eligibility, is_eligible, EligibilityExclusion, EligibilityVerdict,
};
pub use preliminary::{
    confidence_score, evaluate_preliminary, Criterion, CriterionFinding, PreliminaryAssessment,
    INSUFFICIENT_DATA_LABEL, LEAST_CONCERN_LABEL,
};
