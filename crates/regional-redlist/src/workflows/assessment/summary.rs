use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::RedListCategory;
use super::domain::{AssessmentId, AssessmentRecord, Stage};

/// Marker appended to a category when a regional adjustment was attempted.
pub const ADJUSTMENT_MARKER: char = '°';

/// Flat export object frozen into the record by the terminal action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub assessment_id: AssessmentId,
    pub taxon_name: String,
    pub scientific_name: String,
    pub final_category: RedListCategory,
    pub criteria_met: String,
    pub preliminary_category: RedListCategory,
    pub adjustment_steps: i8,
    pub adjusted: bool,
    pub adjustment_rationale: String,
    pub confidence: u8,
    pub completed_at: DateTime<Utc>,
}

impl AssessmentSummary {
    /// Flattens the confirmed Step 2 and Step 3 results. `None` until both exist.
    pub fn from_record(record: &AssessmentRecord, completed_at: DateTime<Utc>) -> Option<Self> {
        let step2 = record.step2.as_ref()?;
        let step3 = record.step3.as_ref()?;

        Some(Self {
            assessment_id: record.id.clone(),
            taxon_name: record.taxon_name.clone(),
            scientific_name: record.scientific_name.clone(),
            final_category: step3.final_category,
            criteria_met: step2.criteria_met.clone(),
            preliminary_category: step2.preliminary_category,
            adjustment_steps: step3.adjustment_steps,
            adjusted: step3.adjustment_steps != 0,
            adjustment_rationale: step3.adjustment_rationale.clone(),
            confidence: step2.confidence,
            completed_at,
        })
    }

    /// Category code, with the adjustment marker when the step counter is non-zero.
    pub fn display_category(&self) -> String {
        if self.adjusted {
            format!("{}{}", self.final_category.code(), ADJUSTMENT_MARKER)
        } else {
            self.final_category.code().to_string()
        }
    }
}

/// Compact list entry for an assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentStatusView {
    pub assessment_id: AssessmentId,
    pub taxon_name: String,
    pub status: &'static str,
    pub current_stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn status_view(&self) -> AssessmentStatusView {
        let category = match &self.summary {
            Some(summary) => Some(summary.display_category()),
            None => self
                .current_category()
                .map(|category| category.code().to_string()),
        };

        AssessmentStatusView {
            assessment_id: self.id.clone(),
            taxon_name: self.taxon_name.clone(),
            status: self.status.label(),
            current_stage: self.current_stage,
            category,
            updated_at: self.updated_at,
        }
    }
}
