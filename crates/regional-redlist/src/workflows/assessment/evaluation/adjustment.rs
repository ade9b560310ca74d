use serde::{Deserialize, Serialize};

use super::super::category::RedListCategory;
use super::super::domain::{Answer, RescueAnswers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentInputs {
    pub preliminary: RedListCategory,
    pub immigration_likely: Answer,
    pub source_stable: Answer,
    pub is_sink: Answer,
}

impl AdjustmentInputs {
    /// Builds inputs from Step 3 answers, dropping follow-ups that were not reachable.
    pub fn gated(preliminary: RedListCategory, answers: &RescueAnswers) -> Self {
        let answers = answers.gated();
        Self {
            preliminary,
            immigration_likely: answers.immigration_likely,
            source_stable: answers.source_stable,
            is_sink: answers.is_sink,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    RescueEffect,
    SinkDependency,
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub final_category: RedListCategory,
    /// Positive when downlisted, negative when uplisted. Reports the attempted step even
    /// when the scale end clamps the category.
    pub adjustment_steps: i8,
    pub rule: AdjustmentRule,
}

pub fn adjust_category(inputs: &AdjustmentInputs) -> AdjustmentOutcome {
    let unchanged = AdjustmentOutcome {
        final_category: inputs.preliminary,
        adjustment_steps: 0,
        rule: AdjustmentRule::NoChange,
    };

    if inputs.preliminary.scale_index().is_none() {
        return unchanged;
    }

    match (inputs.immigration_likely, inputs.source_stable, inputs.is_sink) {
        (Answer::Yes, Answer::Yes, Answer::No) => AdjustmentOutcome {
            final_category: inputs.preliminary.step_toward_least_concern(),
            adjustment_steps: 1,
            rule: AdjustmentRule::RescueEffect,
        },
        (_, Answer::No, Answer::Yes) => AdjustmentOutcome {
            final_category: inputs.preliminary.step_toward_critical(),
            adjustment_steps: -1,
            rule: AdjustmentRule::SinkDependency,
        },
        _ => unchanged,
    }
}
