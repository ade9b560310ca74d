use serde::{Deserialize, Serialize};

use super::super::domain::{Answer, EligibilityAnswers};

/// Reason a taxon is not (yet) eligible for a regional assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityExclusion {
    NativenessUnanswered,
    NotNative,
    VagrancyUnanswered,
    Vagrant,
    NoRegionalReproductionOrVisits,
}

impl EligibilityExclusion {
    pub const fn summary(self) -> &'static str {
        match self {
            Self::NativenessUnanswered => "nativeness has not been answered",
            Self::NotNative => "taxon is not native to the region",
            Self::VagrancyUnanswered => "vagrancy has not been answered",
            Self::Vagrant => "vagrant occurrences are excluded from assessment",
            Self::NoRegionalReproductionOrVisits => {
                "taxon neither breeds in nor regularly visits the region"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub exclusions: Vec<EligibilityExclusion>,
}

/// Native, not vagrant, and either breeding or regularly visiting.
/// Unanswered questions count as not satisfied.
pub fn is_eligible(answers: &EligibilityAnswers) -> bool {
    let native = matches!(answers.is_native, Answer::Yes);
    let resident = matches!(answers.is_vagrant, Answer::No);
    let present = matches!(
        (answers.has_breeding, answers.has_visiting),
        (Answer::Yes, _) | (_, Answer::Yes)
    );

    native && resident && present
}

pub fn evaluate_eligibility(answers: &EligibilityAnswers) -> EligibilityVerdict {
    let mut exclusions = Vec::new();

    match answers.is_native {
        Answer::Yes => {}
        Answer::No => exclusions.push(EligibilityExclusion::NotNative),
        Answer::Unanswered => exclusions.push(EligibilityExclusion::NativenessUnanswered),
    }

    match answers.is_vagrant {
        Answer::No => {}
        Answer::Yes => exclusions.push(EligibilityExclusion::Vagrant),
        Answer::Unanswered => exclusions.push(EligibilityExclusion::VagrancyUnanswered),
    }

    if !answers.has_breeding.is_yes() && !answers.has_visiting.is_yes() {
        exclusions.push(EligibilityExclusion::NoRegionalReproductionOrVisits);
    }

    EligibilityVerdict {
        eligible: is_eligible(answers),
        exclusions,
    }
}
