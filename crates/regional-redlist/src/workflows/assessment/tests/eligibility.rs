use crate::workflows::assessment::domain::{Answer, EligibilityAnswers};
use crate::workflows::assessment::evaluation::{
    evaluate_eligibility, is_eligible, EligibilityExclusion,
};

const ANSWERS: [Answer; 3] = [Answer::Yes, Answer::No, Answer::Unanswered];

#[test]
fn eligibility_matches_truth_table_for_every_combination() {
    for is_native in ANSWERS {
        for has_breeding in ANSWERS {
            for has_visiting in ANSWERS {
                for is_vagrant in ANSWERS {
                    let answers = EligibilityAnswers {
                        is_native,
                        has_breeding,
                        has_visiting,
                        is_vagrant,
                    };
                    let expected = is_native == Answer::Yes
                        && is_vagrant == Answer::No
                        && (has_breeding == Answer::Yes || has_visiting == Answer::Yes);

                    assert_eq!(is_eligible(&answers), expected, "{answers:?}");
                    let verdict = evaluate_eligibility(&answers);
                    assert_eq!(verdict.eligible, expected, "{answers:?}");
                    assert_eq!(verdict.exclusions.is_empty(), expected, "{answers:?}");
                }
            }
        }
    }
}

#[test]
fn visiting_alone_is_enough_presence() {
    let answers = EligibilityAnswers {
        is_native: Answer::Yes,
        has_breeding: Answer::No,
        has_visiting: Answer::Yes,
        is_vagrant: Answer::No,
    };
    assert!(is_eligible(&answers));
}

#[test]
fn unanswered_questions_are_reported_separately_from_negative_answers() {
    let verdict = evaluate_eligibility(&EligibilityAnswers::default());
    assert!(!verdict.eligible);
    assert_eq!(
        verdict.exclusions,
        vec![
            EligibilityExclusion::NativenessUnanswered,
            EligibilityExclusion::VagrancyUnanswered,
            EligibilityExclusion::NoRegionalReproductionOrVisits,
        ]
    );

    let vagrant = evaluate_eligibility(&EligibilityAnswers {
        is_native: Answer::No,
        has_breeding: Answer::Yes,
        has_visiting: Answer::No,
        is_vagrant: Answer::Yes,
    });
    assert_eq!(
        vagrant.exclusions,
        vec![EligibilityExclusion::NotNative, EligibilityExclusion::Vagrant]
    );
}

#[test]
fn null_answers_deserialize_as_unanswered() {
    let answers: EligibilityAnswers = serde_json::from_str(
        r#"{ "is_native": true, "has_breeding": null, "has_visiting": true, "is_vagrant": null }"#,
    )
    .expect("answers parse");

    assert_eq!(answers.has_breeding, Answer::Unanswered);
    assert_eq!(answers.is_vagrant, Answer::Unanswered);
    assert!(!is_eligible(&answers));
}
