use crate::workflows::assessment::category::RedListCategory;
use crate::workflows::assessment::domain::{Answer, RescueAnswers, RescueEffect};
use crate::workflows::assessment::evaluation::{
    adjust_category, AdjustmentInputs, AdjustmentRule,
};

fn rescue(preliminary: RedListCategory) -> AdjustmentInputs {
    AdjustmentInputs {
        preliminary,
        immigration_likely: Answer::Yes,
        source_stable: Answer::Yes,
        is_sink: Answer::No,
    }
}

fn sink(preliminary: RedListCategory) -> AdjustmentInputs {
    AdjustmentInputs {
        preliminary,
        immigration_likely: Answer::Unanswered,
        source_stable: Answer::No,
        is_sink: Answer::Yes,
    }
}

#[test]
fn rescue_effect_downlists_one_step() {
    let outcome = adjust_category(&rescue(RedListCategory::CriticallyEndangered));
    assert_eq!(outcome.final_category, RedListCategory::Endangered);
    assert_eq!(outcome.adjustment_steps, 1);
    assert_eq!(outcome.rule, AdjustmentRule::RescueEffect);
}

#[test]
fn rescue_effect_on_least_concern_clamps_but_still_counts_a_step() {
    let outcome = adjust_category(&rescue(RedListCategory::LeastConcern));
    assert_eq!(outcome.final_category, RedListCategory::LeastConcern);
    assert_eq!(outcome.adjustment_steps, 1);
}

#[test]
fn sink_dependency_uplists_one_step() {
    let outcome = adjust_category(&sink(RedListCategory::LeastConcern));
    assert_eq!(outcome.final_category, RedListCategory::NearThreatened);
    assert_eq!(outcome.adjustment_steps, -1);
    assert_eq!(outcome.rule, AdjustmentRule::SinkDependency);
}

#[test]
fn sink_dependency_on_critical_clamps_but_still_counts_a_step() {
    let outcome = adjust_category(&sink(RedListCategory::CriticallyEndangered));
    assert_eq!(outcome.final_category, RedListCategory::CriticallyEndangered);
    assert_eq!(outcome.adjustment_steps, -1);
}

#[test]
fn data_deficient_passes_through_unchanged() {
    for inputs in [
        rescue(RedListCategory::DataDeficient),
        sink(RedListCategory::DataDeficient),
    ] {
        let outcome = adjust_category(&inputs);
        assert_eq!(outcome.final_category, RedListCategory::DataDeficient);
        assert_eq!(outcome.adjustment_steps, 0);
        assert_eq!(outcome.rule, AdjustmentRule::NoChange);
    }
}

#[test]
fn unanswered_follow_ups_fall_through_to_no_change() {
    let inputs = AdjustmentInputs {
        preliminary: RedListCategory::Vulnerable,
        immigration_likely: Answer::Yes,
        source_stable: Answer::Yes,
        is_sink: Answer::Unanswered,
    };
    let outcome = adjust_category(&inputs);
    assert_eq!(outcome.final_category, RedListCategory::Vulnerable);
    assert_eq!(outcome.adjustment_steps, 0);
}

#[test]
fn gating_discards_answers_to_unreachable_questions() {
    // Without a "yes" rescue effect, the follow-ups were never asked.
    let answers = RescueAnswers {
        rescue_effect: RescueEffect::No,
        immigration_likely: Answer::Yes,
        source_stable: Answer::Yes,
        is_sink: Answer::No,
    };
    let outcome = adjust_category(&AdjustmentInputs::gated(
        RedListCategory::Endangered,
        &answers,
    ));
    assert_eq!(outcome.final_category, RedListCategory::Endangered);
    assert_eq!(outcome.adjustment_steps, 0);
}

#[test]
fn sink_rule_cannot_be_reached_through_gated_answers() {
    // The sink question is only asked once the source is stable, so rule 2 never fires.
    let answers = RescueAnswers {
        rescue_effect: RescueEffect::Yes,
        immigration_likely: Answer::Yes,
        source_stable: Answer::No,
        is_sink: Answer::Yes,
    };
    let inputs = AdjustmentInputs::gated(RedListCategory::Vulnerable, &answers);
    assert_eq!(inputs.is_sink, Answer::Unanswered);
    assert_eq!(adjust_category(&inputs).rule, AdjustmentRule::NoChange);
}
