use crate::infra::{assessment_service, open_store, ApiAssessmentService};
use clap::Args;
use regional_redlist::config::{AppConfig, StorageConfig};
use regional_redlist::error::AppError;
use regional_redlist::store::MemoryStore;
use regional_redlist::workflows::assessment::{
    Answer, AssessmentSummary, Blocker, EligibilityAnswers, EligibilityDraft, NewAssessment,
    PopulationTrend, RegionalMetrics, RescueAnswers, RescueDraft, RescueEffect, Stage,
    StageDraft, StagePreview, Transition,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the final summary as JSON after the walkthrough.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file with the taxon metadata and answers for every stage
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Persist the assessment to this JSON store (defaults to APP_DATA_FILE, else memory)
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// JSON store to read (defaults to APP_DATA_FILE)
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

/// Answers for a whole assessment, as read by `assess --input`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AssessmentAnswers {
    #[serde(default)]
    pub(crate) taxon_name: String,
    #[serde(default)]
    pub(crate) scientific_name: String,
    #[serde(default)]
    pub(crate) eligibility: EligibilityDraft,
    #[serde(default)]
    pub(crate) metrics: RegionalMetrics,
    #[serde(default)]
    pub(crate) rescue: RescueDraft,
}

#[derive(Debug)]
pub(crate) enum DriveOutcome {
    Completed(AssessmentSummary),
    Held { stage: Stage, blockers: Vec<Blocker> },
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = assessment_service(Arc::new(MemoryStore::default()));

    println!("Regional red-list assessment demo");
    let outcome = drive_assessment(&service, demo_answers(), true)?;
    match outcome {
        DriveOutcome::Completed(summary) => {
            render_summary(&summary);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
        DriveOutcome::Held { stage, blockers } => render_held(stage, &blockers),
    }

    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let answers: AssessmentAnswers = serde_json::from_str(&raw)?;

    let storage = resolve_storage(args.data_file)?;
    let service = assessment_service(open_store(&storage)?);

    match drive_assessment(&service, answers, false)? {
        DriveOutcome::Completed(summary) => render_summary(&summary),
        DriveOutcome::Held { stage, blockers } => render_held(stage, &blockers),
    }

    Ok(())
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let storage = resolve_storage(args.data_file)?;
    let service = assessment_service(open_store(&storage)?);
    let records = service.list()?;

    if records.is_empty() {
        println!("No stored assessments");
        return Ok(());
    }

    println!("Stored assessments");
    for record in &records {
        let view = record.status_view();
        println!(
            "- {} | {} | {} | stage {} | {}",
            view.assessment_id,
            if view.taxon_name.is_empty() {
                "(unnamed)"
            } else {
                view.taxon_name.as_str()
            },
            view.status,
            view.current_stage.number(),
            view.category.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

fn resolve_storage(data_file: Option<PathBuf>) -> Result<StorageConfig, AppError> {
    match data_file {
        Some(path) => Ok(StorageConfig {
            data_file: Some(path),
        }),
        None => Ok(AppConfig::load()?.storage),
    }
}

/// Confirms every stage in order, stopping at the first held transition.
pub(crate) fn drive_assessment(
    service: &ApiAssessmentService,
    answers: AssessmentAnswers,
    verbose: bool,
) -> Result<DriveOutcome, AppError> {
    let AssessmentAnswers {
        taxon_name,
        scientific_name,
        eligibility,
        metrics,
        rescue,
    } = answers;

    let record = service.create(NewAssessment {
        taxon_name,
        scientific_name,
    })?;
    let id = record.id;
    if verbose {
        println!("Created {} for {}", id, record.taxon_name);
    }

    let drafts = [
        StageDraft::Eligibility(eligibility),
        StageDraft::PreliminaryCategory(metrics),
        StageDraft::RegionalAdjustment(rescue),
    ];
    for draft in drafts {
        let stage = draft.stage();
        let preview = service.update_draft(&id, draft)?;
        if verbose {
            println!("\n{}", stage.label());
            render_preview(&preview);
        }

        if let Transition::Held { stage, blockers } = service.advance(&id)? {
            return Ok(DriveOutcome::Held { stage, blockers });
        }
    }

    Ok(DriveOutcome::Completed(service.complete(&id)?))
}

fn render_preview(preview: &StagePreview) {
    match preview {
        StagePreview::Eligibility(verdict) => {
            println!("  Eligible: {}", if verdict.eligible { "yes" } else { "no" });
            for exclusion in &verdict.exclusions {
                println!("  - {}", exclusion.summary());
            }
        }
        StagePreview::PreliminaryCategory(preview) => {
            println!(
                "  Preliminary category: {} ({})",
                preview.assessment.category.code(),
                preview.assessment.category.label()
            );
            println!("  Criteria met: {}", preview.assessment.criteria_met);
            for finding in &preview.assessment.findings {
                println!(
                    "  - {} -> {}: {}",
                    finding.criterion.letter(),
                    finding.category.code(),
                    finding.notes
                );
            }
            println!("  Confidence: {}%", preview.confidence);
        }
        StagePreview::RegionalAdjustment(preview) => {
            println!(
                "  {} -> {} ({:+} step)",
                preview.preliminary_category.code(),
                preview.outcome.final_category.code(),
                preview.outcome.adjustment_steps
            );
        }
        StagePreview::Output(preview) => {
            if let Some(summary) = &preview.summary {
                println!("  Final category: {}", summary.display_category());
            }
        }
    }
}

fn render_summary(summary: &AssessmentSummary) {
    println!("\nAssessment {} completed", summary.assessment_id);
    if !summary.taxon_name.is_empty() {
        println!(
            "  Taxon: {} ({})",
            summary.taxon_name, summary.scientific_name
        );
    }
    println!(
        "  Preliminary: {} | criteria {}",
        summary.preliminary_category.code(),
        summary.criteria_met
    );
    println!(
        "  Final: {} | adjustment {:+} | confidence {}%",
        summary.display_category(),
        summary.adjustment_steps,
        summary.confidence
    );
    if !summary.adjustment_rationale.is_empty() {
        println!("  Rationale: {}", summary.adjustment_rationale);
    }
}

fn render_held(stage: Stage, blockers: &[Blocker]) {
    println!("\nAssessment held at {}", stage.label());
    for blocker in blockers {
        println!("  - {}", blocker.summary());
    }
}

fn demo_answers() -> AssessmentAnswers {
    AssessmentAnswers {
        taxon_name: "Iberian lynx".to_string(),
        scientific_name: "Lynx pardinus".to_string(),
        eligibility: EligibilityDraft {
            answers: EligibilityAnswers {
                is_native: Answer::Yes,
                has_breeding: Answer::Yes,
                has_visiting: Answer::Unanswered,
                is_vagrant: Answer::No,
            },
            rationale: "Native resident with a breeding population in the region.".to_string(),
        },
        metrics: RegionalMetrics {
            population_size: Some(200.0),
            population_trend: PopulationTrend::Declining,
            decline_percent: Some(85.0),
            eoo: Some(50.0),
            aoo: None,
            locations: Some(1),
            severely_fragmented: true,
            threats: "Habitat loss, road mortality and collapse of rabbit prey populations."
                .to_string(),
        },
        rescue: RescueDraft {
            answers: RescueAnswers {
                rescue_effect: RescueEffect::Yes,
                immigration_likely: Answer::Yes,
                source_stable: Answer::Yes,
                is_sink: Answer::No,
            },
            rationale: "Dispersers from a stable neighbouring population are expected."
                .to_string(),
        },
    }
}
