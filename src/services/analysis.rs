//! End-to-end rotation analysis: the pure pipeline plus the async prose step.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::db::Catalogue;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, DropBucket, Gap, Intent, RecommendedShoe,
    RelaxationStep, RotationAnalysis, RotationHealth, Shoe, TierClassification,
};

use super::candidate_scorer::{CandidateScorer, FeelTargets, ScoringRequest};
use super::gap_detector::{misused_run_type, GapDetector};
use super::health_scorer::HealthScorer;
use super::prose::{generate_with_fallback, ProseGenerator, ProseInput, ProseShoe};
use super::rotation_analyzer::{Rotation, RotationAnalyzer};
use super::selector::RecommendationSelector;
use super::shortlist::{build_shortlist, ShortlistFilter};
use super::tier_classifier::TierClassifier;

/// Everything the pipeline derives before prose is attached
#[derive(Debug, Clone, PartialEq)]
pub struct RotationReport {
    pub gap: Gap,
    pub tier: TierClassification,
    pub health: RotationHealth,
    pub analysis: RotationAnalysis,
    pub recommendations: Vec<RecommendedShoe>,
    pub relaxations: Vec<RelaxationStep>,
    pub prose_input: ProseInput,
}

/// Runs the deterministic pipeline for one request
///
/// Identical catalogue and request always produce an identical report.
pub fn analyze_rotation(
    catalogue: &Catalogue,
    request: &AnalyzeRequest,
) -> AppResult<RotationReport> {
    request.validate().map_err(AppError::InvalidInput)?;
    if catalogue.is_empty() {
        return Err(AppError::CatalogueUnavailable(
            "shoe catalogue is empty".to_string(),
        ));
    }

    let profile = &request.profile;
    let rotation = Rotation::resolve(&request.owned_shoes, catalogue);
    let analysis = RotationAnalyzer::new(&rotation, profile).analyze();
    let health = HealthScorer::new(&analysis, &rotation, profile).compute();
    let tier = TierClassifier::new(&health, &analysis, &rotation, profile).classify();
    let gap = GapDetector::new(&analysis, &rotation, profile).detect();

    let replaced = replaced_shoe(catalogue, request)?;

    let (archetypes, targets) = match replaced {
        Some(shoe) => {
            let mut archetypes = shoe.archetypes();
            // A record with no archetype flags is replaced by whatever the tier asks for
            if archetypes.is_empty() {
                archetypes.insert(tier.primary.archetype);
            }
            let lead = archetypes
                .first()
                .copied()
                .unwrap_or(tier.primary.archetype);
            let fallback = FeelTargets::for_profile(lead, profile);
            (archetypes, FeelTargets::from_shoe(shoe, fallback))
        }
        None => (
            BTreeSet::from([tier.primary.archetype]),
            FeelTargets::for_profile(tier.primary.archetype, profile),
        ),
    };
    let drop_target: Option<DropBucket> = request
        .feel_preferences
        .heel_drop
        .or_else(|| replaced.and_then(Shoe::drop_bucket));

    let mut excluded_ids: BTreeSet<&str> = request
        .owned_shoes
        .iter()
        .map(|s| s.shoe_id.as_str())
        .collect();
    if let Some(id) = request.replace_shoe_id.as_deref() {
        excluded_ids.insert(id);
    }

    let filter = ShortlistFilter {
        archetypes: &archetypes,
        constraints: &request.constraints,
        drop_target,
        excluded_ids,
    };
    let shortlist = build_shortlist(catalogue, &filter)?;

    // A replacement should feel like the shoe it replaces, not fill a gap
    let (feel_gap, contrast) = match request.intent {
        Intent::Add => (
            tier.primary.feel_gap.as_ref(),
            tier.primary.contrast_profile.as_ref(),
        ),
        Intent::Replace => (None, None),
    };

    let scorer = CandidateScorer::new(ScoringRequest {
        archetypes: archetypes.clone(),
        targets,
        drop_target,
        preferences: &request.feel_preferences,
        profile,
        rotation: &rotation,
        feel_gap,
        contrast,
    });
    let candidates = scorer.score_all(shortlist.shoes.iter().copied());
    let recommendations = RecommendationSelector::new(drop_target).select(candidates);

    tracing::info!(
        tier = u8::from(tier.tier),
        overall = health.overall,
        primary = %tier.primary.archetype,
        shortlisted = shortlist.shoes.len(),
        relaxations = shortlist.relaxations.len(),
        "Rotation analysed"
    );

    let prose_input = ProseInput {
        health,
        tier: tier.clone(),
        owned_shoes: prose_shoes(&rotation),
        profile: profile.clone(),
    };

    Ok(RotationReport {
        gap,
        tier,
        health,
        analysis,
        recommendations,
        relaxations: shortlist.relaxations,
        prose_input,
    })
}

fn replaced_shoe<'c>(
    catalogue: &'c Catalogue,
    request: &AnalyzeRequest,
) -> AppResult<Option<&'c Shoe>> {
    if request.intent != Intent::Replace {
        return Ok(None);
    }
    let Some(id) = request.replace_shoe_id.as_deref() else {
        return Ok(None);
    };
    let shoe = catalogue.get(id).ok_or_else(|| {
        AppError::InvalidInput(format!("replaceShoeId {} is not in the catalogue", id))
    })?;
    Ok(Some(shoe))
}

fn prose_shoes(rotation: &Rotation<'_>) -> Vec<ProseShoe> {
    rotation
        .shoes
        .iter()
        .map(|r| ProseShoe {
            name: r.shoe.display_name(),
            archetypes: r.shoe.archetypes(),
            misuse: misused_run_type(r.shoe, r.owned).is_some(),
        })
        .collect()
}

/// Attaches prose to a finished report
pub async fn assemble_response(
    report: RotationReport,
    prose: Option<&dyn ProseGenerator>,
    timeout: Duration,
) -> AnalyzeResponse {
    let (output, prose_source) =
        generate_with_fallback(prose, &report.prose_input, timeout).await;

    AnalyzeResponse {
        gap: report.gap,
        tier: report.tier,
        health: report.health,
        analysis: report.analysis,
        recommendations: report.recommendations,
        relaxations: report.relaxations,
        summary_reasoning: output.prose,
        strengths: output.strengths,
        improvements: output.improvements,
        prose_source,
    }
}
