use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{
    Archetype, DropBucket, FeelDimension, Gap, OwnedShoe, RotationAnalysis, RotationHealth,
    RunnerProfile, Shoe, TierClassification,
};

// ============================================================================
// Request
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Grow the rotation
    Add,
    /// Swap out one owned shoe for something similar
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityPreference {
    Neutral,
    Stable,
    NoPreference,
}

/// Optional hard filters supplied by the runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub brand_only: Option<String>,
    #[serde(default)]
    pub stability_preference: Option<StabilityPreference>,
    /// Maximum retail price in USD
    #[serde(default)]
    pub max_price: Option<f64>,
}

/// How strictly a feel dimension is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FeelPreference {
    /// The runner picked a target rating
    UserSet { value: u8 },
    /// Target derived from the requested archetype and profile
    #[default]
    CindaDecides,
    /// Dimension is not scored at all
    Wildcard,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeelPreferences {
    #[serde(default)]
    pub cushion: FeelPreference,
    #[serde(default)]
    pub bounce: FeelPreference,
    #[serde(default)]
    pub stability: FeelPreference,
    #[serde(default)]
    pub rocker: FeelPreference,
    #[serde(default)]
    pub ground_feel: FeelPreference,
    #[serde(default)]
    pub heel_drop: Option<DropBucket>,
}

impl FeelPreferences {
    pub fn for_dimension(&self, dimension: FeelDimension) -> FeelPreference {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
        }
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub profile: RunnerProfile,
    pub owned_shoes: Vec<OwnedShoe>,
    pub intent: Intent,
    /// Owned shoe being replaced; required when `intent` is `replace`
    #[serde(default)]
    pub replace_shoe_id: Option<String>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub feel_preferences: FeelPreferences,
}

impl AnalyzeRequest {
    /// Semantic validation beyond what deserialization enforces
    pub fn validate(&self) -> Result<(), String> {
        self.profile.validate()?;

        if let Some(blank) = self.owned_shoes.iter().find(|s| s.shoe_id.trim().is_empty()) {
            return Err(format!(
                "ownedShoes entries require a shoeId (got {:?})",
                blank.shoe_id
            ));
        }

        match (self.intent, self.replace_shoe_id.as_deref()) {
            (Intent::Replace, None) => {
                return Err("intent \"replace\" requires replaceShoeId".to_string());
            }
            (Intent::Replace, Some(id)) if !self.owned_shoes.iter().any(|s| s.shoe_id == id) => {
                return Err(format!("replaceShoeId {} is not in ownedShoes", id));
            }
            _ => {}
        }

        if let Some(brand) = &self.constraints.brand_only {
            if brand.trim().is_empty() {
                return Err("constraints.brandOnly must not be empty".to_string());
            }
        }
        if let Some(max_price) = self.constraints.max_price {
            if !max_price.is_finite() || max_price <= 0.0 {
                return Err("constraints.maxPrice must be a positive number".to_string());
            }
        }

        for dimension in FeelDimension::ALL {
            if let FeelPreference::UserSet { value } = self.feel_preferences.for_dimension(dimension)
            {
                if !(1..=5).contains(&value) {
                    return Err(format!(
                        "feelPreferences.{} value must be between 1 and 5",
                        dimension.label()
                    ));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Labelled scoring dimension for a candidate's breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    ArchetypeMatch,
    Cushion,
    Bounce,
    Stability,
    Rocker,
    GroundFeel,
    HeelDrop,
    ExperienceFit,
    GoalFit,
    PatternFit,
    BodyWeightFit,
    TrailFit,
    Sentiment,
    FeelGap,
    Contrast,
}

impl From<FeelDimension> for ScoreComponent {
    fn from(dimension: FeelDimension) -> Self {
        match dimension {
            FeelDimension::Cushion => ScoreComponent::Cushion,
            FeelDimension::Bounce => ScoreComponent::Bounce,
            FeelDimension::Stability => ScoreComponent::Stability,
            FeelDimension::Rocker => ScoreComponent::Rocker,
            FeelDimension::GroundFeel => ScoreComponent::GroundFeel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTerm {
    pub component: ScoreComponent,
    pub points: i32,
}

/// A catalogue shoe with its score for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub shoe: &'a Shoe,
    pub score: i32,
    pub breakdown: Vec<ScoreTerm>,
}

impl ScoredCandidate<'_> {
    pub fn points(&self, component: ScoreComponent) -> i32 {
        self.breakdown
            .iter()
            .filter(|t| t.component == component)
            .map(|t| t.points)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonLabel {
    ClosestMatch,
    CloseMatch,
    TradeOff,
}

/// One of the three shoes returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedShoe {
    pub shoe_id: String,
    pub name: String,
    pub brand: String,
    pub archetypes: BTreeSet<Archetype>,
    pub score: i32,
    /// 1-based rank by score, independent of presentation order
    pub rank: usize,
    pub label: ComparisonLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heel_drop_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price_usd: Option<f64>,
    pub breakdown: Vec<ScoreTerm>,
}

// ============================================================================
// Constraint relaxation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relaxation {
    WidenHeelDrop,
    AdmitAdjacentPriceTier,
    IgnoreStabilityPreference,
    IgnoreMaxPrice,
}

/// A relaxation that fired, with its effect on the candidate pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaxationStep {
    pub relaxation: Relaxation,
    pub candidates_before: usize,
    pub candidates_after: usize,
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProseSource {
    Generated,
    Fallback,
}

/// Body of a successful `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub gap: Gap,
    pub tier: TierClassification,
    pub health: RotationHealth,
    pub analysis: RotationAnalysis,
    /// Presentation order: second best, best, third best
    pub recommendations: Vec<RecommendedShoe>,
    pub relaxations: Vec<RelaxationStep>,
    pub summary_reasoning: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub prose_source: ProseSource,
}
