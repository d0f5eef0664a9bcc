use serde::Serialize;
use std::collections::BTreeSet;

use super::{Archetype, FeelDimension, RunType};

// ============================================================================
// Rotation analysis
// ============================================================================

/// Derived view of a rotation against the runner's profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationAnalysis {
    pub covered_run_types: BTreeSet<RunType>,
    pub covered_archetypes: BTreeSet<Archetype>,
    pub expected_archetypes: BTreeSet<Archetype>,
    /// Expected minus covered
    pub missing_archetypes: BTreeSet<Archetype>,
    pub redundancy_groups: Vec<RedundancyGroup>,
    /// Owned shoes that resolved to a catalogue record
    pub shoe_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_shoe_ids: Vec<String>,
}

/// Owned shoes with near-identical feel serving the same run types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyGroup {
    pub shoe_ids: Vec<String>,
    pub shared_run_types: BTreeSet<RunType>,
}

// ============================================================================
// Health
// ============================================================================

/// Four 0-100 health dimensions plus the weighted overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationHealth {
    pub coverage: u8,
    pub variety: u8,
    pub load_resilience: u8,
    pub goal_alignment: u8,
    pub overall: u8,
}

// ============================================================================
// Tier classification
// ============================================================================

/// Severity of the runner's unmet need. Serialized as 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Tier {
    GenuineGap,
    Improvement,
    Exploration,
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::GenuineGap => 1,
            Tier::Improvement => 2,
            Tier::Exploration => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Soft,
}

/// One recommendation target: an archetype and why
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub archetype: Archetype,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feel_gap: Option<FeelGap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_profile: Option<ContrastProfile>,
}

impl Slot {
    pub fn new(archetype: Archetype, reason: impl Into<String>) -> Self {
        Self {
            archetype,
            reason: reason.into(),
            feel_gap: None,
            contrast_profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierClassification {
    pub tier: Tier,
    pub confidence: Confidence,
    pub primary: Slot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Slot>,
    pub tier_reason: String,
}

// ============================================================================
// Feel gaps and contrast
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeelGapDimension {
    Cushion,
    Bounce,
    Rocker,
    Stability,
    Drop,
    DailyCount,
}

impl FeelGapDimension {
    /// Rating dimension the gap overrides during scoring, if any
    pub fn feel_dimension(&self) -> Option<FeelDimension> {
        match self {
            FeelGapDimension::Cushion => Some(FeelDimension::Cushion),
            FeelGapDimension::Bounce => Some(FeelDimension::Bounce),
            FeelGapDimension::Rocker => Some(FeelDimension::Rocker),
            FeelGapDimension::Stability => Some(FeelDimension::Stability),
            FeelGapDimension::Drop | FeelGapDimension::DailyCount => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapDirection {
    FavorLow,
    FavorHigh,
    FavorVariety,
}

/// An underexplored sensory dimension in the rotation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeelGap {
    pub dimension: FeelGapDimension,
    /// 1 = most important
    pub priority: u8,
    pub direction: GapDirection,
    pub recommended_archetype: Archetype,
    pub reason: String,
}

/// The rotation's average feel. Scoring input only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastProfile {
    pub cushion: Option<f64>,
    pub stability: Option<f64>,
    pub bounce: Option<f64>,
    pub rocker: Option<f64>,
    pub ground_feel: Option<f64>,
    pub heel_drop_mm: Option<f64>,
}

impl ContrastProfile {
    pub fn average(&self, dimension: FeelDimension) -> Option<f64> {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
        }
    }
}

// ============================================================================
// Legacy single-gap assessment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Coverage,
    Misuse,
    Performance,
    Recovery,
    Redundancy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub severity: GapSeverity,
    pub reasoning: String,
    pub recommended_archetype: Archetype,
}
