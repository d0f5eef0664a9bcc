use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod analysis;
mod profile;
mod recommendation;
mod rotation;
mod shoe;

pub use analysis::{
    Confidence, ContrastProfile, FeelGap, FeelGapDimension, Gap, GapDirection, GapSeverity,
    GapType, RedundancyGroup, RotationAnalysis, RotationHealth, Slot, Tier, TierClassification,
};
pub use profile::{
    DistanceUnit, ExperienceLevel, PrimaryGoal, RunnerProfile, RunningPattern, TrailFrequency,
    WeeklyVolume,
};
pub use recommendation::{
    AnalyzeRequest, AnalyzeResponse, ComparisonLabel, Constraints, FeelPreference,
    FeelPreferences, Intent, ProseSource, Relaxation, RelaxationStep, RecommendedShoe,
    ScoreComponent, ScoreTerm, ScoredCandidate, StabilityPreference,
};
pub use rotation::{FeelTag, OwnedShoe, RunType, Sentiment, LIGHT_SHOE_G};
pub use shoe::{PlateMaterial, PriceTier, Shoe};

// ============================================================================
// Archetypes
// ============================================================================

/// The role a shoe is built for. A shoe may satisfy more than one.
///
/// Declaration order doubles as the canonical ordering used whenever archetypes
/// are collected into sorted sets, which keeps every response deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    DailyTrainer,
    RecoveryShoe,
    WorkoutShoe,
    RaceShoe,
    TrailShoe,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::DailyTrainer,
        Archetype::RecoveryShoe,
        Archetype::WorkoutShoe,
        Archetype::RaceShoe,
        Archetype::TrailShoe,
    ];

    /// Wire identifier, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::DailyTrainer => "daily_trainer",
            Archetype::RecoveryShoe => "recovery_shoe",
            Archetype::WorkoutShoe => "workout_shoe",
            Archetype::RaceShoe => "race_shoe",
            Archetype::TrailShoe => "trail_shoe",
        }
    }

    /// Human-readable label used in reason strings
    pub fn label(&self) -> &'static str {
        match self {
            Archetype::DailyTrainer => "daily trainer",
            Archetype::RecoveryShoe => "recovery shoe",
            Archetype::WorkoutShoe => "workout shoe",
            Archetype::RaceShoe => "race shoe",
            Archetype::TrailShoe => "trail shoe",
        }
    }

    /// Archetypes a super trainer is allowed to stand in for
    pub fn super_trainer_eligible(&self) -> bool {
        matches!(
            self,
            Archetype::DailyTrainer | Archetype::WorkoutShoe | Archetype::RecoveryShoe
        )
    }
}

impl Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Feel dimensions
// ============================================================================

/// The 1-5 sensory ratings that take part in scoring and contrast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeelDimension {
    Cushion,
    Bounce,
    Stability,
    Rocker,
    GroundFeel,
}

impl FeelDimension {
    pub const ALL: [FeelDimension; 5] = [
        FeelDimension::Cushion,
        FeelDimension::Bounce,
        FeelDimension::Stability,
        FeelDimension::Rocker,
        FeelDimension::GroundFeel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeelDimension::Cushion => "cushion",
            FeelDimension::Bounce => "bounce",
            FeelDimension::Stability => "stability",
            FeelDimension::Rocker => "rocker",
            FeelDimension::GroundFeel => "ground feel",
        }
    }
}

// ============================================================================
// Heel drop buckets
// ============================================================================

/// Coarse heel-drop classes; scoring compares shoes by bucket distance, not mm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropBucket {
    /// 0-1 mm
    Zero,
    /// 2-5 mm
    Low,
    /// 6-9 mm
    Mid,
    /// 10 mm and above
    High,
}

impl DropBucket {
    pub fn from_mm(drop_mm: f64) -> Self {
        if drop_mm < 2.0 {
            DropBucket::Zero
        } else if drop_mm < 6.0 {
            DropBucket::Low
        } else if drop_mm < 10.0 {
            DropBucket::Mid
        } else {
            DropBucket::High
        }
    }

    fn index(&self) -> u8 {
        match self {
            DropBucket::Zero => 0,
            DropBucket::Low => 1,
            DropBucket::Mid => 2,
            DropBucket::High => 3,
        }
    }

    /// Number of buckets between two drops (0 = same bucket)
    pub fn distance(&self, other: DropBucket) -> u8 {
        self.index().abs_diff(other.index())
    }
}
