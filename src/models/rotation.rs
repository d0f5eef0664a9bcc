use serde::{Deserialize, Serialize};

use super::{Archetype, Shoe};

/// What the runner uses a shoe for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    AllRuns,
    Easy,
    LongRuns,
    Recovery,
    Workouts,
    Races,
    Trail,
}

impl RunType {
    /// Archetypes capable of serving this kind of run
    pub fn archetypes(&self) -> &'static [Archetype] {
        match self {
            RunType::AllRuns => &[Archetype::DailyTrainer],
            RunType::Easy | RunType::LongRuns => {
                &[Archetype::DailyTrainer, Archetype::RecoveryShoe]
            }
            RunType::Recovery => &[Archetype::RecoveryShoe],
            RunType::Workouts => &[Archetype::WorkoutShoe, Archetype::RaceShoe],
            RunType::Races => &[Archetype::RaceShoe],
            RunType::Trail => &[Archetype::TrailShoe],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Love,
    Like,
    #[default]
    Neutral,
    Dislike,
}

/// One shoe in the runner's rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedShoe {
    pub shoe_id: String,
    #[serde(default)]
    pub run_types: Vec<RunType>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub love_tags: Vec<String>,
    #[serde(default)]
    pub dislike_tags: Vec<String>,
}

impl OwnedShoe {
    pub fn new(shoe_id: impl Into<String>, run_types: Vec<RunType>) -> Self {
        Self {
            shoe_id: shoe_id.into(),
            run_types,
            sentiment: Sentiment::Neutral,
            love_tags: Vec::new(),
            dislike_tags: Vec::new(),
        }
    }

    pub fn used_for(&self, run_type: RunType) -> bool {
        self.run_types.contains(&run_type)
    }

    pub fn shares_run_type(&self, other: &OwnedShoe) -> bool {
        self.run_types.iter().any(|rt| other.used_for(*rt))
    }

    /// Love tags that map onto the feel vocabulary
    pub fn loved_feel(&self) -> Vec<FeelTag> {
        self.love_tags.iter().filter_map(|t| FeelTag::parse(t)).collect()
    }

    /// Dislike tags that map onto the feel vocabulary
    pub fn disliked_feel(&self) -> Vec<FeelTag> {
        self.dislike_tags
            .iter()
            .filter_map(|t| FeelTag::parse(t))
            .collect()
    }
}

/// Fixed feel vocabulary that free-text love/dislike tags are normalised into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeelTag {
    Soft,
    Firm,
    Bouncy,
    Flat,
    Stable,
    Unstable,
    Light,
    Heavy,
    Rockered,
    GroundFeel,
}

/// Shoes under this weight feel light
pub const LIGHT_SHOE_G: f64 = 240.0;
/// Shoes over this weight feel heavy
pub const HEAVY_SHOE_G: f64 = 290.0;

impl FeelTag {
    /// Normalises a free-text tag; unknown tags yield `None`
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_lowercase().replace([' ', '-'], "_");
        let parsed = match normalized.as_str() {
            "soft" | "plush" | "cushioned" | "too_soft" | "mushy" => FeelTag::Soft,
            "firm" | "harsh" | "hard" | "too_firm" => FeelTag::Firm,
            "bouncy" | "responsive" | "springy" | "too_bouncy" => FeelTag::Bouncy,
            "flat" | "dead" | "unresponsive" => FeelTag::Flat,
            "stable" | "supportive" => FeelTag::Stable,
            "unstable" | "wobbly" | "too_unstable" => FeelTag::Unstable,
            "light" | "lightweight" => FeelTag::Light,
            "heavy" | "clunky" | "too_heavy" => FeelTag::Heavy,
            "rockered" | "rolling" | "smooth_transition" | "too_rockered" => FeelTag::Rockered,
            "ground_feel" | "connected" | "low_to_ground" => FeelTag::GroundFeel,
            _ => return None,
        };
        Some(parsed)
    }

    /// Whether a catalogue shoe exhibits this feel. Unknown ratings never match.
    pub fn matches(&self, shoe: &Shoe) -> bool {
        match self {
            FeelTag::Soft => shoe.cushion_softness.is_some_and(|v| v >= 4),
            FeelTag::Firm => shoe.cushion_softness.is_some_and(|v| v <= 2),
            FeelTag::Bouncy => shoe.bounce.is_some_and(|v| v >= 4),
            FeelTag::Flat => shoe.bounce.is_some_and(|v| v <= 2),
            FeelTag::Stable => shoe.stability.is_some_and(|v| v >= 4),
            FeelTag::Unstable => shoe.stability.is_some_and(|v| v <= 2),
            FeelTag::Light => match shoe.weight_g {
                Some(grams) => grams < LIGHT_SHOE_G,
                None => shoe.weight_feel.is_some_and(|v| v >= 4),
            },
            FeelTag::Heavy => match shoe.weight_g {
                Some(grams) => grams > HEAVY_SHOE_G,
                None => shoe.weight_feel.is_some_and(|v| v <= 2),
            },
            FeelTag::Rockered => shoe.rocker.is_some_and(|v| v >= 4),
            FeelTag::GroundFeel => shoe.ground_feel.is_some_and(|v| v >= 4),
        }
    }
}
