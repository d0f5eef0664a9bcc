use serde::{Deserialize, Serialize};

const KM_PER_MILE: f64 = 1.609_344;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Experienced,
    Competitive,
}

impl ExperienceLevel {
    pub fn is_beginner(&self) -> bool {
        matches!(self, ExperienceLevel::Beginner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    GeneralFitness,
    RaceTraining,
    GetFaster,
    InjuryComeback,
}

impl PrimaryGoal {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryGoal::GeneralFitness => "general fitness",
            PrimaryGoal::RaceTraining => "race training",
            PrimaryGoal::GetFaster => "getting faster",
            PrimaryGoal::InjuryComeback => "injury comeback",
        }
    }

    /// Goals whose rotation should include a performance shoe
    pub fn is_speed_goal(&self) -> bool {
        matches!(self, PrimaryGoal::RaceTraining | PrimaryGoal::GetFaster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningPattern {
    Infrequent,
    MostlyEasy,
    StructuredTraining,
    WorkoutFocused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Mi,
}

/// Weekly running volume as the runner reported it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolume {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl WeeklyVolume {
    pub fn km(&self) -> f64 {
        match self.unit {
            DistanceUnit::Km => self.value,
            DistanceUnit::Mi => self.value * KM_PER_MILE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailFrequency {
    Never,
    Occasionally,
    MostOrAll,
}

/// What the runner told us about themselves. Immutable per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerProfile {
    pub experience_level: ExperienceLevel,
    pub primary_goal: PrimaryGoal,
    pub running_pattern: RunningPattern,
    #[serde(default)]
    pub weekly_volume: Option<WeeklyVolume>,
    #[serde(default)]
    pub trail_running: Option<TrailFrequency>,
    #[serde(default)]
    pub body_weight_kg: Option<f64>,
}

impl RunnerProfile {
    pub fn new(
        experience_level: ExperienceLevel,
        primary_goal: PrimaryGoal,
        running_pattern: RunningPattern,
    ) -> Self {
        Self {
            experience_level,
            primary_goal,
            running_pattern,
            weekly_volume: None,
            trail_running: None,
            body_weight_kg: None,
        }
    }

    /// Weekly volume normalised to kilometres
    pub fn weekly_km(&self) -> Option<f64> {
        self.weekly_volume.map(|v| v.km())
    }

    pub fn runs_trails(&self) -> bool {
        matches!(
            self.trail_running,
            Some(TrailFrequency::Occasionally | TrailFrequency::MostOrAll)
        )
    }

    pub fn mostly_trails(&self) -> bool {
        matches!(self.trail_running, Some(TrailFrequency::MostOrAll))
    }

    /// Beginners and injury-comeback runners share the protective feel-gap ordering
    pub fn in_foundation_segment(&self) -> bool {
        self.experience_level.is_beginner()
            || self.primary_goal == PrimaryGoal::InjuryComeback
    }

    /// Checks numeric fields serde cannot reject on its own
    pub fn validate(&self) -> Result<(), String> {
        if let Some(volume) = self.weekly_volume {
            if !volume.value.is_finite() || volume.value < 0.0 {
                return Err("weeklyVolume.value must be a non-negative number".to_string());
            }
        }
        if let Some(weight) = self.body_weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err("bodyWeightKg must be a positive number".to_string());
            }
        }
        Ok(())
    }
}
