use std::collections::BTreeSet;

use crate::models::{
    Archetype, FeelDimension, PrimaryGoal, RotationAnalysis, RotationHealth, RunnerProfile,
};

use super::rotation_analyzer::Rotation;

/// Weights for the overall health score
const W_COVERAGE: f64 = 0.40;
const W_GOAL_ALIGNMENT: f64 = 0.30;
const W_LOAD_RESILIENCE: f64 = 0.20;
const W_VARIETY: f64 = 0.10;

/// Resilience lost per shoe short of the ideal count
const LOAD_PENALTY_PER_SHOE: u32 = 33;

/// Rating range (points) that counts as full spread on a dimension
const RATING_SPREAD_CAP: f64 = 3.0;
/// Heel-drop range (mm) that counts as full spread
const DROP_SPREAD_CAP_MM: f64 = 6.0;

/// Converts a rotation analysis into the four health dimensions
pub struct HealthScorer<'a> {
    analysis: &'a RotationAnalysis,
    rotation: &'a Rotation<'a>,
    profile: &'a RunnerProfile,
}

impl<'a> HealthScorer<'a> {
    pub fn new(
        analysis: &'a RotationAnalysis,
        rotation: &'a Rotation<'a>,
        profile: &'a RunnerProfile,
    ) -> Self {
        Self {
            analysis,
            rotation,
            profile,
        }
    }

    pub fn compute(&self) -> RotationHealth {
        let coverage = coverage_score(self.analysis);
        let variety = variety_score(self.rotation);
        let load_resilience = load_resilience_score(self.profile.weekly_km(), self.rotation.len());
        let goal_alignment =
            goal_alignment_score(self.profile.primary_goal, &self.analysis.covered_archetypes);

        let overall = f64::from(coverage) * W_COVERAGE
            + f64::from(goal_alignment) * W_GOAL_ALIGNMENT
            + f64::from(load_resilience) * W_LOAD_RESILIENCE
            + f64::from(variety) * W_VARIETY;

        let health = RotationHealth {
            coverage,
            variety,
            load_resilience,
            goal_alignment,
            overall: clamp_score(overall),
        };

        tracing::debug!(
            coverage = health.coverage,
            variety = health.variety,
            load_resilience = health.load_resilience,
            goal_alignment = health.goal_alignment,
            overall = health.overall,
            "Rotation health computed"
        );

        health
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Share of expected archetypes the rotation covers
pub fn coverage_score(analysis: &RotationAnalysis) -> u8 {
    if analysis.expected_archetypes.is_empty() {
        return 100;
    }
    let satisfied = analysis
        .expected_archetypes
        .intersection(&analysis.covered_archetypes)
        .count();
    clamp_score(satisfied as f64 / analysis.expected_archetypes.len() as f64 * 100.0)
}

/// Number of shoes that comfortably absorbs the weekly volume
pub fn ideal_shoe_count(weekly_km: Option<f64>) -> usize {
    match weekly_km {
        None => 1,
        Some(km) if km < 30.0 => 1,
        Some(km) if km < 50.0 => 2,
        Some(km) if km < 80.0 => 3,
        Some(_) => 4,
    }
}

pub fn load_resilience_score(weekly_km: Option<f64>, shoe_count: usize) -> u8 {
    let shortfall = ideal_shoe_count(weekly_km).saturating_sub(shoe_count) as u32;
    100u32.saturating_sub(LOAD_PENALTY_PER_SHOE * shortfall) as u8
}

pub fn goal_alignment_score(goal: PrimaryGoal, covered: &BTreeSet<Archetype>) -> u8 {
    let has = |a: Archetype| covered.contains(&a);
    match goal {
        PrimaryGoal::RaceTraining => {
            match (has(Archetype::WorkoutShoe), has(Archetype::RaceShoe)) {
                (true, true) => 100,
                (true, false) | (false, true) => 60,
                (false, false) => 20,
            }
        }
        PrimaryGoal::GetFaster => {
            if has(Archetype::WorkoutShoe) || has(Archetype::RaceShoe) {
                100
            } else {
                40
            }
        }
        PrimaryGoal::InjuryComeback => {
            if has(Archetype::RecoveryShoe) {
                100
            } else if has(Archetype::DailyTrainer) {
                60
            } else {
                30
            }
        }
        PrimaryGoal::GeneralFitness => {
            if has(Archetype::DailyTrainer) {
                100
            } else {
                50
            }
        }
    }
}

fn spread(values: &[f64], cap: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    ((max - min) / cap).min(1.0)
}

/// Mean spread across cushion, stability, bounce, rocker and heel drop
pub fn variety_score(rotation: &Rotation<'_>) -> u8 {
    let rating_dimensions = [
        FeelDimension::Cushion,
        FeelDimension::Stability,
        FeelDimension::Bounce,
        FeelDimension::Rocker,
    ];

    let mut spreads: Vec<f64> = rating_dimensions
        .iter()
        .map(|d| {
            let values: Vec<f64> = rotation.ratings(*d).into_iter().map(f64::from).collect();
            spread(&values, RATING_SPREAD_CAP)
        })
        .collect();
    spreads.push(spread(&rotation.heel_drops(), DROP_SPREAD_CAP_MM));

    clamp_score(spreads.iter().sum::<f64>() / spreads.len() as f64 * 100.0)
}
