//! Fixtures shared by the service unit tests

use crate::db::Catalogue;
use crate::models::{
    ExperienceLevel, OwnedShoe, PrimaryGoal, RunType, RunnerProfile, RunningPattern, Shoe,
};

/// The bundled catalogue in `data/catalogue.json`
pub fn catalogue() -> Catalogue {
    Catalogue::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/catalogue.json"))
        .expect("bundled catalogue should load")
}

pub fn owned(shoe_id: &str, run_types: &[RunType]) -> OwnedShoe {
    OwnedShoe::new(shoe_id, run_types.to_vec())
}

pub fn profile(
    experience: ExperienceLevel,
    goal: PrimaryGoal,
    pattern: RunningPattern,
) -> RunnerProfile {
    RunnerProfile::new(experience, goal, pattern)
}

/// A mid-everything daily trainer to tweak field by field
pub fn shoe(shoe_id: &str) -> Shoe {
    Shoe {
        shoe_id: shoe_id.to_string(),
        brand: "Test".to_string(),
        model: shoe_id.to_string(),
        is_daily_trainer: true,
        is_recovery_shoe: false,
        is_workout_shoe: false,
        is_race_shoe: false,
        is_trail_shoe: false,
        is_super_trainer: false,
        cushion_softness: Some(3),
        bounce: Some(3),
        stability: Some(3),
        rocker: Some(3),
        ground_feel: Some(3),
        weight_feel: Some(3),
        heel_drop_mm: Some(8.0),
        weight_g: Some(260.0),
        has_plate: false,
        plate_material: None,
        price_tier: None,
        retail_price_usd: Some(140.0),
        available: true,
        experience_levels: Vec::new(),
        heavy_runner_friendly: false,
    }
}
