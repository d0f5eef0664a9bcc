use std::collections::BTreeSet;

use crate::models::{
    Archetype, Confidence, ExperienceLevel, FeelDimension, FeelGap, FeelGapDimension,
    GapDirection, PrimaryGoal, RotationAnalysis, RotationHealth, RunType, RunnerProfile,
    RunningPattern, Slot, Tier, TierClassification,
};

use super::feel_gap::{contrast_profile, detect_feel_gaps, within_archetype_reason};
use super::rotation_analyzer::{prioritized_missing, Rotation};

/// Below these, a health dimension is a genuine gap
const COVERAGE_FLOOR: u8 = 70;
const GOAL_ALIGNMENT_FLOOR: u8 = 50;
const LOAD_RESILIENCE_FLOOR: u8 = 70;

/// Weekly volume at which an under-sized rotation is a load-sharing problem
const LOAD_SHARING_KM: f64 = 50.0;
/// Variety below this, with more than one shoe, counts as too similar
const LOW_VARIETY: u8 = 30;
const HIGH_VOLUME_KM: f64 = 70.0;
const HIGH_VOLUME_MIN_SHOES: usize = 3;

/// Everything the classifier and its rules read
pub struct TierContext<'a> {
    pub health: &'a RotationHealth,
    pub analysis: &'a RotationAnalysis,
    pub rotation: &'a Rotation<'a>,
    pub profile: &'a RunnerProfile,
}

/// An archetype the runner cannot do without, given the predicate holds
pub type CriticalRule = (fn(&RunnerProfile) -> bool, Archetype);

fn always(_: &RunnerProfile) -> bool {
    true
}

fn race_training(profile: &RunnerProfile) -> bool {
    profile.primary_goal == PrimaryGoal::RaceTraining
}

fn get_faster(profile: &RunnerProfile) -> bool {
    profile.primary_goal == PrimaryGoal::GetFaster
}

fn injury_comeback(profile: &RunnerProfile) -> bool {
    profile.primary_goal == PrimaryGoal::InjuryComeback
}

fn mostly_trails(profile: &RunnerProfile) -> bool {
    profile.mostly_trails()
}

pub const CRITICAL_ARCHETYPES: [CriticalRule; 6] = [
    (always, Archetype::DailyTrainer),
    (race_training, Archetype::WorkoutShoe),
    (race_training, Archetype::RaceShoe),
    (get_faster, Archetype::WorkoutShoe),
    (injury_comeback, Archetype::RecoveryShoe),
    (mostly_trails, Archetype::TrailShoe),
];

pub fn critical_archetypes(profile: &RunnerProfile) -> BTreeSet<Archetype> {
    CRITICAL_ARCHETYPES
        .iter()
        .filter(|(applies, _)| applies(profile))
        .map(|(_, archetype)| *archetype)
        .collect()
}

/// A tier-2 improvement check
pub type ImprovementRule = fn(&TierContext<'_>) -> Option<Slot>;

pub const IMPROVEMENT_RULES: [ImprovementRule; 4] = [
    missing_plate,
    low_variety,
    high_volume_few_shoes,
    redundancy_with_gap,
];

/// Decision tree over health, analysis and profile; first matching tier wins
pub struct TierClassifier<'a> {
    context: TierContext<'a>,
}

impl<'a> TierClassifier<'a> {
    pub fn new(
        health: &'a RotationHealth,
        analysis: &'a RotationAnalysis,
        rotation: &'a Rotation<'a>,
        profile: &'a RunnerProfile,
    ) -> Self {
        Self {
            context: TierContext {
                health,
                analysis,
                rotation,
                profile,
            },
        }
    }

    pub fn classify(&self) -> TierClassification {
        let classification = if let Some(genuine_gap) = self.genuine_gap() {
            genuine_gap
        } else if self.is_complete() {
            self.exploration(true)
        } else if let Some(improvement) = self.improvement() {
            improvement
        } else {
            self.exploration(false)
        };

        tracing::info!(
            tier = u8::from(classification.tier),
            primary = %classification.primary.archetype,
            secondary = ?classification.secondary.as_ref().map(|s| s.archetype),
            "Rotation classified"
        );

        classification
    }

    fn is_complete(&self) -> bool {
        let TierContext {
            health, analysis, ..
        } = self.context;
        health.coverage == 100
            && health.load_resilience >= LOAD_RESILIENCE_FLOOR
            && analysis.missing_archetypes.is_empty()
    }

    fn genuine_gap(&self) -> Option<TierClassification> {
        let TierContext {
            health,
            analysis,
            profile,
            ..
        } = self.context;

        let critical_missing: Vec<Archetype> = critical_archetypes(profile)
            .into_iter()
            .filter(|a| !analysis.covered_archetypes.contains(a))
            .collect();

        let triggered = health.coverage < COVERAGE_FLOOR
            || health.goal_alignment < GOAL_ALIGNMENT_FLOOR
            || health.load_resilience < LOAD_RESILIENCE_FLOOR
            || !critical_missing.is_empty();
        if !triggered {
            return None;
        }

        let missing = prioritized_missing(analysis, profile);
        let load_sharing = health.load_resilience < LOAD_RESILIENCE_FLOOR
            && (profile
                .weekly_km()
                .is_some_and(|km| km >= LOAD_SHARING_KM)
                || missing.is_empty());

        let (primary, secondary) = if load_sharing {
            let secondary = goal_performance_archetype(profile.primary_goal)
                .filter(|a| !analysis.covered_archetypes.contains(a))
                .or_else(|| {
                    missing
                        .iter()
                        .copied()
                        .find(|a| *a != Archetype::DailyTrainer)
                })
                .map(|a| Slot::new(a, missing_reason(a, profile)));
            let reason = load_sharing_reason(self.context.rotation.len(), profile);
            (Slot::new(Archetype::DailyTrainer, reason), secondary)
        } else {
            // Critical archetypes outside the expected set still need a slot
            let mut ordered = missing.clone();
            for archetype in &critical_missing {
                if !ordered.contains(archetype) {
                    ordered.push(*archetype);
                }
            }
            let mut ordered = ordered.into_iter();
            let primary = ordered.next().unwrap_or(Archetype::DailyTrainer);
            let secondary = ordered.find(|a| *a != primary);
            (
                Slot::new(primary, missing_reason(primary, profile)),
                secondary.map(|a| Slot::new(a, missing_reason(a, profile))),
            )
        };

        let tier_reason = if load_sharing {
            format!(
                "Your weekly volume is more than {} can comfortably absorb.",
                shoe_count_phrase(self.context.rotation.len())
            )
        } else if !critical_missing.is_empty() {
            format!(
                "Your rotation is missing a {}, which is essential for {}.",
                critical_missing[0].label(),
                profile.primary_goal.label()
            )
        } else {
            "Your rotation doesn't cover the kinds of running you do.".to_string()
        };

        Some(TierClassification {
            tier: Tier::GenuineGap,
            confidence: Confidence::High,
            primary,
            secondary,
            tier_reason,
        })
    }

    fn improvement(&self) -> Option<TierClassification> {
        let mut slots: Vec<Slot> = Vec::new();
        for rule in IMPROVEMENT_RULES {
            if let Some(slot) = rule(&self.context) {
                if !slots.iter().any(|s| s.archetype == slot.archetype) {
                    slots.push(slot);
                }
            }
            if slots.len() == 2 {
                break;
            }
        }

        let mut slots = slots.into_iter();
        let primary = slots.next()?;
        let tier_reason = format!(
            "Your rotation covers the basics, but a {} would make it work better.",
            primary.archetype.label()
        );

        Some(TierClassification {
            tier: Tier::Improvement,
            confidence: Confidence::Medium,
            primary,
            secondary: slots.next(),
            tier_reason,
        })
    }

    /// Tier 3, shared by the complete-rotation path and the final fallback
    fn exploration(&self, complete: bool) -> TierClassification {
        let TierContext {
            analysis,
            rotation,
            profile,
            ..
        } = self.context;

        let contrast = contrast_profile(rotation);
        let gaps = detect_feel_gaps(rotation, profile);

        let slot_for = |gap: &FeelGap| Slot {
            archetype: gap.recommended_archetype,
            reason: if analysis
                .covered_archetypes
                .contains(&gap.recommended_archetype)
            {
                within_archetype_reason(gap)
            } else {
                gap.reason.clone()
            },
            feel_gap: Some(gap.clone()),
            contrast_profile: Some(contrast),
        };

        let mut primary = match gaps.first() {
            Some(gap) => slot_for(gap),
            None => Slot {
                archetype: Archetype::DailyTrainer,
                reason: "Your rotation is well balanced. A daily trainer that feels different \
                         from what you own would add variety."
                    .to_string(),
                feel_gap: None,
                contrast_profile: Some(contrast),
            },
        };

        let beginner = profile.experience_level == ExperienceLevel::Beginner;
        if beginner && rotation.len() <= 1 && primary.archetype == Archetype::RecoveryShoe {
            primary.archetype = Archetype::DailyTrainer;
            primary.reason = load_sharing_reason(rotation.len(), profile);
            if let Some(gap) = primary.feel_gap.as_mut() {
                gap.recommended_archetype = Archetype::DailyTrainer;
            }
        }

        let secondary = if beginner {
            None
        } else {
            gaps.get(1).map(slot_for)
        };

        let tier_reason = if complete {
            "Your rotation covers everything your running calls for. These picks are about \
             exploring a feel you don't have yet."
                .to_string()
        } else {
            "No urgent gaps. These picks explore a feel your rotation is missing.".to_string()
        };

        TierClassification {
            tier: Tier::Exploration,
            confidence: Confidence::Soft,
            primary,
            secondary,
            tier_reason,
        }
    }
}

/// The performance or protection archetype the goal leans on
fn goal_performance_archetype(goal: PrimaryGoal) -> Option<Archetype> {
    match goal {
        PrimaryGoal::RaceTraining | PrimaryGoal::GetFaster => Some(Archetype::WorkoutShoe),
        PrimaryGoal::InjuryComeback => Some(Archetype::RecoveryShoe),
        PrimaryGoal::GeneralFitness => None,
    }
}

fn shoe_count_phrase(count: usize) -> String {
    match count {
        0 => "an empty rotation".to_string(),
        1 => "a single shoe".to_string(),
        n => format!("{} shoes", n),
    }
}

fn load_sharing_reason(shoe_count: usize, profile: &RunnerProfile) -> String {
    let volume = match profile.weekly_km() {
        Some(km) => format!("At around {:.0} km a week", km),
        None => "At your volume".to_string(),
    };
    format!(
        "{}, {} takes every step. Another daily trainer would share the load and give \
         each pair time to recover between runs.",
        volume,
        shoe_count_phrase(shoe_count)
    )
}

fn missing_reason(archetype: Archetype, profile: &RunnerProfile) -> String {
    match archetype {
        Archetype::DailyTrainer => {
            "You need a reliable daily trainer to handle the bulk of your running.".to_string()
        }
        Archetype::RecoveryShoe => format!(
            "A soft, protective recovery shoe would support your easy days{}.",
            if profile.primary_goal == PrimaryGoal::InjuryComeback {
                " while you build back from injury"
            } else {
                ""
            }
        ),
        Archetype::WorkoutShoe => format!(
            "With a {} goal, a responsive workout shoe would help you get more out of faster \
             sessions.",
            profile.primary_goal.label()
        ),
        Archetype::RaceShoe => {
            "A dedicated race shoe would give you an edge on race day.".to_string()
        }
        Archetype::TrailShoe => {
            "You run trails but have no shoe built for grip and protection off-road.".to_string()
        }
    }
}

fn does_workouts(context: &TierContext<'_>) -> bool {
    matches!(
        context.profile.running_pattern,
        RunningPattern::StructuredTraining | RunningPattern::WorkoutFocused
    ) || context.analysis.covered_run_types.contains(&RunType::Workouts)
}

pub fn missing_plate(context: &TierContext<'_>) -> Option<Slot> {
    let profile = context.profile;
    if profile.experience_level < ExperienceLevel::Intermediate
        || !does_workouts(context)
        || context.rotation.has_plated_shoe()
    {
        return None;
    }

    let archetype = if profile.primary_goal == PrimaryGoal::RaceTraining {
        Archetype::RaceShoe
    } else {
        Archetype::WorkoutShoe
    };
    Some(Slot::new(
        archetype,
        format!(
            "None of your shoes has a plate. A plated {} would add snap to your faster running.",
            archetype.label()
        ),
    ))
}

pub fn low_variety(context: &TierContext<'_>) -> Option<Slot> {
    if context.health.variety >= LOW_VARIETY || context.rotation.len() <= 1 {
        return None;
    }

    let cushions = context.rotation.ratings(FeelDimension::Cushion);
    let (archetype, dimension, direction, reason) =
        if !cushions.is_empty() && cushions.iter().all(|&c| c >= 3) {
            (
                Archetype::WorkoutShoe,
                FeelGapDimension::Cushion,
                GapDirection::FavorLow,
                "Your shoes all feel much the same and lean soft. A firmer workout shoe would \
                 give you a different, more connected ride.",
            )
        } else if !cushions.is_empty() && cushions.iter().all(|&c| c <= 2) {
            (
                Archetype::RecoveryShoe,
                FeelGapDimension::Cushion,
                GapDirection::FavorHigh,
                "Your shoes all feel much the same and lean firm. A softer recovery shoe would \
                 give your legs a break.",
            )
        } else {
            (
                Archetype::DailyTrainer,
                FeelGapDimension::Rocker,
                GapDirection::FavorHigh,
                "Your shoes all feel much the same. A daily trainer with more rocker would \
                 change how your stride rolls through.",
            )
        };

    Some(Slot {
        archetype,
        reason: reason.to_string(),
        feel_gap: Some(FeelGap {
            dimension,
            priority: 1,
            direction,
            recommended_archetype: archetype,
            reason: reason.to_string(),
        }),
        contrast_profile: Some(contrast_profile(context.rotation)),
    })
}

pub fn high_volume_few_shoes(context: &TierContext<'_>) -> Option<Slot> {
    let km = context.profile.weekly_km()?;
    if km < HIGH_VOLUME_KM || context.rotation.len() >= HIGH_VOLUME_MIN_SHOES {
        return None;
    }
    Some(Slot::new(
        Archetype::DailyTrainer,
        load_sharing_reason(context.rotation.len(), context.profile),
    ))
}

pub fn redundancy_with_gap(context: &TierContext<'_>) -> Option<Slot> {
    if context.analysis.redundancy_groups.is_empty() {
        return None;
    }
    let archetype = prioritized_missing(context.analysis, context.profile)
        .into_iter()
        .next()?;
    Some(Slot::new(
        archetype,
        format!(
            "Some of your shoes overlap in feel and use. Swapping that overlap for a {} would \
             round out your rotation.",
            archetype.label()
        ),
    ))
}
