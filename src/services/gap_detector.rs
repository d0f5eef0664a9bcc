//! Legacy single-gap assessment.
//!
//! Runs alongside the tier classifier and may disagree with it; both results
//! are returned to the caller.

use crate::models::{
    Archetype, FeelDimension, Gap, GapSeverity, GapType, OwnedShoe, PrimaryGoal,
    RotationAnalysis, RunType, RunnerProfile, RunningPattern, Shoe,
};

use super::rotation_analyzer::{prioritized_missing, Rotation};
use super::tier_classifier::critical_archetypes;

/// Cushion rating at which a shoe counts as protective for recovery purposes
const PROTECTIVE_CUSHION: u8 = 4;

pub struct GapContext<'a> {
    pub analysis: &'a RotationAnalysis,
    pub rotation: &'a Rotation<'a>,
    pub profile: &'a RunnerProfile,
}

pub type GapRule = fn(&GapContext<'_>) -> Option<Gap>;

/// Evaluated in order; the first gap found wins
pub const GAP_RULES: [GapRule; 5] = [
    misuse_gap,
    coverage_gap,
    performance_gap,
    recovery_gap,
    redundancy_gap,
];

pub struct GapDetector<'a> {
    context: GapContext<'a>,
}

impl<'a> GapDetector<'a> {
    pub fn new(
        analysis: &'a RotationAnalysis,
        rotation: &'a Rotation<'a>,
        profile: &'a RunnerProfile,
    ) -> Self {
        Self {
            context: GapContext {
                analysis,
                rotation,
                profile,
            },
        }
    }

    /// Exactly one gap, falling back to a low-severity daily-trainer suggestion
    pub fn detect(&self) -> Gap {
        let gap = GAP_RULES
            .iter()
            .find_map(|rule| rule(&self.context))
            .unwrap_or_else(|| Gap {
                gap_type: GapType::Coverage,
                severity: GapSeverity::Low,
                reasoning: "Your rotation has no obvious gaps. Another daily trainer is the most \
                            versatile addition."
                    .to_string(),
                recommended_archetype: Archetype::DailyTrainer,
            });

        tracing::debug!(
            gap_type = ?gap.gap_type,
            severity = ?gap.severity,
            archetype = %gap.recommended_archetype,
            "Legacy gap detected"
        );

        gap
    }
}

/// A run type the shoe is being used for but was not built for
pub fn misused_run_type(shoe: &Shoe, owned: &OwnedShoe) -> Option<RunType> {
    let misfits: &[RunType] = if shoe.is_race_only() {
        &[RunType::Recovery, RunType::AllRuns, RunType::Easy]
    } else if shoe.is_recovery_only() {
        &[RunType::Workouts, RunType::Races]
    } else {
        &[]
    };
    misfits.iter().copied().find(|r| owned.used_for(*r))
}

pub fn misuse_gap(context: &GapContext<'_>) -> Option<Gap> {
    context.rotation.shoes.iter().find_map(|resolved| {
        let shoe = resolved.shoe;
        let run_type = misused_run_type(shoe, resolved.owned)?;

        let (recommended_archetype, reasoning) = if shoe.is_race_only() {
            let archetype = if run_type == RunType::Recovery {
                Archetype::RecoveryShoe
            } else {
                Archetype::DailyTrainer
            };
            (
                archetype,
                format!(
                    "You're using the {}, a race shoe, for {} running. Race foams wear out \
                     quickly and offer little protection, so a {} should take that load.",
                    shoe.display_name(),
                    run_type_phrase(run_type),
                    archetype.label()
                ),
            )
        } else {
            let archetype = if run_type == RunType::Races {
                Archetype::RaceShoe
            } else {
                Archetype::WorkoutShoe
            };
            (
                archetype,
                format!(
                    "You're using the {}, a recovery shoe, for {}. It's built to protect \
                     rather than respond, so a {} would serve those sessions better.",
                    shoe.display_name(),
                    run_type_phrase(run_type),
                    archetype.label()
                ),
            )
        };

        Some(Gap {
            gap_type: GapType::Misuse,
            severity: GapSeverity::High,
            reasoning,
            recommended_archetype,
        })
    })
}

pub fn coverage_gap(context: &GapContext<'_>) -> Option<Gap> {
    let archetype = prioritized_missing(context.analysis, context.profile)
        .into_iter()
        .next()?;
    let severity = if critical_archetypes(context.profile).contains(&archetype) {
        GapSeverity::High
    } else {
        GapSeverity::Medium
    };

    Some(Gap {
        gap_type: GapType::Coverage,
        severity,
        reasoning: format!(
            "Your rotation has no {}, which the way you run calls for.",
            archetype.label()
        ),
        recommended_archetype: archetype,
    })
}

pub fn performance_gap(context: &GapContext<'_>) -> Option<Gap> {
    let profile = context.profile;
    let covered = &context.analysis.covered_archetypes;
    if !profile.primary_goal.is_speed_goal()
        || covered.contains(&Archetype::WorkoutShoe)
        || covered.contains(&Archetype::RaceShoe)
    {
        return None;
    }

    Some(Gap {
        gap_type: GapType::Performance,
        severity: GapSeverity::Medium,
        reasoning: format!(
            "For {}, a lighter, more responsive workout shoe would make faster sessions easier.",
            profile.primary_goal.label()
        ),
        recommended_archetype: Archetype::WorkoutShoe,
    })
}

pub fn recovery_gap(context: &GapContext<'_>) -> Option<Gap> {
    let profile = context.profile;
    let needs_protection = matches!(
        profile.running_pattern,
        RunningPattern::StructuredTraining | RunningPattern::MostlyEasy
    ) || profile.primary_goal == PrimaryGoal::InjuryComeback;
    if !needs_protection {
        return None;
    }

    let has_protective_shoe = context.rotation.shoes.iter().any(|r| {
        r.shoe.is_recovery_shoe
            || r
                .shoe
                .rating(FeelDimension::Cushion)
                .is_some_and(|c| c >= PROTECTIVE_CUSHION)
    });
    if has_protective_shoe {
        return None;
    }

    Some(Gap {
        gap_type: GapType::Recovery,
        severity: GapSeverity::Medium,
        reasoning: "None of your shoes is soft enough to protect your legs on easy and recovery \
                    days."
            .to_string(),
        recommended_archetype: Archetype::RecoveryShoe,
    })
}

pub fn redundancy_gap(context: &GapContext<'_>) -> Option<Gap> {
    let group = context.analysis.redundancy_groups.first()?;
    let archetype = prioritized_missing(context.analysis, context.profile)
        .into_iter()
        .next()?;

    Some(Gap {
        gap_type: GapType::Redundancy,
        severity: GapSeverity::Low,
        reasoning: format!(
            "{} of your shoes feel alike and share the same runs. Your next shoe should be a {} \
             instead of another similar pair.",
            group.shoe_ids.len(),
            archetype.label()
        ),
        recommended_archetype: archetype,
    })
}

fn run_type_phrase(run_type: RunType) -> &'static str {
    match run_type {
        RunType::AllRuns => "all of your",
        RunType::Easy => "easy",
        RunType::LongRuns => "long",
        RunType::Recovery => "recovery",
        RunType::Workouts => "workouts",
        RunType::Races => "races",
        RunType::Trail => "trail",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Catalogue;
    use crate::models::ExperienceLevel;
    use crate::services::rotation_analyzer::RotationAnalyzer;
    use crate::services::test_support::{catalogue, owned, profile};

    fn detect(catalogue: &Catalogue, shoes: &[OwnedShoe], profile: &RunnerProfile) -> Gap {
        let rotation = Rotation::resolve(shoes, catalogue);
        let analysis = RotationAnalyzer::new(&rotation, profile).analyze();
        GapDetector::new(&analysis, &rotation, profile).detect()
    }

    #[test]
    fn test_race_shoe_for_easy_runs_is_misuse() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Competitive,
            PrimaryGoal::RaceTraining,
            RunningPattern::StructuredTraining,
        );
        let shoes = vec![owned("nike-vaporfly-3", &[RunType::Easy, RunType::Races])];
        let gap = detect(&catalogue, &shoes, &p);

        assert_eq!(gap.gap_type, GapType::Misuse);
        assert_eq!(gap.severity, GapSeverity::High);
        assert_eq!(gap.recommended_archetype, Archetype::DailyTrainer);
        assert!(gap.reasoning.contains("Nike Vaporfly 3"));
    }

    #[test]
    fn test_recovery_shoe_for_workouts_is_misuse() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GetFaster,
            RunningPattern::WorkoutFocused,
        );
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("hoka-bondi-8", &[RunType::Workouts]),
        ];
        let gap = detect(&catalogue, &shoes, &p);

        assert_eq!(gap.gap_type, GapType::Misuse);
        assert_eq!(gap.recommended_archetype, Archetype::WorkoutShoe);
    }

    #[test]
    fn test_race_training_with_two_daily_trainers_wants_workout_shoe() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::RaceTraining,
            RunningPattern::MostlyEasy,
        );
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("saucony-ride-17", &[RunType::Easy]),
        ];
        let gap = detect(&catalogue, &shoes, &p);

        assert_eq!(gap.gap_type, GapType::Coverage);
        assert_eq!(gap.severity, GapSeverity::High);
        assert_eq!(gap.recommended_archetype, Archetype::WorkoutShoe);
    }

    #[test]
    fn test_non_critical_coverage_gap_is_medium() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GeneralFitness,
            RunningPattern::StructuredTraining,
        );
        let shoes = vec![owned("nike-pegasus-41", &[RunType::AllRuns])];
        let gap = detect(&catalogue, &shoes, &p);

        assert_eq!(gap.gap_type, GapType::Coverage);
        assert_eq!(gap.severity, GapSeverity::Medium);
        assert_eq!(gap.recommended_archetype, Archetype::RecoveryShoe);
    }

    #[test]
    fn test_recovery_gap_without_protective_shoe() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GeneralFitness,
            RunningPattern::MostlyEasy,
        );
        let shoes = vec![owned("nike-pegasus-41", &[RunType::AllRuns])];
        let gap = detect(&catalogue, &shoes, &p);
        assert_eq!(gap.gap_type, GapType::Recovery);

        // Clifton's cushion 4 counts as protective
        let shoes = vec![owned("hoka-clifton-9", &[RunType::AllRuns])];
        let gap = detect(&catalogue, &shoes, &p);
        assert_eq!(gap.gap_type, GapType::Coverage);
        assert_eq!(gap.severity, GapSeverity::Low);
        assert_eq!(gap.recommended_archetype, Archetype::DailyTrainer);
    }

    #[test]
    fn test_performance_gap_needs_speed_goal() {
        let catalogue = catalogue();
        // Expected set has no workout shoe for infrequent runners, so coverage stays quiet
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GeneralFitness,
            RunningPattern::Infrequent,
        );
        let shoes = vec![owned("hoka-clifton-9", &[RunType::AllRuns])];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let analysis = RotationAnalyzer::new(&rotation, &p).analyze();
        let context = GapContext {
            analysis: &analysis,
            rotation: &rotation,
            profile: &p,
        };
        assert!(performance_gap(&context).is_none());

        let faster = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GetFaster,
            RunningPattern::Infrequent,
        );
        let context = GapContext {
            analysis: &analysis,
            rotation: &rotation,
            profile: &faster,
        };
        let gap = performance_gap(&context).unwrap();
        assert_eq!(gap.recommended_archetype, Archetype::WorkoutShoe);
    }

    #[test]
    fn test_redundancy_gap_points_at_missing_archetype() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::GeneralFitness,
            RunningPattern::StructuredTraining,
        );
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::Easy]),
            owned("saucony-ride-17", &[RunType::Easy]),
        ];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let analysis = RotationAnalyzer::new(&rotation, &p).analyze();
        let context = GapContext {
            analysis: &analysis,
            rotation: &rotation,
            profile: &p,
        };

        let gap = redundancy_gap(&context).unwrap();
        assert_eq!(gap.gap_type, GapType::Redundancy);
        assert_eq!(gap.recommended_archetype, Archetype::RecoveryShoe);
        assert!(gap.reasoning.starts_with("2 of your shoes"));
    }
}
