use std::collections::BTreeSet;

use crate::db::Catalogue;
use crate::models::{
    Archetype, FeelDimension, FeelTag, OwnedShoe, PrimaryGoal, RedundancyGroup,
    RotationAnalysis, RunType, RunnerProfile, RunningPattern, TrailFrequency,
};
use crate::models::Shoe;

/// Maximum rating difference on cushion, stability and bounce for two shoes to feel alike
const REDUNDANCY_TOLERANCE: u8 = 1;

/// An owned shoe paired with its catalogue record
#[derive(Debug, Clone, Copy)]
pub struct ResolvedShoe<'a> {
    pub owned: &'a OwnedShoe,
    pub shoe: &'a Shoe,
}

/// The runner's rotation resolved against the catalogue
#[derive(Debug, Clone)]
pub struct Rotation<'a> {
    pub shoes: Vec<ResolvedShoe<'a>>,
    /// Owned ids with no catalogue record; excluded from every computation
    pub unresolved: Vec<String>,
}

impl<'a> Rotation<'a> {
    pub fn resolve(owned: &'a [OwnedShoe], catalogue: &'a Catalogue) -> Self {
        let mut shoes = Vec::with_capacity(owned.len());
        let mut unresolved = Vec::new();

        for owned_shoe in owned {
            match catalogue.get(&owned_shoe.shoe_id) {
                Some(shoe) => shoes.push(ResolvedShoe {
                    owned: owned_shoe,
                    shoe,
                }),
                None => {
                    tracing::warn!(
                        shoe_id = %owned_shoe.shoe_id,
                        "Owned shoe not found in catalogue, ignoring"
                    );
                    unresolved.push(owned_shoe.shoe_id.clone());
                }
            }
        }

        Self { shoes, unresolved }
    }

    pub fn len(&self) -> usize {
        self.shoes.len()
    }

    /// Known ratings for one dimension, in rotation order
    pub fn ratings(&self, dimension: FeelDimension) -> Vec<u8> {
        self.shoes
            .iter()
            .filter_map(|r| r.shoe.rating(dimension))
            .collect()
    }

    pub fn heel_drops(&self) -> Vec<f64> {
        self.shoes.iter().filter_map(|r| r.shoe.heel_drop_mm).collect()
    }

    pub fn daily_trainer_count(&self) -> usize {
        self.shoes
            .iter()
            .filter(|r| r.shoe.serves(Archetype::DailyTrainer))
            .count()
    }

    pub fn has_plated_shoe(&self) -> bool {
        self.shoes.iter().any(|r| r.shoe.has_plate)
    }

    /// Whether any owned shoe carries the given dislike tag
    pub fn any_disliked(&self, tag: FeelTag) -> bool {
        self.shoes
            .iter()
            .any(|r| r.owned.disliked_feel().contains(&tag))
    }
}

/// Derives coverage and redundancy from a rotation and profile
pub struct RotationAnalyzer<'a> {
    rotation: &'a Rotation<'a>,
    profile: &'a RunnerProfile,
}

impl<'a> RotationAnalyzer<'a> {
    pub fn new(rotation: &'a Rotation<'a>, profile: &'a RunnerProfile) -> Self {
        Self { rotation, profile }
    }

    pub fn analyze(&self) -> RotationAnalysis {
        let covered_run_types: BTreeSet<RunType> = self
            .rotation
            .shoes
            .iter()
            .flat_map(|r| r.owned.run_types.iter().copied())
            .collect();
        let covered_archetypes = covered_archetypes(self.rotation);
        let expected_archetypes = expected_archetypes(self.profile);
        let missing_archetypes: BTreeSet<Archetype> = expected_archetypes
            .difference(&covered_archetypes)
            .copied()
            .collect();
        let redundancy_groups = redundancy_groups(self.rotation);

        tracing::debug!(
            covered = ?covered_archetypes,
            missing = ?missing_archetypes,
            redundancy_groups = redundancy_groups.len(),
            "Rotation analyzed"
        );

        RotationAnalysis {
            covered_run_types,
            covered_archetypes,
            expected_archetypes,
            missing_archetypes,
            redundancy_groups,
            shoe_count: self.rotation.len(),
            unresolved_shoe_ids: self.rotation.unresolved.clone(),
        }
    }
}

/// Archetypes the rotation actually fills through declared use
///
/// A run type only counts toward an archetype the shoe is built for; a shoe
/// with no declared use contributes every archetype it serves.
pub fn covered_archetypes(rotation: &Rotation<'_>) -> BTreeSet<Archetype> {
    let mut covered = BTreeSet::new();

    for resolved in &rotation.shoes {
        if resolved.owned.run_types.is_empty() {
            covered.extend(resolved.shoe.archetypes());
            continue;
        }
        for run_type in &resolved.owned.run_types {
            covered.extend(
                run_type
                    .archetypes()
                    .iter()
                    .copied()
                    .filter(|a| resolved.shoe.serves(*a)),
            );
        }
    }

    covered
}

/// Archetypes the profile calls for
pub fn expected_archetypes(profile: &RunnerProfile) -> BTreeSet<Archetype> {
    let mut expected: BTreeSet<Archetype> = match profile.running_pattern {
        RunningPattern::Infrequent | RunningPattern::MostlyEasy => {
            [Archetype::DailyTrainer].into()
        }
        RunningPattern::StructuredTraining => [
            Archetype::DailyTrainer,
            Archetype::RecoveryShoe,
            Archetype::WorkoutShoe,
        ]
        .into(),
        RunningPattern::WorkoutFocused => {
            [Archetype::DailyTrainer, Archetype::WorkoutShoe].into()
        }
    };

    match profile.primary_goal {
        PrimaryGoal::RaceTraining => {
            expected.insert(Archetype::WorkoutShoe);
            expected.insert(Archetype::RaceShoe);
        }
        PrimaryGoal::GetFaster => {
            expected.insert(Archetype::WorkoutShoe);
        }
        PrimaryGoal::InjuryComeback => {
            expected.insert(Archetype::RecoveryShoe);
        }
        PrimaryGoal::GeneralFitness => {}
    }

    if profile.runs_trails() {
        expected.insert(Archetype::TrailShoe);
    }

    expected
}

/// Goal-ordered archetype priority used to pick which missing archetype matters most
pub fn archetype_priority(profile: &RunnerProfile) -> Vec<Archetype> {
    let mut order = if profile.primary_goal.is_speed_goal() {
        vec![
            Archetype::WorkoutShoe,
            Archetype::RaceShoe,
            Archetype::DailyTrainer,
            Archetype::RecoveryShoe,
            Archetype::TrailShoe,
        ]
    } else {
        vec![
            Archetype::DailyTrainer,
            Archetype::RecoveryShoe,
            Archetype::WorkoutShoe,
            Archetype::RaceShoe,
            Archetype::TrailShoe,
        ]
    };

    if profile.trail_running == Some(TrailFrequency::MostOrAll) {
        order.retain(|a| *a != Archetype::TrailShoe);
        let daily = order
            .iter()
            .position(|a| *a == Archetype::DailyTrainer)
            .unwrap_or(0);
        order.insert(daily, Archetype::TrailShoe);
    }

    order
}

/// Missing archetypes in priority order
pub fn prioritized_missing(analysis: &RotationAnalysis, profile: &RunnerProfile) -> Vec<Archetype> {
    archetype_priority(profile)
        .into_iter()
        .filter(|a| analysis.missing_archetypes.contains(a))
        .collect()
}

/// Cushion, stability and bounce each within tolerance; unrated dimensions never match
pub fn feels_alike(a: &Shoe, b: &Shoe) -> bool {
    [
        FeelDimension::Cushion,
        FeelDimension::Stability,
        FeelDimension::Bounce,
    ]
    .into_iter()
    .all(|dimension| match (a.rating(dimension), b.rating(dimension)) {
        (Some(x), Some(y)) => x.abs_diff(y) <= REDUNDANCY_TOLERANCE,
        _ => false,
    })
}

/// Connected components of the "feels alike and shares a run type" relation
pub fn redundancy_groups(rotation: &Rotation<'_>) -> Vec<RedundancyGroup> {
    let n = rotation.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&rotation.shoes[i], &rotation.shoes[j]);
            if a.owned.shares_run_type(b.owned) && feels_alike(a.shoe, b.shoe) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut groups = Vec::new();
    let mut seen_roots = BTreeSet::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        if !seen_roots.insert(root) {
            continue;
        }
        let members: Vec<usize> = (0..n).filter(|&j| find(&mut parent, j) == root).collect();
        if members.len() < 2 {
            continue;
        }

        let mut shared_run_types = BTreeSet::new();
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                for run_type in &rotation.shoes[a].owned.run_types {
                    if rotation.shoes[b].owned.used_for(*run_type) {
                        shared_run_types.insert(*run_type);
                    }
                }
            }
        }

        groups.push(RedundancyGroup {
            shoe_ids: members
                .iter()
                .map(|&m| rotation.shoes[m].shoe.shoe_id.clone())
                .collect(),
            shared_run_types,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{catalogue, owned, profile};
    use crate::models::ExperienceLevel;

    #[test]
    fn test_resolve_reports_unknown_ids() {
        let catalogue = catalogue();
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("made-up-shoe", &[RunType::Easy]),
        ];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        assert_eq!(rotation.len(), 1);
        assert_eq!(rotation.unresolved, vec!["made-up-shoe".to_string()]);
    }

    #[test]
    fn test_expected_archetypes_structured_race_training_with_trails() {
        let mut p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::RaceTraining,
            RunningPattern::StructuredTraining,
        );
        p.trail_running = Some(TrailFrequency::Occasionally);

        let expected: Vec<Archetype> = expected_archetypes(&p).into_iter().collect();
        assert_eq!(expected, Archetype::ALL.to_vec());
    }

    #[test]
    fn test_expected_archetypes_easy_general_fitness() {
        let p = profile(
            ExperienceLevel::Beginner,
            PrimaryGoal::GeneralFitness,
            RunningPattern::MostlyEasy,
        );
        let expected: Vec<Archetype> = expected_archetypes(&p).into_iter().collect();
        assert_eq!(expected, vec![Archetype::DailyTrainer]);
    }

    #[test]
    fn test_covered_archetypes_respect_shoe_capability() {
        let catalogue = catalogue();
        // A daily trainer pressed into workout duty covers nothing for workouts
        let shoes = vec![owned(
            "nike-pegasus-41",
            &[RunType::AllRuns, RunType::Workouts],
        )];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let covered: Vec<Archetype> = covered_archetypes(&rotation).into_iter().collect();
        assert_eq!(covered, vec![Archetype::DailyTrainer]);
    }

    #[test]
    fn test_workout_run_type_covers_race_for_race_shoe() {
        let catalogue = catalogue();
        let shoes = vec![owned("asics-magic-speed-4", &[RunType::Workouts])];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let covered: Vec<Archetype> = covered_archetypes(&rotation).into_iter().collect();
        assert_eq!(covered, vec![Archetype::WorkoutShoe, Archetype::RaceShoe]);
    }

    #[test]
    fn test_undeclared_use_contributes_all_archetypes() {
        let catalogue = catalogue();
        let shoes = vec![owned("asics-superblast-2", &[])];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let covered: Vec<Archetype> = covered_archetypes(&rotation).into_iter().collect();
        assert_eq!(
            covered,
            vec![
                Archetype::DailyTrainer,
                Archetype::RecoveryShoe,
                Archetype::WorkoutShoe
            ]
        );
    }

    #[test]
    fn test_missing_is_expected_minus_covered() {
        let catalogue = catalogue();
        let p = profile(
            ExperienceLevel::Intermediate,
            PrimaryGoal::RaceTraining,
            RunningPattern::WorkoutFocused,
        );
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("saucony-ride-17", &[RunType::AllRuns]),
        ];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let analysis = RotationAnalyzer::new(&rotation, &p).analyze();

        let missing: Vec<Archetype> = analysis.missing_archetypes.into_iter().collect();
        assert_eq!(missing, vec![Archetype::WorkoutShoe, Archetype::RaceShoe]);
        assert_eq!(analysis.shoe_count, 2);
    }

    #[test]
    fn test_redundancy_requires_shared_run_type() {
        let catalogue = catalogue();
        // Pegasus 41 and Ride 17 feel alike (3/3/3 vs 3/3/3)
        let shared = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("saucony-ride-17", &[RunType::AllRuns, RunType::LongRuns]),
        ];
        let rotation = Rotation::resolve(&shared, &catalogue);
        let groups = redundancy_groups(&rotation);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].shoe_ids,
            vec!["nike-pegasus-41".to_string(), "saucony-ride-17".to_string()]
        );
        assert_eq!(
            groups[0].shared_run_types.iter().copied().collect::<Vec<_>>(),
            vec![RunType::AllRuns]
        );

        let disjoint = vec![
            owned("nike-pegasus-41", &[RunType::AllRuns]),
            owned("saucony-ride-17", &[RunType::LongRuns]),
        ];
        let rotation = Rotation::resolve(&disjoint, &catalogue);
        assert!(redundancy_groups(&rotation).is_empty());
    }

    #[test]
    fn test_redundancy_groups_are_transitive() {
        let catalogue = catalogue();
        // 3/3/3, 3/3/3 and 4/2/4 chain through the middle shoe
        let shoes = vec![
            owned("nike-pegasus-41", &[RunType::Easy]),
            owned("saucony-ride-17", &[RunType::Easy]),
            owned("asics-novablast-5", &[RunType::Easy]),
            owned("nike-vaporfly-3", &[RunType::Races]),
        ];
        let rotation = Rotation::resolve(&shoes, &catalogue);
        let groups = redundancy_groups(&rotation);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].shoe_ids.len(), 3);
    }

    #[test]
    fn test_priority_puts_trail_first_for_trail_runners() {
        let mut p = profile(
            ExperienceLevel::Experienced,
            PrimaryGoal::GeneralFitness,
            RunningPattern::MostlyEasy,
        );
        p.trail_running = Some(TrailFrequency::MostOrAll);
        assert_eq!(archetype_priority(&p)[0], Archetype::TrailShoe);

        p.primary_goal = PrimaryGoal::RaceTraining;
        assert_eq!(
            archetype_priority(&p)[..3],
            [
                Archetype::WorkoutShoe,
                Archetype::RaceShoe,
                Archetype::TrailShoe
            ]
        );
    }
}
