use std::collections::BTreeSet;

use crate::models::{
    Archetype, ContrastProfile, DropBucket, FeelDimension, FeelGap, FeelGapDimension,
    FeelPreference, FeelPreferences, GapDirection, PrimaryGoal, RunnerProfile, RunningPattern,
    ScoreComponent, ScoreTerm, ScoredCandidate, Sentiment, Shoe, LIGHT_SHOE_G,
};

use super::rotation_analyzer::{feels_alike, Rotation};

const ARCHETYPE_MATCH: i32 = 30;
const ARCHETYPE_MULTI_MATCH: i32 = 40;

const DROP_EXACT: i32 = 20;
const DROP_ADJACENT: i32 = 8;
const DROP_FAR: i32 = -20;

const FEEL_GAP_BASE: i32 = 20;
const FEEL_GAP_STEP: i32 = 8;
const VARIETY_FAR: i32 = 15;
const VARIETY_NEAR: i32 = 8;
const VARIETY_SAME: i32 = -5;

const CONTRAST_NEAR: i32 = 3;
const CONTRAST_FAR: i32 = 6;

const LOVE_TAG: i32 = 6;
const LIKE_TAG: i32 = 3;
const DISLIKE_TAG: i32 = -8;
const SIMILAR_TO_LOVED: i32 = 5;
const SIMILAR_TO_DISLIKED: i32 = -8;
const SENTIMENT_MIN: i32 = -24;
const SENTIMENT_MAX: i32 = 18;

const HEAVY_RUNNER_KG: f64 = 90.0;
const LIGHT_RUNNER_KG: f64 = 60.0;

/// Points for a runner-chosen target: any miss is costly
pub fn user_set_curve(distance: u8) -> i32 {
    match distance {
        0 => 15,
        1 => -10,
        _ => -25,
    }
}

/// Points for an archetype-derived target: misses are tolerated
pub fn cinda_decides_curve(distance: u8) -> i32 {
    match distance {
        0 => 10,
        1 => 4,
        2 => -3,
        _ => -6,
    }
}

/// Score for one feel dimension, or `None` when the dimension is not scored
pub fn preference_points(
    preference: FeelPreference,
    default_target: u8,
    rating: u8,
) -> Option<i32> {
    match preference {
        FeelPreference::UserSet { value } => Some(user_set_curve(value.abs_diff(rating))),
        FeelPreference::CindaDecides => {
            Some(cinda_decides_curve(default_target.abs_diff(rating)))
        }
        FeelPreference::Wildcard => None,
    }
}

pub fn drop_points(target: DropBucket, bucket: DropBucket) -> i32 {
    match target.distance(bucket) {
        0 => DROP_EXACT,
        1 => DROP_ADJACENT,
        _ => DROP_FAR,
    }
}

/// Feel targets used when the runner leaves a dimension to us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeelTargets {
    pub cushion: u8,
    pub bounce: u8,
    pub stability: u8,
    pub rocker: u8,
    pub ground_feel: u8,
}

impl FeelTargets {
    pub fn for_archetype(archetype: Archetype) -> Self {
        let (cushion, bounce, stability, rocker, ground_feel) = match archetype {
            Archetype::DailyTrainer => (3, 3, 3, 3, 3),
            Archetype::RecoveryShoe => (5, 3, 4, 4, 1),
            Archetype::WorkoutShoe => (3, 4, 3, 3, 3),
            Archetype::RaceShoe => (3, 5, 2, 4, 2),
            Archetype::TrailShoe => (3, 2, 4, 2, 4),
        };
        Self {
            cushion,
            bounce,
            stability,
            rocker,
            ground_feel,
        }
    }

    /// Archetype defaults, nudged toward support for beginners and injury comebacks
    pub fn for_profile(archetype: Archetype, profile: &RunnerProfile) -> Self {
        let mut targets = Self::for_archetype(archetype);
        if profile.in_foundation_segment() {
            targets.stability = (targets.stability + 1).min(5);
        }
        targets
    }

    /// The shoe's own ratings, falling back per dimension where it is unrated
    pub fn from_shoe(shoe: &Shoe, fallback: Self) -> Self {
        Self {
            cushion: shoe.cushion_softness.unwrap_or(fallback.cushion),
            bounce: shoe.bounce.unwrap_or(fallback.bounce),
            stability: shoe.stability.unwrap_or(fallback.stability),
            rocker: shoe.rocker.unwrap_or(fallback.rocker),
            ground_feel: shoe.ground_feel.unwrap_or(fallback.ground_feel),
        }
    }

    pub fn get(&self, dimension: FeelDimension) -> u8 {
        match dimension {
            FeelDimension::Cushion => self.cushion,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
        }
    }
}

/// Everything the scorer needs for one request
pub struct ScoringRequest<'a> {
    pub archetypes: BTreeSet<Archetype>,
    pub targets: FeelTargets,
    pub drop_target: Option<DropBucket>,
    pub preferences: &'a FeelPreferences,
    pub profile: &'a RunnerProfile,
    pub rotation: &'a Rotation<'a>,
    pub feel_gap: Option<&'a FeelGap>,
    pub contrast: Option<&'a ContrastProfile>,
}

/// Whether the shoe can fill any of the requested archetypes
pub fn passes_archetype(shoe: &Shoe, archetypes: &BTreeSet<Archetype>) -> bool {
    archetypes.iter().any(|a| shoe.serves(*a))
}

pub struct CandidateScorer<'a> {
    request: ScoringRequest<'a>,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(request: ScoringRequest<'a>) -> Self {
        Self { request }
    }

    /// Scores every shoe that passes the archetype filter
    pub fn score_all<'s>(
        &self,
        shoes: impl IntoIterator<Item = &'s Shoe>,
    ) -> Vec<ScoredCandidate<'s>> {
        shoes.into_iter().filter_map(|s| self.score(s)).collect()
    }

    pub fn score<'s>(&self, shoe: &'s Shoe) -> Option<ScoredCandidate<'s>> {
        if !passes_archetype(shoe, &self.request.archetypes) {
            return None;
        }

        let mut breakdown = Vec::new();
        let mut push = |component: ScoreComponent, points: i32| {
            breakdown.push(ScoreTerm { component, points });
        };

        push(ScoreComponent::ArchetypeMatch, self.archetype_points(shoe));

        let gap_dimension = self.request.feel_gap.map(|g| g.dimension);
        for dimension in FeelDimension::ALL {
            let Some(rating) = shoe.rating(dimension) else {
                continue;
            };
            let overridden = gap_dimension.and_then(|d| d.feel_dimension()) == Some(dimension);
            if overridden {
                if let Some(points) = self.feel_gap_points(dimension, rating) {
                    push(ScoreComponent::FeelGap, points);
                }
                continue;
            }
            let preference = self.request.preferences.for_dimension(dimension);
            if let Some(points) =
                preference_points(preference, self.request.targets.get(dimension), rating)
            {
                push(dimension.into(), points);
            }
        }

        if let Some(bucket) = shoe.drop_bucket() {
            if gap_dimension == Some(FeelGapDimension::Drop) {
                if let Some(points) = self.drop_gap_points(bucket) {
                    push(ScoreComponent::FeelGap, points);
                }
            } else if let Some(target) = self.request.drop_target {
                push(ScoreComponent::HeelDrop, drop_points(target, bucket));
            }
        }

        for (component, points) in [
            (ScoreComponent::ExperienceFit, self.experience_points(shoe)),
            (ScoreComponent::GoalFit, self.goal_points(shoe)),
            (ScoreComponent::PatternFit, self.pattern_points(shoe)),
            (ScoreComponent::BodyWeightFit, self.body_weight_points(shoe)),
            (ScoreComponent::TrailFit, self.trail_points(shoe)),
            (ScoreComponent::Sentiment, self.sentiment_points(shoe)),
            (ScoreComponent::Contrast, self.contrast_points(shoe)),
        ] {
            if points != 0 {
                push(component, points);
            }
        }

        let total: i32 = breakdown.iter().map(|t| t.points).sum();
        Some(ScoredCandidate {
            shoe,
            score: total.max(0),
            breakdown,
        })
    }

    fn archetype_points(&self, shoe: &Shoe) -> i32 {
        let served = self
            .request
            .archetypes
            .iter()
            .filter(|a| shoe.serves(**a))
            .count();
        if served >= 2 {
            ARCHETYPE_MULTI_MATCH
        } else {
            ARCHETYPE_MATCH
        }
    }

    fn feel_gap_points(&self, dimension: FeelDimension, rating: u8) -> Option<i32> {
        let gap = self.request.feel_gap?;
        match gap.direction {
            GapDirection::FavorHigh => Some(toward_target(5, rating)),
            GapDirection::FavorLow => Some(toward_target(1, rating)),
            GapDirection::FavorVariety => {
                let average = self.request.contrast?.average(dimension)?;
                Some(variety_points((f64::from(rating) - average).abs()))
            }
        }
    }

    fn drop_gap_points(&self, bucket: DropBucket) -> Option<i32> {
        let gap = self.request.feel_gap?;
        match gap.direction {
            GapDirection::FavorLow => Some(toward_target_bucket(DropBucket::Low, bucket)),
            GapDirection::FavorHigh => Some(toward_target_bucket(DropBucket::High, bucket)),
            GapDirection::FavorVariety => {
                let average = self.request.contrast?.heel_drop_mm?;
                let distance = DropBucket::from_mm(average).distance(bucket);
                Some(variety_points(f64::from(distance)))
            }
        }
    }

    fn experience_points(&self, shoe: &Shoe) -> i32 {
        if shoe.experience_levels.is_empty() {
            return 0;
        }
        if shoe
            .experience_levels
            .contains(&self.request.profile.experience_level)
        {
            5
        } else {
            -5
        }
    }

    fn goal_points(&self, shoe: &Shoe) -> i32 {
        let rated = |d: FeelDimension, min: u8| shoe.rating(d).is_some_and(|r| r >= min);
        match self.request.profile.primary_goal {
            PrimaryGoal::RaceTraining | PrimaryGoal::GetFaster => {
                if shoe.has_plate || rated(FeelDimension::Bounce, 4) {
                    5
                } else {
                    0
                }
            }
            PrimaryGoal::InjuryComeback => {
                if rated(FeelDimension::Cushion, 4) || rated(FeelDimension::Stability, 4) {
                    5
                } else {
                    0
                }
            }
            PrimaryGoal::GeneralFitness => {
                if shoe.serves(Archetype::DailyTrainer) {
                    3
                } else {
                    0
                }
            }
        }
    }

    fn pattern_points(&self, shoe: &Shoe) -> i32 {
        match self.request.profile.running_pattern {
            RunningPattern::StructuredTraining | RunningPattern::WorkoutFocused => {
                if shoe.serves(Archetype::WorkoutShoe) {
                    4
                } else {
                    0
                }
            }
            RunningPattern::MostlyEasy | RunningPattern::Infrequent => {
                if shoe.serves(Archetype::DailyTrainer) || shoe.serves(Archetype::RecoveryShoe) {
                    3
                } else {
                    0
                }
            }
        }
    }

    fn body_weight_points(&self, shoe: &Shoe) -> i32 {
        match self.request.profile.body_weight_kg {
            Some(kg) if kg >= HEAVY_RUNNER_KG => {
                if shoe.heavy_runner_friendly {
                    6
                } else {
                    0
                }
            }
            Some(kg) if kg < LIGHT_RUNNER_KG => {
                if shoe.weight_g.is_some_and(|g| g < LIGHT_SHOE_G) {
                    3
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    fn trail_points(&self, shoe: &Shoe) -> i32 {
        if !shoe.is_trail_shoe {
            return 0;
        }
        let profile = self.request.profile;
        if profile.mostly_trails() {
            8
        } else if profile.runs_trails() {
            4
        } else {
            0
        }
    }

    fn sentiment_points(&self, shoe: &Shoe) -> i32 {
        let mut points = 0;
        for resolved in &self.request.rotation.shoes {
            let owned = resolved.owned;
            let love_weight = match owned.sentiment {
                Sentiment::Love => LOVE_TAG,
                Sentiment::Like | Sentiment::Neutral => LIKE_TAG,
                Sentiment::Dislike => 0,
            };
            points += owned
                .loved_feel()
                .iter()
                .filter(|t| t.matches(shoe))
                .count() as i32
                * love_weight;
            points += owned
                .disliked_feel()
                .iter()
                .filter(|t| t.matches(shoe))
                .count() as i32
                * DISLIKE_TAG;

            if feels_alike(shoe, resolved.shoe) {
                points += match owned.sentiment {
                    Sentiment::Love => SIMILAR_TO_LOVED,
                    Sentiment::Dislike => SIMILAR_TO_DISLIKED,
                    Sentiment::Like | Sentiment::Neutral => 0,
                };
            }
        }
        points.clamp(SENTIMENT_MIN, SENTIMENT_MAX)
    }

    fn contrast_points(&self, shoe: &Shoe) -> i32 {
        let Some(contrast) = self.request.contrast else {
            return 0;
        };
        FeelDimension::ALL
            .into_iter()
            .filter_map(|d| {
                let rating = f64::from(shoe.rating(d)?);
                let average = contrast.average(d)?;
                let distance = (rating - average).abs();
                Some(if distance >= 2.0 {
                    CONTRAST_FAR
                } else if distance >= 1.0 {
                    CONTRAST_NEAR
                } else {
                    0
                })
            })
            .sum()
    }
}

fn toward_target(target: u8, rating: u8) -> i32 {
    FEEL_GAP_BASE - FEEL_GAP_STEP * i32::from(target.abs_diff(rating))
}

fn toward_target_bucket(target: DropBucket, bucket: DropBucket) -> i32 {
    FEEL_GAP_BASE - FEEL_GAP_STEP * i32::from(target.distance(bucket))
}

fn variety_points(distance: f64) -> i32 {
    if distance >= 2.0 {
        VARIETY_FAR
    } else if distance >= 1.0 {
        VARIETY_NEAR
    } else {
        VARIETY_SAME
    }
}
