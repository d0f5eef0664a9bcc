//! Feel-gap detection and contrast profiling for exploration-tier rotations.
//!
//! Each segment has an ordered rule table; a rule's position in its table is
//! its priority. Every rule is evaluated, so the output lists all detected
//! gaps sorted by priority and the classifier takes the first one or two.

use crate::models::{
    Archetype, ContrastProfile, FeelDimension, FeelGap, FeelGapDimension, FeelTag, GapDirection,
    RunnerProfile, RunningPattern,
};

use super::rotation_analyzer::Rotation;

/// Heel drops within this many mm of each other count as a single drop profile
const DROP_CLUSTER_MM: f64 = 4.0;
const HIGH_DROP_MM: f64 = 8.0;
const LOW_DROP_MM: f64 = 4.0;

/// Inputs every feel-gap rule looks at
pub struct FeelGapContext<'a> {
    pub rotation: &'a Rotation<'a>,
    pub profile: &'a RunnerProfile,
}

/// A feel-gap check; receives the priority its table position assigns
pub type FeelGapRule = fn(&FeelGapContext<'_>, u8) -> Option<FeelGap>;

/// Beginner and injury-comeback ordering: protection before variety
pub const FOUNDATION_RULES: [FeelGapRule; 4] =
    [cushion_gap, stability_gap, daily_count_gap, drop_gap];

/// Default ordering for intermediate and faster runners
pub const ADVANCED_RULES: [FeelGapRule; 5] = [
    cushion_gap,
    bounce_gap,
    daily_count_gap,
    drop_gap,
    stability_gap,
];

/// All feel gaps for the rotation, most important first
pub fn detect_feel_gaps(rotation: &Rotation<'_>, profile: &RunnerProfile) -> Vec<FeelGap> {
    let context = FeelGapContext { rotation, profile };
    let rules: &[FeelGapRule] = if profile.in_foundation_segment() {
        &FOUNDATION_RULES
    } else {
        &ADVANCED_RULES
    };

    let mut gaps: Vec<FeelGap> = rules
        .iter()
        .enumerate()
        .filter_map(|(position, rule)| rule(&context, position as u8 + 1))
        .collect();
    gaps.sort_by_key(|g| g.priority);

    tracing::debug!(
        foundation = profile.in_foundation_segment(),
        gaps = ?gaps.iter().map(|g| g.dimension).collect::<Vec<_>>(),
        "Feel gaps detected"
    );

    gaps
}

pub fn cushion_gap(context: &FeelGapContext<'_>, priority: u8) -> Option<FeelGap> {
    let has_max_cushion = context
        .rotation
        .ratings(FeelDimension::Cushion)
        .contains(&5);
    if has_max_cushion {
        return None;
    }

    Some(FeelGap {
        dimension: FeelGapDimension::Cushion,
        priority,
        direction: GapDirection::FavorHigh,
        recommended_archetype: Archetype::RecoveryShoe,
        reason: "None of your shoes offers maximum cushioning. A max-cushion recovery shoe \
                 would give your legs a softer option on easy and recovery days."
            .to_string(),
    })
}

pub fn stability_gap(context: &FeelGapContext<'_>, priority: u8) -> Option<FeelGap> {
    let stabilities = context.rotation.ratings(FeelDimension::Stability);
    if stabilities.is_empty() || stabilities.iter().any(|&s| s > 2) {
        return None;
    }

    let profile = context.profile;
    let needs_support = profile.in_foundation_segment()
        || context.rotation.any_disliked(FeelTag::Unstable);
    if !needs_support {
        return None;
    }

    Some(FeelGap {
        dimension: FeelGapDimension::Stability,
        priority,
        direction: GapDirection::FavorHigh,
        recommended_archetype: Archetype::DailyTrainer,
        reason: "Every shoe you own is on the unstable end of the scale. A more stable daily \
                 trainer would add support as your legs tire."
            .to_string(),
    })
}

pub fn bounce_gap(context: &FeelGapContext<'_>, priority: u8) -> Option<FeelGap> {
    let has_bounce = context
        .rotation
        .ratings(FeelDimension::Bounce)
        .iter()
        .any(|&b| b >= 4);
    if has_bounce {
        return None;
    }

    let recommended_archetype =
        if context.profile.running_pattern == RunningPattern::StructuredTraining {
            Archetype::WorkoutShoe
        } else {
            Archetype::DailyTrainer
        };

    Some(FeelGap {
        dimension: FeelGapDimension::Bounce,
        priority,
        direction: GapDirection::FavorHigh,
        recommended_archetype,
        reason: format!(
            "Nothing in your rotation has real bounce. A springy {} would make faster running \
             feel more lively.",
            recommended_archetype.label()
        ),
    })
}

pub fn daily_count_gap(context: &FeelGapContext<'_>, priority: u8) -> Option<FeelGap> {
    if context.rotation.daily_trainer_count() != 1 {
        return None;
    }

    Some(FeelGap {
        dimension: FeelGapDimension::DailyCount,
        priority,
        direction: GapDirection::FavorVariety,
        recommended_archetype: Archetype::DailyTrainer,
        reason: "You rely on a single daily trainer. A second one with a different feel lets \
                 you alternate and spreads the impact across different foams."
            .to_string(),
    })
}

pub fn drop_gap(context: &FeelGapContext<'_>, priority: u8) -> Option<FeelGap> {
    let drops = context.rotation.heel_drops();
    if drops.is_empty() {
        return None;
    }

    let max = drops.iter().copied().fold(f64::MIN, f64::max);
    let min = drops.iter().copied().fold(f64::MAX, f64::min);
    if max - min > DROP_CLUSTER_MM {
        return None;
    }

    let average = drops.iter().sum::<f64>() / drops.len() as f64;
    let (direction, reason) = if average >= HIGH_DROP_MM {
        (
            GapDirection::FavorLow,
            format!(
                "All your shoes sit around {:.0} mm of drop. A lower-drop daily trainer would \
                 load your calves and feet a little differently.",
                average
            ),
        )
    } else if average <= LOW_DROP_MM {
        (
            GapDirection::FavorHigh,
            format!(
                "All your shoes sit around {:.0} mm of drop. A higher-drop daily trainer would \
                 ease the load on your calves and Achilles.",
                average
            ),
        )
    } else {
        (
            GapDirection::FavorVariety,
            format!(
                "All your shoes sit around {:.0} mm of drop. A daily trainer at either end of \
                 the drop range would vary how each run loads your legs.",
                average
            ),
        )
    };

    Some(FeelGap {
        dimension: FeelGapDimension::Drop,
        priority,
        direction,
        recommended_archetype: Archetype::DailyTrainer,
        reason,
    })
}

/// Reason used when the runner already owns the recommended archetype
pub fn within_archetype_reason(gap: &FeelGap) -> String {
    let target = match (gap.dimension, gap.direction) {
        (FeelGapDimension::Cushion, GapDirection::FavorHigh) => {
            "one with noticeably more cushion than anything you run in now"
        }
        (FeelGapDimension::Cushion, _) => "one with a firmer, more connected ride",
        (FeelGapDimension::Bounce, _) => "one with a livelier, bouncier foam",
        (FeelGapDimension::Stability, _) => "one with more stability",
        (FeelGapDimension::Rocker, _) => "one with a more pronounced rocker",
        (FeelGapDimension::Drop, GapDirection::FavorLow) => "one with a lower heel drop",
        (FeelGapDimension::Drop, GapDirection::FavorHigh) => "one with a higher heel drop",
        (FeelGapDimension::Drop, GapDirection::FavorVariety) => {
            "one with a clearly different heel drop"
        }
        (FeelGapDimension::DailyCount, _) => "one that feels clearly different underfoot",
    };

    format!(
        "You already have a {}, so this is about more variety within that archetype: {}.",
        gap.recommended_archetype.label(),
        target
    )
}

fn average(values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// The rotation's average feel
pub fn contrast_profile(rotation: &Rotation<'_>) -> ContrastProfile {
    let dimension_average = |d: FeelDimension| {
        average(rotation.ratings(d).into_iter().map(f64::from).collect())
    };

    ContrastProfile {
        cushion: dimension_average(FeelDimension::Cushion),
        stability: dimension_average(FeelDimension::Stability),
        bounce: dimension_average(FeelDimension::Bounce),
        rocker: dimension_average(FeelDimension::Rocker),
        ground_feel: dimension_average(FeelDimension::GroundFeel),
        heel_drop_mm: average(rotation.heel_drops()),
    }
}
