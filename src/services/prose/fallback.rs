//! Deterministic template prose, used whenever the generator is absent or fails.

use crate::models::RotationHealth;

use super::{ProseInput, ProseOutput, MAX_POINTS};

/// Dimension score from which a health dimension counts as a strength
const STRENGTH_MIN: u8 = 70;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
pub fn stable_hash(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

fn pick<'a>(variants: &[&'a str], seed: &str) -> &'a str {
    let index = (stable_hash(seed) % variants.len() as u64) as usize;
    variants[index]
}

const EMPTY_OPENINGS: [&str; 2] = [
    "You're building a rotation from scratch.",
    "There's no rotation to analyse yet, so this starts from the ground up.",
];
const STRONG_OPENINGS: [&str; 3] = [
    "Your rotation is in great shape.",
    "You've put together a well-rounded rotation.",
    "Your shoes already cover your running well.",
];
const FAIR_OPENINGS: [&str; 3] = [
    "Your rotation covers the basics.",
    "Your rotation is a solid start with room to grow.",
    "Your shoes handle most of your running.",
];
const WEAK_OPENINGS: [&str; 3] = [
    "Your rotation has some clear gaps.",
    "Your current shoes are stretched thin across your running.",
    "There's real room to strengthen your rotation.",
];

fn opening(input: &ProseInput, seed: &str) -> &'static str {
    if input.owned_shoes.is_empty() {
        return pick(&EMPTY_OPENINGS, seed);
    }
    match input.health.overall {
        80.. => pick(&STRONG_OPENINGS, seed),
        50..=79 => pick(&FAIR_OPENINGS, seed),
        _ => pick(&WEAK_OPENINGS, seed),
    }
}

fn strengths(health: &RotationHealth, input: &ProseInput) -> Vec<String> {
    if input.owned_shoes.is_empty() {
        return Vec::new();
    }
    let mut strengths = Vec::new();
    if health.coverage >= STRENGTH_MIN {
        strengths.push("Covers the kinds of running you do".to_string());
    }
    if health.variety >= STRENGTH_MIN {
        strengths.push("A good spread of feel across your shoes".to_string());
    }
    if health.load_resilience >= STRENGTH_MIN {
        strengths.push("Enough shoes to share your weekly load".to_string());
    }
    if health.goal_alignment >= STRENGTH_MIN {
        strengths.push(format!(
            "Well matched to your focus on {}",
            input.profile.primary_goal.label()
        ));
    }
    strengths.truncate(MAX_POINTS);
    strengths
}

fn improvements(input: &ProseInput) -> Vec<String> {
    let mut improvements = vec![input.tier.primary.reason.clone()];
    if let Some(secondary) = &input.tier.secondary {
        improvements.push(secondary.reason.clone());
    }
    improvements.extend(
        input
            .owned_shoes
            .iter()
            .filter(|s| s.misuse)
            .map(|s| format!("Save the {} for the runs it's built for", s.name)),
    );
    improvements.retain(|s| !s.trim().is_empty());
    improvements.dedup();
    improvements.truncate(MAX_POINTS);
    improvements
}

/// Fixed template keyed by shoe count and overall health
pub fn template_prose(input: &ProseInput) -> ProseOutput {
    let seed = format!("{}|{}", input.tier.tier_reason, input.tier.primary.reason);
    let prose = format!(
        "{} {} {}",
        opening(input, &seed),
        input.tier.tier_reason,
        input.tier.primary.reason
    )
    .trim()
    .to_string();

    ProseOutput {
        prose,
        strengths: strengths(&input.health, input),
        improvements: improvements(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Archetype, Confidence, ExperienceLevel, PrimaryGoal, RunnerProfile, RunningPattern, Slot,
        Tier, TierClassification,
    };
    use crate::services::prose::ProseShoe;

    fn input(names: &[&str], overall: u8) -> ProseInput {
        ProseInput {
            health: RotationHealth {
                coverage: overall,
                variety: overall,
                load_resilience: overall,
                goal_alignment: overall,
                overall,
            },
            tier: TierClassification {
                tier: Tier::Improvement,
                confidence: Confidence::Medium,
                primary: Slot::new(
                    Archetype::WorkoutShoe,
                    "A workout shoe would sharpen your speed days.",
                ),
                secondary: None,
                tier_reason: "Your rotation works but could be stronger.".to_string(),
            },
            owned_shoes: names
                .iter()
                .map(|name| ProseShoe {
                    name: name.to_string(),
                    archetypes: [Archetype::DailyTrainer].into(),
                    misuse: false,
                })
                .collect(),
            profile: RunnerProfile::new(
                ExperienceLevel::Experienced,
                PrimaryGoal::GetFaster,
                RunningPattern::StructuredTraining,
            ),
        }
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(stable_hash(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(stable_hash("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(stable_hash("rotation"), stable_hash("rotation"));
        assert_ne!(stable_hash("rotation"), stable_hash("Rotation"));
    }

    #[test]
    fn test_template_is_deterministic() {
        let input = input(&["Nike Pegasus 41"], 65);
        assert_eq!(template_prose(&input), template_prose(&input));
    }

    #[test]
    fn test_opening_keyed_by_health() {
        let strong = template_prose(&input(&["A", "B", "C"], 90));
        assert!(STRONG_OPENINGS.iter().any(|o| strong.prose.starts_with(o)));

        let weak = template_prose(&input(&["A"], 30));
        assert!(WEAK_OPENINGS.iter().any(|o| weak.prose.starts_with(o)));
        assert!(weak.strengths.is_empty());
    }

    #[test]
    fn test_empty_rotation_has_no_strengths() {
        let output = template_prose(&input(&[], 90));
        assert!(EMPTY_OPENINGS.iter().any(|o| output.prose.starts_with(o)));
        assert!(output.strengths.is_empty());
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_points_are_capped() {
        let mut input = input(&["Old Racer", "Other Racer"], 95);
        input.tier.secondary = Some(Slot::new(Archetype::RaceShoe, "A race shoe for race day."));
        for shoe in &mut input.owned_shoes {
            shoe.misuse = true;
        }

        let output = template_prose(&input);
        assert_eq!(output.strengths.len(), MAX_POINTS);
        assert_eq!(output.improvements.len(), MAX_POINTS);
        assert_eq!(
            output.improvements[2],
            "Save the Old Racer for the runs it's built for"
        );
        assert!(output.validate().is_ok());
    }
}
