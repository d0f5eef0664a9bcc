//! Natural-language summary of a rotation analysis.
//!
//! The text comes from an external service behind the [`ProseGenerator`]
//! trait. Its output never influences the analysis itself: on timeout, error
//! or malformed output a deterministic local template is used instead.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::{
    Archetype, ProseSource, RotationHealth, RunnerProfile, TierClassification,
};

pub mod fallback;
pub mod http;

pub use fallback::template_prose;
pub use http::HttpProseGenerator;

/// Minimum length of generated prose we accept
pub const MIN_PROSE_CHARS: usize = 20;
/// Maximum strengths or improvements returned to the caller
pub const MAX_POINTS: usize = 3;

/// An owned shoe as the prose service sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProseShoe {
    pub name: String,
    pub archetypes: BTreeSet<Archetype>,
    pub misuse: bool,
}

/// Request body sent to the prose service
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProseInput {
    pub health: RotationHealth,
    pub tier: TierClassification,
    pub owned_shoes: Vec<ProseShoe>,
    pub profile: RunnerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProseOutput {
    pub prose: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl ProseOutput {
    /// Rejects output too thin or too long to show the runner
    pub fn validate(&self) -> Result<(), String> {
        if self.prose.trim().chars().count() < MIN_PROSE_CHARS {
            return Err(format!(
                "prose shorter than {} characters",
                MIN_PROSE_CHARS
            ));
        }
        if self.strengths.len() > MAX_POINTS {
            return Err(format!("{} strengths (max {})", self.strengths.len(), MAX_POINTS));
        }
        if self.improvements.len() > MAX_POINTS {
            return Err(format!(
                "{} improvements (max {})",
                self.improvements.len(),
                MAX_POINTS
            ));
        }
        if self
            .strengths
            .iter()
            .chain(&self.improvements)
            .any(|s| s.trim().is_empty())
        {
            return Err("empty strength or improvement".to_string());
        }
        Ok(())
    }
}

/// External prose generation service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProseGenerator: Send + Sync {
    async fn generate(&self, input: &ProseInput) -> AppResult<ProseOutput>;

    /// Generator name for logging
    fn name(&self) -> &'static str;
}

/// Calls the generator if one is configured, falling back to the template
///
/// Never fails: every error path yields the template with
/// [`ProseSource::Fallback`].
pub async fn generate_with_fallback(
    generator: Option<&dyn ProseGenerator>,
    input: &ProseInput,
    timeout: Duration,
) -> (ProseOutput, ProseSource) {
    let Some(generator) = generator else {
        return (template_prose(input), ProseSource::Fallback);
    };

    match tokio::time::timeout(timeout, generator.generate(input)).await {
        Ok(Ok(output)) => match output.validate() {
            Ok(()) => {
                tracing::debug!(generator = generator.name(), "Prose generated");
                return (output, ProseSource::Generated);
            }
            Err(reason) => {
                tracing::warn!(
                    generator = generator.name(),
                    reason = %reason,
                    "Generated prose rejected, using template"
                );
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(
                generator = generator.name(),
                error = %e,
                "Prose generation failed, using template"
            );
        }
        Err(_) => {
            tracing::warn!(
                generator = generator.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Prose generation timed out, using template"
            );
        }
    }

    (template_prose(input), ProseSource::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Confidence, ExperienceLevel, PrimaryGoal, RunningPattern, Slot, Tier};

    fn input(shoe_count: usize, overall: u8) -> ProseInput {
        ProseInput {
            health: RotationHealth {
                coverage: overall,
                variety: overall,
                load_resilience: overall,
                goal_alignment: overall,
                overall,
            },
            tier: TierClassification {
                tier: Tier::GenuineGap,
                confidence: Confidence::High,
                primary: Slot::new(Archetype::DailyTrainer, "You need a daily trainer."),
                secondary: None,
                tier_reason: "Your rotation doesn't cover the kinds of running you do."
                    .to_string(),
            },
            owned_shoes: (0..shoe_count)
                .map(|i| ProseShoe {
                    name: format!("Shoe {}", i),
                    archetypes: [Archetype::DailyTrainer].into(),
                    misuse: false,
                })
                .collect(),
            profile: RunnerProfile::new(
                ExperienceLevel::Intermediate,
                PrimaryGoal::GeneralFitness,
                RunningPattern::MostlyEasy,
            ),
        }
    }

    fn output(prose: &str) -> ProseOutput {
        ProseOutput {
            prose: prose.to_string(),
            strengths: vec!["Solid daily trainer".to_string()],
            improvements: vec![],
        }
    }

    #[test]
    fn test_validate_limits() {
        assert!(output("A perfectly reasonable summary.").validate().is_ok());
        assert!(output("Too short").validate().is_err());

        let mut crowded = output("A perfectly reasonable summary.");
        crowded.improvements = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert!(crowded.validate().is_err());
    }

    #[tokio::test]
    async fn test_generated_prose_is_used() {
        let mut generator = MockProseGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok(output("Your rotation is nicely balanced overall.")));
        generator.expect_name().return_const("mock");

        let (prose, source) =
            generate_with_fallback(Some(&generator), &input(2, 80), Duration::from_secs(1)).await;
        assert_eq!(source, ProseSource::Generated);
        assert_eq!(prose.prose, "Your rotation is nicely balanced overall.");
    }

    #[tokio::test]
    async fn test_error_falls_back_to_template() {
        let mut generator = MockProseGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(AppError::ExternalApi("boom".to_string())));
        generator.expect_name().return_const("mock");

        let input = input(2, 80);
        let (prose, source) =
            generate_with_fallback(Some(&generator), &input, Duration::from_secs(1)).await;
        assert_eq!(source, ProseSource::Fallback);
        assert_eq!(prose, template_prose(&input));
    }

    #[tokio::test]
    async fn test_malformed_output_falls_back() {
        let mut generator = MockProseGenerator::new();
        generator.expect_generate().returning(|_| Ok(output("meh")));
        generator.expect_name().return_const("mock");

        let (_, source) =
            generate_with_fallback(Some(&generator), &input(1, 40), Duration::from_secs(1)).await;
        assert_eq!(source, ProseSource::Fallback);
    }

    struct SlowGenerator;

    #[async_trait::async_trait]
    impl ProseGenerator for SlowGenerator {
        async fn generate(&self, _input: &ProseInput) -> AppResult<ProseOutput> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(output("This arrives far too late to be used."))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let (_, source) =
            generate_with_fallback(Some(&SlowGenerator), &input(3, 90), Duration::from_millis(20))
                .await;
        assert_eq!(source, ProseSource::Fallback);
    }

    #[test]
    fn test_no_generator_uses_template() {
        let input = input(0, 20);
        let (prose, source) =
            tokio_test::block_on(generate_with_fallback(None, &input, Duration::from_secs(1)));
        assert_eq!(source, ProseSource::Fallback);
        assert!(prose.validate().is_ok());
    }
}
