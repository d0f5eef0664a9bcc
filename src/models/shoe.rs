use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Archetype, DropBucket, ExperienceLevel, FeelDimension};

/// A catalogue record. Immutable once the catalogue is loaded.
///
/// Numeric feel ratings are optional: a record that omits one is excluded from
/// scoring along that dimension instead of being assigned a guessed value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shoe {
    pub shoe_id: String,
    pub brand: String,
    pub model: String,

    #[serde(default)]
    pub is_daily_trainer: bool,
    #[serde(default)]
    pub is_recovery_shoe: bool,
    #[serde(default)]
    pub is_workout_shoe: bool,
    #[serde(default)]
    pub is_race_shoe: bool,
    #[serde(default)]
    pub is_trail_shoe: bool,
    /// Multi-archetype trainer; stands in for daily, workout and recovery roles
    #[serde(default)]
    pub is_super_trainer: bool,

    #[serde(default)]
    pub cushion_softness: Option<u8>,
    #[serde(default)]
    pub bounce: Option<u8>,
    #[serde(default)]
    pub stability: Option<u8>,
    #[serde(default)]
    pub rocker: Option<u8>,
    #[serde(default)]
    pub ground_feel: Option<u8>,
    #[serde(default)]
    pub weight_feel: Option<u8>,

    #[serde(default)]
    pub heel_drop_mm: Option<f64>,
    #[serde(default)]
    pub weight_g: Option<f64>,

    #[serde(default)]
    pub has_plate: bool,
    #[serde(default)]
    pub plate_material: Option<PlateMaterial>,
    #[serde(default)]
    pub price_tier: Option<PriceTier>,
    #[serde(default)]
    pub retail_price_usd: Option<f64>,
    #[serde(default = "default_available")]
    pub available: bool,

    /// Experience levels the shoe is well suited to (empty = no opinion)
    #[serde(default)]
    pub experience_levels: Vec<ExperienceLevel>,
    #[serde(default)]
    pub heavy_runner_friendly: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateMaterial {
    Carbon,
    Nylon,
    Pebax,
    Tpu,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    Mid,
    Premium,
    Elite,
}

impl PriceTier {
    /// Tier a retail price falls into (USD)
    pub fn for_price(price_usd: f64) -> Self {
        if price_usd < 100.0 {
            PriceTier::Budget
        } else if price_usd < 150.0 {
            PriceTier::Mid
        } else if price_usd < 200.0 {
            PriceTier::Premium
        } else {
            PriceTier::Elite
        }
    }

    /// The next tier up, saturating at Elite
    pub fn next(&self) -> Self {
        match self {
            PriceTier::Budget => PriceTier::Mid,
            PriceTier::Mid => PriceTier::Premium,
            PriceTier::Premium | PriceTier::Elite => PriceTier::Elite,
        }
    }
}

impl Shoe {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// Whether the shoe can fill the given role
    pub fn serves(&self, archetype: Archetype) -> bool {
        let flagged = match archetype {
            Archetype::DailyTrainer => self.is_daily_trainer,
            Archetype::RecoveryShoe => self.is_recovery_shoe,
            Archetype::WorkoutShoe => self.is_workout_shoe,
            Archetype::RaceShoe => self.is_race_shoe,
            Archetype::TrailShoe => self.is_trail_shoe,
        };
        flagged || (self.is_super_trainer && archetype.super_trainer_eligible())
    }

    /// Every role the shoe can fill, super-trainer expansion included
    pub fn archetypes(&self) -> BTreeSet<Archetype> {
        Archetype::ALL
            .into_iter()
            .filter(|a| self.serves(*a))
            .collect()
    }

    /// Race shoe with no other role (super trainers never count)
    pub fn is_race_only(&self) -> bool {
        self.is_race_shoe
            && !self.is_daily_trainer
            && !self.is_workout_shoe
            && !self.is_recovery_shoe
            && !self.is_super_trainer
    }

    /// Recovery shoe with no other role
    pub fn is_recovery_only(&self) -> bool {
        self.is_recovery_shoe
            && !self.is_daily_trainer
            && !self.is_workout_shoe
            && !self.is_race_shoe
            && !self.is_super_trainer
    }

    pub fn rating(&self, dimension: FeelDimension) -> Option<u8> {
        match dimension {
            FeelDimension::Cushion => self.cushion_softness,
            FeelDimension::Bounce => self.bounce,
            FeelDimension::Stability => self.stability,
            FeelDimension::Rocker => self.rocker,
            FeelDimension::GroundFeel => self.ground_feel,
        }
    }

    pub fn drop_bucket(&self) -> Option<DropBucket> {
        self.heel_drop_mm.map(DropBucket::from_mm)
    }

    /// Price tier from the record, falling back to the retail price
    pub fn effective_price_tier(&self) -> Option<PriceTier> {
        self.price_tier
            .or_else(|| self.retail_price_usd.map(PriceTier::for_price))
    }

    /// Model name with trailing version tokens removed ("Pegasus 41" -> "pegasus")
    pub fn model_family(&self) -> String {
        let mut tokens: Vec<&str> = self.model.split_whitespace().collect();
        while tokens.len() > 1 {
            let last = tokens[tokens.len() - 1];
            let is_version = last
                .trim_start_matches(['v', 'V'])
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.');
            if is_version {
                tokens.pop();
            } else {
                break;
            }
        }
        tokens.join(" ").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoe(model: &str) -> Shoe {
        serde_json::from_value(serde_json::json!({
            "shoeId": "test-shoe",
            "brand": "Test",
            "model": model,
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_fields_deserialize_as_absent() {
        let s = shoe("Runner");
        assert_eq!(s.cushion_softness, None);
        assert_eq!(s.heel_drop_mm, None);
        assert!(s.available);
        assert!(s.archetypes().is_empty());
    }

    #[test]
    fn test_super_trainer_serves_daily_workout_recovery_only() {
        let mut s = shoe("Versatile");
        s.is_super_trainer = true;

        let archetypes: Vec<Archetype> = s.archetypes().into_iter().collect();
        assert_eq!(
            archetypes,
            vec![
                Archetype::DailyTrainer,
                Archetype::RecoveryShoe,
                Archetype::WorkoutShoe
            ]
        );
        assert!(!s.serves(Archetype::RaceShoe));
        assert!(!s.serves(Archetype::TrailShoe));
    }

    #[test]
    fn test_race_only_excludes_multi_role_shoes() {
        let mut s = shoe("Fast");
        s.is_race_shoe = true;
        assert!(s.is_race_only());

        s.is_workout_shoe = true;
        assert!(!s.is_race_only());
    }

    #[test]
    fn test_model_family_strips_versions() {
        assert_eq!(shoe("Pegasus 41").model_family(), "pegasus");
        assert_eq!(shoe("Novablast v5").model_family(), "novablast");
        assert_eq!(shoe("Gel Nimbus 26").model_family(), "gel nimbus");
        assert_eq!(shoe("Clifton").model_family(), "clifton");
        assert_eq!(shoe("1080").model_family(), "1080");
    }

    #[test]
    fn test_price_tier_fallback_from_retail_price() {
        let mut s = shoe("Priced");
        s.retail_price_usd = Some(165.0);
        assert_eq!(s.effective_price_tier(), Some(PriceTier::Premium));

        s.price_tier = Some(PriceTier::Mid);
        assert_eq!(s.effective_price_tier(), Some(PriceTier::Mid));
    }

    #[test]
    fn test_price_tier_next_saturates() {
        assert_eq!(PriceTier::Budget.next(), PriceTier::Mid);
        assert_eq!(PriceTier::Elite.next(), PriceTier::Elite);
    }
}
