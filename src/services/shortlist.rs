//! Hard filters over the catalogue, loosened step by step when too few shoes pass.

use std::collections::BTreeSet;

use crate::db::Catalogue;
use crate::error::{AppError, AppResult};
use crate::models::{
    Archetype, Constraints, DropBucket, PriceTier, Relaxation, RelaxationStep, Shoe,
    StabilityPreference,
};

use super::candidate_scorer::passes_archetype;

/// Shoes a recommendation needs to choose from
pub const MIN_CANDIDATES: usize = 3;

/// Strict filters allow this many buckets between requested and candidate drop
const DROP_TOLERANCE: u8 = 1;
const STABLE_MIN: u8 = 4;
const NEUTRAL_MAX: u8 = 3;

/// Applied in order while the pool is short. `brandOnly` is never relaxed.
pub const RELAXATION_ORDER: [Relaxation; 4] = [
    Relaxation::WidenHeelDrop,
    Relaxation::AdmitAdjacentPriceTier,
    Relaxation::IgnoreStabilityPreference,
    Relaxation::IgnoreMaxPrice,
];

pub struct ShortlistFilter<'a> {
    pub archetypes: &'a BTreeSet<Archetype>,
    pub constraints: &'a Constraints,
    pub drop_target: Option<DropBucket>,
    /// Owned shoes plus the one being replaced
    pub excluded_ids: BTreeSet<&'a str>,
}

#[derive(Debug)]
pub struct Shortlist<'s> {
    pub shoes: Vec<&'s Shoe>,
    pub relaxations: Vec<RelaxationStep>,
}

impl ShortlistFilter<'_> {
    fn is_active(&self, relaxation: Relaxation) -> bool {
        match relaxation {
            Relaxation::WidenHeelDrop => self.drop_target.is_some(),
            Relaxation::AdmitAdjacentPriceTier | Relaxation::IgnoreMaxPrice => {
                self.constraints.max_price.is_some()
            }
            Relaxation::IgnoreStabilityPreference => matches!(
                self.constraints.stability_preference,
                Some(StabilityPreference::Stable | StabilityPreference::Neutral)
            ),
        }
    }

    pub fn passes(&self, shoe: &Shoe, relaxed: &[Relaxation]) -> bool {
        shoe.available
            && !self.excluded_ids.contains(shoe.shoe_id.as_str())
            && passes_archetype(shoe, self.archetypes)
            && self.passes_brand(shoe)
            && self.passes_price(shoe, relaxed)
            && (relaxed.contains(&Relaxation::IgnoreStabilityPreference)
                || self.passes_stability(shoe))
            && (relaxed.contains(&Relaxation::WidenHeelDrop) || self.passes_drop(shoe))
    }

    fn passes_brand(&self, shoe: &Shoe) -> bool {
        match &self.constraints.brand_only {
            Some(brand) => shoe.brand.eq_ignore_ascii_case(brand.trim()),
            None => true,
        }
    }

    fn passes_price(&self, shoe: &Shoe, relaxed: &[Relaxation]) -> bool {
        let Some(max_price) = self.constraints.max_price else {
            return true;
        };
        if relaxed.contains(&Relaxation::IgnoreMaxPrice) {
            return true;
        }
        // Unknown prices are not excluded
        let within = shoe.retail_price_usd.map_or(true, |p| p <= max_price);
        if within {
            return true;
        }
        relaxed.contains(&Relaxation::AdmitAdjacentPriceTier)
            && shoe
                .effective_price_tier()
                .is_some_and(|tier| tier <= PriceTier::for_price(max_price).next())
    }

    fn passes_stability(&self, shoe: &Shoe) -> bool {
        match (self.constraints.stability_preference, shoe.stability) {
            (Some(StabilityPreference::Stable), Some(s)) => s >= STABLE_MIN,
            (Some(StabilityPreference::Neutral), Some(s)) => s <= NEUTRAL_MAX,
            _ => true,
        }
    }

    fn passes_drop(&self, shoe: &Shoe) -> bool {
        match (self.drop_target, shoe.drop_bucket()) {
            (Some(target), Some(bucket)) => target.distance(bucket) <= DROP_TOLERANCE,
            _ => true,
        }
    }

    fn collect<'s>(&self, catalogue: &'s Catalogue, relaxed: &[Relaxation]) -> Vec<&'s Shoe> {
        catalogue
            .shoes()
            .iter()
            .filter(|s| self.passes(s, relaxed))
            .collect()
    }
}

/// Filters the catalogue, relaxing constraints in order until enough shoes pass
pub fn build_shortlist<'s>(
    catalogue: &'s Catalogue,
    filter: &ShortlistFilter<'_>,
) -> AppResult<Shortlist<'s>> {
    let mut relaxed: Vec<Relaxation> = Vec::new();
    let mut steps = Vec::new();
    let mut shoes = filter.collect(catalogue, &relaxed);

    for relaxation in RELAXATION_ORDER {
        if shoes.len() >= MIN_CANDIDATES {
            break;
        }
        if !filter.is_active(relaxation) {
            continue;
        }

        relaxed.push(relaxation);
        let candidates_before = shoes.len();
        shoes = filter.collect(catalogue, &relaxed);
        let step = RelaxationStep {
            relaxation,
            candidates_before,
            candidates_after: shoes.len(),
        };

        tracing::info!(
            relaxation = ?step.relaxation,
            candidates_before = step.candidates_before,
            candidates_after = step.candidates_after,
            "Relaxed shortlist constraint"
        );
        steps.push(step);
    }

    if shoes.len() < MIN_CANDIDATES {
        let message = match &filter.constraints.brand_only {
            Some(brand) => format!(
                "only {} shoes match brandOnly \"{}\"; relax brandOnly to see more options",
                shoes.len(),
                brand
            ),
            None => format!(
                "only {} available shoes serve as a {}",
                shoes.len(),
                filter
                    .archetypes
                    .iter()
                    .map(|a| a.label())
                    .collect::<Vec<_>>()
                    .join(" or ")
            ),
        };
        tracing::warn!(candidates = shoes.len(), "{}", message);
        return Err(AppError::UnderConstrained(message));
    }

    Ok(Shortlist {
        shoes,
        relaxations: steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::catalogue;

    fn filter<'a>(
        archetypes: &'a BTreeSet<Archetype>,
        constraints: &'a Constraints,
    ) -> ShortlistFilter<'a> {
        ShortlistFilter {
            archetypes,
            constraints,
            drop_target: None,
            excluded_ids: BTreeSet::new(),
        }
    }

    fn ids(shortlist: &Shortlist<'_>) -> Vec<String> {
        shortlist.shoes.iter().map(|s| s.shoe_id.clone()).collect()
    }

    #[test]
    fn test_strict_filter_excludes_owned_and_unavailable() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::DailyTrainer].into();
        let constraints = Constraints::default();
        let mut f = filter(&archetypes, &constraints);
        f.excluded_ids.insert("nike-pegasus-41");

        let shortlist = build_shortlist(&catalogue, &f).unwrap();
        let ids = ids(&shortlist);
        assert!(!ids.contains(&"nike-pegasus-41".to_string()));
        assert!(!ids.contains(&"nike-pegasus-40".to_string()));
        assert!(ids.contains(&"brooks-ghost-16".to_string()));
        assert!(shortlist.relaxations.is_empty());
    }

    #[test]
    fn test_race_request_never_admits_super_trainers() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::RaceShoe].into();
        let constraints = Constraints::default();
        let shortlist = build_shortlist(&catalogue, &filter(&archetypes, &constraints)).unwrap();

        assert!(shortlist.shoes.iter().all(|s| s.is_race_shoe));
        assert!(!ids(&shortlist).contains(&"asics-superblast-2".to_string()));
    }

    #[test]
    fn test_relaxations_fire_in_order_and_are_recorded() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::RaceShoe].into();
        // Race shoes are all 5-8mm and $170+; ask for zero drop under $140
        let constraints = Constraints {
            brand_only: None,
            stability_preference: None,
            max_price: Some(140.0),
        };
        let mut f = filter(&archetypes, &constraints);
        f.drop_target = Some(DropBucket::Zero);

        let shortlist = build_shortlist(&catalogue, &f).unwrap();
        let fired: Vec<Relaxation> = shortlist.relaxations.iter().map(|s| s.relaxation).collect();
        assert_eq!(
            fired,
            vec![
                Relaxation::WidenHeelDrop,
                Relaxation::AdmitAdjacentPriceTier,
                Relaxation::IgnoreMaxPrice
            ]
        );
        assert_eq!(shortlist.relaxations[0].candidates_before, 0);
        // Magic Speed is premium, one tier above a $140 budget
        assert_eq!(shortlist.relaxations[1].candidates_after, 1);
        assert!(shortlist.shoes.len() >= MIN_CANDIDATES);
    }

    #[test]
    fn test_stable_race_request_drops_stability_preference() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::RaceShoe].into();
        // No race shoe rates above 2 for stability
        let constraints = Constraints {
            brand_only: None,
            stability_preference: Some(StabilityPreference::Stable),
            max_price: None,
        };
        let shortlist = build_shortlist(&catalogue, &filter(&archetypes, &constraints)).unwrap();

        assert_eq!(
            shortlist.relaxations,
            vec![RelaxationStep {
                relaxation: Relaxation::IgnoreStabilityPreference,
                candidates_before: 0,
                candidates_after: 5,
            }]
        );
        assert!(shortlist.shoes.iter().all(|s| s.is_race_shoe));
    }

    #[test]
    fn test_no_relaxation_when_strict_pool_is_large_enough() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::DailyTrainer].into();
        let constraints = Constraints {
            brand_only: None,
            stability_preference: Some(StabilityPreference::Stable),
            max_price: Some(150.0),
        };
        let shortlist = build_shortlist(&catalogue, &filter(&archetypes, &constraints)).unwrap();

        assert!(shortlist.relaxations.is_empty());
        assert!(shortlist.shoes.iter().all(|s| s.stability.unwrap_or(0) >= 4));
    }

    #[test]
    fn test_brand_only_is_never_relaxed() {
        let catalogue = catalogue();
        let archetypes: BTreeSet<Archetype> = [Archetype::TrailShoe].into();
        let constraints = Constraints {
            brand_only: Some("salomon".to_string()),
            stability_preference: None,
            max_price: None,
        };
        let err = build_shortlist(&catalogue, &filter(&archetypes, &constraints)).unwrap_err();

        match err {
            AppError::UnderConstrained(message) => assert!(message.contains("brandOnly")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_under_constrained_without_brand_names_archetype() {
        let catalogue = Catalogue::from_shoes(Vec::new()).unwrap();
        let archetypes: BTreeSet<Archetype> = [Archetype::TrailShoe].into();
        let constraints = Constraints::default();
        let err = build_shortlist(&catalogue, &filter(&archetypes, &constraints)).unwrap_err();
        assert!(err.to_string().contains("trail shoe"));
    }
}
