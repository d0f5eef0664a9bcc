use crate::models::{
    ComparisonLabel, DropBucket, FeelDimension, RecommendedShoe, ScoredCandidate, Shoe,
};

/// Number of shoes returned per request
pub const PICK_COUNT: usize = 3;

/// Shoes with identical ratings and drops this close are treated as the same ride
const DUPLICATE_DROP_MM: f64 = 1.0;
/// Bucket distance from the requested drop that forces the trade-off slot
const TRADE_OFF_DROP_DISTANCE: u8 = 2;

/// Same brand and model family, or an identical feel at nearly the same drop
pub fn near_duplicate(a: &Shoe, b: &Shoe) -> bool {
    if a.brand.eq_ignore_ascii_case(&b.brand) && a.model_family() == b.model_family() {
        return true;
    }

    let same_feel = FeelDimension::ALL.iter().all(|d| {
        let (x, y) = (a.rating(*d), b.rating(*d));
        x.is_some() && x == y
    });
    let similar_drop = match (a.heel_drop_mm, b.heel_drop_mm) {
        (Some(x), Some(y)) => (x - y).abs() <= DUPLICATE_DROP_MM,
        _ => false,
    };
    same_feel && similar_drop
}

/// Picks a diverse top three and orders them for presentation
pub struct RecommendationSelector {
    drop_target: Option<DropBucket>,
}

impl RecommendationSelector {
    pub fn new(drop_target: Option<DropBucket>) -> Self {
        Self { drop_target }
    }

    fn is_trade_off(&self, shoe: &Shoe) -> bool {
        match (self.drop_target, shoe.drop_bucket()) {
            (Some(target), Some(bucket)) => target.distance(bucket) >= TRADE_OFF_DROP_DISTANCE,
            _ => false,
        }
    }

    /// Diverse picks in score order, back-filled when diversity starves the list
    pub fn pick<'s>(
        &self,
        mut candidates: Vec<ScoredCandidate<'s>>,
    ) -> Vec<ScoredCandidate<'s>> {
        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.shoe.shoe_id.cmp(&b.shoe.shoe_id))
        });

        let mut picked: Vec<ScoredCandidate<'s>> = Vec::with_capacity(PICK_COUNT);
        let mut skipped = Vec::new();
        for candidate in candidates {
            if picked.len() == PICK_COUNT {
                break;
            }
            if picked.iter().any(|p| near_duplicate(p.shoe, candidate.shoe)) {
                tracing::debug!(shoe_id = %candidate.shoe.shoe_id, "Skipping near duplicate");
                skipped.push(candidate);
            } else {
                picked.push(candidate);
            }
        }

        if picked.len() < PICK_COUNT {
            let missing = PICK_COUNT - picked.len();
            picked.extend(skipped.into_iter().take(missing));
            picked.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| a.shoe.shoe_id.cmp(&b.shoe.shoe_id))
            });
        }

        picked
    }

    /// Labels picks and returns them in presentation order: second, best, third
    pub fn select(&self, candidates: Vec<ScoredCandidate<'_>>) -> Vec<RecommendedShoe> {
        let picked = self.pick(candidates);

        let ranked: Vec<(usize, ScoredCandidate<'_>)> = picked
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i + 1, c))
            .collect();
        let (mut ordered, trade_offs): (Vec<_>, Vec<_>) = ranked
            .into_iter()
            .partition(|(_, c)| !self.is_trade_off(c.shoe));
        let regular = ordered.len();
        ordered.extend(trade_offs);

        let mut recommendations: Vec<RecommendedShoe> = ordered
            .into_iter()
            .enumerate()
            .map(|(position, (rank, candidate))| {
                let label = if position >= regular {
                    ComparisonLabel::TradeOff
                } else {
                    match position {
                        0 => ComparisonLabel::ClosestMatch,
                        1 => ComparisonLabel::CloseMatch,
                        _ => ComparisonLabel::TradeOff,
                    }
                };
                recommend(candidate, rank, label)
            })
            .collect();

        if recommendations.len() >= 2 {
            recommendations.swap(0, 1);
        }
        recommendations
    }
}

fn recommend(
    candidate: ScoredCandidate<'_>,
    rank: usize,
    label: ComparisonLabel,
) -> RecommendedShoe {
    let shoe = candidate.shoe;
    RecommendedShoe {
        shoe_id: shoe.shoe_id.clone(),
        name: shoe.display_name(),
        brand: shoe.brand.clone(),
        archetypes: shoe.archetypes(),
        score: candidate.score,
        rank,
        label,
        heel_drop_mm: shoe.heel_drop_mm,
        retail_price_usd: shoe.retail_price_usd,
        breakdown: candidate.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::shoe;

    fn candidate(shoe: &Shoe, score: i32) -> ScoredCandidate<'_> {
        ScoredCandidate {
            shoe,
            score,
            breakdown: Vec::new(),
        }
    }

    fn distinct(id: &str, cushion: u8) -> Shoe {
        let mut s = shoe(id);
        s.brand = id.to_string();
        s.cushion_softness = Some(cushion);
        s
    }

    #[test]
    fn test_presentation_order_and_labels() {
        let a = distinct("a", 1);
        let b = distinct("b", 2);
        let c = distinct("c", 3);
        let d = distinct("d", 4);
        let picks = RecommendationSelector::new(None).select(vec![
            candidate(&d, 10),
            candidate(&a, 90),
            candidate(&c, 50),
            candidate(&b, 70),
        ]);

        let ids: Vec<&str> = picks.iter().map(|p| p.shoe_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(picks[1].label, ComparisonLabel::ClosestMatch);
        assert_eq!(picks[1].rank, 1);
        assert_eq!(picks[0].label, ComparisonLabel::CloseMatch);
        assert_eq!(picks[2].label, ComparisonLabel::TradeOff);
    }

    #[test]
    fn test_ties_break_by_shoe_id() {
        let z = distinct("z", 1);
        let m = distinct("m", 2);
        let a = distinct("a", 3);
        let picked = RecommendationSelector::new(None).pick(vec![
            candidate(&z, 50),
            candidate(&m, 50),
            candidate(&a, 50),
        ]);
        let ids: Vec<&str> = picked.iter().map(|p| p.shoe.shoe_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_near_duplicates_are_skipped() {
        let mut v41 = shoe("pegasus-41");
        v41.brand = "Nike".to_string();
        v41.model = "Pegasus 41".to_string();
        let mut v40 = v41.clone();
        v40.shoe_id = "pegasus-40".to_string();
        v40.model = "Pegasus 40".to_string();
        v40.cushion_softness = Some(2);
        let other = distinct("other", 4);
        let another = distinct("another", 5);

        let picked = RecommendationSelector::new(None).pick(vec![
            candidate(&v41, 90),
            candidate(&v40, 85),
            candidate(&other, 60),
            candidate(&another, 50),
        ]);
        let ids: Vec<&str> = picked.iter().map(|p| p.shoe.shoe_id.as_str()).collect();
        assert_eq!(ids, vec!["pegasus-41", "other", "another"]);
    }

    #[test]
    fn test_identical_feel_is_a_duplicate() {
        let a = distinct("a", 3);
        let mut b = distinct("b", 3);
        b.heel_drop_mm = Some(9.0);
        let mut c = distinct("c", 3);
        c.heel_drop_mm = Some(12.0);
        assert!(near_duplicate(&a, &b));
        assert!(!near_duplicate(&a, &c));
    }

    #[test]
    fn test_back_fills_when_diversity_starves() {
        let a = distinct("a", 3);
        let mut b = distinct("b", 3);
        b.heel_drop_mm = Some(8.5);
        let c = distinct("c", 4);

        let picked = RecommendationSelector::new(None).pick(vec![
            candidate(&a, 90),
            candidate(&b, 80),
            candidate(&c, 70),
        ]);
        let ids: Vec<&str> = picked.iter().map(|p| p.shoe.shoe_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_far_drop_is_forced_to_trade_off() {
        let mut best = distinct("best", 1);
        best.heel_drop_mm = Some(0.0);
        let mut second = distinct("second", 2);
        second.heel_drop_mm = Some(8.0);
        let mut third = distinct("third", 3);
        third.heel_drop_mm = Some(10.0);

        let picks = RecommendationSelector::new(Some(DropBucket::Mid)).select(vec![
            candidate(&best, 90),
            candidate(&second, 80),
            candidate(&third, 70),
        ]);

        let by_id = |id: &str| picks.iter().find(|p| p.shoe_id == id).unwrap();
        assert_eq!(by_id("best").label, ComparisonLabel::TradeOff);
        assert_eq!(by_id("best").rank, 1);
        assert_eq!(by_id("second").label, ComparisonLabel::ClosestMatch);
        assert_eq!(by_id("third").label, ComparisonLabel::CloseMatch);
        assert_eq!(picks[1].shoe_id, "second");
        assert_eq!(picks[2].shoe_id, "best");
    }
}
