//! Deterministic ranking of similarity scores
//!
//! Turns the unordered score map from the engine into a bounded, ordered
//! result list. Map iteration order must not leak into output: results sort
//! by descending score, with ties broken by ascending candidate name.

use crate::engine::ScoreMap;
use serde::Serialize;

/// One ranked result: a candidate name and its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub score: f64,
}

/// Rank a score map, keeping at most `topk` results.
///
/// Pure and total: the input is not mutated, equal inputs produce identical
/// output, and `topk` of zero yields an empty list rather than an error.
pub fn rank(scores: &ScoreMap, topk: usize) -> Vec<RankedItem> {
    let mut items: Vec<RankedItem> = scores
        .iter()
        .map(|(name, score)| RankedItem {
            name: name.clone(),
            score: *score,
        })
        .collect();

    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.name.cmp(&b.name))
    });

    items.truncate(topk);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> ScoreMap {
        pairs
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect()
    }

    #[test]
    fn test_rank_sorts_descending() {
        let map = scores(&[("a.jpeg", 0.1), ("b.jpeg", 0.8), ("c.jpeg", 0.5)]);
        let ranked = rank(&map, 10);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].name, "b.jpeg");
        assert_eq!(ranked[1].name, "c.jpeg");
        assert_eq!(ranked[2].name, "a.jpeg");
    }

    #[test]
    fn test_rank_length_is_min_of_topk_and_map_size() {
        let map = scores(&[("a.jpeg", 0.1), ("b.jpeg", 0.8), ("c.jpeg", 0.5)]);

        assert_eq!(rank(&map, 2).len(), 2);
        assert_eq!(rank(&map, 3).len(), 3);
        assert_eq!(rank(&map, 100).len(), 3);
    }

    #[test]
    fn test_rank_topk_zero_is_empty() {
        let map = scores(&[("a.jpeg", 0.1)]);
        assert!(rank(&map, 0).is_empty());
    }

    #[test]
    fn test_rank_empty_map_is_empty() {
        let map = ScoreMap::new();
        assert!(rank(&map, 0).is_empty());
        assert!(rank(&map, 5).is_empty());
    }

    #[test]
    fn test_ties_break_by_ascending_name() {
        // b.jpeg and c.jpeg tie on score, b.jpeg wins on name
        let map = scores(&[("c.jpeg", 0.8), ("a.jpeg", 0.1), ("b.jpeg", 0.8)]);
        let ranked = rank(&map, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], RankedItem { name: "b.jpeg".to_string(), score: 0.8 });
        assert_eq!(ranked[1], RankedItem { name: "c.jpeg".to_string(), score: 0.8 });
    }

    #[test]
    fn test_rank_is_deterministic_across_insertion_orders() {
        let forward = scores(&[("a.jpeg", 0.4), ("b.jpeg", 0.4), ("c.jpeg", 0.4)]);
        let reverse = scores(&[("c.jpeg", 0.4), ("b.jpeg", 0.4), ("a.jpeg", 0.4)]);

        assert_eq!(rank(&forward, 3), rank(&reverse, 3));
    }

    #[test]
    fn test_rank_does_not_consume_input() {
        let map = scores(&[("a.jpeg", 0.1), ("b.jpeg", 0.8)]);
        let first = rank(&map, 1);
        let second = rank(&map, 1);

        assert_eq!(map.len(), 2);
        assert_eq!(first, second);
    }
}
