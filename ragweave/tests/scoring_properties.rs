//! Property-based tests for reranking and selection using proptest.

use proptest::prelude::*;

use ragweave::scoring::{threshold, topk, weighted_average};

/// Chunks `c0..cn` with scores in `[0, 1]` on a 1/100 grid, so ties are common.
fn scored_chunks() -> impl Strategy<Value = (Vec<String>, Vec<f64>)> {
    prop::collection::vec(0u32..=100, 0..12).prop_map(|raw| {
        let chunks = (0..raw.len()).map(|i| format!("c{}", i)).collect();
        let scores = raw.into_iter().map(|s| f64::from(s) / 100.0).collect();
        (chunks, scores)
    })
}

/// Like [`scored_chunks`] but roughly a quarter of the scores are NaN.
fn scored_chunks_with_nan() -> impl Strategy<Value = (Vec<String>, Vec<f64>)> {
    prop::collection::vec(prop::option::weighted(0.75, 0u32..=100), 0..64).prop_map(|raw| {
        let chunks = (0..raw.len()).map(|i| format!("c{}", i)).collect();
        let scores = raw
            .into_iter()
            .map(|s| s.map_or(f64::NAN, |s| f64::from(s) / 100.0))
            .collect();
        (chunks, scores)
    })
}

fn is_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|s| it.any(|f| f == s))
}

proptest! {
    #[test]
    fn threshold_keeps_exactly_scores_at_or_above_min(
        (chunks, scores) in scored_chunks(),
        min in 0u32..=100,
    ) {
        let min = f64::from(min) / 100.0;
        let expected = scores.iter().filter(|s| **s >= min).count();
        let (kept, kept_scores) = threshold(chunks.clone(), scores, min);
        prop_assert_eq!(kept.len(), expected);
        prop_assert_eq!(kept.len(), kept_scores.len());
        prop_assert!(kept_scores.iter().all(|s| *s >= min));
        prop_assert!(is_subsequence(&kept, &chunks));
    }

    #[test]
    fn topk_is_sorted_bounded_and_stable(
        (chunks, scores) in scored_chunks(),
        k in 0usize..15,
    ) {
        let (top, top_scores) = topk(chunks.clone(), scores.clone(), k);
        prop_assert_eq!(top.len(), k.min(chunks.len()));
        prop_assert!(top_scores.windows(2).all(|w| w[0] >= w[1]));
        // Equal scores keep input order.
        for (i, w) in top_scores.windows(2).enumerate() {
            if w[0] == w[1] {
                let a: usize = top[i][1..].parse().unwrap();
                let b: usize = top[i + 1][1..].parse().unwrap();
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn topk_is_idempotent((chunks, scores) in scored_chunks(), k in 0usize..15) {
        let once = topk(chunks, scores, k);
        let twice = topk(once.0.clone(), once.1.clone(), k);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn topk_ranks_nan_scores_after_numbers(
        (chunks, scores) in scored_chunks_with_nan(),
        k in 0usize..70,
    ) {
        let (top, top_scores) = topk(chunks.clone(), scores.clone(), k);
        prop_assert_eq!(top.len(), k.min(chunks.len()));
        let finite = top_scores.iter().take_while(|s| !s.is_nan()).count();
        prop_assert!(top_scores[finite..].iter().all(|s| s.is_nan()));
        prop_assert_eq!(finite, k.min(scores.iter().filter(|s| !s.is_nan()).count()));
        prop_assert!(top_scores[..finite].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn weighted_average_is_always_finite(
        (_, a) in scored_chunks_with_nan(),
        w in -10i32..=10,
    ) {
        let b: Vec<f64> = a.iter().map(|s| s * 1e308).collect();
        let w = f64::from(w);
        let out = weighted_average(&[a, b], &[w, 1.0 - w]).unwrap();
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn single_strategy_with_unit_weight_is_identity((_, scores) in scored_chunks()) {
        let out = weighted_average(&[scores.clone()], &[1.0]).unwrap();
        prop_assert_eq!(out, scores);
    }

    #[test]
    fn weighted_average_stays_between_strategy_scores(
        (_, a) in scored_chunks(),
        w in 0u32..=10,
    ) {
        let b: Vec<f64> = a.iter().map(|s| 1.0 - s).collect();
        let w = f64::from(w) / 10.0;
        let out = weighted_average(&[a.clone(), b.clone()], &[w, 1.0 - w]).unwrap();
        prop_assert_eq!(out.len(), a.len());
        for ((o, x), y) in out.iter().zip(&a).zip(&b) {
            prop_assert!(*o >= x.min(*y) - 1e-12 && *o <= x.max(*y) + 1e-12);
        }
    }
}
