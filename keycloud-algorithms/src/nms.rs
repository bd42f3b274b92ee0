//! Radius-based non-maximum suppression of keypoint candidates
//!
//! Every point nominates the most salient candidate among itself and its
//! neighbors; every other candidate in that neighborhood is suppressed. All
//! decisions read the pre-suppression candidate flags, and suppressions are
//! applied together once every neighborhood has been visited, so the result
//! does not depend on visiting order.

use crate::saliency::SaliencyScores;
use keycloud_core::{Error, Neighborhoods, Result};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Ranking used everywhere a single keypoint must win: higher saliency first,
/// equal saliency resolved in favour of the lower index.
fn rank(saliency: &[f64], a: usize, b: usize) -> Ordering {
    saliency[b].total_cmp(&saliency[a]).then(a.cmp(&b))
}

/// Winning candidate of point `i`'s neighborhood, if it has any candidate.
pub fn local_winner(scores: &SaliencyScores, neighborhoods: &Neighborhoods, i: usize) -> Option<usize> {
    neighborhoods
        .neighbors(i)
        .iter()
        .copied()
        .filter(|&j| scores.is_candidate[j])
        .min_by(|&a, &b| rank(&scores.lambda3, a, b))
}

/// Suppress every candidate that is not the local maximum of some
/// neighborhood containing it. Returns a fresh mask; the scores are untouched.
pub fn suppress_non_maxima(scores: &SaliencyScores, neighborhoods: &Neighborhoods) -> Result<Vec<bool>> {
    if scores.lambda3.len() != scores.is_candidate.len() || neighborhoods.len() != scores.len() {
        return Err(Error::Algorithm(format!(
            "suppression needs matching sizes, got {} candidates, {} saliency values and {} neighborhoods",
            scores.is_candidate.len(),
            scores.lambda3.len(),
            neighborhoods.len()
        )));
    }

    let winners: Vec<Option<usize>> = (0..scores.len())
        .into_par_iter()
        .map(|i| local_winner(scores, neighborhoods, i))
        .collect();

    let mut mask = scores.is_candidate.clone();
    for (i, winner) in winners.iter().enumerate() {
        let Some(winner) = *winner else {
            continue;
        };
        for &j in neighborhoods.neighbors(i) {
            if j != winner && scores.is_candidate[j] {
                mask[j] = false;
            }
        }
    }

    Ok(mask)
}

/// Keep at most `max_num` keypoints, the most salient ones.
pub fn retain_most_salient(mask: &mut [bool], saliency: &[f64], max_num: usize) {
    let mut kept: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, &is_keypoint)| is_keypoint)
        .map(|(idx, _)| idx)
        .collect();

    if kept.len() <= max_num {
        return;
    }

    kept.sort_by(|&a, &b| rank(saliency, a, b));
    for &idx in &kept[max_num..] {
        mask[idx] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(is_candidate: Vec<bool>, lambda3: Vec<f64>) -> SaliencyScores {
        SaliencyScores { is_candidate, lambda3 }
    }

    #[test]
    fn test_keeps_highest_saliency() {
        let s = scores(vec![true, true, true], vec![0.1, 0.3, 0.2]);
        let n = Neighborhoods::from_lists(vec![vec![0, 1, 2]; 3]);
        assert_eq!(suppress_non_maxima(&s, &n).unwrap(), vec![false, true, false]);
    }

    #[test]
    fn test_tie_lowest_index_wins() {
        let s = scores(vec![false, true, true, true], vec![0.0, 0.5, 0.5, 0.5]);
        let n = Neighborhoods::from_lists(vec![vec![0, 1, 2, 3]; 4]);
        assert_eq!(suppress_non_maxima(&s, &n).unwrap(), vec![false, true, false, false]);
    }

    #[test]
    fn test_non_candidates_never_added() {
        let s = scores(vec![false, false], vec![1.0, 2.0]);
        let n = Neighborhoods::from_lists(vec![vec![0, 1], vec![0, 1]]);
        assert_eq!(suppress_non_maxima(&s, &n).unwrap(), vec![false, false]);
    }

    #[test]
    fn test_decisions_use_snapshot() {
        // Chain 0 - 1 - 2 - 3 with decreasing saliency. Point 1 outranks 2 and
        // 3 in neighborhood(2) even though 1 is itself suppressed by 0, so only
        // 0 survives. Updating the flags in place during a forward pass would
        // drop 1 and 2 first and let 3 through.
        let s = scores(vec![true; 4], vec![0.9, 0.7, 0.5, 0.1]);
        let n = Neighborhoods::from_lists(vec![vec![0, 1], vec![0, 1, 2], vec![1, 2, 3], vec![2, 3]]);
        assert_eq!(suppress_non_maxima(&s, &n).unwrap(), vec![true, false, false, false]);
        assert_eq!(s.is_candidate, vec![true; 4]);
    }

    #[test]
    fn test_order_independence() {
        // Relabel the points in reverse order: the surviving set must follow.
        let lambda3 = vec![0.4, 0.1, 0.9, 0.3, 0.7];
        let lists = vec![vec![0, 1], vec![0, 1, 2], vec![1, 2, 3], vec![2, 3, 4], vec![3, 4]];
        let s = scores(vec![true; 5], lambda3.clone());
        let forward = suppress_non_maxima(&s, &Neighborhoods::from_lists(lists.clone())).unwrap();

        let n = lambda3.len();
        let reversed_lists: Vec<Vec<usize>> = (0..n)
            .map(|i| lists[n - 1 - i].iter().map(|&j| n - 1 - j).collect())
            .collect();
        let reversed_scores = scores(vec![true; 5], lambda3.iter().rev().copied().collect());
        let backward = suppress_non_maxima(&reversed_scores, &Neighborhoods::from_lists(reversed_lists)).unwrap();

        let backward_unreversed: Vec<bool> = backward.into_iter().rev().collect();
        assert_eq!(forward, backward_unreversed);
    }

    #[test]
    fn test_size_mismatch() {
        let s = scores(vec![true, true], vec![0.1]);
        let n = Neighborhoods::from_lists(vec![vec![0], vec![1]]);
        assert!(suppress_non_maxima(&s, &n).is_err());
    }

    #[test]
    fn test_retain_most_salient() {
        let mut mask = vec![true, false, true, true, true];
        let saliency = vec![0.2, 9.0, 0.5, 0.2, 0.1];
        retain_most_salient(&mut mask, &saliency, 2);
        // 2 has the highest saliency, 0 beats 3 on the tie
        assert_eq!(mask, vec![true, false, true, false, false]);
    }

    #[test]
    fn test_retain_most_salient_under_cap() {
        let mut mask = vec![true, false, true];
        retain_most_salient(&mut mask, &[0.1, 0.2, 0.3], 5);
        assert_eq!(mask, vec![true, false, true]);

        retain_most_salient(&mut mask, &[0.1, 0.2, 0.3], 0);
        assert_eq!(mask, vec![false, false, false]);
    }
}
