//! Optimal Computing Budget Allocation for one replication at a time.
//!
//! Classical OCBA splits a known total simulation budget across `k`
//! candidate designs so as to maximise the probability of picking the true
//! best. Here it is used online: given the current sample statistics of the
//! candidates, compute the OCBA target share of each design, compare it with
//! the share each design has actually received so far, and hand the next
//! sample to the design that lags its target the most (the "starving" one).
//!
//! ## Allocation rule
//!
//! With `b` the best design by mean and `s` the second best:
//!
//! - `ratio[s] = 1`
//! - `ratio[j] = (σ_j / σ_s · (μ_b − μ_s) / (μ_b − μ_j))²` for other `j ≠ b`
//!   (`1` when `μ_j == μ_b`)
//! - `ratio[b] = σ_b · sqrt(Σ_{j≠b} (ratio[j] / σ_j)²)`
//!
//! and the ratios are normalised to sum to 1.

use serde::{Deserialize, Serialize};

/// Floor applied to standard deviations before any division.
pub const MIN_STD_DEV: f64 = 1e-12;

/// Current sample statistics of one candidate design.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Design {
    /// Sample mean (higher is better).
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Samples allocated so far.
    pub samples: u32,
}

impl Design {
    pub fn new(mean: f64, std_dev: f64, samples: u32) -> Self {
        Self {
            mean,
            std_dev,
            samples,
        }
    }

    fn sigma(&self) -> f64 {
        // `max` also maps NaN to the floor.
        self.std_dev.max(MIN_STD_DEV)
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax_first(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Best and second-best designs by mean.
///
/// Returns `None` for no designs; the second index is `None` when there is
/// only one design.
#[must_use]
pub fn best_and_second_best(designs: &[Design]) -> Option<(usize, Option<usize>)> {
    let best = argmax_first(designs.iter().map(|d| d.mean))?;
    let second = argmax_first(
        designs
            .iter()
            .enumerate()
            .map(|(i, d)| if i == best { f64::NEG_INFINITY } else { d.mean }),
    )
    .filter(|&i| i != best);
    Some((best, second))
}

/// OCBA target share of the budget for each design.
///
/// The shares sum to 1 unless every ratio is 0, in which case the raw
/// (all-zero) ratios are returned. A single design gets the whole budget.
#[must_use]
pub fn calculate_ratio(designs: &[Design]) -> Vec<f64> {
    let Some((best, second)) = best_and_second_best(designs) else {
        return Vec::new();
    };
    let Some(second) = second else {
        return vec![1.0];
    };

    let k = designs.len();
    let mut ratio = vec![0.0; k];
    ratio[second] = 1.0;

    let gap_second = designs[best].mean - designs[second].mean;
    let sigma_second = designs[second].sigma();
    for j in (0..k).filter(|&j| j != best && j != second) {
        if designs[best].mean == designs[j].mean {
            ratio[j] = 1.0;
        } else {
            let t = designs[j].sigma() * gap_second
                / (sigma_second * (designs[best].mean - designs[j].mean));
            ratio[j] = t * t;
        }
    }

    let spread: f64 = (0..k)
        .filter(|&j| j != best)
        .map(|j| (ratio[j] / designs[j].sigma()).powi(2))
        .sum();
    ratio[best] = designs[best].sigma() * spread.sqrt();

    let total: f64 = ratio.iter().sum();
    if total > 0.0 {
        for r in &mut ratio {
            *r /= total;
        }
    }
    ratio
}

/// How far each design's target share exceeds its current share.
///
/// Current shares are all 0 when no samples have been allocated yet.
#[must_use]
pub fn allocation_gaps(designs: &[Design]) -> Vec<f64> {
    let target = calculate_ratio(designs);
    let total: u64 = designs.iter().map(|d| u64::from(d.samples)).sum();

    designs
        .iter()
        .zip(target)
        .map(|(d, t)| {
            let current = if total == 0 {
                0.0
            } else {
                f64::from(d.samples) / total as f64
            };
            t - current
        })
        .collect()
}

/// The design that most needs the next sample.
///
/// First index wins ties; `None` only when there are no designs.
#[must_use]
pub fn most_starving(designs: &[Design]) -> Option<usize> {
    argmax_first(allocation_gaps(designs))
}

/// All designs ordered from most to least starving.
///
/// Ties keep index order, so the head of the list equals
/// [`most_starving`]. Useful for handing out a batch of samples.
#[must_use]
pub fn starving_order(designs: &[Design]) -> Vec<usize> {
    let gaps = allocation_gaps(designs);
    let mut order: Vec<usize> = (0..gaps.len()).collect();
    order.sort_by(|&a, &b| gaps[b].total_cmp(&gaps[a]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax_first([1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax_first(Vec::<f64>::new()), None);
        assert_eq!(argmax_first([f64::NEG_INFINITY]), Some(0));
    }

    #[test]
    fn test_best_and_second_best() {
        let designs = [
            Design::new(0.2, 1.0, 1),
            Design::new(0.9, 1.0, 1),
            Design::new(0.5, 1.0, 1),
        ];
        assert_eq!(best_and_second_best(&designs), Some((1, Some(2))));
        assert_eq!(best_and_second_best(&designs[..1]), Some((0, None)));
        assert_eq!(best_and_second_best(&[]), None);
    }

    #[test]
    fn test_second_best_on_tied_means() {
        let designs = [Design::new(0.5, 1.0, 1), Design::new(0.5, 1.0, 1)];
        assert_eq!(best_and_second_best(&designs), Some((0, Some(1))));
    }

    #[test]
    fn test_symmetric_pair_splits_evenly() {
        let designs = [Design::new(0.5, 0.3, 4), Design::new(0.5, 0.3, 4)];
        assert!(close(&calculate_ratio(&designs), &[0.5, 0.5]));
    }

    #[test]
    fn test_noisier_best_gets_more() {
        // ratio[1] = 1, ratio[0] = 2 * sqrt((1/1)^2) = 2
        let designs = [Design::new(1.0, 2.0, 1), Design::new(0.0, 1.0, 1)];
        assert!(close(&calculate_ratio(&designs), &[2.0 / 3.0, 1.0 / 3.0]));
    }

    #[test]
    fn test_three_designs_closed_form() {
        // best = 0, second = 1; gap_second = 1, gap_2 = 2
        // ratio[2] = (1/1 * 1/2)^2 = 0.25
        // ratio[0] = 1 * sqrt(1 + 0.0625) ~= 1.030776
        let designs = [
            Design::new(3.0, 1.0, 1),
            Design::new(2.0, 1.0, 1),
            Design::new(1.0, 1.0, 1),
        ];
        let raw0 = (1.0f64 + 0.0625).sqrt();
        let total = raw0 + 1.0 + 0.25;
        assert!(close(
            &calculate_ratio(&designs),
            &[raw0 / total, 1.0 / total, 0.25 / total]
        ));
    }

    #[test]
    fn test_mean_tie_with_best_maps_to_one() {
        // Three designs tie for best: 0 is best, 1 second, 2 takes the tie
        // branch. Design 3 gets nothing since best and second are level.
        let designs = [
            Design::new(1.0, 1.0, 1),
            Design::new(1.0, 1.0, 1),
            Design::new(1.0, 1.0, 1),
            Design::new(0.0, 1.0, 1),
        ];
        let ratio = calculate_ratio(&designs);
        assert!(ratio.iter().all(|r| r.is_finite()));
        // raw: [sqrt(2), 1, 1, 0]
        let total = 2.0f64.sqrt() + 2.0;
        assert!(close(
            &ratio,
            &[2.0f64.sqrt() / total, 1.0 / total, 1.0 / total, 0.0]
        ));
    }

    #[test]
    fn test_zero_variance_is_guarded() {
        let designs = [
            Design::new(1.0, 0.0, 3),
            Design::new(0.5, 0.0, 3),
            Design::new(0.0, 0.0, 3),
        ];
        let ratio = calculate_ratio(&designs);
        assert!(ratio.iter().all(|r| r.is_finite()));
        assert!((ratio.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(most_starving(&designs).is_some());
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(calculate_ratio(&[Design::new(0.3, 0.1, 2)]), vec![1.0]);
        assert!(calculate_ratio(&[]).is_empty());
        assert_eq!(most_starving(&[Design::new(0.3, 0.1, 2)]), Some(0));
        assert_eq!(most_starving(&[]), None);
    }

    #[test]
    fn test_starving_picks_under_sampled() {
        // Target [1/3, 2/3], current [1/2, 1/2]: design 1 lags.
        let designs = [Design::new(1.0, 1.0, 10), Design::new(0.0, 2.0, 10)];
        assert_eq!(most_starving(&designs), Some(1));

        // Target [2/3, 1/3]: design 0 lags.
        let designs = [Design::new(1.0, 2.0, 10), Design::new(0.0, 1.0, 10)];
        assert_eq!(most_starving(&designs), Some(0));
    }

    #[test]
    fn test_no_samples_yet() {
        let designs = [Design::new(1.0, 1.0, 0), Design::new(0.0, 1.0, 0)];
        let gaps = allocation_gaps(&designs);
        assert!(close(&gaps, &[0.5, 0.5]));
        assert_eq!(most_starving(&designs), Some(0));
    }

    #[test]
    fn test_starving_order() {
        let designs = [
            Design::new(0.0, 1.0, 30),
            Design::new(1.0, 1.0, 1),
            Design::new(0.9, 1.0, 1),
        ];
        let order = starving_order(&designs);
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], most_starving(&designs).unwrap());
        // Design 0 is heavily over-sampled relative to its target.
        assert_eq!(order[2], 0);
    }
}
