//! Ranking and survivor selection.
//!
//! The next generation starts with copies of the best tree (the elite block)
//! and is topped up by sweeping down the ranking, where rank `r` survives a
//! visit with probability `2 / ((r + 1)(r + 2))`. The sweep wraps back to
//! rank 1 after the last rank, so the loop always fills the generation.

use rand::Rng;

use crate::base::LogLikelihood;
use crate::errors::ConfigError;
use crate::evolution::mutation::check_probability;

/// Indices of `scores` ordered best first. Ties keep their original order.
pub fn rank_by_score(scores: &[LogLikelihood]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].cmp_desc(&scores[b]));
    order
}

/// Survival probability of the tree at rank `rank` (0 is the best).
#[inline]
pub fn rank_acceptance(rank: usize) -> f64 {
    let r = rank as f64;
    2.0 / ((r + 1.0) * (r + 2.0))
}

/// Survivor selection law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionModel {
    survival_fraction: f64,
}

impl SelectionModel {
    pub fn new(survival_fraction: f64) -> Result<Self, ConfigError> {
        check_probability("survival_fraction", survival_fraction)?;
        Ok(Self { survival_fraction })
    }

    pub fn survival_fraction(&self) -> f64 {
        self.survival_fraction
    }

    /// Size of the elite block for a generation of `population_size`:
    /// `ceil(fraction * size)`, at least one and at most the whole
    /// generation.
    pub fn elite_count(&self, population_size: usize) -> usize {
        if population_size == 0 {
            return 0;
        }
        let n = (self.survival_fraction * population_size as f64).ceil() as usize;
        n.clamp(1, population_size)
    }

    /// Ranks (0 = best) that fill each slot of the next generation.
    ///
    /// The first [`SelectionModel::elite_count`] entries are rank 0.
    pub fn survivor_ranks<R: Rng + ?Sized>(&self, population_size: usize, rng: &mut R) -> Vec<usize> {
        let mut ranks = vec![0; self.elite_count(population_size)];
        if population_size < 2 {
            return ranks;
        }

        let mut rank = 1;
        while ranks.len() < population_size {
            if rng.random::<f64>() < rank_acceptance(rank) {
                ranks.push(rank);
            }
            rank = if rank + 1 >= population_size { 1 } else { rank + 1 };
        }
        ranks
    }
}

/// `true` when the last `window` scores are bit-identical.
pub fn is_stable(history: &[LogLikelihood], window: usize) -> bool {
    if window == 0 || history.len() < window {
        return false;
    }
    let tail = &history[history.len() - window..];
    tail.iter().all(|s| s.same_bits(tail[0]))
}

/// Best score of a generation, if any.
pub fn best_score(scores: &[LogLikelihood]) -> Option<LogLikelihood> {
    scores
        .iter()
        .copied()
        .min_by(|a, b| a.cmp_desc(b))
}
