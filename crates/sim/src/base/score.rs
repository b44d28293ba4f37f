use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A log-scale likelihood (natural logarithm of a probability).
///
/// Summing per-site log values avoids the underflow that multiplying many
/// small site likelihoods would cause. Larger is better; `-inf` marks a tree
/// that cannot produce the alignment at all.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LogLikelihood(f64);

impl LogLikelihood {
    /// ln(1): the neutral element for summation over sites.
    pub const ZERO: Self = Self(0.0);

    /// Wraps a log-scale value.
    pub fn new(log_value: f64) -> Self {
        Self(log_value)
    }

    /// Log of a linear-scale probability.
    pub fn from_probability(p: f64) -> Self {
        Self(p.ln())
    }

    /// Returns the inner log-scale value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns true if this represents zero likelihood (log = -∞).
    pub fn is_impossible(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }

    /// Bitwise equality, used for convergence detection.
    pub fn same_bits(self, other: Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }

    /// Descending total order (best first); NaN sorts last.
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => other.0.total_cmp(&self.0),
        }
    }
}

impl Default for LogLikelihood {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<LogLikelihood> for f64 {
    fn from(value: LogLikelihood) -> Self {
        value.0
    }
}

impl fmt::Display for LogLikelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for LogLikelihood {
    type Output = Self;

    /// ln(a × b) = ln(a) + ln(b)
    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::iter::Sum for LogLikelihood {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_probability() {
        let l = LogLikelihood::from_probability(0.5);
        assert!((l.get() - 0.5f64.ln()).abs() < 1e-12);
        assert!(LogLikelihood::from_probability(0.0).is_impossible());
    }

    #[test]
    fn test_sum_of_sites() {
        let total: LogLikelihood = [0.5, 0.25]
            .iter()
            .map(|&p| LogLikelihood::from_probability(p))
            .sum();
        assert!((total.get() - 0.125f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_cmp_desc_puts_best_first() {
        let mut scores = vec![
            LogLikelihood::new(-10.0),
            LogLikelihood::new(f64::NAN),
            LogLikelihood::new(-1.0),
            LogLikelihood::new(f64::NEG_INFINITY),
        ];
        scores.sort_by(LogLikelihood::cmp_desc);
        assert_eq!(scores[0].get(), -1.0);
        assert_eq!(scores[1].get(), -10.0);
        assert!(scores[2].is_impossible());
        assert!(scores[3].get().is_nan());
    }

    #[test]
    fn test_same_bits() {
        assert!(LogLikelihood::new(-80.0).same_bits(LogLikelihood::new(-80.0)));
        assert!(!LogLikelihood::new(-80.0).same_bits(LogLikelihood::new(-80.000001)));
    }
}
