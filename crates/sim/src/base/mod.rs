//! Base types for alignment representation.
//!
//! This module provides the foundational types for representing alignment
//! symbols, species sequences, and log-likelihood scores.

mod alignment;
mod score;
mod symbol;

pub use alignment::{Alignment, SpeciesGenome};
pub use score::LogLikelihood;
pub use symbol::{Symbol, NUM_SYMBOLS};
