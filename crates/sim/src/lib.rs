//! # Simulation Crate
//!
//! The `sim` crate provides the core of the maximum-likelihood phylogeny
//! search. It includes modules for representing alignments and trees,
//! scoring trees by Felsenstein pruning, the evolutionary operators
//! (mutation, crossover, selection), and the genetic algorithm driver.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod prelude;
pub mod simulation;
pub mod tree;

pub use base::{Alignment, LogLikelihood, SpeciesGenome, Symbol};
pub use tree::PhyloTree;
