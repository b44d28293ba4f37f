//! Evolution module providing scoring, mutation, crossover, and selection.
//!
//! This module implements the operators the genetic algorithm applies to
//! each generation of trees:
//! - **Likelihood**: Felsenstein pruning of an alignment over a tree
//! - **Mutation**: Branch length, substitution parameter, and topology moves
//! - **Recombination**: Subtree crossover between trees
//! - **Selection**: Ranking and elitist survivor selection

pub mod likelihood;
pub mod mutation;
pub mod recombination;
pub mod selection;

pub use likelihood::LikelihoodEngine;
pub use mutation::MutationModel;
pub use recombination::RecombinationModel;
pub use selection::{is_stable, rank_by_score, SelectionModel};
