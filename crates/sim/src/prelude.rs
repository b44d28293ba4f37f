//! Commonly used imports for convenience.
//!
//! This prelude module provides a convenient way to import the most commonly
//! used types in the phylevo library.
//!
//! # Example
//!
//! ```
//! use phylevo_sim::prelude::*;
//!
//! let alignment = Alignment::from_pairs([("a", "ACGT"), ("b", "ACGA")]).unwrap();
//! assert_eq!(alignment.num_species(), 2);
//! ```

pub use crate::base::{Alignment, LogLikelihood, SpeciesGenome, Symbol};
pub use crate::errors;
pub use crate::evolution::{LikelihoodEngine, MutationModel, RecombinationModel, SelectionModel};
pub use crate::simulation::{
    Configuration, GaState, GenerationReport, Population, RunSummary, Simulation,
    SimulationBuilder,
};
pub use crate::tree::{NodeId, PhyloTree, Side, SubstitutionParams, TreeNode};
