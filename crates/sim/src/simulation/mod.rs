//! Genetic algorithm engine and population management.
//!
//! Re-exports
//!
//! - `Simulation`: the driver that scores, selects and reproduces
//!   generations until convergence or the generation cap.
//! - `Population`: in-memory container for the trees of one generation.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation`
//!   instances with sensible defaults and validation.
//! - `Configuration`: the serializable description of a run.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod population;

pub use builder::SimulationBuilder;
pub use configs::{Configuration, ExecutionConfig, MutationConfig, SelectionConfig};
pub use engine::{GaState, GenerationReport, RunSummary, Simulation};
pub use population::Population;
