//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults and comprehensive validation.

use crate::base::Alignment;
pub use crate::errors::BuilderError;
use crate::simulation::{Configuration, Simulation};

/// Builder for constructing Simulation instances with a fluent API.
///
/// # Examples
///
/// ```
/// use phylevo_sim::base::Alignment;
/// use phylevo_sim::simulation::SimulationBuilder;
///
/// let alignment = Alignment::from_pairs([
///     ("homo", "ACGTAC"),
///     ("pan", "ACGTAA"),
///     ("gorilla", "ACCTAA"),
/// ])
/// .unwrap();
///
/// let mut sim = SimulationBuilder::new()
///     .alignment(alignment)
///     .population_size(20)
///     .generations(10)
///     .mutation_rates(0.2, 0.05, 0.3)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let summary = sim.run().unwrap();
/// assert!(summary.best_score.get() < 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    // Required parameters
    alignment: Option<Alignment>,
    population_size: Option<usize>,
    generations: Option<usize>,

    // Everything else starts from Configuration::default()
    config: Configuration,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder with default values.
    pub fn new() -> Self {
        Self {
            alignment: None,
            population_size: None,
            generations: None,
            config: Configuration::default(),
        }
    }

    /// Start from a complete configuration; only the alignment is still
    /// required.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            alignment: None,
            population_size: Some(config.execution.population_size),
            generations: Some(config.execution.generations),
            config,
        }
    }

    /// Set the alignment to fit (required).
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Set the population size (required).
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    /// Set the maximum number of generations to run (required).
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    /// Set the convergence window.
    pub fn stable_generations(mut self, window: usize) -> Self {
        self.config.execution.stable_generations = window;
        self
    }

    /// Limit scoring to the leading `sites` alignment columns.
    pub fn max_sequence_length(mut self, sites: usize) -> Self {
        self.config.execution.max_sequence_length = sites;
        self
    }

    /// Set the progress logging interval in generations.
    pub fn report_every(mut self, generations: usize) -> Self {
        self.config.execution.report_every = generations;
        self
    }

    /// Set branch length, substitution parameter and topology mutation
    /// probabilities.
    pub fn mutation_rates(mut self, branch: f64, parameter: f64, topology: f64) -> Self {
        self.config.mutation.branch_rate = branch;
        self.config.mutation.parameter_rate = parameter;
        self.config.mutation.topology_rate = topology;
        self
    }

    /// Set the per-tree crossover probability.
    pub fn crossover_prob(mut self, prob: f64) -> Self {
        self.config.mutation.crossover_prob = prob;
        self
    }

    /// Set the fraction of each generation made of copies of the best tree.
    pub fn survival_fraction(mut self, fraction: f64) -> Self {
        self.config.selection.survival_fraction = fraction;
        self
    }

    /// Set random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.execution.seed = Some(seed);
        self
    }

    /// Build the simulation.
    ///
    /// # Errors
    /// Returns an error if a required parameter is missing or the assembled
    /// configuration is out of range.
    pub fn build(self) -> Result<Simulation, BuilderError> {
        let alignment = self
            .alignment
            .ok_or(BuilderError::MissingRequired("alignment"))?;
        let population_size = self
            .population_size
            .ok_or(BuilderError::MissingRequired("population_size"))?;
        let generations = self
            .generations
            .ok_or(BuilderError::MissingRequired("generations"))?;

        let mut config = self.config;
        config.execution.population_size = population_size;
        config.execution.generations = generations;
        config.validate()?;

        Simulation::new(alignment, config).map_err(|e| BuilderError::Initialization(Box::new(e)))
    }
}
