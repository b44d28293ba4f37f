//! Run configuration.
//!
//! This module provides the parameter structures that fully describe a
//! genetic algorithm run: population and termination settings, mutation
//! probabilities, and the survivor selection fraction.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::evolution::{MutationModel, RecombinationModel, SelectionModel};

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub mutation: MutationConfig,
    pub selection: SelectionConfig,
}

/// Population size, termination, and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of trees per generation
    pub population_size: usize,
    /// Maximum number of generations to run
    pub generations: usize,
    /// Stop once this many consecutive best scores are identical
    pub stable_generations: usize,
    /// Only the leading sites of the alignment are scored
    pub max_sequence_length: usize,
    /// Log progress every this many generations
    #[serde(default = "default_report_every")]
    pub report_every: usize,
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_report_every() -> usize {
    10
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 1000,
            stable_generations: 50,
            max_sequence_length: 10_000,
            report_every: default_report_every(),
            seed: None,
        }
    }
}

/// Per-tree mutation and crossover probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Per-branch probability of a length perturbation
    pub branch_rate: f64,
    /// Per-cell probability of a substitution parameter perturbation
    pub parameter_rate: f64,
    /// Per-tree probability of a subtree prune and regraft move
    pub topology_rate: f64,
    /// Per-tree probability of receiving a donor subtree
    pub crossover_prob: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            branch_rate: 0.1,
            parameter_rate: 0.05,
            topology_rate: 0.2,
            crossover_prob: 0.2,
        }
    }
}

impl MutationConfig {
    pub fn mutation_model(&self) -> Result<MutationModel, ConfigError> {
        MutationModel::new(self.branch_rate, self.parameter_rate, self.topology_rate)
    }

    pub fn recombination_model(&self) -> Result<RecombinationModel, ConfigError> {
        RecombinationModel::new(self.crossover_prob)
    }
}

/// Survivor selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Fraction of the next generation made of copies of the best tree
    pub survival_fraction: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            survival_fraction: 0.1,
        }
    }
}

impl SelectionConfig {
    pub fn selection_model(&self) -> Result<SelectionModel, ConfigError> {
        SelectionModel::new(self.survival_fraction)
    }
}

impl Configuration {
    /// Check every value is in range: probabilities in `[0, 1]` and counts
    /// at least one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let exec = &self.execution;
        for (name, value) in [
            ("population_size", exec.population_size),
            ("generations", exec.generations),
            ("stable_generations", exec.stable_generations),
            ("max_sequence_length", exec.max_sequence_length),
            ("report_every", exec.report_every),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCount(name));
            }
        }

        self.mutation.mutation_model()?;
        self.mutation.recombination_model()?;
        self.selection.selection_model()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn test_validate_counts() {
        let mut config = Configuration::default();
        config.execution.stable_generations = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount("stable_generations"))
        );
    }

    #[test]
    fn test_validate_probabilities() {
        let mut config = Configuration::default();
        config.mutation.crossover_prob = 1.2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability("crossover_prob", 1.2))
        );

        let mut config = Configuration::default();
        config.selection.survival_fraction = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_with_defaults() {
        let json = r#"{
            "execution": {
                "population_size": 20,
                "generations": 5,
                "stable_generations": 3,
                "max_sequence_length": 100
            },
            "mutation": {
                "branch_rate": 0.1,
                "parameter_rate": 0.1,
                "topology_rate": 0.1,
                "crossover_prob": 0.1
            },
            "selection": { "survival_fraction": 0.2 }
        }"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.execution.report_every, 10);
        assert_eq!(config.execution.seed, None);
        assert_eq!(config.execution.population_size, 20);

        let text = serde_json::to_string(&config).unwrap();
        let back: Configuration = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
