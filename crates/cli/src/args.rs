use clap::Args;
use phylevo_sim::simulation::Configuration;
use std::path::PathBuf;

/// Default configuration file written by `init`.
pub const CONFIG_FILE: &str = "phylevo.json";

/// Parameter overrides shared by `init` and `run`.
///
/// Unset values keep the configured (or default) value.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Number of trees per generation
    #[arg(short = 'n', long)]
    pub population_size: Option<usize>,

    /// Maximum number of generations
    #[arg(short = 'g', long)]
    pub generations: Option<usize>,

    /// Stop once the best score has not changed for this many generations
    #[arg(long)]
    pub stable_generations: Option<usize>,

    /// Score only the leading alignment columns
    #[arg(long)]
    pub max_sequence_length: Option<usize>,

    /// Progress report interval in generations
    #[arg(long)]
    pub report_every: Option<usize>,

    /// Per-branch length mutation probability
    #[arg(long)]
    pub branch_rate: Option<f64>,

    /// Per-entry substitution parameter mutation probability
    #[arg(long)]
    pub parameter_rate: Option<f64>,

    /// Per-tree topology mutation probability
    #[arg(long)]
    pub topology_rate: Option<f64>,

    /// Per-tree crossover probability
    #[arg(long)]
    pub crossover_prob: Option<f64>,

    /// Fraction of each generation filled with copies of the best tree
    #[arg(long)]
    pub survival_fraction: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Configuration) {
        let exec = &mut config.execution;
        if let Some(v) = self.population_size {
            exec.population_size = v;
        }
        if let Some(v) = self.generations {
            exec.generations = v;
        }
        if let Some(v) = self.stable_generations {
            exec.stable_generations = v;
        }
        if let Some(v) = self.max_sequence_length {
            exec.max_sequence_length = v;
        }
        if let Some(v) = self.report_every {
            exec.report_every = v;
        }
        if self.seed.is_some() {
            exec.seed = self.seed;
        }

        let mutation = &mut config.mutation;
        if let Some(v) = self.branch_rate {
            mutation.branch_rate = v;
        }
        if let Some(v) = self.parameter_rate {
            mutation.parameter_rate = v;
        }
        if let Some(v) = self.topology_rate {
            mutation.topology_rate = v;
        }
        if let Some(v) = self.crossover_prob {
            mutation.crossover_prob = v;
        }
        if let Some(v) = self.survival_fraction {
            config.selection.survival_fraction = v;
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration path
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Alignment file (line format or FASTA)
    #[arg(short, long)]
    pub alignment: PathBuf,

    /// Configuration file (JSON or properties)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Alignment file (line format or FASTA)
    #[arg(short, long)]
    pub alignment: PathBuf,

    /// Configuration file (JSON or properties); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the best tree in Newick format to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let overrides = ConfigOverrides {
            population_size: Some(12),
            topology_rate: Some(0.5),
            seed: Some(4),
            ..Default::default()
        };
        let mut config = Configuration::default();
        overrides.apply(&mut config);

        let default = Configuration::default();
        assert_eq!(config.execution.population_size, 12);
        assert_eq!(config.execution.seed, Some(4));
        assert_eq!(config.mutation.topology_rate, 0.5);
        assert_eq!(config.execution.generations, default.execution.generations);
        assert_eq!(config.mutation.branch_rate, default.mutation.branch_rate);
    }
}
