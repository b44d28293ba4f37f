//! Genetic algorithm driver.
//!
//! Each generation is scored against the alignment, ranked, and replaced by
//! a new generation built from elite copies of the best tree plus
//! rank-selected survivors. Every slot but the first is then mutated and
//! crossed over with the previous generation. The run stops when the best
//! score has been bit-identical for `stable_generations` generations, or
//! after `generations` generations.

use std::fmt;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::base::{Alignment, LogLikelihood};
use crate::errors::{ConfigError, SimulationError};
use crate::evolution::{
    is_stable, rank_by_score, LikelihoodEngine, MutationModel, RecombinationModel,
    SelectionModel,
};
use crate::simulation::{Configuration, Population};
use crate::tree::PhyloTree;

/// Create RNG from seed or OS entropy.
fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
    }
}

/// Phase of the genetic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaState {
    /// Random population built, nothing scored yet
    Initializing,
    Scoring,
    Selecting,
    Reproducing,
    /// Stopped because the best score stopped changing
    Converged,
    /// Stopped after the configured number of generations
    ExhaustedGenerations,
}

impl GaState {
    /// `true` once the run has stopped.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::ExhaustedGenerations)
    }
}

impl fmt::Display for GaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Scoring => "scoring",
            Self::Selecting => "selecting",
            Self::Reproducing => "reproducing",
            Self::Converged => "converged",
            Self::ExhaustedGenerations => "exhausted generations",
        };
        f.write_str(name)
    }
}

/// Outcome of one call to [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationReport {
    /// Zero-based index of the generation that was scored
    pub generation: usize,
    /// Best score within that generation
    pub best_score: LogLikelihood,
    /// Best score seen so far in the run
    pub best_ever: LogLikelihood,
    /// State after the step
    pub state: GaState,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Highest-scoring tree found over the whole run
    pub best_tree: PhyloTree,
    pub best_score: LogLikelihood,
    /// Number of generations scored
    pub generations: usize,
    /// Whether the run stopped on convergence rather than the generation cap
    pub converged: bool,
    /// Best score of each generation, in order
    pub history: Vec<LogLikelihood>,
}

/// Main genetic algorithm engine.
#[derive(Debug)]
pub struct Simulation {
    /// Current generation of trees
    population: Population,
    /// Alignment every tree is scored against
    alignment: Alignment,
    /// Run configuration
    config: Configuration,
    mutation: MutationModel,
    recombination: RecombinationModel,
    selection: SelectionModel,
    /// Random number generator (using Xoshiro256++ for better performance)
    rng: Xoshiro256PlusPlus,
    state: GaState,
    /// Best score of each scored generation
    history: Vec<LogLikelihood>,
    best: Option<(PhyloTree, LogLikelihood)>,
}

impl Simulation {
    /// Create a run over `alignment` with a random initial population.
    ///
    /// The configuration is validated first. The RNG is seeded from
    /// `execution.seed` when present, otherwise from OS entropy.
    pub fn new(alignment: Alignment, config: Configuration) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = seeded_rng(config.execution.seed);
        let species: Vec<&str> = alignment.species_names().collect();
        let population = Population::random(config.execution.population_size, &species, &mut rng)?;
        Self::from_population(alignment, config, population, rng)
    }

    /// Create a run from an explicit initial population.
    ///
    /// Every tree must be valid and hold exactly the alignment's species.
    pub fn with_population(
        alignment: Alignment,
        config: Configuration,
        population: Population,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if population.is_empty() {
            return Err(ConfigError::ZeroCount("population_size").into());
        }
        let species: Vec<&str> = alignment.species_names().collect();
        for tree in population.trees() {
            tree.validate_species(&species)?;
        }
        let rng = seeded_rng(config.execution.seed);
        Self::from_population(alignment, config, population, rng)
    }

    fn from_population(
        alignment: Alignment,
        config: Configuration,
        population: Population,
        rng: Xoshiro256PlusPlus,
    ) -> Result<Self, SimulationError> {
        let mutation = config.mutation.mutation_model()?;
        let recombination = config.mutation.recombination_model()?;
        let selection = config.selection.selection_model()?;

        if config.execution.max_sequence_length > alignment.sequence_len() {
            warn!(
                "max_sequence_length {} exceeds the alignment length; scoring all {} sites",
                config.execution.max_sequence_length,
                alignment.sequence_len()
            );
        }

        Ok(Self {
            population,
            alignment,
            config,
            mutation,
            recombination,
            selection,
            rng,
            state: GaState::Initializing,
            history: Vec::new(),
            best: None,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> GaState {
        self.state
    }

    /// Index of the next generation to be scored.
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Best score of each generation scored so far.
    pub fn history(&self) -> &[LogLikelihood] {
        &self.history
    }

    /// Best tree seen so far and its score.
    pub fn best(&self) -> Option<(&PhyloTree, LogLikelihood)> {
        self.best.as_ref().map(|(tree, score)| (tree, *score))
    }

    /// Score the current generation, check for termination, and if the run
    /// continues build the next generation.
    pub fn step(&mut self) -> Result<GenerationReport, SimulationError> {
        if self.state.is_terminal() {
            return Err(SimulationError::AlreadyFinished);
        }
        let generation = self.population.generation();
        if self.state == GaState::Initializing {
            info!(
                "Starting search: {} species, {} trees, up to {} generations",
                self.alignment.num_species(),
                self.population.size(),
                self.config.execution.generations
            );
        }

        self.state = GaState::Scoring;
        let engine = LikelihoodEngine::new(&self.alignment, self.config.execution.max_sequence_length);
        let scores = self.population.score_all(&engine)?;
        let ranking = rank_by_score(&scores);
        let best_index = ranking[0];
        let best_score = scores[best_index];
        self.history.push(best_score);
        self.record_best(best_index, best_score);
        let best_ever = self.best.as_ref().map_or(best_score, |(_, s)| *s);

        debug!("Generation {generation}: best log-likelihood {best_score}");
        let every = self.config.execution.report_every;
        if every > 0 && generation % every == 0 {
            info!("Generation {generation}: best log-likelihood {best_ever}");
        }

        if let Some(done) = self.termination_state(generation) {
            self.state = done;
            info!(
                "Search finished after {} generations ({done}): best log-likelihood {best_ever}",
                generation + 1
            );
        } else {
            self.reproduce(&scores)?;
            self.population.increment_generation();
            self.state = GaState::Scoring;
        }

        Ok(GenerationReport {
            generation,
            best_score,
            best_ever,
            state: self.state,
        })
    }

    fn record_best(&mut self, index: usize, score: LogLikelihood) {
        let improved = match &self.best {
            None => true,
            Some((_, current)) => score.get() > current.get(),
        };
        if improved {
            if let Some(tree) = self.population.get(index) {
                self.best = Some((tree.clone(), score));
            }
        }
    }

    /// Terminal state reached after scoring `generation`, if any.
    fn termination_state(&self, generation: usize) -> Option<GaState> {
        if is_stable(&self.history, self.config.execution.stable_generations) {
            Some(GaState::Converged)
        } else if generation + 1 >= self.config.execution.generations {
            Some(GaState::ExhaustedGenerations)
        } else {
            None
        }
    }

    /// Build the next generation from the scored one.
    fn reproduce(&mut self, scores: &[LogLikelihood]) -> Result<(), SimulationError> {
        self.state = GaState::Selecting;
        let mut next = self
            .population
            .select_survivors(scores, &self.selection, &mut self.rng);

        self.state = GaState::Reproducing;
        let num_species = self.alignment.num_species();
        let donors = self.population.trees();
        for tree in next.iter_mut().skip(1) {
            self.mutation.mutate_branches(tree, &mut self.rng);
            self.mutation.mutate_parameters(tree, &mut self.rng);
            self.mutation
                .mutate_topology(tree, num_species, &mut self.rng)?;
            self.recombination
                .crossover(tree, donors, num_species, &mut self.rng)?;
        }

        self.population.set_trees(next);
        Ok(())
    }

    /// Run until convergence or the generation cap.
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        self.run_with(|_| {})
    }

    /// Like [`Simulation::run`], calling `on_generation` after every step.
    pub fn run_with<F>(&mut self, mut on_generation: F) -> Result<RunSummary, SimulationError>
    where
        F: FnMut(&GenerationReport),
    {
        while !self.state.is_terminal() {
            let report = self.step()?;
            on_generation(&report);
        }
        self.summary()
    }

    /// Summary of a finished run.
    pub fn summary(&self) -> Result<RunSummary, SimulationError> {
        let (best_tree, best_score) = self
            .best
            .clone()
            .ok_or(SimulationError::NotStarted)?;
        Ok(RunSummary {
            best_tree,
            best_score,
            generations: self.history.len(),
            converged: self.state == GaState::Converged,
            history: self.history.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulationBuilder;

    fn alignment() -> Alignment {
        Alignment::from_pairs([
            ("homo", "ACGTACGTAC"),
            ("pan", "ACGTACGTAA"),
            ("gorilla", "ACGAACGTCC"),
            ("pongo", "TCGAACTTCC"),
        ])
        .unwrap()
    }

    fn create_test_simulation(generations: usize) -> Simulation {
        SimulationBuilder::new()
            .alignment(alignment())
            .population_size(12)
            .generations(generations)
            .stable_generations(1000)
            .mutation_rates(0.3, 0.1, 0.5)
            .crossover_prob(0.3)
            .survival_fraction(0.2)
            .seed(42)
            .build()
            .unwrap()
    }

    fn ll(values: &[f64]) -> Vec<LogLikelihood> {
        values.iter().map(|&v| LogLikelihood::new(v)).collect()
    }

    #[test]
    fn test_simulation_new() {
        let sim = create_test_simulation(5);
        assert_eq!(sim.population().size(), 12);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.state(), GaState::Initializing);
        assert!(sim.best().is_none());
        assert!(matches!(sim.summary(), Err(SimulationError::NotStarted)));
    }

    #[test]
    fn test_simulation_step() {
        let mut sim = create_test_simulation(5);
        let report = sim.step().unwrap();
        assert_eq!(report.generation, 0);
        assert_eq!(report.state, GaState::Scoring);
        assert_eq!(sim.generation(), 1);
        assert_eq!(sim.population().size(), 12);
        assert!(report.best_score.get() < 0.0);
        for tree in sim.population().trees() {
            tree.validate_species(&["homo", "pan", "gorilla", "pongo"]).unwrap();
        }
    }

    #[test]
    fn test_best_score_never_decreases() {
        let mut sim = create_test_simulation(30);
        let summary = sim.run().unwrap();
        assert_eq!(summary.generations, 30);
        assert!(!summary.converged);
        for pair in summary.history.windows(2) {
            assert!(pair[1].get() >= pair[0].get());
        }
        assert!(summary.best_score.same_bits(*summary.history.last().unwrap()));
    }

    #[test]
    fn test_step_after_finish_fails() {
        let mut sim = create_test_simulation(1);
        let report = sim.step().unwrap();
        assert_eq!(report.state, GaState::ExhaustedGenerations);
        assert!(sim.is_finished());
        assert!(matches!(sim.step(), Err(SimulationError::AlreadyFinished)));
    }

    #[test]
    fn test_run_with_reports_every_generation() {
        let mut sim = create_test_simulation(7);
        let mut seen = Vec::new();
        let summary = sim.run_with(|r| seen.push(r.generation)).unwrap();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
        assert_eq!(summary.history.len(), 7);
    }

    #[test]
    fn test_termination_on_stable_window() {
        let mut sim = SimulationBuilder::new()
            .alignment(alignment())
            .population_size(4)
            .generations(100)
            .stable_generations(5)
            .seed(1)
            .build()
            .unwrap();

        let history = ll(&[-100.0, -90.0, -80.0, -80.0, -80.0, -80.0, -80.0]);
        let tree = sim.population().trees()[0].clone();
        for (generation, score) in history.iter().enumerate() {
            sim.history.push(*score);
            if generation == 2 {
                sim.best = Some((tree.clone(), *score));
            }
            let state = sim.termination_state(generation);
            if generation < 6 {
                assert_eq!(state, None, "generation {generation}");
            } else {
                assert_eq!(state, Some(GaState::Converged));
                sim.state = GaState::Converged;
            }
        }

        let summary = sim.summary().unwrap();
        assert!(summary.converged);
        assert_eq!(summary.generations, 7);
        assert_eq!(summary.best_score.get(), -80.0);
        assert_eq!(summary.best_tree, tree);
    }

    #[test]
    fn test_with_population_checks_species() {
        let partial = PhyloTree::join(PhyloTree::leaf("homo"), PhyloTree::leaf("pan"), [0.1, 0.1]);
        let err = Simulation::with_population(
            alignment(),
            Configuration::default(),
            Population::new(vec![partial]),
        )
        .unwrap_err();
        assert!(matches!(err, SimulationError::Tree(_)));

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let full = PhyloTree::random(&["homo", "pan", "gorilla", "pongo"], &mut rng).unwrap();
        let sim = Simulation::with_population(
            alignment(),
            Configuration::default(),
            Population::new(vec![full]),
        )
        .unwrap();
        assert_eq!(sim.population().size(), 1);
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = create_test_simulation(10).run().unwrap();
        let b = create_test_simulation(10).run().unwrap();
        assert_eq!(a.history.len(), b.history.len());
        for (x, y) in a.history.iter().zip(&b.history) {
            assert!(x.same_bits(*y));
        }
        assert_eq!(a.best_tree, b.best_tree);
    }
}
