//! Integration tests for the tree search: structural invariants under the
//! evolutionary operators and end-to-end runs.

use phylevo_sim::base::{Alignment, NUM_SYMBOLS};
use phylevo_sim::evolution::{LikelihoodEngine, MutationModel, RecombinationModel};
use phylevo_sim::simulation::{Configuration, GaState, Population, Simulation, SimulationBuilder};
use phylevo_sim::tree::{PhyloTree, Side, MAX_BRANCH_LENGTH, MIN_BRANCH_LENGTH};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const PRIMATES: [(&str, &str); 6] = [
    ("homo", "ACGTACGTACGTTGCA"),
    ("pan", "ACGTACGTACGTTGCC"),
    ("gorilla", "ACGTACGAACGTTGCC"),
    ("pongo", "ACGAACGAACTTTGCC"),
    ("hylobates", "TCGAACGAACTTAGCC"),
    ("macaca", "TCGAAC-AACTTAGGC"),
];

fn primates() -> Alignment {
    Alignment::from_pairs(PRIMATES).unwrap()
}

fn names() -> Vec<&'static str> {
    PRIMATES.iter().map(|(n, _)| *n).collect()
}

/// Helper to run every per-slot operator once, the way the driver does.
fn reproduce_once(
    tree: &mut PhyloTree,
    donors: &[PhyloTree],
    mutation: &MutationModel,
    recombination: &RecombinationModel,
    rng: &mut Xoshiro256PlusPlus,
) {
    let n = PRIMATES.len();
    mutation.mutate_branches(tree, rng);
    mutation.mutate_parameters(tree, rng);
    mutation.mutate_topology(tree, n, rng).unwrap();
    recombination.crossover(tree, donors, n, rng).unwrap();
}

#[test]
fn test_operators_preserve_tree_invariants() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2024);
    let species = names();
    let mutation = MutationModel::new(0.8, 0.3, 1.0).unwrap();
    let recombination = RecombinationModel::new(1.0).unwrap();
    let donors = Population::random(8, &species, &mut rng).unwrap();

    let mut tree = PhyloTree::random(&species, &mut rng).unwrap();
    for _ in 0..300 {
        reproduce_once(&mut tree, donors.trees(), &mutation, &recombination, &mut rng);

        tree.validate_species(&species).unwrap();
        assert_eq!(tree.leaf_count(), species.len());
        assert_eq!(tree.internal_count(), species.len() - 1);
        for b in tree.branch_lengths() {
            assert!((MIN_BRANCH_LENGTH..=MAX_BRANCH_LENGTH).contains(&b));
        }
        for id in tree.preorder() {
            let params = tree.node(id).unwrap().params();
            assert!((params.frequency_sum() - 1.0).abs() < 1e-9);
            for row in 0..NUM_SYMBOLS {
                assert!((params.row_sum(row) - 1.0).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn test_deep_copy_shares_nothing() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let species = names();
    let original = PhyloTree::random(&species, &mut rng).unwrap();
    let snapshot = original.clone();

    let mut copy = original.clone();
    let mutation = MutationModel::new(1.0, 1.0, 1.0).unwrap();
    for _ in 0..20 {
        mutation.mutate_branches(&mut copy, &mut rng);
        mutation.mutate_parameters(&mut copy, &mut rng);
        mutation.mutate_topology(&mut copy, species.len(), &mut rng).unwrap();
    }
    let root = copy.root();
    copy.node_mut(root).unwrap().set_distance(Side::Left, 0.5);

    assert_eq!(original, snapshot);
    assert_ne!(copy, original);
}

#[test]
fn test_likelihood_is_deterministic_and_non_positive() {
    let alignment = primates();
    let engine = LikelihoodEngine::new(&alignment, 100);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);

    for _ in 0..20 {
        let tree = PhyloTree::random(&names(), &mut rng).unwrap();
        let a = engine.score(&tree).unwrap();
        let b = engine.score(&tree.clone()).unwrap();
        assert!(a.same_bits(b));
        assert!(a.get() <= 0.0);
    }
}

#[test]
fn test_three_identical_species_end_to_end() {
    let alignment = Alignment::from_pairs([("s1", "AAAA"), ("s2", "AAAA"), ("s3", "AAAA")]).unwrap();

    let run = |seed| {
        SimulationBuilder::new()
            .alignment(alignment.clone())
            .population_size(10)
            .generations(15)
            .stable_generations(100)
            .seed(seed)
            .build()
            .unwrap()
            .run()
            .unwrap()
    };

    let first = run(77);
    let second = run(77);
    assert!(first.best_score.get().is_finite());
    assert!(first.best_score.get() < 0.0);
    assert!(first.best_score.same_bits(second.best_score));
    first.best_tree.validate_species(&["s1", "s2", "s3"]).unwrap();
}

#[test]
fn test_best_ever_score_never_decreases() {
    let mut config = Configuration::default();
    config.execution.population_size = 16;
    config.execution.generations = 40;
    config.execution.stable_generations = 1_000;
    config.execution.seed = Some(123);
    config.mutation.topology_rate = 0.6;
    config.mutation.crossover_prob = 0.4;

    let mut sim = Simulation::new(primates(), config).unwrap();
    let mut previous = f64::NEG_INFINITY;
    let summary = sim
        .run_with(|report| {
            assert!(report.best_ever.get() >= previous);
            assert!(report.best_score.get() <= report.best_ever.get());
            previous = report.best_ever.get();
        })
        .unwrap();

    assert_eq!(sim.state(), GaState::ExhaustedGenerations);
    assert_eq!(summary.generations, 40);
    let engine = LikelihoodEngine::new(sim.alignment(), 100);
    assert!(engine.score(&summary.best_tree).unwrap().same_bits(summary.best_score));
}

#[test]
fn test_frozen_population_converges() {
    // With every operator disabled the elite never changes, so the best
    // score is constant and the run stops once the window fills.
    let mut config = Configuration::default();
    config.execution.population_size = 8;
    config.execution.generations = 100;
    config.execution.stable_generations = 5;
    config.execution.seed = Some(4);
    config.mutation.branch_rate = 0.0;
    config.mutation.parameter_rate = 0.0;
    config.mutation.topology_rate = 0.0;
    config.mutation.crossover_prob = 0.0;

    let mut sim = Simulation::new(primates(), config).unwrap();
    let summary = sim.run().unwrap();
    assert!(summary.converged);
    assert_eq!(summary.generations, 5);

    // The returned tree is the one that holds the stable score.
    let window = summary.history.last().unwrap();
    assert!(summary.history.iter().all(|s| s.same_bits(*window)));
    assert!(summary.best_score.same_bits(*window));
    let engine = LikelihoodEngine::new(sim.alignment(), 100);
    assert!(engine.score(&summary.best_tree).unwrap().same_bits(summary.best_score));
}

#[test]
fn test_foreign_population_is_rejected() {
    let stray = PhyloTree::join(PhyloTree::leaf("homo"), PhyloTree::leaf("felis"), [0.1, 0.1]);
    let config = Configuration::default();
    assert!(Simulation::with_population(primates(), config, Population::new(vec![stray])).is_err());
}
