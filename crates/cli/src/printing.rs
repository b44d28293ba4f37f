use phylevo_sim::base::Alignment;
use phylevo_sim::simulation::{Configuration, RunSummary};

pub fn print_parameters(config: &Configuration) {
    let exec = &config.execution;
    let mutation = &config.mutation;

    println!("\n📋 Search Configuration");
    println!(
        "  • Population Size: {} [-n, --population-size]",
        exec.population_size
    );
    println!("  • Generations: {} [-g, --generations]", exec.generations);
    println!(
        "  • Convergence Window: {} generations [--stable-generations]",
        exec.stable_generations
    );
    println!(
        "  • Scored Sites: up to {} [--max-sequence-length]",
        exec.max_sequence_length
    );
    if let Some(seed) = exec.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n⚡ Mutation Parameters");
    println!(
        "  • Branch Length: {:.3} [--branch-rate]",
        mutation.branch_rate
    );
    println!(
        "  • Substitution Parameters: {:.3} [--parameter-rate]",
        mutation.parameter_rate
    );
    println!(
        "  • Topology: {:.3} [--topology-rate]",
        mutation.topology_rate
    );
    println!(
        "  • Crossover: {:.3} [--crossover-prob]",
        mutation.crossover_prob
    );

    println!("\n🎯 Selection");
    println!(
        "  • Elite Fraction: {:.3} [--survival-fraction]",
        config.selection.survival_fraction
    );
    println!();
}

pub fn print_alignment(alignment: &Alignment) {
    println!(
        "✓ Alignment: {} species × {} sites",
        alignment.num_species(),
        alignment.sequence_len()
    );
}

pub fn print_summary(summary: &RunSummary, newick: &str) {
    let reason = if summary.converged {
        "converged"
    } else {
        "generation limit reached"
    };
    println!(
        "\n✓ Search finished after {} generations ({reason})",
        summary.generations
    );
    println!("  Best log-likelihood: {}", summary.best_score);
    println!("\n{newick}");
}
