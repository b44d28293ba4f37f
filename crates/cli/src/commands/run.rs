use std::fs;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use phylevo_format::{read_alignment, read_config, to_newick};
use phylevo_sim::simulation::{Configuration, SimulationBuilder};

use crate::args::RunArgs;
use crate::printing::{print_alignment, print_parameters, print_summary};

pub fn run_search(args: &RunArgs) -> Result<()> {
    println!("🧬 Phylevo - Running Search");
    println!("============================================\n");

    let alignment = read_alignment(&args.alignment)
        .with_context(|| format!("Failed to load alignment {}", args.alignment.display()))?;
    print_alignment(&alignment);

    let mut config = match &args.config {
        Some(path) => read_config(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => Configuration::default(),
    };
    args.overrides.apply(&mut config);

    print_parameters(&config);

    let generations = config.execution.generations;
    let report_every = config.execution.report_every;
    let mut sim = SimulationBuilder::from_config(config)
        .alignment(alignment)
        .build()
        .context("Failed to initialize search")?;

    let pb = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new(generations as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    while !sim.is_finished() {
        let report = sim
            .step()
            .with_context(|| format!("Generation {}", sim.generation()))?;

        if report.generation % report_every == 0 {
            if let Some((tree, score)) = sim.best() {
                debug!(
                    "Generation {}: best tree {} ({score})",
                    report.generation,
                    to_newick(tree)?
                );
            }
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let summary = sim.summary()?;
    let newick = to_newick(&summary.best_tree)?;
    print_summary(&summary, &newick);

    if let Some(path) = &args.output {
        fs::write(path, format!("{newick}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\n✓ Best tree written to {}", path.display());
    }

    Ok(())
}
