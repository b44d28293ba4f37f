use anyhow::{Context, Result};
use log::warn;
use phylevo_format::{read_alignment, read_config};
use phylevo_sim::simulation::Configuration;

use crate::args::ValidateArgs;
use crate::printing::{print_alignment, print_parameters};

pub fn validate_inputs(args: &ValidateArgs) -> Result<()> {
    println!("🔍 Validating inputs");

    let alignment = read_alignment(&args.alignment)
        .with_context(|| format!("Invalid alignment {}", args.alignment.display()))?;
    print_alignment(&alignment);

    let config = match &args.config {
        Some(path) => {
            let config = read_config(path)
                .with_context(|| format!("Invalid configuration {}", path.display()))?;
            println!("✓ Configuration: {}", path.display());
            config
        }
        None => {
            println!("✓ Configuration: defaults");
            Configuration::default()
        }
    };

    let mut issues = 0;
    if config.execution.max_sequence_length > alignment.sequence_len() {
        warn!(
            "max_sequence_length {} exceeds the alignment length {}",
            config.execution.max_sequence_length,
            alignment.sequence_len()
        );
        issues += 1;
    }
    if config.execution.stable_generations >= config.execution.generations {
        warn!(
            "Convergence window {} is not shorter than the generation limit {}",
            config.execution.stable_generations, config.execution.generations
        );
        issues += 1;
    }

    print_parameters(&config);

    println!("{}", "=".repeat(50));
    if issues == 0 {
        println!("✓ Validation complete: No issues found");
    } else {
        println!("⚠️  Validation complete: {issues} warning(s)");
    }
    Ok(())
}
