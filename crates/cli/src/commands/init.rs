use anyhow::{Context, Result};
use phylevo_format::write_config;
use phylevo_sim::simulation::Configuration;

use crate::args::InitArgs;
use crate::printing::print_parameters;

pub fn init_config(args: &InitArgs) -> Result<()> {
    let output = &args.output;

    println!("🧬 Phylevo - Phylogeny Search");
    println!("============================================\n");

    if output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let mut config = Configuration::default();
    args.overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    print_parameters(&config);

    write_config(output, &config)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Configuration written to {}", output.display());
    println!(
        "\n💡 Use 'phylevo run -a <alignment> -c {}' to start a search",
        output.display()
    );
    Ok(())
}
