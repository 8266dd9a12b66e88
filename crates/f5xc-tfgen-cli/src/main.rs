//! f5xc-tfgen CLI entrypoint
//! Parses command-line arguments, layers them over the discovered config and runs one batch.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use f5xc_tfgen_core::{generate, GeneratorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "f5xc-tfgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the F5XC OpenAPI JSON exports
    #[arg(long)]
    spec_dir: Option<PathBuf>,
    /// Glob matched against spec file names
    #[arg(long)]
    pattern: Option<String>,
    /// Provider package directory for resources and data sources
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Client package directory for request/response structs
    #[arg(long)]
    client_dir: Option<PathBuf>,
    /// Custom template directory with its own manifest
    #[arg(long)]
    template_dir: Option<PathBuf>,
    /// Terraform provider prefix for resource type names
    #[arg(long)]
    provider_name: Option<String>,
    /// Maximum nesting depth of generated blocks
    #[arg(long)]
    max_depth: Option<usize>,
    /// Fail a resource on an unresolved schema reference
    #[arg(long)]
    strict_refs: bool,
    /// Render everything but write nothing
    #[arg(long)]
    dry_run: bool,
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
    /// Config file (default: ./f5xc-tfgen.yaml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective configuration to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(dir) = &self.spec_dir {
            config.spec_dir = dir.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.spec_pattern = pattern.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.client_dir {
            config.client_dir = dir.clone();
        }
        if let Some(dir) = &self.template_dir {
            config.template_dir = Some(dir.clone());
        }
        if let Some(name) = &self.provider_name {
            config.provider_name = name.clone();
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        config.strict_refs |= self.strict_refs;
        config.dry_run |= self.dry_run;
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = GeneratorConfig::discover(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    if let Some(path) = &cli.write_config {
        config.validate()?;
        config
            .save(path)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    tracing::info!(
        "Generating from {} into {} and {}",
        config.spec_dir.display(),
        config.output_dir.display(),
        config.client_dir.display()
    );

    let summary = generate(&config)
        .await
        .with_context(|| format!("Generation from {} failed", config.spec_dir.display()))?;

    for skipped in &summary.skipped {
        println!("{skipped}");
    }
    for failed in &summary.failed {
        println!("{failed}");
    }
    for reference in &summary.unresolved_refs {
        println!("unresolved reference {reference} fell back to string");
    }
    println!("{summary}");
    Ok(())
}
