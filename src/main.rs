use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use gallery_manifest::{cli, logging, pipeline};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let verbosity = logging::Verbosity::from_flags(args.verbose, args.quiet);
    logging::init(verbosity);

    args.validate().context("Invalid arguments")?;
    let config = args.to_config().context("Invalid configuration")?;

    let summary = pipeline::run(&config).with_context(|| {
        format!(
            "Failed to build manifest at {}",
            config.output_path.display()
        )
    })?;

    if verbosity.shows_summary() {
        println!("{summary}");
        println!("Manifest written to {}", config.output_path.display());
    }

    Ok(())
}
