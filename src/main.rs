use anyhow::Result;
use clap::Parser;
use pandoc_render::{cli, config, pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    let cfg = config::Config::load(args.config.as_deref())?;
    config::init_tracing(&cfg.logging, args.log_level.as_deref())?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pandoc-render starting");

    match args.command {
        cli::Command::Render(cmd) => pipeline::run_render(cmd, &cfg).await,
        cli::Command::Formats => {
            pipeline::print_formats();
            Ok(())
        }
        cli::Command::PrintDefaultConfig => {
            let s = cfg.to_toml_pretty()?;
            print!("{s}");
            Ok(())
        }
    }
}
