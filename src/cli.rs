use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pandoc-render", version)]
#[command(about = "Render documents to pdf, docx, html and more through pandoc or a pandoc container.")]
pub struct Args {
    /// Path to config TOML (defaults to ./pandoc-render.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render documents; without FILES there is nothing open and nothing happens
    Render(RenderCmd),
    /// List the output formats and the setting holding their extra arguments
    Formats,
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Parser)]
pub struct RenderCmd {
    /// Documents to render, concurrently when more than one is given
    pub files: Vec<PathBuf>,

    /// Output format (pdf, docx, html, asciidoc, docbook, epub, rst).
    /// Falls back to `defaultOutputFormat`, then to an interactive picker.
    #[arg(long)]
    pub to: Option<String>,

    /// Workspace root holding the workspace-scope settings (defaults to the current directory)
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}
