use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use std::path::{Path, PathBuf};

use crate::{
    channel::OutputChannel,
    cli::RenderCmd,
    config::Config,
    controller::{Controller, RenderOutcome},
    format::Format,
    runner::SystemShell,
    settings::{LayeredSettings, ScopePaths, SettingsError},
    ui::{TerminalUi, Ui},
    viewer::SystemViewer,
};

pub const CHANNEL_NAME: &str = "Pandoc";

pub async fn run_render(cmd: RenderCmd, cfg: &Config) -> Result<()> {
    let workspace = match &cmd.workspace {
        Some(w) => std::path::absolute(w)
            .with_context(|| format!("bad workspace path: {}", w.display()))?,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let channel = open_channel(cfg)?;
    let ui = TerminalUi;
    let controller = Controller::new(&ui, &channel, &SystemShell, &SystemViewer);

    let documents: Vec<Option<PathBuf>> = if cmd.files.is_empty() {
        vec![None]
    } else {
        cmd.files
            .iter()
            .map(|f| {
                std::path::absolute(f)
                    .with_context(|| format!("bad document path: {}", f.display()))
                    .map(Some)
            })
            .collect::<Result<_>>()?
    };
    tracing::info!(documents = documents.len(), workspace = %workspace.display(), "render requested");

    let renders = documents.iter().map(|doc| {
        render_one(
            &controller,
            &ui,
            &channel,
            cfg,
            &workspace,
            doc.as_deref(),
            cmd.to.as_deref(),
        )
    });
    let outcomes = join_all(renders).await;

    let failed = outcomes
        .iter()
        .filter(|o| **o == RenderOutcome::Failed)
        .count();
    if failed > 0 {
        return Err(anyhow!("{failed} of {} renders failed", outcomes.len()));
    }
    Ok(())
}

async fn render_one(
    controller: &Controller<'_>,
    ui: &dyn Ui,
    channel: &OutputChannel,
    cfg: &Config,
    workspace: &Path,
    document: Option<&Path>,
    requested: Option<&str>,
) -> RenderOutcome {
    if document.is_none() {
        return controller.render(None, requested, &mut LayeredSettings::in_memory()).await;
    }
    let mut settings = match load_settings(cfg, workspace, document) {
        Ok(s) => s,
        Err(e) => {
            channel.append(&format!("{e}\n"));
            ui.show_error(&e.to_string());
            return RenderOutcome::Failed;
        }
    };
    controller.render(document, requested, &mut settings).await
}

fn load_settings(
    cfg: &Config,
    workspace: &Path,
    document: Option<&Path>,
) -> Result<LayeredSettings, SettingsError> {
    let source_dir = document.and_then(Path::parent).unwrap_or(workspace);
    let paths = ScopePaths::resolve(&cfg.settings, workspace, source_dir);
    tracing::debug!(?paths, "settings scopes");
    LayeredSettings::load(&paths)
}

fn open_channel(cfg: &Config) -> Result<OutputChannel> {
    match &cfg.channel.path {
        Some(path) => OutputChannel::open(CHANNEL_NAME, path)
            .with_context(|| format!("failed opening output channel: {}", path.display())),
        None => Ok(OutputChannel::stdout(CHANNEL_NAME)),
    }
}

pub fn print_formats() {
    for format in Format::ALL {
        println!(
            "{:<9} {:<18} {}",
            format.id(),
            format.options_key(),
            format.description()
        );
    }
}
