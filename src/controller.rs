//! The render action: pick a format, run pandoc, report, open the result.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::Instrument;

use crate::{
    channel::OutputChannel,
    command::{self, RenderConfiguration, RenderRequest, ShellCommand},
    format::{Format, UnknownFormat},
    migrate,
    runner::{ProcessOutcome, ShellRunner},
    settings::SettingsStore,
    ui::Ui,
    viewer::Viewer,
};

pub const DEFAULT_FORMAT_KEY: &str = "defaultOutputFormat";

/// How a render invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No document was open.
    NoDocument,
    /// The format picker was dismissed.
    Cancelled,
    /// An error was reported to the user.
    Failed,
    Rendered {
        output: PathBuf,
        viewer_launched: bool,
    },
}

pub fn status_text(what: &str, format: &str) -> String {
    format!("{what} [{format}] {}", Local::now().format("%H:%M:%S"))
}

/// Drives one render per call against borrowed host services.
pub struct Controller<'a> {
    ui: &'a dyn Ui,
    log: &'a OutputChannel,
    runner: &'a dyn ShellRunner,
    viewer: &'a dyn Viewer,
}

impl<'a> Controller<'a> {
    pub fn new(
        ui: &'a dyn Ui,
        log: &'a OutputChannel,
        runner: &'a dyn ShellRunner,
        viewer: &'a dyn Viewer,
    ) -> Self {
        Self {
            ui,
            log,
            runner,
            viewer,
        }
    }

    /// Explicit request, then the configured default, then the picker.
    ///
    /// `Ok(None)` means the picker was dismissed. Empty strings count as unset.
    pub fn resolve_format(
        &self,
        requested: Option<&str>,
        settings: &dyn SettingsStore,
    ) -> Result<Option<Format>, UnknownFormat> {
        let chosen = match requested.filter(|s| !s.is_empty()) {
            Some(id) => Some(id.to_string()),
            None => Some(settings.get_str(DEFAULT_FORMAT_KEY)).filter(|d| !d.is_empty()),
        };

        match chosen {
            Some(id) => id.parse().map(Some),
            None => Ok(self.ui.pick_format(&Format::ALL)),
        }
    }

    /// Render `document` (the active document, if any).
    pub async fn render(
        &self,
        document: Option<&Path>,
        requested: Option<&str>,
        settings: &mut dyn SettingsStore,
    ) -> RenderOutcome {
        let Some(request) =
            document.and_then(|d| RenderRequest::new(d, requested.map(str::to_string)))
        else {
            tracing::debug!("no active document, nothing to render");
            return RenderOutcome::NoDocument;
        };

        let span = tracing::info_span!(
            "render",
            source = %request.source_path().display(),
            requested = ?request.requested_format()
        );
        self.render_request(&request, settings).instrument(span).await
    }

    async fn render_request(
        &self,
        request: &RenderRequest,
        settings: &mut dyn SettingsStore,
    ) -> RenderOutcome {
        let format = match self.resolve_format(request.requested_format(), settings) {
            Ok(Some(format)) => format,
            Ok(None) => {
                tracing::debug!("format selection dismissed");
                return RenderOutcome::Cancelled;
            }
            Err(e) => {
                self.log.append(&format!("{e}\n"));
                self.ui.show_error(&e.to_string());
                tracing::warn!(error = %e, "cannot render");
                return RenderOutcome::Failed;
            }
        };
        tracing::info!(%format, "format selected");

        self.ui.set_status(&status_text("Generating", format.id()));

        migrate::run(settings, self.log, self.ui);

        let config = RenderConfiguration::read(settings, format);
        let command = command::build(request, format, &config);
        tracing::debug!(
            line = command.line.as_str(),
            container = config.container.enabled,
            "built render command"
        );

        let outcome = self.runner.run(&command).await;
        self.complete(format, &command, &config, outcome)
    }

    fn complete(
        &self,
        format: Format,
        command: &ShellCommand,
        config: &RenderConfiguration,
        outcome: ProcessOutcome,
    ) -> RenderOutcome {
        if !outcome.stdout.is_empty() {
            self.log.append(&format!("{}\n", outcome.stdout));
        }

        // any stderr output counts as a failure, warnings included
        let stderr_seen = !outcome.stderr.is_empty();
        if stderr_seen {
            self.ui.show_error(&format!("stderr: {}", outcome.stderr));
            self.log.append(&format!("stderr: {}\n", outcome.stderr));
        }

        if let Some(err) = outcome.terminal_error {
            self.ui.show_error(&format!("exec error: {err}"));
            self.log.append(&format!("exec error: {err}\n"));
            tracing::warn!(error = err.as_str(), "render failed");
            return RenderOutcome::Failed;
        }

        if stderr_seen {
            tracing::warn!("render reported errors, viewer not launched");
            return RenderOutcome::Failed;
        }

        tracing::info!(output = %command.output_path.display(), "render finished");

        let viewer_launched = config.open_viewer;
        if viewer_launched {
            self.ui.set_status(&status_text("Launching", format.id()));
            self.viewer.open(&command.output_path);
        }

        RenderOutcome::Rendered {
            output: command.output_path.clone(),
            viewer_launched,
        }
    }
}
