//! Recording stand-ins for the host collaborators.

use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    command::ShellCommand,
    format::Format,
    runner::{ProcessOutcome, ShellRunner},
    settings::{LayeredSettings, Scope, ScopePaths},
    ui::Ui,
    viewer::Viewer,
};

/// Store whose global layer holds `global` but whose file sits under a
/// regular file in `dir`, so every global write fails.
pub fn unwritable_global(dir: &Path, global: &str) -> LayeredSettings {
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker");
    let paths = ScopePaths {
        global: Some(blocker.join("settings.toml")),
        ..Default::default()
    };
    LayeredSettings::load(&paths)
        .expect("load missing file")
        .with_layer(Scope::Global, global.parse().expect("valid toml"))
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    statuses: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    pick: Option<Format>,
    prompts: AtomicUsize,
}

impl RecordingUi {
    /// A UI whose picker answers with `pick` (`None` = dismissed).
    pub fn picking(pick: Option<Format>) -> Self {
        Self {
            pick,
            ..Default::default()
        }
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("lock").clone()
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Ui for RecordingUi {
    fn set_status(&self, text: &str) {
        self.statuses.lock().expect("lock").push(text.to_string());
    }

    fn show_warning(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().expect("lock").push(message.to_string());
    }

    fn pick_format(&self, formats: &[Format]) -> Option<Format> {
        assert_eq!(formats, Format::ALL.as_slice());
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.pick
    }
}

/// Answers every command with the same outcome and remembers what it ran.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outcome: ProcessOutcome,
    commands: Mutex<Vec<ShellCommand>>,
}

impl ScriptedRunner {
    pub fn new(outcome: ProcessOutcome) -> Self {
        Self {
            outcome,
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<ShellCommand> {
        self.commands.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ShellRunner for ScriptedRunner {
    async fn run(&self, command: &ShellCommand) -> ProcessOutcome {
        self.commands.lock().expect("lock").push(command.clone());
        tokio::task::yield_now().await;
        self.outcome.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingViewer {
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingViewer {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().expect("lock").clone()
    }
}

impl Viewer for RecordingViewer {
    fn open(&self, path: &Path) {
        self.opened.lock().expect("lock").push(path.to_path_buf());
    }
}
