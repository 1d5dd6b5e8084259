use std::{path::Path, process::Stdio};

use crate::{command::quote, runner::shell};

/// Opens a rendered document for the user.
pub trait Viewer: Send + Sync {
    /// Fire-and-forget; nothing is reported back.
    fn open(&self, path: &Path);
}

/// Shell line opening `path` with the default application on `os`
/// (a `std::env::consts::OS` value).
///
/// Outside macOS and Linux the quoted path itself is the command.
pub fn opener_line(os: &str, path: &Path) -> String {
    let target = quote(&path.display().to_string());
    match os {
        "macos" => format!("open {target}"),
        "linux" => format!("xdg-open {target}"),
        _ => target,
    }
}

#[derive(Debug, Default)]
pub struct SystemViewer;

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) {
        let line = opener_line(std::env::consts::OS, path);
        tracing::info!(line = line.as_str(), "launching viewer");
        let spawned = shell(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = spawned {
            tracing::warn!(error = %e, line = line.as_str(), "viewer did not start");
        }
    }
}
