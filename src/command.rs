//! Shell command construction for one render.

use std::path::{Path, PathBuf};

use crate::{format::Format, settings::SettingsStore};

/// Tool invoked when no executable override is configured.
pub const PANDOC: &str = "pandoc";

/// Mount point of the source directory inside the container.
pub const CONTAINER_DATA_DIR: &str = "/data";

/// The document being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    source_path: PathBuf,
    source_dir: PathBuf,
    file_name: String,
    base_name: String,
    requested_format: Option<String>,
}

impl RenderRequest {
    /// `None` when `source` has no file name.
    pub fn new(source: &Path, requested_format: Option<String>) -> Option<Self> {
        let file_name = source.file_name()?.to_string_lossy().into_owned();
        let base_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        let source_dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Some(Self {
            source_path: source_dir.join(&file_name),
            source_dir,
            file_name,
            base_name,
            requested_format,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn requested_format(&self) -> Option<&str> {
        self.requested_format.as_deref()
    }

    /// `<base name>.<format>`, placed next to the source.
    pub fn output_path(&self, format: Format) -> PathBuf {
        self.source_dir.join(self.output_file_name(format))
    }

    fn output_file_name(&self, format: Format) -> String {
        format!("{}.{}", self.base_name, format.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerMode {
    pub enabled: bool,
    pub image: String,
    pub options: String,
}

/// Settings that shape the command line, read once per render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfiguration {
    /// `None` when the `executable` setting is empty.
    pub executable: Option<String>,
    /// Extra arguments for the format being rendered.
    pub extra_options: String,
    pub container: ContainerMode,
    pub open_viewer: bool,
}

impl RenderConfiguration {
    pub fn read(settings: &dyn SettingsStore, format: Format) -> Self {
        let executable = settings.get_str("executable");
        Self {
            executable: (!executable.is_empty()).then_some(executable),
            extra_options: settings.get_str(format.options_key()),
            container: ContainerMode {
                enabled: settings.get_bool("docker.enabled"),
                image: settings.get_str("docker.image"),
                options: settings.get_str("docker.options"),
            },
            open_viewer: settings.get_bool("render.openViewer"),
        }
    }
}

/// A command line ready for the host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub line: String,
    pub working_dir: PathBuf,
    pub output_path: PathBuf,
}

/// Wrap the whole of `s` in double quotes.
///
/// Embedded quotes are passed through untouched, so a path containing `"`
/// yields a malformed command line.
pub fn quote(s: &str) -> String {
    format!("\"{s}\"")
}

pub fn build(request: &RenderRequest, format: Format, config: &RenderConfiguration) -> ShellCommand {
    let output_path = request.output_path(format);

    let parts: Vec<String> = if config.container.enabled {
        vec![
            "docker run --rm -v".to_string(),
            quote(&format!(
                "{}:{CONTAINER_DATA_DIR}",
                request.source_dir().display()
            )),
            config.container.options.clone(),
            config.container.image.clone(),
            quote(request.file_name()),
            "-o".to_string(),
            quote(&request.output_file_name(format)),
            config.extra_options.clone(),
        ]
    } else {
        vec![
            config
                .executable
                .as_deref()
                .map(quote)
                .unwrap_or_else(|| PANDOC.to_string()),
            quote(&request.source_path().display().to_string()),
            "-o".to_string(),
            quote(&output_path.display().to_string()),
            config.extra_options.clone(),
        ]
    };

    let line = parts
        .into_iter()
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    ShellCommand {
        line,
        working_dir: request.source_dir().to_path_buf(),
        output_path,
    }
}
