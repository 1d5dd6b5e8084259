//! Layered render settings.
//!
//! Settings live under a `[pandoc]` table in one TOML file per scope. Keys
//! are addressed with dots (`docker.enabled`), each dot descending into a
//! nested table. The effective value of a key is taken from the most
//! specific scope that defines it, falling back to the built-in default.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use toml::{Table, Value};

use crate::config::SettingsCfg;

/// Table every scope file keeps its settings under.
pub const SECTION: &str = "pandoc";

/// Configuration layer, ordered from least to most specific.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Scope {
    Global,
    Workspace,
    Folder,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Global, Scope::Workspace, Scope::Folder];

    pub fn label(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Workspace => "workspace",
            Scope::Folder => "folder",
        }
    }

    fn index(self) -> usize {
        match self {
            Scope::Global => 0,
            Scope::Workspace => 1,
            Scope::Folder => 2,
        }
    }
}

/// Explicit per-scope values of one key, without defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inspection {
    pub global: Option<Value>,
    pub workspace: Option<Value>,
    pub folder: Option<Value>,
}

impl Inspection {
    pub fn at(&self, scope: Scope) -> Option<&Value> {
        match scope {
            Scope::Global => self.global.as_ref(),
            Scope::Workspace => self.workspace.as_ref(),
            Scope::Folder => self.folder.as_ref(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed reading settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed parsing settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed serializing {scope} settings: {source}")]
    Serialize {
        scope: &'static str,
        source: toml::ser::Error,
    },

    #[error("failed writing settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read/write access to layered settings.
pub trait SettingsStore {
    /// Values explicitly set at each scope.
    fn inspect(&self, key: &str) -> Inspection;

    /// Effective value: folder, then workspace, then global, then default.
    fn get(&self, key: &str) -> Option<Value>;

    /// Set (`Some`) or clear (`None`) a key at one scope.
    fn update(&mut self, key: &str, value: Option<Value>, scope: Scope)
    -> Result<(), SettingsError>;

    fn get_str(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

/// Built-in default for a key, as reported when no scope sets it.
pub fn default_value(key: &str) -> Option<Value> {
    let v = match key {
        "executable" | "defaultOutputFormat" | "docker.options" => Value::from(""),
        "docker.enabled" => Value::from(false),
        "docker.image" => Value::from("pandoc/latex"),
        "render.openViewer" => Value::from(true),
        k if k.ends_with("OptString") => Value::from(""),
        _ => return None,
    };
    Some(v)
}

/// Files backing each scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopePaths {
    pub global: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub folder: Option<PathBuf>,
}

impl ScopePaths {
    /// Locate the scope files for a document in `source_dir` opened within `workspace`.
    ///
    /// Both directories are normalized first. A folder file that is the
    /// workspace file is left out so the same file is never treated as two
    /// scopes.
    pub fn resolve(cfg: &SettingsCfg, workspace: &Path, source_dir: &Path) -> Self {
        let global = cfg.global.clone().or_else(default_global_path);
        let workspace_file = normalize(workspace)
            .join(&cfg.dir_name)
            .join(&cfg.file_name);
        let folder_file = normalize(source_dir)
            .join(&cfg.dir_name)
            .join(&cfg.file_name);
        let folder = (folder_file != workspace_file).then_some(folder_file);

        Self {
            global,
            workspace: Some(workspace_file),
            folder,
        }
    }

    fn at(&self, scope: Scope) -> Option<&PathBuf> {
        match scope {
            Scope::Global => self.global.as_ref(),
            Scope::Workspace => self.workspace.as_ref(),
            Scope::Folder => self.folder.as_ref(),
        }
    }
}

/// Drop `.` and resolve `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

fn default_global_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("pandoc-render").join("settings.toml"))
}

#[derive(Debug, Clone, Default)]
struct Layer {
    table: Table,
    path: Option<PathBuf>,
}

/// Settings store backed by (optional) TOML files, one per scope.
#[derive(Debug, Clone, Default)]
pub struct LayeredSettings {
    layers: [Layer; 3],
}

impl LayeredSettings {
    /// A store with no files behind it; updates only change memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Replace the contents of one scope with `table` (the file's top level).
    pub fn with_layer(mut self, scope: Scope, table: Table) -> Self {
        self.layers[scope.index()].table = table;
        self
    }

    pub fn load(paths: &ScopePaths) -> Result<Self, SettingsError> {
        let mut store = Self::default();
        for scope in Scope::ALL {
            let Some(path) = paths.at(scope) else {
                continue;
            };
            let layer = &mut store.layers[scope.index()];
            layer.path = Some(path.clone());
            if !path.exists() {
                continue;
            }
            let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
                path: path.clone(),
                source,
            })?;
            layer.table = raw.parse::<Table>().map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(scope = scope.label(), path = %path.display(), "loaded settings");
        }
        Ok(store)
    }

    fn persist(&self, scope: Scope) -> Result<(), SettingsError> {
        let layer = &self.layers[scope.index()];
        let Some(path) = &layer.path else {
            return Ok(());
        };
        let s = toml::to_string_pretty(&layer.table).map_err(|source| {
            SettingsError::Serialize {
                scope: scope.label(),
                source,
            }
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(path, s).map_err(|source| SettingsError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(scope = scope.label(), path = %path.display(), "wrote settings");
        Ok(())
    }
}

impl SettingsStore for LayeredSettings {
    fn inspect(&self, key: &str) -> Inspection {
        let at = |scope: Scope| lookup(&self.layers[scope.index()].table, key).cloned();
        Inspection {
            global: at(Scope::Global),
            workspace: at(Scope::Workspace),
            folder: at(Scope::Folder),
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        Scope::ALL
            .iter()
            .rev()
            .find_map(|s| lookup(&self.layers[s.index()].table, key).cloned())
            .or_else(|| default_value(key))
    }

    fn update(
        &mut self,
        key: &str,
        value: Option<Value>,
        scope: Scope,
    ) -> Result<(), SettingsError> {
        let table = &mut self.layers[scope.index()].table;
        let mut path: Vec<&str> = vec![SECTION];
        path.extend(key.split('.'));
        match value {
            Some(v) => insert(table, &path, v),
            None => {
                remove(table, &path);
            }
        }
        self.persist(scope)
    }
}

fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let mut current = table.get(SECTION)?;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

fn insert(table: &mut Table, path: &[&str], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            table.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = table
                .entry((*head).to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(child) = entry {
                insert(child, rest, value);
            }
        }
    }
}

/// Remove the leaf at `path`, dropping tables the removal leaves empty.
fn remove(table: &mut Table, path: &[&str]) -> Option<Value> {
    match path {
        [] => None,
        [leaf] => table.remove(*leaf),
        [head, rest @ ..] => {
            let child = table.get_mut(*head)?.as_table_mut()?;
            let removed = remove(child, rest);
            if child.is_empty() {
                table.remove(*head);
            }
            removed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> Table {
        src.parse().expect("valid toml")
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let store = LayeredSettings::in_memory();
        assert_eq!(store.get_str("docker.image"), "pandoc/latex");
        assert!(store.get_bool("render.openViewer"));
        assert!(!store.get_bool("docker.enabled"));
        assert_eq!(store.get_str("epubOptString"), "");
        assert_eq!(store.get("useDocker"), None);
    }

    #[test]
    fn test_most_specific_scope_wins() {
        let store = LayeredSettings::in_memory()
            .with_layer(Scope::Global, table("[pandoc]\nhtmlOptString = \"-s\"\n"))
            .with_layer(
                Scope::Workspace,
                table("[pandoc]\nhtmlOptString = \"--toc\"\n"),
            );
        assert_eq!(store.get_str("htmlOptString"), "--toc");

        let store = store.with_layer(
            Scope::Folder,
            table("[pandoc]\nhtmlOptString = \"--mathjax\"\n"),
        );
        assert_eq!(store.get_str("htmlOptString"), "--mathjax");
    }

    #[test]
    fn test_dotted_keys_read_nested_tables() {
        let store = LayeredSettings::in_memory().with_layer(
            Scope::Global,
            table("[pandoc.docker]\nenabled = true\nimage = \"pandoc/core\"\n"),
        );
        assert!(store.get_bool("docker.enabled"));
        assert_eq!(store.get_str("docker.image"), "pandoc/core");
    }

    #[test]
    fn test_inspect_reports_each_scope_without_defaults() {
        let store = LayeredSettings::in_memory()
            .with_layer(Scope::Global, table("[pandoc]\nuseDocker = true\n"))
            .with_layer(Scope::Folder, table("[pandoc]\nuseDocker = false\n"));
        let inspection = store.inspect("useDocker");
        assert_eq!(inspection.global, Some(Value::from(true)));
        assert_eq!(inspection.workspace, None);
        assert_eq!(inspection.folder, Some(Value::from(false)));
    }

    #[test]
    fn test_update_and_clear_in_memory() {
        let mut store = LayeredSettings::in_memory();
        store
            .update("docker.enabled", Some(Value::from(true)), Scope::Workspace)
            .expect("update");
        assert_eq!(
            store.inspect("docker.enabled").workspace,
            Some(Value::from(true))
        );

        store
            .update("docker.enabled", None, Scope::Workspace)
            .expect("clear");
        assert_eq!(store.inspect("docker.enabled"), Inspection::default());
        assert!(store.layers[Scope::Workspace.index()].table.is_empty());
    }

    #[test]
    fn test_update_persists_to_scope_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let global = temp.path().join("global").join("settings.toml");
        let paths = ScopePaths {
            global: Some(global.clone()),
            ..Default::default()
        };

        let mut store = LayeredSettings::load(&paths).expect("load missing file");
        store
            .update("pdfOptString", Some(Value::from("--pdf-engine=xelatex")), Scope::Global)
            .expect("update");

        let reloaded = LayeredSettings::load(&paths).expect("reload");
        assert_eq!(reloaded.get_str("pdfOptString"), "--pdf-engine=xelatex");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("settings.toml");
        fs::write(&path, "[pandoc\n").expect("write");
        let paths = ScopePaths {
            workspace: Some(path),
            ..Default::default()
        };
        let err = LayeredSettings::load(&paths).expect_err("should fail");
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_resolve_skips_folder_equal_to_workspace() {
        let cfg = SettingsCfg {
            global: Some(PathBuf::from("/etc/pandoc-render/settings.toml")),
            ..Default::default()
        };
        let paths = ScopePaths::resolve(&cfg, Path::new("/work"), Path::new("/work"));
        assert_eq!(paths.folder, None);
        assert_eq!(
            paths.workspace,
            Some(PathBuf::from("/work/.pandoc-render/settings.toml"))
        );

        let paths = ScopePaths::resolve(&cfg, Path::new("/work"), Path::new("/work/notes"));
        assert_eq!(
            paths.folder,
            Some(PathBuf::from("/work/notes/.pandoc-render/settings.toml"))
        );
    }

    #[test]
    fn test_resolve_normalizes_parent_components() {
        let cfg = SettingsCfg::default();
        let paths = ScopePaths::resolve(&cfg, Path::new("/work/./"), Path::new("/work/notes/.."));
        assert_eq!(paths.folder, None);
        assert_eq!(
            paths.workspace,
            Some(PathBuf::from("/work/.pandoc-render/settings.toml"))
        );

        let paths = ScopePaths::resolve(&cfg, Path::new("/work"), Path::new("/work/a/../b/./c"));
        assert_eq!(
            paths.folder,
            Some(PathBuf::from("/work/b/c/.pandoc-render/settings.toml"))
        );
    }

    #[test]
    fn test_normalize_keeps_leading_parents() {
        assert_eq!(normalize(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_workspace_file_reached_through_parent_dir_loads_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let workspace = temp.path().join("ws");
        fs::create_dir_all(workspace.join(".pandoc-render")).expect("mkdir");
        fs::create_dir_all(workspace.join("notes")).expect("mkdir");
        fs::write(
            workspace.join(".pandoc-render/settings.toml"),
            "[pandoc]\nuseDocker = true\n",
        )
        .expect("write");

        let cfg = SettingsCfg {
            global: Some(temp.path().join("global.toml")),
            ..Default::default()
        };
        let source_dir = workspace.join("notes").join("..");
        let paths = ScopePaths::resolve(&cfg, &workspace, &source_dir);
        let store = LayeredSettings::load(&paths).expect("load");

        let inspection = store.inspect("useDocker");
        assert_eq!(inspection.workspace, Some(Value::from(true)));
        assert_eq!(inspection.folder, None);
    }
}
