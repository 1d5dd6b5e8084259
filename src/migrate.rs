//! Migration of the deprecated `useDocker` switch to `docker.enabled`.
//!
//! Each scope is handled on its own. Migrating clears the old key at that
//! scope, so a scope is only ever migrated (and warned about) once.

use toml::Value;

use crate::{
    channel::OutputChannel,
    settings::{Inspection, Scope, SettingsStore},
    ui::Ui,
};

pub const DEPRECATED_KEY: &str = "useDocker";
pub const REPLACEMENT_KEY: &str = "docker.enabled";

/// A scope still carrying the deprecated key, and the value to move.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub scope: Scope,
    pub value: Value,
}

/// Scopes needing migration, in global, workspace, folder order.
pub fn plan(deprecated: &Inspection) -> Vec<Migration> {
    Scope::ALL
        .into_iter()
        .filter_map(|scope| {
            deprecated.at(scope).map(|value| Migration {
                scope,
                value: value.clone(),
            })
        })
        .collect()
}

pub fn log_notice(scope: Scope) -> String {
    format!(
        "migrating {} configuration \"pandoc.{DEPRECATED_KEY}\" -> \"pandoc.{REPLACEMENT_KEY}\"\n",
        scope.label()
    )
}

pub fn warning(scope: Scope) -> String {
    format!(
        "pandoc: found deprecated value in {} configuration. Migrating configuration \"pandoc.{DEPRECATED_KEY}\" -> \"pandoc.{REPLACEMENT_KEY}\".",
        scope.label()
    )
}

/// Migrate every scope that still has the deprecated key. Returns the
/// migrations that were written.
pub fn run(settings: &mut dyn SettingsStore, log: &OutputChannel, ui: &dyn Ui) -> Vec<Migration> {
    let mut applied = Vec::new();

    for migration in plan(&settings.inspect(DEPRECATED_KEY)) {
        let scope = migration.scope;
        log.append(&log_notice(scope));
        ui.show_warning(&warning(scope));
        tracing::warn!(
            scope = scope.label(),
            from = DEPRECATED_KEY,
            to = REPLACEMENT_KEY,
            "migrating deprecated setting"
        );

        let written = settings
            .update(REPLACEMENT_KEY, Some(migration.value.clone()), scope)
            .and_then(|()| settings.update(DEPRECATED_KEY, None, scope));
        match written {
            Ok(()) => applied.push(migration),
            Err(e) => {
                log.append(&format!("migration error: {e}\n"));
                ui.show_error(&format!("migration error: {e}"));
                tracing::error!(scope = scope.label(), error = %e, "setting migration failed");
            }
        }
    }

    applied
}
