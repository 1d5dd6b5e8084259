//! Render the document being edited through pandoc, either a host-installed
//! binary or a pandoc container image.
//!
//! [`controller::Controller`] runs one render action against the host
//! services it is given: a [`ui::Ui`], the [`channel::OutputChannel`], a
//! [`runner::ShellRunner`] and a [`viewer::Viewer`]. Settings come from a
//! [`settings::SettingsStore`] read fresh for every render.

pub mod channel;
pub mod cli;
pub mod command;
pub mod config;
pub mod controller;
pub mod format;
pub mod migrate;
pub mod pipeline;
pub mod runner;
pub mod settings;
pub mod ui;
pub mod viewer;

#[cfg(test)]
mod testing;
