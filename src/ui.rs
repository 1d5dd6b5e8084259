use dialoguer::Select;

use crate::format::Format;

/// User-facing feedback and prompts of the host.
pub trait Ui: Send + Sync {
    /// Transient status line text.
    fn set_status(&self, text: &str);

    fn show_warning(&self, message: &str);

    fn show_error(&self, message: &str);

    /// Single-select prompt over `formats`. `None` when dismissed.
    fn pick_format(&self, formats: &[Format]) -> Option<Format>;
}

/// Terminal host: status and notifications on stderr, picker via `dialoguer`.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl Ui for TerminalUi {
    fn set_status(&self, text: &str) {
        eprintln!("{text}");
    }

    fn show_warning(&self, message: &str) {
        eprintln!("⚠ {message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("✗ {message}");
    }

    fn pick_format(&self, formats: &[Format]) -> Option<Format> {
        let items: Vec<String> = formats
            .iter()
            .map(|f| format!("{:<9} {}", f.id(), f.description()))
            .collect();

        match Select::new()
            .with_prompt("Output format")
            .items(&items)
            .default(0)
            .interact_opt()
        {
            Ok(choice) => choice.and_then(|i| formats.get(i).copied()),
            Err(e) => {
                tracing::warn!(error = %e, "format picker unavailable");
                None
            }
        }
    }
}
