//! # Output Configuration
//!
//! Controls how the CLI decorates its terminal output: colored status words,
//! emoji markers and whether a live progress bar is drawn.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! The report file is never decorated; only terminal output is.

use std::env;

use console::{style, Term};

use crate::report::RunStatus;

/// Output configuration for terminal decoration.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
    /// Whether stderr is an interactive terminal (live progress bar).
    pub interactive: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is `always`, `never` or `auto`. In auto mode colors are
    /// disabled by `NO_COLOR`, `CLICOLOR=0`, `TERM=dumb` or a non-TTY stdout
    /// (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self {
            use_color,
            interactive: Term::stderr().is_term(),
        }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        Term::stdout().features().colors_supported()
    }

    /// Headline for a finished run, e.g. `✅ Merge completed`.
    pub fn status_line(&self, status: RunStatus) -> String {
        match status {
            RunStatus::Clean => {
                let word = self.paint_ok("Merge completed");
                format!("{} {}", emoji(self, "✅", "[OK]"), word)
            }
            RunStatus::CompletedWithErrors(n) => {
                let word = self.paint_warn(&format!("Merge completed with {} errors", n));
                format!("{} {}", emoji(self, "⚠️", "[WARN]"), word)
            }
        }
    }

    fn paint_ok(&self, text: &str) -> String {
        if self.use_color {
            style(text).green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_warn(&self, text: &str) -> String {
        if self.use_color {
            style(text).yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain alternative otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
    }

    #[test]
    fn test_color_never() {
        assert!(!OutputConfig::from_env_and_flag("never").use_color);
    }

    fn plain() -> OutputConfig {
        OutputConfig {
            use_color: false,
            interactive: false,
        }
    }

    #[test]
    fn test_status_line_plain() {
        let config = plain();
        assert_eq!(config.status_line(RunStatus::Clean), "[OK] Merge completed");
        assert_eq!(
            config.status_line(RunStatus::CompletedWithErrors(2)),
            "[WARN] Merge completed with 2 errors"
        );
    }

    #[test]
    fn test_emoji_helper() {
        let mut config = plain();
        assert_eq!(emoji(&config, "🔍", "[SCAN]"), "[SCAN]");
        config.use_color = true;
        assert_eq!(emoji(&config, "🔍", "[SCAN]"), "🔍");
    }
}
