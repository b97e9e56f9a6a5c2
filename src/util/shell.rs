//! Terminal output.
//!
//! All user-facing output goes through [`Shell`]:
//! - status lines, the status word right-aligned to 12 columns
//! - a spinner for slow remote queries
//! - JSON mode, where stdout carries only machine-readable documents
//!
//! Human and JSON mode are mutually exclusive.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Shell output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors and a spinner.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    #[default]
    Normal,
    /// --verbose: debug logging, no spinner
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status words for output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Removed,
    Merged,

    // In-progress statuses (cyan)
    Querying,

    // Info statuses (blue)
    Info,
    DryRun,

    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Removed => "Removed",
            Status::Merged => "Merged",
            Status::Querying => "Querying",
            Status::Info => "Info",
            Status::DryRun => "Would remove",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Removed | Status::Merged => "\x1b[1;32m",
            Status::Querying => "\x1b[1;36m",
            Status::Info | Status::DryRun => "\x1b[1;34m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags. JSON mode takes precedence over
    /// quiet/verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let verbosity = if quiet {
                Verbosity::Quiet
            } else if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Normal
            };
            ShellMode::Human { verbosity, color }
        };

        Shell::new(mode)
    }

    pub fn mode(&self) -> &ShellMode {
        &self.mode
    }

    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status line to stderr: `{status:>12} {message}`.
    ///
    /// Quiet mode keeps only errors; JSON mode drops everything.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }
        if self.is_quiet() && status != Status::Error {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print an error. In JSON mode this is an error document on stdout.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.print_json(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string()
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Print a plain result line to stdout (human mode only).
    pub fn print_line(&self, line: impl Display) {
        if self.is_json() {
            return;
        }
        println!("{}", line);
    }

    /// Pretty-print a JSON document to stdout (JSON mode only).
    pub fn print_json(&self, value: &serde_json::Value) {
        if !self.is_json() {
            return;
        }
        let text = serde_json::to_string_pretty(value).unwrap_or_default();
        println!("{}", text);
        let _ = io::stdout().flush();
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Start a spinner for an operation of unknown length.
    ///
    /// Only drawn in normal mode on a terminal; otherwise the message is a
    /// plain status line (or nothing, when quiet/JSON).
    pub fn spinner(&self, status: Status, msg: impl Display) -> Spinner {
        let message = msg.to_string();
        let draw = !self.is_quiet()
            && !self.is_verbose()
            && !self.is_json()
            && io::stderr().is_terminal();

        if !draw {
            self.status(status, &message);
            return Spinner { pb: None };
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        Spinner { pb: Some(pb) }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// A running spinner; cleared on drop.
pub struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn finish(self) {}
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}
