//! Terminal summary output.
//!
//! Logs go through `tracing`; this module only prints the short human
//! summary at the end of a command, to stderr.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress summaries for the rest of the process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Color is on for a terminal unless `NO_COLOR` is set.
pub fn color_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn ok_sym(&self) -> String {
        self.paint(GREEN, "\u{2713}", "OK")
    }

    pub fn warn_sym(&self) -> String {
        self.paint(YELLOW, "\u{26a0}", "??")
    }

    pub fn fail_sym(&self) -> String {
        self.paint(RED, "\u{2717}", "!!")
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s, s)
    }

    fn paint(&self, code: &str, colored: &str, fallback: &str) -> String {
        if self.use_color {
            format!("{code}{colored}{RESET}")
        } else {
            fallback.to_string()
        }
    }
}

/// Print the command banner.
pub fn print_header(s: &Styled, command: &str) {
    eprintln!(
        "  {} {} {}",
        s.bold("hreflang-sitemap"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION"))),
        command
    );
    eprintln!();
}

/// Print a result line with symbol and label/value.
pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("    {symbol} {label:<20} {value}");
}

/// Format a duration in seconds (e.g. "2m 5s").
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
