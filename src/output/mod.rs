//! Terminal output for the `finv` commands.
//!
//! Status lines go to stderr and respect the global [`Verbosity`]; listings
//! and summaries that a user may pipe go to stdout.

mod progress;
/// Listings, summaries and the console observer for reconciliation runs.
pub mod report;

use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

pub use progress::Progress;
pub use report::ConsoleReporter;

/// How chatty the status output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet = 0,
    /// Status lines and summaries.
    Normal = 1,
    /// Also per-item detail lines.
    Verbose = 2,
}

impl Verbosity {
    /// Maps the `-v` / `-q` command-line flags to a level. Quiet wins.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Sets the process-wide level; call once at startup.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current process-wide level.
#[must_use]
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

fn is_quiet() -> bool {
    get_verbosity() == Verbosity::Quiet
}

/// Green status line, hidden in quiet mode.
pub fn success(message: &str) {
    if !is_quiet() {
        eprintln!("{}", message.green());
    }
}

/// Bold yellow, always shown.
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Dimmed status line, hidden in quiet mode.
pub fn info(message: &str) {
    if !is_quiet() {
        eprintln!("{}", message.dimmed());
    }
}

/// Dimmed detail line, shown only in verbose mode.
pub fn verbose(message: &str) {
    if get_verbosity() == Verbosity::Verbose {
        eprintln!("{}", message.dimmed());
    }
}

/// `<verb> <message>` with the verb dimmed, hidden in quiet mode.
pub fn action(verb: &str, message: &str) {
    if !is_quiet() {
        eprintln!("{} {}", verb.dimmed().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
    }

    #[test]
    #[serial]
    fn test_verbosity_round_trip() {
        for level in [Verbosity::Quiet, Verbosity::Verbose, Verbosity::Normal] {
            set_verbosity(level);
            assert_eq!(get_verbosity(), level);
        }
    }
}
