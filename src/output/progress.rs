//! Inline progress line for the hashing pass.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

use crate::utils::formatters::format_size;

/// Redraws `Hashing files: 40% (4/10), 1.20 MB` in place on a TTY.
///
/// Off a terminal nothing is printed; counters are still tracked.
/// Redraws only happen when the whole-number percentage moves, so a run over
/// a million small files costs at most a hundred writes to stderr.
///
/// Dropping a progress that drew something but was never finished leaves the
/// cursor on a fresh line.
pub struct Progress {
    /// Label before the colon
    title: String,
    /// Items expected; zero disables drawing entirely
    total: usize,
    /// Items counted so far, capped at `total`
    done: usize,
    /// Bytes reported through [`Progress::advance`]
    bytes: u64,
    /// Last percentage drawn
    percent: u8,
    /// Whether stderr is a terminal
    is_tty: bool,
    /// Whether the current line holds a partial redraw
    drawn: bool,
}

impl Progress {
    /// Creates a progress line for `total` items, drawing only when stderr
    /// is a terminal.
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        Self::with_terminal(title, total, io::stderr().is_terminal())
    }

    fn with_terminal(title: &str, total: usize, is_tty: bool) -> Self {
        Self {
            title: title.to_string(),
            total,
            done: 0,
            bytes: 0,
            percent: 0,
            is_tty,
            drawn: false,
        }
    }

    /// Counts one more item and the bytes it cost.
    #[allow(clippy::cast_possible_truncation)]
    pub fn advance(&mut self, bytes: u64) {
        if self.total == 0 {
            return;
        }
        self.done = (self.done + 1).min(self.total);
        self.bytes += bytes;

        let percent = (self.done * 100 / self.total) as u8;
        if percent != self.percent || !self.drawn {
            self.percent = percent;
            self.draw();
        }
    }

    /// Items counted so far.
    #[must_use]
    pub const fn done(&self) -> usize {
        self.done
    }

    /// Bytes counted so far.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Ends the line with `, done.` if anything was drawn.
    pub fn finish(&mut self) {
        if self.is_tty && self.drawn {
            eprintln!(
                "\r{}: 100% ({}/{}), {}, done.",
                self.title.dimmed(),
                self.done,
                self.total,
                format_size(self.bytes)
            );
        }
        self.drawn = false;
    }

    fn draw(&mut self) {
        if !self.is_tty {
            return;
        }
        eprint!(
            "\r{}: {}% ({}/{}), {}",
            self.title.dimmed(),
            self.percent.to_string().dimmed(),
            self.done,
            self.total,
            format_size(self.bytes)
        );
        let _ = io::stderr().flush();
        self.drawn = true;
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.is_tty && self.drawn {
            eprintln!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_counts_and_bytes() {
        let mut progress = Progress::with_terminal("Hashing", 4, false);
        progress.advance(100);
        progress.advance(50);
        assert_eq!(progress.done(), 2);
        assert_eq!(progress.bytes(), 150);
        assert_eq!(progress.percent, 50);
    }

    #[test]
    fn test_advance_clamps_to_total() {
        let mut progress = Progress::with_terminal("Hashing", 1, false);
        progress.advance(1);
        progress.advance(1);
        assert_eq!(progress.done(), 1);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn test_zero_total_ignores_updates() {
        let mut progress = Progress::with_terminal("Hashing", 0, false);
        progress.advance(10);
        assert_eq!(progress.done(), 0);
        assert_eq!(progress.bytes(), 0);
    }
}
