//! Colored terminal output.
//!
//! Human-facing status lines. Diagnostics go through `log`; this is what the
//! person running a release reads.

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Writes status messages, honoring verbose and quiet switches.
///
/// Errors always print; everything else is silenced by `quiet`.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a message only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            writeln!(io::stdout().lock(), "{}", message.dimmed())?;
        }
        Ok(())
    }

    /// Print a plain message.
    pub fn info(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout().lock(), "{message}")?;
        }
        Ok(())
    }

    /// Print a warning to stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stderr().lock(), "{} {}", "warning:".yellow().bold(), message)?;
        }
        Ok(())
    }

    /// Print an error to stderr.
    pub fn error(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr().lock(), "{} {}", "error:".red().bold(), message)
    }

    /// Print a success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout().lock(), "{} {}", "✓".green(), message)?;
        }
        Ok(())
    }

    /// Print a progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout().lock(), "{} {}", "→".cyan(), message)?;
        }
        Ok(())
    }

    /// Print a section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            let mut out = io::stdout().lock();
            writeln!(out)?;
            writeln!(out, "{}", title.bold())?;
        }
        Ok(())
    }

    /// Print indented text.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout().lock(), "  {message}")?;
        }
        Ok(())
    }
}
