//! Terminal presentation for the CLI binary.

use crate::defaults::PROVISIONAL_MARKER;
use crate::error::Result;
use crate::sink::TranscriptSink;
use owo_colors::OwoColorize;
use std::io::Write;

/// Colored stdout sink for interactive use.
///
/// Committed lines print plainly as they arrive; the provisional line is
/// shown dimmed and rewritten in place. Quiet mode drops provisional
/// updates entirely.
pub struct TerminalSink {
    quiet: bool,
    committed_printed: usize,
    provisional_width: usize,
}

impl TerminalSink {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            committed_printed: 0,
            provisional_width: 0,
        }
    }

    fn clear_provisional(&mut self) {
        if self.provisional_width > 0 {
            print!("\r{:width$}\r", "", width = self.provisional_width);
            self.provisional_width = 0;
        }
    }
}

impl TranscriptSink for TerminalSink {
    fn update(&mut self, lines: &[String]) -> Result<()> {
        let provisional = lines
            .last()
            .filter(|line| line.starts_with(PROVISIONAL_MARKER));
        let committed_count = if provisional.is_some() {
            lines.len() - 1
        } else {
            lines.len()
        };

        self.clear_provisional();

        for line in &lines[self.committed_printed..committed_count] {
            println!("{}", line);
        }
        self.committed_printed = committed_count;

        if let Some(provisional) = provisional
            && !self.quiet
        {
            print!("{}", provisional.dimmed());
            self.provisional_width = provisional.chars().count();
        }
        let _ = std::io::stdout().flush();
        Ok(())
    }

    fn finish(&mut self) {
        self.clear_provisional();
        let _ = std::io::stdout().flush();
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
