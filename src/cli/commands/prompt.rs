//! Terminal confirmation for destructive commands.

use std::io::{self, BufRead, IsTerminal, Write};

use tracing::warn;

use crate::grid::Confirm;

/// Asks on stderr and reads the answer from stdin.
///
/// `--yes` answers every prompt. Without it, a non-interactive stdin
/// declines so scripts never block on input.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            warn!(prompt, "stdin is not interactive; declining (pass --yes to confirm)");
            return false;
        }

        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
