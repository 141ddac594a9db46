//! Console rendering and prompts for the interaction loop.
//!
//! Every console path has a `_with_io` variant taking injected streams so the
//! rendering and choice parsing can be tested with in-memory buffers.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::warn;

use crate::session::UserChoice;

/// The rendering and input surface the interaction loop drives.
///
/// Implemented by [`ConsoleUi`] in production and by scripted mocks in tests.
pub trait Ui: Send + Sync {
    fn show_command(&self, command: &str);
    fn show_warning(&self, consequences: &str);
    fn show_explanation(&self, explanation: &str);

    /// Presents the action menu and returns the user's choice.
    fn choose_action(&self) -> Result<UserChoice>;

    /// Reads a free-text revision instruction. May be empty.
    fn read_revision(&self) -> Result<String>;

    /// Reads a replacement command, defaulting to `current` on empty input.
    fn read_manual_edit(&self, current: &str) -> Result<String>;
}

/// Production UI on stdin/stdout.
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }

    pub fn show_command_with_io<W: Write>(&self, command: &str, output: &mut W) -> Result<()> {
        writeln!(output, "\n ==================== Command ====================\n")?;
        for line in command.lines() {
            writeln!(output, " {line}")?;
        }
        writeln!(output)?;
        Ok(())
    }

    pub fn show_warning_with_io<W: Write>(
        &self,
        consequences: &str,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, " Warning: {consequences}\n")?;
        Ok(())
    }

    pub fn show_explanation_with_io<W: Write>(
        &self,
        explanation: &str,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, " ================== Explanation ==================\n")?;
        for line in explanation.lines() {
            writeln!(output, " {line}")?;
        }
        writeln!(output)?;
        Ok(())
    }

    pub fn choose_action_with_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<UserChoice> {
        writeln!(output, "Select an action:")?;
        writeln!(output, "  1) Run this command")?;
        writeln!(output, "  2) Revise query")?;
        writeln!(output, "  3) Edit manually")?;
        writeln!(output, "  4) Exit")?;

        loop {
            write!(output, "\nChoose an option (1/2/3/4): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                // End of input behaves like choosing Exit.
                return Ok(UserChoice::Exit);
            }

            match line.trim() {
                "1" => return Ok(UserChoice::RunCommand),
                "2" => return Ok(UserChoice::ReviseQuery),
                "3" => return Ok(UserChoice::EditManually),
                "4" => return Ok(UserChoice::Exit),
                _ => {
                    writeln!(output, "Invalid choice. Please enter 1, 2, 3 or 4.")?;
                }
            }
        }
    }

    pub fn read_revision_with_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<String> {
        write!(output, "Revise query: ")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn read_manual_edit_with_io<R: BufRead, W: Write>(
        &self,
        current: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<String> {
        write!(output, "Edit command [{current}]: ")?;
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        let edited = line.trim();
        if edited.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(edited.to_string())
        }
    }
}

impl Default for ConsoleUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUi {
    fn show_command(&self, command: &str) {
        if let Err(err) = self.show_command_with_io(command, &mut io::stdout()) {
            warn!("Failed to render command: {err}");
        }
    }

    fn show_warning(&self, consequences: &str) {
        if let Err(err) = self.show_warning_with_io(consequences, &mut io::stdout()) {
            warn!("Failed to render warning: {err}");
        }
    }

    fn show_explanation(&self, explanation: &str) {
        if let Err(err) = self.show_explanation_with_io(explanation, &mut io::stdout()) {
            warn!("Failed to render explanation: {err}");
        }
    }

    fn choose_action(&self) -> Result<UserChoice> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        self.choose_action_with_io(&mut input, &mut io::stdout())
    }

    fn read_revision(&self) -> Result<String> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        self.read_revision_with_io(&mut input, &mut io::stdout())
    }

    fn read_manual_edit(&self, current: &str) -> Result<String> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        self.read_manual_edit_with_io(current, &mut input, &mut io::stdout())
    }
}
