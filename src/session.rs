//! Per-invocation state for the interaction loop.

/// What the user decided to do with the current command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChoice {
    /// Hand the command to the shell and finish.
    RunCommand,
    /// Ask the model to revise the command from a free-text instruction.
    ReviseQuery,
    /// Replace the command with user-supplied text.
    EditManually,
    /// Leave without running anything.
    Exit,
}

/// Result of asking the model whether a command is dangerous.
///
/// Produced fresh on every loop iteration, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerAssessment {
    pub is_dangerous: bool,
    /// Human-readable description of what could go wrong. Empty when the
    /// command is considered safe.
    pub consequences: String,
}

impl DangerAssessment {
    /// The fallback used when the classifier fails: assume safe.
    pub fn safe() -> Self {
        Self {
            is_dangerous: false,
            consequences: String::new(),
        }
    }
}

/// Transient state of one `ask` invocation.
///
/// `command` is the single current candidate; it is only ever replaced
/// wholesale, by a successful revision or a manual edit.
#[derive(Debug)]
pub struct Session {
    /// The original natural-language request. Immutable after creation.
    pub prompt: String,
    /// The current candidate shell command.
    pub command: String,
    /// Free-text revision instruction, reset to empty each iteration.
    pub edit_prompt: String,
    /// True only before the first render.
    pub first_run: bool,
}

impl Session {
    pub fn new(prompt: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            command: command.into(),
            edit_prompt: String::new(),
            first_run: true,
        }
    }
}
