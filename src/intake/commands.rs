//! Control commands recognized before field parsing.
//!
//! Matching is exact against a finite phrase list after lowercasing and
//! dropping trailing punctuation, so `Name: Launchpad` is never a command.

/// A control command detected in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Launch,
}

pub const RESET_PHRASES: &[&str] = &["reset", "start over", "restart"];

pub const LAUNCH_PHRASES: &[&str] = &[
    "launch",
    "launch it",
    "launch now",
    "paid",
    "i paid",
    "i've paid",
    "i have paid",
    "trigger_launch",
    "confirm",
    "confirm launch",
];

/// Detect a control command, if the whole turn is one.
pub fn detect(raw: &str) -> Option<Command> {
    let normalized = normalize(raw);
    if RESET_PHRASES.contains(&normalized.as_str()) {
        Some(Command::Reset)
    } else if LAUNCH_PHRASES.contains(&normalized.as_str()) {
        Some(Command::Launch)
    } else {
        None
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['!', '.', ' '])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('’', "'")
}
