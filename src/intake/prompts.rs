//! Canonical user-facing text: questions, summary, and rejection messages.

use crate::error::{FormatError, IntakeError, LaunchError};

use super::fields::FieldKey;
use super::state::CollectedAnswers;

pub const INTRO: &str = "Hey 👋 I'm $BizMart. I help tokenize ideas, businesses, and even careers. \
Answer one question at a time as `Field: value`.";

/// How the user should phrase the answer to `field`.
pub fn reply_hint(field: FieldKey) -> String {
    format!("Reply with `{}: <your answer>`.", field.label())
}

/// Compose a (possibly rewritten) question with its canonical reply hint.
pub fn compose_question(question: &str, field: FieldKey) -> String {
    format!("{question}\n{}", reply_hint(field))
}

/// The canonical question for `field`, hint included.
pub fn question_for(field: FieldKey) -> String {
    compose_question(field.question(), field)
}

/// Opening message for a fresh session.
pub fn greeting() -> String {
    format!("{INTRO}\n\n{}", question_for(FieldKey::ALL[0]))
}

/// Deterministic summary of every field plus the confirmation instruction.
///
/// Unset fields render as `None`.
pub fn summary(answers: &CollectedAnswers, fee_usdc: u32) -> String {
    let mut parts = vec!["Here's everything I've got:".to_string()];
    for key in FieldKey::ALL {
        parts.push(format!("- {}: {}", key.label(), answers.get(key).unwrap_or("None")));
    }
    parts.push(String::new());
    parts.push(format!(
        "Fund the BizFun wallet with the {fee_usdc} USDC launch fee, then say `launch` to deploy. \
         Say `reset` to start over."
    ));
    parts.join("\n")
}

/// Message for a rejected answer, redirecting to the current question.
pub fn rejection(err: &IntakeError) -> String {
    match err {
        IntakeError::Format(FormatError::MultipleLines) => {
            "Please answer one field at a time, on a single line.".to_string()
        }
        IntakeError::Format(FormatError::Malformed) => {
            "Please use the format `Field: value`.".to_string()
        }
        IntakeError::Format(FormatError::UnknownField { label }) => {
            format!("I don't know the field \"{label}\".")
        }
        IntakeError::Sequence { expected } => format!(
            "One step at a time! Right now I need the {} field.",
            expected.label()
        ),
        IntakeError::Complete => "I already have every answer.".to_string(),
    }
}

/// Rejection followed by the question it redirects to.
pub fn rejection_with_question(err: &IntakeError, current: FieldKey) -> String {
    format!("{}\n\n{}", rejection(err), question_for(current))
}

pub fn not_ready(missing: &[FieldKey]) -> String {
    let labels: Vec<&str> = missing.iter().map(FieldKey::label).collect();
    format!(
        "Not ready to launch yet. Still missing: {}.",
        labels.join(", ")
    )
}

pub fn already_launched() -> String {
    "This one is already launched 🚀. Say `reset` to start a new one.".to_string()
}

/// User-facing text for a failed launch attempt.
pub fn launch_failed(err: &LaunchError, fee_usdc: u32) -> String {
    match err {
        LaunchError::PaymentPending { .. } => format!(
            "Hold up! I don't see the {fee_usdc} USDC fee in the treasury yet. \
             Double check the transaction and say `launch` again 🧐"
        ),
        LaunchError::Collaborator { .. } | LaunchError::Timeout { .. } => {
            "The launch engines stalled. Nothing was lost, say `launch` to try again.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_includes_label_hint() {
        let q = question_for(FieldKey::Wallet);
        assert!(q.starts_with(FieldKey::Wallet.question()));
        assert!(q.ends_with("Reply with `Wallet: <your answer>`."));
    }

    #[test]
    fn greeting_ends_with_first_question() {
        assert!(greeting().ends_with(&question_for(FieldKey::Type)));
    }

    #[test]
    fn summary_lists_every_field_including_unset() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::Name, "Foo");
        let text = summary(&answers, 10);
        assert!(text.contains("- Name: Foo"));
        assert!(text.contains("- Vibe: None"));
        assert!(text.contains("- Wallet: None"));
        assert!(text.contains("10 USDC"));
        for key in FieldKey::ALL {
            assert!(text.contains(&format!("- {}:", key.label())), "missing {key}");
        }
    }

    #[test]
    fn summary_is_deterministic() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::Wallet, "abc");
        answers.set(FieldKey::Type, "Idea");
        assert_eq!(summary(&answers, 10), summary(&answers.clone(), 10));
    }

    #[test]
    fn sequence_rejection_names_expected_field() {
        let err = IntakeError::Sequence {
            expected: FieldKey::Name,
        };
        let text = rejection_with_question(&err, FieldKey::Name);
        assert!(text.contains("Name"));
        assert!(text.contains(FieldKey::Name.question()));
    }

    #[test]
    fn not_ready_lists_labels() {
        let text = not_ready(&[FieldKey::Wallet, FieldKey::Duration]);
        assert!(text.contains("Wallet, Duration"));
    }
}
