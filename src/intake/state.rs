//! Intake session state: collected answers, step pointer, and dialogue phase.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::FieldKey;
use super::parser::ParsedAnswer;

/// Terminal step value: every field is answered.
pub const TERMINAL_STEP: usize = FieldKey::COUNT + 1;

/// The phases of an intake dialogue.
///
/// Collecting → SummaryReady → Launched, with Collecting → Launched allowed
/// once the readiness gate passes. Reset returns any phase to Collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePhase {
    Collecting,
    SummaryReady,
    Launched,
}

impl IntakePhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakePhase) -> bool {
        use IntakePhase::*;
        matches!(
            (self, target),
            (Collecting, SummaryReady)
                | (Collecting, Launched)
                | (SummaryReady, Launched)
                | (_, Collecting)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Launched)
    }
}

impl Default for IntakePhase {
    fn default() -> Self {
        Self::Collecting
    }
}

impl std::fmt::Display for IntakePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::SummaryReady => "summary_ready",
            Self::Launched => "launched",
        };
        write!(f, "{s}")
    }
}

/// Answers collected so far. Keys absent from the map are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedAnswers {
    values: BTreeMap<FieldKey, String>,
}

impl CollectedAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// A key counts as set only with a non-blank value.
    pub fn is_set(&self, key: FieldKey) -> bool {
        self.get(key).is_some_and(|v| !v.trim().is_empty())
    }

    /// Set exactly one key.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Unset keys, in question order.
    pub fn missing(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .into_iter()
            .filter(|k| !self.is_set(*k))
            .collect()
    }

    /// Set keys and their values, in question order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 1-based index of the first unset field, or [`TERMINAL_STEP`] if none are unset.
pub fn recompute_pointer(answers: &CollectedAnswers) -> usize {
    FieldKey::ALL
        .iter()
        .position(|k| !answers.is_set(*k))
        .map(|i| i + 1)
        .unwrap_or(TERMINAL_STEP)
}

/// The field asked at `step`, or `None` at (or past) the terminal step.
pub fn expected_key_for_step(step: usize) -> Option<FieldKey> {
    step.checked_sub(1).and_then(|i| FieldKey::ALL.get(i).copied())
}

/// True iff every required-for-launch field is set.
pub fn is_ready_to_launch(answers: &CollectedAnswers) -> bool {
    FieldKey::REQUIRED_FOR_LAUNCH
        .iter()
        .all(|k| answers.is_set(*k))
}

/// Required-for-launch fields still unset, in question order.
pub fn missing_for_launch(answers: &CollectedAnswers) -> Vec<FieldKey> {
    answers
        .missing()
        .into_iter()
        .filter(FieldKey::is_required_for_launch)
        .collect()
}

/// One dialogue session: a single answer map plus its cached step pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSession {
    pub id: String,
    pub answers: CollectedAnswers,
    /// Cached `recompute_pointer(&answers)`.
    pub step: usize,
    pub phase: IntakePhase,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launched_at: Option<DateTime<Utc>>,
}

impl IntakeSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            answers: CollectedAnswers::new(),
            step: 1,
            phase: IntakePhase::Collecting,
            created_at: now,
            last_active: now,
            launched_at: None,
        }
    }

    /// The field the parser should expect next.
    pub fn expected_field(&self) -> Option<FieldKey> {
        expected_key_for_step(self.step)
    }

    /// Commit an accepted answer and recompute the pointer.
    ///
    /// Moves to `SummaryReady` when the terminal step is reached.
    pub fn commit(&mut self, answer: ParsedAnswer) -> usize {
        self.answers.set(answer.key, answer.value);
        self.step = recompute_pointer(&self.answers);
        if self.step == TERMINAL_STEP && self.phase.can_transition_to(IntakePhase::SummaryReady) {
            self.phase = IntakePhase::SummaryReady;
        }
        self.step
    }

    pub fn is_ready_to_launch(&self) -> bool {
        is_ready_to_launch(&self.answers)
    }

    /// Returns false if the session was already launched.
    pub fn mark_launched(&mut self) -> bool {
        if !self.phase.can_transition_to(IntakePhase::Launched) {
            return false;
        }
        self.phase = IntakePhase::Launched;
        self.launched_at = Some(Utc::now());
        true
    }

    /// Clear every answer and return to step 1.
    pub fn reset(&mut self) {
        self.answers = CollectedAnswers::new();
        self.step = 1;
        self.phase = IntakePhase::Collecting;
        self.launched_at = None;
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(key: FieldKey, value: &str) -> ParsedAnswer {
        ParsedAnswer {
            key,
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_answers_point_at_first_step() {
        let answers = CollectedAnswers::new();
        assert_eq!(recompute_pointer(&answers), 1);
        assert_eq!(expected_key_for_step(1), Some(FieldKey::Type));
    }

    #[test]
    fn pointer_is_first_unset_field() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::Type, "Startup");
        answers.set(FieldKey::Socials, "x.com/foo");
        assert_eq!(recompute_pointer(&answers), 2);
        assert_eq!(recompute_pointer(&answers), 2, "recompute is idempotent");

        answers.set(FieldKey::Name, "Foo");
        assert_eq!(recompute_pointer(&answers), 4);
    }

    #[test]
    fn pointer_reaches_terminal_when_all_set() {
        let mut answers = CollectedAnswers::new();
        for key in FieldKey::ALL {
            answers.set(key, "x");
        }
        assert_eq!(recompute_pointer(&answers), TERMINAL_STEP);
        assert_eq!(expected_key_for_step(TERMINAL_STEP), None);
        assert_eq!(expected_key_for_step(0), None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::Type, "   ");
        assert!(!answers.is_set(FieldKey::Type));
        assert_eq!(recompute_pointer(&answers), 1);
    }

    #[test]
    fn readiness_depends_only_on_required_fields() {
        let mut answers = CollectedAnswers::new();
        for key in FieldKey::REQUIRED_FOR_LAUNCH {
            assert!(!is_ready_to_launch(&answers));
            answers.set(key, "set");
        }
        assert!(is_ready_to_launch(&answers));

        for key in FieldKey::ALL.into_iter().filter(|k| !k.is_required_for_launch()) {
            answers.set(key, "optional");
            assert!(is_ready_to_launch(&answers), "setting {key} flipped readiness");
        }

        let mut optional_only = CollectedAnswers::new();
        for key in FieldKey::ALL.into_iter().filter(|k| !k.is_required_for_launch()) {
            optional_only.set(key, "optional");
            assert!(!is_ready_to_launch(&optional_only));
        }
    }

    #[test]
    fn missing_for_launch_lists_required_gaps() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::Name, "Foo");
        answers.set(FieldKey::Chain, "Base");
        assert_eq!(
            missing_for_launch(&answers),
            vec![FieldKey::PredictionQuestion, FieldKey::Duration, FieldKey::Wallet]
        );
    }

    #[test]
    fn session_commit_keeps_pointer_consistent() {
        let mut session = IntakeSession::new("s1");
        for key in FieldKey::ALL {
            assert_eq!(session.expected_field(), Some(key));
            session.commit(answer(key, "value"));
            assert_eq!(session.step, recompute_pointer(&session.answers));
        }
        assert_eq!(session.step, TERMINAL_STEP);
        assert_eq!(session.phase, IntakePhase::SummaryReady);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = IntakeSession::new("s1");
        session.commit(answer(FieldKey::Type, "Idea"));
        session.commit(answer(FieldKey::Name, "Foo"));
        assert!(session.mark_launched());

        session.reset();
        assert!(session.answers.is_empty());
        assert_eq!(session.answers.missing().len(), FieldKey::COUNT);
        assert_eq!(session.step, 1);
        assert_eq!(session.phase, IntakePhase::Collecting);
        assert!(session.launched_at.is_none());
    }

    #[test]
    fn launched_is_terminal_until_reset() {
        let mut session = IntakeSession::new("s1");
        assert!(session.mark_launched());
        assert!(session.phase.is_terminal());
        assert!(!session.mark_launched());
        assert!(!IntakePhase::Launched.can_transition_to(IntakePhase::SummaryReady));
        assert!(IntakePhase::Launched.can_transition_to(IntakePhase::Collecting));
    }

    #[test]
    fn phase_display_matches_serde() {
        for phase in [IntakePhase::Collecting, IntakePhase::SummaryReady, IntakePhase::Launched] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{phase}\""), json);
        }
    }

    #[test]
    fn answers_serialize_as_snake_case_map() {
        let mut answers = CollectedAnswers::new();
        answers.set(FieldKey::ValueAudience, "devs");
        let json = serde_json::to_value(&answers).unwrap();
        assert_eq!(json["value_audience"], "devs");
    }
}
