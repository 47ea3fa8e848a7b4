//! Guided intake: a strict, one-field-per-turn conversation that collects
//! the details needed to launch a prediction market.
//!
//! Turns are answered as `Field: value`, one line at a time, in a fixed
//! order. The step pointer is always recomputed from the collected answers.

pub mod commands;
pub mod controller;
pub mod fields;
pub mod parser;
pub mod prompts;
pub mod routes;
pub mod state;

pub use controller::{DialogueController, IntakeSnapshot, TurnReply};
pub use fields::FieldKey;
pub use parser::{ParsedAnswer, parse};
pub use routes::{IntakeRouteState, intake_routes};
pub use state::{CollectedAnswers, IntakePhase, IntakeSession, TERMINAL_STEP};
