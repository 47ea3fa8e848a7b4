//! DialogueController: runs one turn at a time against a session: control
//! commands, strict parsing, pointer recompute, readiness gate, and launch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::IntakeConfig;
use crate::error::{LaunchError, StoreError};
use crate::launch::LaunchWorkflow;
use crate::llm::rewrite::{ToneRewriter, rewrite_or_fallback};
use crate::store::SessionStore;

use super::commands::{self, Command};
use super::fields::FieldKey;
use super::parser;
use super::prompts;
use super::state::{CollectedAnswers, IntakePhase, IntakeSession, missing_for_launch};

/// Reply to one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub session_id: String,
    pub response: String,
    pub phase: IntakePhase,
    pub step: usize,
    pub ready: bool,
}

/// Inspection view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeSnapshot {
    pub session_id: String,
    pub phase: IntakePhase,
    pub step: usize,
    pub collected: CollectedAnswers,
    pub missing: Vec<FieldKey>,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_field: Option<FieldKey>,
}

impl IntakeSnapshot {
    fn of(session: &IntakeSession) -> Self {
        Self {
            session_id: session.id.clone(),
            phase: session.phase,
            step: session.step,
            collected: session.answers.clone(),
            missing: session.answers.missing(),
            ready: session.is_ready_to_launch(),
            next_field: session.expected_field(),
        }
    }
}

/// Coordinates intake turns over an injected session store and collaborators.
pub struct DialogueController {
    store: Arc<dyn SessionStore>,
    rewriter: Arc<dyn ToneRewriter>,
    launcher: Arc<dyn LaunchWorkflow>,
    config: IntakeConfig,
}

impl DialogueController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        rewriter: Arc<dyn ToneRewriter>,
        launcher: Arc<dyn LaunchWorkflow>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            store,
            rewriter,
            launcher,
            config,
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Process one user message for `session_id` and produce the reply.
    ///
    /// Only session store failures are returned as errors; every other
    /// rejection is a normal reply and leaves the session unchanged.
    pub async fn handle_turn(&self, session_id: &str, raw: &str) -> Result<TurnReply, StoreError> {
        let handle = self.store.get_or_create(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        let response = match commands::detect(raw) {
            Some(Command::Reset) => {
                session.reset();
                info!(session_id = session_id, "Intake reset by user");
                prompts::question_for(FieldKey::ALL[0])
            }
            Some(Command::Launch) => self.try_launch(&mut session).await,
            None => self.answer(&mut session, raw).await,
        };

        Ok(TurnReply {
            session_id: session.id.clone(),
            response,
            phase: session.phase,
            step: session.step,
            ready: session.is_ready_to_launch(),
        })
    }

    /// Opening message; creates the session if needed.
    pub async fn greeting(&self, session_id: &str) -> Result<String, StoreError> {
        self.store.get_or_create(session_id).await?;
        Ok(prompts::greeting())
    }

    /// Collected and missing fields for `session_id`. Does not create the session.
    pub async fn get_state(&self, session_id: &str) -> Result<IntakeSnapshot, StoreError> {
        match self.store.get(session_id).await? {
            Some(handle) => Ok(IntakeSnapshot::of(&*handle.lock().await)),
            None => Ok(IntakeSnapshot::of(&IntakeSession::new(session_id))),
        }
    }

    pub async fn reset_state(&self, session_id: &str) -> Result<(), StoreError> {
        self.store.reset(session_id).await?;
        info!(session_id = session_id, "Intake state reset");
        Ok(())
    }

    async fn answer(&self, session: &mut IntakeSession, raw: &str) -> String {
        match session.phase {
            IntakePhase::Launched => return prompts::already_launched(),
            IntakePhase::SummaryReady => {
                return prompts::summary(&session.answers, self.config.launch_fee_usdc);
            }
            IntakePhase::Collecting => {}
        }

        let Some(expected) = session.expected_field() else {
            return prompts::summary(&session.answers, self.config.launch_fee_usdc);
        };

        let parsed = match parser::parse(raw, Some(expected)) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(session_id = %session.id, expected = %expected, error = %e, "Turn rejected");
                return prompts::rejection_with_question(&e, expected);
            }
        };

        let field = parsed.key;
        let step = session.commit(parsed);
        info!(session_id = %session.id, field = %field, step = step, "Answer accepted");

        match session.expected_field() {
            Some(next) => self.ask(next).await,
            None => {
                info!(session_id = %session.id, phase = %session.phase, "All fields collected");
                prompts::summary(&session.answers, self.config.launch_fee_usdc)
            }
        }
    }

    /// The question for `field`, tone-rewritten when enabled.
    async fn ask(&self, field: FieldKey) -> String {
        if !self.config.rewrite_enabled {
            return prompts::question_for(field);
        }
        let question =
            rewrite_or_fallback(self.rewriter.as_ref(), field.question(), self.config.rewrite_timeout)
                .await;
        prompts::compose_question(&question, field)
    }

    async fn try_launch(&self, session: &mut IntakeSession) -> String {
        if session.phase.is_terminal() {
            return prompts::already_launched();
        }

        if !session.is_ready_to_launch() {
            let missing = missing_for_launch(&session.answers);
            debug!(session_id = %session.id, missing = ?missing, "Launch requested before ready");
            let current = match session.expected_field() {
                Some(field) => prompts::question_for(field),
                None => prompts::summary(&session.answers, self.config.launch_fee_usdc),
            };
            return format!("{}\n\n{current}", prompts::not_ready(&missing));
        }

        info!(session_id = %session.id, "Launch workflow started");
        let timeout = self.config.launch_timeout;
        let outcome = match tokio::time::timeout(timeout, self.launcher.launch(&session.answers)).await {
            Ok(result) => result,
            Err(_) => Err(LaunchError::Timeout { timeout }),
        };

        match outcome {
            Ok(report) => {
                session.mark_launched();
                info!(
                    session_id = %session.id,
                    chains = report.deployments.len(),
                    "Launch workflow completed"
                );
                report.to_message()
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Launch workflow failed");
                prompts::launch_failed(&e, self.config.launch_fee_usdc)
            }
        }
    }
}
