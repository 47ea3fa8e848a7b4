//! Mock orchestrator standing in for the chain backends.
//!
//! No transactions are built or signed. Deployment references are opaque
//! `mock-*` identifiers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LaunchError;
use crate::intake::{CollectedAnswers, FieldKey};

use super::{ChainDeployment, LaunchReport, LaunchWorkflow, plan_chains};

/// Mock orchestrator configuration.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Whether the fee check reports the fee as received.
    pub fee_paid: bool,
    /// Simulated latency per backend call.
    pub deploy_delay: Duration,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            fee_paid: true,
            deploy_delay: Duration::ZERO,
        }
    }
}

impl LaunchConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let fee_paid = match lookup("BIZMART_MOCK_FEE_PAID") {
            Some(v) => !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"),
            None => defaults.fee_paid,
        };
        let deploy_delay = lookup("BIZMART_MOCK_DEPLOY_DELAY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.deploy_delay);
        Self {
            fee_paid,
            deploy_delay,
        }
    }
}

/// Simulated fee check and multi-chain deployment.
pub struct MockOrchestrator {
    config: LaunchConfig,
}

impl MockOrchestrator {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    async fn simulate_latency(&self) {
        if !self.config.deploy_delay.is_zero() {
            tokio::time::sleep(self.config.deploy_delay).await;
        }
    }

    async fn check_fee_payment(&self, wallet: &str) -> bool {
        info!(wallet = wallet, "Checking launch fee payment");
        self.simulate_latency().await;
        self.config.fee_paid
    }
}

#[async_trait]
impl LaunchWorkflow for MockOrchestrator {
    async fn launch(&self, answers: &CollectedAnswers) -> Result<LaunchReport, LaunchError> {
        let wallet = answers.get(FieldKey::Wallet).unwrap_or("unknown");
        if !self.check_fee_payment(wallet).await {
            warn!(wallet = wallet, "Launch fee not found");
            return Err(LaunchError::PaymentPending {
                wallet: wallet.to_string(),
            });
        }

        let (chains, skipped) = plan_chains(answers.get(FieldKey::Chain).unwrap_or_default());
        let mut deployments = Vec::with_capacity(chains.len());
        for chain in chains {
            info!(chain = %chain, name = answers.get(FieldKey::Name).unwrap_or_default(), "Deploying market");
            self.simulate_latency().await;
            let tag = Uuid::new_v4().simple().to_string();
            deployments.push(ChainDeployment {
                chain,
                platform: chain.platform().to_string(),
                token: format!("mock-token-{}", &tag[..8]),
                market: format!("mock-market-{}", &tag[8..16]),
            });
        }

        Ok(LaunchReport {
            deployments,
            skipped,
        })
    }
}
