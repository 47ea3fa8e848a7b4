//! Launch workflow: fee check followed by per-chain deployment.
//!
//! The intake core only sees the [`LaunchWorkflow`] trait. Results are
//! relayed to the user verbatim via [`LaunchReport::to_message`].

pub mod mock;

pub use mock::{LaunchConfig, MockOrchestrator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LaunchError;
use crate::intake::CollectedAnswers;

/// Supported deployment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Solana,
    Base,
    Bsc,
    Monad,
}

impl Chain {
    pub fn from_name(name: &str) -> Option<Chain> {
        match name.trim().to_lowercase().as_str() {
            "solana" | "sol" => Some(Chain::Solana),
            "base" => Some(Chain::Base),
            "bsc" | "bnb" | "binance smart chain" => Some(Chain::Bsc),
            "monad" => Some(Chain::Monad),
            _ => None,
        }
    }

    /// Where this chain's market is created.
    pub fn platform(&self) -> &'static str {
        match self {
            Self::Solana => "BizFun market",
            Self::Base => "Clanker",
            Self::Bsc => "four.meme",
            Self::Monad => "nad.fun",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Solana => "Solana",
            Self::Base => "Base",
            Self::Bsc => "BSC",
            Self::Monad => "Monad",
        };
        write!(f, "{s}")
    }
}

/// Deployment targets named in a `chain` answer.
///
/// Solana always comes first; other chains follow in the order named,
/// deduplicated. Unrecognized names are returned separately.
pub fn plan_chains(answer: &str) -> (Vec<Chain>, Vec<String>) {
    let mut chains = vec![Chain::Solana];
    let mut unknown = Vec::new();
    let lowered = answer.to_lowercase().replace(" and ", ",");
    for name in lowered.split([',', '/', '&', '+', ';']) {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match Chain::from_name(name) {
            Some(chain) if !chains.contains(&chain) => chains.push(chain),
            Some(_) => {}
            None => unknown.push(name.to_string()),
        }
    }
    (chains, unknown)
}

/// Outcome of deploying on one chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDeployment {
    pub chain: Chain,
    pub platform: String,
    /// Token or contract reference reported by the backend.
    pub token: String,
    /// Market reference reported by the backend.
    pub market: String,
}

/// Structured result of a successful launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchReport {
    pub deployments: Vec<ChainDeployment>,
    /// Chain names that were requested but not supported.
    pub skipped: Vec<String>,
}

impl LaunchReport {
    /// User-facing launch summary, one line per chain.
    pub fn to_message(&self) -> String {
        let mut parts = vec!["🚀 SAVVY! The engines are roaring! 🔥".to_string(), String::new()];
        for d in &self.deployments {
            parts.push(format!(
                "✅ {}: {} token {} with market {}",
                d.chain, d.platform, d.token, d.market
            ));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("⚠️ Skipped unsupported chains: {}", self.skipped.join(", ")));
        }
        parts.push(String::new());
        parts.push("I'm now heading to MoltBook and X to start the chaos. Check your dashboard! 📈🧠".to_string());
        parts.join("\n")
    }
}

/// External multi-chain launch workflow.
///
/// Implementations check the fee precondition first and deploy only if it holds.
#[async_trait]
pub trait LaunchWorkflow: Send + Sync {
    async fn launch(&self, answers: &CollectedAnswers) -> Result<LaunchReport, LaunchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solana_is_always_first() {
        let (chains, unknown) = plan_chains("Base");
        assert_eq!(chains, vec![Chain::Solana, Chain::Base]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn chains_are_deduplicated_in_order() {
        let (chains, _) = plan_chains("Monad, base and Solana / BASE");
        assert_eq!(chains, vec![Chain::Solana, Chain::Monad, Chain::Base]);
    }

    #[test]
    fn unknown_chains_are_reported() {
        let (chains, unknown) = plan_chains("BSC, Dogechain");
        assert_eq!(chains, vec![Chain::Solana, Chain::Bsc]);
        assert_eq!(unknown, vec!["dogechain".to_string()]);
    }

    #[test]
    fn report_lists_each_chain() {
        let report = LaunchReport {
            deployments: vec![ChainDeployment {
                chain: Chain::Base,
                platform: Chain::Base.platform().to_string(),
                token: "t1".into(),
                market: "m1".into(),
            }],
            skipped: vec!["dogechain".into()],
        };
        let msg = report.to_message();
        assert!(msg.contains("✅ Base: Clanker token t1 with market m1"));
        assert!(msg.contains("dogechain"));
    }
}
