//! Configuration types.
//!
//! Everything is read from the environment once at startup. The
//! `from_lookup` variants take any key lookup so tests never touch the
//! process environment.

use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

/// Dialogue controller configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Upper bound on a tone-rewrite call.
    pub rewrite_timeout: Duration,
    /// Upper bound on a launch workflow call.
    pub launch_timeout: Duration,
    /// Launch fee quoted in the summary, in USDC.
    pub launch_fee_usdc: u32,
    /// Sessions idle for longer than this are dropped.
    pub session_idle_timeout: Duration,
    /// Whether questions are passed through the tone rewriter.
    pub rewrite_enabled: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            rewrite_timeout: Duration::from_millis(4000),
            launch_timeout: Duration::from_secs(30),
            launch_fee_usdc: 10,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            rewrite_enabled: true,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let rewrite_ms = parse_or(
            &lookup,
            "BIZMART_REWRITE_TIMEOUT_MS",
            defaults.rewrite_timeout.as_millis() as u64,
        );
        let launch_ms = parse_or(
            &lookup,
            "BIZMART_LAUNCH_TIMEOUT_MS",
            defaults.launch_timeout.as_millis() as u64,
        );
        let idle_secs = parse_or(
            &lookup,
            "BIZMART_SESSION_IDLE_SECS",
            defaults.session_idle_timeout.as_secs(),
        );
        Self {
            rewrite_timeout: Duration::from_millis(rewrite_ms),
            launch_timeout: Duration::from_millis(launch_ms),
            launch_fee_usdc: parse_or(&lookup, "BIZMART_LAUNCH_FEE_USDC", defaults.launch_fee_usdc),
            session_idle_timeout: Duration::from_secs(idle_secs),
            rewrite_enabled: lookup("BIZMART_REWRITE_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.rewrite_enabled),
        }
    }
}

/// How the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Server,
    Cli,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin, `*` for any.
    pub cors_origin: String,
    pub mode: RunMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origin: "*".to_string(),
            mode: RunMode::Server,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mode = match lookup("BIZMART_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("server") => RunMode::Server,
            Some("cli") => RunMode::Cli,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "BIZMART_MODE".to_string(),
                    message: format!("expected `server` or `cli`, got `{other}`"),
                });
            }
        };
        Ok(Self {
            host: lookup("BIZMART_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            cors_origin: lookup("BIZMART_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            mode,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, "Unparsable configuration value, using default");
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn intake_defaults() {
        let config = IntakeConfig::from_lookup(|_| None);
        assert_eq!(config.launch_fee_usdc, 10);
        assert_eq!(config.rewrite_timeout, Duration::from_millis(4000));
        assert_eq!(config.launch_timeout, Duration::from_secs(30));
        assert!(config.rewrite_enabled);
    }

    #[test]
    fn intake_overrides_and_bad_values() {
        let config = IntakeConfig::from_lookup(lookup_from(&[
            ("BIZMART_LAUNCH_FEE_USDC", "25"),
            ("BIZMART_REWRITE_TIMEOUT_MS", "not-a-number"),
            ("BIZMART_SESSION_IDLE_SECS", "60"),
            ("BIZMART_REWRITE_ENABLED", "off"),
        ]));
        assert_eq!(config.launch_fee_usdc, 25);
        assert_eq!(config.rewrite_timeout, Duration::from_millis(4000));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert!(!config.rewrite_enabled);
    }

    #[test]
    fn server_config_modes() {
        let config = ServerConfig::from_lookup(lookup_from(&[("BIZMART_MODE", "cli"), ("PORT", "3001")])).unwrap();
        assert_eq!(config.mode, RunMode::Cli);
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");

        let err = ServerConfig::from_lookup(lookup_from(&[("BIZMART_MODE", "daemon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "BIZMART_MODE"));
    }
}
