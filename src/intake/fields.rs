//! Field registry: the fixed, ordered intake schema.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// One canonical slot in the intake form.
///
/// Declaration order is the question order: step `n` expects `FieldKey::ALL[n - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Type,
    Name,
    Socials,
    Description,
    ValueAudience,
    Stage,
    PredictionType,
    PredictionQuestion,
    Duration,
    Chain,
    Vibe,
    Marketing,
    Wallet,
}

impl FieldKey {
    /// Every field, in question order.
    pub const ALL: [FieldKey; 13] = [
        FieldKey::Type,
        FieldKey::Name,
        FieldKey::Socials,
        FieldKey::Description,
        FieldKey::ValueAudience,
        FieldKey::Stage,
        FieldKey::PredictionType,
        FieldKey::PredictionQuestion,
        FieldKey::Duration,
        FieldKey::Chain,
        FieldKey::Vibe,
        FieldKey::Marketing,
        FieldKey::Wallet,
    ];

    /// Fields that must be set before the launch workflow may run.
    pub const REQUIRED_FOR_LAUNCH: [FieldKey; 5] = [
        FieldKey::Name,
        FieldKey::Wallet,
        FieldKey::PredictionQuestion,
        FieldKey::Duration,
        FieldKey::Chain,
    ];

    /// Number of fields in the sequence.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable snake_case key, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Name => "name",
            Self::Socials => "socials",
            Self::Description => "description",
            Self::ValueAudience => "value_audience",
            Self::Stage => "stage",
            Self::PredictionType => "prediction_type",
            Self::PredictionQuestion => "prediction_question",
            Self::Duration => "duration",
            Self::Chain => "chain",
            Self::Vibe => "vibe",
            Self::Marketing => "marketing",
            Self::Wallet => "wallet",
        }
    }

    /// Display label, used both in the `Label: value` grammar and in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Name => "Name",
            Self::Socials => "Socials",
            Self::Description => "Description",
            Self::ValueAudience => "Audience",
            Self::Stage => "Stage",
            Self::PredictionType => "Prediction",
            Self::PredictionQuestion => "Question",
            Self::Duration => "Duration",
            Self::Chain => "Chain",
            Self::Vibe => "Vibe",
            Self::Marketing => "Marketing",
            Self::Wallet => "Wallet",
        }
    }

    /// The question asked for this field, without the reply hint.
    pub fn question(&self) -> &'static str {
        match self {
            Self::Type => {
                "What are we tokenizing? Business, Startup, Idea, Career, or Experiment?"
            }
            Self::Name => "What should we call it?",
            Self::Socials => "Drop your links (X, website, GitHub) so I can do some research.",
            Self::Description => {
                "Explain it in a few sentences, like you're pitching someone on X."
            }
            Self::ValueAudience => {
                "What value are you providing, and who is your target audience?"
            }
            Self::Stage => {
                "Be honest, what stage are you at? Idea, Building, Launched, Making Money, or Growing?"
            }
            Self::PredictionType => {
                "Let's make this interesting 😈. What should the market predict? Revenue, Sales, Growth, or Followers?"
            }
            Self::PredictionQuestion => {
                "Write the prediction in plain English, e.g. 'Will this make $3k in 30 days?'"
            }
            Self::Duration => "How long should the market run? 7, 14, or 30 days?",
            Self::Chain => "What chain? Base, Monad, BSC, or Solana?",
            Self::Vibe => "What's the vibe? Meme, Serious, or Experimental?",
            Self::Marketing => {
                "Can I market this publicly? MoltBook, AI debates, Reply chaos, or Chaos mode?"
            }
            Self::Wallet => "Drop a USDC address for settlement.",
        }
    }

    /// 1-based step index of this field.
    pub fn step(&self) -> usize {
        Self::ALL
            .iter()
            .position(|k| k == self)
            .map(|i| i + 1)
            .unwrap_or(Self::COUNT + 1)
    }

    pub fn is_required_for_launch(&self) -> bool {
        Self::REQUIRED_FOR_LAUNCH.contains(self)
    }

    /// Resolve a user-supplied label against the alias table.
    pub fn from_label(label: &str) -> Option<FieldKey> {
        ALIASES.get(normalize_label(label).as_str()).copied()
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercase, and fold `_`, `-` and whitespace runs into single spaces.
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepted labels, stored in normalized form.
static ALIASES: LazyLock<HashMap<&'static str, FieldKey>> = LazyLock::new(|| {
    use FieldKey::*;
    HashMap::from([
        ("type", Type),
        ("name", Name),
        ("project", Name),
        ("project name", Name),
        ("socials", Socials),
        ("social", Socials),
        ("links", Socials),
        ("description", Description),
        ("pitch", Description),
        ("value audience", ValueAudience),
        ("value/audience", ValueAudience),
        ("value", ValueAudience),
        ("audience", ValueAudience),
        ("target audience", ValueAudience),
        ("stage", Stage),
        ("prediction", PredictionType),
        ("prediction type", PredictionType),
        ("metric", PredictionType),
        ("question", PredictionQuestion),
        ("prediction question", PredictionQuestion),
        ("specific question", PredictionQuestion),
        ("duration", Duration),
        ("days", Duration),
        ("chain", Chain),
        ("chains", Chain),
        ("network", Chain),
        ("vibe", Vibe),
        ("marketing", Marketing),
        ("wallet", Wallet),
        ("wallet address", Wallet),
        ("settlement", Wallet),
        ("address", Wallet),
        ("usdc address", Wallet),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_declaration_order() {
        for (i, key) in FieldKey::ALL.iter().enumerate() {
            assert_eq!(key.step(), i + 1, "{key} should be step {}", i + 1);
        }
        assert_eq!(FieldKey::COUNT, 13);
    }

    #[test]
    fn required_subset_is_strict() {
        assert_eq!(FieldKey::REQUIRED_FOR_LAUNCH.len(), 5);
        assert!(FieldKey::Wallet.is_required_for_launch());
        assert!(FieldKey::Chain.is_required_for_launch());
        assert!(!FieldKey::Vibe.is_required_for_launch());
        assert!(!FieldKey::Marketing.is_required_for_launch());
        assert!(!FieldKey::Type.is_required_for_launch());
    }

    #[test]
    fn every_label_resolves_to_its_own_key() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_label(key.label()), Some(key));
            assert_eq!(FieldKey::from_label(key.as_str()), Some(key));
        }
    }

    #[test]
    fn aliases_are_case_and_separator_insensitive() {
        assert_eq!(FieldKey::from_label("AUDIENCE"), Some(FieldKey::ValueAudience));
        assert_eq!(FieldKey::from_label("value"), Some(FieldKey::ValueAudience));
        assert_eq!(FieldKey::from_label("Settlement"), Some(FieldKey::Wallet));
        assert_eq!(FieldKey::from_label("  prediction-question "), Some(FieldKey::PredictionQuestion));
        assert_eq!(FieldKey::from_label("Prediction   Type"), Some(FieldKey::PredictionType));
        assert_eq!(FieldKey::from_label("favourite colour"), None);
    }

    #[test]
    fn display_matches_serde() {
        for key in FieldKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(format!("\"{key}\""), json);
        }
    }
}
