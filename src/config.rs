//! Merge configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LexError, LexResult, ValidationError};
use crate::storage::LookupMode;

/// Tunables of the merge interactor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Module name used in structured summaries.
    pub summary_module: String,
    /// Right an actor needs for a bot-flagged merge to be saved as a bot edit.
    pub bot_right: String,
    /// Where lexemes are loaded from.
    pub lookup_mode: LookupMode,
    /// Whether watch-list subscriptions are copied from source to target.
    pub propagate_watchlist: bool,
    /// User summaries are truncated to this many characters.
    pub max_user_summary_length: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            summary_module: "wblmergelexemes".to_string(),
            bot_right: "bot".to_string(),
            lookup_mode: LookupMode::LatestFromMaster,
            propagate_watchlist: true,
            max_user_summary_length: 500,
        }
    }
}

impl MergeConfig {
    const MAX_USER_SUMMARY_LENGTH: usize = 10_000;

    /// Checks the configuration, returning it unchanged if valid.
    pub fn validate(self) -> LexResult<Self> {
        if self.summary_module.trim().is_empty() {
            return Err(invalid("summary_module cannot be empty"));
        }
        if self.bot_right.trim().is_empty() {
            return Err(invalid("bot_right cannot be empty"));
        }
        if self.max_user_summary_length > Self::MAX_USER_SUMMARY_LENGTH {
            return Err(invalid(format!(
                "max_user_summary_length must be at most {} (got {})",
                Self::MAX_USER_SUMMARY_LENGTH,
                self.max_user_summary_length
            )));
        }
        Ok(self)
    }
}

fn invalid(reason: impl Into<String>) -> LexError {
    LexError::Validation(ValidationError::InvalidConfig {
        reason: reason.into(),
    })
}
