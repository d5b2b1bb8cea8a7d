use serde::{Deserialize, Serialize};
use stackpack_bundler::{BuildMessage, BuildOutcome};

/// Payload of one reload event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadMessage {
    pub success: bool,
    pub errors: Vec<BuildMessage>,
    pub warnings: Vec<BuildMessage>,
}

impl From<&BuildOutcome> for ReloadMessage {
    fn from(outcome: &BuildOutcome) -> Self {
        Self {
            success: outcome.success,
            errors: outcome.errors.clone(),
            warnings: outcome.warnings.clone(),
        }
    }
}

impl ReloadMessage {
    pub fn to_json(&self) -> String {
        // Plain strings and flags only; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
