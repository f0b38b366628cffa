use thiserror::Error;

/// The sponsor declined to sign. Carries the first offending action, if any.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct PolicyRejection {
    pub action_index: Option<usize>,
    pub reason: String,
}

impl PolicyRejection {
    pub fn transaction(reason: impl Into<String>) -> Self {
        Self {
            action_index: None,
            reason: reason.into(),
        }
    }

    pub fn action(index: usize, reason: impl Into<String>) -> Self {
        Self {
            action_index: Some(index),
            reason: reason.into(),
        }
    }
}
