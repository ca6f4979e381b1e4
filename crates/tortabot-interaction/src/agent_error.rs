//! Errors raised while talking to a remote model.

use std::time::Duration;

use thiserror::Error;
use tortabot_core::BotError;

#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The request reached the service (or tried to) and failed.
    #[error("Process error (status {status_code:?}): {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The agent could not even build or send a request.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// A prompt template failed to render.
    #[error("Template error: {0}")]
    Template(String),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessError { is_retryable: true, .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ProcessError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<minijinja::Error> for AgentError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<AgentError> for BotError {
    fn from(err: AgentError) -> Self {
        BotError::oracle(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_metadata() {
        let err = AgentError::process_error_with_retry_after(
            429,
            "RESOURCE_EXHAUSTED",
            true,
            Duration::from_secs(7),
        );
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert!(!AgentError::Other("x".into()).is_retryable());
    }

    #[test]
    fn test_maps_into_oracle_error() {
        let err: BotError = AgentError::ExecutionFailed("no key".into()).into();
        assert!(err.is_oracle());
        assert!(err.to_string().contains("no key"));
    }
}
