//! Error types for the Menagerie domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Menagerie operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Command errors ---
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A failed call to the generative collaborator.
///
/// The simulation engine treats every variant uniformly: the circuit breaker
/// does not care whether the cause was quota, network, or a malformed payload.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by the generation API: {0}")]
    RateLimited(String),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Empty response from the generation API")]
    EmptyResponse,

    #[error("Malformed response payload: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// An invalid command from the presentation layer.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_displays_correctly() {
        let err = Error::Generation(GenerationError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn command_error_displays_correctly() {
        let err = Error::Command(CommandError::PostNotFound("post-42".into()));
        assert!(err.to_string().contains("post-42"));
    }
}
