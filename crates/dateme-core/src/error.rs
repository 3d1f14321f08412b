//! Error types shared across the dateme crates.
//!
//! Provider and store implementations return `anyhow::Result` at the trait
//! seam, wrapping one of these typed errors. The chat session downcasts to
//! classify failures without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Errors returned by conversation persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No authenticated user, or the backend rejected the session.
    #[error("user not authenticated: {0}")]
    Unauthenticated(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The backend returned an error response.
    #[error("store error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("network error: {0}")]
    NetworkError(String),

    /// A row could not be decoded into the domain model.
    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl StoreError {
    /// Returns `true` for authentication or authorization failures.
    pub fn is_auth(&self) -> bool {
        match self {
            StoreError::Unauthenticated(_) => true,
            StoreError::ApiError { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

/// Errors raised by the MBTI questionnaire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// A Likert score outside 1..=5.
    #[error("invalid Likert score {0}, expected 1..=5")]
    InvalidScore(i64),

    /// An answer that is not a number at all.
    #[error("invalid answer '{0}', expected a score from 1 to 5")]
    InvalidAnswer(String),

    /// Fewer or more answers than statements.
    #[error("quiz incomplete: {answered} of {expected} statements answered")]
    Incomplete { answered: usize, expected: usize },

    #[error("quiz already finished; retake to answer again")]
    AlreadyFinished,

    #[error("invalid personality code: {0}")]
    InvalidCode(String),
}

/// Errors raised by the chat session itself (not by its collaborators).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no conversation selected")]
    NoConversation,

    #[error("conversation {0} not found in local state")]
    UnknownConversation(String),

    /// The session was opened without a chat provider.
    #[error("no chat provider configured for this session")]
    NoProvider,
}

/// Generic notice shown to the user for a failed operation.
///
/// Authentication failures and everything else get different wording; the
/// underlying error is only logged.
pub fn user_notice(err: &anyhow::Error) -> &'static str {
    if let Some(store) = err.downcast_ref::<StoreError>() {
        if store.is_auth() {
            return "You are not signed in. Please sign in again and retry.";
        }
        return "Something went wrong while saving. Please try again.";
    }
    if let Some(ProviderError::AuthenticationFailed(_)) = err.downcast_ref::<ProviderError>() {
        return "The assistant is not configured correctly. Check your API key.";
    }
    match err.downcast_ref::<SessionError>() {
        Some(SessionError::NoProvider) => {
            return "The assistant is not configured correctly. Check your API key.";
        }
        Some(_) => return "Select a conversation first.",
        None => {}
    }
    "Something went wrong. Please try again."
}
