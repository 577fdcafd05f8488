use thiserror::Error;

/// Errors surfaced by the core library.
///
/// The air-quality sub-lookup never produces one of these; its failures
/// degrade to an absent field on the record.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, timeout, or a non-success HTTP status from the provider.
    #[error("weather provider request failed: {0}")]
    Provider(String),

    /// The provider answered with a success status but the body was missing
    /// required structure.
    #[error("malformed weather provider response: {0}")]
    MalformedResponse(String),

    /// The candidate city was rejected by the validator.
    #[error("'{0}' does not look like a known city")]
    InvalidCity(String),
}
