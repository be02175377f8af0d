/// Error type definitions
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PqcError {
    /// Mode name is not one of the supported parameter tiers
    #[error("Invalid Dilithium mode: {0}")]
    InvalidMode(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationError(String),

    /// Secret key bytes do not decode for the selected mode
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Public key or signature bytes do not decode for the selected mode
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Signing failed: {0}")]
    SigningError(String),
}

pub type Result<T> = std::result::Result<T, PqcError>;
