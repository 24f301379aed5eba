//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid field literal: {0}")]
    InvalidField(String),

    #[error("field literal exceeds the modulus: {0}")]
    FieldOutOfRange(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
