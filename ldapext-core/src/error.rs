use thiserror::Error;

use crate::result_code::ResultCode;

/// Main error type for extension value encoding and decoding
#[derive(Error, Debug)]
pub enum LdapError {
    /// Untrusted input (BER bytes or JSON) did not match the expected structure
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// A local precondition was violated while constructing a value
    #[error("Usage error: {0}")]
    Usage(String),

    /// A value cannot be represented in the wire encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LdapError {
    /// Standard LDAP result code classifying this error
    pub fn result_code(&self) -> ResultCode {
        match self {
            LdapError::Decoding(_) | LdapError::Json(_) => ResultCode::DECODING_ERROR,
            LdapError::Usage(_) => ResultCode::PARAM_ERROR,
            LdapError::Encoding(_) => ResultCode::ENCODING_ERROR,
        }
    }

    /// Whether this error came from malformed input rather than local misuse
    pub fn is_decoding_error(&self) -> bool {
        matches!(self, LdapError::Decoding(_) | LdapError::Json(_))
    }

    pub fn is_usage_error(&self) -> bool {
        matches!(self, LdapError::Usage(_))
    }
}

/// Result type alias for extension value operations
pub type LdapResult<T> = Result<T, LdapError>;
