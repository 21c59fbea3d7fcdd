//! Error types for token construction and decoding
//!
//! Two distinct failure surfaces:
//! - [`ConstructionError`] is raised while *building* a token, at render time.
//!   These indicate misconfiguration and must never reach a live caller.
//! - [`TokenError`] is raised while *decoding* an inbound token. Inbound
//!   strings are caller-controlled, so these are expected at runtime and are
//!   handled as ordinary request failures.

/// Errors raised while encoding a token
///
/// Construction happens when a control is rendered, never when a request
/// arrives, so any of these failing a test means a control was about to be
/// issued that could never round-trip.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    /// Encoded token would exceed the platform length bound
    #[error("encoded token is {length} characters (platform bound: {limit})")]
    TokenTooLong {
        /// Length the encoding came out at
        length: usize,
        /// The hard platform limit
        limit: usize,
    },

    /// Segment or operation id contains a reserved delimiter or is not ASCII
    #[error("invalid segment '{0}' (must be non-empty ASCII without ':' or '=')")]
    InvalidSegment(String),

    /// Argument key violates the segment character rules
    #[error("invalid argument key '{0}' (must be non-empty ASCII without ':' or '=')")]
    InvalidKey(String),

    /// Argument value contains a reserved delimiter or is not ASCII
    #[error("invalid argument value '{0}' (must be ASCII without ':' or '=')")]
    InvalidValue(String),

    /// Argument key inserted twice
    #[error("duplicate argument key: {0}")]
    DuplicateKey(String),
}

/// Errors raised while decoding an inbound token
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token is the empty string
    #[error("empty token")]
    Empty,

    /// Token has a path but no trailing operation id
    #[error("token '{0}' has no operation id")]
    MissingOperation(String),

    /// A path segment between delimiters is empty
    #[error("token '{0}' contains an empty segment")]
    EmptySegment(String),

    /// An argument pair has no key before its delimiter
    #[error("argument pair '{pair}' has an empty key")]
    EmptyArgumentKey {
        /// The offending `key=value` element
        pair: String,
    },

    /// A bare segment appeared after the first argument pair
    #[error("segment '{segment}' appears after the argument pairs")]
    SegmentAfterArguments {
        /// The out-of-place segment
        segment: String,
    },

    /// An argument pair violates the wire character rules
    #[error("malformed argument pair '{pair}'")]
    InvalidArgument {
        /// The offending `key=value` element
        pair: String,
    },

    /// The same argument key appears more than once
    #[error("duplicate argument key '{key}' in token")]
    DuplicateArgument {
        /// The repeated key
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_error_display() {
        let err = ConstructionError::TokenTooLong {
            length: 120,
            limit: 100,
        };
        assert!(err.to_string().contains("120"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn token_error_display() {
        let err = TokenError::MissingOperation("admin".to_string());
        assert!(err.to_string().contains("admin"));
    }
}
