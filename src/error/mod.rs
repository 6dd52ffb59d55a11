//! Error types for internrs.

use std::fmt;

/// Errors that can occur while constructing interned blobs.
///
/// Reference-count underflow and overflow are deliberately *not* represented
/// here: both indicate a refcounting bug in the caller and panic with a
/// distinguishing message instead of surfacing as a recoverable value.
#[derive(Debug)]
pub enum InternError {
    /// The content length exceeded the maximum a blob header can record.
    ContentTooLarge {
        /// The actual length that was attempted.
        actual: usize,
        /// The maximum supported length.
        max: usize,
    },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::ContentTooLarge { actual, max } => {
                write!(f, "content too large: {} bytes (max {})", actual, max)
            }
        }
    }
}

impl std::error::Error for InternError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = InternError::ContentTooLarge {
            actual: 5_000_000_000,
            max: u32::MAX as usize,
        };
        assert!(err.to_string().contains("content too large"));
        assert!(err.to_string().contains("5000000000"));
    }
}
