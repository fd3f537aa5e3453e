//! Error types for the `lore-rag` crate.
//!
//! "Nothing found" is never an error here: absent keys, absent collections
//! and empty result sets are modelled as values (see [`Lookup`](crate::Lookup),
//! [`Matches`](crate::Matches) and [`Answer`](crate::Answer)).

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid caller input: empty query, zero `max_results`, unreadable path.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The embedding gateway failed (network, quota, auth or timeout).
    #[error("Embedding gateway error ({provider}): {message}")]
    Gateway {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An ingestion run was aborted while processing the chunk with `key`.
    #[error("Ingestion aborted at chunk '{key}': {source}")]
    Ingest {
        /// Key of the chunk that could not be ingested.
        key: String,
        /// The underlying failure.
        #[source]
        source: Box<RagError>,
    },

    /// A vector's dimensionality does not match the collection's.
    #[error(
        "Dimension mismatch in collection '{collection}': expected {expected}, got {actual}"
    )]
    DimensionMismatch {
        /// The collection whose invariant was violated.
        collection: String,
        /// The collection's dimensionality.
        expected: usize,
        /// The offending vector's dimensionality.
        actual: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    /// Build a [`RagError::Gateway`] for `provider`.
    pub fn gateway(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Gateway { provider: provider.into(), message: message.into() }
    }

    /// Whether this error signals a broken invariant rather than a
    /// recoverable condition. Fatal errors must not be retried.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DimensionMismatch { .. } => true,
            Self::Ingest { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// The innermost error, looking through [`RagError::Ingest`] wrappers.
    pub fn root(&self) -> &RagError {
        match self {
            Self::Ingest { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_is_fatal_through_ingest_wrapper() {
        let err = RagError::Ingest {
            key: "story.txt_3".into(),
            source: Box::new(RagError::DimensionMismatch {
                collection: "docs".into(),
                expected: 768,
                actual: 384,
            }),
        };
        assert!(err.is_fatal());
        assert!(matches!(err.root(), RagError::DimensionMismatch { expected: 768, .. }));
        assert!(err.to_string().contains("story.txt_3"));
    }

    #[test]
    fn gateway_errors_are_not_fatal() {
        let err = RagError::gateway("OpenAI", "quota exceeded");
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Embedding gateway error (OpenAI): quota exceeded");
    }
}
