//! Configuration for the retrieval pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Similarity metric used to rank search results. Higher is always better.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity in `[-1, 1]`. Zero-magnitude vectors score `0.0`.
    #[default]
    Cosine,
    /// Raw dot product. Equivalent to cosine for pre-normalized embeddings.
    DotProduct,
}

impl SimilarityMetric {
    /// Score `a` against `b`. Callers guarantee equal lengths.
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        match self {
            Self::DotProduct => dot,
            Self::Cosine => {
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot / (norm_a * norm_b)
            }
        }
    }
}

/// Configuration parameters for the retrieval pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Number of results returned when the caller does not specify one.
    pub top_k: usize,
    /// Results scoring below this are dropped. `None` keeps everything.
    pub similarity_threshold: Option<f32>,
    /// Metric of the in-memory store a pipeline builds when none is given.
    pub metric: SimilarityMetric,
    /// Lines per window for code indexing.
    pub window_size: usize,
    /// Maximum embedding calls in flight during one ingestion run.
    pub embed_concurrency: usize,
    /// Upper bound on a single embedding call.
    #[serde(rename = "embed_timeout_ms", with = "duration_ms")]
    pub embed_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: None,
            metric: SimilarityMetric::Cosine,
            window_size: 10,
            embed_concurrency: 1,
            embed_timeout: Duration::from_secs(30),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `top_k`, `window_size` or
    /// `embed_concurrency` is zero, or `embed_timeout` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.window_size == 0 {
            return Err(RagError::Config("window_size must be greater than zero".to_string()));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::Config(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.embed_timeout.is_zero() {
            return Err(RagError::Config("embed_timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the default number of results.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity threshold for filtering results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Set the similarity metric.
    pub fn metric(mut self, metric: SimilarityMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Set the number of lines per code window.
    pub fn window_size(mut self, lines: usize) -> Self {
        self.config.window_size = lines;
        self
    }

    /// Set how many embedding calls may run at once during ingestion.
    pub fn embed_concurrency(mut self, n: usize) -> Self {
        self.config.embed_concurrency = n;
        self
    }

    /// Set the per-call embedding timeout.
    pub fn embed_timeout(mut self, timeout: Duration) -> Self {
        self.config.embed_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(|_| {
            S::Error::custom(format!("duration {value:?} overflows u64 milliseconds"))
        })?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
