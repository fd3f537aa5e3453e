//! Rendered retrieval answers with citations.

use std::fmt;

use serde::Serialize;

use crate::document::{ChunkPosition, SearchResult};

/// Rendered when a retrieval finds nothing relevant.
pub const NO_RELEVANT_INFORMATION: &str =
    "No relevant information found for your query in vector store";

/// One retrieved chunk with everything needed to cite it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    /// Chunk key in its collection.
    pub key: String,
    /// Source document name.
    pub document_name: String,
    /// Paragraph or window the text came from.
    pub position: ChunkPosition,
    /// Similarity score (higher is more relevant).
    pub score: f32,
    /// The chunk text.
    pub text: String,
}

impl From<SearchResult> for Citation {
    fn from(result: SearchResult) -> Self {
        let chunk = result.chunk;
        Self {
            key: chunk.key,
            document_name: chunk.document_name,
            position: chunk.position,
            score: result.score,
            text: chunk.text,
        }
    }
}

/// Result of [`RagPipeline::retrieve`](crate::RagPipeline::retrieve).
///
/// "Nothing relevant" is a valid answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "citations", rename_all = "snake_case")]
pub enum Answer {
    /// No chunk matched the query.
    NoRelevantInformation,
    /// Matching chunks, most relevant first.
    Found(Vec<Citation>),
}

impl Answer {
    /// The citations, empty when nothing was found.
    pub fn citations(&self) -> &[Citation] {
        match self {
            Self::NoRelevantInformation => &[],
            Self::Found(citations) => citations,
        }
    }

    /// Whether at least one chunk was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl From<Vec<SearchResult>> for Answer {
    fn from(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            Self::NoRelevantInformation
        } else {
            Self::Found(results.into_iter().map(Citation::from).collect())
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let citations = match self {
            Self::NoRelevantInformation => return f.write_str(NO_RELEVANT_INFORMATION),
            Self::Found(citations) => citations,
        };

        writeln!(f, "### Relevant information about your query:")?;
        writeln!(f)?;
        for citation in citations {
            writeln!(
                f,
                "**File: {}, {}, Relevancy: {:.4}**",
                citation.document_name, citation.position, citation.score
            )?;
            writeln!(f, "{}", citation.text)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Chunk;

    #[test]
    fn empty_results_render_canonical_message() {
        let answer = Answer::from(Vec::new());
        assert!(!answer.is_found());
        assert_eq!(answer.to_string(), NO_RELEVANT_INFORMATION);
    }

    #[test]
    fn citations_render_in_order_with_provenance() {
        let results = vec![
            SearchResult {
                chunk: Chunk::new("s.txt_3", "s.txt", ChunkPosition::Paragraph(3), "third line"),
                score: 0.9,
            },
            SearchResult {
                chunk: Chunk::new("lib.rs-chunk-0", "lib.rs", ChunkPosition::Window(0), "fn x()"),
                score: 0.25,
            },
        ];
        let rendered = Answer::from(results).to_string();

        let first = rendered.find("**File: s.txt, Paragraph: 3, Relevancy: 0.9000**").unwrap();
        let second = rendered.find("**File: lib.rs, Window: 0, Relevancy: 0.2500**").unwrap();
        assert!(first < second);
        assert!(rendered.starts_with("### Relevant information about your query:"));
        assert!(rendered.contains("third line\n"));
    }
}
