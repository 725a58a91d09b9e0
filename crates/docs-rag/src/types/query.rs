//! Question request types

use serde::{Deserialize, Serialize};

/// Explain / question request.
///
/// In document mode `content` carries the full document text. In RAG mode the
/// question is answered from indexed chunks, optionally restricted to one
/// uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplainRequest {
    /// Free-text question; absent or blank asks for a general explanation
    #[serde(default)]
    pub question: Option<String>,

    /// Full document text (document mode)
    #[serde(default)]
    pub content: Option<String>,

    /// Restrict retrieval to chunks of this file (RAG mode)
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,

    /// Number of chunks to retrieve (RAG mode, default from config)
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl ExplainRequest {
    /// Create a question request
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            ..Default::default()
        }
    }

    /// Attach the whole document (document mode)
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Restrict retrieval to one file
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the number of chunks to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// The question, if one was asked (blank counts as none)
    pub fn question_text(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// The file filter, if set and non-blank
    pub fn file_filter(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}
