//! Keyword search over a directory of markdown guideline documents.

use std::path::Path;

use crate::models::GuidelineSnippet;
use crate::pipeline::normalize::text::fold;

use super::{AdvisoryError, SnippetRetriever};

pub const DEFAULT_TOP_K: usize = 3;
pub const SNIPPET_MAX_CHARS: usize = 1000;

/// Query words shorter than this are ignored ("of", "di").
const MIN_QUERY_WORD_CHARS: usize = 3;

#[derive(Debug, Clone)]
struct GuidelineDocument {
    source: String,
    text: String,
    folded: String,
}

#[derive(Debug, Clone)]
pub struct GuidelineRetriever {
    documents: Vec<GuidelineDocument>,
    top_k: usize,
}

impl GuidelineRetriever {
    /// Load every `*.md` file in `dir`; the file stem becomes the source name.
    pub fn load_dir(dir: &Path) -> Result<Self, AdvisoryError> {
        let mut documents = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let source = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            match std::fs::read_to_string(&path) {
                Ok(text) => documents.push((source, text)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable guideline");
                }
            }
        }
        tracing::info!(dir = %dir.display(), documents = documents.len(), "Guidelines loaded");
        Ok(Self::from_documents(documents))
    }

    pub fn from_documents(documents: Vec<(String, String)>) -> Self {
        let mut documents: Vec<GuidelineDocument> = documents
            .into_iter()
            .map(|(source, text)| GuidelineDocument {
                folded: fold(&text),
                source,
                text,
            })
            .collect();
        documents.sort_by(|a, b| a.source.cmp(&b.source));
        Self {
            documents,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents ranked by how many query words they contain.
    pub fn search(&self, query: &str) -> Vec<GuidelineSnippet> {
        let folded = fold(query);
        let words: Vec<&str> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= MIN_QUERY_WORD_CHARS)
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &GuidelineDocument)> = self
            .documents
            .iter()
            .map(|doc| (words.iter().filter(|w| doc.folded.contains(**w)).count(), doc))
            .filter(|(hits, _)| *hits > 0)
            .collect();
        // Stable: equal scores keep source order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.top_k)
            .map(|(hits, doc)| GuidelineSnippet {
                source: doc.source.clone(),
                text: truncate(&doc.text, SNIPPET_MAX_CHARS),
                relevance: hits as f32 / words.len() as f32,
            })
            .collect()
    }
}

impl SnippetRetriever for GuidelineRetriever {
    fn retrieve(&self, query: &str) -> Result<Vec<GuidelineSnippet>, AdvisoryError> {
        Ok(self.search(query))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
