//! Guideline retrieval store
//!
//! Lexical stand-in for a vector store: guideline documents are split
//! into heading-delimited passages and ranked by query-term overlap.
//! An empty store is valid and simply yields no context passages.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// One retrievable slice of guideline text
#[derive(Debug, Clone)]
pub struct GuidelinePassage {
    source: String,
    heading: Option<String>,
    body: String,
}

impl GuidelinePassage {
    /// Document the passage came from
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Section heading, if the document had one
    #[inline]
    #[must_use]
    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    /// Passage text
    #[inline]
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    fn search_text(&self) -> String {
        let mut text = self.heading.clone().unwrap_or_default();
        text.push(' ');
        text.push_str(&self.body);
        text.to_lowercase()
    }
}

/// In-memory guideline passage store
#[derive(Debug, Clone, Default)]
pub struct GuidelineStore {
    passages: Vec<GuidelinePassage>,
}

impl GuidelineStore {
    /// Store with no passages
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load all top-level `.md` / `.txt` documents under `dir`
    ///
    /// # Errors
    /// Propagates filesystem errors; a missing directory is an error, an
    /// empty one is not.
    pub fn load(dir: &Path) -> Result<Self, io::Error> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            paths.push(entry?.path());
        }
        paths.sort();

        let mut passages = Vec::new();
        for path in paths {
            let is_doc = path
                .extension()
                .is_some_and(|ext| ext == "md" || ext == "txt");
            if !path.is_file() || !is_doc {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            passages.extend(split_passages(&source, &text));
        }

        tracing::debug!(
            dir = %dir.display(),
            passages = passages.len(),
            "guideline store loaded"
        );
        Ok(Self { passages })
    }

    /// Number of passages held
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether the store holds no passages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Top-`k` passages ranked by case-insensitive term overlap
    ///
    /// Passages matching no query term are never returned; ties keep
    /// document order.
    #[must_use]
    pub fn relevant(&self, query: &str, k: usize) -> Vec<&GuidelinePassage> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &GuidelinePassage)> = self
            .passages
            .iter()
            .filter_map(|passage| {
                let haystack = passage.search_text();
                let score = terms
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .count();
                (score > 0).then_some((score, passage))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, p)| p).collect()
    }
}

/// Lowercased query terms, short stop-words dropped
fn query_terms(query: &str) -> HashSet<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.len() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// Split a document on markdown headings; headingless text becomes a
/// single passage
fn split_passages(source: &str, text: &str) -> Vec<GuidelinePassage> {
    let mut passages = Vec::new();
    let mut heading: Option<String> = None;
    let mut body = String::new();

    let flush = |heading: &Option<String>, body: &mut String, passages: &mut Vec<_>| {
        let trimmed = body.trim();
        if !trimmed.is_empty() {
            passages.push(GuidelinePassage {
                source: source.to_string(),
                heading: heading.clone(),
                body: trimmed.to_string(),
            });
        }
        body.clear();
    };

    for line in text.lines() {
        if line.starts_with('#') {
            flush(&heading, &mut body, &mut passages);
            heading = Some(line.trim_start_matches('#').trim().to_string());
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    flush(&heading, &mut body, &mut passages);

    passages
}
