//! Title similarity ranking.
//!
//! Titles and the query are turned into term-count vectors over a shared
//! vocabulary and compared by cosine similarity. Tokens are lowercase runs of
//! two or more word characters; no stemming, no stopwords.

use crate::models::Entry;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

pub fn tokenize(text: &str) -> Vec<String> {
    match Regex::new(TOKEN_PATTERN) {
        Ok(re) => re
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect(),
        Err(e) => {
            log::error!("Invalid token pattern {}: {}", TOKEN_PATTERN, e);
            Vec::new()
        }
    }
}

/// Vocabulary in first-seen order across the documents
struct Vocabulary {
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn build(documents: &[Vec<String>]) -> Self {
        let mut index = HashMap::new();
        for token in documents.iter().flatten() {
            let next = index.len();
            index.entry(token.clone()).or_insert(next);
        }
        Self { index }
    }

    fn vectorize(&self, tokens: &[String]) -> Vec<f64> {
        let mut counts = vec![0.0; self.index.len()];
        for token in tokens {
            if let Some(&i) = self.index.get(token) {
                counts[i] += 1.0;
            }
        }
        counts
    }
}

/// Cosine similarity, 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}

/// Score every title against the query, in input order
pub fn similarity_scores<S: AsRef<str>>(query: &str, titles: &[S]) -> Vec<f64> {
    let mut documents = Vec::with_capacity(titles.len() + 1);
    documents.push(tokenize(query));
    documents.extend(titles.iter().map(|t| tokenize(t.as_ref())));

    let vocabulary = Vocabulary::build(&documents);
    let query_vector = vocabulary.vectorize(&documents[0]);

    documents[1..]
        .iter()
        .map(|tokens| cosine_similarity(&query_vector, &vocabulary.vectorize(tokens)))
        .collect()
}

/// Entries ordered by descending title similarity to `query`. Equal scores
/// keep their input order.
pub fn rank(query: &str, entries: Vec<Entry>) -> Vec<Entry> {
    rank_with_scores(query, entries)
        .into_iter()
        .map(|(entry, _)| entry)
        .collect()
}

pub fn rank_with_scores(query: &str, entries: Vec<Entry>) -> Vec<(Entry, f64)> {
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    let scores = similarity_scores(query, &titles);

    let mut scored: Vec<(usize, Entry, f64)> = entries
        .into_iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (entry, score))| (i, entry, score))
        .collect();

    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .map(|(_, entry, score)| (entry, score))
        .collect()
}
