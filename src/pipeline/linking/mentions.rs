//! Alias normalization and n-gram mention extraction.
//!
//! Surface strings are lowercased with punctuation turned into word breaks
//! before lookup, so `Mass/volume` yields the tokens `mass volume`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[[:punct:]]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Grams made only of these never become mentions.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of",
    "on", "or", "other", "the", "to", "with", "without", "nos", "unspecified",
];

/// A span of the normalized string that matched an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub alias: String,
    /// Token offsets, end exclusive.
    pub start: usize,
    pub end: usize,
}

impl Mention {
    pub fn token_len(&self) -> usize {
        self.end - self.start
    }
}

/// Lowercase, punctuation to spaces, collapse whitespace.
pub fn normalize_alias(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

fn is_skippable(tokens: &[&str]) -> bool {
    tokens.iter().all(|t| STOP_WORDS.contains(t))
        || tokens.iter().all(|t| t.chars().all(|c| c.is_ascii_digit()))
}

/// Find non-overlapping alias mentions in an already-normalized string,
/// longest grams first, then left to right.
pub fn extract_mentions<F>(normalized: &str, max_len: usize, is_alias: F) -> Vec<Mention>
where
    F: Fn(&str) -> bool,
{
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    let n = tokens.len();
    let mut used = vec![false; n];
    let mut mentions = Vec::new();

    for len in (1..=max_len.min(n)).rev() {
        for start in 0..=(n - len) {
            let end = start + len;
            if used[start..end].iter().any(|&u| u) {
                continue;
            }
            let gram = &tokens[start..end];
            if is_skippable(gram) {
                continue;
            }
            let alias = gram.join(" ");
            if is_alias(&alias) {
                used[start..end].iter_mut().for_each(|u| *u = true);
                mentions.push(Mention { alias, start, end });
            }
        }
    }

    mentions.sort_by_key(|m| m.start);
    mentions
}

/// Token count of a normalized string.
pub fn token_count(normalized: &str) -> usize {
    normalized.split(' ').filter(|t| !t.is_empty()).count()
}
