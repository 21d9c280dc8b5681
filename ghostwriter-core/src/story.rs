//! Story text primitives: sentences, splitting, and the prompt window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that already close a sentence.
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// A non-empty sentence that always ends in `.`, `!` or `?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sentence(String);

impl Sentence {
    /// Normalize a fragment into a sentence.
    ///
    /// Returns `None` for fragments that are empty after trimming.
    pub fn new(fragment: &str) -> Option<Self> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return None;
        }
        if fragment.ends_with(&TERMINATORS[..]) {
            Some(Self(fragment.to_string()))
        } else {
            Some(Self(format!("{fragment}.")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a block of text on `.` into sentences.
///
/// Empty fragments are dropped; a `.` is appended to any fragment that does
/// not already end in terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    text.split('.').filter_map(Sentence::new).collect()
}

/// Join sentences with single spaces.
pub fn join_sentences(sentences: &[Sentence]) -> String {
    sentences
        .iter()
        .map(Sentence::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The longest tail of `sentences` whose joined length fits in `budget` characters.
///
/// If even the newest sentence is over budget it is returned on its own.
pub fn prompt_window(sentences: &[Sentence], budget: usize) -> String {
    join_sentences(window_slice(sentences, budget))
}

fn window_slice(sentences: &[Sentence], budget: usize) -> &[Sentence] {
    if sentences.is_empty() {
        return sentences;
    }

    // Joined length = sum of sentence lengths + one separator between each pair.
    let mut remaining: usize = sentences.iter().map(Sentence::char_len).sum::<usize>()
        + sentences.len()
        - 1;

    let last = sentences.len() - 1;
    for (start, sentence) in sentences.iter().enumerate() {
        if remaining <= budget || start == last {
            return &sentences[start..];
        }
        remaining -= sentence.char_len() + 1;
    }

    &sentences[last..]
}
