//! Session - the story being written and who wrote what.
//!
//! A `Session` is created when a story starts, reset wholesale when the
//! language changes, and dropped when the story is discarded. Nothing here
//! is persisted.

use crate::locale::Locale;
use crate::story::{join_sentences, prompt_window, split_sentences, Sentence};
use serde::{Deserialize, Serialize};

/// Number of human+AI exchanges in a finished story.
pub const ROUND_LIMIT: u32 = 10;

/// Character budget for the prompt window.
pub const PROMPT_BUDGET: usize = 300;

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Human,
    #[serde(rename = "AI")]
    Ai,
}

impl Speaker {
    /// Display label in the given locale.
    pub fn label(self, locale: Locale) -> &'static str {
        let strings = locale.strings();
        match self {
            Speaker::Human => strings.human_speaker,
            Speaker::Ai => strings.ai_speaker,
        }
    }
}

/// One submitted or received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
}

/// Story state for one writing session.
///
/// Deserializing rejects a round outside `1..=ROUND_LIMIT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    locale: Locale,
    sentences: Vec<Sentence>,
    transcript: Vec<TranscriptEntry>,
    round: u32,
}

impl Session {
    /// Start an empty story in the given locale.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            sentences: Vec::new(),
            transcript: Vec::new(),
            round: 1,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The current 1-based round.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Record a message: split it into sentences and log it in the transcript.
    ///
    /// Returns how many sentences were appended.
    pub fn record(&mut self, speaker: Speaker, message: &str) -> usize {
        let new = split_sentences(message);
        let added = new.len();
        self.sentences.extend(new);
        self.transcript.push(TranscriptEntry {
            speaker,
            content: message.to_string(),
        });
        added
    }

    /// The whole story, sentences joined by single spaces.
    pub fn story_text(&self) -> String {
        join_sentences(&self.sentences)
    }

    /// The tail of the story that fits in the prompt budget.
    pub fn prompt_window(&self) -> String {
        prompt_window(&self.sentences, PROMPT_BUDGET)
    }

    /// Move to the next round. Returns false if the limit round is already reached.
    pub(crate) fn advance_round(&mut self) -> bool {
        if self.round >= ROUND_LIMIT {
            return false;
        }
        self.round += 1;
        true
    }

    /// Clear the story and switch language.
    pub(crate) fn reset(&mut self, locale: Locale) {
        *self = Self::new(locale);
    }
}

/// Unchecked wire form of [`Session`].
#[derive(Deserialize)]
struct SessionRecord {
    locale: Locale,
    sentences: Vec<Sentence>,
    transcript: Vec<TranscriptEntry>,
    round: u32,
}

impl TryFrom<SessionRecord> for Session {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        if !(1..=ROUND_LIMIT).contains(&record.round) {
            return Err(format!(
                "round {} is outside 1..={ROUND_LIMIT}",
                record.round
            ));
        }
        Ok(Self {
            locale: record.locale,
            sentences: record.sentences,
            transcript: record.transcript,
            round: record.round,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
