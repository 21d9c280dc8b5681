//! Testing utilities for story sessions.
//!
//! This module provides tools for integration testing:
//! - `MockWriter` for deterministic turns without API calls
//! - `TestHarness` for scripted story scenarios
//! - Assertion helpers for verifying story state

use crate::locale::Locale;
use crate::story::Sentence;
use crate::turn::{TurnController, TurnError, TurnOutcome};
use crate::writer::{Writer, WriterError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Reply given once the script runs out.
const FALLBACK_REPLY: &str = "The ghost writer has no more scripted sentences.";

/// A scripted writer reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw completion text (refined by the controller like a real reply).
    Text(String),
    /// A failed call with an HTTP-like status.
    Failure { status: u16, message: String },
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        MockReply::Failure {
            status,
            message: message.into(),
        }
    }
}

/// One recorded call to a `MockWriter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub window: String,
    pub locale: Locale,
}

/// A writer that returns scripted replies in order and records its calls.
#[derive(Debug, Default)]
pub struct MockWriter {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockWriter {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a reply to the end of the script.
    pub fn queue(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Writer for MockWriter {
    async fn suggest(&self, window: &str, locale: Locale) -> Result<String, WriterError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockCall {
                window: window.to_string(),
                locale,
            });

        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure { status, message }) => {
                Err(WriterError::Backend { status, message })
            }
            None => Ok(FALLBACK_REPLY.to_string()),
        }
    }
}

/// Test harness for running story scenarios.
pub struct TestHarness {
    /// The turn controller under test.
    pub controller: TurnController,
    /// The scripted writer.
    pub writer: MockWriter,
}

impl TestHarness {
    /// Create a harness with an empty English story.
    pub fn new() -> Self {
        Self::with_locale(Locale::English)
    }

    pub fn with_locale(locale: Locale) -> Self {
        Self {
            controller: TurnController::new(locale),
            writer: MockWriter::default(),
        }
    }

    /// Queue a raw writer reply.
    pub fn expect_reply(&mut self, text: impl Into<String>) -> &mut Self {
        self.writer.queue(MockReply::text(text));
        self
    }

    /// Queue a failed writer call.
    pub fn expect_failure(&mut self, status: u16, message: impl Into<String>) -> &mut Self {
        self.writer.queue(MockReply::failure(status, message));
        self
    }

    /// Submit a human sentence.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, TurnError> {
        self.controller.submit(text, &self.writer).await
    }

    /// Story sentences as plain strings.
    pub fn sentences(&self) -> Vec<&str> {
        self.controller
            .session()
            .sentences()
            .iter()
            .map(Sentence::as_str)
            .collect()
    }

    pub fn story_text(&self) -> String {
        self.controller.session().story_text()
    }

    pub fn round(&self) -> u32 {
        self.controller.session().round()
    }

    pub fn transcript_len(&self) -> usize {
        self.controller.session().transcript().len()
    }

    pub fn calls(&self) -> usize {
        self.writer.call_count()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the story consists of exactly these sentences.
#[track_caller]
pub fn assert_story(harness: &TestHarness, expected: &[&str]) {
    let actual = harness.sentences();
    assert_eq!(
        actual, expected,
        "Expected story {expected:?}, got {actual:?}"
    );
}

/// Assert the current round.
#[track_caller]
pub fn assert_round(harness: &TestHarness, expected: u32) {
    let actual = harness.round();
    assert_eq!(actual, expected, "Expected round {expected}, got {actual}");
}

/// Assert how many writer calls have been made.
#[track_caller]
pub fn assert_calls(harness: &TestHarness, expected: usize) {
    let actual = harness.calls();
    assert_eq!(
        actual, expected,
        "Expected {expected} writer calls, got {actual}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_writer_script_order() {
        let writer = MockWriter::new(vec![
            MockReply::text("first"),
            MockReply::failure(500, "boom"),
        ]);

        assert_eq!(writer.suggest("w", Locale::English).await.unwrap(), "first");
        let err = writer.suggest("w", Locale::Korean).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            writer.suggest("w", Locale::English).await.unwrap(),
            FALLBACK_REPLY
        );
        assert_eq!(writer.call_count(), 3);
        assert_eq!(writer.calls()[1].locale, Locale::Korean);
    }

    #[tokio::test]
    async fn test_harness_round_trip() {
        let mut harness = TestHarness::new();
        harness.expect_reply("A door creaked.");

        harness.submit("The house was quiet").await.unwrap();

        assert_story(&harness, &["The house was quiet.", "A door creaked."]);
        assert_round(&harness, 2);
        assert_calls(&harness, 1);
        assert_eq!(harness.transcript_len(), 2);
    }
}
