//! Turn controller - one human sentence, then one ghost-writer sentence.
//!
//! The controller owns the [`Session`] and is the only thing that mutates it.
//! A turn validates the human input, records it, asks a [`Writer`] for a
//! continuation of the current prompt window, refines the reply and retries
//! empty replies a bounded number of times before recording it and moving to
//! the next round.

use crate::locale::Locale;
use crate::reply::refine_reply;
use crate::session::{Session, Speaker, ROUND_LIMIT};
use crate::story::split_sentences;
use crate::writer::{Writer, WriterError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Writer calls per turn before giving up on empty replies.
pub const MAX_ATTEMPTS: u32 = 4;

/// Where the controller is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Accepting input.
    Idle,
    /// Waiting on the writer.
    Submitting,
    /// The last round has been played; no more input is accepted.
    RoundsExhausted,
}

/// Errors from a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Sentence must be {min}-{max} characters long, got {length}")]
    InvalidInput {
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("A turn is already in progress")]
    Busy,

    #[error("The story is already finished")]
    StoryComplete,

    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    #[error("No usable reply after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl TurnError {
    /// Notification text to show the user.
    pub fn user_message(&self, locale: Locale) -> String {
        let strings = locale.strings();
        match self {
            TurnError::InvalidInput { .. } => strings.invalid_sentence_alert.to_string(),
            TurnError::Busy => strings.busy_notice.to_string(),
            TurnError::StoryComplete => strings.round_finish.to_string(),
            TurnError::Writer(e) => e.user_message(),
            TurnError::RetriesExhausted { .. } => strings.unexpected_error.to_string(),
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// The refined ghost-writer sentence that was added.
    pub reply: String,

    /// The prompt window the accepted reply was generated from.
    pub prompt_window: String,

    /// Writer calls this turn took (1 to `MAX_ATTEMPTS`).
    pub attempts: u32,

    /// The round that was just played.
    pub round: u32,

    /// Whether that was the final round.
    pub story_complete: bool,
}

/// Result of asking to change language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleSwitch {
    /// Already in that locale.
    Unchanged,
    /// The story is not empty; ask the user this before switching.
    NeedsConfirmation { message: &'static str },
    /// The story was cleared and the locale changed.
    Switched,
}

/// Drives rounds of the story.
#[derive(Debug, Clone)]
pub struct TurnController {
    session: Session,
    state: TurnState,
}

impl TurnController {
    /// Start a new story in `locale`.
    pub fn new(locale: Locale) -> Self {
        Self::with_session(Session::new(locale))
    }

    /// Take over an existing session.
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            state: TurnState::Idle,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == TurnState::RoundsExhausted
    }

    /// Placeholder for the input box, e.g. `(3 of 10 sentence)`.
    pub fn input_hint(&self) -> String {
        self.session
            .locale()
            .strings()
            .input_hint(self.session.round())
    }

    /// Play one round with `input` as the human sentence.
    ///
    /// On writer failure or retry exhaustion the human sentence stays in the
    /// story and the round does not advance. Drive the returned future to
    /// completion: dropping it mid-call leaves the controller `Submitting`.
    pub async fn submit<W>(&mut self, input: &str, writer: &W) -> Result<TurnOutcome, TurnError>
    where
        W: Writer + ?Sized,
    {
        match self.state {
            TurnState::RoundsExhausted => return Err(TurnError::StoryComplete),
            TurnState::Submitting => return Err(TurnError::Busy),
            TurnState::Idle => {}
        }

        let locale = self.session.locale();
        if !locale.accepts(input) {
            return Err(TurnError::InvalidInput {
                length: input.chars().count(),
                min: crate::locale::MIN_INPUT_CHARS,
                max: locale.input_limit(),
            });
        }

        self.session.record(Speaker::Human, input);
        self.state = TurnState::Submitting;

        let result = self.request_reply(writer).await;
        self.state = TurnState::Idle;
        let (reply, prompt_window, attempts) = result?;

        self.session.record(Speaker::Ai, &reply);

        let round = self.session.round();
        let story_complete = !self.session.advance_round();
        if story_complete {
            self.state = TurnState::RoundsExhausted;
            info!(round, "story complete");
        } else {
            info!(round, attempts, "round complete");
        }

        Ok(TurnOutcome {
            reply,
            prompt_window,
            attempts,
            round,
            story_complete,
        })
    }

    /// Ask the writer until it produces a usable sentence.
    async fn request_reply<W>(&self, writer: &W) -> Result<(String, String, u32), TurnError>
    where
        W: Writer + ?Sized,
    {
        let locale = self.session.locale();

        for attempt in 1..=MAX_ATTEMPTS {
            let window = self.session.prompt_window();
            debug!(attempt, window_chars = window.chars().count(), "asking writer");

            let raw = writer.suggest(&window, locale).await.map_err(|e| {
                warn!(error = %e, "writer call failed");
                e
            })?;

            let reply = refine_reply(&raw);
            if !split_sentences(&reply).is_empty() {
                return Ok((reply, window, attempt));
            }

            warn!(attempt, max = MAX_ATTEMPTS, "empty reply from writer");
        }

        Err(TurnError::RetriesExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Change the story language.
    ///
    /// Switching discards the story, so a non-empty story needs `confirmed`.
    /// Without it nothing changes and the confirmation text is returned.
    pub fn switch_locale(
        &mut self,
        locale: Locale,
        confirmed: bool,
    ) -> Result<LocaleSwitch, TurnError> {
        if self.state == TurnState::Submitting {
            return Err(TurnError::Busy);
        }
        if locale == self.session.locale() {
            return Ok(LocaleSwitch::Unchanged);
        }
        if !self.session.is_empty() && !confirmed {
            return Ok(LocaleSwitch::NeedsConfirmation {
                message: self.session.locale().strings().language_toggle_confirmation,
            });
        }

        info!(from = %self.session.locale(), to = %locale, "switching locale");
        self.session.reset(locale);
        self.state = TurnState::Idle;
        Ok(LocaleSwitch::Switched)
    }

    /// Rounds left to play, including the current one.
    pub fn rounds_remaining(&self) -> u32 {
        if self.is_finished() {
            0
        } else {
            (ROUND_LIMIT + 1).saturating_sub(self.session.round())
        }
    }
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockReply, MockWriter};

    #[tokio::test]
    async fn test_happy_round() {
        let writer = MockWriter::new(vec![MockReply::text("\n\nThe sun rose. Then")]);
        let mut controller = TurnController::default();

        let outcome = controller.submit("the hero woke up", &writer).await.unwrap();

        assert_eq!(outcome.reply, "The sun rose.");
        assert_eq!(outcome.prompt_window, "the hero woke up.");
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.round, 1);
        assert!(!outcome.story_complete);
        assert_eq!(controller.session().round(), 2);
        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(
            controller.session().story_text(),
            "the hero woke up. The sun rose."
        );
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_call() {
        let writer = MockWriter::new(vec![]);
        let mut controller = TurnController::default();

        let err = controller.submit("abc", &writer).await.unwrap_err();
        assert!(matches!(
            err,
            TurnError::InvalidInput { length: 3, min: 4, max: 128 }
        ));

        let too_long = "a".repeat(129);
        assert!(controller.submit(&too_long, &writer).await.is_err());

        assert!(controller.session().is_empty());
        assert!(controller.session().transcript().is_empty());
        assert_eq!(writer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_replies_are_retried() {
        let writer = MockWriter::new(vec![
            MockReply::text("no period here"),
            MockReply::text("\\n\\n"),
            MockReply::text("Finally a sentence. extra"),
        ]);
        let mut controller = TurnController::default();

        let outcome = controller.submit("It was late", &writer).await.unwrap();

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.reply, "Finally a sentence.");
        // Every attempt saw the same window
        let windows: Vec<String> = writer.calls().into_iter().map(|c| c.window).collect();
        assert_eq!(windows, vec!["It was late."; 3]);
    }

    #[tokio::test]
    async fn test_retries_exhausted_keeps_only_human_turn() {
        let writer = MockWriter::new(vec![MockReply::text(""); 5]);
        let mut controller = TurnController::default();

        let err = controller.submit("It was late", &writer).await.unwrap_err();

        assert!(matches!(err, TurnError::RetriesExhausted { attempts: 4 }));
        assert_eq!(writer.call_count(), 4);
        assert_eq!(controller.session().transcript().len(), 1);
        assert_eq!(controller.session().transcript()[0].speaker, Speaker::Human);
        assert_eq!(controller.session().sentences().len(), 1);
        assert_eq!(controller.session().round(), 1);
        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(
            err.user_message(Locale::English),
            "Sorry for the inconvenience. We got an unexpected error."
        );
    }

    #[tokio::test]
    async fn test_writer_failure_does_not_advance() {
        let writer = MockWriter::new(vec![MockReply::failure(401, "Incorrect API key provided")]);
        let mut controller = TurnController::default();

        let err = controller.submit("It was late", &writer).await.unwrap_err();

        assert!(matches!(err, TurnError::Writer(_)));
        assert_eq!(err.user_message(Locale::English), "Incorrect API key provided");
        assert_eq!(writer.call_count(), 1);
        assert_eq!(controller.session().round(), 1);
        assert_eq!(controller.state(), TurnState::Idle);
        // The human sentence stays
        assert_eq!(controller.session().story_text(), "It was late.");
    }

    #[tokio::test]
    async fn test_lone_period_reply_counts_as_empty() {
        let writer = MockWriter::new(vec![MockReply::text("."), MockReply::text("Ok then.")]);
        let mut controller = TurnController::default();

        let outcome = controller.submit("It was late", &writer).await.unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.reply, "Ok then.");
    }

    #[tokio::test]
    async fn test_eleventh_submission_is_rejected() {
        let writer = MockWriter::new(vec![MockReply::text("And so it went."); 10]);
        let mut controller = TurnController::default();

        for round in 1..=ROUND_LIMIT {
            assert_eq!(controller.rounds_remaining(), ROUND_LIMIT - round + 1);
            let outcome = controller.submit("Then they walked", &writer).await.unwrap();
            assert_eq!(outcome.round, round);
            assert_eq!(outcome.story_complete, round == ROUND_LIMIT);
        }

        assert!(controller.is_finished());
        assert_eq!(controller.session().round(), ROUND_LIMIT);
        assert_eq!(controller.rounds_remaining(), 0);

        let err = controller.submit("One more line", &writer).await.unwrap_err();
        assert!(matches!(err, TurnError::StoryComplete));
        assert_eq!(writer.call_count(), 10);
        assert_eq!(controller.session().transcript().len(), 20);
    }

    #[tokio::test]
    async fn test_locale_switch_needs_confirmation() {
        let writer = MockWriter::new(vec![MockReply::text("The end.")]);
        let mut controller = TurnController::default();
        controller.submit("Once upon a time", &writer).await.unwrap();

        let before = controller.session().story_text();
        let result = controller.switch_locale(Locale::Korean, false).unwrap();
        assert_eq!(
            result,
            LocaleSwitch::NeedsConfirmation {
                message: Locale::English.strings().language_toggle_confirmation
            }
        );
        assert_eq!(controller.session().locale(), Locale::English);
        assert_eq!(controller.session().story_text(), before);
        assert_eq!(controller.session().round(), 2);
        assert_eq!(controller.session().transcript().len(), 2);

        let result = controller.switch_locale(Locale::Korean, true).unwrap();
        assert_eq!(result, LocaleSwitch::Switched);
        assert_eq!(controller.session().locale(), Locale::Korean);
        assert!(controller.session().is_empty());
        assert_eq!(controller.session().round(), 1);
    }

    #[tokio::test]
    async fn test_locale_switch_on_empty_story_and_same_locale() {
        let mut controller = TurnController::default();
        assert_eq!(
            controller.switch_locale(Locale::English, false).unwrap(),
            LocaleSwitch::Unchanged
        );
        assert_eq!(
            controller.switch_locale(Locale::Korean, false).unwrap(),
            LocaleSwitch::Switched
        );
        assert_eq!(controller.input_hint(), "(1 /10번째 문장)");
    }

    #[tokio::test]
    async fn test_switch_after_finish_restarts_story() {
        let writer = MockWriter::new(vec![MockReply::text("Fine."); 10]);
        let mut controller = TurnController::default();
        for _ in 0..ROUND_LIMIT {
            controller.submit("Keep going", &writer).await.unwrap();
        }
        assert!(controller.is_finished());

        controller.switch_locale(Locale::Korean, true).unwrap();
        assert_eq!(controller.state(), TurnState::Idle);
        assert!(!controller.is_finished());
    }

    #[tokio::test]
    async fn test_writer_receives_active_locale() {
        let writer = MockWriter::new(vec![MockReply::text("호랑이가 웃었다.")]);
        let mut controller = TurnController::new(Locale::Korean);
        controller.submit("옛날 옛적에", &writer).await.unwrap();
        assert_eq!(writer.calls()[0].locale, Locale::Korean);
    }

    #[test]
    fn test_resumed_session_at_last_round() {
        let json = serde_json::json!({
            "locale": "English",
            "sentences": ["It was late."],
            "transcript": [{ "speaker": "Human", "content": "It was late" }],
            "round": ROUND_LIMIT,
        });
        let session: Session = serde_json::from_value(json.clone()).unwrap();
        let controller = TurnController::with_session(session);
        assert_eq!(controller.rounds_remaining(), 1);

        let mut past_limit = json;
        past_limit["round"] = 12.into();
        assert!(serde_json::from_value::<Session>(past_limit).is_err());
    }
}
