//! Turn-taking story engine for writing a novel with an AI ghost writer.
//!
//! This crate provides:
//! - Story primitives: sentence splitting and the bounded prompt window
//! - A `Session` holding the story, transcript, round and locale
//! - A `TurnController` that plays rounds against any `Writer`
//! - Writers for the completion API and for a remote generate endpoint
//!
//! # Quick Start
//!
//! ```ignore
//! use ghostwriter_core::{CompletionWriter, Locale, TurnController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let writer = CompletionWriter::from_env()?;
//!     let mut controller = TurnController::new(Locale::English);
//!
//!     let outcome = controller.submit("The lighthouse keeper heard a knock", &writer).await?;
//!     println!("{}", outcome.reply);
//!     println!("{}", controller.session().story_text());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod locale;
pub mod reply;
pub mod session;
pub mod story;
pub mod testing;
pub mod turn;
pub mod writer;

// Primary public API
pub use locale::{Locale, LocaleStrings};
pub use session::{Session, Speaker, TranscriptEntry, PROMPT_BUDGET, ROUND_LIMIT};
pub use story::Sentence;
pub use testing::{MockReply, MockWriter, TestHarness};
pub use turn::{LocaleSwitch, TurnController, TurnError, TurnOutcome, TurnState, MAX_ATTEMPTS};
pub use writer::{CompletionWriter, RemoteWriter, Writer, WriterConfig, WriterError};
