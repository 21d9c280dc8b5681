//! HTTP backend for the ghost writer.
//!
//! Exposes the generate endpoint that forwards a story window to the
//! completion API, plus routes that keep whole stories on the server and play
//! them round by round.

pub mod config;
pub mod logging;
pub mod web;

pub use config::{Cli, Upstream};
pub use logging::init_logging;
pub use web::{app, ApiError, AppState, StorySnapshot};
