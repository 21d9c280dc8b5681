//! Write a short story against the real completion API.
//!
//! Each line typed on stdin is one human sentence; the ghost writer answers
//! with one of its own until the round limit is reached.

use ghostwriter_core::{CompletionWriter, Locale, TurnController};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let locale = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<Locale>())
        .transpose()?
        .unwrap_or_default();

    let writer = CompletionWriter::from_env()?;
    let mut controller = TurnController::new(locale);
    let strings = locale.strings();

    println!("=== {} ===\n", strings.app_title);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !controller.is_finished() {
        print!("{} > ", controller.input_hint());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match controller.submit(&line, &writer).await {
            Ok(outcome) => println!("{}: {}", strings.ai_speaker, outcome.reply),
            Err(e) => println!("! {}", e.user_message(locale)),
        }
    }

    println!("\n{}", controller.session().story_text());
    Ok(())
}
