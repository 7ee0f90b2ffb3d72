//! Interactive console chat against the full relay stack.
//!
//! Requires `DATABASE_URL` and `DEEPSEEK_API_KEY` (a `.env` file works).
//!
//! ```sh
//! DATABASE_URL=sqlite:aria.db?mode=rwc cargo run -p orchestrator --example console_chat
//! ```
//!
//! Type `/stats` to see your usage, `/forget` to clear the conversation.

use std::io::{self, BufRead, Write};

use orchestrator::{Orchestrator, GREETING_TEXT};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let orchestrator = Orchestrator::from_env().await?;

    let user_id: i64 = std::env::var("ARIA_CONSOLE_USER_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    println!("{GREETING_TEXT}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match text {
            "/stats" => println!("{}", orchestrator.usage_summary(user_id).await?),
            "/forget" => {
                orchestrator.forget_conversation(user_id).await?;
                println!("Forgotten. Clean slate!");
            }
            _ => println!("{}", orchestrator.handle_message(user_id, text).await?),
        }
    }

    Ok(())
}
