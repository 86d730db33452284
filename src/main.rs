//! bunko-chat — console chat client entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at configured level
//!   4. Resolve the API key (env, then one interactive prompt)
//!   5. Run the prompt loop until "quit" or EOF
//!
//! A provider failure mid-conversation propagates out of the loop and
//! terminates the process — there is no retry.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use bunko::chat::{self, ChatSession};
use bunko::config::{self, Config};
use bunko::error::AppError;
use bunko::llm::providers;
use bunko::logger;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        provider = %config.llm.provider,
        model = %config.llm.openai.model,
        "config loaded"
    );

    let api_key = resolve_api_key(&config)?;
    let provider = providers::build(&config.llm, api_key)?;
    println!("Chat client initialized.");

    let mut session = ChatSession::new(provider, &config.chat.system_prompt);

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("Enter a question (type 'quit' to exit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if chat::is_quit(&line) {
            println!("Ending the conversation.");
            break;
        }

        let turn = session.send(line.trim()).await?;
        println!("Assistant: {}", turn.reply);
        println!(
            "Turn tokens: {}, running total: {}",
            turn.turn_tokens, turn.total_tokens
        );
        println!("{}", "-".repeat(50));
    }

    let total = session.finish();
    println!("Total tokens: {total}");
    Ok(())
}

/// API key resolution: `OPENAI_API_KEY` env first; when the active provider
/// needs a key and none is set, prompt once on stdin, then give up.
fn resolve_api_key(config: &Config) -> Result<Option<String>, AppError> {
    if config.api_key.is_some() || config.llm.provider == "dummy" {
        return Ok(config.api_key.clone());
    }

    println!("Warning: the OPENAI_API_KEY environment variable is not set.");
    print!("Enter your API key: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let key = line.trim();
    if key.is_empty() {
        return Err(AppError::Config("no API key provided".into()));
    }
    Ok(Some(key.to_string()))
}
