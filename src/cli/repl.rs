//! Interactive chat loop
//!
//! Input routing:
//! - Input starting with "/" is a command (`/quit`, `/history`, `/help`)
//! - Anything else is a question for the session

use anyhow::Result;
use marketlens_agents::{Role, Session, Transcript, TurnError};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Parsed REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    None,
    Quit,    // /quit, /q, /exit
    History, // /history
    Help,    // /help
    Unknown(String),
    Chat(String),
}

/// Parse one input line
pub fn parse_input(input: &str) -> ReplCommand {
    let input = input.trim();
    if input.is_empty() {
        return ReplCommand::None;
    }

    let Some(rest) = input.strip_prefix('/') else {
        return ReplCommand::Chat(input.to_string());
    };

    match rest {
        "quit" | "q" | "exit" => ReplCommand::Quit,
        "history" | "h" => ReplCommand::History,
        "help" | "?" => ReplCommand::Help,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Render the conversation for `/history`, without the system instruction
pub fn format_history(transcript: &Transcript) -> String {
    let mut out = String::new();
    for (role, content) in transcript.display_pairs() {
        if role == Role::System {
            continue;
        }
        out.push_str(&format!("[{}] {}\n", role.as_str(), content));
    }
    if out.is_empty() {
        out.push_str("(no messages yet)\n");
    }
    out
}

const HELP: &str = "Ask a question about Gold, SPY or Sensex prices.\n\
                    Commands: /history, /help, /quit";

/// Run the chat loop until `/quit` or end of input
pub async fn run_repl(session: &mut Session) -> Result<()> {
    println!("MarketLens chat. {}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ReplCommand::None => continue,
            ReplCommand::Quit => break,
            ReplCommand::History => print!("{}", format_history(session.transcript())),
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Unknown(command) => println!("Unknown command: /{}", command),
            ReplCommand::Chat(question) => match session.ask(&question).await {
                Ok(answer) => println!("{}", answer),
                Err(TurnError::EmptyQuery) => continue,
                Err(err) => eprintln!("Error: {}", err),
            },
        }
    }

    debug!(session = %session.id(), "Chat loop finished");
    Ok(())
}
