//! survey-chat – terminal front-end.
//!
//! `chat` runs an interactive session against the chat backend; `analyze`
//! sends one prompt through the relay and prints the answer.

mod analyze;
mod cli;
mod repl;

use std::ops::ControlFlow;

use clap::Parser;
use survey_chat_core::{ChatController, HttpChatBackend};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::repl::{Command, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cli.log.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("WARN: '{}' is not a valid tracing filter ({}); falling back to 'warn'", cli.log, e);
                tracing_subscriber::EnvFilter::new("warn")
            }
        },
    };
    // stdout carries the chat itself; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = reqwest::Client::builder()
        .user_agent(concat!("survey-chat/", env!("CARGO_PKG_VERSION")))
        .build()?;

    match cli.command {
        Commands::Chat { backend_url, model } => {
            let backend = HttpChatBackend::new(client, &backend_url);
            info!(endpoint = backend.endpoint(), %model, "starting chat session");
            run_chat(Session::new(ChatController::with_model(backend, model))).await
        }
        Commands::Analyze {
            relay_url,
            model,
            prompt,
        } => analyze::run(&client, &relay_url, model, prompt, &mut std::io::stdout()).await,
    }
}

async fn run_chat(mut session: Session<HttpChatBackend>) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    session.start(&mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.handle(Command::parse(&line), &mut stdout).await {
            Ok(ControlFlow::Continue(())) => {}
            Ok(ControlFlow::Break(())) => break,
            Err(e) => {
                warn!(error = %e, "failed to write to terminal");
                return Err(e.into());
            }
        }
    }
    info!("chat session ended");
    Ok(())
}
