use clap::{Parser, Subcommand};
use survey_types::{DEFAULT_MODEL, ModelSelector};

/// survey-chat - terminal client for the survey analysis assistant
#[derive(Debug, Parser)]
#[command(name = "survey-chat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "SURVEY_CHAT_LOG", default_value = "warn")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive chat against the chat backend
    Chat {
        /// Base URL of the chat backend
        #[arg(long, env = "SURVEY_CHAT_BACKEND_URL", default_value = survey_chat_core::backend::DEFAULT_BACKEND_URL)]
        backend_url: String,

        /// Model to request
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
    },
    /// One-shot analysis through the relay
    Analyze {
        /// Base URL of the relay server
        #[arg(long, env = "SURVEY_RELAY_URL", default_value = "http://localhost:3000")]
        relay_url: String,

        /// Provider: openai or huggingface
        #[arg(long, default_value_t = ModelSelector::OpenAi)]
        model: ModelSelector,

        /// Survey results to analyze
        prompt: String,
    },
}
