//! chatctl - talk to chatd from the terminal

use anyhow::Result;
use chat_common::VERSION;
use chatctl::{commands, ChatdClient, DEFAULT_URL};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "chatctl")]
#[command(about = "Command-line client for the chatd chat service", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// chatd base URL
    #[arg(long, env = "CHATD_URL", default_value = DEFAULT_URL, global = true)]
    url: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Check that chatd is up
    Health,

    /// Manage FAQ entries
    Faqs {
        #[command(subcommand)]
        command: FaqCommands,
    },

    /// Show recent fallback events
    Logs {
        /// Maximum number of entries (server default: 10)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum FaqCommands {
    /// List all FAQs
    List,

    /// Add a FAQ entry
    Add {
        #[arg(long)]
        question: String,

        #[arg(long)]
        answer: String,
    },

    /// Re-read the FAQ file on the server
    Reload,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ChatdClient::new(&cli.url)?;
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Ask { message } => commands::ask(&client, &message.join(" "), color).await,
        Commands::Health => commands::health(&client).await,
        Commands::Faqs { command } => match command {
            FaqCommands::List => commands::list_faqs(&client).await,
            FaqCommands::Add { question, answer } => {
                commands::add_faq(&client, &question, &answer).await
            }
            FaqCommands::Reload => commands::reload_faqs(&client).await,
        },
        Commands::Logs { limit } => commands::logs(&client, limit).await,
    }
}
