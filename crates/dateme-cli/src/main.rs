//! dateme CLI: relationship companion chat from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use dateme_core::mbti::PersonalityCode;
use dateme_core::model::{Mood, Subject};

mod commands;

#[derive(Parser)]
#[command(
    name = "dateme",
    version,
    about = "AI companion for long-distance relationships"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (interactive unless --message/--image is given)
    Chat {
        /// Conversation to continue (defaults to the most recent)
        #[arg(long)]
        conversation: Option<Uuid>,

        /// Start a new conversation
        #[arg(long, conflicts_with = "conversation")]
        new: bool,

        /// Send one message and exit
        #[arg(long)]
        message: Option<String>,

        /// Image URL to attach to the message
        #[arg(long)]
        image: Option<String>,
    },

    /// List your conversations
    Conversations,

    /// Show the messages of a conversation
    History {
        #[arg(long)]
        conversation: Uuid,
    },

    /// Take the 20-statement MBTI questionnaire
    Quiz {
        /// Whose personality the answers describe: user or partner
        #[arg(long = "for", default_value = "user")]
        subject: Subject,

        /// Save the result into this conversation's preferences
        #[arg(long)]
        conversation: Option<Uuid>,

        /// Comma-separated Likert scores (1-5) instead of prompting
        #[arg(long)]
        answers: Option<String>,
    },

    /// Set or clear an MBTI type on a conversation
    Mbti {
        #[arg(long)]
        conversation: Uuid,

        /// user or partner
        #[arg(long = "for", default_value = "user")]
        subject: Subject,

        /// Four-letter code, e.g. INFJ
        #[arg(long = "type", required_unless_present = "clear")]
        code: Option<PersonalityCode>,

        /// Remove the stored type
        #[arg(long, conflicts_with = "code")]
        clear: bool,
    },

    /// Change a conversation's mood
    Mood {
        #[arg(long)]
        conversation: Uuid,

        /// Romantic, Playful, Serious, Supportive, Flirty or Trust-Builder
        #[arg(long)]
        mood: Mood,
    },

    /// Print the system prompt that would be sent (no network)
    Prompt {
        /// Mood label, matched exactly
        #[arg(long, default_value = "Romantic")]
        mood: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        partner_name: Option<String>,

        #[arg(long)]
        tone: Option<String>,

        #[arg(long)]
        love_language: Option<String>,

        #[arg(long)]
        mbti: Option<PersonalityCode>,

        #[arg(long)]
        partner_mbti: Option<PersonalityCode>,
    },

    /// List models the configured provider serves
    Models,

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dateme=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Chat {
            conversation,
            new,
            message,
            image,
        } => commands::chat::execute(config, conversation, new, message, image).await,
        Commands::Conversations => commands::conversations::execute(config).await,
        Commands::History { conversation } => {
            commands::history::execute(config, conversation).await
        }
        Commands::Quiz {
            subject,
            conversation,
            answers,
        } => commands::quiz::execute(config, subject, conversation, answers).await,
        Commands::Mbti {
            conversation,
            subject,
            code,
            clear,
        } => {
            let code = if clear { None } else { code };
            commands::mbti::execute(config, conversation, subject, code).await
        }
        Commands::Mood { conversation, mood } => {
            commands::mood::execute(config, conversation, mood).await
        }
        Commands::Prompt {
            mood,
            name,
            partner_name,
            tone,
            love_language,
            mbti,
            partner_mbti,
        } => commands::prompt::execute(
            mood,
            dateme_core::prompt::Profile {
                name,
                partner_name,
                tone,
                love_language,
                mbti_type: mbti,
                partner_mbti_type: partner_mbti,
            },
        ),
        Commands::Models => commands::models::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
