//! The `dateme chat` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use dateme_core::error::user_notice;
use dateme_core::model::{Message, Mood, Sender};
use dateme_core::session::ChatSession;

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReplInput {
    Send(String),
    Mood(String),
    New,
    Quit,
    Help,
    Empty,
}

pub(crate) fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Send(line.to_string());
    };
    let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "quit" | "exit" | "q" => ReplInput::Quit,
        "new" => ReplInput::New,
        "mood" => ReplInput::Mood(arg.trim().to_string()),
        "help" => ReplInput::Help,
        _ => ReplInput::Send(line.to_string()),
    }
}

pub async fn execute(
    config_path: Option<PathBuf>,
    conversation: Option<Uuid>,
    new: bool,
    message: Option<String>,
    image: Option<String>,
) -> Result<()> {
    let config = super::load(config_path.as_deref())?;
    let mut session = super::open_session(&config).await?;

    match conversation {
        Some(id) => {
            super::with_notice(session.select_conversation(id).await.map(|_| ()))?;
        }
        None => {
            let latest = session.conversations().first().map(|c| c.id);
            match latest {
                Some(id) if !new => {
                    super::with_notice(session.select_conversation(id).await.map(|_| ()))?;
                }
                _ => {
                    super::with_notice(session.new_conversation().await)?;
                }
            }
        }
    }

    if message.is_some() || image.is_some() {
        let text = message.unwrap_or_default();
        return send(&mut session, &text, image).await;
    }

    print_header(&session);
    if let Some(conv) = session.current() {
        for msg in &conv.messages {
            print_message(msg);
        }
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        match parse_line(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Help => {
                println!("/mood NAME  change the assistant's mood");
                println!("/new        start a new conversation");
                println!("/quit       leave");
            }
            ReplInput::New => match session.new_conversation().await {
                Ok(_) => {
                    print_header(&session);
                    if let Some(greeting) = session.current().and_then(|c| c.messages.first()) {
                        print_message(greeting);
                    }
                }
                Err(e) => eprintln!("{}", user_notice(&e)),
            },
            ReplInput::Mood(name) => match name.parse::<Mood>() {
                Ok(mood) => match session.set_mood(mood).await {
                    Ok(()) => println!("Mood set to {} {}", mood.emoji(), mood),
                    Err(e) => eprintln!("{}", user_notice(&e)),
                },
                Err(e) => eprintln!("{e}"),
            },
            ReplInput::Send(text) => send(&mut session, &text, None).await?,
        }
    }

    Ok(())
}

async fn send(session: &mut ChatSession, text: &str, image: Option<String>) -> Result<()> {
    let Some(outcome) = session.send_message(text, image).await? else {
        return Ok(());
    };
    print_message(&outcome.reply);
    if let Some(e) = &outcome.save_error {
        eprintln!("{}", user_notice(e));
    }
    Ok(())
}

fn print_header(session: &ChatSession) {
    if let Some(conv) = session.current() {
        let mood = conv.user_preferences.mood;
        println!("--- {} [{} {}] ({})", conv.title, mood.emoji(), mood, conv.id);
    }
}

fn print_message(msg: &Message) {
    let who = match msg.sender {
        Sender::User => "You",
        Sender::Assistant => "Dateme",
    };
    if !msg.text.is_empty() {
        println!("{who}: {}", msg.text);
    }
    if let Some(image) = &msg.image {
        println!("{who}: [image] {image}");
    }
}
