pub mod agent;
pub mod cli;
pub mod llm;
pub mod memory;
pub mod models;
pub mod persona;
pub mod prompt;
pub mod store;

use std::error::Error;
use std::io::Write as _;
use std::str::FromStr;

use log::{ error, info };
use tokio::io::{ AsyncBufReadExt, BufReader };

use agent::{ MentorAgent, SendMessageRequest };
use cli::Args;
use llm::ProviderPreference;

const HELP: &str = "Commands: /new, /sessions, /history, /delete [id], /provider <name|auto>, /help, /quit\n\
Anything else is sent to the mentor.";

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Session Store Type: {}", args.store_type);
    info!("Session Store Host: {}", args.store_host);
    info!("Default Provider: {}", args.default_provider);
    info!("Owner: {}", args.owner_id.as_deref().unwrap_or("anonymous"));
    info!("-------------------------");

    let agent = MentorAgent::new(&args)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_id: Option<String> = None;
    let mut provider_override: Option<String> = None;

    println!("{}", HELP);
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => {
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_whitespace().next() {
            Some("/quit") | Some("/exit") => {
                break;
            }
            Some("/help") => {
                println!("{}", HELP);
            }
            Some("/new") => {
                session_id = None;
                println!("Started a new conversation.");
            }
            Some("/sessions") => {
                match agent.user_sessions(args.owner_id.as_deref()).await {
                    Ok(sessions) if sessions.is_empty() => println!("No sessions yet."),
                    Ok(sessions) => {
                        for session in sessions {
                            println!("{}  {}", session.id, session.title);
                        }
                    }
                    Err(e) => error!("Could not list sessions: {}", e),
                }
            }
            Some("/history") => {
                match &session_id {
                    Some(id) =>
                        match agent.session_messages(id).await {
                            Ok(messages) => {
                                for message in messages {
                                    println!("[{}] {}", message.role, message.content);
                                }
                            }
                            Err(e) => error!("Could not load history: {}", e),
                        }
                    None => println!("No active session. Send a message first."),
                }
            }
            Some("/delete") => {
                let target = input
                    .split_whitespace()
                    .nth(1)
                    .map(str::to_string)
                    .or_else(|| session_id.clone());
                match target {
                    Some(id) => {
                        match agent.delete_session(&id).await {
                            Ok(()) => {
                                if session_id.as_deref() == Some(id.as_str()) {
                                    session_id = None;
                                }
                                println!("Session {} deactivated.", id);
                            }
                            Err(e) => error!("Could not delete session {}: {}", id, e),
                        }
                    }
                    None => println!("No session to delete."),
                }
            }
            Some("/provider") => {
                match input.split_whitespace().nth(1) {
                    Some(token) =>
                        match ProviderPreference::from_str(token) {
                            Ok(_) => {
                                provider_override = Some(token.to_string());
                                println!("Provider preference set to {}.", token);
                            }
                            Err(e) => println!("{}", e),
                        }
                    None => println!("Usage: /provider <deepseek|gpt-oss|openai|anthropic|auto>"),
                }
            }
            _ => {
                let request = SendMessageRequest {
                    owner_id: args.owner_id.clone(),
                    session_id: session_id.clone(),
                    message: input.to_string(),
                    provider: provider_override.clone(),
                    ..Default::default()
                };
                match agent.send_message(request).await {
                    Ok(reply) => {
                        session_id = Some(reply.session_id.clone());
                        println!("{}", reply.content);
                    }
                    Err(e) => error!("Message failed: {}", e),
                }
            }
        }
    }

    Ok(())
}
