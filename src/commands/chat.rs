use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use inquire::{Confirm, Select, Text};

use crate::api::ApiClient;
use crate::api::types::{ChatMessage, ChatSession, Flashcard};
use crate::config::{Config, Profile};
use crate::session::PanelSource;
use crate::ui;

use super::{require_profile, study};

pub async fn run() -> Result<()> {
    let mut config = Config::load()?;
    let Some(profile) = require_profile(&config) else {
        return Ok(());
    };

    let base = config.backend_url();
    let client = ApiClient::new(&base, Some(profile.user_id));

    // Refresh the stored role; it gates the admin menu entry.
    if let Ok(me) = client.current_user().await {
        config.set_role(me.user_role);
        let _ = config.save();
    }

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".cyan()
    );
    println!(
        "    {}          {}          {}",
        "│".cyan(),
        "🎓 TUTOR CHAT 🎓".bold().white(),
        "│".cyan()
    );
    println!(
        "    {}  {}   {}",
        "│".cyan(),
        "Every reply comes with flashcards to drill".dimmed(),
        "│".cyan()
    );
    println!(
        "    {}",
        "├──────────────────────────────────────────────────────┤".cyan()
    );
    println!(
        "    {}  👤 {:<24} 🌐 {:<20} {}",
        "│".cyan(),
        profile.display_name().green(),
        base.yellow(),
        "│".cyan()
    );
    println!(
        "    {}",
        "├──────────────────────────────────────────────────────┤".cyan()
    );
    println!(
        "    {}  💡 {} to exit │ {} / {} / {} for flashcards   {}",
        "│".cyan(),
        "quit".yellow().bold(),
        "cards".yellow(),
        "quiz".yellow(),
        "latest".yellow(),
        "│".cyan()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".cyan()
    );
    println!();

    let Some(chat) = pick_or_create_chat(&client, profile.user_id).await? else {
        return Ok(());
    };
    let chat_id = chat.id;
    let mut needs_title = chat.title.as_deref().is_none_or(|t| t == "New Chat");

    let mut latest_cards = load_transcript(&client, &profile, chat_id).await?;

    loop {
        let input = Text::new("You:")
            .with_help_message("Ask anything - 'cards', 'quiz', 'latest', or 'quit'")
            .prompt()?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("{}", "Goodbye!".dimmed());
            break;
        }

        if input.eq_ignore_ascii_case("cards") || input.eq_ignore_ascii_case("quiz") {
            let auto_quiz = input.eq_ignore_ascii_case("quiz");
            let spinner = ui::spinner("Loading flashcards...");
            let cards = client.chat_flashcards(profile.user_id, chat_id, true).await;
            spinner.finish_and_clear();

            match cards {
                Ok(cards) if cards.is_empty() => {
                    println!(
                        "{}",
                        "No flashcards available for this chat session.".dimmed()
                    );
                }
                Ok(cards) => {
                    study::run_panel(&client, &profile, cards, PanelSource::ViewAll, auto_quiz)
                        .await?;
                    println!("{}", "Back to chat.".dimmed());
                }
                Err(e) => println!("{} {}", "Flashcards unavailable:".red(), e),
            }
            continue;
        }

        if input.eq_ignore_ascii_case("latest") {
            if latest_cards.is_empty() {
                println!(
                    "{}",
                    "No flashcards for the latest assistant reply.".dimmed()
                );
            } else {
                study::run_panel(
                    &client,
                    &profile,
                    latest_cards.clone(),
                    PanelSource::Message,
                    false,
                )
                .await?;
                println!("{}", "Back to chat.".dimmed());
            }
            continue;
        }

        // A real message. The backend answers and generates flashcards for
        // the assistant reply in the same round trip.
        let spinner = ui::spinner("Waiting for the tutor...");
        let sent = client.send_message(profile.user_id, chat_id, input).await;
        spinner.finish_and_clear();

        let sent = match sent {
            Ok(sent) => sent,
            Err(e) => {
                println!("{} {}", "Send failed:".red().bold(), e);
                continue;
            }
        };

        if needs_title {
            let title: String = input.chars().take(60).collect();
            let title = match title.rfind(' ') {
                Some(pos) if input.len() > 60 => title[..pos].to_string(),
                _ => title,
            };
            if client
                .rename_chat_session(profile.user_id, chat_id, &title)
                .await
                .is_ok()
            {
                needs_title = false;
            }
        }

        println!("\n{}", "Tutor:".green().bold());
        ui::render_markdown(&sent.assistant_message.content);

        latest_cards = client
            .message_flashcards(profile.user_id, sent.assistant_message.id)
            .await
            .unwrap_or_default();

        if latest_cards.is_empty() {
            println!("{}", "No flashcards for this reply.".dimmed());
        } else {
            print_card_previews(&latest_cards);
            println!(
                "{} Ready: {} flashcards for latest reply. Type {} to study them.",
                "✦".cyan(),
                latest_cards.len(),
                "latest".yellow()
            );
        }
        println!();
    }

    Ok(())
}

/// Let the user resume a recent chat session, start a new one, or manage
/// (rename/delete) the existing ones.
pub(crate) async fn pick_or_create_chat(
    client: &ApiClient,
    user_id: i64,
) -> Result<Option<ChatSession>> {
    loop {
        let chats = match client.list_chat_sessions(user_id).await {
            Ok(chats) => chats,
            Err(e) => {
                println!("{} {}", "Error:".red().bold(), e);
                return Ok(None);
            }
        };

        if chats.is_empty() {
            let chat = client.create_chat_session(user_id, Some("New Chat")).await?;
            println!("{} Started new chat.\n", "✦".cyan());
            return Ok(Some(chat));
        }

        let mut options: Vec<String> = chats
            .iter()
            .map(|c| {
                let date = c.created_at.format("%m/%d %H:%M");
                format!("💬  {} │ {}", c.display_title(), date)
            })
            .collect();
        options.push("🆕  New chat".to_string());
        options.push("🛠   Manage chats".to_string());
        options.push("←   Back".to_string());

        let selection = Select::new("Resume or start new?", options).prompt();
        let selection = match selection {
            Ok(s) => s,
            Err(inquire::InquireError::OperationCanceled)
            | Err(inquire::InquireError::OperationInterrupted) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if selection.contains("Back") {
            return Ok(None);
        }

        if selection.contains("New chat") {
            let chat = client.create_chat_session(user_id, Some("New Chat")).await?;
            println!("{} Started new chat.\n", "✦".cyan());
            return Ok(Some(chat));
        }

        if selection.contains("Manage chats") {
            manage_chats(client, user_id, &chats).await?;
            continue;
        }

        let idx = chats
            .iter()
            .position(|c| selection.contains(&c.display_title()))
            .unwrap_or(0);
        let chat = chats[idx].clone();
        println!("{} Resuming: {}\n", "↻".cyan(), chat.display_title().bold());
        return Ok(Some(chat));
    }
}

async fn manage_chats(client: &ApiClient, user_id: i64, chats: &[ChatSession]) -> Result<()> {
    let options: Vec<String> = chats.iter().map(|c| c.display_title()).collect();
    let picked = match Select::new("Which chat?", options).prompt() {
        Ok(p) => p,
        Err(_) => return Ok(()),
    };
    let Some(chat) = chats.iter().find(|c| c.display_title() == picked) else {
        return Ok(());
    };

    let action = Select::new("Action:", vec!["Rename", "Delete", "Back"]).prompt();
    match action.as_deref() {
        Ok("Rename") => {
            let title = Text::new("New title:")
                .with_initial_value(&chat.display_title())
                .prompt()?;
            let title = title.trim();
            if title.is_empty() {
                println!("{}", "Chat title cannot be empty.".yellow());
                return Ok(());
            }
            match client.rename_chat_session(user_id, chat.id, title).await {
                Ok(()) => println!("{} Renamed.", "✓".green()),
                Err(e) => println!("{} {}", "Rename failed:".red(), e),
            }
        }
        Ok("Delete") => {
            let confirmed = Confirm::new(&format!(
                "Delete \"{}\" and its messages?",
                chat.display_title()
            ))
            .with_default(false)
            .prompt()
            .unwrap_or(false);
            if !confirmed {
                return Ok(());
            }
            match client.delete_chat_session(user_id, chat.id).await {
                Ok(()) => println!("{} Chat deleted.", "✓".green()),
                Err(e) => println!("{} {}", "Delete failed:".red(), e),
            }
        }
        _ => {}
    }

    Ok(())
}

/// Print the stored transcript with per-message flashcard previews and
/// return the latest assistant reply's cards.
async fn load_transcript(
    client: &ApiClient,
    profile: &Profile,
    chat_id: i64,
) -> Result<Vec<Flashcard>> {
    let spinner = ui::spinner("Loading chat...");
    let messages = client.list_messages(profile.user_id, chat_id).await;
    let cards = client.chat_flashcards(profile.user_id, chat_id, true).await;
    spinner.finish_and_clear();

    let messages = match messages {
        Ok(messages) => messages,
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            return Ok(Vec::new());
        }
    };

    let cards = cards.unwrap_or_default();
    let grouped = group_by_message(&cards);

    if messages.is_empty() {
        println!("{}", "Empty chat. Ask your first question!".dimmed());
        return Ok(Vec::new());
    }

    println!(
        "{} Loaded {} previous messages.\n",
        "↻".cyan(),
        messages.len()
    );

    for message in &messages {
        print_message(message, grouped.get(&message.id).map(Vec::as_slice));
    }

    // Cards tied to the newest assistant reply drive the `latest` shortcut.
    let latest = messages
        .iter()
        .rev()
        .find(|m| m.is_assistant())
        .and_then(|m| grouped.get(&m.id).cloned())
        .unwrap_or_default();

    if latest.is_empty() {
        println!(
            "{}",
            "No flashcards for the latest assistant reply.".dimmed()
        );
    } else {
        println!(
            "{} Ready: {} flashcards for latest reply.",
            "✦".cyan(),
            latest.len()
        );
    }
    println!();

    Ok(latest)
}

fn print_message(message: &ChatMessage, cards: Option<&[Flashcard]>) {
    if message.is_assistant() {
        println!("{}", "Tutor:".green().bold());
        ui::render_markdown(&message.content);
        if let Some(cards) = cards
            && !cards.is_empty()
        {
            print_card_previews(cards);
        }
    } else {
        println!("{} {}", "You:".bold(), message.content);
    }
    println!();
}

fn print_card_previews(cards: &[Flashcard]) {
    println!("  {} Flashcards ({})", "🃏".cyan(), cards.len());
    for (i, card) in cards.iter().take(3).enumerate() {
        println!("    {} {}", format!("Q{}:", i + 1).bold(), card.question);
        println!("    {} {}", "A:".dimmed(), card.answer.dimmed());
    }
    if cards.len() > 3 {
        println!("    {}", format!("+ {} more", cards.len() - 3).dimmed());
    }
}

fn group_by_message(cards: &[Flashcard]) -> HashMap<i64, Vec<Flashcard>> {
    let mut grouped: HashMap<i64, Vec<Flashcard>> = HashMap::new();
    for card in cards {
        let Some(message_id) = card.source_message_id else {
            continue;
        };
        grouped.entry(message_id).or_default().push(card.clone());
    }
    grouped
}
