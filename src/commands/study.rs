use anyhow::Result;
use colored::Colorize;
use inquire::Select;

use crate::api::ApiClient;
use crate::api::types::Flashcard;
use crate::config::{Config, Profile};
use crate::session::{PanelSource, StudyPanel};
use crate::ui;

use super::{chat, quiz, require_profile};

/// CLI entry: pick a chat session and browse its flashcards.
pub async fn run(chat_id: Option<i64>) -> Result<()> {
    let config = Config::load()?;
    let Some(profile) = require_profile(&config) else {
        return Ok(());
    };
    let client = ApiClient::new(&config.backend_url(), Some(profile.user_id));

    let chat_id = match chat_id {
        Some(id) => id,
        None => match chat::pick_or_create_chat(&client, profile.user_id).await? {
            Some(chat) => chat.id,
            None => return Ok(()),
        },
    };

    let spinner = ui::spinner("Loading flashcards...");
    let cards = client.chat_flashcards(profile.user_id, chat_id, true).await;
    spinner.finish_and_clear();

    match cards {
        Ok(cards) => run_panel(&client, &profile, cards, PanelSource::ViewAll, false).await,
        Err(e) => {
            println!("{} {}", "Flashcards unavailable:".red(), e);
            Ok(())
        }
    }
}

/// Study-mode loop over an open panel. Returns when the user closes it.
pub(crate) async fn run_panel(
    client: &ApiClient,
    profile: &Profile,
    cards: Vec<Flashcard>,
    source: PanelSource,
    auto_start_quiz: bool,
) -> Result<()> {
    let mut panel = StudyPanel::open(cards, source);

    if panel.is_empty() {
        render(&panel);
        return Ok(());
    }

    if auto_start_quiz {
        quiz::run_round(client, profile, &panel).await?;
        println!("{}", "Back to flashcards.".dimmed());
    }

    loop {
        render(&panel);

        let (can_prev, can_next) = {
            let view = panel.view();
            (view.can_prev, view.can_next)
        };

        let mut options: Vec<&str> = Vec::new();
        options.push(if panel.revealed() {
            "🔄  Show question"
        } else {
            "🔄  Flip"
        });
        if can_next {
            options.push("→   Next card");
        }
        if can_prev {
            options.push("←   Previous card");
        }
        options.push("🎯  Start MCQ quiz");
        options.push("🚪  Close");

        let selection = Select::new("Study:", options).prompt();
        let selection = match selection {
            Ok(s) => s,
            Err(inquire::InquireError::OperationCanceled)
            | Err(inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match selection {
            s if s.contains("Flip") || s.contains("Show question") => panel.flip(),
            s if s.contains("Next card") => panel.next(),
            s if s.contains("Previous card") => panel.prev(),
            s if s.contains("Start MCQ quiz") => {
                quiz::run_round(client, profile, &panel).await?;
                println!("{}", "Back to flashcards.".dimmed());
            }
            s if s.contains("Close") => break,
            _ => {}
        }
    }

    Ok(())
}

fn render(panel: &StudyPanel) {
    let view = panel.view();
    println!();

    if view.total == 0 {
        println!("  {}", view.text.dimmed());
        return;
    }

    println!(
        "  {} {}",
        format!("[{} / {}]", view.position, view.total).cyan(),
        view.side_label.bold()
    );
    println!("  {}", "─".repeat(50).dimmed());
    println!("  {}", view.text);
    println!("  {}", "─".repeat(50).dimmed());
}
