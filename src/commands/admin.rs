use anyhow::Result;
use colored::Colorize;
use inquire::Select;

use crate::api::types::{KnowledgeSource, KnowledgeSourcePatch};
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::ui;

use super::require_profile;

/// Admin panel: the knowledge-source table behind the tutor's retrieval,
/// with enable/verify toggles and a vector-store re-sync.
pub async fn run() -> Result<()> {
    let mut config = Config::load()?;
    let Some(profile) = require_profile(&config) else {
        return Ok(());
    };
    let client = ApiClient::new(&config.backend_url(), Some(profile.user_id));

    let spinner = ui::spinner("Verifying access...");
    let me = client.current_user().await;
    spinner.finish_and_clear();

    match me {
        Ok(me) => {
            config.set_role(me.user_role.clone());
            let _ = config.save();
            if !me.is_admin() {
                print_not_authorized("Admin access required");
                return Ok(());
            }
        }
        Err(e) if e.is_unauthorized() => {
            // Stored identity is stale; drop it like the web app does.
            config.sign_out();
            config.save()?;
            println!(
                "{} Session expired. Run {} again.",
                "Error:".red().bold(),
                "tutor login".cyan()
            );
            return Ok(());
        }
        Err(e) if e.is_forbidden() => {
            print_not_authorized(&e.to_string());
            return Ok(());
        }
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            return Ok(());
        }
    }

    println!("{}", "Knowledge Sources".bold().cyan());
    println!("{}", "─".repeat(40).dimmed());

    let mut sources = match load_sources(&client, true).await {
        Ok(sources) => sources,
        Err(e) => {
            handle_admin_error(&e, "Failed to load knowledge sources.");
            return Ok(());
        }
    };

    loop {
        print_sources(&sources);

        let options = vec![
            "🔌  Toggle enabled",
            "🛡   Toggle verified",
            "🔁  Sync vector store files",
            "📋  Reload",
            "←   Back",
        ];

        let selection = Select::new("What would you like to do?", options).prompt();
        let selection = match selection {
            Ok(s) => s,
            Err(inquire::InquireError::OperationCanceled)
            | Err(inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match selection {
            s if s.contains("Toggle enabled") => {
                if let Some(source) = pick_source(&sources) {
                    let patch = KnowledgeSourcePatch {
                        enabled: Some(!source.enabled),
                        ..Default::default()
                    };
                    apply_patch(&client, source.id, &patch).await;
                }
            }
            s if s.contains("Toggle verified") => {
                if let Some(source) = pick_source(&sources) {
                    let patch = KnowledgeSourcePatch {
                        verified: Some(!source.verified),
                        ..Default::default()
                    };
                    apply_patch(&client, source.id, &patch).await;
                }
            }
            s if s.contains("Sync vector store") => {
                let spinner = ui::spinner("Syncing...");
                let outcome = client.reindex_knowledge_sources().await;
                spinner.finish_and_clear();
                match outcome {
                    Ok(outcome) => {
                        println!("{} {}", "✓".green(), outcome.message);
                        println!(
                            "  {}",
                            format!(
                                "{} sources | {} enabled | {} verified",
                                outcome.total_sources,
                                outcome.enabled_sources,
                                outcome.verified_sources
                            )
                            .dimmed()
                        );
                    }
                    Err(e) => handle_admin_error(&e, "Failed to sync vector store files."),
                }
            }
            s if s.contains("Back") => break,
            _ => {}
        }

        // The table reflects server state, so refresh after every action.
        match load_sources(&client, false).await {
            Ok(reloaded) => sources = reloaded,
            Err(e) => handle_admin_error(&e, "Failed to reload knowledge sources."),
        }
        println!();
    }

    Ok(())
}

async fn load_sources(client: &ApiClient, sync: bool) -> Result<Vec<KnowledgeSource>, ApiError> {
    let spinner = ui::spinner("Loading knowledge sources...");
    let sources = client.list_knowledge_sources(sync).await;
    spinner.finish_and_clear();
    sources
}

async fn apply_patch(client: &ApiClient, source_id: i64, patch: &KnowledgeSourcePatch) {
    let spinner = ui::spinner("Updating...");
    let result = client.update_knowledge_source(source_id, patch).await;
    spinner.finish_and_clear();

    match result {
        Ok(_) => println!("{} Knowledge source updated.", "✓".green()),
        Err(e) => handle_admin_error(&e, "Failed to update knowledge source."),
    }
}

fn pick_source<'a>(sources: &'a [KnowledgeSource]) -> Option<&'a KnowledgeSource> {
    if sources.is_empty() {
        println!("{}", "No knowledge sources registered yet.".dimmed());
        return None;
    }

    let options: Vec<String> = sources
        .iter()
        .map(|s| format!("#{} {}", s.id, truncate(&s.title, 48)))
        .collect();

    let picked = Select::new("Which source?", options).prompt().ok()?;
    sources
        .iter()
        .find(|s| picked.starts_with(&format!("#{} ", s.id)))
}

fn print_sources(sources: &[KnowledgeSource]) {
    if sources.is_empty() {
        println!("{}", "No knowledge sources registered yet.".dimmed());
        return;
    }

    println!();
    for source in sources {
        let enabled = if source.enabled {
            "Enabled".green().to_string()
        } else {
            "Disabled".dimmed().to_string()
        };
        let verified = if source.verified {
            "Verified".cyan().to_string()
        } else {
            "Unverified".yellow().to_string()
        };

        println!(
            "  {:>4} {:<40} {} {}",
            format!("#{}", source.id).dimmed(),
            truncate(&source.title, 38).bold(),
            enabled,
            verified
        );
        println!(
            "       {}",
            format!("{} | {}", source.source_type, truncate(&source.source_ref, 60)).dimmed()
        );
    }
    println!();
}

fn handle_admin_error(error: &ApiError, fallback: &str) {
    if error.is_forbidden() {
        print_not_authorized(&error.to_string());
    } else {
        println!("{} {} ({})", "Error:".red().bold(), fallback, error);
    }
}

fn print_not_authorized(message: &str) {
    println!("{}", "Not authorized".red().bold());
    println!("  {}", message.dimmed());
}

fn truncate(value: &str, max_len: usize) -> String {
    let text = value.trim();
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}
