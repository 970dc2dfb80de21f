use anyhow::Result;
use colored::Colorize;
use inquire::{Confirm, Select, Text};

use crate::config::{self, Config};

pub async fn run() -> Result<()> {
    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".bright_black()
    );
    println!(
        "    {}            {}            {}",
        "│".bright_black(),
        "⚙️  SETTINGS ⚙️".bold().white(),
        "│".bright_black()
    );
    println!(
        "    {}        {}        {}",
        "│".bright_black(),
        "Configure Study Tutor to your liking".dimmed(),
        "│".bright_black()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".bright_black()
    );
    println!();

    let mut config = Config::load()?;

    let options = vec![
        "🌐  Set backend URL    │ Where the tutoring API lives",
        "🎨  Switch theme       │ Light or dark preference",
        "📋  View settings      │ See current configuration",
        "🚪  Sign out           │ Forget the stored session",
        "←   Back",
    ];

    loop {
        let selection =
            Select::new("What would you like to configure?", options.clone()).prompt();

        let selection = match selection {
            Ok(s) => s,
            Err(inquire::InquireError::OperationCanceled)
            | Err(inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match selection {
            s if s.contains("Set backend URL") => {
                if let Err(e) = set_backend_url(&mut config) {
                    println!("{} {}", "Error:".red(), e);
                }
            }
            s if s.contains("Switch theme") => {
                if let Err(e) = switch_theme(&mut config) {
                    println!("{} {}", "Error:".red(), e);
                }
            }
            s if s.contains("View settings") => {
                view_config(&config);
            }
            s if s.contains("Sign out") => {
                if let Err(e) = sign_out(&mut config) {
                    println!("{} {}", "Error:".red(), e);
                }
            }
            s if s.contains("Back") => break,
            _ => {}
        }

        println!();
    }

    Ok(())
}

fn set_backend_url(config: &mut Config) -> Result<()> {
    let current = config.backend_url();
    let raw = Text::new("Backend URL:")
        .with_initial_value(&current)
        .with_help_message("http(s) address of the tutoring backend")
        .prompt()?;

    if raw.trim().is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let normalized = match config::normalize_backend_url(&raw) {
        Ok(url) => url,
        Err(e) => {
            println!("{} {}", "Invalid URL:".red(), e);
            return Ok(());
        }
    };

    config.backend_url = Some(normalized.clone());
    config.save()?;

    println!("{} Backend URL set to {}", "✓".green(), normalized.yellow());
    Ok(())
}

fn switch_theme(config: &mut Config) -> Result<()> {
    let selection = Select::new("Theme:", vec!["light", "dark"]).prompt()?;

    config.theme = Some(selection.to_string());
    config.save()?;

    println!("{} Theme set to {}", "✓".green(), selection.yellow());
    Ok(())
}

fn sign_out(config: &mut Config) -> Result<()> {
    if !config.is_signed_in() {
        println!("{}", "Not signed in.".dimmed());
        return Ok(());
    }

    let confirmed = Confirm::new("Forget the stored session?")
        .with_default(false)
        .prompt()
        .unwrap_or(false);
    if !confirmed {
        return Ok(());
    }

    config.sign_out();
    config.save()?;
    println!("{} Signed out.", "✓".green());
    Ok(())
}

fn view_config(config: &Config) {
    println!("\n{}", "Current Configuration:".bold());
    println!("{}", "─".repeat(30).dimmed());

    let env_override = std::env::var("TUTOR_BACKEND_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let backend = match env_override {
        Some(url) => format!("{} {}", url, "(via TUTOR_BACKEND_URL)".yellow()),
        None => config.backend_url(),
    };
    println!("  Backend: {}", backend);

    match config.profile() {
        Some(profile) => println!(
            "  Signed in: {} (user #{})",
            profile.display_name().green(),
            profile.user_id
        ),
        None => println!("  Signed in: {}", "no".red()),
    }

    println!("  Theme: {}", config.theme());

    if let Ok(path) = Config::config_path() {
        println!("  Config file: {}", path.display().to_string().dimmed());
    }
}
