use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;

mod analytics;
mod api;
mod commands;
mod config;
mod session;
mod ui;

/// ASCII art banner for the application
const BANNER: &str = r#"
  ____  _             _         _____      _
 / ___|| |_ _   _  __| |_   _  |_   _|   _| |_ ___  _ __
 \___ \| __| | | |/ _` | | | |   | || | | | __/ _ \| '__|
  ___) | |_| |_| | (_| | |_| |   | || |_| | || (_) | |
 |____/ \__|\__,_|\__,_|\__, |   |_| \__,_|\__\___/|_|
                        |___/
"#;

/// Print the application banner
fn print_banner() {
    println!("{}", BANNER.cyan().bold());
}

/// Print a styled status line
fn print_status(label: &str, value: &str, icon: &str) {
    println!(
        "  {} {} {}",
        icon,
        format!("{}:", label).dimmed(),
        value.cyan()
    );
}

#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "CLI front end for a tutoring chat backend: chat, flashcards, quizzes, analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the tutoring backend
    Login,
    /// Create an account
    Register,
    /// Sign out and forget the stored session
    Logout,
    /// Start an interactive tutoring chat
    Chat,
    /// Browse flashcards for a chat session
    Flashcards {
        /// Chat session id (skips the picker if provided)
        #[arg(long)]
        chat: Option<i64>,
    },
    /// Take an MCQ quiz over a chat session's flashcards
    Quiz {
        /// Chat session id (skips the picker if provided)
        #[arg(long)]
        chat: Option<i64>,
    },
    /// Show learning analytics
    Stats,
    /// Manage knowledge sources (admin only)
    Admin,
    /// Configure settings (backend URL, theme)
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Login) => {
            commands::login::login().await?;
        }
        Some(Commands::Register) => {
            commands::login::register().await?;
        }
        Some(Commands::Logout) => {
            commands::login::logout()?;
        }
        Some(Commands::Chat) => {
            commands::chat::run().await?;
        }
        Some(Commands::Flashcards { chat }) => {
            commands::study::run(chat).await?;
        }
        Some(Commands::Quiz { chat }) => {
            commands::quiz::run(chat).await?;
        }
        Some(Commands::Stats) => {
            commands::stats::run().await?;
        }
        Some(Commands::Admin) => {
            commands::admin::run().await?;
        }
        Some(Commands::Config) => {
            commands::config::run().await?;
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
        None => {
            // No subcommand - show interactive menu
            run_interactive().await?;
        }
    }

    Ok(())
}

async fn run_interactive() -> Result<()> {
    use inquire::Select;

    // Print the cool banner
    print_banner();

    // Show version and description
    println!(
        "  {} {}",
        "Version:".dimmed(),
        env!("CARGO_PKG_VERSION").cyan()
    );
    println!(
        "  {} {}\n",
        "Powered by:".dimmed(),
        "Your tutoring backend + AI flashcards".green()
    );

    // Show current status
    println!("{}", "─".repeat(50).dimmed());

    let config = config::Config::load()?;
    let profile = config.profile();

    let signed_in = match &profile {
        Some(profile) => profile.display_name().green().to_string(),
        None => "Not signed in (run 'login')".red().to_string(),
    };

    print_status("Backend", &config.backend_url(), "🌐");
    print_status("Account", &signed_in, "👤");
    print_status("Theme", config.theme(), "🎨");

    println!("{}\n", "─".repeat(50).dimmed());

    let is_admin = profile.as_ref().is_some_and(|p| p.is_admin());

    let mut options = vec![
        "💬  Chat with your tutor",
        "🃏  Study flashcards",
        "🎯  Take an MCQ quiz",
        "📈  View learning analytics",
    ];
    if is_admin {
        options.push("🗂   Manage knowledge sources");
    }
    if profile.is_none() {
        options.push("🔑  Sign in");
        options.push("🆕  Create account");
    }
    options.push("⚙️   Configure settings");
    options.push("🚪  Exit");

    let selection = Select::new("What would you like to do?", options)
        .with_help_message("Use arrow keys to navigate, Enter to select")
        .prompt()?;

    println!(); // Add spacing

    match selection {
        s if s.contains("Chat with") => commands::chat::run().await?,
        s if s.contains("Study flashcards") => commands::study::run(None).await?,
        s if s.contains("Take an MCQ quiz") => commands::quiz::run(None).await?,
        s if s.contains("learning analytics") => commands::stats::run().await?,
        s if s.contains("knowledge sources") => commands::admin::run().await?,
        s if s.contains("Sign in") => commands::login::login().await?,
        s if s.contains("Create account") => commands::login::register().await?,
        s if s.contains("Configure") => commands::config::run().await?,
        s if s.contains("Exit") => {
            println!("{}", "👋 Thanks for studying with Study Tutor!".cyan());
        }
        _ => unreachable!(),
    }

    Ok(())
}
