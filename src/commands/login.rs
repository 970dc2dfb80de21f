use anyhow::Result;
use colored::Colorize;
use inquire::{Password, PasswordDisplayMode, Text};

use crate::api::ApiClient;
use crate::api::types::RegisterRequest;
use crate::config::Config;
use crate::ui;

pub async fn login() -> Result<()> {
    let mut config = Config::load()?;
    let base = config.backend_url();

    println!("{}", "Sign in".bold().cyan());
    println!("{}", "─".repeat(40).dimmed());
    println!("  {} {}\n", "Backend:".dimmed(), base.cyan());

    let email = Text::new("Email:").prompt()?;
    let email = email.trim().to_string();
    if email.is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let client = ApiClient::new(&base, None);

    let spinner = ui::spinner("Signing in...");
    let result = client.login(&email, &password).await;
    spinner.finish_and_clear();

    let account = match result {
        Ok(account) => account,
        Err(e) => {
            println!("{} {}", "Login failed:".red().bold(), e);
            return Ok(());
        }
    };

    config.sign_in(&account);

    // The login payload doesn't carry the role; /users/me does.
    let authed = ApiClient::new(&base, Some(account.id));
    if let Ok(me) = authed.current_user().await {
        config.set_role(me.user_role);
    }

    config.save()?;

    println!(
        "{} Signed in as {}.",
        "✓".green(),
        config
            .profile()
            .map(|p| p.display_name().to_string())
            .unwrap_or(email)
            .bold()
    );

    Ok(())
}

pub async fn register() -> Result<()> {
    let mut config = Config::load()?;
    let base = config.backend_url();

    println!("{}", "Create account".bold().cyan());
    println!("{}", "─".repeat(40).dimmed());
    println!("  {} {}\n", "Backend:".dimmed(), base.cyan());

    let email = Text::new("Email:").prompt()?;
    let email = email.trim().to_string();
    if email.is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let name = Text::new("Name:")
        .with_help_message("Optional, shown in greetings")
        .prompt()
        .unwrap_or_default();
    let name = name.trim().to_string();

    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_custom_confirmation_message("Confirm password:")
        .prompt()?;

    let payload = RegisterRequest {
        email,
        name: if name.is_empty() { None } else { Some(name) },
        password: password.clone(),
        confirm_password: password,
    };

    let client = ApiClient::new(&base, None);

    let spinner = ui::spinner("Creating account...");
    let result = client.register(&payload).await;
    spinner.finish_and_clear();

    match result {
        Ok(account) => {
            config.sign_in(&account);
            config.save()?;
            println!(
                "{} Account created. You are signed in as {}.",
                "✓".green(),
                account.email.bold()
            );
        }
        Err(e) => {
            println!("{} {}", "Registration failed:".red().bold(), e);
        }
    }

    Ok(())
}

pub fn logout() -> Result<()> {
    let mut config = Config::load()?;

    if !config.is_signed_in() {
        println!("{}", "Not signed in.".dimmed());
        return Ok(());
    }

    config.sign_out();
    config.save()?;
    println!("{} Signed out.", "✓".green());

    Ok(())
}
