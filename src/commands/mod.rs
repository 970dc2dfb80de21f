use colored::Colorize;

use crate::config::{Config, Profile};

pub mod admin;
pub mod chat;
pub mod config;
pub mod login;
pub mod quiz;
pub mod stats;
pub mod study;

/// Signed-in profile, or a hint on how to get one.
pub(crate) fn require_profile(config: &Config) -> Option<Profile> {
    match config.profile() {
        Some(profile) => Some(profile),
        None => {
            println!(
                "{} Not signed in. Run {} first.",
                "Error:".red().bold(),
                "tutor login".cyan()
            );
            None
        }
    }
}
