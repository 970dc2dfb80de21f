use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::api::types::UserAccount;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Client-side preferences and the signed-in identity. This is the CLI's
/// stand-in for the browser's local storage: backend address, who is signed
/// in, and the theme preference.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub theme: Option<String>,
}

/// The signed-in user, passed explicitly into every flow that needs identity
/// instead of being read from globals.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("admin"))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("study-tutor"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file with restrictive permissions (600)
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Config path has no parent directory"))?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        // Owner read/write only; the file carries the session identity
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)
                .with_context(|| "Failed to set config file permissions")?;
        }

        Ok(())
    }

    /// Backend base URL: environment override first, then the config file,
    /// then the development default.
    pub fn backend_url(&self) -> String {
        std::env::var("TUTOR_BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or("light")
    }

    /// The signed-in profile, if any.
    pub fn profile(&self) -> Option<Profile> {
        let user_id = self.user_id?;
        Some(Profile {
            user_id,
            email: self.user_email.clone().unwrap_or_default(),
            name: self.user_name.clone(),
            role: self.user_role.clone(),
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn sign_in(&mut self, account: &UserAccount) {
        self.user_id = Some(account.id);
        self.user_email = Some(account.email.clone());
        self.user_name = account.name.clone();
        self.user_role = account.user_role.clone();
    }

    pub fn set_role(&mut self, role: Option<String>) {
        self.user_role = role;
    }

    pub fn sign_out(&mut self) {
        self.user_id = None;
        self.user_email = None;
        self.user_name = None;
        self.user_role = None;
    }
}

/// Parse and normalize a backend base URL: http(s) only, no trailing slash.
pub fn normalize_backend_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim()).context("Invalid URL")?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Backend URL must use http or https");
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        let url = normalize_backend_url("http://127.0.0.1:8000/").unwrap();
        assert_eq!(url, "http://127.0.0.1:8000");
    }

    #[test]
    fn normalize_rejects_non_http_schemes() {
        assert!(normalize_backend_url("ftp://example.com").is_err());
        assert!(normalize_backend_url("not a url").is_err());
    }

    #[test]
    fn profile_display_name_falls_back_to_email() {
        let profile = Profile {
            user_id: 1,
            email: "kim@example.com".to_string(),
            name: Some("  ".to_string()),
            role: None,
        };
        assert_eq!(profile.display_name(), "kim@example.com");

        let profile = Profile {
            name: Some("Kim".to_string()),
            ..profile
        };
        assert_eq!(profile.display_name(), "Kim");
    }

    #[test]
    fn admin_role_check_is_case_insensitive() {
        let profile = Profile {
            user_id: 1,
            email: "a@b.c".to_string(),
            name: None,
            role: Some(" Admin ".to_string()),
        };
        assert!(profile.is_admin());
    }
}
