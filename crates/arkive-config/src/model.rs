// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Arkive archive bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Arkive configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArkiveConfig {
    /// Bot identity and archive policy.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram Bot API settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Remote content store (GitHub repository) settings.
    #[serde(default)]
    pub github: GithubConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Deferred-deletion sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Placeholder printed instead of secret values.
pub const REDACTED: &str = "[redacted]";

impl ArkiveConfig {
    /// A copy with every credential replaced by [`REDACTED`].
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| REDACTED.to_string());
        let mut config = self.clone();
        config.telegram.bot_token = mask(&self.telegram.bot_token);
        config.telegram.webhook_secret = mask(&self.telegram.webhook_secret);
        config.github.token = mask(&self.github.token);
        config.gateway.sweep_token = mask(&self.gateway.sweep_token);
        config
    }

    /// The effective configuration as TOML, with credentials redacted.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.redacted())
    }
}

/// Bot identity and archive policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs and the status report.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Telegram username of the bot, used to build `?start=<id>` share links.
    #[serde(default)]
    pub username: Option<String>,

    /// Seconds between re-sending an archived file and deleting that message.
    #[serde(default = "default_deletion_delay_secs")]
    pub deletion_delay_secs: u64,

    /// Number of decimal digits in generated logical ids.
    #[serde(default = "default_id_length")]
    pub id_length: usize,
}

impl BotConfig {
    /// The deletion delay as a [`Duration`].
    pub fn deletion_delay(&self) -> Duration {
        Duration::from_secs(self.deletion_delay_secs)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            username: None,
            deletion_delay_secs: default_deletion_delay_secs(),
            id_length: default_id_length(),
        }
    }
}

fn default_bot_name() -> String {
    "arkive".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Longest accepted deletion delay. Telegram refuses to delete messages older
/// than 48 hours, so a later sweep could no longer remove the file.
pub const MAX_DELETION_DELAY_SECS: u64 = 48 * 60 * 60;

fn default_deletion_delay_secs() -> u64 {
    600
}

fn default_id_length() -> usize {
    16
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `arkive serve` and `arkive sweep`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` webhook header.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Telegram user IDs or usernames allowed to upload. Empty allows everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// GitHub repository holding the archive index and the deletion queue.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    /// Personal access token with contents read/write permission.
    #[serde(default)]
    pub token: Option<String>,

    /// Repository owner (user or organisation).
    #[serde(default)]
    pub owner: String,

    /// Repository name.
    #[serde(default)]
    pub repo: String,

    /// Branch that receives the commits.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Path of the delimited-text archive index.
    #[serde(default = "default_records_path")]
    pub records_path: String,

    /// Path of the JSON deletion queue.
    #[serde(default = "default_queue_path")]
    pub queue_path: String,

    /// REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Commit author name. Defaults to the token owner when unset.
    #[serde(default)]
    pub committer_name: Option<String>,

    /// Commit author email.
    #[serde(default)]
    pub committer_email: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            records_path: default_records_path(),
            queue_path: default_queue_path(),
            api_base: default_api_base(),
            committer_name: None,
            committer_email: None,
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_records_path() -> String {
    "archive.csv".to_string()
}

fn default_queue_path() -> String {
    "deletions.json".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required by `POST /sweep`. `None` leaves it open.
    #[serde(default)]
    pub sweep_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sweep_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Deferred-deletion sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Run the in-process scheduler under `arkive serve`.
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,

    /// Cron expression for the in-process scheduler.
    #[serde(default = "default_schedule")]
    pub schedule: String,

    /// Deletion attempts per job before it is dropped from the queue.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: default_sweep_enabled(),
            schedule: default_schedule(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_schedule() -> String {
    "* * * * *".to_string()
}

fn default_max_attempts() -> u32 {
    3
}
