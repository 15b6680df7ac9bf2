// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.
//! Credentials are not checked here: `arkive config` must work without them,
//! so the commands that need a token verify it when they build their clients.

use crate::diagnostic::ConfigError;
use crate::model::{ArkiveConfig, MAX_DELETION_DELAY_SECS};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ArkiveConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.bot.deletion_delay_secs == 0 {
        fail("bot.deletion_delay_secs must be greater than 0".to_string());
    } else if config.bot.deletion_delay_secs > MAX_DELETION_DELAY_SECS {
        fail(format!(
            "bot.deletion_delay_secs must be at most {MAX_DELETION_DELAY_SECS} (48 hours), got {}",
            config.bot.deletion_delay_secs
        ));
    }

    if !(6..=32).contains(&config.bot.id_length) {
        fail(format!(
            "bot.id_length must be between 6 and 32, got {}",
            config.bot.id_length
        ));
    }

    if let Some(username) = &config.bot.username {
        if username.is_empty() || username.starts_with('@') {
            fail(format!(
                "bot.username `{username}` must be the bare username without `@`"
            ));
        }
    }

    for (key, value) in [
        ("github.branch", &config.github.branch),
        ("github.records_path", &config.github.records_path),
        ("github.queue_path", &config.github.queue_path),
        ("github.api_base", &config.github.api_base),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if config.github.records_path == config.github.queue_path {
        fail("github.records_path and github.queue_path must be different files".to_string());
    }

    if !config.github.api_base.starts_with("http://")
        && !config.github.api_base.starts_with("https://")
    {
        fail(format!(
            "github.api_base `{}` must be an http(s) URL",
            config.github.api_base
        ));
    }

    if config.gateway.host.trim().is_empty() {
        fail("gateway.host must not be empty".to_string());
    }

    if config.sweep.max_attempts == 0 {
        fail("sweep.max_attempts must be at least 1".to_string());
    }

    if let Err(e) = croner::Cron::new(&config.sweep.schedule).parse() {
        fail(format!(
            "sweep.schedule `{}` is not a valid cron expression: {e}",
            config.sweep.schedule
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
