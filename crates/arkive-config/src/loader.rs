// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./arkive.toml` > `~/.config/arkive/arkive.toml`
//! > `/etc/arkive/arkive.toml`
//! with environment variable overrides via `ARKIVE_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ArkiveConfig;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "ARKIVE_";

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &["bot", "telegram", "github", "gateway", "sweep"];

/// Config file locations, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/arkive/arkive.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("arkive/arkive.toml"));
    }
    paths.push(PathBuf::from("arkive.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/arkive/arkive.toml` (system-wide)
/// 3. `~/.config/arkive/arkive.toml` (user XDG config)
/// 4. `./arkive.toml` (local directory)
/// 5. `ARKIVE_*` environment variables
pub fn load_config() -> Result<ArkiveConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ArkiveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArkiveConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ArkiveConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ArkiveConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ArkiveConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config key.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `telegram_bot_token` maps to `telegram.bot_token`, never `telegram.bot.token`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("github_records_path"), "github.records_path");
        assert_eq!(map_env_key("bot_deletion_delay_secs"), "bot.deletion_delay_secs");
        assert_eq!(map_env_key("sweep_max_attempts"), "sweep.max_attempts");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("unrelated"), "unrelated");
        // `bot` must not swallow a key that merely starts with the same letters.
        assert_eq!(map_env_key("botany_level"), "botany_level");
    }

    #[test]
    fn local_file_has_highest_precedence() {
        let paths = config_file_paths();
        assert_eq!(paths.last(), Some(&PathBuf::from("arkive.toml")));
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/arkive/arkive.toml")));
    }
}
