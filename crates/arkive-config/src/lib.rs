// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Arkive archive bot.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `ARKIVE_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use arkive_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("archive index: {}", config.github.records_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ArkiveConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `ArkiveConfig` or every diagnostic found.
pub fn load_and_validate() -> Result<ArkiveConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Load configuration from a specific file (plus env vars) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<ArkiveConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<ArkiveConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn finish(
    loaded: Result<ArkiveConfig, figment::Error>,
) -> Result<ArkiveConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
