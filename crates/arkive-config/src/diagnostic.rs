// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics.
//!
//! Unknown keys get a Jaro-Winkler "did you mean" suggestion and the name of
//! the environment variable that sets the suggested key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::Diagnostic;
use thiserror::Error;

use crate::loader::ENV_PREFIX;

/// Suggestions scoring at or below this are not shown.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section declares.
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(arkive::config::unknown_key),
        help("{}", unknown_key_help(section, suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Table the key appeared in, e.g. `github`. Empty at top level.
        section: String,
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
    },

    /// A value of the wrong TOML or environment type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(arkive::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path such as `gateway.port`.
        key: String,
        found: String,
        expected: String,
    },

    /// A value that parsed but makes no sense for the bot.
    #[error("{message}")]
    #[diagnostic(code(arkive::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(arkive::config::other))]
    Other(String),
}

fn unknown_key_help(section: &str, suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) if section.is_empty() => {
            format!("did you mean [{s}]? Valid sections: {valid_keys}")
        }
        Some(s) => format!(
            "did you mean `{s}` (env: {ENV_PREFIX}{}_{})? Valid keys: {valid_keys}",
            section.to_ascii_uppercase(),
            s.to_ascii_uppercase()
        ),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Splits a figment error chain into one diagnostic per failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                section: error.path.join("."),
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: actual.to_string(),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Closest valid key scoring above [`SUGGESTION_THRESHOLD`].
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_repo_for_transposed_letters() {
        let valid = &["token", "owner", "repo", "branch"];
        assert_eq!(suggest_key("reop", valid), Some("repo".to_string()));
    }

    #[test]
    fn picks_the_closest_of_similar_keys() {
        let valid = &["records_path", "queue_path"];
        assert_eq!(
            suggest_key("record_path", valid),
            Some("records_path".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_unrelated_key() {
        let valid = &["host", "port", "sweep_token"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn help_names_the_environment_variable() {
        let help = unknown_key_help("github", Some("repo"), "token, owner, repo");
        assert!(help.contains("ARKIVE_GITHUB_REPO"), "got: {help}");

        let help = unknown_key_help("", Some("sweep"), "bot, sweep");
        assert_eq!(help, "did you mean [sweep]? Valid sections: bot, sweep");
    }
}
