// SPDX-FileCopyrightText: 2026 Arkive Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `arkive status` and `arkive config` command implementations.
//!
//! Both are read-only: status reads the archive index and the deletion queue
//! from the repository, config prints the merged configuration.

use arkive_agent::StatusReport;
use arkive_config::model::ArkiveConfig;
use arkive_core::ArkiveError;

use crate::serve::build_stores;

/// Run the `arkive status` command.
///
/// Only GitHub credentials are needed; the Telegram token is not used.
pub async fn run_status(config: &ArkiveConfig) -> Result<(), ArkiveError> {
    let (records, queue) = build_stores(config)?;
    let report = StatusReport::collect(&records, &queue).await;

    println!(
        "{} ({}/{}@{})",
        config.bot.name, config.github.owner, config.github.repo, config.github.branch
    );
    println!("{report}");
    Ok(())
}

/// Run the `arkive config` command.
pub fn print_config(config: &ArkiveConfig) -> Result<(), ArkiveError> {
    println!("{}", render_config(config)?);
    Ok(())
}

fn render_config(config: &ArkiveConfig) -> Result<String, ArkiveError> {
    config
        .to_redacted_toml()
        .map_err(|e| ArkiveError::Serialization {
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_hides_secrets() {
        let mut config = ArkiveConfig::default();
        config.github.token = Some("ghp_very_secret".into());
        config.gateway.sweep_token = Some("tick-tock".into());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("ghp_very_secret"));
        assert!(!rendered.contains("tick-tock"));
        assert!(rendered.contains("archive.csv"));
    }
}
