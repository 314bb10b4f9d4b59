//! `braite config`: show the effective configuration.

use anyhow::Result;

use braite_infra::config::render_config;
use braite_types::config::AppConfig;

/// Print `config` as TOML. Secrets are never part of the output.
pub fn show_config(config: &AppConfig) -> Result<()> {
    print!("{}", render_config(config)?);
    Ok(())
}
