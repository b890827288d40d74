//! `tagsync config`: inspect the effective configuration.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tagsync_config_and_utils::Config;

/// Config as shown to the user, with the API token masked.
#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    log_level: &'a str,
    inventory_url: &'a str,
    api_token: Option<&'static str>,
    request_timeout_secs: u64,
    request_prefix: &'a str,
}

impl<'a> From<&'a Config> for ConfigView<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            log_level: &config.log_level,
            inventory_url: &config.inventory_url,
            api_token: config.api_token.as_ref().map(|_| "********"),
            request_timeout_secs: config.request_timeout_secs,
            request_prefix: &config.request_prefix,
        }
    }
}

impl fmt::Display for ConfigView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  {:<16} {}", "log_level:", self.log_level)?;
        writeln!(f, "  {:<16} {}", "inventory_url:", self.inventory_url)?;
        writeln!(
            f,
            "  {:<16} {}",
            "api_token:",
            self.api_token.unwrap_or("(none)")
        )?;
        writeln!(f, "  {:<16} {}s", "timeout:", self.request_timeout_secs)?;
        write!(f, "  {:<16} {}", "request_prefix:", self.request_prefix)
    }
}

/// Print the effective configuration.
pub fn config_show(config: &Config, format: &OutputFormat) -> Result<()> {
    output::print(&ConfigView::from(config), format);
    Ok(())
}
