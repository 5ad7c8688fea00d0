//! Command handlers.

pub mod auth;
pub mod config;
pub mod tasks;

use anyhow::Result;
use taskdeck_core::api::ApiClient;
use taskdeck_core::auth::TokenStore;
use taskdeck_core::config::Config;

/// Builds the API client against the resolved base URL and the default
/// credential store.
pub fn api_client(config: &Config) -> Result<ApiClient> {
    let base_url = config.effective_base_url()?;
    ApiClient::new(base_url, TokenStore::new())
}
