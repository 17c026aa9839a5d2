//! Command-line client for the LinkHut bookmarking service.

use anyhow::Result;

pub mod bookmarks;
pub mod cli;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod progress;
pub mod prompts;
pub mod utils;

use client::LinkhutClient;
use config::{Config, Credential};

/// Entry point of the `linkhut` binary: check connectivity by fetching the
/// account's posts and printing the raw JSON answer.
pub async fn dump_posts() -> Result<()> {
    let config = Config::load()?;
    let token = config.require(Credential::LinkhutToken)?;
    let api_url = config.resolve_api_url(std::env::var("LINKHUT_API_URL").ok());

    let client = LinkhutClient::new(&api_url, &token)?;
    let body = progress::with_spinner("Contacting LinkHut...", client.raw("/v1/posts/get", &[])).await?;

    println!("API call successful:");
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
