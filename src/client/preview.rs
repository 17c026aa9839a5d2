use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use super::{check_status, http_client};
use crate::error::LinkhutError;

const API_KEY_HEADER: &str = "X-Linkpreview-Api-Key";

#[derive(Debug, Clone, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

/// Client for the LinkPreview API, used to fill in missing titles.
pub struct PreviewClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PreviewClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn build_request(&self, target: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("fields", "title,description,url"), ("q", target)])
    }

    pub async fn preview(&self, target: &str) -> Result<Preview> {
        debug!(url = target, "fetching link preview");
        let response = self
            .build_request(target)
            .send()
            .await
            .context("Failed to reach LinkPreview")?;
        let response = check_status(response).await?;
        response.json().await.context("Failed to parse preview")
    }

    pub async fn title(&self, target: &str) -> Result<String> {
        let preview = self.preview(target).await?;
        let title = preview.title.trim();
        if title.is_empty() {
            return Err(LinkhutError::EmptyTitle(target.to_string()).into());
        }
        Ok(title.to_string())
    }
}
