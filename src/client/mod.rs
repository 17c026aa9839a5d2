use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::LinkhutError;

pub mod posts;
pub mod preview;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_server;

pub use posts::{NewPost, Post, PostQuery};
pub use preview::PreviewClient;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Answer from the mutating endpoints (`/posts/add`, `/tags/rename`, ...).
#[derive(Debug, Deserialize)]
struct ResultCode {
    result_code: String,
}

impl ResultCode {
    fn is_done(&self) -> bool {
        self.result_code == "done"
    }
}

/// Client for the LinkHut API. Every endpoint is a GET with query
/// parameters, authenticated with a personal access token.
pub struct LinkhutClient {
    client: Client,
    base_url: String,
    token: String,
}

impl LinkhutClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn build_request(&self, endpoint: &str, fields: &[(&str, String)]) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        if !fields.is_empty() {
            request = request.query(fields);
        }

        request
    }

    async fn send(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<Response> {
        debug!(endpoint, ?fields, "calling LinkHut");
        self.build_request(endpoint, fields)
            .send()
            .await
            .context("Failed to send request")
    }

    async fn call<T: DeserializeOwned>(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<T> {
        let response = self.send(endpoint, fields).await?;
        let response = check_status(response).await?;
        response.json().await.context("Failed to parse response")
    }

    /// Like `call`, but a 404 is an answer rather than an error.
    async fn call_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        fields: &[(&str, String)],
    ) -> Result<Option<T>> {
        let response = self.send(endpoint, fields).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(endpoint, "LinkHut answered 404");
            return Ok(None);
        }
        let response = check_status(response).await?;
        let body = response.json().await.context("Failed to parse response")?;
        Ok(Some(body))
    }

    /// Call a mutating endpoint. `Ok(None)` when the item was not found,
    /// `Ok(Some(code))` with the server's result code otherwise.
    async fn call_for_result(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<Option<String>> {
        let result: Option<ResultCode> = self.call_optional(endpoint, fields).await?;
        Ok(result.map(|r| {
            if !r.is_done() {
                debug!(endpoint, result_code = %r.result_code, "LinkHut did not complete request");
            }
            r.result_code
        }))
    }

    /// Fetch an endpoint and hand back the untyped JSON body.
    pub async fn raw(&self, endpoint: &str, fields: &[(&str, String)]) -> Result<serde_json::Value> {
        self.call(endpoint, fields).await
    }
}

fn http_client() -> Result<Client> {
    let builder = Client::builder().timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS));
    // Test servers listen on loopback; keep proxy settings out of the way
    #[cfg(test)]
    let builder = builder.no_proxy();
    builder.build().context("Failed to create HTTP client")
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(LinkhutError::Api { status, body }.into())
}
