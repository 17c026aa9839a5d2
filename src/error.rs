use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkhutError {
    #[error(
        "{0} is not set. Add it to your .env file or environment, or run 'linkhut-cli auth login'"
    )]
    MissingCredential(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("API error ({status}): {body}")]
    Api { status: StatusCode, body: String },

    #[error("LinkHut rejected the request: {0}")]
    Rejected(String),

    #[error("No title available for {0}")]
    EmptyTitle(String),
}
