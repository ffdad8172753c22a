use reqwest::StatusCode;
use thiserror::Error;

/// Sum type representing every way a conversation with the Mattermost API can
/// fail, including refusing to start one.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No server URL configured; pass --server-url, set `server_url` or $MM_SERVER_URL")]
    MissingServerUrl,
    #[error("No access token configured; pass --token, set `token`/`tokencmd` or $MM_TOKEN")]
    MissingToken,
    #[error("Invalid server URL {0:?}: {1}")]
    InvalidServerUrl(String, url::ParseError),
    #[error("Mattermost API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Mattermost API returned {status}: {message}")]
    Response { status: StatusCode, message: String },
    #[error("Mattermost API returned no file for the upload")]
    EmptyUpload,
}
