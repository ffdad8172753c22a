//! The client and request helpers shared by every Mattermost endpoint.

use super::{auth::*, error::ApiError};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use url::Url;

/// Path of the REST API relative to the server URL.
const API_PATH: &str = "/api/v4/";

/// A client bound to one server and one access token. Holds a connection pool
/// internally, as per [reqwest::Client].
pub struct MattermostClient {
    http: reqwest::Client,
    api_base: String,
    token: AccessToken,
}

impl MattermostClient {
    /// Both the server URL and the token must be present before we'll talk to
    /// anything.
    pub fn new(server_url: &str, token: AccessToken) -> Result<Self, ApiError> {
        let server_url = server_url.trim();
        if server_url.is_empty() {
            return Err(ApiError::MissingServerUrl);
        }
        if token.is_empty() {
            return Err(ApiError::MissingToken);
        }

        let url = Url::parse(server_url)
            .map_err(|e| ApiError::InvalidServerUrl(server_url.to_owned(), e))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_base: url.as_str().trim_end_matches('/').to_owned() + API_PATH,
            token,
        })
    }

    /// Create a GET request to any API endpoint, handling authentication.
    pub(super) fn get<T: AsRef<str>>(&self, path: T) -> reqwest::RequestBuilder {
        debug!("GET {}", path.as_ref());
        self.http
            .get(self.api_base.clone() + path.as_ref())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }

    /// Create a POST request to any API endpoint, handling authentication.
    pub(super) fn post<T: AsRef<str>>(&self, path: T) -> reqwest::RequestBuilder {
        debug!("POST {}", path.as_ref());
        self.http
            .post(self.api_base.clone() + path.as_ref())
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(&self.token))
    }
}

/// Mattermost reports failures with a non-2xx status and, usually, a body
/// like:
///
/// ```json
/// {
///     "id": "api.context.session_expired.app_error",
///     "message": "Invalid or expired session, please login again.",
///     "status_code": 401
/// }
/// ```
#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Send a request and decode its JSON body, turning any non-2xx status into
/// [ApiError::Response].
pub(super) async fn send_json<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, ApiError> {
    let res = req.send().await?;
    let status = res.status();

    if status.is_success() {
        return Ok(res.json().await?);
    }

    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    Err(ApiError::Response { status, message })
}
