//! Look up users, including ourselves.

use super::{api::*, error::ApiError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Usernames as are visible in the Mattermost UI, with or without the leading
/// at sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(pub String);

impl Username {
    /// Usernames can't contain an at sign, so dropping it lets consumers
    /// write `@alice` or `alice`.
    pub fn normalised(&self) -> &str {
        self.0.trim_start_matches('@')
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId(pub String);

/// The metadata we care about per-user.
#[derive(Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// The largest page the API will hand out.
const PER_PAGE: usize = 200;

/// <https://api.mattermost.com/#tag/users/operation/GetUsers>
#[derive(Serialize)]
struct ListRequest {
    page: usize,
    per_page: usize,
}

#[derive(Deserialize)]
struct Me {
    id: UserId,
}

impl MattermostClient {
    /// Every user visible to us, fetched page by page until a short page.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let mut users: Vec<User> = Vec::new();
        let mut page = 0;

        loop {
            let mut res: Vec<User> = send_json(self.get("users").query(&ListRequest {
                page,
                per_page: PER_PAGE,
            }))
            .await?;

            let done = res.len() < PER_PAGE;
            users.append(&mut res);

            if done {
                break Ok(users);
            }
            page += 1;
        }
    }

    pub async fn my_user_id(&self) -> Result<UserId, ApiError> {
        let me: Me = send_json(self.get("users/me")).await?;
        Ok(me.id)
    }

    /// Find a user ID by exact username.
    pub async fn find_user_id(&self, username: &Username) -> Result<Option<UserId>, ApiError> {
        let wanted = username.normalised();

        Ok(self
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.username == wanted)
            .map(|u| u.id))
    }
}
