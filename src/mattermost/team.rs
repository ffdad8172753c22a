//! Teams the authenticated user belongs to.

use super::{api::*, error::ApiError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channels other than direct channels belong to exactly one team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The metadata we care about per-team.
#[derive(Deserialize)]
pub struct Team {
    pub id: TeamId,
}

impl MattermostClient {
    /// <https://api.mattermost.com/#tag/teams/operation/GetTeamsForUser>
    pub async fn list_my_teams(&self) -> Result<Vec<Team>, ApiError> {
        send_json(self.get("users/me/teams")).await
    }
}
