//! Find channels by name across every team we're in, and open direct channels
//! with other users.

use super::{api::*, error::ApiError, team::TeamId, user::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel names as are visible in the Mattermost UI, with or without the
/// leading hash. Either the display name or the URL handle will do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelName(pub String);

impl ChannelName {
    /// Channel names can't start with a hash, so by doing this we can support
    /// consumers supplying (or not) a leading hash.
    pub fn normalised(&self) -> &str {
        self.0.trim_start_matches('#')
    }
}

/// Format without the surrounding newtype wrapper.
impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Because channel names can change, the API refers to channels by their
/// underlying ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// <https://api.mattermost.com/#tag/channels/operation/GetChannelsForTeamForUser>
#[derive(Deserialize)]
struct ChannelMeta {
    id: ChannelId,
    name: String,
    display_name: String,
}

/// A channel together with the team it was listed under.
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub display_name: String,
    pub team_id: TeamId,
}

impl Channel {
    /// Direct channels have an empty display name, so an empty name must
    /// never match.
    fn is_named(&self, name: &str) -> bool {
        !name.is_empty() && (self.display_name == name || self.name == name)
    }
}

/// <https://api.mattermost.com/#tag/channels/operation/CreateDirectChannel>
#[derive(Deserialize)]
struct DirectResponse {
    id: ChannelId,
}

impl MattermostClient {
    /// Every channel in every team we belong to, in team order.
    pub async fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        let mut channels = Vec::new();

        for team in self.list_my_teams().await? {
            let metas: Vec<ChannelMeta> =
                send_json(self.get(format!("users/me/teams/{}/channels", team.id))).await?;

            channels.extend(metas.into_iter().map(|meta| Channel {
                id: meta.id,
                name: meta.name,
                display_name: meta.display_name,
                team_id: team.id.clone(),
            }));
        }

        Ok(channels)
    }

    /// Get the channel and team IDs of the first channel matching a name
    /// exactly. Not finding one isn't an error here; it's up to the caller.
    pub async fn resolve_channel(
        &self,
        channel_name: &ChannelName,
    ) -> Result<Option<(ChannelId, TeamId)>, ApiError> {
        let wanted = channel_name.normalised();

        Ok(self
            .list_channels()
            .await?
            .into_iter()
            .find(|c| c.is_named(wanted))
            .map(|c| (c.id, c.team_id)))
    }

    /// Create the direct channel between us and another user. The server
    /// hands back the existing channel if there already is one.
    pub async fn direct_channel(&self, user_id: &UserId) -> Result<ChannelId, ApiError> {
        let me = self.my_user_id().await?;

        let res: DirectResponse =
            send_json(self.post("channels/direct").json(&[user_id, &me])).await?;

        Ok(res.id)
    }

    /// Get the direct channel with a user by username, or `None` if there's no
    /// such user, in which case no channel is created.
    pub async fn resolve_direct(&self, username: &Username) -> Result<Option<ChannelId>, ApiError> {
        match self.find_user_id(username).await? {
            Some(user_id) => Ok(Some(self.direct_channel(&user_id).await?)),
            None => Ok(None),
        }
    }
}
