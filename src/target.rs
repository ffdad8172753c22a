//! Turn `--channel` or `--user` into somewhere we can post.

use crate::{
    error::Failure,
    mattermost::{
        api::MattermostClient,
        channel::{ChannelId, ChannelName},
        team::TeamId,
        user::Username,
    },
};
use tracing::info;

/// Where the post is going, by name.
#[derive(Debug, PartialEq, Eq)]
pub enum Destination {
    Channel(ChannelName),
    User(Username),
}

impl Destination {
    /// Exactly one of the two must be given. A name that's empty once its
    /// leading `#` or `@` is dropped counts as not given.
    pub fn from_flags(channel: Option<&str>, user: Option<&str>) -> Result<Self, Failure> {
        let channel = channel
            .map(|c| ChannelName(c.to_owned()))
            .filter(|c| !c.normalised().trim().is_empty());
        let user = user
            .map(|u| Username(u.to_owned()))
            .filter(|u| !u.normalised().trim().is_empty());

        match (channel, user) {
            (Some(_), Some(_)) => Err(Failure::ConflictingTargets),
            (Some(c), None) => Ok(Destination::Channel(c)),
            (None, Some(u)) => Ok(Destination::User(u)),
            (None, None) => Err(Failure::NoTarget),
        }
    }
}

/// Where the post is going, by ID. Direct channels have no team.
#[derive(Debug, PartialEq, Eq)]
pub struct Target {
    pub channel_id: ChannelId,
    pub team_id: Option<TeamId>,
}

/// Look up or, for users, open the channel for a [Destination].
pub async fn resolve(client: &MattermostClient, dest: &Destination) -> Result<Target, Failure> {
    let target = match dest {
        Destination::Channel(name) => {
            let (channel_id, team_id) = client
                .resolve_channel(name)
                .await?
                .ok_or_else(|| Failure::UnknownChannel(name.clone()))?;

            Target {
                channel_id,
                team_id: Some(team_id),
            }
        }
        Destination::User(username) => {
            let channel_id = client
                .resolve_direct(username)
                .await?
                .ok_or_else(|| Failure::UnknownUser(username.clone()))?;

            Target {
                channel_id,
                team_id: None,
            }
        }
    };

    info!("Posting to {:?} as channel {}", dest, target.channel_id.0);
    Ok(target)
}
