//! Create the post itself.

use super::{api::*, channel::ChannelId, error::ApiError, file::FileId, team::TeamId};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use tracing::info;

/// <https://api.mattermost.com/#tag/posts/operation/CreatePost>
#[serde_as]
#[derive(Serialize)]
struct PostRequest<'a> {
    channel_id: &'a ChannelId,
    message: &'a str,
    // Direct channels have no team; the server accepts an empty string.
    #[serde_as(as = "NoneAsEmptyString")]
    team_id: Option<&'a TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_ids: Option<&'a [FileId]>,
}

#[derive(Deserialize)]
struct PostResponse {
    id: String,
}

impl MattermostClient {
    /// Post a message, attaching any previously uploaded files.
    pub async fn create_post(
        &self,
        channel_id: &ChannelId,
        team_id: Option<&TeamId>,
        message: &str,
        file_ids: &[FileId],
    ) -> Result<(), ApiError> {
        let req = PostRequest {
            channel_id,
            message,
            team_id,
            file_ids: (!file_ids.is_empty()).then_some(file_ids),
        };

        let res: PostResponse = send_json(self.post("posts").json(&req)).await?;

        info!("Created post {}", res.id);
        Ok(())
    }
}
