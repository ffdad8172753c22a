//! Upload attachments ahead of referencing them from a post.

use super::{api::*, channel::ChannelId, error::ApiError};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileId(pub String);

/// <https://api.mattermost.com/#tag/files/operation/UploadFile>
#[derive(Deserialize)]
struct UploadResponse {
    file_infos: Vec<FileInfo>,
}

#[derive(Deserialize)]
struct FileInfo {
    id: FileId,
}

impl MattermostClient {
    /// Upload `bytes` as a single file into a channel, returning the ID by
    /// which a post can attach it.
    pub async fn upload_file(
        &self,
        channel: &ChannelId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<FileId, ApiError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")?;

        let form = Form::new()
            .text("channel_id", channel.0.clone())
            .part("files", part);

        let res: UploadResponse = send_json(self.post("files").multipart(form)).await?;

        let id = res
            .file_infos
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or(ApiError::EmptyUpload)?;

        info!("Uploaded {} ({} bytes) as {}", filename, size, id.0);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mattermost::auth::AccessToken;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_upload_file() {
        let mut srv = mockito::Server::new_async().await;

        let upload = srv
            .mock("POST", "/api/v4/files")
            .match_header("authorization", "Bearer t")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"channel_id\"\r\n\r\nchan1".into()),
                Matcher::Regex("filename=\"notes.txt\"".into()),
                Matcher::Regex("hello there".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"file_infos": [{"id": "file123", "name": "notes.txt"}], "client_ids": []}"#)
            .create_async()
            .await;

        let client = MattermostClient::new(&srv.url(), AccessToken("t".into())).unwrap();
        let id = client
            .upload_file(&ChannelId("chan1".into()), "notes.txt", b"hello there".to_vec())
            .await
            .unwrap();

        upload.assert_async().await;
        assert_eq!(id, FileId("file123".into()));
    }

    #[tokio::test]
    async fn test_upload_without_file_infos() {
        let mut srv = mockito::Server::new_async().await;

        let _upload = srv
            .mock("POST", "/api/v4/files")
            .with_status(201)
            .with_body(r#"{"file_infos": []}"#)
            .create_async()
            .await;

        let client = MattermostClient::new(&srv.url(), AccessToken("t".into())).unwrap();
        let res = client
            .upload_file(&ChannelId("chan1".into()), "x.bin", vec![0x80])
            .await;

        assert!(matches!(res, Err(ApiError::EmptyUpload)));
    }
}
