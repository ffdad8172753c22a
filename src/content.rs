//! Decide what to do with whatever was piped to us: inline it into the
//! message (optionally fenced for highlighting), or upload it as an attachment
//! when it's binary or too long to post.

use crate::{
    error::Failure,
    highlight::{self, EmptyContent, HighlightMode, LanguageDetector},
    mattermost::{api::MattermostClient, channel::ChannelId, file::FileId},
};
use std::borrow::Cow;
use tracing::info;

/// Posted in place of an empty message alongside binary content, so that the
/// post is never silently empty.
pub const BINARY_PLACEHOLDER: &str = "attaching binary content:\n";

/// Upload name for text that didn't fit in a message.
const TEXT_FILENAME: &str = "content.txt";

/// Upload name for content that isn't UTF-8.
const BINARY_FILENAME: &str = "content.bin";

/// The message being assembled for a single post.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub attachment_ids: Vec<FileId>,
}

impl Draft {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            attachment_ids: Vec::new(),
        }
    }
}

/// Anything which isn't entirely valid UTF-8 is binary. There's no sampling;
/// one bad byte anywhere is enough.
pub fn is_binary(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_err()
}

/// What should happen to piped content.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// Nothing was piped.
    Unchanged,
    /// Post this text, which already includes the existing message.
    Inline(String),
    /// Upload the raw content under `filename` and post `message` with it.
    Attach {
        message: String,
        filename: &'static str,
    },
}

/// Work out the [Route] for `raw` without touching the network.
///
/// The length budget applies to the whole message as it would be posted,
/// fencing included, and counts characters. Binary content skips the budget
/// entirely: it's always uploaded.
pub fn plan(
    message: &str,
    raw: &[u8],
    mode: &HighlightMode,
    max_length: usize,
    detector: &dyn LanguageDetector,
) -> Result<Route, EmptyContent> {
    if raw.is_empty() {
        return Ok(Route::Unchanged);
    }

    if is_binary(raw) {
        let message = if message.is_empty() {
            BINARY_PLACEHOLDER
        } else {
            message
        };

        return Ok(Route::Attach {
            message: message.to_owned(),
            filename: BINARY_FILENAME,
        });
    }

    // Can't be lossy, we've just checked.
    let text = String::from_utf8_lossy(raw);

    let formatted = match mode {
        HighlightMode::No => text,
        _ => Cow::Owned(highlight::format(&text, mode, detector)?),
    };

    let combined = format!("{}\n{}", message, formatted);

    if combined.chars().count() > max_length {
        Ok(Route::Attach {
            message: message.to_owned(),
            filename: TEXT_FILENAME,
        })
    } else {
        Ok(Route::Inline(combined))
    }
}

/// Fold piped content into `draft`, uploading it to `channel` if the [Route]
/// calls for an attachment.
pub async fn route(
    mut draft: Draft,
    raw: Vec<u8>,
    mode: &HighlightMode,
    max_length: usize,
    detector: &dyn LanguageDetector,
    client: &MattermostClient,
    channel: &ChannelId,
) -> Result<Draft, Failure> {
    match plan(&draft.text, &raw, mode, max_length, detector)? {
        Route::Unchanged => {}
        Route::Inline(text) => draft.text = text,
        Route::Attach { message, filename } => {
            info!(
                "Attaching {} bytes of piped content as {}",
                raw.len(),
                filename
            );
            let id = client.upload_file(channel, filename, raw).await?;
            draft.text = message;
            draft.attachment_ids.push(id);
        }
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mattermost::auth::AccessToken;
    use mockito::Matcher;
    use quickcheck::quickcheck;

    /// Content routing shouldn't depend on what the detector thinks.
    struct Plain;

    impl LanguageDetector for Plain {
        fn detect(&self, _: &str) -> Option<String> {
            Some("text".into())
        }
    }

    const BINARY: &[u8] = &[0x80, 0x81, 0x82, 0x83];

    #[test]
    fn test_is_binary() {
        assert!(!is_binary("Hello, world!".as_bytes()));
        assert!(!is_binary("héllo ✓".as_bytes()));
        assert!(is_binary(BINARY));
        // A truncated multi-byte sequence at the very end still counts.
        assert!(is_binary(&"✓".as_bytes()[..2]));
    }

    quickcheck! {
        fn prop_utf8_is_never_binary(s: String) -> bool {
            !is_binary(s.as_bytes())
        }

        fn prop_invalid_byte_is_always_binary(prefix: String, suffix: Vec<u8>) -> bool {
            let mut bytes = prefix.into_bytes();
            bytes.push(0xff);
            bytes.extend(suffix);
            is_binary(&bytes)
        }

        fn prop_nothing_piped_is_unchanged(msg: String, max_length: usize, tag: String) -> bool {
            [HighlightMode::No, HighlightMode::Auto, HighlightMode::from(tag.as_str())]
                .iter()
                .all(|mode| plan(&msg, b"", mode, max_length, &Plain) == Ok(Route::Unchanged))
        }

        fn prop_text_within_budget_is_inlined(msg: String, text: String) -> bool {
            let expected = format!("{}\n{}", msg, text);
            let budget = expected.chars().count();
            text.is_empty()
                || plan(&msg, text.as_bytes(), &HighlightMode::No, budget, &Plain)
                    == Ok(Route::Inline(expected))
        }
    }

    #[test]
    fn test_plan_inline_plain() {
        assert_eq!(
            plan("some message", b"This is text", &HighlightMode::No, 1000, &Plain),
            Ok(Route::Inline("some message\nThis is text".into()))
        );
    }

    #[test]
    fn test_plan_inline_fenced() {
        assert_eq!(
            plan("look:", b"x = 1", &HighlightMode::Language("python".into()), 1000, &Plain),
            Ok(Route::Inline("look:\n```python\nx = 1\n```".into()))
        );
    }

    #[test]
    fn test_plan_no_mode_passes_whitespace_through() {
        assert_eq!(
            plan("m", b"\n", &HighlightMode::No, 1000, &Plain),
            Ok(Route::Inline("m\n\n".into()))
        );
    }

    #[test]
    fn test_plan_highlight_refuses_whitespace() {
        assert_eq!(
            plan("m", b"  \n", &HighlightMode::Auto, 1000, &Plain),
            Err(EmptyContent)
        );
    }

    #[test]
    fn test_plan_oversized_text_attaches() {
        assert_eq!(
            plan("some message", b"This is some longer text", &HighlightMode::No, 10, &Plain),
            Ok(Route::Attach {
                message: "some message".into(),
                filename: TEXT_FILENAME,
            })
        );
    }

    #[test]
    fn test_plan_fence_counts_towards_budget() {
        // "m\nabc" fits in 5, but "m\n```text\nabc\n```" doesn't.
        assert_eq!(
            plan("m", b"abc", &HighlightMode::No, 5, &Plain),
            Ok(Route::Inline("m\nabc".into()))
        );
        assert!(matches!(
            plan("m", b"abc", &HighlightMode::Auto, 5, &Plain),
            Ok(Route::Attach { .. })
        ));
    }

    #[test]
    fn test_plan_budget_counts_characters() {
        // Six characters, but more than six bytes.
        assert_eq!(
            plan("é", "✓✓✓✓".as_bytes(), &HighlightMode::No, 6, &Plain),
            Ok(Route::Inline("é\n✓✓✓✓".into()))
        );
    }

    #[test]
    fn test_plan_binary() {
        assert_eq!(
            plan("some message", BINARY, &HighlightMode::No, 1000, &Plain),
            Ok(Route::Attach {
                message: "some message".into(),
                filename: BINARY_FILENAME,
            })
        );

        // No length check, and no highlighting, for binary content.
        assert_eq!(
            plan("", BINARY, &HighlightMode::Auto, 0, &Plain),
            Ok(Route::Attach {
                message: BINARY_PLACEHOLDER.into(),
                filename: BINARY_FILENAME,
            })
        );
    }

    fn client(srv: &mockito::ServerGuard) -> MattermostClient {
        MattermostClient::new(&srv.url(), AccessToken("t".into())).unwrap()
    }

    async fn mock_upload(srv: &mut mockito::ServerGuard, filename: &str, id: &str) -> mockito::Mock {
        srv.mock("POST", "/api/v4/files")
            .match_body(Matcher::Regex(format!("filename=\"{}\"", filename)))
            .with_status(201)
            .with_body(format!(r#"{{"file_infos": [{{"id": "{}"}}]}}"#, id))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_route_text_within_limits() {
        let mut srv = mockito::Server::new_async().await;
        let upload = srv.mock("POST", "/api/v4/files").expect(0).create_async().await;

        let draft = route(
            Draft::new("some message"),
            b"This is text".to_vec(),
            &HighlightMode::No,
            1000,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await
        .unwrap();

        upload.assert_async().await;
        assert_eq!(draft, Draft::new("some message\nThis is text"));
    }

    #[tokio::test]
    async fn test_route_text_exceeds_max_length() {
        let mut srv = mockito::Server::new_async().await;
        let upload = mock_upload(&mut srv, TEXT_FILENAME, "file123").await;

        let draft = route(
            Draft::new("hi"),
            b"This is some longer text".to_vec(),
            &HighlightMode::No,
            10,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await
        .unwrap();

        upload.assert_async().await;
        assert_eq!(draft.text, "hi");
        assert_eq!(draft.attachment_ids, vec![FileId("file123".into())]);
    }

    #[tokio::test]
    async fn test_route_binary_empty_message() {
        let mut srv = mockito::Server::new_async().await;
        let upload = mock_upload(&mut srv, BINARY_FILENAME, "binary_file123").await;

        let draft = route(
            Draft::new(""),
            BINARY.to_vec(),
            &HighlightMode::Auto,
            1000,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await
        .unwrap();

        upload.assert_async().await;
        assert_eq!(draft.text, BINARY_PLACEHOLDER);
        assert_eq!(draft.attachment_ids, vec![FileId("binary_file123".into())]);
    }

    #[tokio::test]
    async fn test_route_appends_to_existing_attachments() {
        let mut srv = mockito::Server::new_async().await;
        let upload = mock_upload(&mut srv, BINARY_FILENAME, "second").await;

        let mut draft = Draft::new("files");
        draft.attachment_ids.push(FileId("first".into()));

        let draft = route(
            draft,
            BINARY.to_vec(),
            &HighlightMode::No,
            1000,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await
        .unwrap();

        upload.assert_async().await;
        assert_eq!(draft.text, "files");
        assert_eq!(
            draft.attachment_ids,
            vec![FileId("first".into()), FileId("second".into())]
        );
    }

    #[tokio::test]
    async fn test_route_nothing_piped() {
        let mut srv = mockito::Server::new_async().await;
        let upload = srv.mock("POST", "/api/v4/files").expect(0).create_async().await;

        let draft = route(
            Draft::new("some message"),
            Vec::new(),
            &HighlightMode::Auto,
            1000,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await
        .unwrap();

        upload.assert_async().await;
        assert_eq!(draft, Draft::new("some message"));
    }

    #[tokio::test]
    async fn test_route_empty_content_fails() {
        let srv = mockito::Server::new_async().await;

        let res = route(
            Draft::new(""),
            b"   ".to_vec(),
            &HighlightMode::Auto,
            1000,
            &Plain,
            &client(&srv),
            &ChannelId("channel123".into()),
        )
        .await;

        assert!(matches!(res, Err(Failure::EmptyContent(_))));
    }
}
