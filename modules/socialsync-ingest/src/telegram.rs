// Telegram channel reader. The MTProto client is consumed through the
// ChannelClient seam; session establishment is a one-time interactive
// step outside this system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use anyhow::{Context, Result};
use socialsync_common::{Platform, Post};

/// One channel message as the reader needs it.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: i32,
    /// Empty for non-text messages (photos, polls, service messages).
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Capability seam over the messaging client: recent messages for a
/// channel, newest first.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    async fn is_authorized(&self) -> Result<bool>;
    async fn recent_messages(&self, channel: &str, limit: usize) -> Result<Vec<ChannelMessage>>;
}

pub struct ChannelReader<C> {
    client: C,
    channel: String,
}

impl<C: ChannelClient> ChannelReader<C> {
    pub fn new(client: C, channel: &str) -> Self {
        Self {
            client,
            channel: channel.to_string(),
        }
    }

    /// Fetch up to `limit` recent text posts from the channel.
    ///
    /// An unauthenticated session is an expected operational state (the
    /// session file needs one-time interactive setup): warn and return
    /// empty. Errors during an authorized read propagate.
    pub async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>> {
        if !self.client.is_authorized().await? {
            warn!("telegram: session not authorized, run interactive setup first");
            return Ok(Vec::new());
        }

        info!(channel = self.channel.as_str(), limit, "telegram: fetching posts");

        let messages = self.client.recent_messages(&self.channel, limit).await?;

        let posts = messages
            .into_iter()
            .filter(|msg| !msg.text.is_empty())
            .map(|msg| Post {
                platform: Platform::Telegram,
                post_url: format!("https://t.me/{}/{}", self.channel, msg.id),
                content: msg.text,
                published_at: Some(msg.date),
            })
            .collect();

        Ok(posts)
    }
}

/// Production ChannelClient over grammers (MTProto). The session file is
/// created by a one-time interactive login outside this process.
pub struct GrammersChannelClient {
    client: grammers_client::Client,
}

impl GrammersChannelClient {
    pub async fn connect(session_file: &str, api_id: i32, api_hash: &str) -> Result<Self> {
        let session = grammers_session::Session::load_file_or_create(session_file)
            .context("Failed to load Telegram session file")?;

        let client = grammers_client::Client::connect(grammers_client::Config {
            session,
            api_id,
            api_hash: api_hash.to_string(),
            params: Default::default(),
        })
        .await
        .context("Failed to connect to Telegram")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ChannelClient for GrammersChannelClient {
    async fn is_authorized(&self) -> Result<bool> {
        self.client
            .is_authorized()
            .await
            .context("Failed to check Telegram authorization")
    }

    async fn recent_messages(&self, channel: &str, limit: usize) -> Result<Vec<ChannelMessage>> {
        let chat = self
            .client
            .resolve_username(channel)
            .await
            .context("Failed to resolve channel username")?
            .ok_or_else(|| anyhow::anyhow!("Channel not found: {channel}"))?;

        let mut iter = self.client.iter_messages(&chat).limit(limit);
        let mut messages = Vec::new();

        while let Some(msg) = iter.next().await.context("Failed to iterate messages")? {
            messages.push(ChannelMessage {
                id: msg.id(),
                text: msg.text().to_string(),
                date: msg.date(),
            });
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FakeClient {
        authorized: bool,
        messages: Vec<ChannelMessage>,
    }

    #[async_trait]
    impl ChannelClient for FakeClient {
        async fn is_authorized(&self) -> Result<bool> {
            Ok(self.authorized)
        }

        async fn recent_messages(
            &self,
            _channel: &str,
            limit: usize,
        ) -> Result<Vec<ChannelMessage>> {
            Ok(self.messages.iter().take(limit).cloned().collect())
        }
    }

    fn msg(id: i32, text: &str) -> ChannelMessage {
        ChannelMessage {
            id,
            text: text.to_string(),
            date: Utc.with_ymd_and_hms(2025, 5, 5, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn text_messages_become_posts_and_others_are_skipped() {
        let reader = ChannelReader::new(
            FakeClient {
                authorized: true,
                messages: vec![
                    msg(101, "first"),
                    msg(102, ""),
                    msg(103, "second"),
                    msg(104, ""),
                    msg(105, "third"),
                ],
            },
            "mychannel",
        );

        let posts = reader.fetch_posts(10).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].post_url, "https://t.me/mychannel/101");
        assert_eq!(posts[1].post_url, "https://t.me/mychannel/103");
        assert_eq!(posts[2].post_url, "https://t.me/mychannel/105");
        assert!(posts.iter().all(|p| p.platform == Platform::Telegram));
        assert!(posts.iter().all(|p| p.published_at.is_some()));
    }

    #[tokio::test]
    async fn unauthorized_session_soft_fails_to_empty() {
        let reader = ChannelReader::new(
            FakeClient {
                authorized: false,
                messages: vec![msg(1, "never read")],
            },
            "mychannel",
        );

        let posts = reader.fetch_posts(10).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn client_errors_propagate() {
        struct BrokenClient;

        #[async_trait]
        impl ChannelClient for BrokenClient {
            async fn is_authorized(&self) -> Result<bool> {
                Ok(true)
            }
            async fn recent_messages(&self, _: &str, _: usize) -> Result<Vec<ChannelMessage>> {
                anyhow::bail!("flood wait")
            }
        }

        let reader = ChannelReader::new(BrokenClient, "mychannel");
        assert!(reader.fetch_posts(10).await.is_err());
    }
}
