//! Chat gateway abstraction
//!
//! Everything the desk needs from the chat platform, behind a trait so the
//! lifecycle logic can be exercised against a mock. The real implementation
//! forwards to the adapter process over the TCP link.

use async_trait::async_trait;

use usher_core::{ChannelId, Error, Result, RoleId, UserId};
use usher_net::{AdapterClient, Control, Embed, HistoryEntry, Request, Response};

/// Optional message decorations
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub embed: Option<Embed>,
    pub controls: Vec<Control>,
    pub mention_role: Option<RoleId>,
}

/// Platform operations the desk depends on
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Create a channel under `category` visible only to the given users
    /// and roles
    async fn create_private_channel(
        &self,
        category: ChannelId,
        name: &str,
        allow_users: &[UserId],
        allow_roles: &[RoleId],
    ) -> Result<ChannelId>;

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        options: SendOptions,
    ) -> Result<()>;

    async fn send_direct_message(&self, user: UserId, content: &str) -> Result<()>;

    async fn send_file(&self, channel: ChannelId, filename: &str, contents: &str) -> Result<()>;

    /// Full message history of a channel, oldest-first
    async fn fetch_history(&self, channel: ChannelId) -> Result<Vec<HistoryEntry>>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<()>;

    /// Number of live channels under a category
    async fn count_category_channels(&self, category: ChannelId) -> Result<u64>;

    async fn has_role(&self, user: UserId, role: RoleId) -> Result<bool>;

    async fn is_admin(&self, user: UserId) -> Result<bool>;
}

/// Gateway backed by the platform adapter link
pub struct RemoteGateway {
    client: AdapterClient,
}

impl RemoteGateway {
    pub fn new(client: AdapterClient) -> Self {
        Self { client }
    }

    async fn request(&self, request: Request) -> Result<Response> {
        self.client
            .request(request)
            .await
            .map_err(|e| Error::Gateway(e.to_string()))
    }
}

fn unexpected(response: Response) -> Error {
    Error::Gateway(format!("Unexpected adapter response: {:?}", response))
}

#[async_trait]
impl ChatGateway for RemoteGateway {
    async fn create_private_channel(
        &self,
        category: ChannelId,
        name: &str,
        allow_users: &[UserId],
        allow_roles: &[RoleId],
    ) -> Result<ChannelId> {
        let response = self
            .request(Request::CreateChannel {
                category,
                name: name.to_string(),
                allow_users: allow_users.to_vec(),
                allow_roles: allow_roles.to_vec(),
            })
            .await?;

        match response {
            Response::ChannelCreated { channel } => Ok(channel),
            other => Err(unexpected(other)),
        }
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        options: SendOptions,
    ) -> Result<()> {
        let response = self
            .request(Request::SendMessage {
                channel,
                content: content.to_string(),
                embed: options.embed,
                controls: options.controls,
                mention_role: options.mention_role,
            })
            .await?;

        match response {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn send_direct_message(&self, user: UserId, content: &str) -> Result<()> {
        let response = self
            .request(Request::SendDirectMessage {
                user,
                content: content.to_string(),
            })
            .await?;

        match response {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn send_file(&self, channel: ChannelId, filename: &str, contents: &str) -> Result<()> {
        let response = self
            .request(Request::SendFile {
                channel,
                filename: filename.to_string(),
                contents: contents.to_string(),
            })
            .await?;

        match response {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn fetch_history(&self, channel: ChannelId) -> Result<Vec<HistoryEntry>> {
        let response = self.request(Request::FetchHistory { channel }).await?;

        match response {
            Response::History { entries } => Ok(entries),
            other => Err(unexpected(other)),
        }
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
        let response = self.request(Request::DeleteChannel { channel }).await?;

        match response {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn count_category_channels(&self, category: ChannelId) -> Result<u64> {
        let response = self
            .request(Request::CountCategoryChannels { category })
            .await?;

        match response {
            Response::ChannelCount { count } => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    async fn has_role(&self, user: UserId, role: RoleId) -> Result<bool> {
        let response = self.request(Request::HasRole { user, role }).await?;

        match response {
            Response::RoleCheck { value } => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    async fn is_admin(&self, user: UserId) -> Result<bool> {
        let response = self.request(Request::IsAdmin { user }).await?;

        match response {
            Response::RoleCheck { value } => Ok(value),
            other => Err(unexpected(other)),
        }
    }
}
