use async_trait::async_trait;
use thiserror::Error;
use crate::domain::{ChannelId, RoleId, UserId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Channel creation failed: {0}")]
    ChannelCreate(String),
    #[error("Channel {0} could not be deleted")]
    ChannelDelete(ChannelId),
    #[error("User {0} does not accept direct messages")]
    DirectMessagesClosed(UserId),
    #[error("Message delivery failed: {0}")]
    Delivery(String),
}

/// Who a channel permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantTarget {
    Everyone,
    User(UserId),
    Role(RoleId),
    /// The bot's own account.
    Bot,
}

/// View/send permission on a private channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGrant {
    pub target: GrantTarget,
    pub allow: bool,
}

impl PermissionGrant {
    pub fn allow(target: GrantTarget) -> Self {
        Self { target, allow: true }
    }

    pub fn deny(target: GrantTarget) -> Self {
        Self { target, allow: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
}

/// A plain structured message. Rendering into platform embeds is left to the
/// platform adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub lines: Vec<String>,
    pub tone: Tone,
    pub image_url: Option<String>,
}

impl Notice {
    pub fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            tone,
            image_url: None,
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn field(self, name: &str, value: impl std::fmt::Display) -> Self {
        self.line(format!("{name}: {value}"))
    }

    pub fn image(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }

    /// True if the title or any line contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.lines.iter().any(|l| l.contains(needle))
    }
}

/// The chat-platform surface used by the order lifecycle.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Creates a text channel under `parent` visible according to `grants`.
    async fn create_private_channel(
        &self,
        parent: Option<ChannelId>,
        name: &str,
        grants: &[PermissionGrant],
    ) -> Result<ChannelId, ChatError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ChatError>;

    async fn send_channel_notice(&self, channel: ChannelId, notice: &Notice) -> Result<(), ChatError>;

    async fn send_direct_notice(&self, user: UserId, notice: &Notice) -> Result<(), ChatError>;
}
