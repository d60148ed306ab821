//! Best-effort delivery of status notices.
//!
//! Every method reports whether delivery worked but never returns an error:
//! a failed notice is logged and the state change that triggered it stands.

use std::sync::Arc;
use tracing::{debug, instrument, warn};
use crate::domain::{ChannelId, UserId};
use crate::platform::{ChatPlatform, Notice};

#[derive(Clone)]
pub struct NotificationDispatcher {
    chat: Arc<dyn ChatPlatform>,
    audit_channel: Option<ChannelId>,
}

impl NotificationDispatcher {
    pub fn new(chat: Arc<dyn ChatPlatform>, audit_channel: Option<ChannelId>) -> Self {
        Self { chat, audit_channel }
    }

    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn to_buyer(&self, buyer: UserId, notice: Notice) -> bool {
        match self.chat.send_direct_notice(buyer, &notice).await {
            Ok(()) => {
                debug!("Direct notice delivered");
                true
            }
            Err(e) => {
                warn!(error = %e, "Direct notice not delivered");
                false
            }
        }
    }

    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn to_channel(&self, channel: ChannelId, notice: Notice) -> bool {
        match self.chat.send_channel_notice(channel, &notice).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Channel notice not delivered");
                false
            }
        }
    }

    /// No-op returning `false` when no audit channel is configured.
    #[instrument(skip(self, notice), fields(title = %notice.title))]
    pub async fn to_audit_log(&self, notice: Notice) -> bool {
        let Some(channel) = self.audit_channel else {
            debug!("No audit channel configured");
            return false;
        };
        match self.chat.send_channel_notice(channel, &notice).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Audit notice not delivered");
                false
            }
        }
    }
}
