use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use async_trait::async_trait;
use tracing::debug;
use crate::domain::{ChannelId, UserId};
use super::chat::{ChatError, ChatPlatform, Notice, PermissionGrant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub parent: Option<ChannelId>,
    pub name: String,
    pub grants: Vec<PermissionGrant>,
}

#[derive(Debug, Default)]
struct ChatState {
    next_channel: u64,
    channels: HashMap<ChannelId, ChannelRecord>,
    deleted: Vec<ChannelId>,
    channel_notices: Vec<(ChannelId, Notice)>,
    direct_notices: Vec<(UserId, Notice)>,
    closed_dms: HashSet<UserId>,
}

/// Chat platform kept in memory. Records every call and can be told to fail
/// channel creation, channel deletion, or direct messages to given users.
#[derive(Debug, Default)]
pub struct InMemoryChat {
    state: Mutex<ChatState>,
    fail_channel_create: AtomicBool,
    fail_channel_delete: AtomicBool,
}

impl InMemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_channel_creation(&self, fail: bool) {
        self.fail_channel_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_channel_deletion(&self, fail: bool) {
        self.fail_channel_delete.store(fail, Ordering::SeqCst);
    }

    pub fn close_direct_messages(&self, user: UserId) {
        self.state().closed_dms.insert(user);
    }

    pub fn channel(&self, id: ChannelId) -> Option<ChannelRecord> {
        self.state().channels.get(&id).cloned()
    }

    pub fn live_channels(&self) -> Vec<ChannelRecord> {
        let mut channels: Vec<ChannelRecord> = self.state().channels.values().cloned().collect();
        channels.sort_by_key(|c| c.id);
        channels
    }

    pub fn was_deleted(&self, id: ChannelId) -> bool {
        self.state().deleted.contains(&id)
    }

    pub fn channel_notices(&self, channel: ChannelId) -> Vec<Notice> {
        self.state()
            .channel_notices
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub fn direct_notices(&self, user: UserId) -> Vec<Notice> {
        self.state()
            .direct_notices
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, n)| n.clone())
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for InMemoryChat {
    async fn create_private_channel(
        &self,
        parent: Option<ChannelId>,
        name: &str,
        grants: &[PermissionGrant],
    ) -> Result<ChannelId, ChatError> {
        if self.fail_channel_create.load(Ordering::SeqCst) {
            return Err(ChatError::ChannelCreate(format!("{name}: missing permissions")));
        }
        let mut state = self.state();
        state.next_channel += 1;
        let id = ChannelId(10_000 + state.next_channel);
        state.channels.insert(
            id,
            ChannelRecord {
                id,
                parent,
                name: name.to_string(),
                grants: grants.to_vec(),
            },
        );
        debug!(channel = %id, name, "Channel created");
        Ok(id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), ChatError> {
        if self.fail_channel_delete.load(Ordering::SeqCst) {
            return Err(ChatError::ChannelDelete(channel));
        }
        let mut state = self.state();
        state
            .channels
            .remove(&channel)
            .ok_or(ChatError::ChannelDelete(channel))?;
        state.deleted.push(channel);
        Ok(())
    }

    async fn send_channel_notice(&self, channel: ChannelId, notice: &Notice) -> Result<(), ChatError> {
        let mut state = self.state();
        if !state.channels.contains_key(&channel) && state.deleted.contains(&channel) {
            return Err(ChatError::Delivery(format!("channel {channel} no longer exists")));
        }
        state.channel_notices.push((channel, notice.clone()));
        Ok(())
    }

    async fn send_direct_notice(&self, user: UserId, notice: &Notice) -> Result<(), ChatError> {
        let mut state = self.state();
        if state.closed_dms.contains(&user) {
            return Err(ChatError::DirectMessagesClosed(user));
        }
        state.direct_notices.push((user, notice.clone()));
        Ok(())
    }
}
