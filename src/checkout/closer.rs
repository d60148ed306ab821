use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument};
use crate::clients::TicketClient;
use crate::domain::PendingClose;
use crate::platform::ChatPlatform;
use crate::ticket_actor::TicketError;

/// Runs deferred ticket closes.
///
/// The deadline lives on the ticket (`close_after`), so the timers here are
/// disposable: after a restart `recover` re-arms whatever is still pending.
/// Channel deletion is best-effort; the ticket is marked closed either way.
#[derive(Clone)]
pub struct CloseScheduler {
    tickets: TicketClient,
    chat: Arc<dyn ChatPlatform>,
}

impl CloseScheduler {
    pub fn new(tickets: TicketClient, chat: Arc<dyn ChatPlatform>) -> Self {
        Self { tickets, chat }
    }

    pub fn schedule(&self, pending: PendingClose) -> JoinHandle<()> {
        let scheduler = self.clone();
        let span = tracing::info_span!("deferred_close", code = %pending.code);
        tokio::spawn(
            async move {
                let wait = (pending.close_after - Utc::now()).to_std().unwrap_or_default();
                debug!(wait_secs = wait.as_secs(), "Waiting to close ticket");
                tokio::time::sleep(wait).await;
                scheduler.finish(pending).await;
            }
            .instrument(span),
        )
    }

    async fn finish(&self, pending: PendingClose) {
        if let Err(e) = self.chat.delete_channel(pending.channel).await {
            warn!(error = %e, channel = %pending.channel, "Channel deletion failed, closing ticket anyway");
        }
        match self.tickets.complete_close(pending.code).await {
            Ok(true) => info!("Ticket closed"),
            Ok(false) => debug!("Ticket was already closed"),
            Err(e) => warn!(error = %e, "Could not mark ticket closed"),
        }
    }

    /// Re-arms every pending close; overdue ones run immediately.
    #[instrument(skip(self))]
    pub async fn recover(&self, now: DateTime<Utc>) -> Result<Vec<JoinHandle<()>>, TicketError> {
        let pending = self.tickets.pending_closures().await?;
        let overdue = pending.iter().filter(|p| p.close_after <= now).count();
        info!(pending = pending.len(), overdue, "Recovering deferred closes");
        Ok(pending.into_iter().map(|p| self.schedule(p)).collect())
    }
}
