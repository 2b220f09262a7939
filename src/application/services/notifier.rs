use crate::domain::entities::ChatIdentity;
use crate::domain::ports::{NotificationGateway, UserRepository};
use std::sync::Arc;

/// Best-effort delivery. Failures are logged and counted, never returned.
#[derive(Clone)]
pub struct Notifier {
    gateway: Arc<dyn NotificationGateway>,
    users: Arc<dyn UserRepository>,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn NotificationGateway>, users: Arc<dyn UserRepository>) -> Self {
        Self { gateway, users }
    }

    /// Returns whether the message was handed over to the transport.
    pub async fn notify(&self, identity: ChatIdentity, text: &str) -> bool {
        match self.gateway.send(identity, text).await {
            Ok(()) => true,
            Err(e) => {
                metrics::counter!("notifications_failed_total").increment(1);
                tracing::warn!(identity, error = %e, "Failed to deliver notification");
                false
            }
        }
    }

    pub async fn notify_admins(&self, text: &str) -> usize {
        let admins = match self.users.list_admin_identities().await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::error!(error = %e, "Cannot load admin identities for broadcast");
                return 0;
            }
        };

        let mut delivered = 0;
        for admin in admins {
            if self.notify(admin, text).await {
                delivered += 1;
            }
        }
        delivered
    }
}
