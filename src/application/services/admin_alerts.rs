use crate::application::services::notifier::Notifier;
use crate::domain::ports::{AlertSink, Severity};
use async_trait::async_trait;

/// Broadcasts operational alerts to every admin identity.
#[derive(Clone)]
pub struct AdminBroadcastSink {
    notifier: Notifier,
}

impl AdminBroadcastSink {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl AlertSink for AdminBroadcastSink {
    async fn alert(&self, severity: Severity, message: &str) {
        metrics::counter!("admin_alerts_total", "severity" => severity.as_str()).increment(1);

        match severity {
            Severity::Error => tracing::error!(alert = %message, "Admin alert"),
            Severity::Warning => tracing::warn!(alert = %message, "Admin alert"),
            Severity::Info => tracing::info!(alert = %message, "Admin alert"),
        }

        let icon = match severity {
            Severity::Error => "🚨",
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        };
        self.notifier
            .notify_admins(&format!("{} {}", icon, message))
            .await;
    }
}
