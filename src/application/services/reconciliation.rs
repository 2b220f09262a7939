use crate::application::services::booking_engine::BookingEngine;
use crate::application::services::notifier::Notifier;
use crate::config::SchedulerSettings;
use crate::domain::entities::{BookingDetails, ReminderKind, SlotTime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{
    AlertSink, BookingRepository, Clock, DirectoryRepository, Severity, SlotRepository,
};
use crate::shared::utils::datetime::{hours_until, timestamp};
use chrono::{Datelike, Weekday};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    pub pruned: u64,
    pub created: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub expired: usize,
    pub regeneration: RegenerationReport,
    pub reminders: usize,
    pub failed_passes: Vec<&'static str>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failed_passes.is_empty()
    }
}

/// The three periodic passes: expiry, regeneration and reminders.
#[derive(Clone)]
pub struct ReconciliationService {
    engine: BookingEngine,
    bookings: Arc<dyn BookingRepository>,
    slots: Arc<dyn SlotRepository>,
    directory: Arc<dyn DirectoryRepository>,
    notifier: Notifier,
    alerts: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
}

impl ReconciliationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: BookingEngine,
        bookings: Arc<dyn BookingRepository>,
        slots: Arc<dyn SlotRepository>,
        directory: Arc<dyn DirectoryRepository>,
        notifier: Notifier,
        alerts: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            engine,
            bookings,
            slots,
            directory,
            notifier,
            alerts,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Runs every pass; a failing pass is reported and does not stop the others.
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::default();

        match self.expire_pass().await {
            Ok(expired) => report.expired = expired,
            Err(e) => {
                self.pass_failed("expiry", &e).await;
                report.failed_passes.push("expiry");
            }
        }

        match self.regenerate_pass().await {
            Ok(regeneration) => report.regeneration = regeneration,
            Err(e) => {
                self.pass_failed("regeneration", &e).await;
                report.failed_passes.push("regeneration");
            }
        }

        match self.reminder_pass().await {
            Ok(sent) => report.reminders = sent,
            Err(e) => {
                self.pass_failed("reminder", &e).await;
                report.failed_passes.push("reminder");
            }
        }

        report
    }

    async fn pass_failed(&self, pass: &str, error: &DomainError) {
        tracing::error!(pass, error = %error, "Reconciliation pass failed");
        self.alerts
            .alert(
                Severity::Error,
                &format!("Scheduler {} pass failed: {}", pass, error),
            )
            .await;
    }

    /// Expires every booking whose slot started before now. Each booking is
    /// its own transaction; one failure does not hold back the rest.
    pub async fn expire_pass(&self) -> DomainResult<usize> {
        let mut expired = 0;

        for booking in self.engine.expirable().await? {
            match self.engine.expire(booking.booking_id).await {
                Ok(Some(_)) => expired += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(booking_id = booking.booking_id, error = %e, "Failed to expire booking");
                    self.alerts
                        .alert(
                            Severity::Error,
                            &format!("Failed to expire booking #{}: {}", booking.booking_id, e),
                        )
                        .await;
                }
            }
        }

        if expired > 0 {
            tracing::info!(expired, "Expired past bookings");
        }
        Ok(expired)
    }

    /// Prunes stale free slots, then tops up the rolling window of working days.
    /// Inserts are keyed on (specialist, date, time) so reruns add nothing.
    pub async fn regenerate_pass(&self) -> DomainResult<RegenerationReport> {
        let now = self.clock.local_now();
        let cutoff = SlotTime::from_local(now - self.settings.expiry_grace);

        let pruned = self.slots.prune_free_slots_before(cutoff).await?;
        metrics::counter!("slots_pruned_total").increment(pruned);

        let specialists = self.directory.list_specialists().await?;
        let today = now.date();
        let mut created = 0;

        for offset in 1..=i64::from(self.settings.regeneration_days) {
            let date = today + chrono::Duration::days(offset);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            for specialist in &specialists {
                for &time in &self.settings.daily_times {
                    if self
                        .slots
                        .insert_slot_if_absent(specialist.id, SlotTime::new(date, time))
                        .await?
                    {
                        created += 1;
                    }
                }
            }
        }
        metrics::counter!("slots_generated_total").increment(created);

        if pruned > 0 || created > 0 {
            tracing::info!(pruned, created, "Slot window regenerated");
        }
        Ok(RegenerationReport { pruned, created })
    }

    /// Sends the "tomorrow" and "starting soon" reminders. Each (booking, kind)
    /// is claimed in the ledger before sending, so it goes out at most once.
    pub async fn reminder_pass(&self) -> DomainResult<usize> {
        let now = self.clock.local_now();
        let mut sent = 0;

        for booking in self.bookings.list_live_bookings().await? {
            let Some(kind) = ReminderKind::for_hours_until(hours_until(&booking.at, now)) else {
                continue;
            };

            if !self
                .bookings
                .claim_reminder(booking.booking_id, kind, &timestamp(self.clock.now_utc()))
                .await?
            {
                continue;
            }

            if self
                .notifier
                .notify(booking.client_identity, &reminder_text(&booking, kind))
                .await
            {
                metrics::counter!("reminders_sent_total", "kind" => kind.as_str()).increment(1);
                sent += 1;
            } else {
                // Let a later tick inside the window retry
                self.bookings
                    .release_reminder(booking.booking_id, kind)
                    .await?;
            }
        }

        Ok(sent)
    }
}

fn reminder_text(booking: &BookingDetails, kind: ReminderKind) -> String {
    match kind {
        ReminderKind::Tomorrow => format!(
            "⏰ Reminder: you have an appointment tomorrow at {} with {} ({}).",
            booking.at, booking.specialist_name, booking.specialization
        ),
        ReminderKind::Soon => format!(
            "⏰ Reminder: your appointment with {} ({}) starts within the hour, at {}.",
            booking.specialist_name, booking.specialization, booking.at
        ),
    }
}
