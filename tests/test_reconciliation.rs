mod helpers;

use helpers::*;
use slotdesk::application::flows::FormState;
use slotdesk::domain::entities::ClosureOutcome;
use slotdesk::infrastructure::runtime::tokio::TokioTaskSpawner;
use slotdesk::infrastructure::workers::ReconciliationWorker;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_regeneration_fills_working_days_once() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let reconciliation = &env.app.reconciliation;

    // Tue..Fri plus next Monday, three times a day; Tuesday 10:00 came with onboarding
    let first = reconciliation.regenerate_pass().await.unwrap();
    assert_eq!(first.created, 14);

    let second = reconciliation.regenerate_pass().await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.pruned, 0);

    let slots = env.app.services.slots.list_all(specialist.id).await.unwrap();
    assert_eq!(slots.len(), 15);
    assert!(slots
        .iter()
        .all(|slot| !["2030-01-12", "2030-01-13"].contains(&slot.at.date_key().as_str())));
    assert_eq!(
        env.count(
            "SELECT COUNT(*) FROM (SELECT specialist_id, date, time FROM slots
             GROUP BY specialist_id, date, time HAVING COUNT(*) > 1)"
        )
        .await,
        0
    );
}

#[tokio::test]
async fn test_regeneration_prunes_only_stale_free_slots() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    let free = env.slot(&specialist, "2030-01-07", "09:30").await;
    let booked = env.slot(&specialist, "2030-01-07", "09:45").await;
    env.app
        .services
        .bookings
        .reserve(client.id, booked.id)
        .await
        .unwrap();

    // Inside the grace window nothing goes
    env.clock.set(local("2030-01-07", "09:33"));
    let report = env.app.reconciliation.regenerate_pass().await.unwrap();
    assert_eq!(report.pruned, 0);

    env.clock.set(local("2030-01-07", "10:00"));
    let report = env.app.reconciliation.regenerate_pass().await.unwrap();
    assert_eq!(report.pruned, 1);

    let slots = &env.app.services.slots;
    assert!(slots.get(free.id).await.is_err());
    assert!(slots.get(booked.id).await.unwrap().is_booked);
}

#[tokio::test]
async fn test_expiry_closes_each_booking_once() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    let past = env.slot(&specialist, "2030-01-07", "10:00").await;
    let future = env.slot(&specialist, "2030-01-07", "16:00").await;

    let bookings = &env.app.services.bookings;
    bookings.reserve(client.id, past.id).await.unwrap();
    bookings.reserve(client.id, future.id).await.unwrap();

    env.clock.set(local("2030-01-07", "10:30"));
    assert_eq!(env.app.reconciliation.expire_pass().await.unwrap(), 1);
    assert_eq!(env.app.reconciliation.expire_pass().await.unwrap(), 0);

    let history = bookings.history_for_user(client.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].slot_id, past.id);
    assert_eq!(history[0].outcome, ClosureOutcome::Expired);
    assert!(history[0].closed_at >= history[0].created_at);

    assert!(!env.app.services.slots.get(past.id).await.unwrap().is_booked);
    assert!(env.app.services.slots.get(future.id).await.unwrap().is_booked);
}

#[tokio::test]
async fn test_reminder_windows() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let tomorrow = env.client(301, "Tomorrow").await;
    let later = env.client(302, "Later").await;
    let soon = env.client(303, "Soon").await;

    // now is Monday 09:00
    let in_23h30 = env.slot(&specialist, "2030-01-08", "08:30").await;
    let in_1h30 = env.slot(&specialist, "2030-01-07", "10:30").await;
    let in_45m = env.slot(&specialist, "2030-01-07", "09:45").await;

    let bookings = &env.app.services.bookings;
    bookings.reserve(tomorrow.id, in_23h30.id).await.unwrap();
    bookings.reserve(later.id, in_1h30.id).await.unwrap();
    bookings.reserve(soon.id, in_45m.id).await.unwrap();
    env.surface.clear();

    assert_eq!(env.app.reconciliation.reminder_pass().await.unwrap(), 2);

    let to_tomorrow = env.surface.texts_to(301);
    assert_eq!(to_tomorrow.len(), 1);
    assert!(to_tomorrow[0].contains("tomorrow"));

    assert!(env.surface.texts_to(302).is_empty());

    let to_soon = env.surface.texts_to(303);
    assert_eq!(to_soon.len(), 1);
    assert!(to_soon[0].contains("within the hour"));

    // Claimed reminders are not repeated on the next tick
    env.clock.advance(chrono::Duration::minutes(1));
    assert_eq!(env.app.reconciliation.reminder_pass().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_reminder_is_retried_later() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    let slot = env.slot(&specialist, "2030-01-07", "09:45").await;
    env.app
        .services
        .bookings
        .reserve(client.id, slot.id)
        .await
        .unwrap();

    env.surface.set_failing(true);
    assert_eq!(env.app.reconciliation.reminder_pass().await.unwrap(), 0);

    env.surface.set_failing(false);
    env.clock.advance(chrono::Duration::minutes(1));
    assert_eq!(env.app.reconciliation.reminder_pass().await.unwrap(), 1);
}

#[tokio::test]
async fn test_tick_runs_every_pass() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    let slot = env.slot(&specialist, "2030-01-07", "09:30").await;
    env.app
        .services
        .bookings
        .reserve(client.id, slot.id)
        .await
        .unwrap();

    env.clock.set(local("2030-01-07", "09:40"));
    let report = env.app.reconciliation.run_tick().await;

    assert!(report.is_clean());
    assert_eq!(report.expired, 1);
    assert!(report.regeneration.created > 0);
}

#[tokio::test]
async fn test_failing_pass_is_alerted_and_others_still_run() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    let past = env.slot(&specialist, "2030-01-07", "09:30").await;
    let soon = env.slot(&specialist, "2030-01-07", "10:30").await;
    let bookings = &env.app.services.bookings;
    bookings.reserve(client.id, past.id).await.unwrap();
    bookings.reserve(client.id, soon.id).await.unwrap();

    // The reminder ledger is gone, so only the reminder pass can fail
    sqlx::query("DROP TABLE booking_reminders")
        .execute(env.db.pool())
        .await
        .unwrap();
    env.surface.clear();

    env.clock.set(local("2030-01-07", "09:40"));
    let report = env.app.reconciliation.run_tick().await;

    assert_eq!(report.failed_passes, vec!["reminder"]);
    assert!(!report.is_clean());
    assert_eq!(report.expired, 1);
    assert!(report.regeneration.created > 0);
    assert_eq!(report.reminders, 0);

    assert!(env
        .surface
        .texts_to(ADMIN_ID)
        .iter()
        .any(|text| text.contains("Scheduler reminder pass failed")));
}

#[tokio::test]
async fn test_worker_tick_is_single_flight() {
    let env = setup_env().await;
    env.specialist(200, "Anna").await;

    let worker = ReconciliationWorker::new(
        env.app.reconciliation.clone(),
        env.app.sessions.clone(),
        Arc::new(TokioTaskSpawner::new()),
    );

    let (first, second) = tokio::join!(worker.tick(), worker.tick());
    assert!(first.is_some());
    assert!(second.is_none());

    // Once the first finished, ticks run again
    assert!(worker.tick().await.is_some());
}

#[tokio::test]
async fn test_worker_tick_sweeps_idle_sessions() {
    let env = setup_env_with_ttl(Duration::ZERO).await;
    env.app
        .sessions
        .set_form(77, FormState::AwaitingFeedbackText { user: 1 })
        .await;
    assert_eq!(env.app.sessions.len().await, 1);

    let worker = ReconciliationWorker::new(
        env.app.reconciliation.clone(),
        env.app.sessions.clone(),
        Arc::new(TokioTaskSpawner::new()),
    );
    worker.tick().await;

    assert_eq!(env.app.sessions.len().await, 0);
}
