mod helpers;

use helpers::*;
use slotdesk::domain::entities::FeedbackStatus;
use slotdesk::domain::errors::DomainError;

#[tokio::test]
async fn test_feedback_moves_forward_only() {
    let env = setup_env().await;
    let client = env.client(300, "Kate").await;
    let feedback = &env.app.services.feedback;

    let request = feedback.submit(client.id, "  Can I come earlier?  ").await.unwrap();
    assert_eq!(request.status, FeedbackStatus::New);
    assert_eq!(request.message, "Can I come earlier?");
    assert!(env.surface.texts_to(ADMIN_ID)[0].contains("Can I come earlier?"));

    let answered = feedback.respond(request.id, "Yes, at 9").await.unwrap();
    assert_eq!(answered.status, FeedbackStatus::InProgress);
    assert_eq!(answered.admin_response.as_deref(), Some("Yes, at 9"));
    assert!(env
        .surface
        .texts_to(300)
        .iter()
        .any(|text| text.contains("Yes, at 9")));

    let closed = feedback.close(request.id).await.unwrap();
    assert_eq!(closed.status, FeedbackStatus::Closed);

    assert!(matches!(
        feedback.respond(request.id, "Too late").await,
        Err(DomainError::Conflict(_))
    ));
    assert!(matches!(
        feedback.close(request.id).await,
        Err(DomainError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_active_feedback_is_newest_first_without_closed() {
    let env = setup_env().await;
    let client = env.client(300, "Kate").await;
    let feedback = &env.app.services.feedback;

    let first = feedback.submit(client.id, "first").await.unwrap();
    env.clock.advance(chrono::Duration::minutes(1));
    let second = feedback.submit(client.id, "second").await.unwrap();
    env.clock.advance(chrono::Duration::minutes(1));
    let third = feedback.submit(client.id, "third").await.unwrap();
    feedback.close(second.id).await.unwrap();

    let active: Vec<i64> = feedback
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|request| request.id)
        .collect();
    assert_eq!(active, vec![third.id, first.id]);
}

#[tokio::test]
async fn test_empty_feedback_is_rejected() {
    let env = setup_env().await;
    let client = env.client(300, "Kate").await;

    assert!(matches!(
        env.app.services.feedback.submit(client.id, "   ").await,
        Err(DomainError::Validation(_))
    ));
    assert_eq!(env.count("SELECT COUNT(*) FROM feedback_requests").await, 0);
}

#[tokio::test]
async fn test_stats_count_live_state() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let client = env.client(300, "Kate").await;
    env.client(301, "Olga").await;
    let today = env.slot(&specialist, "2030-01-07", "15:00").await;
    env.slot(&specialist, "2030-01-09", "15:00").await;
    env.app
        .services
        .bookings
        .reserve(client.id, today.id)
        .await
        .unwrap();

    let stats = env.app.services.stats.collect().await.unwrap();
    assert_eq!(stats.specialists, 1);
    assert_eq!(stats.clients, 2);
    assert_eq!(stats.live_bookings, 1);
    assert_eq!(stats.bookings_today, 1);
    assert_eq!(stats.booked_slots, 1);
    // onboarding slot plus the Wednesday one
    assert_eq!(stats.free_slots, 2);
}
