mod helpers;

use helpers::*;
use slotdesk::application::flows::{Command, EventKind, EventSender, InboundEvent};
use slotdesk::domain::entities::Specialist;
use std::time::Duration;

async fn send(env: &TestEnv, identity: i64, kind: EventKind) {
    env.app
        .router
        .handle(InboundEvent {
            chat: identity,
            sender: EventSender {
                identity,
                display_name: format!("User {}", identity),
            },
            kind,
        })
        .await;
}

async fn command(env: &TestEnv, identity: i64, command: Command) {
    send(env, identity, EventKind::Command(command)).await;
}

async fn tap(env: &TestEnv, identity: i64, payload: &str) {
    send(
        env,
        identity,
        EventKind::Callback {
            data: payload.to_string(),
            message_id: 1,
        },
    )
    .await;
}

async fn text(env: &TestEnv, identity: i64, answer: &str) {
    send(env, identity, EventKind::Text(answer.to_string())).await;
}

fn last_text(env: &TestEnv, chat: i64) -> String {
    env.surface.last_to(chat).map(|o| o.text).unwrap_or_default()
}

fn last_payloads(env: &TestEnv, chat: i64) -> Vec<String> {
    env.surface
        .last_to(chat)
        .map(|o| o.payloads)
        .unwrap_or_default()
}

async fn first_service(env: &TestEnv, specialist: &Specialist) -> i64 {
    env.app
        .services
        .directory
        .list_services(specialist.id)
        .await
        .unwrap()[0]
        .id
}

#[tokio::test]
async fn test_start_menu_depends_on_role() {
    let env = setup_env().await;

    command(&env, 300, Command::Start).await;
    let client_buttons = last_payloads(&env, 300);
    assert!(client_buttons.contains(&"book".to_string()));
    assert!(!client_buttons.contains(&"admin".to_string()));

    command(&env, ADMIN_ID, Command::Start).await;
    assert!(last_payloads(&env, ADMIN_ID).contains(&"admin".to_string()));
}

#[tokio::test]
async fn test_client_books_through_menus() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let service = first_service(&env, &specialist).await;

    tap(&env, 300, "book").await;
    assert!(last_payloads(&env, 300).contains(&format!("spec:{}", specialist.id)));

    tap(&env, 300, &format!("spec:{}", specialist.id)).await;
    assert!(last_payloads(&env, 300).contains(&format!("svc:{}:{}", specialist.id, service)));

    tap(&env, 300, &format!("svc:{}:{}", specialist.id, service)).await;
    let picker = env.surface.last_to(300).unwrap();
    assert_eq!(picker.edited, Some(1));
    let pick = picker
        .payloads
        .iter()
        .find(|p| p.starts_with("pick:"))
        .cloned()
        .unwrap();

    tap(&env, 300, &pick).await;

    assert_eq!(env.count("SELECT COUNT(*) FROM bookings").await, 1);
    assert!(env
        .surface
        .texts_to(300)
        .iter()
        .any(|t| t.contains("You are booked")));
    assert!(env
        .surface
        .texts_to(200)
        .iter()
        .any(|t| t.contains("New booking")));
}

#[tokio::test]
async fn test_slot_picker_clamps_page_and_edits_in_place() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let service = first_service(&env, &specialist).await;
    for date in ["2030-01-09", "2030-01-10", "2030-01-11"] {
        for time in ["08:00", "09:00", "10:00", "11:00"] {
            env.slot(&specialist, date, time).await;
        }
    }

    // 13 free slots, 10 per page
    tap(&env, 300, &format!("page:5:{}:{}", specialist.id, service)).await;

    let page = env.surface.last_to(300).unwrap();
    assert_eq!(page.edited, Some(1));
    assert!(page.text.contains("page 2 of 2"));
    assert_eq!(page.payloads.iter().filter(|p| p.starts_with("pick:")).count(), 3);
    assert!(page
        .payloads
        .contains(&format!("page:0:{}:{}", specialist.id, service)));
    assert!(!page
        .payloads
        .contains(&format!("page:2:{}:{}", specialist.id, service)));
}

#[tokio::test]
async fn test_conflict_reply_offers_retry_and_alerts_admins() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let winner = env.client(300, "Kate").await;
    let slot = env.slot(&specialist, "2030-01-09", "14:00").await;
    env.app
        .services
        .bookings
        .reserve(winner.id, slot.id)
        .await
        .unwrap();
    env.surface.clear();

    tap(&env, 301, &format!("pick:{}", slot.id)).await;

    let reply = env.surface.last_to(301).unwrap();
    assert!(reply.text.contains("already booked"));
    assert_eq!(reply.payloads, vec!["book".to_string()]);
    assert!(!env.surface.texts_to(ADMIN_ID).is_empty());
}

#[tokio::test]
async fn test_admin_onboards_specialist_step_by_step() {
    let env = setup_env().await;

    tap(&env, ADMIN_ID, "admin:addspec").await;
    assert!(last_text(&env, ADMIN_ID).contains("Telegram ID"));

    text(&env, ADMIN_ID, "not a number").await;
    assert!(last_text(&env, ADMIN_ID).contains("must be a number"));

    text(&env, ADMIN_ID, "555").await;
    text(&env, ADMIN_ID, "Anna").await;
    text(&env, ADMIN_ID, "Massage").await;
    text(&env, ADMIN_ID, "Ten years of practice").await;
    text(&env, ADMIN_ID, "Back massage").await;

    // Invalid date keeps the form on the slot step
    text(&env, ADMIN_ID, "2030-13-01 10:00").await;
    assert!(last_text(&env, ADMIN_ID).contains("YYYY-MM-DD HH:MM"));
    assert_eq!(env.count("SELECT COUNT(*) FROM specialists").await, 0);

    text(&env, ADMIN_ID, "2030-01-08 10:00").await;
    assert!(last_text(&env, ADMIN_ID).contains("Specialist Anna added"));

    let specialist = env
        .app
        .services
        .users
        .find_by_identity(555)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(specialist.role.as_str(), "specialist");
    assert_eq!(env.count("SELECT COUNT(*) FROM services").await, 1);
    assert_eq!(env.count("SELECT COUNT(*) FROM slots").await, 1);

    // Form is finished
    text(&env, ADMIN_ID, "anything").await;
    assert!(last_text(&env, ADMIN_ID).contains("/start"));
}

#[tokio::test]
async fn test_specialist_keeps_registered_name_after_contact() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna Petrova").await;

    command(&env, 200, Command::Start).await;
    assert!(last_text(&env, 200).contains("Anna Petrova"));

    let listed = env.app.services.directory.list_specialists().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Anna Petrova");
    assert_eq!(
        env.app
            .services
            .directory
            .get_specialist(specialist.id)
            .await
            .unwrap()
            .name,
        "Anna Petrova"
    );

    // A plain client still follows the chat display name
    env.client(300, "Old name").await;
    command(&env, 300, Command::Start).await;
    assert!(last_text(&env, 300).contains("User 300"));
}

#[tokio::test]
async fn test_existing_specialist_is_rejected_at_identity_step() {
    let env = setup_env().await;
    env.specialist(200, "Anna").await;

    tap(&env, ADMIN_ID, "admin:addspec").await;
    text(&env, ADMIN_ID, "200").await;
    assert!(last_text(&env, ADMIN_ID).contains("already registered"));

    // Still waiting for an identity
    text(&env, ADMIN_ID, "201").await;
    assert!(last_text(&env, ADMIN_ID).contains("name"));
}

#[tokio::test]
async fn test_past_slot_keeps_form_on_step() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;

    tap(&env, ADMIN_ID, &format!("slotfor:{}", specialist.id)).await;
    text(&env, ADMIN_ID, "2030-01-01 10:00").await;
    assert!(last_text(&env, ADMIN_ID).contains("future"));

    text(&env, ADMIN_ID, "2030-01-10 12:00").await;
    assert!(last_text(&env, ADMIN_ID).contains("10-01-2030 12:00"));
    assert_eq!(
        env.app.services.slots.list_all(specialist.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_rename_walk_covers_every_service() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    env.app
        .services
        .directory
        .add_service(specialist.id, "Neck massage")
        .await
        .unwrap();

    tap(&env, ADMIN_ID, &format!("editsvcfor:{}", specialist.id)).await;
    assert!(last_text(&env, ADMIN_ID).contains("1 of 2"));

    text(&env, ADMIN_ID, "Full back massage").await;
    assert!(last_text(&env, ADMIN_ID).contains("2 of 2"));

    text(&env, ADMIN_ID, "Full neck massage").await;

    let names: Vec<String> = env
        .app
        .services
        .directory
        .list_services(specialist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert!(names.contains(&"Full back massage".to_string()));
    assert!(names.contains(&"Full neck massage".to_string()));
}

#[tokio::test]
async fn test_new_form_supersedes_previous_one() {
    let env = setup_env().await;

    tap(&env, ADMIN_ID, "feedback").await;
    tap(&env, ADMIN_ID, "admin:addspec").await;
    assert!(env
        .surface
        .texts_to(ADMIN_ID)
        .iter()
        .any(|t| t.contains("feedback was discarded")));

    text(&env, ADMIN_ID, "12345").await;
    assert_eq!(env.count("SELECT COUNT(*) FROM feedback_requests").await, 0);
    assert!(last_text(&env, ADMIN_ID).contains("name"));
}

#[tokio::test]
async fn test_client_cannot_use_admin_actions() {
    let env = setup_env().await;

    tap(&env, 300, "admin:addspec").await;
    assert!(last_text(&env, 300).contains("not allowed"));
    assert!(!env.surface.texts_to(ADMIN_ID).is_empty());

    text(&env, 300, "555").await;
    assert!(last_text(&env, 300).contains("/start"));
}

#[tokio::test]
async fn test_other_specialist_cannot_edit_slot() {
    let env = setup_env().await;
    let owner = env.specialist(200, "Anna").await;
    env.specialist(201, "Boris").await;
    let slot = env.slot(&owner, "2030-01-09", "14:00").await;

    tap(&env, 201, &format!("delslot:{}", slot.id)).await;
    assert!(last_text(&env, 201).contains("not allowed"));
    assert!(env.app.services.slots.get(slot.id).await.is_ok());

    tap(&env, 200, &format!("delslot:{}", slot.id)).await;
    assert!(env.app.services.slots.get(slot.id).await.is_err());
}

#[tokio::test]
async fn test_specialist_reschedules_from_my_slots() {
    let env = setup_env().await;
    let specialist = env.specialist(200, "Anna").await;
    let slot = env.slot(&specialist, "2030-01-09", "14:00").await;

    tap(&env, 200, "myslots:0").await;
    assert!(last_payloads(&env, 200).contains(&format!("editslot:{}", slot.id)));

    tap(&env, 200, &format!("editslot:{}", slot.id)).await;
    text(&env, 200, "2030-01-09 16:00").await;

    let moved = env.app.services.slots.get(slot.id).await.unwrap();
    assert_eq!(moved.at, slot_time("2030-01-09", "16:00"));
    // The cached page was redrawn in place
    assert!(env
        .surface
        .to(200)
        .iter()
        .any(|o| o.edited == Some(1) && o.text.contains("09-01-2030 16:00")));
}

#[tokio::test]
async fn test_failed_commit_aborts_form() {
    let env = setup_env().await;

    tap(&env, ADMIN_ID, "reply:999").await;
    text(&env, ADMIN_ID, "Hello").await;
    assert!(last_text(&env, ADMIN_ID).contains("not found"));

    text(&env, ADMIN_ID, "Hello again").await;
    assert!(last_text(&env, ADMIN_ID).contains("/start"));
}

#[tokio::test]
async fn test_feedback_round_trip_through_chat() {
    let env = setup_env().await;

    tap(&env, 300, "feedback").await;
    text(&env, 300, "Please call me").await;
    assert!(last_text(&env, 300).contains("sent to the administrator"));

    command(&env, ADMIN_ID, Command::Admin).await;
    let card = env.surface.last_to(ADMIN_ID).unwrap();
    assert!(card.text.contains("Please call me"));
    let reply = card
        .payloads
        .iter()
        .find(|p| p.starts_with("reply:"))
        .cloned()
        .unwrap();

    tap(&env, ADMIN_ID, &reply).await;
    text(&env, ADMIN_ID, "Calling now").await;
    assert!(last_text(&env, 300).contains("Calling now"));
}

#[tokio::test]
async fn test_reset_and_stray_input() {
    let env = setup_env().await;

    text(&env, 300, "hello?").await;
    assert!(last_text(&env, 300).contains("/start"));

    tap(&env, 300, "feedback").await;
    command(&env, 300, Command::Reset).await;
    text(&env, 300, "Please call me").await;
    assert_eq!(env.count("SELECT COUNT(*) FROM feedback_requests").await, 0);

    tap(&env, 300, "garbage:payload:1").await;
    assert!(last_text(&env, 300).contains("/start again"));
}

#[tokio::test]
async fn test_idle_form_expires() {
    let env = setup_env_with_ttl(Duration::ZERO).await;

    tap(&env, 300, "feedback").await;
    text(&env, 300, "Please call me").await;

    assert_eq!(env.count("SELECT COUNT(*) FROM feedback_requests").await, 0);
    assert!(last_text(&env, 300).contains("/start"));
}
