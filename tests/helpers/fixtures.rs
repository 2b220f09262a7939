use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use slotdesk::bootstrap::{build_components, Components};
use slotdesk::config::SchedulerSettings;
use slotdesk::domain::entities::{NewSpecialist, Slot, SlotTime, Specialist, User, UserRole};
use slotdesk::infrastructure::persistence::Database;
use slotdesk::infrastructure::runtime::tokio::FixedClock;
use std::sync::Arc;
use std::time::Duration;

use super::recording::RecordingSurface;
use super::test_db::setup_test_db;

pub const ADMIN_ID: i64 = 1000;

pub fn local(date: &str, time: &str) -> NaiveDateTime {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let time = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
    date.and_time(time)
}

pub fn slot_time(date: &str, time: &str) -> SlotTime {
    SlotTime::from_local(local(date, time))
}

/// Monday morning; the clock starts here in every test.
pub fn monday_morning() -> NaiveDateTime {
    local("2030-01-07", "09:00")
}

pub struct TestEnv {
    pub db: Database,
    pub surface: RecordingSurface,
    pub clock: FixedClock,
    pub app: Components,
}

pub async fn setup_env() -> TestEnv {
    setup_env_with_ttl(Duration::from_secs(60)).await
}

pub async fn setup_env_with_ttl(flow_ttl: Duration) -> TestEnv {
    let db = setup_test_db().await;
    let surface = RecordingSurface::new();
    let clock = FixedClock::new(monday_morning());

    let app = build_components(
        &db,
        Arc::new(surface.clone()),
        Arc::new(surface.clone()),
        Arc::new(clock.clone()),
        SchedulerSettings::default(),
        flow_ttl,
    );

    app.services
        .users
        .seed_admins(&[ADMIN_ID])
        .await
        .expect("Failed to seed admin");

    TestEnv {
        db,
        surface,
        clock,
        app,
    }
}

impl TestEnv {
    pub async fn client(&self, identity: i64, name: &str) -> User {
        self.app.services.users.register(identity, name).await.unwrap()
    }

    pub async fn admin(&self) -> User {
        self.app
            .services
            .users
            .find_by_identity(ADMIN_ID)
            .await
            .unwrap()
            .unwrap()
    }

    /// Onboards a specialist whose first slot is Tuesday 10:00.
    pub async fn specialist(&self, identity: i64, name: &str) -> Specialist {
        self.app
            .services
            .directory
            .onboard(NewSpecialist {
                telegram_identity: identity,
                name: name.to_string(),
                specialization: "Massage".to_string(),
                description: "Experienced".to_string(),
                first_service: "Back massage".to_string(),
                first_slot: slot_time("2030-01-08", "10:00"),
            })
            .await
            .unwrap()
    }

    pub async fn slot(&self, specialist: &Specialist, date: &str, time: &str) -> Slot {
        self.app
            .services
            .slots
            .create(specialist.id, slot_time(date, time))
            .await
            .unwrap()
    }

    pub async fn promote(&self, identity: i64, role: UserRole) -> User {
        self.app
            .services
            .users
            .promote(identity, "Promoted", role)
            .await
            .unwrap()
    }

    pub async fn count(&self, sql: &str) -> i64 {
        use sqlx::Row;
        sqlx::query(sql)
            .fetch_one(self.db.pool())
            .await
            .unwrap()
            .try_get::<i64, _>(0)
            .unwrap()
    }
}
