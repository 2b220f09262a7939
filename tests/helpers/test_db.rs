use slotdesk::infrastructure::persistence::Database;
use uuid::Uuid;

/// Fresh file-backed SQLite database with the real migrations applied.
pub async fn setup_test_db() -> Database {
    // Unique file per test so tests can run in parallel
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}
