use slotdesk::bootstrap;
use slotdesk::config::Config;
use slotdesk::infrastructure::observability;
use slotdesk::infrastructure::persistence::Database;
use slotdesk::infrastructure::telegram::dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _observability = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    let app = bootstrap::build_app(db, &config).await?;

    // Reconciliation runs beside the dispatcher for the life of the process
    app.worker.start();

    dispatcher::run(app.bot, app.components.router).await;

    tracing::info!("Dispatcher stopped, shutting down");
    Ok(())
}
