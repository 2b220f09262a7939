use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;

use crate::application::flows::{ChatRouter, ChatServices, SessionStore};
use crate::application::services::*;
use crate::config::{Config, SchedulerSettings};
use crate::domain::errors::DomainResult;
use crate::domain::ports::{
    AlertSink, BookingRepository, ChatSurface, Clock, DirectoryRepository, FeedbackRepository,
    NotificationGateway, SlotRepository, StatsRepository, TaskSpawner, UserRepository,
};
use crate::infrastructure::persistence::Database;
use crate::infrastructure::runtime::tokio::{SystemClock, TokioTaskSpawner};
use crate::infrastructure::telegram::TelegramGateway;
use crate::infrastructure::workers::ReconciliationWorker;

/// Everything built on top of the database, independent of the transport.
#[derive(Clone)]
pub struct Components {
    pub services: ChatServices,
    pub sessions: SessionStore,
    pub router: ChatRouter,
    pub reconciliation: ReconciliationService,
    pub alerts: Arc<dyn AlertSink>,
}

/// Wires services over `db`. Tests call this with recording adapters and a fixed clock.
pub fn build_components(
    db: &Database,
    gateway: Arc<dyn NotificationGateway>,
    surface: Arc<dyn ChatSurface>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
    flow_ttl: Duration,
) -> Components {
    let users: Arc<dyn UserRepository> = Arc::new(db.clone());
    let directory: Arc<dyn DirectoryRepository> = Arc::new(db.clone());
    let slots: Arc<dyn SlotRepository> = Arc::new(db.clone());
    let bookings: Arc<dyn BookingRepository> = Arc::new(db.clone());
    let feedback: Arc<dyn FeedbackRepository> = Arc::new(db.clone());
    let stats: Arc<dyn StatsRepository> = Arc::new(db.clone());

    let notifier = Notifier::new(gateway, users.clone());
    let alerts: Arc<dyn AlertSink> = Arc::new(AdminBroadcastSink::new(notifier.clone()));

    let engine = BookingEngine::new(
        bookings.clone(),
        slots.clone(),
        notifier.clone(),
        clock.clone(),
    );

    let reconciliation = ReconciliationService::new(
        engine.clone(),
        bookings,
        slots.clone(),
        directory.clone(),
        notifier.clone(),
        alerts.clone(),
        clock.clone(),
        settings,
    );

    let services = ChatServices {
        users: UserService::new(users.clone()),
        directory: DirectoryService::new(directory, users.clone(), clock.clone()),
        slots: SlotStore::new(slots, clock.clone()),
        bookings: engine,
        feedback: FeedbackService::new(feedback, users, notifier, clock.clone()),
        stats: StatsService::new(stats, clock),
    };

    let sessions = SessionStore::new(flow_ttl);
    let router = ChatRouter::new(services.clone(), sessions.clone(), surface, alerts.clone());

    Components {
        services,
        sessions,
        router,
        reconciliation,
        alerts,
    }
}

pub struct App {
    pub bot: Bot,
    pub components: Components,
    pub worker: ReconciliationWorker,
}

/// Production wiring: Telegram transport, wall clock in the business zone.
pub async fn build_app(db: Database, config: &Config) -> DomainResult<App> {
    let bot = Bot::new(&config.telegram_token);
    let gateway = Arc::new(TelegramGateway::new(
        bot.clone(),
        config.outbound_messages_per_second,
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.business_timezone));
    let spawner: Arc<dyn TaskSpawner> = Arc::new(TokioTaskSpawner::new());

    let components = build_components(
        &db,
        gateway.clone(),
        gateway,
        clock,
        config.scheduler.clone(),
        config.flow_ttl,
    );

    components
        .services
        .users
        .seed_admins(&config.admin_identities)
        .await?;
    tracing::info!(
        admins = config.admin_identities.len(),
        zone = %config.business_timezone,
        "Services initialized"
    );

    let worker = ReconciliationWorker::new(
        components.reconciliation.clone(),
        components.sessions.clone(),
        spawner,
    );

    Ok(App {
        bot,
        components,
        worker,
    })
}
