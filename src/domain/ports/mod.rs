pub mod alert_sink;
pub mod booking_repository;
pub mod clock;
pub mod directory_repository;
pub mod feedback_repository;
pub mod notification_gateway;
pub mod slot_repository;
pub mod stats_repository;
pub mod task_spawner;
pub mod user_repository;

pub use alert_sink::{AlertSink, Severity};
pub use booking_repository::BookingRepository;
pub use clock::Clock;
pub use directory_repository::DirectoryRepository;
pub use feedback_repository::FeedbackRepository;
pub use notification_gateway::{Button, ChatSurface, NotificationGateway, Screen};
pub use slot_repository::SlotRepository;
pub use stats_repository::{StatsRepository, SystemStats};
pub use task_spawner::TaskSpawner;
pub use user_repository::UserRepository;
