pub mod admin_alerts;
pub mod booking_engine;
pub mod directory_service;
pub mod feedback_service;
pub mod notifier;
pub mod reconciliation;
pub mod slot_store;
pub mod stats_service;
pub mod user_service;

pub use admin_alerts::AdminBroadcastSink;
pub use booking_engine::BookingEngine;
pub use directory_service::DirectoryService;
pub use feedback_service::FeedbackService;
pub use notifier::Notifier;
pub use reconciliation::{ReconciliationService, RegenerationReport, TickReport};
pub use slot_store::SlotStore;
pub use stats_service::StatsService;
pub use user_service::UserService;
