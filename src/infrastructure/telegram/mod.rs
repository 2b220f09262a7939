pub mod dispatcher;
pub mod gateway;

pub use gateway::TelegramGateway;
