pub mod flows;
pub mod services;
