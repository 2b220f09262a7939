pub mod booking;
pub mod feedback;
pub mod slot;
pub mod specialist;
pub mod user;

pub use booking::*;
pub use feedback::*;
pub use slot::*;
pub use specialist::*;
pub use user::*;
