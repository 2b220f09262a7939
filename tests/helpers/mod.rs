#![allow(dead_code, unused_imports)]
pub mod fixtures;
pub mod recording;
pub mod test_db;

pub use fixtures::*;
pub use recording::*;
pub use test_db::*;
