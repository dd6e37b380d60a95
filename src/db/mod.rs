// Re-export the Database struct and other public items
mod articles;
pub mod core;
mod feeds;
mod schema;
mod stats;

pub use self::core::Database;
pub use self::stats::{DailyCounter, DailyStats};
