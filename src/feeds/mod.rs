//! Feed intake module: fetching, parsing, and filtering of RSS/Atom feeds.

mod fetcher;
mod types;
mod util;

pub use self::fetcher::FeedIntake;
pub use self::types::*;
pub use self::util::*;
