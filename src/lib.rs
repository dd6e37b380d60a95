pub mod config;
pub mod db;
pub mod feeds;
pub mod formatter;
pub mod images;
pub mod library;
pub mod logging;
pub mod publisher;
pub mod scheduler;
pub mod scoring;
pub mod summarizer;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_DB: &str = "db_query";
pub const TARGET_PUBLISH: &str = "publish";
