#![forbid(unsafe_code)]

pub mod config;
pub mod deletion;
pub mod model;
pub mod progress;
pub mod report;
pub mod rubric;
pub mod time;

pub use config::CrmConfig;
pub use time::Clock;
