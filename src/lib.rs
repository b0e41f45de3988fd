pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod reports;
pub mod scheduler;
pub mod telegram;

pub use error::{Error, Result};
