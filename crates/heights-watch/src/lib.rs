//! Console watcher for the Heights market data hub.
//!
//! Small reference consumer: connects the hub, subscribes to a
//! configured set of symbols, and logs every snapshot it receives.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
