//! craftbook command-line application.
//!
//! Wires configuration, the market client and recipe data into the cost
//! resolver and the metrics engine:
//! - `craft`: cheapest way to craft an item
//! - `analyze`: market health for one item
//! - `hot`: items selling fastest right now

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
