// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod differ;
pub mod fetch;
pub mod model;
pub mod monitor;
pub mod parser;
pub mod watcher;

// Output layer
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::{MonitorConfig, ProviderConfig};
pub use crate::differ::UpdateDiffer;
pub use crate::fetch::{ConditionalFetcher, FetchError, FetchOutcome};
pub use crate::model::IncidentUpdate;
pub use crate::monitor::Monitor;
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::parser::parse_incidents;
pub use crate::watcher::ProviderWatcher;
