//! # Configuration
//!
//! - `settings`: process settings from environment variables
//! - `snapshot`: the alerting configuration and its hot-swappable handle
//! - `loader`: reads the snapshot from a ConfigMap with environment fallback
//! - `watch`: hot-reloads the snapshot on ConfigMap changes

mod loader;
mod settings;
mod snapshot;
mod watch;

pub use loader::{fetch_snapshot, load_snapshot};
pub use settings::{DispatchMode, RuntimeSettings};
pub use snapshot::{
    ConfigError, ConfigSnapshot, MattermostConfig, NotificationToggles, SharedSnapshot,
};
pub use watch::{apply_configmap, start_configmap_watch};
