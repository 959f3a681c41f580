//! Persisted settings, load-or-default recovery, and the shared settings snapshot.
#![forbid(unsafe_code)]

mod file;
mod shared;
mod store;

pub use file::{CONFIG_FILE_NAME, ConfigError, LightConfig, LoadOutcome};
pub use shared::SharedSettings;
pub use store::ConfigStore;
