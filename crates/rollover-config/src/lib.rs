pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, PlexConfig, RolloverConfig, SchedulerConfig, default_scheduler_config, DEFAULT_LOOKAHEAD_SEASONS, DEFAULT_MANAGED_MARKER};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
