//! KDL configuration parsing for Pushdeck.
//!
//! This crate handles parsing of:
//! - System configuration (pushdeck.kdl)
//! - The module registry
//! - Version link generation for the dashboard

pub mod error;
pub mod modules;
pub mod system;
pub mod version_link;

pub use error::{ConfigError, ConfigResult};
pub use modules::ModuleRegistry;
pub use system::{
    EndpointConfig, JobsConfig, ServerConfig, SystemConfig, load_system_config,
    parse_system_config,
};
pub use version_link::VersionLink;
