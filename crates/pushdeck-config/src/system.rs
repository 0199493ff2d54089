//! System configuration parsing.

use crate::modules::ModuleRegistry;
use crate::version_link::{DEFAULT_VERSION_PATTERN, VersionLink};
use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// System-wide configuration.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub server: ServerConfig,
    /// PostgreSQL URL. Without one the server keeps jobs in memory.
    pub database_url: Option<String>,
    pub modules: ModuleRegistry,
    pub jobs: JobsConfig,
    pub version_link: VersionLink,
    pub ticketing: Option<EndpointConfig>,
    pub identity: Option<EndpointConfig>,
    pub build_runner: Option<EndpointConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobsConfig {
    /// Page size of the "deployed" buckets when the request has none.
    pub queue_length: Option<i64>,
}

/// Base URL and timeout of an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub url: Url,
    pub timeout: Duration,
}

/// Read and parse the configuration file at `path`.
pub fn load_system_config(path: impl AsRef<Path>) -> ConfigResult<SystemConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_system_config(&content)
}

/// Parse system configuration from KDL text.
pub fn parse_system_config(kdl: &str) -> ConfigResult<SystemConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut server = ServerConfig::default();
    let mut database_url = None;
    let mut modules: Option<ModuleRegistry> = None;
    let mut jobs = JobsConfig::default();
    let mut version_link = None;
    let mut ticketing = None;
    let mut identity = None;
    let mut build_runner = None;

    for node in doc.nodes() {
        match node.name().value() {
            "server" => {
                server = parse_server(node)?;
            }
            "database" => {
                let url = get_string_prop(node, "url")
                    .ok_or_else(|| ConfigError::MissingField("database url".to_string()))?;
                database_url = Some(url);
            }
            "modules" => {
                if modules.is_some() {
                    return Err(ConfigError::Duplicate("modules".to_string()));
                }
                modules = Some(parse_modules(node)?);
            }
            "jobs" => {
                jobs = parse_jobs(node)?;
            }
            "version-link" => {
                version_link = Some(parse_version_link(node)?);
            }
            "ticketing" => {
                ticketing = Some(parse_endpoint(node, "ticketing")?);
            }
            "identity" => {
                identity = Some(parse_endpoint(node, "identity")?);
            }
            "build-runner" => {
                build_runner = Some(parse_endpoint(node, "build-runner")?);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    let modules = modules.ok_or_else(|| ConfigError::MissingField("modules".to_string()))?;
    if modules.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "modules".to_string(),
            message: "at least one module is required".to_string(),
        });
    }

    let version_link = match version_link {
        Some(link) => link,
        None => VersionLink::new("", "", DEFAULT_VERSION_PATTERN)?,
    };

    Ok(SystemConfig {
        server,
        database_url,
        modules,
        jobs,
        version_link,
        ticketing,
        identity,
        build_runner,
    })
}

fn parse_server(node: &KdlNode) -> ConfigResult<ServerConfig> {
    let Some(bind) = get_string_prop(node, "bind") else {
        return Ok(ServerConfig::default());
    };
    let bind = bind.parse().map_err(|e| ConfigError::InvalidValue {
        field: "server bind".to_string(),
        message: format!("{}: {}", bind, e),
    })?;
    Ok(ServerConfig { bind })
}

fn parse_modules(node: &KdlNode) -> ConfigResult<ModuleRegistry> {
    let mut registry = ModuleRegistry::default();

    // Inline form: modules "web" "api"
    for name in get_all_string_args(node) {
        if !registry.insert(name.clone()) {
            return Err(ConfigError::Duplicate(format!("module '{}'", name)));
        }
    }

    // Block form: modules { module "web" }
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "module" {
                continue;
            }
            let name = get_first_string_arg(child)
                .ok_or_else(|| ConfigError::MissingField("module name".to_string()))?;
            if !registry.insert(name.clone()) {
                return Err(ConfigError::Duplicate(format!("module '{}'", name)));
            }
        }
    }

    Ok(registry)
}

fn parse_jobs(node: &KdlNode) -> ConfigResult<JobsConfig> {
    let queue_length = match get_integer_prop(node, "queue-length") {
        None => None,
        Some(n) if n > 0 => Some(n),
        Some(n) => {
            return Err(ConfigError::InvalidValue {
                field: "jobs queue-length".to_string(),
                message: format!("must be positive, got {}", n),
            });
        }
    };
    Ok(JobsConfig { queue_length })
}

fn parse_version_link(node: &KdlNode) -> ConfigResult<VersionLink> {
    let url_prefix = get_string_prop(node, "url-prefix").unwrap_or_default();
    let uri_version = get_string_prop(node, "uri-version").unwrap_or_default();
    let pattern = get_string_prop(node, "pattern")
        .unwrap_or_else(|| DEFAULT_VERSION_PATTERN.to_string());
    VersionLink::new(url_prefix, uri_version, &pattern)
}

fn parse_endpoint(node: &KdlNode, name: &str) -> ConfigResult<EndpointConfig> {
    let raw = get_string_prop(node, "url")
        .ok_or_else(|| ConfigError::MissingField(format!("{} url", name)))?;
    let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
        field: format!("{} url", name),
        message: format!("{}: {}", raw, e),
    })?;

    let timeout_seconds = match get_integer_prop(node, "timeout-seconds") {
        None => DEFAULT_TIMEOUT_SECONDS,
        Some(n) if n > 0 => n as u64,
        Some(n) => {
            return Err(ConfigError::InvalidValue {
                field: format!("{} timeout-seconds", name),
                message: format!("must be positive, got {}", n),
            });
        }
    };

    Ok(EndpointConfig {
        url,
        timeout: Duration::from_secs(timeout_seconds),
    })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_integer_prop(node: &KdlNode, name: &str) -> Option<i64> {
    node.get(name)
        .and_then(|v| v.as_integer())
        .and_then(|n| i64::try_from(n).ok())
}
