//! Links from a job's version to its source.

use regex::Regex;

use crate::{ConfigError, ConfigResult};

/// Default pattern: a dotted three-part version anywhere in the string.
pub const DEFAULT_VERSION_PATTERN: &str = r"\d+\.\d+\.\d+";

/// Builds `_versionLink` values for the dashboard.
#[derive(Debug, Clone)]
pub struct VersionLink {
    url_prefix: String,
    uri_version: String,
    pattern: Regex,
}

impl VersionLink {
    pub fn new(
        url_prefix: impl Into<String>,
        uri_version: impl Into<String>,
        pattern: &str,
    ) -> ConfigResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
            field: "version-link pattern".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            url_prefix: url_prefix.into(),
            uri_version: uri_version.into(),
            pattern,
        })
    }

    /// Link for `version` of `module`.
    ///
    /// When the pattern matches, the matched text is appended after the
    /// version path segment. Otherwise the link points at the module.
    pub fn link_for(&self, module: &str, version: &str) -> String {
        match self.pattern.find(version) {
            Some(m) => format!(
                "{}{}{}{}",
                self.url_prefix,
                module,
                self.uri_version,
                m.as_str()
            ),
            None => format!("{}{}", self.url_prefix, module),
        }
    }
}
