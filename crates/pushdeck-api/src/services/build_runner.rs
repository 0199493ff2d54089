//! Build runner console links.

use pushdeck_config::EndpointConfig;
use pushdeck_core::{BuildRunner, Error, Job, Result};
use url::Url;

use super::with_trailing_slash;

/// Console URLs under the runner's base URL: `{base}job/{requestor}/`.
#[derive(Debug, Clone)]
pub struct UrlBuildRunner {
    base: Url,
}

impl UrlBuildRunner {
    pub fn new(base: &Url) -> Self {
        Self {
            base: with_trailing_slash(base),
        }
    }

    pub fn from_config(config: &EndpointConfig) -> Self {
        Self::new(&config.url)
    }
}

impl BuildRunner for UrlBuildRunner {
    fn console_url(&self, job: &Job) -> Result<String> {
        let path = format!("job/{}/", urlencoding::encode(job.requestor()));
        self.base
            .join(&path)
            .map(String::from)
            .map_err(|e| Error::InvalidInput(format!("console url for {}: {}", job.requestor(), e)))
    }
}
