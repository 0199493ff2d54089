//! CLI command implementations.

pub mod board;
pub mod jobs;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Thin JSON client for the Pushdeck API.
pub struct Client {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl Client {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self> {
        let base = Url::parse(api_url).with_context(|| format!("invalid API URL: {}", api_url))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid API path: {}", path))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let request = self.http.get(self.url(path)?).query(query);
        let response = self.authorize(request).send().await?;
        read_json(response).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let request = self.http.post(self.url(path)?).json(body);
        let response = self.authorize(request).send().await?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("unreadable response ({})", status))?;
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("request failed");
        bail!("{}: {}", status, message);
    }
    Ok(body)
}

/// Print a reply as pretty JSON.
pub fn print(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an envelope and fail when it reports an error.
pub fn print_envelope(envelope: &Value) -> Result<()> {
    print(envelope)?;
    if envelope["status"] == "error" {
        bail!(
            "{}",
            envelope["message"].as_str().unwrap_or("operation failed")
        );
    }
    Ok(())
}

pub fn validate(path: &str) -> Result<()> {
    match pushdeck_config::load_system_config(path) {
        Ok(config) => {
            println!(
                "Configuration is valid ({} modules: {})",
                config.modules.len(),
                config.modules.iter().collect::<Vec<_>>().join(", ")
            );
            Ok(())
        }
        Err(e) => bail!("Configuration error in {}: {}", path, e),
    }
}
