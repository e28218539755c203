//! Spreadsheet web-app gateway.
//!
//! `GET <endpoint>?action=read` returns the board, `POST <endpoint>?action=save`
//! overwrites it. The save body is sent as `text/plain` because the web-app
//! host rejects JSON content types on cross-origin posts.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::types::{decode_orders, ReadResponse, SaveResponse, Snapshot};
use super::SyncGateway;
use crate::error::{CoreError, Result};
use crate::order::Order;
use crate::storage::SyncConfig;

const SUCCESS: &str = "success";
const SAVE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGateway {
    /// Build a gateway for `endpoint`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the endpoint is not an absolute URL.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| CoreError::invalid_input("sync.endpoint", e.to_string()))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Gateway for the configured endpoint, or `None` when none is set.
    pub fn from_config(config: &SyncConfig) -> Result<Option<Self>> {
        match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(Some(Self::new(
                endpoint,
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn action_url(&self, action: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("action", action);
        url
    }
}

/// Check the HTTP status and parse the body, mapping every failure to
/// `Transport`.
async fn read_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::Transport(format!("{action}: HTTP {status}")));
    }
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| CoreError::Transport(format!("{action}: malformed response: {e}")))
}

fn rejected(action: &str, status: &str, message: Option<String>) -> CoreError {
    CoreError::Transport(format!(
        "{action}: store answered '{status}': {}",
        message.unwrap_or_else(|| "no message".to_string())
    ))
}

#[async_trait]
impl SyncGateway for HttpGateway {
    async fn read(&self) -> Result<Snapshot> {
        let url = self.action_url("read");
        debug!(%url, "reading board");
        let response = self.client.get(url).send().await?;
        let body: ReadResponse = read_body(response, "read").await?;
        if body.status != SUCCESS {
            return Err(rejected("read", &body.status, body.message));
        }
        let orders = decode_orders(body.data);
        info!(orders = orders.len(), "board read from endpoint");
        Ok(Snapshot {
            orders,
            resources: body.resources,
        })
    }

    async fn save(&self, orders: &[Order], resources: &[String]) -> Result<()> {
        let body = serde_json::to_string(&serde_json::json!({
            "data": orders,
            "resources": resources,
        }))?;
        let url = self.action_url("save");
        debug!(%url, orders = orders.len(), "saving board");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, SAVE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let body: SaveResponse = read_body(response, "save").await?;
        if body.status != SUCCESS {
            return Err(rejected("save", &body.status, body.message));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
