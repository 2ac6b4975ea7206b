//! Signal-cli daemon HTTP client.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::types::{
    AttachmentData, AttachmentParams, GroupDetails, SendParams, SendResult, TypingParams,
};

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Serialize)]
struct RpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<T>,
    id: u64,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Version response from signal-cli.
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Account parameter for methods that take nothing else.
#[derive(Debug, Serialize)]
struct AccountParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
}

/// Client for communicating with the signal-cli daemon.
#[derive(Clone)]
pub struct SignalClient {
    http: Client,
    config: DaemonConfig,
    request_id: Arc<AtomicU64>,
    connected: Arc<AtomicBool>,
}

impl SignalClient {
    /// Connect to the signal-cli daemon.
    pub async fn connect(config: DaemonConfig) -> Result<Self, DaemonError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DaemonError::Http)?;

        let client = Self {
            http,
            config,
            request_id: Arc::new(AtomicU64::new(1)),
            connected: Arc::new(AtomicBool::new(false)),
        };

        if !client.health_check().await? {
            return Err(DaemonError::HealthCheckFailed);
        }
        info!("Connected to signal-cli daemon at {}", client.config.base_url);

        Ok(client)
    }

    /// Check if currently connected to the daemon.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Perform a health check against the daemon.
    pub async fn health_check(&self) -> Result<bool, DaemonError> {
        let url = self.config.check_url();
        debug!("Health check: {}", url);

        match self.http.get(&url).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                self.connected.store(ok, Ordering::SeqCst);
                Ok(ok)
            }
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                Err(DaemonError::Http(e))
            }
        }
    }

    /// Get the signal-cli version.
    pub async fn version(&self) -> Result<String, DaemonError> {
        let resp: VersionResponse = self.rpc_call::<(), _>("version", None).await?;
        Ok(resp.version)
    }

    /// Send a message using the full SendParams structure.
    pub async fn send(&self, mut params: SendParams) -> Result<SendResult, DaemonError> {
        if params.account.is_none() {
            params.account = self.config.account.clone();
        }

        self.rpc_call("send", Some(params)).await
    }

    /// Send a text message to a group, optionally quoting `(timestamp, author)`.
    pub async fn send_to_group(
        &self,
        group_id: &str,
        message: &str,
        quote: Option<(u64, &str)>,
    ) -> Result<SendResult, DaemonError> {
        let mut params = SendParams::group(group_id, message);
        if let Some((timestamp, author)) = quote {
            params = params.with_quote(timestamp, author);
        }
        self.send(params).await
    }

    /// Send a typing indicator to a group.
    ///
    /// `started` is true for "started typing", false for "stopped typing".
    pub async fn send_typing_to_group(
        &self,
        group_id: &str,
        started: bool,
    ) -> Result<(), DaemonError> {
        let params = TypingParams {
            account: self.config.account.clone(),
            group_id: group_id.to_string(),
            stop: !started,
        };
        // sendTyping returns an empty result on success
        let _: serde_json::Value = self.rpc_call("sendTyping", Some(params)).await?;
        Ok(())
    }

    /// Fetch a received attachment and decode it.
    pub async fn get_attachment(
        &self,
        attachment_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<u8>, DaemonError> {
        let params = AttachmentParams {
            account: self.config.account.clone(),
            id: attachment_id.to_string(),
            group_id: group_id.map(str::to_string),
        };
        let resp: AttachmentData = self.rpc_call("getAttachment", Some(params)).await?;
        Ok(STANDARD.decode(resp.data.trim())?)
    }

    /// List the groups the account knows about.
    pub async fn list_groups(&self) -> Result<Vec<GroupDetails>, DaemonError> {
        let params = AccountParams {
            account: self.config.account.clone(),
        };
        self.rpc_call("listGroups", Some(params)).await
    }

    /// Get the configuration.
    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Make a JSON-RPC call to the daemon.
    async fn rpc_call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R, DaemonError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let url = self.config.rpc_url();

        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!("RPC call: {} (id={})", method, id);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(DaemonError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DaemonError::Connection(format!("HTTP {}: {}", status, body)));
        }

        let rpc_response: RpcResponse<R> = response.json().await.map_err(DaemonError::Http)?;

        if let Some(error) = rpc_response.error {
            return Err(DaemonError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or_else(|| DaemonError::Rpc {
            code: -1,
            message: "No result in response".to_string(),
        })
    }
}

impl std::fmt::Debug for SignalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
