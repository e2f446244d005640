//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `explorer-provider-ics`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider.
//! Providers own their storage and credentials; core only passes through
//! the provider-specific parameters from the `[mirror]` config table.

use crate::error::{ExplorerError, ExplorerResult};
use crate::mirror::protocol::{Command, ProviderCommand, Request, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
/// Access requests may wait on the user answering a permission prompt.
const ACCESS_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("explorer-provider-{}", self.0)
    }

    fn binary_path(&self) -> ExplorerResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            ExplorerError::ProviderNotInstalled(format!(
                "Provider '{}' not found. Install it with:\n  cargo install {}",
                self.0, binary_name
            ))
        })
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> ExplorerResult<C::Response> {
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ExplorerError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    /// Call a typed provider command that may block on user interaction.
    pub async fn call_interactive<C: ProviderCommand>(&self, cmd: C) -> ExplorerResult<C::Response> {
        timeout(ACCESS_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| ExplorerError::ProviderTimeout(ACCESS_TIMEOUT.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> ExplorerResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| ExplorerError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| ExplorerError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExplorerError::Provider(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExplorerError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(ExplorerError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(ExplorerError::Provider(
                "Provider returned no response".into(),
            ));
        }

        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> ExplorerResult<R> {
    let response: Response<R> = serde_json::from_str(raw.trim())
        .map_err(|e| ExplorerError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::NotFound { error } => Err(ExplorerError::RemoteNotFound(error)),
        Response::Error { error } => Err(ExplorerError::Provider(error)),
    }
}
