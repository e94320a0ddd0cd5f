//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `blazecal-provider-caldav`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider. Providers
//! manage their own credentials; core only passes the `store.remote` table.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{CalError, CalResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

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
        format!("blazecal-provider-{}", self.0)
    }

    fn binary_path(&self) -> CalResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| CalError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    /// There is no timeout; a hung provider hangs the caller.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalResult<C::Response> {
        self.call_raw(C::command(), cmd).await
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalResult<R> {
        let params =
            serde_json::to_value(params).map_err(|e| CalError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json =
            serde_json::to_string(&request).map_err(|e| CalError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, command = ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                CalError::TransportFailure(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CalError::TransportFailure("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await
            .map_err(|e| CalError::TransportFailure(format!("Failed to send request: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CalError::TransportFailure(format!("Failed to read response: {e}")))?;

        if !output.status.success() {
            return Err(CalError::TransportFailure(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        parse_response(&response_str)
    }
}

fn parse_response<R: DeserializeOwned>(response_str: &str) -> CalResult<R> {
    if response_str.trim().is_empty() {
        return Err(CalError::TransportFailure(
            "Provider returned no response".into(),
        ));
    }

    let response: Response<R> = serde_json::from_str(response_str)
        .map_err(|e| CalError::TransportFailure(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::NotFound { uid } => Err(CalError::NotFound(uid)),
        Response::Error { error } => Err(CalError::TransportFailure(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_name() {
        assert_eq!(
            Provider::from_name("caldav").binary_name(),
            "blazecal-provider-caldav"
        );
    }

    #[test]
    fn test_parse_response_maps_statuses() {
        let ok: Vec<String> = parse_response(r#"{"status":"success","data":["a"]}"#).unwrap();
        assert_eq!(ok, vec!["a"]);

        let missing = parse_response::<()>(r#"{"status":"not_found","uid":"abc"}"#);
        assert!(matches!(missing, Err(CalError::NotFound(uid)) if uid == "abc"));

        let failed = parse_response::<()>(r#"{"status":"error","error":"boom"}"#);
        assert!(matches!(failed, Err(CalError::TransportFailure(msg)) if msg == "boom"));

        let empty = parse_response::<()>("  \n");
        assert!(matches!(empty, Err(CalError::TransportFailure(_))));

        let garbage = parse_response::<()>("not json");
        assert!(matches!(garbage, Err(CalError::TransportFailure(_))));
    }

    #[tokio::test]
    async fn test_missing_provider_binary() {
        let provider = Provider::from_name("definitely-not-installed-7c1e");
        let result = provider
            .call(crate::remote::protocol::DeleteMaster {
                remote_config: serde_json::Map::new(),
                uid: "x".into(),
            })
            .await;
        assert!(matches!(result, Err(CalError::ProviderNotInstalled(_))));
    }
}
