//! Defines the JSON protocol used between blazecal and provider binaries
//! over stdin/stdout.
//!
//! A provider fronts the remote calendar server: it receives one `Request`
//! line and answers with one `Response` line.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::Event;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    FetchMasters,
    GetMaster,
    PutMaster,
    DeleteMaster,
}

/// Request sent from blazecal to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the provider back to blazecal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    NotFound { uid: String },
    Error { error: String },
}

/// Masters that may intersect `[from, to)`. Times are `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchMasters {
    /// Provider-specific config (e.g. server url, calendar name)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for FetchMasters {
    type Response = Vec<Event>;
    fn command() -> Command {
        Command::FetchMasters
    }
}

/// A single master by uid; `null` data when absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetMaster {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub uid: String,
}

impl ProviderCommand for GetMaster {
    type Response = Option<Event>;
    fn command() -> Command {
        Command::GetMaster
    }
}

/// Create or replace a whole master record.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutMaster {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event: Event,
}

impl ProviderCommand for PutMaster {
    type Response = ();
    fn command() -> Command {
        Command::PutMaster
    }
}

/// Remove a master and with it the whole series.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMaster {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub uid: String,
}

impl ProviderCommand for DeleteMaster {
    type Response = ();
    fn command() -> Command {
        Command::DeleteMaster
    }
}
