//! Provider-backed store.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::date_range::DateRange;
use crate::error::CalResult;
use crate::event::Event;
use crate::remote::protocol::{DeleteMaster, FetchMasters, GetMaster, PutMaster};
use crate::remote::provider::Provider;
use crate::store::Transport;

/// Opaque provider settings from the `store.remote` config table.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A remote calendar reached through a provider binary
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }
}

impl Transport for Remote {
    async fn fetch_masters(&self, range: &DateRange) -> CalResult<Vec<Event>> {
        let masters = self
            .provider
            .call(FetchMasters {
                remote_config: self.remote_config(),
                from: range.start_iso(),
                to: range.end_iso(),
            })
            .await?;

        for master in &masters {
            master.validate()?;
        }
        Ok(masters)
    }

    async fn get_master(&self, uid: &str) -> CalResult<Option<Event>> {
        let master = self
            .provider
            .call(GetMaster {
                remote_config: self.remote_config(),
                uid: uid.to_string(),
            })
            .await?;

        if let Some(master) = &master {
            master.validate()?;
        }
        Ok(master)
    }

    async fn put_master(&self, event: &Event) -> CalResult<()> {
        event.validate()?;
        self.provider
            .call(PutMaster {
                remote_config: self.remote_config(),
                event: event.clone(),
            })
            .await?;

        info!(uid = %event.uid, provider = %self.provider.name(), "Saved master");
        Ok(())
    }

    async fn delete_master(&self, uid: &str) -> CalResult<()> {
        self.provider
            .call(DeleteMaster {
                remote_config: self.remote_config(),
                uid: uid.to_string(),
            })
            .await?;

        info!(uid = %uid, provider = %self.provider.name(), "Deleted master");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_to_json() {
        let mut values = HashMap::new();
        values.insert(
            "url".to_string(),
            toml::Value::String("https://dav.example.com".into()),
        );
        values.insert("port".to_string(), toml::Value::Integer(8443));
        let config = RemoteConfig(values);

        let json = serde_json::Map::from(&config);
        assert_eq!(json["url"], "https://dav.example.com");
        assert_eq!(json["port"], 8443);
    }
}
