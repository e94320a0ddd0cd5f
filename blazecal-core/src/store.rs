//! Access to the store that owns master records.

use std::future::Future;

use crate::config::Config;
use crate::date_range::DateRange;
use crate::error::CalResult;
use crate::event::Event;
use crate::local::DirectoryStore;
use crate::remote::Remote;
use crate::remote::provider::Provider;

/// Operations on persisted master records.
///
/// `fetch_masters` may return masters outside the window; callers clip by
/// expanding. `put_master` is a full-record upsert used for both create and
/// edit. `delete_master` fails with `NotFound` when the uid is absent.
pub trait Transport: Send + Sync {
    fn fetch_masters(&self, range: &DateRange)
    -> impl Future<Output = CalResult<Vec<Event>>> + Send;

    fn get_master(&self, uid: &str) -> impl Future<Output = CalResult<Option<Event>>> + Send;

    fn put_master(&self, event: &Event) -> impl Future<Output = CalResult<()>> + Send;

    fn delete_master(&self, uid: &str) -> impl Future<Output = CalResult<()>> + Send;
}

/// The store selected by configuration.
pub enum Store {
    Directory(DirectoryStore),
    Remote(Remote),
}

impl Store {
    /// A provider-backed store when `store.provider` is set, otherwise the
    /// `.ics` directory at `store.directory`.
    pub fn from_config(config: &Config) -> Self {
        match &config.store.provider {
            Some(name) => Store::Remote(Remote::new(
                Provider::from_name(name),
                config.store.remote.clone(),
            )),
            None => Store::Directory(DirectoryStore::new(config.store.directory_path())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Store::Directory(store) => format!("directory {}", store.path().display()),
            Store::Remote(remote) => format!("provider {}", remote.provider.name()),
        }
    }
}

impl Transport for Store {
    async fn fetch_masters(&self, range: &DateRange) -> CalResult<Vec<Event>> {
        match self {
            Store::Directory(store) => store.fetch_masters(range).await,
            Store::Remote(remote) => remote.fetch_masters(range).await,
        }
    }

    async fn get_master(&self, uid: &str) -> CalResult<Option<Event>> {
        match self {
            Store::Directory(store) => store.get_master(uid).await,
            Store::Remote(remote) => remote.get_master(uid).await,
        }
    }

    async fn put_master(&self, event: &Event) -> CalResult<()> {
        match self {
            Store::Directory(store) => store.put_master(event).await,
            Store::Remote(remote) => remote.put_master(event).await,
        }
    }

    async fn delete_master(&self, uid: &str) -> CalResult<()> {
        match self {
            Store::Directory(store) => store.delete_master(uid).await,
            Store::Remote(remote) => remote.delete_master(uid).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use std::path::PathBuf;

    #[test]
    fn test_from_config_picks_directory_store() {
        let config = Config {
            store: StoreConfig {
                directory: PathBuf::from("/tmp/blazecal-events"),
                ..StoreConfig::default()
            },
            ..Config::default()
        };

        let store = Store::from_config(&config);
        assert!(matches!(store, Store::Directory(_)));
        assert_eq!(store.describe(), "directory /tmp/blazecal-events");
    }

    #[test]
    fn test_from_config_picks_provider_store() {
        let config = Config {
            store: StoreConfig {
                provider: Some("caldav".into()),
                ..StoreConfig::default()
            },
            ..Config::default()
        };

        let store = Store::from_config(&config);
        assert!(matches!(store, Store::Remote(_)));
        assert_eq!(store.describe(), "provider caldav");
    }
}
