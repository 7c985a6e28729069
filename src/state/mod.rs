use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::ServerConfig, dao::roster_store::RosterStore, error::ServiceError};

/// Handle to the state shared by every handler.
pub type SharedState = Arc<AppState>;

/// State shared by every request: the roster store slot and the admin secret.
pub struct AppState {
    roster_store: RwLock<Option<Arc<dyn RosterStore>>>,
    store_configured: bool,
    admin_password: Option<String>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct the state for `config`.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: &ServerConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            roster_store: RwLock::new(None),
            store_configured: config.store.is_some(),
            admin_password: config.admin_password.clone(),
            degraded: degraded_tx,
        })
    }

    /// State with `store` already installed, as used by tests and embedders.
    pub fn with_store(store: Arc<dyn RosterStore>, admin_password: Option<String>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            roster_store: RwLock::new(Some(store)),
            store_configured: true,
            admin_password,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current roster store, if one is installed.
    pub async fn roster_store(&self) -> Option<Arc<dyn RosterStore>> {
        let guard = self.roster_store.read().await;
        guard.as_ref().cloned()
    }

    /// Roster store usable for a request, or the reason it cannot be served.
    pub async fn require_roster_store(&self) -> Result<Arc<dyn RosterStore>, ServiceError> {
        if !self.store_configured {
            return Err(ServiceError::Configuration(
                "DATABASE_URL is missing".into(),
            ));
        }
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.roster_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a roster store implementation and leave degraded mode.
    pub async fn set_roster_store(&self, store: Arc<dyn RosterStore>) {
        {
            let mut guard = self.roster_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Shared secret expected on write requests.
    pub fn admin_password(&self) -> Option<&str> {
        self.admin_password.as_deref()
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::StoreBackend, dao::roster_store::MemoryRosterStore};

    fn config(store: Option<StoreBackend>) -> ServerConfig {
        ServerConfig {
            store,
            admin_password: Some("secret".into()),
            port: 0,
        }
    }

    #[tokio::test]
    async fn unconfigured_store_is_a_configuration_error() {
        let state = AppState::new(&config(None));
        assert!(matches!(
            state.require_roster_store().await,
            Err(ServiceError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn configured_store_is_degraded_until_installed() {
        let state = AppState::new(&config(Some(StoreBackend::Memory)));
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_roster_store().await,
            Err(ServiceError::Degraded)
        ));

        let mut watcher = state.degraded_watcher();
        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow());
        assert!(state.require_roster_store().await.is_ok());
    }
}
