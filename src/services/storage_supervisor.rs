use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{roster_store::RosterStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connect to the roster store, then keep polling it and toggle degraded mode
/// whenever its health changes. Never returns.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RosterStore>, StorageError>> + Send,
{
    let store = connect_with_backoff(&mut connect).await;
    state.set_roster_store(store.clone()).await;
    info!("storage connection established; leaving degraded mode");

    let mut delay = INITIAL_DELAY;
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                delay = INITIAL_DELAY;
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                if !state.is_degraded() {
                    warn!(error = %err, "storage health check failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(error = %err, "storage still unreachable");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

async fn connect_with_backoff<F, Fut>(connect: &mut F) -> Arc<dyn RosterStore>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Arc<dyn RosterStore>, StorageError>>,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match connect().await {
            Ok(store) => return store,
            Err(err) => {
                warn!(attempt, error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
