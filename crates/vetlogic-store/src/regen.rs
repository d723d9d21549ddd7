//! Background energy regeneration.
//!
//! A single task wakes every interval and applies one regeneration tick to
//! the shared store. It is the only autonomous mutation in the game.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::storage::SaveStorage;
use crate::store::GameStore;

/// A store shared between the action path and the regeneration task.
pub type SharedStore<S> = Arc<Mutex<GameStore<S>>>;

/// Handle to a running regeneration task.
#[derive(Debug)]
pub struct RegenHandle {
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl RegenHandle {
    /// Ask the task to stop after its current sleep and wait for it.
    pub async fn shutdown(self) {
        self.stop.store(true, Ordering::Release);
        self.task.abort();
        if let Err(e) = self.task.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "energy regeneration task failed");
        }
    }
}

/// Spawn the regeneration loop: `amount` energy every `period`.
pub fn spawn_energy_regen<S>(store: SharedStore<S>, amount: u32, period: Duration) -> RegenHandle
where
    S: SaveStorage + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let task = tokio::spawn(async move {
        tracing::debug!(amount, ?period, "energy regeneration started");
        while !flag.load(Ordering::Acquire) {
            tokio::time::sleep(period).await;
            let energy = store.lock().await.regen_tick(amount);
            tracing::trace!(energy, "energy tick");
        }
    });
    RegenHandle { stop, task }
}

#[cfg(test)]
mod tests {
    use vetlogic_engine::GameRules;
    use vetlogic_types::GameStatePatch;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::DEFAULT_SAVE_KEY;

    fn shared(energy: u32) -> SharedStore<MemoryStorage> {
        let mut store = GameStore::load(MemoryStorage::new(), DEFAULT_SAVE_KEY, GameRules::default());
        store.update(GameStatePatch {
            energy: Some(energy),
            ..GameStatePatch::default()
        });
        Arc::new(Mutex::new(store))
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_restore_energy_up_to_max() {
        let store = shared(97);
        let handle = spawn_energy_regen(Arc::clone(&store), 1, Duration::from_secs(10));

        tokio::time::sleep(Duration::from_millis(20_500)).await;
        assert_eq!(store.lock().await.state().energy, 99);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.lock().await.state().energy, 100);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_ticking() {
        let store = shared(10);
        let handle = spawn_energy_regen(Arc::clone(&store), 5, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.shutdown().await;
        let after = store.lock().await.state().energy;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.lock().await.state().energy, after);
        assert_eq!(after, 15);
    }
}
