use crate::error::RemoteError;
use crate::remote::Remote;
use crate::shutdown::Shutdown;
use rand::Rng;
use std::time::Duration;

pub const MIN_PICK: u32 = 1;
pub const MAX_PICK: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub rounds: u64,
    pub picked: u64,
}

/// Keeps the pigment factory busy: start a generation round, claim a random handful of
/// what it produced, repeat until shut down.
pub struct PigmentCollector<R, G> {
    remote: R,
    rng: G,
    pause: Duration,
    shutdown: Shutdown,
    stats: CollectStats,
}

impl<R: Remote, G: Rng> PigmentCollector<R, G> {
    pub fn new(remote: R, rng: G, shutdown: Shutdown) -> Self {
        PigmentCollector {
            remote,
            rng,
            pause: Duration::ZERO,
            shutdown,
            stats: CollectStats::default(),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn stats(&self) -> CollectStats {
        self.stats
    }

    pub async fn round(&mut self) -> Result<u32, RemoteError> {
        let tick = self.remote.generate().await?;
        let num = self.rng.gen_range(MIN_PICK..=MAX_PICK);
        self.remote.pick(num, tick).await?;
        self.stats.rounds += 1;
        self.stats.picked += num as u64;
        log::debug!("Picked {} at tick {}", num, tick);
        Ok(num)
    }

    /// Runs until shutdown is requested, then returns what was collected.
    pub async fn run(mut self) -> Result<CollectStats, RemoteError> {
        log::info!("Collecting pigments");
        while !self.shutdown.is_triggered() {
            let shutdown = self.shutdown.clone();
            tokio::select! {
                _ = shutdown.triggered() => break,
                result = self.round() => { result?; }
            }
            if self.stats.rounds % 100 == 0 {
                log::info!(
                    "Collected {} units in {} rounds",
                    self.stats.picked,
                    self.stats.rounds
                );
            }
            if !self.pause.is_zero() && !self.shutdown.sleep(self.pause).await {
                break;
            }
            tokio::task::yield_now().await;
        }
        log::info!(
            "Stopped collecting after {} rounds, {} units",
            self.stats.rounds,
            self.stats.picked
        );
        Ok(self.stats)
    }
}

