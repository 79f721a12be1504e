use crate::service::{ShortenerService, SweepReport};
use boomerang_core::{Registry, ShortenerError};
use boomerang_pool::IdAllocator;
use jiff::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};
use typed_builder::TypedBuilder;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
/// Longest accepted interval. Longer values are capped to it.
pub const MAX_INTERVAL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Configures the expiration reaper.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ReaperConfig {
    /// Time between two sweeps. The first sweep runs one interval after start.
    #[builder(default = DEFAULT_INTERVAL)]
    pub interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Background task that hands expired ids back to the pool.
///
/// Reads already treat expired records as missing; the reaper is what makes
/// their ids allocatable again when nobody deletes them explicitly.
pub struct Reaper<R, A> {
    service: Arc<ShortenerService<R, A>>,
    interval: Duration,
}

impl<R: Registry, A: IdAllocator> Reaper<R, A> {
    pub fn new(service: Arc<ShortenerService<R, A>>, config: ReaperConfig) -> Self {
        Self {
            service,
            interval: config.interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
        }
    }

    /// Runs a single sweep right now.
    pub async fn sweep_once(&self) -> Result<SweepReport, ShortenerError> {
        let report = self.service.reclaim_expired(Timestamp::now()).await?;

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                reclaimed = report.reclaimed,
                skipped = report.skipped,
                failed = report.failed,
                "reclaimed expired ids"
            );
        } else {
            debug!("no expired ids to reclaim");
        }

        Ok(report)
    }

    /// Starts the periodic sweep on the current tokio runtime.
    ///
    /// The task stops when [`ReaperHandle::shutdown`] is called or the handle
    /// is dropped. A sweep that has already started always runs to the end.
    pub fn spawn(self) -> ReaperHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(shutdown_rx));
        ReaperHandle {
            shutdown: shutdown_tx,
            join,
        }
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        info!(interval = ?self.interval, "starting expiration reaper");

        let now = Instant::now();
        let start = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("expiration reaper received shutdown signal, exiting");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep_once().await {
                        error!(error = %err, "expiration sweep failed");
                    }
                }
            }
        }
    }
}

/// Control handle for a spawned [`Reaper`].
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the reaper to stop and waits for it to finish.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        // The task may already be gone; joining reports why.
        let _ = self.shutdown.send(());
        self.join.await
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
