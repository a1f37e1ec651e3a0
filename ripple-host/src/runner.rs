//! Background tick runner.
//!
//! Advances a shared [`Simulation`] by a fixed game-time delta every
//! real-time interval on a tokio task. Hosts can still tick the same
//! simulation by hand between runner ticks; the mutex serialises them.
//!
//! A failed tick is logged and the loop carries on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use ripple_core::Simulation;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::error::{HostError, Result};

/// A simulation shared between the runner and the host.
pub type SharedSimulation = Arc<Mutex<Simulation>>;

struct Running {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Periodically ticks a [`SharedSimulation`].
pub struct TickRunner {
    simulation: SharedSimulation,
    config: RunnerConfig,
    ticks: Arc<AtomicU64>,
    running: Option<Running>,
}

impl TickRunner {
    /// Create a stopped runner.
    #[must_use]
    pub fn new(simulation: SharedSimulation, config: RunnerConfig) -> Self {
        Self {
            simulation,
            config,
            ticks: Arc::new(AtomicU64::new(0)),
            running: None,
        }
    }

    /// The simulation being ticked.
    #[must_use]
    pub fn simulation(&self) -> &SharedSimulation {
        &self.simulation
    }

    /// Whether the background loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Ticks completed since the last `start`.
    #[must_use]
    pub fn ticks_completed(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Spawn the tick loop on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`HostError::AlreadyRunning`] if the loop is active.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(HostError::AlreadyRunning);
        }
        self.ticks.store(0, Ordering::Relaxed);
        let (stop, stopped) = watch::channel(false);
        let task = tokio::spawn(tick_loop(
            Arc::clone(&self.simulation),
            self.config.clone(),
            Arc::clone(&self.ticks),
            stopped,
        ));
        self.running = Some(Running { stop, task });
        info!(
            interval_ms = self.config.interval_ms,
            delta_hours = self.config.delta_hours,
            "Tick runner started"
        );
        Ok(())
    }

    /// Stop the loop and wait for it to finish. No-op if not running.
    pub async fn stop(&mut self) {
        let Some(Running { stop, task }) = self.running.take() else {
            return;
        };
        let _ = stop.send(true);
        if let Err(error) = task.await {
            warn!(%error, "Tick runner task ended abnormally");
        }
        info!(ticks = self.ticks_completed(), "Tick runner stopped");
    }
}

async fn tick_loop(
    simulation: SharedSimulation,
    config: RunnerConfig,
    ticks: Arc<AtomicU64>,
    mut stopped: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(config.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stopped.changed() => break,
            _ = interval.tick() => {
                let outcome = simulation.lock().advance(config.delta_hours);
                match outcome {
                    Ok(report) => {
                        ticks.fetch_add(1, Ordering::Relaxed);
                        debug!(
                            game_time = %report.game_time,
                            delivered = report.events_delivered,
                            updated = report.agents_updated,
                            "Background tick"
                        );
                    }
                    Err(error) => warn!(%error, "Background tick failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ripple_core::{AgentId, GameTime, LocalityTier, OriginContext, SimConfig};

    use super::*;

    fn shared() -> SharedSimulation {
        let nobody = |_: LocalityTier, _: &OriginContext| Vec::<AgentId>::new();
        Arc::new(Mutex::new(Simulation::new(SimConfig::default(), nobody).expect("valid")))
    }

    fn config() -> RunnerConfig {
        RunnerConfig {
            interval_ms: 100,
            delta_hours: 0.5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_stopped() {
        let sim = shared();
        let mut runner = TickRunner::new(Arc::clone(&sim), config());
        runner.start().expect("not running yet");
        assert!(runner.is_running());

        tokio::time::sleep(Duration::from_millis(350)).await;
        runner.stop().await;
        assert!(!runner.is_running());

        let ticks = runner.ticks_completed();
        assert!(ticks >= 3, "expected at least 3 ticks, got {ticks}");
        #[allow(clippy::cast_precision_loss)]
        let expected = GameTime::from_hours(0.5 * ticks as f64);
        assert_eq!(sim.lock().now(), expected);

        // Stopped means stopped.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runner.ticks_completed(), ticks);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_refused() {
        let mut runner = TickRunner::new(shared(), config());
        runner.start().expect("first start");
        assert!(matches!(runner.start(), Err(HostError::AlreadyRunning)));
        runner.stop().await;
        runner.stop().await;
        runner.start().expect("restart after stop");
        runner.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn manual_ticks_interleave_with_runner() {
        let sim = shared();
        let mut runner = TickRunner::new(Arc::clone(&sim), config());
        runner.start().expect("start");
        tokio::time::sleep(Duration::from_millis(150)).await;

        // Manual tick far ahead; the runner keeps moving forward from there.
        sim.lock().tick(GameTime::from_hours(100.0)).expect("forward");
        tokio::time::sleep(Duration::from_millis(200)).await;
        runner.stop().await;

        assert!(sim.lock().now() > GameTime::from_hours(100.0));
    }
}
