//! Daemon loop
//!
//! Multiplexes three event sources in one `select!`:
//!
//! - timer ticks (daemon mode only)
//! - the result of the in-flight update cycle
//! - the shutdown future
//!
//! The first cycle starts immediately, not on the first tick. Without
//! daemon mode the loop exits once that cycle's result (or a signal) has
//! been handled.
//!
//! ## Ownership
//!
//! The orchestrator is moved into the cycle task and handed back with the
//! result. While a cycle is running there is no orchestrator to start a
//! second one with, so a tick that fires during a slow cycle is skipped
//! rather than overlapping it.

use crate::error::{Error, Result};
use crate::orchestrator::{CycleOutcome, UpdateOrchestrator};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, info, warn};

/// Capacity of the daemon event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

type CycleHandle = JoinHandle<(UpdateOrchestrator, Result<CycleOutcome>)>;

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// The unconditional cycle at startup
    Startup,
    /// A timer tick
    Tick,
}

/// Events emitted by the DaemonLoop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEvent {
    /// Loop started
    Started {
        daemon: bool,
    },

    /// A cycle was launched
    CycleStarted {
        trigger: CycleTrigger,
    },

    /// A cycle finished; errors are carried as their display text
    CycleFinished {
        outcome: std::result::Result<CycleOutcome, String>,
    },

    /// A tick fired while a cycle was still running
    TickSkipped,

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Drives an [`UpdateOrchestrator`] until shutdown
pub struct DaemonLoop {
    orchestrator: UpdateOrchestrator,
    daemon: bool,
    interval: Duration,
    event_tx: mpsc::Sender<DaemonEvent>,
}

impl DaemonLoop {
    /// Create a loop using the orchestrator's daemon flag and interval
    ///
    /// # Returns
    ///
    /// A tuple of (loop, event_receiver) where event_receiver yields daemon events
    pub fn new(orchestrator: UpdateOrchestrator) -> (Self, mpsc::Receiver<DaemonEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let daemon = orchestrator.config().daemon;
        let interval = orchestrator.config().interval();

        let daemon_loop = Self {
            orchestrator,
            daemon,
            interval,
            event_tx: tx,
        };

        (daemon_loop, rx)
    }

    /// Override the tick period
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until a oneshot shutdown signal fires (or its sender is dropped)
    pub async fn run_with_shutdown(self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_until(async move {
            let _ = shutdown_rx.await;
            "shutdown requested".to_string()
        })
        .await
    }

    /// Run until `shutdown` resolves
    ///
    /// `shutdown` yields a description of what stopped the loop (e.g. the
    /// signal name) for logging.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: clean exit; cycle errors never end the loop
    /// - `Err(Error)`: a cycle task panicked and took the orchestrator with it
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = String>,
    {
        let Self {
            orchestrator,
            daemon,
            interval,
            event_tx,
        } = self;

        emit(&event_tx, DaemonEvent::Started { daemon });

        let mut idle: Option<UpdateOrchestrator> = None;
        let mut in_flight = Some(spawn_cycle(orchestrator));
        emit(
            &event_tx,
            DaemonEvent::CycleStarted {
                trigger: CycleTrigger::Startup,
            },
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(ticker);

        tokio::pin!(shutdown);

        let stop_reason = loop {
            tokio::select! {
                Some(_) = ticks.next(), if daemon => {
                    debug!("tick triggered");
                    match idle.take() {
                        Some(orchestrator) => {
                            in_flight = Some(spawn_cycle(orchestrator));
                            emit(&event_tx, DaemonEvent::CycleStarted {
                                trigger: CycleTrigger::Tick,
                            });
                        }
                        None => {
                            debug!("previous update still running, skipping tick");
                            emit(&event_tx, DaemonEvent::TickSkipped);
                        }
                    }
                }

                joined = join_cycle(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    let (orchestrator, outcome) = joined.map_err(|e| {
                        Error::Other(format!("update cycle task failed: {}", e))
                    })?;
                    idle = Some(orchestrator);

                    match &outcome {
                        Ok(CycleOutcome::Updated { ip, zone_id, .. }) => {
                            info!("updated record to {} in zone {}", ip, zone_id);
                        }
                        Ok(CycleOutcome::Unchanged { .. }) => {}
                        Err(e) => warn!("error updating route53: {}", e),
                    }

                    emit(&event_tx, DaemonEvent::CycleFinished {
                        outcome: outcome.map_err(|e| e.to_string()),
                    });

                    if !daemon {
                        break "single update complete".to_string();
                    }
                }

                signal = &mut shutdown => {
                    info!("Shutting down on signal: {}", signal);
                    if let Some(handle) = in_flight.take() {
                        debug!("abandoning in-flight update");
                        handle.abort();
                    }
                    break signal;
                }
            }
        };

        emit(&event_tx, DaemonEvent::Stopped { reason: stop_reason });
        info!("Program Exiting");

        Ok(())
    }
}

fn spawn_cycle(mut orchestrator: UpdateOrchestrator) -> CycleHandle {
    tokio::spawn(async move {
        let outcome = orchestrator.run_cycle().await;
        (orchestrator, outcome)
    })
}

async fn join_cycle(
    handle: &mut Option<CycleHandle>,
) -> std::result::Result<(UpdateOrchestrator, Result<CycleOutcome>), JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn emit(event_tx: &mpsc::Sender<DaemonEvent>, event: DaemonEvent) {
    if event_tx.try_send(event).is_err() {
        debug!("Daemon event channel full or closed, dropping event");
    }
}
