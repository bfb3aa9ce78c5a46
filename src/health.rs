//! Background health polling of the document service.
//!
//! [`HealthPoller::start`] checks once immediately, then on a fixed interval
//! until the returned handle is stopped. The status is published on a
//! `watch` channel.

use crate::client::ApiClient;
use crate::endpoints;
use crate::error::ApiError;
use crate::types::HealthResponse;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Checking,
    Online,
    Offline,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthStatus::Checking => "checking",
            HealthStatus::Online => "online",
            HealthStatus::Offline => "offline",
        })
    }
}

impl HealthStatus {
    /// Status derived from one check outcome
    pub fn from_check(outcome: &Result<HealthResponse, ApiError>) -> Self {
        match outcome {
            Ok(response) if response.ok => HealthStatus::Online,
            _ => HealthStatus::Offline,
        }
    }
}

/// Something that can be asked whether the backend is up
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<HealthResponse, ApiError>;
}

#[async_trait]
impl HealthCheck for ApiClient {
    async fn check(&self) -> Result<HealthResponse, ApiError> {
        endpoints::health_check(self).await
    }
}

pub struct HealthPoller;

impl HealthPoller {
    /// Spawn the polling task on the current tokio runtime.
    pub fn start(backend: Arc<dyn HealthCheck>, interval: Duration) -> PollerHandle {
        let (status_tx, status_rx) = watch::channel(HealthStatus::Checking);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(backend, interval, status_tx, stop_rx));
        info!(?interval, "health poller started");

        PollerHandle {
            status: status_rx,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

async fn poll_loop(
    backend: Arc<dyn HealthCheck>,
    period: Duration,
    status: watch::Sender<HealthStatus>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {
                // An in-flight check is never cut short; the stop is seen on
                // the next iteration.
                let next = HealthStatus::from_check(&backend.check().await);
                let previous = status.send_replace(next);
                if previous != next {
                    info!(%previous, %next, "backend status changed");
                } else {
                    debug!(status = %next, "health check");
                }
            }
        }
    }
    info!("health poller stopped");
}

/// Wait until the published status differs from `last`. Repeated checks
/// with the same outcome are skipped. `None` once the poller has ended.
pub async fn next_change(
    status: &mut watch::Receiver<HealthStatus>,
    last: HealthStatus,
) -> Option<HealthStatus> {
    loop {
        status.changed().await.ok()?;
        let current = *status.borrow_and_update();
        if current != last {
            return Some(current);
        }
    }
}

/// Owner of a running poller. Dropping it stops the poller too.
pub struct PollerHandle {
    status: watch::Receiver<HealthStatus>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn status(&self) -> HealthStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status.clone()
    }

    /// Request the poller to stop; no tick fires after it observes this.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // Err only means the task already ended
            let _ = stop.send(());
        }
    }

    /// Stop and wait for the task to finish, including any check in flight.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!(error = %e, "health poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
