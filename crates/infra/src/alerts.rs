//! The low-stock alert job: one check, and an interval runner that repeats it.
//!
//! Failures are isolated: a failed check is logged and retried, and never
//! touches stock.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use stockroom_alerts::{AlertScheduler, AlertTransport, LowStockItem, compose_alert};
use stockroom_auth::User;
use stockroom_inventory::ThresholdPolicy;

use crate::error::ServiceResult;
use crate::reports::low_stock_items;
use crate::store::{InventoryStore, StoreError};

/// Result of one low-stock check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertOutcome {
    NothingToReport,
    /// Items were low but nobody opted in to alerts.
    NoRecipients { items: usize },
    Sent { items: usize, recipients: usize },
    /// The transport refused the message; the error text is kept for the log.
    TransportFailed { items: usize, error: String },
}

impl AlertOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AlertOutcome::TransportFailed { .. })
    }
}

/// Gather low-stock items and opted-in recipients, compose, and send.
///
/// Store errors are returned; a transport error is logged and reported in
/// the outcome.
pub fn run_low_stock_check<S, T>(
    store: &S,
    policy: &ThresholdPolicy,
    transport: &T,
    now: DateTime<Utc>,
) -> ServiceResult<AlertOutcome>
where
    S: InventoryStore,
    T: AlertTransport + ?Sized,
{
    let (items, recipients) = store.read(|tx| -> Result<_, StoreError> {
        let items: Vec<LowStockItem> = low_stock_items(tx, policy)?;
        let recipients = alert_recipients(&tx.users()?);
        Ok((items, recipients))
    })?;

    let Some(message) = compose_alert(&items, now) else {
        info!("low-stock check: nothing to report");
        return Ok(AlertOutcome::NothingToReport);
    };
    if recipients.is_empty() {
        info!(items = items.len(), "low-stock check: no recipients opted in");
        return Ok(AlertOutcome::NoRecipients { items: items.len() });
    }

    match transport.send(&recipients, &message) {
        Ok(()) => {
            info!(items = items.len(), recipients = recipients.len(), "low-stock alert sent");
            Ok(AlertOutcome::Sent {
                items: items.len(),
                recipients: recipients.len(),
            })
        }
        Err(e) => {
            warn!(items = items.len(), error = %e, "low-stock alert delivery failed");
            Ok(AlertOutcome::TransportFailed {
                items: items.len(),
                error: format!("{e:#}"),
            })
        }
    }
}

/// Distinct alert addresses of opted-in users, sorted.
fn alert_recipients(users: &[User]) -> Vec<String> {
    let mut addresses: Vec<String> = users
        .iter()
        .filter_map(User::alert_address)
        .map(str::to_string)
        .collect();
    addresses.sort();
    addresses.dedup();
    addresses
}

/// Config for the low-stock alert runner.
#[derive(Debug, Clone)]
pub struct LowStockAlertRunner {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    /// Run one check right after start instead of waiting a full interval.
    pub run_on_start: bool,
}

impl Default for LowStockAlertRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            max_retries: 3,
            base_backoff: Duration::from_millis(500),
            run_on_start: false,
        }
    }
}

/// Handle for the running alert runner (shutdown + trigger hook).
#[derive(Debug)]
pub struct LowStockAlertRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl AlertScheduler for LowStockAlertRunnerHandle {
    fn trigger(&self) {
        // Capacity 1: a trigger while one is pending is dropped.
        let _ = self.trigger.try_send(());
    }

    fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl LowStockAlertRunner {
    /// Spawn the runner thread.
    ///
    /// - Schedule: a check every `interval`
    /// - Trigger: `handle.trigger()` requests an immediate check
    /// - Failures: logged and retried with bounded exponential backoff
    pub fn spawn<S, T>(
        &self,
        name: &'static str,
        store: Arc<S>,
        policy: ThresholdPolicy,
        transport: Arc<T>,
    ) -> std::io::Result<LowStockAlertRunnerHandle>
    where
        S: InventoryStore + 'static,
        T: AlertTransport,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let cfg = self.clone();
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runner_loop(name, cfg, shutdown_rx, trigger_rx, store, policy, transport))?;

        Ok(LowStockAlertRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

fn runner_loop<S, T>(
    name: &'static str,
    cfg: LowStockAlertRunner,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    store: Arc<S>,
    policy: ThresholdPolicy,
    transport: Arc<T>,
) where
    S: InventoryStore,
    T: AlertTransport,
{
    info!(runner = name, interval = ?cfg.interval, "low-stock alert runner started");

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = cfg.run_on_start;
    let mut failures: u32 = 0;
    let mut backoff_until: Option<Instant> = None;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if let Some(until) = backoff_until {
            if Instant::now() < until {
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            backoff_until = None;
        }

        if !pending {
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(250));
            thread::sleep(sleep_for);
            continue;
        }

        pending = false;

        let failed = match run_low_stock_check(&*store, &policy, &*transport, Utc::now()) {
            Ok(outcome) => outcome.is_failure(),
            Err(e) => {
                warn!(runner = name, error = %e, "low-stock check failed");
                true
            }
        };

        if !failed {
            failures = 0;
            continue;
        }

        failures += 1;
        if failures <= cfg.max_retries {
            pending = true;
            let wait = backoff(cfg.base_backoff, failures);
            warn!(runner = name, attempt = failures, ?wait, "retrying low-stock check");
            backoff_until = Some(Instant::now() + wait);
        } else {
            warn!(runner = name, attempts = failures, "giving up until the next scheduled check");
            failures = 0;
        }
    }

    info!(runner = name, "low-stock alert runner stopped");
}

/// `base * 2^(attempt-1)`, capped at 60s.
fn backoff(base: Duration, attempt: u32) -> Duration {
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(u128::from(pow));
    Duration::from_millis(u64::try_from(ms.min(60_000)).unwrap_or(60_000))
}
