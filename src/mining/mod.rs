use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::ledger::{LedgerApi, MineReport};
use crate::snapshot::SnapshotStore;
use crate::sync::{RECONCILE_TARGETS, Refresher};
use crate::view::StatusMessage;
use crate::view::format::format_duration;

pub const IN_PROGRESS_TEXT: &str = "Mining in progress...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningPhase {
    Idle,
    InProgress,
    Reporting,
}

/// What the console shows about mining right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiningStatus {
    pub phase: MiningPhase,
    pub enabled: bool,
    pub message: Option<StatusMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A previous run is still in progress or reporting.
    Busy,
    /// The pending pool is empty or has not been fetched yet.
    NothingToMine,
}

pub enum TriggerOutcome {
    /// No request was sent.
    Ignored(IgnoreReason),
    /// The mine request resolved. `reconciliation` is set only on success.
    Completed {
        status: StatusMessage,
        reconciliation: Option<JoinHandle<()>>,
    },
}

struct Inner {
    phase: MiningPhase,
    message: Option<StatusMessage>,
    run: u64,
}

/// Idle -> InProgress -> Reporting -> Idle.
#[derive(Clone)]
pub struct MiningWorkflow {
    ledger: Arc<dyn LedgerApi>,
    snapshots: Arc<SnapshotStore>,
    refresher: Refresher,
    display_for: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl MiningWorkflow {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        snapshots: Arc<SnapshotStore>,
        refresher: Refresher,
        display_for: Duration,
    ) -> Self {
        Self {
            ledger,
            snapshots,
            refresher,
            display_for,
            inner: Arc::new(Mutex::new(Inner {
                phase: MiningPhase::Idle,
                message: None,
                run: 0,
            })),
        }
    }

    pub fn phase(&self) -> MiningPhase {
        self.inner.lock().expect("mutex poisoned").phase
    }

    pub fn status(&self) -> MiningStatus {
        let inner = self.inner.lock().expect("mutex poisoned");
        MiningStatus {
            phase: inner.phase,
            enabled: self.enabled_in(inner.phase),
            message: inner.message.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_in(self.phase())
    }

    fn enabled_in(&self, phase: MiningPhase) -> bool {
        phase == MiningPhase::Idle && self.snapshots.pending_count().is_some_and(|n| n > 0)
    }

    /// Run one mining round for `miner_address` (reward recipient, optional).
    pub async fn trigger(&self, miner_address: Option<String>) -> TriggerOutcome {
        let run = {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            if inner.phase != MiningPhase::Idle {
                return TriggerOutcome::Ignored(IgnoreReason::Busy);
            }
            if !self.enabled_in(inner.phase) {
                return TriggerOutcome::Ignored(IgnoreReason::NothingToMine);
            }
            inner.phase = MiningPhase::InProgress;
            inner.message = Some(StatusMessage::info(IN_PROGRESS_TEXT));
            inner.run += 1;
            inner.run
        };

        // detached: dropping this future must not abandon the round
        let this = self.clone();
        let round = tokio::spawn(async move { this.run_round(run, miner_address).await });
        match round.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("mining run {run} aborted: {e}");
                let status = StatusMessage::error(format!("Mining aborted: {e}"));
                let mut inner = self.inner.lock().expect("mutex poisoned");
                if inner.run == run {
                    inner.phase = MiningPhase::Idle;
                    inner.message = None;
                }
                TriggerOutcome::Completed {
                    status,
                    reconciliation: None,
                }
            }
        }
    }

    async fn run_round(&self, run: u64, miner_address: Option<String>) -> TriggerOutcome {
        let result = self.ledger.mine(miner_address.as_deref()).await;

        let (status, reconciliation) = match result {
            Ok(report) => {
                let status = StatusMessage::success(success_text(&report));
                info!("mining run {run}: {}", status.text);
                let refresher = self.refresher.clone();
                let handle = tokio::spawn(async move {
                    let failures = refresher.run_targets(&RECONCILE_TARGETS).await;
                    if !failures.is_empty() {
                        warn!("post-mining reconciliation had {} failure(s)", failures.len());
                    }
                });
                (status, Some(handle))
            }
            Err(e) => {
                warn!("mining run {run} failed: {e}");
                (StatusMessage::error(e.to_string()), None)
            }
        };

        let current = {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            let current = inner.run == run;
            if current {
                inner.phase = MiningPhase::Reporting;
                inner.message = Some(status.clone());
            }
            current
        };
        if current {
            self.schedule_idle(run);
        } else {
            info!("mining run {run} finished after a reset; status not shown");
        }

        TriggerOutcome::Completed {
            status,
            reconciliation,
        }
    }

    /// Back to Idle after the display period, unless a newer run took over.
    fn schedule_idle(&self, run: u64) {
        let inner = self.inner.clone();
        let display_for = self.display_for;
        tokio::spawn(async move {
            tokio::time::sleep(display_for).await;
            let mut inner = inner.lock().expect("mutex poisoned");
            if inner.run == run && inner.phase == MiningPhase::Reporting {
                inner.phase = MiningPhase::Idle;
                inner.message = None;
            }
        });
    }

    /// Forget any in-flight state (console reset).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        inner.run += 1;
        inner.phase = MiningPhase::Idle;
        inner.message = None;
    }
}

fn success_text(report: &MineReport) -> String {
    let mut text = report.message.clone();
    if let Some(t) = report.mining_time {
        text.push_str(&format!(" in {}", format_duration(t)));
    }
    if let Some(d) = report.difficulty {
        text.push_str(&format!(" (difficulty {d})"));
    }
    text
}
