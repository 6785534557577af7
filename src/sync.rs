use futures::future::join_all;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::config::SyncTarget;
use crate::error::{ConsoleError, Result};
use crate::ledger::LedgerApi;
use crate::snapshot::SnapshotStore;
use crate::wallet::SharedWallets;

/// Everything refreshed after a successful mine.
pub const RECONCILE_TARGETS: [SyncTarget; 4] = [
    SyncTarget::Chain,
    SyncTarget::Pending,
    SyncTarget::Stats,
    SyncTarget::Balances,
];

#[derive(Debug)]
pub struct FetchFailure {
    pub target: SyncTarget,
    pub error: ConsoleError,
}

/// Pulls server state into the snapshot store, one fetch per resource.
#[derive(Clone)]
pub struct Refresher {
    ledger: Arc<dyn LedgerApi>,
    wallets: SharedWallets,
    snapshots: Arc<SnapshotStore>,
}

impl Refresher {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        wallets: SharedWallets,
        snapshots: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            ledger,
            wallets,
            snapshots,
        }
    }

    pub async fn chain(&self) -> Result<()> {
        let chain = self.ledger.chain().await?;
        self.snapshots.replace_chain(chain);
        Ok(())
    }

    pub async fn pending(&self) -> Result<()> {
        let pending = self.ledger.pending().await?;
        self.snapshots.replace_pending(pending);
        Ok(())
    }

    pub async fn stats(&self) -> Result<()> {
        let stats = self.ledger.mining_stats().await?;
        self.snapshots.replace_stats(stats);
        Ok(())
    }

    /// Fetch one wallet's balance. Addresses that are not (or no longer)
    /// stored are neither queried nor recorded.
    pub async fn balance(&self, address: &str) -> Result<()> {
        if !self.is_stored(address) {
            debug!("skipping balance for removed wallet {address}");
            return Ok(());
        }
        let balance = self.ledger.balance(address).await?;
        if self.is_stored(address) {
            self.snapshots.set_balance(address, balance);
        } else {
            debug!("dropping balance for {address}, wallet was removed meanwhile");
        }
        Ok(())
    }

    /// Fetch every stored wallet's balance concurrently.
    pub async fn balances(&self) -> Vec<(String, ConsoleError)> {
        let addresses = self.wallets.lock().expect("mutex poisoned").addresses();
        let results = join_all(addresses.iter().map(|a| self.balance(a))).await;
        addresses
            .into_iter()
            .zip(results)
            .filter_map(|(address, r)| r.err().map(|e| (address, e)))
            .collect()
    }

    pub async fn run_target(&self, target: SyncTarget) -> Vec<FetchFailure> {
        let result = match target {
            SyncTarget::Chain => self.chain().await,
            SyncTarget::Pending => self.pending().await,
            SyncTarget::Stats => self.stats().await,
            SyncTarget::Balances => {
                return self
                    .balances()
                    .await
                    .into_iter()
                    .map(|(address, error)| {
                        warn!("balance refresh for {address} failed: {error}");
                        FetchFailure { target, error }
                    })
                    .collect();
            }
        };
        match result {
            Ok(()) => Vec::new(),
            Err(error) => {
                warn!("{target} refresh failed: {error}");
                vec![FetchFailure { target, error }]
            }
        }
    }

    /// Run the given fetches side by side; one failing never stops the others.
    pub async fn run_targets(&self, targets: &[SyncTarget]) -> Vec<FetchFailure> {
        join_all(targets.iter().map(|t| self.run_target(*t)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    fn is_stored(&self, address: &str) -> bool {
        self.wallets.lock().expect("mutex poisoned").contains(address)
    }
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub failures: Vec<FetchFailure>,
}

/// Fixed-period polling of the ledger's read endpoints.
#[derive(Clone)]
pub struct SyncLoop {
    refresher: Refresher,
    period: Duration,
    targets: Arc<[SyncTarget]>,
}

impl SyncLoop {
    pub fn new(refresher: Refresher, period: Duration, targets: &[SyncTarget]) -> Self {
        Self {
            refresher,
            period,
            targets: targets.into(),
        }
    }

    pub async fn tick(&self) -> TickReport {
        TickReport {
            failures: self.refresher.run_targets(&self.targets).await,
        }
    }

    /// Start polling; the first tick fires immediately. Each tick runs as its
    /// own task so a slow response never delays the next one.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let this = self.clone();
                tokio::spawn(async move {
                    let report = this.tick().await;
                    if !report.failures.is_empty() {
                        debug!("sync tick finished with {} failure(s)", report.failures.len());
                    }
                });
            }
        })
    }
}
