use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ledger::{ChainSnapshot, MiningStats, PendingSnapshot, ValidationReport};

/// A rendered region of the console, used to scope change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Wallets,
    Chain,
    Pending,
    Stats,
    Validation,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Wallets,
        View::Chain,
        View::Pending,
        View::Stats,
        View::Validation,
    ];
}

/// Last server state seen by the console. Each field is replaced whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshots {
    pub chain: Option<ChainSnapshot>,
    pub pending: Option<PendingSnapshot>,
    pub stats: Option<MiningStats>,
    pub validation: Option<ValidationReport>,
    pub balances: HashMap<String, f64>,
}

impl Snapshots {
    pub fn pending_count(&self) -> Option<usize> {
        self.pending.as_ref().map(|p| p.count)
    }
}

type Subscriber = Box<dyn Fn(View) + Send + Sync>;

/// Server snapshots plus the callbacks re-rendering what changed.
/// Subscribers run after the snapshot lock is released.
#[derive(Default)]
pub struct SnapshotStore {
    inner: Mutex<Snapshots>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SnapshotStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(View) + Send + Sync + 'static,
    {
        self.subscribers
            .lock()
            .expect("mutex poisoned")
            .push(Box::new(callback));
    }

    pub fn notify(&self, view: View) {
        let subscribers = self.subscribers.lock().expect("mutex poisoned");
        for subscriber in subscribers.iter() {
            subscriber(view);
        }
    }

    /// Copy of the current snapshots.
    pub fn read(&self) -> Snapshots {
        self.inner.lock().expect("mutex poisoned").clone()
    }

    pub fn pending_count(&self) -> Option<usize> {
        self.inner.lock().expect("mutex poisoned").pending_count()
    }

    pub fn balance(&self, address: &str) -> Option<f64> {
        self.inner
            .lock()
            .expect("mutex poisoned")
            .balances
            .get(address)
            .copied()
    }

    pub fn replace_chain(&self, chain: ChainSnapshot) {
        debug!("chain snapshot replaced ({} blocks)", chain.length);
        self.update(View::Chain, |s| s.chain = Some(chain));
    }

    pub fn replace_pending(&self, pending: PendingSnapshot) {
        debug!("pending snapshot replaced ({} txs)", pending.count);
        self.update(View::Pending, |s| s.pending = Some(pending));
    }

    pub fn replace_stats(&self, stats: MiningStats) {
        debug!("mining stats replaced (difficulty {})", stats.current_difficulty);
        self.update(View::Stats, |s| s.stats = Some(stats));
    }

    pub fn replace_validation(&self, report: ValidationReport) {
        self.update(View::Validation, |s| s.validation = Some(report));
    }

    pub fn set_balance(&self, address: &str, balance: f64) {
        self.update(View::Wallets, |s| {
            s.balances.insert(address.to_string(), balance);
        });
    }

    pub fn forget_balance(&self, address: &str) {
        self.update(View::Wallets, |s| {
            s.balances.remove(address);
        });
    }

    /// Drop every snapshot and tell all views.
    pub fn clear(&self) {
        *self.inner.lock().expect("mutex poisoned") = Snapshots::default();
        for view in View::ALL {
            self.notify(view);
        }
    }

    fn update<F: FnOnce(&mut Snapshots)>(&self, view: View, apply: F) {
        {
            let mut inner = self.inner.lock().expect("mutex poisoned");
            apply(&mut inner);
        }
        self.notify(view);
    }
}
