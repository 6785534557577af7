use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use super::render;
use crate::snapshot::{SnapshotStore, View};
use crate::wallet::SharedWallets;

/// Last rendering of every view, refreshed per view on snapshot changes.
pub struct RenderedViews {
    views: Mutex<HashMap<View, String>>,
    wallets: SharedWallets,
    snapshots: Weak<SnapshotStore>,
}

impl RenderedViews {
    /// Render everything once and subscribe to further changes.
    pub fn attach(wallets: SharedWallets, snapshots: &Arc<SnapshotStore>) -> Arc<Self> {
        let cache = Arc::new(Self {
            views: Mutex::new(HashMap::new()),
            wallets,
            snapshots: Arc::downgrade(snapshots),
        });
        for view in View::ALL {
            cache.refresh(view);
        }
        let weak = Arc::downgrade(&cache);
        snapshots.subscribe(move |view| {
            if let Some(cache) = weak.upgrade() {
                cache.refresh(view);
            }
        });
        cache
    }

    pub fn refresh(&self, view: View) {
        let Some(snapshots) = self.snapshots.upgrade() else {
            return;
        };
        let wallets = self.wallets.lock().expect("mutex poisoned").all().to_vec();
        let text = render(view, &wallets, &snapshots.read());
        debug!("re-rendered {view:?} view");
        self.views.lock().expect("mutex poisoned").insert(view, text);
    }

    pub fn get(&self, view: View) -> String {
        self.views
            .lock()
            .expect("mutex poisoned")
            .get(&view)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PendingSnapshot;
    use crate::wallet::{MemoryStore, Wallet, WalletStore};

    #[test]
    fn only_the_affected_view_is_rerendered() {
        let wallets = WalletStore::load(Box::new(MemoryStore::new())).shared();
        let snapshots = SnapshotStore::new();
        let cache = RenderedViews::attach(wallets.clone(), &snapshots);
        assert_eq!(cache.get(View::Pending), "Loading pending transactions...");

        wallets.lock().unwrap().add(Wallet::new("A1", "pub1")).unwrap();
        snapshots.replace_pending(PendingSnapshot::default());

        assert!(cache.get(View::Pending).contains("No pending transactions"));
        // wallet view is stale until something notifies it
        assert!(cache.get(View::Wallets).starts_with("No wallets created yet"));

        snapshots.set_balance("A1", 5.0);
        assert!(cache.get(View::Wallets).contains("Balance: 5 coins"));
    }
}
