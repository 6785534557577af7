use actix_web::HttpResponse;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConsoleError;
use crate::ledger::LedgerApi;
use crate::mining::MiningWorkflow;
use crate::snapshot::SnapshotStore;
use crate::sync::{RECONCILE_TARGETS, Refresher};
use crate::view::RenderedViews;
use crate::wallet::{SharedWallets, WalletStore};

/// Shared console state: the wallet store, the latest server snapshots and
/// the workflows operating on them.
pub struct AppState {
    pub ledger: Arc<dyn LedgerApi>,
    pub wallets: SharedWallets,
    pub snapshots: Arc<SnapshotStore>,
    pub refresher: Refresher,
    pub mining: MiningWorkflow,
    pub views: Arc<RenderedViews>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerApi>, wallets: WalletStore, status_display: Duration) -> Self {
        let wallets = wallets.shared();
        let snapshots = SnapshotStore::new();
        let refresher = Refresher::new(ledger.clone(), wallets.clone(), snapshots.clone());
        let mining = MiningWorkflow::new(
            ledger.clone(),
            snapshots.clone(),
            refresher.clone(),
            status_display,
        );
        let views = RenderedViews::attach(wallets.clone(), &snapshots);
        Self {
            ledger,
            wallets,
            snapshots,
            refresher,
            mining,
            views,
        }
    }

    /// Pull chain, pool, stats and every stored wallet's balance.
    pub async fn refresh_all(&self) {
        let failures = self.refresher.run_targets(&RECONCILE_TARGETS).await;
        if !failures.is_empty() {
            warn!("refresh finished with {} failure(s)", failures.len());
        }
    }
}

/* ---------- Request bodies ---------- */

#[derive(Deserialize)]
pub struct TransferForm {
    pub sender_address: String,
    pub receiver_address: String,
    pub amount: f64,
}

#[derive(Deserialize, Default)]
pub struct MineForm {
    #[serde(default)]
    pub miner_address: Option<String>,
}

/* ---------- Responses ---------- */

/// Outcome of a user action, the console's toast.
#[derive(Debug, Serialize, Deserialize)]
pub struct Notice {
    pub success: bool,
    pub message: String,
}

impl Notice {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Map a failed action to a notice with a fitting status code.
pub fn error_response(context: &str, err: &ConsoleError) -> HttpResponse {
    if err.is_local_guard() {
        debug!("{context}: {err}");
    } else {
        warn!("{context}: {err}");
    }
    let notice = Notice::failure(format!("{context}: {err}"));
    match err {
        ConsoleError::Transport(_) | ConsoleError::Decode(_) => {
            HttpResponse::BadGateway().json(notice)
        }
        ConsoleError::Storage(_) | ConsoleError::InvalidUrl(_) => {
            HttpResponse::InternalServerError().json(notice)
        }
        ConsoleError::UnknownWallet(_) => HttpResponse::NotFound().json(notice),
        ConsoleError::DuplicateWallet(_) => HttpResponse::Conflict().json(notice),
        ConsoleError::Rejected(_)
        | ConsoleError::InvalidAmount(_)
        | ConsoleError::InsufficientBalance { .. } => HttpResponse::BadRequest().json(notice),
    }
}
