use actix_web::{HttpResponse, Responder, delete, get, post, web};
use log::{info, warn};

use super::models::{AppState, Notice, error_response};
use super::text;
use crate::error::ConsoleError;
use crate::snapshot::View;
use crate::view::format::format_amount;
use crate::wallet::Wallet;

#[get("/wallets/")]
pub async fn list_wallets(state: web::Data<AppState>) -> impl Responder {
    text(state.views.get(View::Wallets))
}

/// Ask the ledger for a new wallet and remember it once confirmed.
#[post("/wallets/")]
pub async fn create_wallet(state: web::Data<AppState>) -> impl Responder {
    let created = match state.ledger.create_wallet().await {
        Ok(w) => w,
        Err(e) => return error_response("Error creating wallet", &e),
    };
    let wallet = Wallet::new(created.address, created.public_key);

    let added = {
        let mut store = state.wallets.lock().expect("mutex poisoned");
        store.add(wallet.clone())
    };
    if let Err(e) = added {
        return error_response("Error creating wallet", &e);
    }
    state.snapshots.notify(View::Wallets);
    info!("wallet {} created", wallet.address);

    if let Err(e) = state.refresher.balance(&wallet.address).await {
        warn!("balance for new wallet {} unavailable: {e}", wallet.address);
    }

    HttpResponse::Ok().json(Notice::ok(format!(
        "Wallet {} created successfully! 🎉",
        wallet.address
    )))
}

/// Delete on the ledger first; the local entry goes only after it confirms.
#[delete("/wallets/{address}/")]
pub async fn delete_wallet(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let address = path.into_inner().0;

    if let Err(e) = state.ledger.delete_wallet(&address).await {
        return error_response("Error deleting wallet", &e);
    }

    let removed = {
        let mut store = state.wallets.lock().expect("mutex poisoned");
        store.remove(&address)
    };
    match removed {
        Ok(n) => {
            // forget_balance re-renders the wallet view
            state.snapshots.forget_balance(&address);
            info!("wallet {address} deleted ({n} local entr{})", if n == 1 { "y" } else { "ies" });
            HttpResponse::Ok().json(Notice::ok("Wallet deleted successfully"))
        }
        Err(e) => error_response("Error deleting wallet", &e),
    }
}

#[post("/wallets/{address}/faucet/")]
pub async fn request_faucet(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let address = path.into_inner().0;
    let known = state.wallets.lock().expect("mutex poisoned").contains(&address);
    if !known {
        return error_response("Faucet request failed", &ConsoleError::UnknownWallet(address));
    }

    let grant = match state.ledger.request_faucet(&address).await {
        Ok(g) => g,
        Err(e) => return error_response("Faucet request failed", &e),
    };
    info!("faucet granted {} to {address}", grant.amount);

    if let Err(e) = state.refresher.pending().await {
        warn!("pending refresh after faucet failed: {e}");
    }

    HttpResponse::Ok().json(Notice::ok(format!(
        "💰 {} coins requested! Mine a block to confirm.",
        format_amount(grant.amount)
    )))
}
