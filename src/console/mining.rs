use actix_web::{HttpResponse, Responder, get, post, web};

use super::models::{AppState, MineForm, Notice, error_response};
use crate::error::ConsoleError;
use crate::mining::{IgnoreReason, TriggerOutcome};
use crate::view::StatusKind;

#[get("/mine/")]
pub async fn get_mining(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.mining.status())
}

/// Mine the pending pool, optionally rewarding one of the stored wallets.
/// Responds once the ledger answers; reconciliation keeps running after.
#[post("/mine/")]
pub async fn mine_block(
    state: web::Data<AppState>,
    body: Option<web::Json<MineForm>>,
) -> impl Responder {
    let form = body.map(|b| b.into_inner()).unwrap_or_default();
    let miner = form.miner_address.filter(|a| !a.trim().is_empty());

    if let Some(address) = &miner {
        let known = state.wallets.lock().expect("mutex poisoned").contains(address);
        if !known {
            return error_response("Mining failed", &ConsoleError::UnknownWallet(address.clone()));
        }
    }

    match state.mining.trigger(miner).await {
        TriggerOutcome::Ignored(IgnoreReason::Busy) => {
            HttpResponse::Conflict().json(Notice::failure("Mining already in progress"))
        }
        TriggerOutcome::Ignored(IgnoreReason::NothingToMine) => {
            HttpResponse::Conflict().json(Notice::failure("No pending transactions to mine"))
        }
        TriggerOutcome::Completed { status, .. } => match status.kind {
            StatusKind::Error => HttpResponse::BadRequest().json(Notice::failure(status.text)),
            _ => HttpResponse::Ok().json(Notice::ok(status.text)),
        },
    }
}
