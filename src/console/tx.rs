use actix_web::{HttpResponse, Responder, post, web};
use log::{debug, info, warn};

use super::models::{AppState, Notice, TransferForm, error_response};
use crate::error::{ConsoleError, Result};
use crate::wallet::Wallet;

/// Local, advisory checks before a transfer goes to the ledger.
/// The ledger still has the final word and may reject anyway.
pub(crate) fn check_transfer(
    sender: Option<&Wallet>,
    sender_address: &str,
    amount: f64,
    known_balance: Option<f64>,
) -> Result<Wallet> {
    let sender = sender
        .cloned()
        .ok_or_else(|| ConsoleError::UnknownWallet(sender_address.to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConsoleError::InvalidAmount(format!("{amount} must be greater than zero")));
    }
    if let Some(available) = known_balance {
        if available < amount {
            return Err(ConsoleError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
    }
    Ok(sender)
}

/// Submit a transfer from a stored wallet into the ledger's pending pool.
#[post("/transactions/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<TransferForm>,
) -> impl Responder {
    let receiver = body.receiver_address.trim();
    debug!(
        "POST /transactions/ - {} -> {receiver} ({})",
        body.sender_address, body.amount
    );

    let sender = {
        let store = state.wallets.lock().expect("mutex poisoned");
        store.get(&body.sender_address).cloned()
    };
    let known_balance = state.snapshots.balance(&body.sender_address);
    let sender = match check_transfer(sender.as_ref(), &body.sender_address, body.amount, known_balance) {
        Ok(s) => s,
        Err(e) => return error_response("Transaction failed", &e),
    };

    if let Err(e) = state
        .ledger
        .submit_transaction(&sender, receiver, body.amount)
        .await
    {
        return error_response("Transaction failed", &e);
    }
    info!("transaction {} -> {receiver} ({}) submitted", sender.address, body.amount);

    if let Err(e) = state.refresher.pending().await {
        warn!("pending refresh after transaction failed: {e}");
    }

    HttpResponse::Ok().json(Notice::ok("Transaction submitted successfully! ✅"))
}
