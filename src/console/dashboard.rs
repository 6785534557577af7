use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{AppState, Notice, error_response};
use super::text;
use crate::snapshot::View;
use crate::view::render_mining_status;

/// Every view on one page.
#[get("/")]
pub async fn get_dashboard(state: web::Data<AppState>) -> impl Responder {
    let sections = [
        ("Wallets", state.views.get(View::Wallets)),
        ("Mining", render_mining_status(&state.mining.status())),
        ("Mining Stats", state.views.get(View::Stats)),
        ("Pending Transactions", state.views.get(View::Pending)),
        ("Blockchain", state.views.get(View::Chain)),
        ("Validation", state.views.get(View::Validation)),
    ];
    let mut page = String::new();
    for (title, body) in sections {
        page.push_str(&format!("== {title} ==\n{}\n", body.trim_end()));
        page.push('\n');
    }
    text(page)
}

/// Forget every stored wallet and snapshot, then load fresh state.
#[post("/reset/")]
pub async fn reset(state: web::Data<AppState>) -> impl Responder {
    let cleared = state.wallets.lock().expect("mutex poisoned").reset();
    if let Err(e) = cleared {
        return error_response("Reset failed", &e);
    }
    state.mining.reset();
    state.snapshots.clear();
    info!("local data reset");

    state.refresh_all().await;
    HttpResponse::Ok().json(Notice::ok("Local data cleared"))
}
