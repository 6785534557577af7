use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{AppState, error_response};
use super::text;
use crate::snapshot::View;
use crate::view::render_validation;

/// Chain view from the last snapshot, newest block first.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    text(state.views.get(View::Chain))
}

#[get("/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    text(state.views.get(View::Pending))
}

/// Ask the ledger to validate its chain and show the verdict.
#[post("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let report = match state.ledger.validate_chain().await {
        Ok(r) => r,
        Err(e) => return error_response("Validation failed", &e),
    };
    info!(
        "chain validation: valid={} blocks={} errors={}",
        report.valid,
        report.total_blocks,
        report.errors.len()
    );
    let message = render_validation(&report);
    state.snapshots.replace_validation(report);
    HttpResponse::Ok().json(message)
}
