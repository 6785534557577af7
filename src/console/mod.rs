mod chain;
mod dashboard;
mod health;
mod mining;
pub mod models;
mod stats;
mod tx;
mod wallet;

use actix_web::HttpResponse;
use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/console")
            .service(health::health_check)
            .service(dashboard::get_dashboard)
            .service(dashboard::reset)
            .service(wallet::list_wallets)
            .service(wallet::create_wallet)
            .service(wallet::delete_wallet)
            .service(wallet::request_faucet)
            .service(tx::post_transaction)
            .service(chain::get_chain)
            .service(chain::get_pending)
            .service(chain::validate_chain)
            .service(stats::get_stats)
            .service(mining::get_mining)
            .service(mining::mine_block),
    );
}

fn text(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(body)
}
