mod config;
mod console;
mod error;
mod ledger;
mod mining;
mod snapshot;
mod sync;
mod view;
mod wallet;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};
use std::io;
use std::sync::Arc;

use config::Config;
use console::AppState;
use ledger::HttpLedgerClient;
use sync::SyncLoop;
use wallet::{FileStore, WalletStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let ledger = HttpLedgerClient::new(&cfg.ledger_url, cfg.request_timeout)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let storage = FileStore::open(&cfg.wallet_store_path);
    info!("wallets persisted to {}", storage.path().display());
    let wallets = WalletStore::load(Box::new(storage));

    let state = web::Data::new(AppState::new(Arc::new(ledger), wallets, cfg.status_display));

    let refresher = state.refresher.clone();
    tokio::spawn(async move {
        for (address, e) in refresher.balances().await {
            warn!("initial balance for {address} unavailable: {e}");
        }
    });
    SyncLoop::new(state.refresher.clone(), cfg.poll_interval, &cfg.sync_targets).spawn();

    info!("ledger at {}, polling every {:?}", cfg.ledger_url, cfg.poll_interval);
    println!("⛓️ Starting ledger console at http://{}:{}/console/", cfg.host, cfg.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(console::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await
}
