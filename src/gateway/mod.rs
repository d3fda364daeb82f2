//! HTTP gateway
//!
//! Thin REST facade over the stores and the transfer engine. Handlers parse
//! and validate transport-level input, delegate to the engine or a store, and
//! wrap results in the `ApiResponse` envelope. All business decisions live
//! below this layer.

pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;

use handlers::{accounts, health, rates, transfers};
use state::AppState;

/// Build the full route table
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Accounts
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts/{account_no}", get(accounts::get_account))
        .route(
            "/accounts/{account_no}/balance",
            get(accounts::get_balance),
        )
        // Transfers
        .route("/transfers", post(transfers::create_transfer))
        .route("/transfers", get(transfers::list_transfers))
        .route("/transfers/{transfer_id}", get(transfers::get_transfer))
        // Exchange rates
        .route("/rates", get(rates::list_rates))
        .route("/rates/effective", get(rates::list_effective_rates))
        .route("/rates/{rate_id}", put(rates::update_rate));

    Router::new()
        .nest("/api/v1", api_routes)
        .with_state(state)
}

/// Start the HTTP gateway server
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Gateway listening on http://{}", addr);
    println!("📒 Accounts:  /api/v1/accounts");
    println!("💱 Rates:     /api/v1/rates");
    println!("💸 Transfers: /api/v1/transfers");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}
