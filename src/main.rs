//! fundrail - Multi-Currency Fund Transfer Service
//!
//! This is the main entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐
//! │ Gateway  │───▶│  Engine  │───▶│    Stores    │
//! │ (axum)   │    │(validate │    │ (accounts,   │
//! └──────────┘    │ + settle)│    │ rates, log)  │
//!                 └──────────┘    └──────────────┘
//!                       ▲
//!                 ┌──────────┐
//!                 │Reconciler│  sweeps stalled PENDING rows
//!                 └──────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use fundrail::account::store::MemoryAccountStore;
use fundrail::config::AppConfig;
use fundrail::gateway::{self, state::AppState};
use fundrail::rate::store::MemoryRateStore;
use fundrail::transfer::engine::TransferEngine;
use fundrail::transfer::log::MemoryTransferLog;
use fundrail::transfer::reconciler::{Reconciler, ReconcilerConfig};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() {
    let env = get_env();
    let app_config = AppConfig::load(&env);
    let _log_guard = fundrail::logging::init_logging(&app_config);

    tracing::info!("Starting fundrail in {} mode", env);
    println!("=== fundrail: Fund Transfer Service ===");

    // Step 1: Stores
    println!("\n[1] Initializing stores...");
    let accounts = Arc::new(MemoryAccountStore::new(Duration::from_millis(
        app_config.engine.lock_wait_ms,
    )));
    let rates = Arc::new(MemoryRateStore::new());
    let transfers = Arc::new(MemoryTransferLog::new());

    // Step 2: Seed data
    if let Some(ref seed_path) = app_config.seed_file {
        println!("\n[2] Loading seed data from {}...", seed_path);
        match fundrail::seed::apply(seed_path, accounts.as_ref(), rates.as_ref()).await {
            Ok(summary) => {
                println!(
                    "✅ Seeded {} accounts, {} rates",
                    summary.accounts, summary.rates
                );
            }
            Err(e) => {
                eprintln!("❌ FATAL: Seed failed: {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("\n[2] No seed file configured, starting empty");
    }

    // Step 3: Engine
    println!("\n[3] Initializing transfer engine...");
    let engine = Arc::new(TransferEngine::new(
        accounts.clone(),
        rates.clone(),
        transfers.clone(),
    ));

    // Step 4: Reconciler
    if app_config.reconciler.enabled {
        let reconciler = Reconciler::new(
            transfers.clone(),
            ReconcilerConfig {
                sweep_interval: Duration::from_secs(app_config.reconciler.sweep_interval_secs),
                stale_after: Duration::from_secs(app_config.reconciler.stale_after_secs),
            },
        );
        tokio::spawn(async move {
            reconciler.run().await;
        });
        println!("\n[4] 🔄 Reconciler started");
    } else {
        println!("\n[4] ⚠️  Reconciler disabled");
    }

    // Step 5: Gateway
    let state = Arc::new(AppState::new(engine, accounts, rates, transfers));
    let port = get_port_override().unwrap_or(app_config.gateway.port);

    println!("\n🎯 System ready!");
    gateway::run_server(state, &app_config.gateway.host, port).await;
}
