//! Document Store Demo Entry Point
//!
//! Connects to OpenSearch, makes sure the student index exists and runs the
//! walkthrough of every facade operation.

use std::env;

use document_store_demo::{DemoError, Dependencies, Settings, Walkthrough};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("document_store_demo=info,document_store_repository=info")
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "document-store-demo",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "document-store-demo",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting document store demo");

    let deps = match Dependencies::new(Settings::from_env()).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match Walkthrough::new(deps.facade).run().await {
        Ok(report) => {
            info!(
                created_id = %report.created_id,
                search_hits = report.search_results.len(),
                bulk_failed = report.bulk.failed,
                "Walkthrough completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Walkthrough failed");
            Err(e)
        }
    }
}
