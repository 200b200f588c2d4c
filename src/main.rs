//! `url2pdf-server`: the print service over HTTP.
//!
//! Configuration comes from the environment (see the crate docs for the
//! variable list). Run with:
//!
//! ```bash
//! PRINT_BUCKET=rendered-pdfs cargo run --bin url2pdf-server
//! ```

use std::sync::Arc;

use tokio::signal;
use url2pdf_api::SessionManager;
use url2pdf_api::integrations::axum::router;

/// Wait for Ctrl+C or SIGTERM, then close the browser.
async fn shutdown_signal(sessions: Arc<SessionManager>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, closing browser session...");
    sessions.shutdown();
    log::info!("Cleanup complete");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (service, config) = url2pdf_api::init_print_service().await?;
    let sessions = Arc::clone(service.sessions());
    let app = router(service, config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    log::info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions))
        .await?;

    log::info!("Server stopped");
    Ok(())
}
