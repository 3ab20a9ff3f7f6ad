//! Sensorboard - Polling sensor dashboard
//!
//! Polls a backend for sensor groups and their latest readings, reconciles
//! them into an in-memory view tree, and serves that tree as a web page.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod model;
pub mod poller;
pub mod reconcile;
pub mod state;
pub mod view;

pub use config::{load_config, Config, Strategy};
pub use error::{Result, SensorboardError};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::BackendClient;
use crate::io::ReqwestHttpClient;
use crate::poller::Poller;

/// Run the sensorboard service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.backend.request_timeout())?);
    let backend = Arc::new(BackendClient::new(&config.backend, http)?);
    let state = state::new_state_handle();
    let cancel = CancellationToken::new();

    let poller = Poller::new(
        backend,
        Arc::clone(&state),
        &config.polling,
        cancel.clone(),
    );

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Start dashboard if enabled
    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        // Match the page to the fastest timer that can change the view
        let refresh = match config.polling.strategy {
            Strategy::Keyed => config.polling.groups_interval(),
            Strategy::Batched => config
                .polling
                .groups_interval()
                .min(config.polling.sensors_interval()),
        };
        let dashboard_state = Arc::clone(&state);
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let router = dashboard::build_router(dashboard_state, refresh);
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Dashboard listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    tracing::info!("Sensorboard started against {}", config.backend.base_url);

    // Poll until cancelled
    poller.run().await;

    tracing::info!("Sensorboard stopped");

    Ok(())
}
