//! HTTP JSON API over [ExpenseService].

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{
        Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN},
    },
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::application::ExpenseService;

pub mod endpoints;
mod handlers;
mod response;

pub use handlers::{CreateExpenseRequest, PeriodQuery};
pub use response::{ApiError, DataResponse, ErrorResponse};

/// Return a router with all the API routes.
pub fn build_router(service: ExpenseService) -> Router {
    Router::new()
        .route(endpoints::EXPENSES, post(handlers::create_expense))
        .route(
            endpoints::EXPENSES_LIST,
            get(handlers::get_expenses_by_month_year),
        )
        .route(endpoints::EXPENSES_TOTAL, get(handlers::get_total_by_payer))
        .route(
            endpoints::OUTSTANDING_BALANCE,
            get(handlers::get_outstanding_balance),
        )
        .route(endpoints::BALANCE_SUMMARY, get(handlers::get_balance_summary))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(service)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .expose_headers([CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

/// Serve the API on `addr` until ctrl+c or the terminate signal is received.
pub async fn serve(service: ExpenseService, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(service.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    service.close().await;
    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for either the ctrl+c or terminate signal, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c signal."),
        _ = terminate => tracing::debug!("Received terminate signal."),
    }
}
