use crate::error::StackTrace;
use crate::handler::AppModule;
use crate::route::{BookRouter, BorrowRouter, DashboardRouter};
use error_stack::ResultExt;
use kernel::KernelError;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

mod auth;
mod controller;
mod error;
mod handler;
mod route;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), StackTrace> {
    let appender = tracing_appender::rolling::daily(std::path::Path::new("./logs/"), "debug.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_filter(tracing_subscriber::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| {
                        "driver=debug,server=debug,tower_http=debug,sqlx=info".into()
                    }),
                ))
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_writer(non_blocking_appender)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .init();

    let app = AppModule::new().await?;

    let router = axum::Router::new()
        .route_book()
        .route_borrow()
        .route_dashboard()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new())
        .with_state(app);

    let port = match std::env::var("SERVER_PORT") {
        Ok(port) => port
            .parse::<u16>()
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("SERVER_PORT is not a valid port: {port}"))?,
        Err(_) => DEFAULT_PORT,
    };
    let bind = SocketAddr::from(([0, 0, 0, 0], port));
    let tcp = TcpListener::bind(bind)
        .await
        .change_context_lazy(|| KernelError::Internal)
        .attach_printable_lazy(|| "Failed to listen tcp")?;
    tracing::info!(%bind, "listening");

    axum::serve(tcp, router.into_make_service())
        .await
        .change_context_lazy(|| KernelError::Internal)?;

    Ok(())
}
