use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    infrastructure::{
        change_stream::ChangeStreamHub, postgres::postgres_connection::PgPoolSquad,
    },
    usecases::{packages::PackageDto, reservations::ReservationDto},
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

// Snapshots are full record sets; slow readers drop intermediate states.
const CHANGE_STREAM_CAPACITY: usize = 16;

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let package_stream = Arc::new(ChangeStreamHub::<PackageDto>::new(CHANGE_STREAM_CAPACITY));
    let reservation_stream = Arc::new(ChangeStreamHub::<ReservationDto>::new(
        CHANGE_STREAM_CAPACITY,
    ));

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/session", routers::session::routes())
        .nest(
            "/api/v1/packages",
            routers::packages::routes(Arc::clone(&db_pool), Arc::clone(&config), package_stream),
        )
        .nest(
            "/api/v1/reservations",
            routers::reservations::routes(
                Arc::clone(&db_pool),
                Arc::clone(&config),
                reservation_stream,
            ),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any), // TODO Add the domain later
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
