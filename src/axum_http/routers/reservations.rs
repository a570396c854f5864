use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{packages::PackageRepository, reservations::ReservationRepository},
        value_objects::reservations::SaveReservationModel,
    },
    infrastructure::{
        change_stream::{ChangeStreamHub, SnapshotEvent},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{packages::PackagePostgres, reservations::ReservationPostgres},
        },
    },
    usecases::reservations::{ReservationDto, ReservationError, ReservationUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
    routing::put,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_stream::{
    StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub package_id: Uuid,
    pub passengers: i32,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    change_stream: Arc<ChangeStreamHub<ReservationDto>>,
) -> Router {
    let reservation_repository =
        ReservationPostgres::new(Arc::clone(&db_pool), config.app.id.clone());
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool), config.app.id.clone());

    let usecase = ReservationUseCase::new(
        Arc::new(reservation_repository),
        Arc::new(package_repository),
        change_stream,
    );

    Router::new()
        .route("/", get(list_reservations).post(create_reservation))
        .route(
            "/:reservation_id",
            put(update_reservation).delete(delete_reservation),
        )
        .route("/quote", get(quote_reservation))
        .route("/watch", get(watch_reservations))
        .with_state(Arc::new(usecase))
}

fn error_response(err: ReservationError) -> Response {
    match err {
        ReservationError::Invalid(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        other => (other.status_code(), other.to_string()).into_response(),
    }
}

pub async fn list_reservations<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "reservations: list request received");
    match usecase.list(user_id).await {
        Ok(reservations) => Json(reservations).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "reservations: failed to list reservations");
            error_response(err)
        }
    }
}

pub async fn quote_reservation<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<QuoteQuery>,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(
        %user_id,
        package_id = %query.package_id,
        passengers = query.passengers,
        "reservations: quote request received"
    );
    match usecase
        .quote(user_id, query.package_id, query.passengers)
        .await
    {
        Ok(quote) => Json(quote).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "reservations: failed to quote reservation");
            error_response(err)
        }
    }
}

pub async fn create_reservation<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<SaveReservationModel>,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "reservations: create request received");
    match usecase.save(user_id, model, None).await {
        Ok(id) => (StatusCode::CREATED, Json(SavedResponse { id })).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "reservations: failed to create reservation");
            error_response(err)
        }
    }
}

pub async fn update_reservation<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(reservation_id): Path<Uuid>,
    Json(model): Json<SaveReservationModel>,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, %reservation_id, "reservations: update request received");
    match usecase.save(user_id, model, Some(reservation_id)).await {
        Ok(id) => Json(SavedResponse { id }).into_response(),
        Err(err) => {
            error!(
                %user_id,
                %reservation_id,
                error = ?err,
                "reservations: failed to update reservation"
            );
            error_response(err)
        }
    }
}

pub async fn delete_reservation<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(reservation_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, %reservation_id, "reservations: delete request received");
    match usecase.delete(user_id, reservation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(
                %user_id,
                %reservation_id,
                error = ?err,
                "reservations: failed to delete reservation"
            );
            error_response(err)
        }
    }
}

pub async fn watch_reservations<R, P>(
    State(usecase): State<Arc<ReservationUseCase<R, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "reservations: watch stream opened");

    // Subscribe before loading the initial snapshot so no mutation published
    // in between is lost.
    let receiver = usecase.subscribe(user_id);
    let initial = usecase.snapshot(user_id).await;

    // A lagging reader gets an error event instead of losing its
    // subscription; the next mutation delivers a full snapshot anyway.
    let updates = BroadcastStream::new(receiver).map(|event| match event {
        Ok(event) => event,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => SnapshotEvent::Error {
            message: format!("subscriber lagging, skipped {} snapshots", skipped),
        },
    });

    let stream = tokio_stream::once(initial)
        .chain(updates)
        .map(|event| Event::default().json_data(&event));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
