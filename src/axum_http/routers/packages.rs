use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::packages::PackageRepository, value_objects::packages::SavePackageModel,
    },
    infrastructure::{
        change_stream::{ChangeStreamHub, SnapshotEvent},
        postgres::{
            postgres_connection::PgPoolSquad, repositories::packages::PackagePostgres,
        },
    },
    usecases::packages::{PackageDto, PackageError, PackageUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
    routing::put,
};
use serde::Serialize;
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

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    config: Arc<DotEnvyConfig>,
    change_stream: Arc<ChangeStreamHub<PackageDto>>,
) -> Router {
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool), config.app.id.clone());
    let usecase = PackageUseCase::new(Arc::new(package_repository), change_stream);

    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route("/:package_id", put(update_package).delete(delete_package))
        .route("/watch", get(watch_packages))
        .with_state(Arc::new(usecase))
}

fn error_response(err: PackageError) -> Response {
    match err {
        PackageError::Invalid(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        other => (other.status_code(), other.to_string()).into_response(),
    }
}

pub async fn list_packages<T>(
    State(usecase): State<Arc<PackageUseCase<T>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    T: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "packages: list request received");
    match usecase.list(user_id).await {
        Ok(packages) => Json(packages).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "packages: failed to list packages");
            error_response(err)
        }
    }
}

pub async fn create_package<T>(
    State(usecase): State<Arc<PackageUseCase<T>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(model): Json<SavePackageModel>,
) -> impl IntoResponse
where
    T: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "packages: create request received");
    match usecase.save(user_id, model, None).await {
        Ok(id) => (StatusCode::CREATED, Json(SavedResponse { id })).into_response(),
        Err(err) => {
            error!(%user_id, error = ?err, "packages: failed to create package");
            error_response(err)
        }
    }
}

pub async fn update_package<T>(
    State(usecase): State<Arc<PackageUseCase<T>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(package_id): Path<Uuid>,
    Json(model): Json<SavePackageModel>,
) -> impl IntoResponse
where
    T: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, %package_id, "packages: update request received");
    match usecase.save(user_id, model, Some(package_id)).await {
        Ok(id) => Json(SavedResponse { id }).into_response(),
        Err(err) => {
            error!(
                %user_id,
                %package_id,
                error = ?err,
                "packages: failed to update package"
            );
            error_response(err)
        }
    }
}

pub async fn delete_package<T>(
    State(usecase): State<Arc<PackageUseCase<T>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(package_id): Path<Uuid>,
) -> impl IntoResponse
where
    T: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, %package_id, "packages: delete request received");
    match usecase.delete(user_id, package_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(
                %user_id,
                %package_id,
                error = ?err,
                "packages: failed to delete package"
            );
            error_response(err)
        }
    }
}

/// Streams owner-scoped snapshots over SSE. The first event carries the
/// current record set; every successful mutation afterwards pushes a fresh
/// full snapshot.
pub async fn watch_packages<T>(
    State(usecase): State<Arc<PackageUseCase<T>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    T: PackageRepository + Send + Sync + 'static,
{
    info!(%user_id, "packages: watch stream opened");

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
