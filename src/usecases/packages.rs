use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::packages::{InsertPackageEntity, PackageEntity, UpdatePackageEntity},
    repositories::packages::PackageRepository,
    value_objects::{packages::SavePackageModel, validation::ValidationErrors},
};
use crate::infrastructure::change_stream::{ChangeStreamHub, SnapshotEvent};

#[derive(Debug, Clone, Serialize)]
pub struct PackageDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_days: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl From<PackageEntity> for PackageDto {
    fn from(value: PackageEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            duration_days: value.duration_days,
            price: value.price,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            created_by: value.created_by,
        }
    }
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("package not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PackageError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PackageError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PackageError::NotFound => StatusCode::NOT_FOUND,
            PackageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PackageError>;

pub struct PackageUseCase<T>
where
    T: PackageRepository + Send + Sync + 'static,
{
    package_repository: Arc<T>,
    change_stream: Arc<ChangeStreamHub<PackageDto>>,
}

impl<T> PackageUseCase<T>
where
    T: PackageRepository + Send + Sync + 'static,
{
    pub fn new(
        package_repository: Arc<T>,
        change_stream: Arc<ChangeStreamHub<PackageDto>>,
    ) -> Self {
        Self {
            package_repository,
            change_stream,
        }
    }

    pub async fn list(&self, owner_id: Uuid) -> UseCaseResult<Vec<PackageDto>> {
        let packages = self.package_repository.list(owner_id).await.map_err(|err| {
            error!(%owner_id, db_error = ?err, "packages: failed to list packages");
            PackageError::Internal(err)
        })?;

        Ok(packages.into_iter().map(PackageDto::from).collect())
    }

    /// Creates a new package or overwrites every mutable field of `existing`.
    /// Validation failures block persistence entirely.
    pub async fn save(
        &self,
        owner_id: Uuid,
        model: SavePackageModel,
        existing: Option<Uuid>,
    ) -> UseCaseResult<Uuid> {
        let errors = model.validate();
        if !errors.is_empty() {
            warn!(%owner_id, %errors, "packages: save rejected by validation");
            return Err(PackageError::Invalid(errors));
        }

        let now = Utc::now();
        let package_id = match existing {
            Some(package_id) => {
                let update_entity = UpdatePackageEntity {
                    name: model.name,
                    description: model.description,
                    duration_days: model.duration_days,
                    price: model.price,
                    is_active: model.is_active,
                    updated_at: now,
                };

                self.package_repository
                    .update(owner_id, package_id, update_entity)
                    .await
                    .map_err(|err| {
                        error!(
                            %owner_id,
                            %package_id,
                            db_error = ?err,
                            "packages: failed to update package"
                        );
                        PackageError::Internal(err)
                    })?
                    .ok_or_else(|| {
                        warn!(%owner_id, %package_id, "packages: update target not found");
                        PackageError::NotFound
                    })?
            }
            None => {
                let insert_entity = InsertPackageEntity {
                    name: model.name,
                    description: model.description,
                    duration_days: model.duration_days,
                    price: model.price,
                    is_active: model.is_active,
                    created_at: now,
                    updated_at: now,
                    created_by: owner_id,
                };

                self.package_repository
                    .create(owner_id, insert_entity)
                    .await
                    .map_err(|err| {
                        error!(%owner_id, db_error = ?err, "packages: failed to create package");
                        PackageError::Internal(err)
                    })?
            }
        };

        info!(%owner_id, %package_id, "packages: package saved");
        self.publish_snapshot(owner_id).await;

        Ok(package_id)
    }

    /// Unconditional delete. A missing id is not an error; reservations
    /// referencing the package are left untouched.
    pub async fn delete(&self, owner_id: Uuid, package_id: Uuid) -> UseCaseResult<()> {
        let affected = self
            .package_repository
            .delete(owner_id, package_id)
            .await
            .map_err(|err| {
                error!(
                    %owner_id,
                    %package_id,
                    db_error = ?err,
                    "packages: failed to delete package"
                );
                PackageError::Internal(err)
            })?;

        if affected == 0 {
            info!(%owner_id, %package_id, "packages: delete target already gone");
            return Ok(());
        }

        info!(%owner_id, %package_id, "packages: package deleted");
        self.publish_snapshot(owner_id).await;

        Ok(())
    }

    pub fn subscribe(&self, owner_id: Uuid) -> broadcast::Receiver<SnapshotEvent<PackageDto>> {
        self.change_stream.subscribe(owner_id)
    }

    /// Loads the current full record set for the initial delivery of a new
    /// subscription. A load failure becomes an error event, not a stream
    /// teardown.
    pub async fn snapshot(&self, owner_id: Uuid) -> SnapshotEvent<PackageDto> {
        match self.list(owner_id).await {
            Ok(records) => SnapshotEvent::Snapshot { records },
            Err(_) => SnapshotEvent::Error {
                message: "failed to load packages snapshot".to_string(),
            },
        }
    }

    async fn publish_snapshot(&self, owner_id: Uuid) {
        match self.package_repository.list(owner_id).await {
            Ok(records) => self.change_stream.publish(
                owner_id,
                records.into_iter().map(PackageDto::from).collect(),
            ),
            Err(err) => {
                error!(
                    %owner_id,
                    db_error = ?err,
                    "packages: failed to load snapshot for change stream"
                );
                self.change_stream.publish_error(
                    owner_id,
                    "failed to load packages snapshot".to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::packages::MockPackageRepository;
    use mockall::predicate::eq;
    use tokio::sync::broadcast::error::TryRecvError;

    fn sample_model() -> SavePackageModel {
        SavePackageModel {
            name: "Andes 7d".to_string(),
            description: "Cordillera completa".to_string(),
            duration_days: 7,
            price: 1_000_000.0,
            is_active: true,
        }
    }

    fn usecase(repo: MockPackageRepository) -> PackageUseCase<MockPackageRepository> {
        PackageUseCase::new(Arc::new(repo), Arc::new(ChangeStreamHub::new(16)))
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_repository() {
        let mut repo = MockPackageRepository::new();
        repo.expect_create().times(0);
        repo.expect_update().times(0);

        let mut model = sample_model();
        model.name = String::new();
        model.price = 0.0;

        let result = usecase(repo).save(Uuid::new_v4(), model, None).await;

        match result {
            Err(PackageError::Invalid(errors)) => {
                assert!(errors.contains("name"));
                assert!(errors.contains("price"));
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn create_stamps_creation_metadata() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let mut repo = MockPackageRepository::new();
        repo.expect_create()
            .withf(move |owner, insert| {
                *owner == owner_id
                    && insert.created_by == owner_id
                    && insert.name == "Andes 7d"
                    && insert.created_at == insert.updated_at
            })
            .returning(move |_, _| Box::pin(async move { Ok(package_id) }));
        repo.expect_list()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let result = usecase(repo).save(owner_id, sample_model(), None).await;

        assert_eq!(result.unwrap(), package_id);
    }

    #[tokio::test]
    async fn update_overwrites_mutable_fields() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let mut repo = MockPackageRepository::new();
        repo.expect_update()
            .withf(move |owner, id, update| {
                *owner == owner_id
                    && *id == package_id
                    && update.name == "Andes 7d"
                    && update.price == 1_000_000.0
            })
            .returning(move |_, id, _| Box::pin(async move { Ok(Some(id)) }));
        repo.expect_list()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let result = usecase(repo)
            .save(owner_id, sample_model(), Some(package_id))
            .await;

        assert_eq!(result.unwrap(), package_id);
    }

    #[tokio::test]
    async fn update_of_missing_package_is_not_found() {
        let mut repo = MockPackageRepository::new();
        repo.expect_update()
            .returning(|_, _, _| Box::pin(async { Ok(None) }));
        repo.expect_list().times(0);

        let result = usecase(repo)
            .save(Uuid::new_v4(), sample_model(), Some(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(PackageError::NotFound)));
    }

    #[tokio::test]
    async fn delete_of_missing_package_is_idempotent() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let mut repo = MockPackageRepository::new();
        repo.expect_delete()
            .with(eq(owner_id), eq(package_id))
            .returning(|_, _| Box::pin(async { Ok(0) }));
        repo.expect_list().times(0);

        let usecase = usecase(repo);
        let mut rx = usecase.subscribe(owner_id);

        usecase.delete(owner_id, package_id).await.unwrap();

        // No change happened, so no snapshot is published either.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn successful_mutation_publishes_a_fresh_snapshot() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let mut repo = MockPackageRepository::new();
        repo.expect_delete()
            .returning(|_, _| Box::pin(async { Ok(1) }));
        repo.expect_list()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let usecase = usecase(repo);
        let mut rx = usecase.subscribe(owner_id);

        usecase.delete(owner_id, package_id).await.unwrap();

        match rx.try_recv().unwrap() {
            SnapshotEvent::Snapshot { records } => assert!(records.is_empty()),
            SnapshotEvent::Error { message } => panic!("unexpected error event: {}", message),
        }
    }
}
