use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::reservations::{
        InsertReservationEntity, ReservationEntity, UpdateReservationEntity,
    },
    repositories::{packages::PackageRepository, reservations::ReservationRepository},
    value_objects::{reservations::SaveReservationModel, validation::ValidationErrors},
};
use crate::infrastructure::change_stream::{ChangeStreamHub, SnapshotEvent};

/// Label stored in place of the package name when the referenced package no
/// longer exists at save time.
pub const DELETED_PACKAGE_LABEL: &str = "Paquete Eliminado";

/// Total price is always passengers times the package unit price, computed
/// in f64 so whole-peso amounts stay exact.
pub fn compute_total(passengers: i32, unit_price: f64) -> f64 {
    f64::from(passengers) * unit_price
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationDto {
    pub id: Uuid,
    pub package_id: Uuid,
    pub package_name: String,
    pub client_name: String,
    pub client_email: String,
    pub departure_date: NaiveDate,
    pub passengers: i32,
    pub status: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl From<ReservationEntity> for ReservationDto {
    fn from(value: ReservationEntity) -> Self {
        Self {
            id: value.id,
            package_id: value.package_id,
            package_name: value.package_name,
            client_name: value.client_name,
            client_email: value.client_email,
            departure_date: value.departure_date,
            passengers: value.passengers,
            status: value.status,
            total_price: value.total_price,
            created_at: value.created_at,
            updated_at: value.updated_at,
            created_by: value.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteDto {
    pub package_id: Uuid,
    pub package_name: String,
    pub unit_price: f64,
    pub passengers: i32,
    pub total_price: f64,
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("reservation not found")]
    NotFound,
    #[error("package not found")]
    PackageNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReservationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReservationError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReservationError::NotFound => StatusCode::NOT_FOUND,
            ReservationError::PackageNotFound => StatusCode::NOT_FOUND,
            ReservationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReservationError>;

pub struct ReservationUseCase<R, P>
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    reservation_repository: Arc<R>,
    package_repository: Arc<P>,
    change_stream: Arc<ChangeStreamHub<ReservationDto>>,
}

impl<R, P> ReservationUseCase<R, P>
where
    R: ReservationRepository + Send + Sync + 'static,
    P: PackageRepository + Send + Sync + 'static,
{
    pub fn new(
        reservation_repository: Arc<R>,
        package_repository: Arc<P>,
        change_stream: Arc<ChangeStreamHub<ReservationDto>>,
    ) -> Self {
        Self {
            reservation_repository,
            package_repository,
            change_stream,
        }
    }

    pub async fn list(&self, owner_id: Uuid) -> UseCaseResult<Vec<ReservationDto>> {
        let reservations = self
            .reservation_repository
            .list(owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "reservations: failed to list reservations");
                ReservationError::Internal(err)
            })?;

        Ok(reservations.into_iter().map(ReservationDto::from).collect())
    }

    /// Prices a prospective reservation against the current package unit
    /// price without persisting anything.
    pub async fn quote(
        &self,
        owner_id: Uuid,
        package_id: Uuid,
        passengers: i32,
    ) -> UseCaseResult<QuoteDto> {
        if passengers < 1 {
            let mut errors = ValidationErrors::new();
            errors.add("passengers", "Debe haber al menos un pasajero.");
            return Err(ReservationError::Invalid(errors));
        }

        let package = self
            .package_repository
            .find_by_id(owner_id, package_id)
            .await
            .map_err(|err| {
                error!(
                    %owner_id,
                    %package_id,
                    db_error = ?err,
                    "reservations: failed to load package for quote"
                );
                ReservationError::Internal(err)
            })?
            .ok_or(ReservationError::PackageNotFound)?;

        Ok(QuoteDto {
            package_id: package.id,
            package_name: package.name,
            unit_price: package.price,
            passengers,
            total_price: compute_total(passengers, package.price),
        })
    }

    /// Creates a new reservation or overwrites every mutable field of
    /// `existing`. The package name is snapshotted at save time; when the
    /// package can no longer be resolved the sentinel label is stored
    /// instead, and the save still succeeds. `total_price` is persisted
    /// exactly as submitted.
    pub async fn save(
        &self,
        owner_id: Uuid,
        model: SaveReservationModel,
        existing: Option<Uuid>,
    ) -> UseCaseResult<Uuid> {
        let errors = model.validate();
        if !errors.is_empty() {
            warn!(%owner_id, %errors, "reservations: save rejected by validation");
            return Err(ReservationError::Invalid(errors));
        }

        let package_id = model
            .package_id
            .context("package_id missing after validation")?;
        let departure_date = model
            .departure_date
            .context("departure_date missing after validation")?;

        let package_name = self.resolve_package_name(owner_id, package_id).await?;

        let now = Utc::now();
        let reservation_id = match existing {
            Some(reservation_id) => {
                let update_entity = UpdateReservationEntity {
                    package_id,
                    package_name,
                    client_name: model.client_name,
                    client_email: model.client_email,
                    departure_date,
                    passengers: model.passengers,
                    status: model.status.to_string(),
                    total_price: model.total_price,
                    updated_at: now,
                };

                self.reservation_repository
                    .update(owner_id, reservation_id, update_entity)
                    .await
                    .map_err(|err| {
                        error!(
                            %owner_id,
                            %reservation_id,
                            db_error = ?err,
                            "reservations: failed to update reservation"
                        );
                        ReservationError::Internal(err)
                    })?
                    .ok_or_else(|| {
                        warn!(%owner_id, %reservation_id, "reservations: update target not found");
                        ReservationError::NotFound
                    })?
            }
            None => {
                let insert_entity = InsertReservationEntity {
                    package_id,
                    package_name,
                    client_name: model.client_name,
                    client_email: model.client_email,
                    departure_date,
                    passengers: model.passengers,
                    status: model.status.to_string(),
                    total_price: model.total_price,
                    created_at: now,
                    updated_at: now,
                    created_by: owner_id,
                };

                self.reservation_repository
                    .create(owner_id, insert_entity)
                    .await
                    .map_err(|err| {
                        error!(
                            %owner_id,
                            db_error = ?err,
                            "reservations: failed to create reservation"
                        );
                        ReservationError::Internal(err)
                    })?
            }
        };

        info!(%owner_id, %reservation_id, "reservations: reservation saved");
        self.publish_snapshot(owner_id).await;

        Ok(reservation_id)
    }

    /// Unconditional delete; a missing id is not an error.
    pub async fn delete(&self, owner_id: Uuid, reservation_id: Uuid) -> UseCaseResult<()> {
        let affected = self
            .reservation_repository
            .delete(owner_id, reservation_id)
            .await
            .map_err(|err| {
                error!(
                    %owner_id,
                    %reservation_id,
                    db_error = ?err,
                    "reservations: failed to delete reservation"
                );
                ReservationError::Internal(err)
            })?;

        if affected == 0 {
            info!(%owner_id, %reservation_id, "reservations: delete target already gone");
            return Ok(());
        }

        info!(%owner_id, %reservation_id, "reservations: reservation deleted");
        self.publish_snapshot(owner_id).await;

        Ok(())
    }

    pub fn subscribe(&self, owner_id: Uuid) -> broadcast::Receiver<SnapshotEvent<ReservationDto>> {
        self.change_stream.subscribe(owner_id)
    }

    pub async fn snapshot(&self, owner_id: Uuid) -> SnapshotEvent<ReservationDto> {
        match self.list(owner_id).await {
            Ok(records) => SnapshotEvent::Snapshot { records },
            Err(_) => SnapshotEvent::Error {
                message: "failed to load reservations snapshot".to_string(),
            },
        }
    }

    async fn resolve_package_name(
        &self,
        owner_id: Uuid,
        package_id: Uuid,
    ) -> UseCaseResult<String> {
        let package = self
            .package_repository
            .find_by_id(owner_id, package_id)
            .await
            .map_err(|err| {
                error!(
                    %owner_id,
                    %package_id,
                    db_error = ?err,
                    "reservations: failed to resolve package name"
                );
                ReservationError::Internal(err)
            })?;

        match package {
            Some(package) => Ok(package.name),
            None => {
                warn!(
                    %owner_id,
                    %package_id,
                    "reservations: package missing, storing sentinel label"
                );
                Ok(DELETED_PACKAGE_LABEL.to_string())
            }
        }
    }

    async fn publish_snapshot(&self, owner_id: Uuid) {
        match self.reservation_repository.list(owner_id).await {
            Ok(records) => self.change_stream.publish(
                owner_id,
                records.into_iter().map(ReservationDto::from).collect(),
            ),
            Err(err) => {
                error!(
                    %owner_id,
                    db_error = ?err,
                    "reservations: failed to load snapshot for change stream"
                );
                self.change_stream.publish_error(
                    owner_id,
                    "failed to load reservations snapshot".to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::packages::PackageEntity;
    use crate::domain::repositories::packages::MockPackageRepository;
    use crate::domain::repositories::reservations::MockReservationRepository;
    use crate::domain::value_objects::enums::reservation_statuses::ReservationStatus;

    fn andes_package(id: Uuid, owner_id: Uuid) -> PackageEntity {
        PackageEntity {
            id,
            name: "Andes 7d".to_string(),
            description: "Cordillera completa".to_string(),
            duration_days: 7,
            price: 1_000_000.0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: owner_id,
        }
    }

    fn sample_model(package_id: Uuid) -> SaveReservationModel {
        SaveReservationModel {
            package_id: Some(package_id),
            client_name: "Ana".to_string(),
            client_email: "ana@example.com".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            passengers: 3,
            status: ReservationStatus::Pendiente,
            total_price: compute_total(3, 1_000_000.0),
        }
    }

    fn usecase(
        reservations: MockReservationRepository,
        packages: MockPackageRepository,
    ) -> ReservationUseCase<MockReservationRepository, MockPackageRepository> {
        ReservationUseCase::new(
            Arc::new(reservations),
            Arc::new(packages),
            Arc::new(ChangeStreamHub::new(16)),
        )
    }

    #[test]
    fn total_is_the_exact_product_of_passengers_and_unit_price() {
        assert_eq!(compute_total(3, 1_000_000.0), 3_000_000.0);
        assert_eq!(compute_total(1, 0.5), 0.5);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_repository() {
        let mut reservations = MockReservationRepository::new();
        reservations.expect_create().times(0);
        reservations.expect_update().times(0);
        let mut packages = MockPackageRepository::new();
        packages.expect_find_by_id().times(0);

        let mut model = sample_model(Uuid::new_v4());
        model.package_id = None;
        model.passengers = 0;

        let result = usecase(reservations, packages)
            .save(Uuid::new_v4(), model, None)
            .await;

        match result {
            Err(ReservationError::Invalid(errors)) => {
                assert!(errors.contains("package_id"));
                assert!(errors.contains("passengers"));
            }
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn save_snapshots_package_name_and_keeps_submitted_total() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();
        let reservation_id = Uuid::new_v4();

        let mut packages = MockPackageRepository::new();
        packages.expect_find_by_id().returning(move |owner, id| {
            Box::pin(async move { Ok(Some(andes_package(id, owner))) })
        });

        let mut reservations = MockReservationRepository::new();
        reservations
            .expect_create()
            .withf(move |owner, insert| {
                *owner == owner_id
                    && insert.package_name == "Andes 7d"
                    && insert.total_price == 3_000_000.0
                    && insert.status == "PENDIENTE"
                    && insert.created_by == owner_id
            })
            .returning(move |_, _| Box::pin(async move { Ok(reservation_id) }));
        reservations
            .expect_list()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let result = usecase(reservations, packages)
            .save(owner_id, sample_model(package_id), None)
            .await;

        assert_eq!(result.unwrap(), reservation_id);
    }

    #[tokio::test]
    async fn missing_package_at_save_time_stores_sentinel_label() {
        let owner_id = Uuid::new_v4();
        let reservation_id = Uuid::new_v4();

        let mut packages = MockPackageRepository::new();
        packages
            .expect_find_by_id()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let mut reservations = MockReservationRepository::new();
        reservations
            .expect_create()
            .withf(|_, insert| insert.package_name == DELETED_PACKAGE_LABEL)
            .returning(move |_, _| Box::pin(async move { Ok(reservation_id) }));
        reservations
            .expect_list()
            .returning(|_| Box::pin(async { Ok(vec![]) }));

        let result = usecase(reservations, packages)
            .save(owner_id, sample_model(Uuid::new_v4()), None)
            .await;

        assert_eq!(result.unwrap(), reservation_id);
    }

    #[tokio::test]
    async fn update_of_missing_reservation_is_not_found() {
        let mut packages = MockPackageRepository::new();
        packages.expect_find_by_id().returning(move |owner, id| {
            Box::pin(async move { Ok(Some(andes_package(id, owner))) })
        });

        let mut reservations = MockReservationRepository::new();
        reservations
            .expect_update()
            .returning(|_, _, _| Box::pin(async { Ok(None) }));
        reservations.expect_list().times(0);

        let result = usecase(reservations, packages)
            .save(Uuid::new_v4(), sample_model(Uuid::new_v4()), Some(Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(ReservationError::NotFound)));
    }

    #[tokio::test]
    async fn delete_of_missing_reservation_is_idempotent() {
        let mut reservations = MockReservationRepository::new();
        reservations
            .expect_delete()
            .returning(|_, _| Box::pin(async { Ok(0) }));
        reservations.expect_list().times(0);

        let result = usecase(reservations, MockPackageRepository::new())
            .delete(Uuid::new_v4(), Uuid::new_v4())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn quote_prices_against_current_unit_price() {
        let owner_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let mut packages = MockPackageRepository::new();
        packages.expect_find_by_id().returning(move |owner, id| {
            Box::pin(async move { Ok(Some(andes_package(id, owner))) })
        });

        let quote = usecase(MockReservationRepository::new(), packages)
            .quote(owner_id, package_id, 3)
            .await
            .unwrap();

        assert_eq!(quote.package_name, "Andes 7d");
        assert_eq!(quote.unit_price, 1_000_000.0);
        assert_eq!(quote.total_price, 3_000_000.0);
    }

    #[tokio::test]
    async fn quote_for_missing_package_is_not_found() {
        let mut packages = MockPackageRepository::new();
        packages
            .expect_find_by_id()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let result = usecase(MockReservationRepository::new(), packages)
            .quote(Uuid::new_v4(), Uuid::new_v4(), 2)
            .await;

        assert!(matches!(result, Err(ReservationError::PackageNotFound)));
    }

    #[tokio::test]
    async fn quote_rejects_non_positive_passenger_counts() {
        let mut packages = MockPackageRepository::new();
        packages.expect_find_by_id().times(0);

        let result = usecase(MockReservationRepository::new(), packages)
            .quote(Uuid::new_v4(), Uuid::new_v4(), 0)
            .await;

        match result {
            Err(ReservationError::Invalid(errors)) => assert!(errors.contains("passengers")),
            other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
        }
    }
}
