use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::reservations::{
    InsertReservationEntity, ReservationEntity, UpdateReservationEntity,
};

#[async_trait]
#[automock]
pub trait ReservationRepository {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<ReservationEntity>>;
    async fn create(&self, owner_id: Uuid, insert_entity: InsertReservationEntity)
    -> Result<Uuid>;
    async fn update(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
        update_entity: UpdateReservationEntity,
    ) -> Result<Option<Uuid>>;
    async fn delete(&self, owner_id: Uuid, reservation_id: Uuid) -> Result<usize>;
}
