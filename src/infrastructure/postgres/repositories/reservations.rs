use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::reservations::{
            InsertReservationEntity, ReservationEntity, UpdateReservationEntity,
        },
        repositories::reservations::ReservationRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::reservations},
};

pub struct ReservationPostgres {
    db_pool: Arc<PgPoolSquad>,
    app_id: String,
}

impl ReservationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, app_id: String) -> Self {
        Self { db_pool, app_id }
    }
}

#[async_trait]
impl ReservationRepository for ReservationPostgres {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<ReservationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = reservations::table
            .filter(reservations::app_id.eq(&self.app_id))
            .filter(reservations::owner_id.eq(owner_id))
            .order(reservations::departure_date.desc())
            .select(ReservationEntity::as_select())
            .load::<ReservationEntity>(&mut conn)?;

        Ok(results)
    }

    async fn create(
        &self,
        owner_id: Uuid,
        insert_entity: InsertReservationEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(reservations::table)
            .values((
                &insert_entity,
                reservations::app_id.eq(&self.app_id),
                reservations::owner_id.eq(owner_id),
            ))
            .returning(reservations::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        reservation_id: Uuid,
        update_entity: UpdateReservationEntity,
    ) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(reservations::table)
            .filter(reservations::app_id.eq(&self.app_id))
            .filter(reservations::owner_id.eq(owner_id))
            .filter(reservations::id.eq(reservation_id))
            .set(&update_entity)
            .returning(reservations::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, owner_id: Uuid, reservation_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = delete(reservations::table)
            .filter(reservations::app_id.eq(&self.app_id))
            .filter(reservations::owner_id.eq(owner_id))
            .filter(reservations::id.eq(reservation_id))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
