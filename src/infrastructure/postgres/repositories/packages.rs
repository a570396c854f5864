use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::packages::{InsertPackageEntity, PackageEntity, UpdatePackageEntity},
        repositories::packages::PackageRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::packages},
};

pub struct PackagePostgres {
    db_pool: Arc<PgPoolSquad>,
    app_id: String,
}

impl PackagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, app_id: String) -> Self {
        Self { db_pool, app_id }
    }
}

#[async_trait]
impl PackageRepository for PackagePostgres {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<PackageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = packages::table
            .filter(packages::app_id.eq(&self.app_id))
            .filter(packages::owner_id.eq(owner_id))
            .order(packages::name.asc())
            .select(PackageEntity::as_select())
            .load::<PackageEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_id(
        &self,
        owner_id: Uuid,
        package_id: Uuid,
    ) -> Result<Option<PackageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = packages::table
            .filter(packages::app_id.eq(&self.app_id))
            .filter(packages::owner_id.eq(owner_id))
            .filter(packages::id.eq(package_id))
            .select(PackageEntity::as_select())
            .first::<PackageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, owner_id: Uuid, insert_entity: InsertPackageEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(packages::table)
            .values((
                &insert_entity,
                packages::app_id.eq(&self.app_id),
                packages::owner_id.eq(owner_id),
            ))
            .returning(packages::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        package_id: Uuid,
        update_entity: UpdatePackageEntity,
    ) -> Result<Option<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(packages::table)
            .filter(packages::app_id.eq(&self.app_id))
            .filter(packages::owner_id.eq(owner_id))
            .filter(packages::id.eq(package_id))
            .set(&update_entity)
            .returning(packages::id)
            .get_result::<Uuid>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, owner_id: Uuid, package_id: Uuid) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = delete(packages::table)
            .filter(packages::app_id.eq(&self.app_id))
            .filter(packages::owner_id.eq(owner_id))
            .filter(packages::id.eq(package_id))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
