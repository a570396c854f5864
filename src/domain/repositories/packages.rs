use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::packages::{
    InsertPackageEntity, PackageEntity, UpdatePackageEntity,
};

/// Owner-scoped package collection. Implementations carry the application
/// scope; callers only ever see records belonging to `owner_id`.
#[async_trait]
#[automock]
pub trait PackageRepository {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<PackageEntity>>;
    async fn find_by_id(&self, owner_id: Uuid, package_id: Uuid)
    -> Result<Option<PackageEntity>>;
    async fn create(&self, owner_id: Uuid, insert_entity: InsertPackageEntity) -> Result<Uuid>;
    async fn update(
        &self,
        owner_id: Uuid,
        package_id: Uuid,
        update_entity: UpdatePackageEntity,
    ) -> Result<Option<Uuid>>;
    /// Returns the number of rows removed; deleting a missing id is not an
    /// error.
    async fn delete(&self, owner_id: Uuid, package_id: Uuid) -> Result<usize>;
}
