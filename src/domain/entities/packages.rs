use chrono::{DateTime, Utc};
use diesel::{AsChangeset, prelude::*};
use uuid::Uuid;

use crate::infrastructure::postgres::schema::packages;

// Tenancy columns (app_id, owner_id) are owned by the repository layer and
// never leave it.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = packages)]
pub struct PackageEntity {
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = packages)]
pub struct InsertPackageEntity {
    pub name: String,
    pub description: String,
    pub duration_days: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Full-record overwrite of the mutable fields. Creation metadata is never
/// touched on update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = packages)]
pub struct UpdatePackageEntity {
    pub name: String,
    pub description: String,
    pub duration_days: i32,
    pub price: f64,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}
