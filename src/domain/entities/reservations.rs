use chrono::{DateTime, NaiveDate, Utc};
use diesel::{AsChangeset, prelude::*};
use uuid::Uuid;

use crate::infrastructure::postgres::schema::reservations;

/// `package_name` is a point-in-time snapshot taken when the reservation was
/// saved. It is intentionally never reconciled with later package renames or
/// deletions, so list rendering does not depend on the package still
/// existing. `package_id` may dangle for the same reason.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = reservations)]
pub struct ReservationEntity {
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct InsertReservationEntity {
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

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reservations)]
pub struct UpdateReservationEntity {
    pub package_id: Uuid,
    pub package_name: String,
    pub client_name: String,
    pub client_email: String,
    pub departure_date: NaiveDate,
    pub passengers: i32,
    pub status: String,
    pub total_price: f64,
    pub updated_at: DateTime<Utc>,
}
