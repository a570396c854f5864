pub mod reservation_statuses;
