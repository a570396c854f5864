pub mod packages;
pub mod reservations;
