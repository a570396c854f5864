pub mod packages;
pub mod reservations;
pub mod session;
