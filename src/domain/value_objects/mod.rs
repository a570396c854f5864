pub mod enums;
pub mod packages;
pub mod reservations;
pub mod validation;
