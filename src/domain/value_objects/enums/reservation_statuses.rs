use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Free-standing lifecycle enumeration. Any status may change to any other;
/// no transition constraints are enforced.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Pendiente,
    Confirmada,
    Cancelada,
    Completada,
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ReservationStatus::Pendiente => "PENDIENTE",
            ReservationStatus::Confirmada => "CONFIRMADA",
            ReservationStatus::Cancelada => "CANCELADA",
            ReservationStatus::Completada => "COMPLETADA",
        };
        write!(f, "{}", status)
    }
}

impl ReservationStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "PENDIENTE" => ReservationStatus::Pendiente,
            "CONFIRMADA" => ReservationStatus::Confirmada,
            "CANCELADA" => ReservationStatus::Cancelada,
            "COMPLETADA" => ReservationStatus::Completada,
            _ => ReservationStatus::Pendiente,
        }
    }
}
