use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::enums::reservation_statuses::ReservationStatus;
use super::validation::ValidationErrors;

/// Form payload for creating or overwriting a reservation. `total_price`
/// carries the value the form last computed; it is stored as submitted, not
/// recomputed at save time.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveReservationModel {
    pub package_id: Option<Uuid>,
    pub client_name: String,
    pub client_email: String,
    pub departure_date: Option<NaiveDate>,
    pub passengers: i32,
    #[serde(default)]
    pub status: ReservationStatus,
    pub total_price: f64,
}

impl SaveReservationModel {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.package_id.is_none() {
            errors.add("package_id", "Debe seleccionar un paquete.");
        }
        if self.client_name.trim().is_empty() {
            errors.add("client_name", "El nombre del cliente es obligatorio.");
        }
        // Weak format check, on purpose: at least one '@' and one '.'.
        if !self.client_email.contains('@') || !self.client_email.contains('.') {
            errors.add("client_email", "Formato de correo electrónico inválido.");
        }
        if self.departure_date.is_none() {
            errors.add("departure_date", "La fecha de salida es obligatoria.");
        }
        if self.passengers < 1 {
            errors.add("passengers", "Debe haber al menos un pasajero.");
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_model() -> SaveReservationModel {
        SaveReservationModel {
            package_id: Some(Uuid::new_v4()),
            client_name: "Ana".to_string(),
            client_email: "a@b.com".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            passengers: 3,
            status: ReservationStatus::Pendiente,
            total_price: 3_000_000.0,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(valid_model().validate().is_empty());
    }

    #[test]
    fn rejects_missing_package() {
        let mut model = valid_model();
        model.package_id = None;

        assert!(model.validate().contains("package_id"));
    }

    #[test]
    fn rejects_blank_client_name() {
        let mut model = valid_model();
        model.client_name = " ".to_string();

        assert!(model.validate().contains("client_name"));
    }

    #[test]
    fn rejects_email_without_at_or_dot() {
        let mut model = valid_model();
        model.client_email = "not-an-email".to_string();

        assert!(model.validate().contains("client_email"));
    }

    #[test]
    fn accepts_minimal_email_shape() {
        let mut model = valid_model();
        model.client_email = "a@b.c".to_string();

        assert!(!model.validate().contains("client_email"));
    }

    #[test]
    fn rejects_email_missing_dot() {
        let mut model = valid_model();
        model.client_email = "a@b".to_string();

        assert!(model.validate().contains("client_email"));
    }

    #[test]
    fn rejects_missing_departure_date() {
        let mut model = valid_model();
        model.departure_date = None;

        assert!(model.validate().contains("departure_date"));
    }

    #[test]
    fn rejects_zero_passengers() {
        let mut model = valid_model();
        model.passengers = 0;

        assert!(model.validate().contains("passengers"));
    }
}
