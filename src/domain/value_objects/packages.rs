use serde::Deserialize;

use super::validation::ValidationErrors;

/// Form payload for creating or overwriting a package.
#[derive(Debug, Clone, Deserialize)]
pub struct SavePackageModel {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_days: i32,
    pub price: f64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl SavePackageModel {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "El nombre del paquete es obligatorio.");
        }
        if self.duration_days <= 0 {
            errors.add("duration_days", "La duración debe ser un número positivo.");
        }
        if self.price <= 0.0 {
            errors.add("price", "El precio debe ser un número positivo.");
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_model() -> SavePackageModel {
        SavePackageModel {
            name: "Aventura Andina".to_string(),
            description: "7 días por la cordillera".to_string(),
            duration_days: 7,
            price: 1_000_000.0,
            is_active: true,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(valid_model().validate().is_empty());
    }

    #[test]
    fn rejects_blank_name() {
        let mut model = valid_model();
        model.name = "   ".to_string();

        let errors = model.validate();
        assert!(errors.contains("name"));
    }

    #[test]
    fn rejects_non_positive_duration() {
        let mut model = valid_model();
        model.duration_days = 0;

        assert!(model.validate().contains("duration_days"));
    }

    #[test]
    fn rejects_non_positive_price() {
        let mut model = valid_model();
        model.price = -10.0;

        assert!(model.validate().contains("price"));
    }

    #[test]
    fn collects_all_failing_fields() {
        let model = SavePackageModel {
            name: String::new(),
            description: String::new(),
            duration_days: -1,
            price: 0.0,
            is_active: false,
        };

        let errors = model.validate();
        assert!(errors.contains("name"));
        assert!(errors.contains("duration_days"));
        assert!(errors.contains("price"));
    }
}
