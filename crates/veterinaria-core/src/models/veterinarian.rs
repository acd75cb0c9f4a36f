//! Clinic veterinarians (staff records).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw veterinarian submission. An empty string means "not provided".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VeterinarianInput {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub registration_number: String,
    pub hired_on: Option<NaiveDate>,
}

/// A veterinarian on the clinic staff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Veterinarian {
    /// Local UUID
    pub id: String,
    /// Full name
    pub name: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    /// Always lowercase
    pub email: Option<String>,
    /// Professional registration (colegiado) number
    pub registration_number: Option<String>,
    pub hired_on: Option<NaiveDate>,
    /// Inactive veterinarians cannot be assigned to pets
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl Veterinarian {
    /// Create a new, active veterinarian.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            specialty: None,
            phone: None,
            email: None,
            registration_number: None,
            hired_on: None,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Display form, e.g. `Dr. Ana Soto - Cirugía`.
    pub fn display_name(&self) -> String {
        match &self.specialty {
            Some(specialty) => format!("Dr. {} - {}", self.name, specialty),
            None => format!("Dr. {}", self.name),
        }
    }
}
