//! Pet (mascota) models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sex of a pet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// Size class of a pet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PetSize {
    Small,
    Medium,
    Large,
    Giant,
}

impl PetSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetSize::Small => "small",
            PetSize::Medium => "medium",
            PetSize::Large => "large",
            PetSize::Giant => "giant",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "small" => Some(PetSize::Small),
            "medium" => Some(PetSize::Medium),
            "large" => Some(PetSize::Large),
            "giant" => Some(PetSize::Giant),
            _ => None,
        }
    }
}

/// Raw pet submission as parsed from a form.
///
/// Text fields are kept verbatim; an empty string means "not provided".
/// `id` is set when the submission updates an existing record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetInput {
    pub id: Option<String>,
    pub animal_type_id: String,
    pub name: String,
    pub breed: String,
    pub age: Option<i64>,
    pub sex: Option<Sex>,
    pub size: Option<PetSize>,
    pub weight_kg: Option<Decimal>,
    pub color: String,
    pub owner_name: String,
    pub owner_phone: String,
    pub owner_email: String,
    pub owner_address: String,
    pub microchip: String,
    pub observations: String,
    /// Attending veterinarian; empty for none
    pub attending_veterinarian_id: String,
}

/// A validated pet record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    /// Local UUID
    pub id: String,
    /// Animal type reference
    pub animal_type_id: String,
    /// Pet name
    pub name: String,
    pub breed: Option<String>,
    /// Age in years
    pub age: Option<u32>,
    pub sex: Sex,
    pub size: Option<PetSize>,
    /// Weight in kg
    pub weight_kg: Option<Decimal>,
    pub color: Option<String>,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    /// Always lowercase
    pub owner_email: Option<String>,
    pub owner_address: Option<String>,
    /// Uppercase hex, unique across all pets
    pub microchip: Option<String>,
    /// Medical observations
    pub observations: Option<String>,
    /// Attending veterinarian reference
    pub attending_veterinarian_id: Option<String>,
    /// Cleared on soft delete
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Pet {
    /// Create a new pet with required fields.
    pub fn new(animal_type_id: String, name: String, sex: Sex, owner_name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            animal_type_id,
            name,
            breed: None,
            age: None,
            sex,
            size: None,
            weight_kg: None,
            color: None,
            owner_name,
            owner_phone: None,
            owner_email: None,
            owner_address: None,
            microchip: None,
            observations: None,
            attending_veterinarian_id: None,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
