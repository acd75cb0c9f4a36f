//! Animal types (the species reference of a pet).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An animal type managed by the clinic (Perro, Gato, Ave, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalType {
    /// Local UUID
    pub id: String,
    /// Display name as entered by staff
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Inactive types cannot be referenced by new or updated pets
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl AnimalType {
    /// Create a new, active animal type.
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Species family used for the species-specific limits.
    pub fn species_kind(&self) -> SpeciesKind {
        SpeciesKind::from_name(&self.name)
    }
}

/// Species families that carry their own weight/age ceilings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpeciesKind {
    Cat,
    Dog,
    Bird,
    Other,
}

impl SpeciesKind {
    /// Classify an animal type name (Spanish or English, case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "gato" | "cat" => SpeciesKind::Cat,
            "perro" | "dog" => SpeciesKind::Dog,
            "ave" | "pájaro" | "pajaro" | "bird" => SpeciesKind::Bird,
            _ => SpeciesKind::Other,
        }
    }

    /// Recommended maximum weight in kg, if this species has one.
    pub fn max_weight_kg(&self) -> Option<Decimal> {
        match self {
            SpeciesKind::Cat => Some(Decimal::from(15)),
            SpeciesKind::Dog => Some(Decimal::from(100)),
            SpeciesKind::Bird => Some(Decimal::from(5)),
            SpeciesKind::Other => None,
        }
    }

    /// Typical maximum age in years, if this species has one.
    pub fn max_age_years(&self) -> Option<i64> {
        match self {
            SpeciesKind::Cat => Some(25),
            SpeciesKind::Dog => Some(20),
            SpeciesKind::Bird | SpeciesKind::Other => None,
        }
    }

    /// Human-readable label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            SpeciesKind::Cat => "cat",
            SpeciesKind::Dog => "dog",
            SpeciesKind::Bird => "bird",
            SpeciesKind::Other => "animal",
        }
    }
}
