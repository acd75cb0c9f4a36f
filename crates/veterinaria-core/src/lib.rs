//! Veterinaria Core Library
//!
//! Record validation and appointment scheduling rules for a small veterinary
//! clinic, with an embedded SQLite store.
//!
//! # Flow
//!
//! ```text
//! Form fields → FFI parsing → Record validator ──rejected──► field errors + advisories
//!                                   │                               ▲
//!                              accepted                             │
//!                                   ▼                               │
//!                     SQLite write (same transaction re-checks ─────┘
//!                     appointment conflicts; UNIQUE on chip/code)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Clinic hours, conflict window and booking horizon
//! - [`db`]: SQLite database layer with FTS5 product search
//! - [`models`]: Domain types (AnimalType, Veterinarian, Pet, Category, Product, Appointment)
//! - [`validation`]: Field validators, record validators, scheduling rule
//! - [`clinic`]: Validate-then-persist record service

pub mod clinic;
pub mod config;
pub mod db;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use clinic::{Clinic, ClinicError, ClinicResult};
pub use config::{ClinicConfig, ConfigError};
pub use db::{AppointmentFilter, Database, DbError};
pub use models::{
    AnimalType, Appointment, AppointmentInput, AppointmentKind, AppointmentStatus, Category,
    InventorySummary, Pet, PetInput, PetSize, Product, ProductInput, ProductType, Sex,
    SpeciesKind, Veterinarian, VeterinarianInput,
};
pub use validation::{
    Advisory, FieldError, FieldErrorCode, RecordLookup, Validated, ValidationContext,
    ValidationError, ValidationReport,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use validation::{non_blank, validate_appointment, validate_pet, validate_product};
use validation::{validate_veterinarian, RecordError, RecordResult};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VeterinariaError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not modifiable: {0}")]
    NotModifiable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<DbError> for VeterinariaError {
    fn from(e: DbError) -> Self {
        VeterinariaError::DatabaseError(e.to_string())
    }
}

impl From<ClinicError> for VeterinariaError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::Invalid(report) => VeterinariaError::InvalidInput(report.to_string()),
            ClinicError::NotFound(what) => VeterinariaError::NotFound(what),
            ClinicError::NotModifiable(id) => VeterinariaError::NotModifiable(id),
            ClinicError::Database(err) => err.into(),
        }
    }
}

impl From<ConfigError> for VeterinariaError {
    fn from(e: ConfigError) -> Self {
        VeterinariaError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VeterinariaError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VeterinariaError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with the default clinic schedule.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<VeterinariaCore>, VeterinariaError> {
    let db = Database::open(&path)?;
    Ok(VeterinariaCore::wrap(db, ClinicConfig::default()))
}

/// Open the database and schedule described by the environment (`.env` included).
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<VeterinariaCore>, VeterinariaError> {
    let config = ClinicConfig::from_env()?;
    let db = Database::open(&config.database_path)?;
    Ok(VeterinariaCore::wrap(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<VeterinariaCore>, VeterinariaError> {
    let db = Database::open_in_memory()?;
    Ok(VeterinariaCore::wrap(db, ClinicConfig::default()))
}

/// Install the fmt subscriber. `filter` falls back to `RUST_LOG`, then to
/// `veterinaria_core=info`. Later calls are no-ops.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("veterinaria_core=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VeterinariaCore {
    db: Arc<Mutex<Database>>,
    config: ClinicConfig,
}

impl VeterinariaCore {
    fn wrap(db: Database, config: ClinicConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }

    /// Run `commit` when every field parsed. Otherwise nothing is stored and
    /// the parse errors come back together with what `validate` finds in the
    /// remaining fields.
    fn submit<I, T>(
        &self,
        input: &I,
        parsed: ValidationReport,
        validate: impl FnOnce(&I, &ValidationContext<'_>) -> RecordResult<T>,
        commit: impl FnOnce(&Clinic<'_>, &I) -> ClinicResult<Validated<T>>,
        id_of: impl Fn(&T) -> String,
    ) -> Result<FfiSubmission, VeterinariaError> {
        let db = self.db.lock()?;
        let clinic = Clinic::new(&db, &self.config);
        if parsed.is_valid() {
            return submission(commit(&clinic, input), id_of);
        }

        let mut report = parsed;
        match validate(input, &clinic.validation_context()) {
            Ok(validated) => report.advisories.extend(validated.advisories),
            Err(RecordError::Invalid(later)) => report.absorb(later),
            Err(RecordError::Lookup(err)) => return Err(err.into()),
        }
        Ok(FfiSubmission::rejected(report))
    }
}

#[uniffi::export]
impl VeterinariaCore {
    /// Language tag for user-facing text, e.g. `es`.
    pub fn locale(&self) -> String {
        self.config.locale.clone()
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    pub fn create_animal_type(
        &self,
        name: String,
        description: String,
    ) -> Result<FfiAnimalType, VeterinariaError> {
        let db = self.db.lock()?;
        let animal_type = Clinic::new(&db, &self.config).create_animal_type(&name, &description)?;
        Ok(animal_type.into())
    }

    pub fn list_animal_types(&self, active_only: bool) -> Result<Vec<FfiAnimalType>, VeterinariaError> {
        let db = self.db.lock()?;
        let types = db.list_animal_types(active_only)?;
        Ok(types.into_iter().map(|t| t.into()).collect())
    }

    pub fn retire_animal_type(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).retire_animal_type(&id)?;
        Ok(())
    }

    pub fn create_category(
        &self,
        name: String,
        description: String,
    ) -> Result<FfiCategory, VeterinariaError> {
        let db = self.db.lock()?;
        let category = Clinic::new(&db, &self.config).create_category(&name, &description)?;
        Ok(category.into())
    }

    pub fn list_categories(&self, active_only: bool) -> Result<Vec<FfiCategory>, VeterinariaError> {
        let db = self.db.lock()?;
        let categories = db.list_categories(active_only)?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    pub fn retire_category(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).retire_category(&id)?;
        Ok(())
    }

    // =========================================================================
    // Veterinarians
    // =========================================================================

    pub fn create_veterinarian(
        &self,
        input: FfiVeterinarianInput,
    ) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            |input, _| validate_veterinarian(input),
            |clinic, input| clinic.create_veterinarian(input),
            |v| v.id.clone(),
        )
    }

    pub fn list_veterinarians(
        &self,
        active_only: bool,
    ) -> Result<Vec<FfiVeterinarian>, VeterinariaError> {
        let db = self.db.lock()?;
        let vets = db.list_veterinarians(active_only)?;
        Ok(vets.into_iter().map(|v| v.into()).collect())
    }

    /// Retired veterinarians can no longer be assigned to pets.
    pub fn retire_veterinarian(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).retire_veterinarian(&id)?;
        Ok(())
    }

    // =========================================================================
    // Pet Operations
    // =========================================================================

    /// Register a new pet.
    pub fn register_pet(&self, input: FfiPetInput) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_pet,
            |clinic, input| clinic.register_pet(input),
            |p| p.id.clone(),
        )
    }

    /// Update an existing pet; `input.id` selects it.
    pub fn update_pet(&self, input: FfiPetInput) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_pet,
            |clinic, input| clinic.update_pet(input),
            |p| p.id.clone(),
        )
    }

    pub fn get_pet(&self, id: String) -> Result<Option<FfiPet>, VeterinariaError> {
        let db = self.db.lock()?;
        Ok(db.get_pet(&id)?.map(|p| p.into()))
    }

    /// Search active pets by name.
    pub fn search_pets(&self, query: String, limit: u32) -> Result<Vec<FfiPet>, VeterinariaError> {
        let db = self.db.lock()?;
        let pets = db.search_pets(&query, limit as usize)?;
        Ok(pets.into_iter().map(|p| p.into()).collect())
    }

    /// Soft delete a pet.
    pub fn retire_pet(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).retire_pet(&id)?;
        Ok(())
    }

    // =========================================================================
    // Product Operations
    // =========================================================================

    pub fn create_product(&self, input: FfiProductInput) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_product,
            |clinic, input| clinic.create_product(input),
            |p| p.id.clone(),
        )
    }

    pub fn update_product(&self, input: FfiProductInput) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_product,
            |clinic, input| clinic.update_product(input),
            |p| p.id.clone(),
        )
    }

    pub fn get_product(&self, id: String) -> Result<Option<FfiProduct>, VeterinariaError> {
        let db = self.db.lock()?;
        Ok(db.get_product(&id)?.map(|p| p.into()))
    }

    /// Search active products by name, description or code.
    pub fn search_products(
        &self,
        query: String,
        category_id: Option<String>,
        limit: u32,
    ) -> Result<Vec<FfiProduct>, VeterinariaError> {
        let db = self.db.lock()?;
        let products = Clinic::new(&db, &self.config).search_products(
            &query,
            category_id.as_deref(),
            limit as usize,
        )?;
        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// Soft delete a product.
    pub fn retire_product(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).retire_product(&id)?;
        Ok(())
    }

    pub fn inventory_summary(
        &self,
        category_id: String,
    ) -> Result<FfiInventorySummary, VeterinariaError> {
        let db = self.db.lock()?;
        let summary = Clinic::new(&db, &self.config).inventory_summary(&category_id)?;
        Ok(summary.into())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    pub fn schedule_appointment(
        &self,
        input: FfiAppointmentInput,
    ) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_appointment,
            |clinic, input| clinic.schedule_appointment(input),
            |a| a.id.clone(),
        )
    }

    /// Update an appointment that is neither final nor past.
    pub fn update_appointment(
        &self,
        input: FfiAppointmentInput,
    ) -> Result<FfiSubmission, VeterinariaError> {
        let (input, parsed) = input.parse();
        self.submit(
            &input,
            parsed,
            validate_appointment,
            |clinic, input| clinic.update_appointment(input),
            |a| a.id.clone(),
        )
    }

    pub fn cancel_appointment(&self, id: String) -> Result<(), VeterinariaError> {
        let db = self.db.lock()?;
        Clinic::new(&db, &self.config).cancel_appointment(&id)?;
        Ok(())
    }

    pub fn get_appointment(&self, id: String) -> Result<Option<FfiAppointment>, VeterinariaError> {
        let db = self.db.lock()?;
        Ok(db.get_appointment(&id)?.map(|a| a.into()))
    }

    /// List appointments by free text, status and local calendar date.
    pub fn list_appointments(
        &self,
        filter: FfiAppointmentFilter,
    ) -> Result<Vec<FfiAppointment>, VeterinariaError> {
        let db = self.db.lock()?;
        let clinic = Clinic::new(&db, &self.config);

        let status = match filter.status.as_deref().and_then(non_blank) {
            None => None,
            Some(code) => Some(AppointmentStatus::from_code(code).ok_or_else(|| {
                VeterinariaError::InvalidInput(format!("Unknown appointment status: {}", code))
            })?),
        };
        let (from, until) = match filter.date.as_deref().and_then(non_blank) {
            None => (None, None),
            Some(raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    VeterinariaError::InvalidInput(format!("Invalid date: {}", raw))
                })?;
                let (start, end) = clinic.local_day_bounds(date);
                (Some(start), Some(end))
            }
        };

        let appointments = clinic.list_appointments(&AppointmentFilter {
            text: filter.text,
            status,
            from,
            until,
        })?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }
}

/// Flatten a record-service result into an FFI submission outcome.
fn submission<T>(
    result: ClinicResult<Validated<T>>,
    id_of: impl Fn(&T) -> String,
) -> Result<FfiSubmission, VeterinariaError> {
    match result {
        Ok(validated) => Ok(FfiSubmission {
            accepted: true,
            id: Some(id_of(&validated.record)),
            errors: Vec::new(),
            advisories: validated.advisories.into_iter().map(|a| a.into()).collect(),
        }),
        Err(ClinicError::Invalid(report)) => Ok(FfiSubmission::rejected(report)),
        Err(err) => Err(err.into()),
    }
}

/// Collects format errors while turning FFI strings into typed input.
#[derive(Default)]
struct FormParser {
    report: ValidationReport,
}

impl FormParser {
    fn decimal(&mut self, field: &'static str, raw: &str) -> Option<Decimal> {
        let raw = non_blank(raw)?;
        match Decimal::from_str(raw) {
            Ok(value) => Some(value),
            Err(_) => {
                self.report
                    .field_error(field, FieldErrorCode::InvalidFormat, "Enter a valid number");
                None
            }
        }
    }

    fn instant(&mut self, field: &'static str, raw: &str) -> Option<DateTime<Utc>> {
        let raw = non_blank(raw)?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(value) => Some(value.with_timezone(&Utc)),
            Err(_) => {
                self.report.field_error(
                    field,
                    FieldErrorCode::InvalidFormat,
                    "Enter a valid date and time",
                );
                None
            }
        }
    }

    fn date(&mut self, field: &'static str, raw: &str) -> Option<NaiveDate> {
        let raw = non_blank(raw)?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(value) => Some(value),
            Err(_) => {
                self.report
                    .field_error(field, FieldErrorCode::InvalidFormat, "Enter a valid date");
                None
            }
        }
    }

    fn choice<T>(
        &mut self,
        field: &'static str,
        raw: &str,
        from_code: fn(&str) -> Option<T>,
    ) -> Option<T> {
        let raw = non_blank(raw)?;
        let value = from_code(raw);
        if value.is_none() {
            self.report
                .field_error(field, FieldErrorCode::InvalidFormat, "Select a valid option");
        }
        value
    }

    /// Typed input, with fields that failed to parse left unset.
    fn finish<T>(self, input: T) -> (T, ValidationReport) {
        (input, self.report)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe animal type.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimalType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
}

impl From<AnimalType> for FfiAnimalType {
    fn from(animal_type: AnimalType) -> Self {
        Self {
            id: animal_type.id,
            name: animal_type.name,
            description: animal_type.description,
            active: animal_type.active,
        }
    }
}

/// FFI-safe category.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
}

impl From<Category> for FfiCategory {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            active: category.active,
        }
    }
}

/// Veterinarian form as submitted. Empty strings mean "not given".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVeterinarianInput {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub registration_number: String,
    /// `YYYY-MM-DD`
    pub hired_on: String,
}

impl FfiVeterinarianInput {
    fn parse(self) -> (VeterinarianInput, ValidationReport) {
        let mut parser = FormParser::default();
        let hired_on = parser.date("hired_on", &self.hired_on);

        parser.finish(VeterinarianInput {
            name: self.name,
            specialty: self.specialty,
            phone: self.phone,
            email: self.email,
            registration_number: self.registration_number,
            hired_on,
        })
    }
}

/// FFI-safe veterinarian.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVeterinarian {
    pub id: String,
    pub name: String,
    /// `Dr. <name>`, with the specialty when known
    pub display_name: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub registration_number: Option<String>,
    pub hired_on: Option<String>,
    pub active: bool,
}

impl From<Veterinarian> for FfiVeterinarian {
    fn from(vet: Veterinarian) -> Self {
        Self {
            display_name: vet.display_name(),
            id: vet.id,
            name: vet.name,
            specialty: vet.specialty,
            phone: vet.phone,
            email: vet.email,
            registration_number: vet.registration_number,
            hired_on: vet.hired_on.map(|d| d.format("%Y-%m-%d").to_string()),
            active: vet.active,
        }
    }
}

/// Pet form as submitted. Empty strings mean "not given".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPetInput {
    pub id: Option<String>,
    pub animal_type_id: String,
    pub name: String,
    pub breed: String,
    pub age: Option<i64>,
    /// `male` or `female`
    pub sex: String,
    /// `small`, `medium`, `large` or `giant`
    pub size: String,
    /// Decimal kilograms, e.g. `"4.5"`
    pub weight_kg: String,
    pub color: String,
    pub owner_name: String,
    pub owner_phone: String,
    pub owner_email: String,
    pub owner_address: String,
    pub microchip: String,
    pub observations: String,
    /// Empty for none
    pub attending_veterinarian_id: String,
}

impl FfiPetInput {
    fn parse(self) -> (PetInput, ValidationReport) {
        let mut parser = FormParser::default();
        let sex = parser.choice("sex", &self.sex, Sex::from_code);
        let size = parser.choice("size", &self.size, PetSize::from_code);
        let weight_kg = parser.decimal("weight_kg", &self.weight_kg);

        parser.finish(PetInput {
            id: self.id,
            animal_type_id: self.animal_type_id,
            name: self.name,
            breed: self.breed,
            age: self.age,
            sex,
            size,
            weight_kg,
            color: self.color,
            owner_name: self.owner_name,
            owner_phone: self.owner_phone,
            owner_email: self.owner_email,
            owner_address: self.owner_address,
            microchip: self.microchip,
            observations: self.observations,
            attending_veterinarian_id: self.attending_veterinarian_id,
        })
    }
}

/// FFI-safe pet.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPet {
    pub id: String,
    pub animal_type_id: String,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub sex: String,
    pub size: Option<String>,
    pub weight_kg: Option<String>,
    pub color: Option<String>,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub owner_email: Option<String>,
    pub owner_address: Option<String>,
    pub microchip: Option<String>,
    pub observations: Option<String>,
    pub attending_veterinarian_id: Option<String>,
    pub active: bool,
}

impl From<Pet> for FfiPet {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            animal_type_id: pet.animal_type_id,
            name: pet.name,
            breed: pet.breed,
            age: pet.age,
            sex: pet.sex.as_str().to_string(),
            size: pet.size.map(|s| s.as_str().to_string()),
            weight_kg: pet.weight_kg.map(|w| w.to_string()),
            color: pet.color,
            owner_name: pet.owner_name,
            owner_phone: pet.owner_phone,
            owner_email: pet.owner_email,
            owner_address: pet.owner_address,
            microchip: pet.microchip,
            observations: pet.observations,
            attending_veterinarian_id: pet.attending_veterinarian_id,
            active: pet.active,
        }
    }
}

/// Product form as submitted. Empty strings mean "not given".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProductInput {
    pub id: Option<String>,
    pub category_id: String,
    pub name: String,
    pub description: String,
    /// `medication`, `food`, `service`, `accessory` or `equipment`
    pub product_type: String,
    /// Decimal price, e.g. `"25990"`
    pub price: String,
    pub code: String,
    pub stock: Option<i64>,
    pub active_ingredient: String,
    pub concentration: String,
    pub laboratory: String,
}

impl FfiProductInput {
    fn parse(self) -> (ProductInput, ValidationReport) {
        let mut parser = FormParser::default();
        let product_type = parser.choice("product_type", &self.product_type, ProductType::from_code);
        let price = parser.decimal("price", &self.price);

        parser.finish(ProductInput {
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            product_type,
            price,
            code: self.code,
            stock: self.stock,
            active_ingredient: self.active_ingredient,
            concentration: self.concentration,
            laboratory: self.laboratory,
        })
    }
}

/// FFI-safe product.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProduct {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_type: String,
    pub price: String,
    pub code: String,
    pub stock: u32,
    pub low_stock: bool,
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub laboratory: Option<String>,
    pub active: bool,
}

impl From<Product> for FfiProduct {
    fn from(product: Product) -> Self {
        Self {
            low_stock: product.is_low_stock(),
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            description: product.description,
            product_type: product.product_type.as_str().to_string(),
            price: product.price.to_string(),
            code: product.code,
            stock: product.stock,
            active_ingredient: product.active_ingredient,
            concentration: product.concentration,
            laboratory: product.laboratory,
            active: product.active,
        }
    }
}

/// FFI-safe inventory summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInventorySummary {
    pub category_id: String,
    pub product_count: u32,
    pub total_value: String,
    pub low_stock_count: u32,
    pub in_stock_count: u32,
}

impl From<InventorySummary> for FfiInventorySummary {
    fn from(summary: InventorySummary) -> Self {
        Self {
            category_id: summary.category_id,
            product_count: summary.product_count,
            total_value: summary.total_value.to_string(),
            low_stock_count: summary.low_stock_count,
            in_stock_count: summary.in_stock_count,
        }
    }
}

/// Appointment form as submitted. Empty strings mean "not given".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentInput {
    pub id: Option<String>,
    pub pet_id: String,
    /// RFC 3339 instant
    pub scheduled_at: String,
    pub kind: String,
    /// Empty means `scheduled`
    pub status: String,
    pub reason: String,
    pub observations: String,
    pub veterinarian: String,
    pub estimated_price: String,
}

impl FfiAppointmentInput {
    fn parse(self) -> (AppointmentInput, ValidationReport) {
        let mut parser = FormParser::default();
        let scheduled_at = parser.instant("scheduled_at", &self.scheduled_at);
        let kind = parser.choice("kind", &self.kind, AppointmentKind::from_code);
        let status = parser
            .choice("status", &self.status, AppointmentStatus::from_code)
            .unwrap_or_default();
        let estimated_price = parser.decimal("estimated_price", &self.estimated_price);

        parser.finish(AppointmentInput {
            id: self.id,
            pet_id: self.pet_id,
            scheduled_at,
            kind,
            status,
            reason: self.reason,
            observations: self.observations,
            veterinarian: self.veterinarian,
            estimated_price,
        })
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub pet_id: String,
    pub scheduled_at: String,
    pub kind: String,
    pub status: String,
    pub reason: String,
    pub observations: Option<String>,
    pub veterinarian: Option<String>,
    pub estimated_price: Option<String>,
    /// Neither final nor past at the time of reading
    pub is_modifiable: bool,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            is_modifiable: appointment.is_modifiable_now(),
            id: appointment.id,
            pet_id: appointment.pet_id,
            scheduled_at: appointment.scheduled_at.to_rfc3339(),
            kind: appointment.kind.as_str().to_string(),
            status: appointment.status.as_str().to_string(),
            reason: appointment.reason,
            observations: appointment.observations,
            veterinarian: appointment.veterinarian,
            estimated_price: appointment.estimated_price.map(|p| p.to_string()),
        }
    }
}

/// Appointment list criteria. `None` or empty fields do not filter.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentFilter {
    pub text: Option<String>,
    pub status: Option<String>,
    /// Local calendar date, `YYYY-MM-DD`
    pub date: Option<String>,
}

/// One rejection reason.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    /// `None` for form-wide errors
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl From<ValidationError> for FfiFieldError {
    fn from(error: ValidationError) -> Self {
        Self {
            field: error.field().map(str::to_string),
            code: error.code().as_str().to_string(),
            message: error.message(),
        }
    }
}

/// Non-rejecting remark.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdvisory {
    pub field: String,
    pub message: String,
}

impl From<Advisory> for FfiAdvisory {
    fn from(advisory: Advisory) -> Self {
        Self {
            field: advisory.field.to_string(),
            message: advisory.message,
        }
    }
}

/// Outcome of a create or update submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub accepted: bool,
    /// Identity of the stored record when accepted
    pub id: Option<String>,
    pub errors: Vec<FfiFieldError>,
    pub advisories: Vec<FfiAdvisory>,
}

impl FfiSubmission {
    fn rejected(report: ValidationReport) -> Self {
        Self {
            accepted: false,
            id: None,
            errors: report.errors.into_iter().map(|e| e.into()).collect(),
            advisories: report.advisories.into_iter().map(|a| a.into()).collect(),
        }
    }
}
