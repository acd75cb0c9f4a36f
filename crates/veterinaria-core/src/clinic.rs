//! Clinic record service: validate, then persist.
//!
//! Every create and update runs the record validator first and only writes
//! accepted records. Storage-level races (a UNIQUE violation, a conflicting
//! appointment written between check and commit) come back as the same
//! validation errors a rejected submission would produce.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ClinicConfig;
use crate::db::{AppointmentFilter, Database, DbError, SlotWrite};
use crate::models::{
    AnimalType, Appointment, AppointmentInput, Category, InventorySummary, Pet, PetInput,
    Product, ProductInput, Veterinarian, VeterinarianInput,
};
use crate::validation::{
    non_blank, validate_appointment, validate_pet, validate_product, validate_veterinarian,
    FieldErrorCode, RecordError, Validated, ValidationContext, ValidationError,
    ValidationReport,
};

/// Record service errors.
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Invalid submission: {0}")]
    Invalid(ValidationReport),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Appointment {0} can no longer be modified")]
    NotModifiable(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<RecordError> for ClinicError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Invalid(report) => ClinicError::Invalid(report),
            RecordError::Lookup(err) => ClinicError::Database(err),
        }
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;

/// Validate-then-persist operations over one database.
pub struct Clinic<'a> {
    db: &'a Database,
    config: &'a ClinicConfig,
    fixed_now: Option<DateTime<Utc>>,
}

impl<'a> Clinic<'a> {
    pub fn new(db: &'a Database, config: &'a ClinicConfig) -> Self {
        Self {
            db,
            config,
            fixed_now: None,
        }
    }

    /// Evaluate temporal rules against `now` instead of the system clock.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Validation context over this clinic's store, config and clock.
    pub fn validation_context(&self) -> ValidationContext<'a> {
        ValidationContext::new(self.db, self.config).at(self.now())
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    pub fn create_animal_type(&self, name: &str, description: &str) -> ClinicResult<AnimalType> {
        let name = required_name(name, "The animal type name is required")?;
        let animal_type = AnimalType::new(name, description.trim().to_string());
        self.db.insert_animal_type(&animal_type)?;
        info!(id = %animal_type.id, name = %animal_type.name, "Created animal type");
        Ok(animal_type)
    }

    pub fn retire_animal_type(&self, id: &str) -> ClinicResult<()> {
        if !self.db.deactivate_animal_type(id)? {
            return Err(ClinicError::NotFound(format!("animal type {}", id)));
        }
        Ok(())
    }

    pub fn create_category(&self, name: &str, description: &str) -> ClinicResult<Category> {
        let name = required_name(name, "The category name is required")?;
        let category = Category::new(name, description.trim().to_string());
        self.db.insert_category(&category)?;
        info!(id = %category.id, name = %category.name, "Created category");
        Ok(category)
    }

    pub fn retire_category(&self, id: &str) -> ClinicResult<()> {
        if !self.db.deactivate_category(id)? {
            return Err(ClinicError::NotFound(format!("category {}", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Veterinarians
    // =========================================================================

    pub fn create_veterinarian(
        &self,
        input: &VeterinarianInput,
    ) -> ClinicResult<Validated<Veterinarian>> {
        let validated = validate_veterinarian(input)?;
        self.db.insert_veterinarian(&validated.record)?;
        info!(id = %validated.record.id, name = %validated.record.name, "Created veterinarian");
        Ok(validated)
    }

    /// Retired veterinarians stay on existing pets but cannot be assigned again.
    pub fn retire_veterinarian(&self, id: &str) -> ClinicResult<()> {
        if !self.db.deactivate_veterinarian(id)? {
            return Err(ClinicError::NotFound(format!("veterinarian {}", id)));
        }
        info!(id, "Retired veterinarian");
        Ok(())
    }

    // =========================================================================
    // Pets
    // =========================================================================

    /// Register a new pet. Any `id` on the submission is ignored.
    pub fn register_pet(&self, input: &PetInput) -> ClinicResult<Validated<Pet>> {
        let input = PetInput {
            id: None,
            ..input.clone()
        };
        let validated = validate_pet(&input, &self.validation_context())?;

        self.db
            .insert_pet(&validated.record)
            .map_err(|err| unique_race(err, "microchip", validated.record.microchip.clone()))?;
        info!(id = %validated.record.id, "Registered pet");
        Ok(validated)
    }

    pub fn update_pet(&self, input: &PetInput) -> ClinicResult<Validated<Pet>> {
        let existing = self.existing_pet(input.id.as_deref())?;
        let mut validated = validate_pet(input, &self.validation_context())?;

        let pet = &mut validated.record;
        pet.created_at = existing.created_at;
        pet.active = existing.active;
        pet.touch();

        self.db
            .update_pet(pet)
            .map_err(|err| unique_race(err, "microchip", pet.microchip.clone()))?;
        info!(id = %pet.id, "Updated pet");
        Ok(validated)
    }

    /// Soft delete: the pet stays on record but leaves the active lists.
    pub fn retire_pet(&self, id: &str) -> ClinicResult<()> {
        if !self.db.deactivate_pet(id)? {
            return Err(ClinicError::NotFound(format!("pet {}", id)));
        }
        info!(id, "Retired pet");
        Ok(())
    }

    fn existing_pet(&self, id: Option<&str>) -> ClinicResult<Pet> {
        let id = id.ok_or_else(|| ClinicError::NotFound("pet without id".into()))?;
        self.db
            .get_pet(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("pet {}", id)))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a new product. Any `id` on the submission is ignored.
    pub fn create_product(&self, input: &ProductInput) -> ClinicResult<Validated<Product>> {
        let input = ProductInput {
            id: None,
            ..input.clone()
        };
        let validated = validate_product(&input, &self.validation_context())?;

        self.db
            .insert_product(&validated.record)
            .map_err(|err| unique_race(err, "code", Some(validated.record.code.clone())))?;
        info!(id = %validated.record.id, code = %validated.record.code, "Created product");
        Ok(validated)
    }

    pub fn update_product(&self, input: &ProductInput) -> ClinicResult<Validated<Product>> {
        let id = input
            .id
            .as_deref()
            .ok_or_else(|| ClinicError::NotFound("product without id".into()))?;
        let existing = self
            .db
            .get_product(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("product {}", id)))?;
        let mut validated = validate_product(input, &self.validation_context())?;

        let product = &mut validated.record;
        product.created_at = existing.created_at;
        product.active = existing.active;
        product.touch();

        self.db
            .update_product(product)
            .map_err(|err| unique_race(err, "code", Some(product.code.clone())))?;
        info!(id = %product.id, "Updated product");
        Ok(validated)
    }

    /// Soft delete: the product stays on record but leaves the catalog.
    pub fn retire_product(&self, id: &str) -> ClinicResult<()> {
        if !self.db.deactivate_product(id)? {
            return Err(ClinicError::NotFound(format!("product {}", id)));
        }
        info!(id, "Retired product");
        Ok(())
    }

    pub fn search_products(
        &self,
        query: &str,
        category_id: Option<&str>,
        limit: usize,
    ) -> ClinicResult<Vec<Product>> {
        Ok(self.db.search_products(query, category_id, limit)?)
    }

    pub fn inventory_summary(&self, category_id: &str) -> ClinicResult<InventorySummary> {
        if self.db.get_category(category_id)?.is_none() {
            return Err(ClinicError::NotFound(format!("category {}", category_id)));
        }
        Ok(self.db.inventory_summary(category_id)?)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    /// Book a new appointment. Any `id` on the submission is ignored.
    pub fn schedule_appointment(
        &self,
        input: &AppointmentInput,
    ) -> ClinicResult<Validated<Appointment>> {
        let input = AppointmentInput {
            id: None,
            ..input.clone()
        };
        let validated = validate_appointment(&input, &self.validation_context())?;

        let write = self
            .db
            .insert_appointment_checked(&validated.record, self.config.conflict_window())?;
        self.settle_slot(&validated.record, write)?;
        info!(
            id = %validated.record.id,
            scheduled_at = %validated.record.scheduled_at,
            "Scheduled appointment"
        );
        Ok(validated)
    }

    /// Update an appointment that is neither final nor already past.
    pub fn update_appointment(
        &self,
        input: &AppointmentInput,
    ) -> ClinicResult<Validated<Appointment>> {
        let existing = self.existing_appointment(input.id.as_deref())?;
        if !existing.is_modifiable(self.now()) {
            return Err(ClinicError::NotModifiable(existing.id));
        }

        let mut validated = validate_appointment(input, &self.validation_context())?;
        let appointment = &mut validated.record;
        appointment.created_at = existing.created_at;
        appointment.touch();

        let write = self
            .db
            .update_appointment_checked(appointment, self.config.conflict_window())?;
        self.settle_slot(appointment, write)?;
        info!(id = %appointment.id, status = appointment.status.as_str(), "Updated appointment");
        Ok(validated)
    }

    /// Cancel an appointment. Completed or already cancelled ones are left alone.
    pub fn cancel_appointment(&self, id: &str) -> ClinicResult<()> {
        let existing = self.existing_appointment(Some(id))?;
        if existing.status.is_final() {
            return Err(ClinicError::NotModifiable(existing.id));
        }
        self.db.cancel_appointment(id)?;
        info!(id, "Cancelled appointment");
        Ok(())
    }

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> ClinicResult<Vec<Appointment>> {
        Ok(self.db.list_appointments(filter)?)
    }

    /// Appointments on one calendar day in clinic local time.
    pub fn appointments_on(&self, date: NaiveDate) -> ClinicResult<Vec<Appointment>> {
        let (from, until) = self.local_day_bounds(date);
        self.list_appointments(&AppointmentFilter {
            from: Some(from),
            until: Some(until),
            ..Default::default()
        })
    }

    /// UTC bounds `[start, end)` of a local calendar day.
    pub fn local_day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let start = local_midnight - Duration::minutes(i64::from(self.config.utc_offset_minutes));
        (start, start + Duration::days(1))
    }

    fn existing_appointment(&self, id: Option<&str>) -> ClinicResult<Appointment> {
        let id = id.ok_or_else(|| ClinicError::NotFound("appointment without id".into()))?;
        self.db
            .get_appointment(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {}", id)))
    }

    fn settle_slot(&self, appointment: &Appointment, write: SlotWrite) -> ClinicResult<()> {
        match write {
            SlotWrite::Written => Ok(()),
            SlotWrite::Conflict(conflicts) => {
                warn!(
                    id = %appointment.id,
                    conflicts = conflicts.len(),
                    "Conflicting appointment written before commit"
                );
                let window = self.config.conflict_window();
                let mut report = ValidationReport::default();
                report.push(ValidationError::SchedulingConflict {
                    window_start: appointment.scheduled_at - window,
                    window_end: appointment.scheduled_at + window,
                    conflicting_ids: conflicts.into_iter().map(|a| a.id).collect(),
                });
                Err(ClinicError::Invalid(report))
            }
        }
    }
}

fn required_name(name: &str, message: &str) -> ClinicResult<String> {
    match non_blank(name) {
        Some(name) => Ok(name.to_string()),
        None => {
            let mut report = ValidationReport::default();
            report.field_error("name", FieldErrorCode::Required, message);
            Err(ClinicError::Invalid(report))
        }
    }
}

/// Map a UNIQUE violation on `field` to the matching validation error.
fn unique_race(err: DbError, field: &'static str, value: Option<String>) -> ClinicError {
    if !err.is_unique_violation() {
        return ClinicError::Database(err);
    }
    warn!(field, "Uniqueness violated between check and commit");
    let mut report = ValidationReport::default();
    report.push(ValidationError::Uniqueness {
        field,
        value: value.unwrap_or_default(),
    });
    ClinicError::Invalid(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentKind, AppointmentStatus, ProductType, Sex};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        // Friday
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn monday(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0).unwrap()
    }

    fn register_toby(clinic: &Clinic<'_>) -> Pet {
        let dog = clinic.create_animal_type("Perro", "Canino doméstico").unwrap();
        clinic
            .register_pet(&PetInput {
                animal_type_id: dog.id,
                name: "Toby".into(),
                sex: Some(Sex::Male),
                owner_name: "Ana Pérez".into(),
                ..Default::default()
            })
            .unwrap()
            .record
    }

    fn booking(pet: &Pet, at: DateTime<Utc>) -> AppointmentInput {
        AppointmentInput {
            pet_id: pet.id.clone(),
            scheduled_at: Some(at),
            kind: Some(AppointmentKind::Checkup),
            status: AppointmentStatus::Confirmed,
            reason: "Control anual de vacunas".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_schedule_and_conflict() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config).with_clock(now());
        let pet = register_toby(&clinic);

        clinic.schedule_appointment(&booking(&pet, monday(14, 0))).unwrap();

        match clinic.schedule_appointment(&booking(&pet, monday(14, 20))) {
            Err(ClinicError::Invalid(report)) => {
                assert_eq!(report.form_errors()[0].code(), FieldErrorCode::SchedulingConflict)
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        clinic.schedule_appointment(&booking(&pet, monday(15, 0))).unwrap();
        assert_eq!(clinic.appointments_on(monday(0, 0).date_naive()).unwrap().len(), 2);
    }

    #[test]
    fn test_update_gated_by_modifiability() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config).with_clock(now());
        let pet = register_toby(&clinic);

        let booked = clinic
            .schedule_appointment(&booking(&pet, monday(10, 0)))
            .unwrap()
            .record;

        // Moving the appointment does not conflict with its own old slot
        let mut update = booking(&pet, monday(10, 15));
        update.id = Some(booked.id.clone());
        let updated = clinic.update_appointment(&update).unwrap().record;
        assert_eq!(updated.created_at, booked.created_at);
        assert_eq!(updated.scheduled_at, monday(10, 15));

        clinic.cancel_appointment(&booked.id).unwrap();
        assert!(matches!(
            clinic.update_appointment(&update),
            Err(ClinicError::NotModifiable(_))
        ));
        assert!(matches!(
            clinic.cancel_appointment(&booked.id),
            Err(ClinicError::NotModifiable(_))
        ));
    }

    #[test]
    fn test_past_appointment_not_modifiable() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let pet = register_toby(&Clinic::new(&db, &config).with_clock(now()));

        let booked = Clinic::new(&db, &config)
            .with_clock(now())
            .schedule_appointment(&booking(&pet, monday(10, 0)))
            .unwrap()
            .record;

        // A week later the appointment is in the past
        let later = Clinic::new(&db, &config).with_clock(monday(10, 0) + Duration::days(7));
        let mut update = booking(&pet, monday(11, 0));
        update.id = Some(booked.id.clone());
        assert!(matches!(
            later.update_appointment(&update),
            Err(ClinicError::NotModifiable(_))
        ));
    }

    #[test]
    fn test_product_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config);

        let category = clinic.create_category("Alimentos", "Alimento para mascotas").unwrap();
        let input = ProductInput {
            category_id: category.id.clone(),
            name: "Alimento Senior 3kg".into(),
            product_type: Some(ProductType::Food),
            price: Some(dec!(18990)),
            code: "ali-sen-3".into(),
            stock: Some(4),
            ..Default::default()
        };

        let product = clinic.create_product(&input).unwrap().record;
        assert_eq!(clinic.inventory_summary(&category.id).unwrap().low_stock_count, 1);

        let mut update = input.clone();
        update.id = Some(product.id.clone());
        update.stock = Some(30);
        clinic.update_product(&update).unwrap();
        assert_eq!(clinic.inventory_summary(&category.id).unwrap().low_stock_count, 0);

        clinic.retire_product(&product.id).unwrap();
        assert!(clinic.search_products("senior", None, 10).unwrap().is_empty());
        assert!(matches!(
            clinic.retire_product("missing"),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn test_unique_race_maps_to_duplicate() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config);

        let category = clinic.create_category("Accesorios", "").unwrap();
        let product = Product::new(
            category.id.clone(),
            "Collar reflectante".into(),
            ProductType::Accessory,
            "COL-01".into(),
            dec!(5990),
        );
        db.insert_product(&product).unwrap();

        let duplicate = Product {
            id: "other".into(),
            ..product.clone()
        };
        let err = unique_race(db.insert_product(&duplicate).unwrap_err(), "code", Some("COL-01".into()));
        match err {
            ClinicError::Invalid(report) => {
                assert!(report.has_error("code", FieldErrorCode::Duplicate))
            }
            other => panic!("expected duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_reference_names_rejected() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config);

        assert!(matches!(
            clinic.create_category("  ", ""),
            Err(ClinicError::Invalid(_))
        ));
    }

    #[test]
    fn test_veterinarian_assignment() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig::default();
        let clinic = Clinic::new(&db, &config).with_clock(now());
        let toby = register_toby(&clinic);

        let vet = clinic
            .create_veterinarian(&VeterinarianInput {
                name: "Ana Soto".into(),
                specialty: "Medicina interna".into(),
                ..Default::default()
            })
            .unwrap()
            .record;

        let mut update = PetInput {
            id: Some(toby.id.clone()),
            animal_type_id: toby.animal_type_id.clone(),
            name: toby.name.clone(),
            sex: Some(toby.sex),
            owner_name: toby.owner_name.clone(),
            attending_veterinarian_id: vet.id.clone(),
            ..Default::default()
        };
        let updated = clinic.update_pet(&update).unwrap().record;
        assert_eq!(updated.attending_veterinarian_id.as_deref(), Some(vet.id.as_str()));

        clinic.retire_veterinarian(&vet.id).unwrap();
        assert!(db.list_veterinarians(true).unwrap().is_empty());
        // The stored pet keeps its reference
        let stored = db.get_pet(&toby.id).unwrap().unwrap();
        assert_eq!(stored.attending_veterinarian_id.as_deref(), Some(vet.id.as_str()));

        update.name = "Toby Jr".into();
        match clinic.update_pet(&update) {
            Err(ClinicError::Invalid(report)) => assert!(
                report.has_error("attending_veterinarian", FieldErrorCode::UnknownReference)
            ),
            other => panic!("expected rejection, got {:?}", other),
        }

        assert!(matches!(
            clinic.retire_veterinarian("missing"),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn test_local_day_bounds() {
        let db = Database::open_in_memory().unwrap();
        let config = ClinicConfig {
            utc_offset_minutes: -180,
            ..ClinicConfig::default()
        };
        let clinic = Clinic::new(&db, &config);

        let (start, end) = clinic.local_day_bounds(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 10, 20, 3, 0, 0).unwrap());
    }
}
