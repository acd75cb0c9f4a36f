//! Record validation: field validators, whole-record validators and the
//! appointment scheduling rule.
//!
//! Field validators are pure functions over one raw value. Record validators
//! run every field validator, collect all failures into a [`ValidationReport`],
//! and consult a [`RecordLookup`] for references, uniqueness and scheduling
//! conflicts.

mod appointment;
mod fields;
mod pet;
mod product;
mod veterinarian;

pub use appointment::*;
pub use fields::*;
pub use pet::*;
pub use product::*;
pub use veterinarian::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::ClinicConfig;
use crate::db::{Database, DbError, DbResult};
use crate::models::{AnimalType, Appointment, AppointmentStatus};

/// Stable reason codes for rejected values.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    TooShort,
    TooLong,
    InvalidCharacters,
    NumericOnly,
    TooManySpecialCharacters,
    NotPositive,
    Negative,
    TooHigh,
    SpeciesLimit,
    InvalidFormat,
    TooFewDigits,
    TooManyDigits,
    Duplicate,
    UnknownReference,
    NotInFuture,
    BeyondHorizon,
    OutsideBusinessHours,
    ClosedDay,
    SchedulingConflict,
    CompletedInFuture,
}

impl FieldErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorCode::Required => "required",
            FieldErrorCode::TooShort => "too_short",
            FieldErrorCode::TooLong => "too_long",
            FieldErrorCode::InvalidCharacters => "invalid_characters",
            FieldErrorCode::NumericOnly => "numeric_only",
            FieldErrorCode::TooManySpecialCharacters => "too_many_special_characters",
            FieldErrorCode::NotPositive => "not_positive",
            FieldErrorCode::Negative => "negative",
            FieldErrorCode::TooHigh => "too_high",
            FieldErrorCode::SpeciesLimit => "species_limit",
            FieldErrorCode::InvalidFormat => "invalid_format",
            FieldErrorCode::TooFewDigits => "too_few_digits",
            FieldErrorCode::TooManyDigits => "too_many_digits",
            FieldErrorCode::Duplicate => "duplicate",
            FieldErrorCode::UnknownReference => "unknown_reference",
            FieldErrorCode::NotInFuture => "not_in_future",
            FieldErrorCode::BeyondHorizon => "beyond_horizon",
            FieldErrorCode::OutsideBusinessHours => "outside_business_hours",
            FieldErrorCode::ClosedDay => "closed_day",
            FieldErrorCode::SchedulingConflict => "scheduling_conflict",
            FieldErrorCode::CompletedInFuture => "completed_in_future",
        }
    }
}

/// A single rejected value.
#[derive(Error, Debug, Clone, Serialize, PartialEq)]
#[error("{message}")]
pub struct FieldError {
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// One reason a submission was rejected.
#[derive(Error, Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field}: {error}")]
    Field {
        field: &'static str,
        error: FieldError,
    },

    #[error("{field}: {value} is already registered")]
    Uniqueness { field: &'static str, value: String },

    #[error("Another appointment is booked between {window_start} and {window_end}")]
    SchedulingConflict {
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        conflicting_ids: Vec<String>,
    },

    #[error("{message}")]
    CrossField {
        field: Option<&'static str>,
        code: FieldErrorCode,
        message: String,
    },
}

impl ValidationError {
    pub fn code(&self) -> FieldErrorCode {
        match self {
            ValidationError::Field { error, .. } => error.code,
            ValidationError::Uniqueness { .. } => FieldErrorCode::Duplicate,
            ValidationError::SchedulingConflict { .. } => FieldErrorCode::SchedulingConflict,
            ValidationError::CrossField { code, .. } => *code,
        }
    }

    /// Human-readable reason without the field prefix.
    pub fn message(&self) -> String {
        match self {
            ValidationError::Field { error, .. } => error.message.clone(),
            ValidationError::CrossField { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Field the error belongs to; `None` for form-wide errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Field { field, .. } => Some(*field),
            ValidationError::Uniqueness { field, .. } => Some(*field),
            ValidationError::SchedulingConflict { .. } => None,
            ValidationError::CrossField { field, .. } => *field,
        }
    }
}

/// A non-rejecting remark about an accepted submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Advisory {
    pub field: &'static str,
    pub message: String,
}

/// Every error and advisory produced for one submission.
#[derive(Error, Debug, Clone, Default, Serialize, PartialEq)]
#[error("{} validation error(s)", .errors.len())]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub advisories: Vec<Advisory>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn advise(&mut self, field: &'static str, message: impl Into<String>) {
        self.advisories.push(Advisory {
            field,
            message: message.into(),
        });
    }

    /// Record a rejection of `field`.
    pub fn field_error(
        &mut self,
        field: &'static str,
        code: FieldErrorCode,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError::Field {
            field,
            error: FieldError::new(code, message),
        });
    }

    /// Record a field result, keeping the value on success.
    pub fn check<T>(&mut self, field: &'static str, result: FieldResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(ValidationError::Field { field, error });
                None
            }
        }
    }

    /// Errors attached to `field`.
    pub fn errors_for(&self, field: &str) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.field() == Some(field))
            .collect()
    }

    /// Whether `field` carries an error with `code`.
    pub fn has_error(&self, field: &str, code: FieldErrorCode) -> bool {
        self.errors_for(field).iter().any(|e| e.code() == code)
    }

    /// Form-wide errors (no field).
    pub fn form_errors(&self) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field().is_none()).collect()
    }

    /// Append the findings of a later pass. Fields that already carry an
    /// error keep only their first one.
    pub fn absorb(&mut self, later: ValidationReport) {
        for error in later.errors {
            let seen = error
                .field()
                .is_some_and(|field| !self.errors_for(field).is_empty());
            if !seen {
                self.errors.push(error);
            }
        }
        self.advisories.extend(later.advisories);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// An accepted record together with any advisories raised for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub record: T,
    pub advisories: Vec<Advisory>,
}

/// Failure of a record validator.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid submission: {0}")]
    Invalid(ValidationReport),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] DbError),
}

pub type RecordResult<T> = Result<Validated<T>, RecordError>;

impl ValidationReport {
    /// Accept `record` unless an error was collected.
    pub(crate) fn finish<T>(self, record: T) -> RecordResult<T> {
        if self.is_valid() {
            Ok(Validated {
                record,
                advisories: self.advisories,
            })
        } else {
            Err(RecordError::Invalid(self))
        }
    }

    pub(crate) fn reject<T>(self) -> RecordResult<T> {
        Err(RecordError::Invalid(self))
    }
}

/// Read access the validators need from storage.
pub trait RecordLookup {
    /// Whether a pet other than `exclude_id` carries this microchip.
    fn microchip_taken(&self, microchip: &str, exclude_id: Option<&str>) -> DbResult<bool>;

    /// Whether a product other than `exclude_id` uses this code.
    fn product_code_taken(&self, code: &str, exclude_id: Option<&str>) -> DbResult<bool>;

    fn animal_type(&self, id: &str) -> DbResult<Option<AnimalType>>;

    fn category_is_active(&self, id: &str) -> DbResult<bool>;

    fn pet_is_active(&self, id: &str) -> DbResult<bool>;

    fn veterinarian_is_active(&self, id: &str) -> DbResult<bool>;

    /// Appointments in the inclusive range `[start, end]` with one of `statuses`.
    fn appointments_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[AppointmentStatus],
        exclude_id: Option<&str>,
    ) -> DbResult<Vec<Appointment>>;
}

impl RecordLookup for Database {
    fn microchip_taken(&self, microchip: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        Database::microchip_taken(self, microchip, exclude_id)
    }

    fn product_code_taken(&self, code: &str, exclude_id: Option<&str>) -> DbResult<bool> {
        Database::product_code_taken(self, code, exclude_id)
    }

    fn animal_type(&self, id: &str) -> DbResult<Option<AnimalType>> {
        self.get_animal_type(id)
    }

    fn category_is_active(&self, id: &str) -> DbResult<bool> {
        Database::category_is_active(self, id)
    }

    fn pet_is_active(&self, id: &str) -> DbResult<bool> {
        Database::pet_is_active(self, id)
    }

    fn veterinarian_is_active(&self, id: &str) -> DbResult<bool> {
        Database::veterinarian_is_active(self, id)
    }

    fn appointments_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        statuses: &[AppointmentStatus],
        exclude_id: Option<&str>,
    ) -> DbResult<Vec<Appointment>> {
        Database::appointments_in_window(self, start, end, statuses, exclude_id)
    }
}

/// Everything a record validator consults besides the submission itself.
pub struct ValidationContext<'a> {
    pub lookup: &'a dyn RecordLookup,
    pub config: &'a ClinicConfig,
    /// Reference instant for the temporal rules
    pub now: DateTime<Utc>,
}

impl<'a> ValidationContext<'a> {
    /// Context evaluated against the current clock.
    pub fn new(lookup: &'a dyn RecordLookup, config: &'a ClinicConfig) -> Self {
        Self {
            lookup,
            config,
            now: Utc::now(),
        }
    }

    /// Same context with a fixed reference instant.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Trimmed value, `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
