//! Single-field validators.
//!
//! Each validator takes one raw value and returns the normalized value it
//! accepts or the first rule it breaks.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::{FieldError, FieldErrorCode, FieldResult};
use crate::models::SpeciesKind;

static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZáéíóúñüÁÉÍÓÚÑÜ\s\-'\.]+$").unwrap());

static PHONE_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+\-()\s]").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[\d\-()\s]{7,20}$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static MICROCHIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-F0-9]{10,20}$").unwrap());

static PRODUCT_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9\-_]{3,20}$").unwrap());

static REGISTRATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9\-]{3,50}$").unwrap());

static SPECIAL_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s\-_áéíóúñüÁÉÍÓÚÑÜ]").unwrap());

const MAX_WEIGHT_KG: i64 = 200;
const MAX_AGE_YEARS: i64 = 50;
const MAX_PRODUCT_PRICE: i64 = 10_000_000;
const MAX_ESTIMATED_PRICE: i64 = 1_000_000;
const MAX_STOCK: i64 = 100_000;
const MAX_EMAIL_LEN: usize = 100;
const MAX_PRODUCT_NAME_SPECIALS: usize = 3;
const MAX_DECIMAL_PLACES: u32 = 2;

fn err<T>(code: FieldErrorCode, message: impl Into<String>) -> FieldResult<T> {
    Err(FieldError::new(code, message))
}

/// Rejects amounts with more than two decimal places. Trailing zeros do not count.
fn check_scale(value: Decimal, label: &str) -> FieldResult<()> {
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return err(
            FieldErrorCode::InvalidFormat,
            format!(
                "{} can have at most {} decimal places",
                label, MAX_DECIMAL_PLACES
            ),
        );
    }
    Ok(())
}

fn person_name(value: &str, label: &str, min: usize, max: usize) -> FieldResult<String> {
    let name = value.trim();
    let len = name.chars().count();

    if len == 0 {
        return err(FieldErrorCode::Required, format!("The {} is required", label));
    }
    if len < min {
        return err(
            FieldErrorCode::TooShort,
            format!("The {} must have at least {} characters", label, min),
        );
    }
    if len > max {
        return err(
            FieldErrorCode::TooLong,
            format!("The {} cannot exceed {} characters", label, max),
        );
    }
    if !PERSON_NAME_RE.is_match(name) {
        return err(
            FieldErrorCode::InvalidCharacters,
            format!(
                "The {} may only contain letters, spaces, hyphens, apostrophes and periods",
                label
            ),
        );
    }
    Ok(name.to_string())
}

/// Pet name: 2–50 characters of letters, spaces and `-'.`.
pub fn validate_pet_name(value: &str) -> FieldResult<String> {
    person_name(value, "pet name", 2, 50)
}

/// Owner name: 3–100 characters of letters, spaces and `-'.`.
pub fn validate_owner_name(value: &str) -> FieldResult<String> {
    person_name(value, "owner name", 3, 100)
}

/// Veterinarian name: 3–200 characters of letters, spaces and `-'.`.
pub fn validate_vet_name(value: &str) -> FieldResult<String> {
    person_name(value, "veterinarian name", 3, 200)
}

/// Weight in kilograms, bounded globally and by species.
pub fn validate_weight(weight: Decimal, species: SpeciesKind) -> FieldResult<Decimal> {
    if weight <= Decimal::ZERO {
        return err(FieldErrorCode::NotPositive, "Weight must be greater than 0");
    }
    if weight > Decimal::from(MAX_WEIGHT_KG) {
        return err(
            FieldErrorCode::TooHigh,
            format!("Weight cannot exceed {} kg", MAX_WEIGHT_KG),
        );
    }
    check_scale(weight, "Weight")?;
    if let Some(limit) = species.max_weight_kg() {
        if weight > limit {
            return err(
                FieldErrorCode::SpeciesLimit,
                format!(
                    "A {} cannot weigh more than {} kg",
                    species.label(),
                    limit
                ),
            );
        }
    }
    Ok(weight)
}

/// Age in years, bounded globally and by species.
pub fn validate_age(age: i64, species: SpeciesKind) -> FieldResult<u32> {
    if age < 0 {
        return err(FieldErrorCode::Negative, "Age cannot be negative");
    }
    if age > MAX_AGE_YEARS {
        return err(
            FieldErrorCode::TooHigh,
            format!("Age cannot exceed {} years", MAX_AGE_YEARS),
        );
    }
    if let Some(limit) = species.max_age_years() {
        if age > limit {
            return err(
                FieldErrorCode::SpeciesLimit,
                format!("A {} older than {} years is not plausible", species.label(), limit),
            );
        }
    }
    // Bounded by MAX_AGE_YEARS above
    Ok(age as u32)
}

/// Phone number. Characters other than digits, `+`, `-`, `(`, `)` and
/// whitespace are dropped before checking.
pub fn validate_phone(value: &str) -> FieldResult<String> {
    let cleaned = PHONE_STRIP_RE.replace_all(value.trim(), "");
    let cleaned = cleaned.trim();

    if !PHONE_RE.is_match(cleaned) {
        return err(
            FieldErrorCode::InvalidFormat,
            "Phone may only contain digits, spaces, hyphens, parentheses and a leading +",
        );
    }

    let digits = cleaned.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 {
        return err(FieldErrorCode::TooFewDigits, "Phone must have at least 7 digits");
    }
    if digits > 15 {
        return err(FieldErrorCode::TooManyDigits, "Phone cannot have more than 15 digits");
    }
    Ok(cleaned.to_string())
}

/// Email address, returned lowercased.
pub fn validate_email(value: &str) -> FieldResult<String> {
    let email = value.trim();

    if !EMAIL_RE.is_match(email) {
        return err(FieldErrorCode::InvalidFormat, "Enter a valid email address");
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return err(
            FieldErrorCode::TooLong,
            format!("Email cannot exceed {} characters", MAX_EMAIL_LEN),
        );
    }
    Ok(email.to_lowercase())
}

/// Canonical microchip form: trimmed, uppercase. Idempotent.
pub fn normalize_microchip(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Microchip format: 10–20 hexadecimal characters after normalization.
pub fn validate_microchip_format(value: &str) -> FieldResult<String> {
    let chip = normalize_microchip(value);
    if !MICROCHIP_RE.is_match(&chip) {
        return err(
            FieldErrorCode::InvalidFormat,
            "Microchip must be 10 to 20 hexadecimal characters (0-9, A-F)",
        );
    }
    Ok(chip)
}

/// Canonical product code form: trimmed, uppercase. Idempotent.
pub fn normalize_product_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Product code format: 3–20 of `A-Z`, `0-9`, `-`, `_` after normalization.
pub fn validate_product_code_format(value: &str) -> FieldResult<String> {
    let code = normalize_product_code(value);
    if code.is_empty() {
        return err(FieldErrorCode::Required, "The product code is required");
    }
    if !PRODUCT_CODE_RE.is_match(&code) {
        return err(
            FieldErrorCode::InvalidFormat,
            "Code must be 3 to 20 characters: uppercase letters, digits, hyphens or underscores",
        );
    }
    Ok(code)
}

/// Product name: at least 3 characters, not only digits, few special characters.
pub fn validate_product_name(value: &str) -> FieldResult<String> {
    let name = value.trim();
    let len = name.chars().count();

    if len == 0 {
        return err(FieldErrorCode::Required, "The product name is required");
    }
    if len < 3 {
        return err(
            FieldErrorCode::TooShort,
            "The product name must have at least 3 characters",
        );
    }
    if len > 200 {
        return err(
            FieldErrorCode::TooLong,
            "The product name cannot exceed 200 characters",
        );
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return err(
            FieldErrorCode::NumericOnly,
            "The product name cannot be only numbers",
        );
    }
    if SPECIAL_CHAR_RE.find_iter(name).count() > MAX_PRODUCT_NAME_SPECIALS {
        return err(
            FieldErrorCode::TooManySpecialCharacters,
            format!(
                "The product name cannot contain more than {} special characters",
                MAX_PRODUCT_NAME_SPECIALS
            ),
        );
    }
    Ok(name.to_string())
}

fn bounded_price(price: Decimal, max: i64) -> FieldResult<Decimal> {
    if price <= Decimal::ZERO {
        return err(FieldErrorCode::NotPositive, "Price must be greater than 0");
    }
    if price > Decimal::from(max) {
        return err(FieldErrorCode::TooHigh, format!("Price cannot exceed {}", max));
    }
    check_scale(price, "Price")?;
    Ok(price)
}

/// Product unit price: greater than 0, at most 10,000,000.
pub fn validate_product_price(price: Decimal) -> FieldResult<Decimal> {
    bounded_price(price, MAX_PRODUCT_PRICE)
}

/// Appointment estimate: greater than 0, at most 1,000,000.
pub fn validate_estimated_price(price: Decimal) -> FieldResult<Decimal> {
    bounded_price(price, MAX_ESTIMATED_PRICE)
}

pub fn validate_stock(stock: i64) -> FieldResult<u32> {
    if stock < 0 {
        return err(FieldErrorCode::Negative, "Stock cannot be negative");
    }
    if stock > MAX_STOCK {
        return err(
            FieldErrorCode::TooHigh,
            format!("Stock cannot exceed {} units", MAX_STOCK),
        );
    }
    Ok(stock as u32)
}

fn bounded_text(value: &str, label: &str, min: usize, max: usize) -> FieldResult<String> {
    let text = value.trim();
    let len = text.chars().count();

    if len == 0 {
        return err(FieldErrorCode::Required, format!("The {} is required", label));
    }
    if len < min {
        return err(
            FieldErrorCode::TooShort,
            format!("The {} must have at least {} characters", label, min),
        );
    }
    if len > max {
        return err(
            FieldErrorCode::TooLong,
            format!("The {} cannot exceed {} characters", label, max),
        );
    }
    Ok(text.to_string())
}

/// Product description: 10–1000 characters.
pub fn validate_description(value: &str) -> FieldResult<String> {
    bounded_text(value, "description", 10, 1000)
}

/// Appointment reason: 10–500 characters.
pub fn validate_reason(value: &str) -> FieldResult<String> {
    bounded_text(value, "reason", 10, 500)
}

/// Veterinarian specialty: 3–100 characters.
pub fn validate_specialty(value: &str) -> FieldResult<String> {
    bounded_text(value, "specialty", 3, 100)
}

/// Professional registration number, uppercased: 3–50 letters, digits or `-`.
pub fn validate_registration_number(value: &str) -> FieldResult<String> {
    let number = value.trim().to_uppercase();
    if !REGISTRATION_RE.is_match(&number) {
        return err(
            FieldErrorCode::InvalidFormat,
            "The registration number must have 3 to 50 letters, digits or hyphens",
        );
    }
    Ok(number)
}

pub fn validate_active_ingredient(value: &str) -> FieldResult<String> {
    let ingredient = value.trim();
    if ingredient.chars().count() < 3 {
        return err(
            FieldErrorCode::TooShort,
            "The active ingredient must have at least 3 characters",
        );
    }
    Ok(ingredient.to_string())
}
