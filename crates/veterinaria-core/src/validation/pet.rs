//! Pet record validation.

use tracing::debug;

use super::{
    non_blank, validate_age, validate_email, validate_microchip_format, validate_owner_name,
    validate_pet_name, validate_phone, validate_weight, FieldErrorCode,
    RecordResult, ValidationContext, ValidationError, ValidationReport,
};
use crate::models::{Pet, PetInput, SpeciesKind};

/// Validate a pet submission. A submission with an `id` is an update of that pet.
pub fn validate_pet(input: &PetInput, ctx: &ValidationContext<'_>) -> RecordResult<Pet> {
    let mut report = ValidationReport::default();
    let exclude_id = input.id.as_deref();

    // Species reference; ceilings depend on it
    let mut species = SpeciesKind::Other;
    let animal_type_id = match non_blank(&input.animal_type_id) {
        None => {
            report.field_error(
                "animal_type",
                FieldErrorCode::Required,
                "The animal type is required",
            );
            None
        }
        Some(id) => match ctx.lookup.animal_type(id)? {
            Some(animal_type) if animal_type.active => {
                species = animal_type.species_kind();
                Some(animal_type.id)
            }
            _ => {
                report.field_error(
                    "animal_type",
                    FieldErrorCode::UnknownReference,
                    "Select an active animal type",
                );
                None
            }
        },
    };

    let name = report.check("name", validate_pet_name(&input.name));
    let owner_name = report.check("owner_name", validate_owner_name(&input.owner_name));

    let sex = input.sex;
    if sex.is_none() {
        report.field_error("sex", FieldErrorCode::Required, "The sex is required");
    }

    let age = input
        .age
        .and_then(|age| report.check("age", validate_age(age, species)));
    let weight_kg = input
        .weight_kg
        .and_then(|weight| report.check("weight_kg", validate_weight(weight, species)));

    let owner_phone = non_blank(&input.owner_phone)
        .and_then(|phone| report.check("owner_phone", validate_phone(phone)));
    let owner_email = non_blank(&input.owner_email)
        .and_then(|email| report.check("owner_email", validate_email(email)));

    let microchip = match non_blank(&input.microchip) {
        None => None,
        Some(raw) => match report.check("microchip", validate_microchip_format(raw)) {
            Some(chip) if ctx.lookup.microchip_taken(&chip, exclude_id)? => {
                report.push(ValidationError::Uniqueness {
                    field: "microchip",
                    value: chip,
                });
                None
            }
            chip => chip,
        },
    };

    let attending_veterinarian_id = match non_blank(&input.attending_veterinarian_id) {
        None => None,
        Some(id) if ctx.lookup.veterinarian_is_active(id)? => Some(id.to_string()),
        Some(_) => {
            report.field_error(
                "attending_veterinarian",
                FieldErrorCode::UnknownReference,
                "Select an active veterinarian",
            );
            None
        }
    };

    let (Some(animal_type_id), Some(name), Some(owner_name), Some(sex)) =
        (animal_type_id, name, owner_name, sex)
    else {
        debug!(errors = report.errors.len(), "Rejected pet submission");
        return report.reject();
    };
    if !report.is_valid() {
        debug!(errors = report.errors.len(), "Rejected pet submission");
        return report.reject();
    }

    let mut pet = Pet::new(animal_type_id, name, sex, owner_name);
    if let Some(id) = &input.id {
        pet.id = id.clone();
    }
    pet.breed = non_blank(&input.breed).map(str::to_string);
    pet.age = age;
    pet.size = input.size;
    pet.weight_kg = weight_kg;
    pet.color = non_blank(&input.color).map(str::to_string);
    pet.owner_phone = owner_phone;
    pet.owner_email = owner_email;
    pet.owner_address = non_blank(&input.owner_address).map(str::to_string);
    pet.microchip = microchip;
    pet.observations = non_blank(&input.observations).map(str::to_string);
    pet.attending_veterinarian_id = attending_veterinarian_id;

    report.finish(pet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicConfig;
    use crate::db::Database;
    use crate::models::{AnimalType, Sex, Veterinarian};
    use crate::validation::RecordError;
    use rust_decimal_macros::dec;

    fn setup_db() -> (Database, AnimalType) {
        let db = Database::open_in_memory().unwrap();
        let cat = AnimalType::new("Gato".into(), "Felino doméstico".into());
        db.insert_animal_type(&cat).unwrap();
        (db, cat)
    }

    fn input(animal_type: &AnimalType) -> PetInput {
        PetInput {
            animal_type_id: animal_type.id.clone(),
            name: "Michi".into(),
            sex: Some(Sex::Female),
            owner_name: "Ana Pérez".into(),
            ..Default::default()
        }
    }

    fn rejected(result: RecordResult<Pet>) -> ValidationReport {
        match result {
            Err(RecordError::Invalid(report)) => report,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_pet_is_normalized() {
        let (db, cat) = setup_db();
        let config = ClinicConfig::default();
        let ctx = ValidationContext::new(&db, &config);

        let mut submission = input(&cat);
        submission.name = "  Michi ".into();
        submission.owner_email = "Ana@Correo.CL".into();
        submission.microchip = "  985abc0012345 ".into();
        submission.weight_kg = Some(dec!(4.2));

        let pet = validate_pet(&submission, &ctx).unwrap().record;
        assert_eq!(pet.name, "Michi");
        assert_eq!(pet.owner_email.as_deref(), Some("ana@correo.cl"));
        assert_eq!(pet.microchip.as_deref(), Some("985ABC0012345"));
        assert_eq!(pet.weight_kg, Some(dec!(4.2)));
        assert_eq!(pet.owner_phone, None);
    }

    #[test]
    fn test_all_field_errors_reported() {
        let (db, cat) = setup_db();
        let config = ClinicConfig::default();
        let ctx = ValidationContext::new(&db, &config);

        let mut submission = input(&cat);
        submission.name = "M".into();
        submission.weight_kg = Some(dec!(16));
        submission.age = Some(30);
        submission.owner_phone = "123".into();
        submission.sex = None;

        let report = rejected(validate_pet(&submission, &ctx));
        assert!(report.has_error("name", FieldErrorCode::TooShort));
        assert!(report.has_error("weight_kg", FieldErrorCode::SpeciesLimit));
        assert!(report.has_error("age", FieldErrorCode::SpeciesLimit));
        assert!(report.has_error("owner_phone", FieldErrorCode::InvalidFormat));
        assert!(report.has_error("sex", FieldErrorCode::Required));
    }

    #[test]
    fn test_inactive_animal_type_rejected() {
        let (db, cat) = setup_db();
        db.deactivate_animal_type(&cat.id).unwrap();
        let config = ClinicConfig::default();
        let ctx = ValidationContext::new(&db, &config);

        let report = rejected(validate_pet(&input(&cat), &ctx));
        assert!(report.has_error("animal_type", FieldErrorCode::UnknownReference));
    }

    #[test]
    fn test_microchip_uniqueness_excludes_self() {
        let (db, cat) = setup_db();
        let config = ClinicConfig::default();
        let ctx = ValidationContext::new(&db, &config);

        let mut submission = input(&cat);
        submission.microchip = "ABCDEF123456".into();
        let pet = validate_pet(&submission, &ctx).unwrap().record;
        db.insert_pet(&pet).unwrap();

        // Another pet with the same chip
        let report = rejected(validate_pet(&submission, &ctx));
        assert!(report.has_error("microchip", FieldErrorCode::Duplicate));

        // The same pet re-submitted as an update
        submission.id = Some(pet.id.clone());
        submission.microchip = "abcdef123456".into();
        let updated = validate_pet(&submission, &ctx).unwrap().record;
        assert_eq!(updated.id, pet.id);
    }

    #[test]
    fn test_attending_veterinarian_must_be_active() {
        let (db, cat) = setup_db();
        let config = ClinicConfig::default();
        let ctx = ValidationContext::new(&db, &config);

        let vet = Veterinarian::new("Ana Soto".into());
        db.insert_veterinarian(&vet).unwrap();

        let mut submission = input(&cat);
        submission.attending_veterinarian_id = vet.id.clone();
        let pet = validate_pet(&submission, &ctx).unwrap().record;
        assert_eq!(pet.attending_veterinarian_id.as_deref(), Some(vet.id.as_str()));

        db.deactivate_veterinarian(&vet.id).unwrap();
        let report = rejected(validate_pet(&submission, &ctx));
        assert!(report.has_error("attending_veterinarian", FieldErrorCode::UnknownReference));

        submission.attending_veterinarian_id = "no-such-vet".into();
        let report = rejected(validate_pet(&submission, &ctx));
        assert!(report.has_error("attending_veterinarian", FieldErrorCode::UnknownReference));
    }
}
