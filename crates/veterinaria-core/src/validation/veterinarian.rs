//! Veterinarian record validation.

use tracing::debug;

use super::{
    non_blank, validate_email, validate_phone, validate_registration_number, validate_specialty,
    validate_vet_name, RecordResult, ValidationReport,
};
use crate::models::{Veterinarian, VeterinarianInput};

pub fn validate_veterinarian(input: &VeterinarianInput) -> RecordResult<Veterinarian> {
    let mut report = ValidationReport::default();

    let name = report.check("name", validate_vet_name(&input.name));
    let specialty = non_blank(&input.specialty)
        .and_then(|text| report.check("specialty", validate_specialty(text)));
    let phone =
        non_blank(&input.phone).and_then(|phone| report.check("phone", validate_phone(phone)));
    let email =
        non_blank(&input.email).and_then(|email| report.check("email", validate_email(email)));
    let registration_number = non_blank(&input.registration_number).and_then(|number| {
        report.check("registration_number", validate_registration_number(number))
    });

    let Some(name) = name else {
        debug!(errors = report.errors.len(), "Rejected veterinarian submission");
        return report.reject();
    };
    if !report.is_valid() {
        debug!(errors = report.errors.len(), "Rejected veterinarian submission");
        return report.reject();
    }

    let mut vet = Veterinarian::new(name);
    vet.specialty = specialty;
    vet.phone = phone;
    vet.email = email;
    vet.registration_number = registration_number;
    vet.hired_on = input.hired_on;

    report.finish(vet)
}
