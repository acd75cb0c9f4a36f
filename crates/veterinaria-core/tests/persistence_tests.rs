//! File-backed store tests, including the FFI facade.

use chrono::{Datelike, Duration, NaiveTime, Utc, Weekday};
use rust_decimal_macros::dec;
use tempfile::tempdir;

use veterinaria_core::models::{PetInput, ProductInput, ProductType, Sex};
use veterinaria_core::{
    open_database, Clinic, ClinicConfig, ClinicError, Database, FfiAppointmentFilter,
    FfiAppointmentInput, FieldErrorCode,
};

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clinic.db");
    let config = ClinicConfig::default();

    let (pet_id, dog_id) = {
        let db = Database::open(&path).unwrap();
        let clinic = Clinic::new(&db, &config);

        let dog = clinic.create_animal_type("Perro", "Canino doméstico").unwrap();
        let pet = clinic
            .register_pet(&PetInput {
                animal_type_id: dog.id.clone(),
                name: "Canela".into(),
                sex: Some(Sex::Female),
                owner_name: "Rosa Fuentes".into(),
                weight_kg: Some(dec!(12.75)),
                microchip: "985141000123456".into(),
                ..Default::default()
            })
            .unwrap()
            .record;

        let category = clinic.create_category("Antiparasitarios", "Control de pulgas").unwrap();
        clinic
            .create_product(&ProductInput {
                category_id: category.id,
                name: "Bravecto 10-20kg".into(),
                description: "Comprimido masticable contra pulgas y garrapatas".into(),
                product_type: Some(ProductType::Medication),
                price: Some(dec!(32990)),
                code: "BRV-1020".into(),
                stock: Some(4),
                active_ingredient: "Fluralaner".into(),
                concentration: "500mg".into(),
                laboratory: "MSD".into(),
                ..Default::default()
            })
            .unwrap();

        (pet.id, dog.id)
    };

    let db = Database::open(&path).unwrap();
    let clinic = Clinic::new(&db, &config);

    let pet = db.get_pet(&pet_id).unwrap().unwrap();
    assert_eq!(pet.weight_kg, Some(dec!(12.75)));
    assert_eq!(pet.microchip.as_deref(), Some("985141000123456"));

    let found = clinic.search_products("bravecto", None, 10).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].is_low_stock());

    // The chip is still taken after reopening
    let result = clinic.register_pet(&PetInput {
        animal_type_id: dog_id,
        name: "Otra".into(),
        sex: Some(Sex::Female),
        owner_name: "Rosa Fuentes".into(),
        microchip: "985141000123456".into(),
        ..Default::default()
    });
    match result {
        Err(ClinicError::Invalid(report)) => {
            assert!(report.has_error("microchip", FieldErrorCode::Duplicate))
        }
        other => panic!("expected duplicate microchip, got {:?}", other),
    }
}

#[test]
fn test_ffi_schedule_and_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ffi.db");
    let core = open_database(path.to_string_lossy().into_owned()).unwrap();

    let cat = core
        .create_animal_type("Gato".into(), "Felino doméstico".into())
        .unwrap();
    let pet = core
        .register_pet(veterinaria_core::FfiPetInput {
            id: None,
            animal_type_id: cat.id,
            name: "Misha".into(),
            breed: "Siamés".into(),
            age: Some(4),
            sex: "female".into(),
            size: "small".into(),
            weight_kg: "3.8".into(),
            color: String::new(),
            owner_name: "Pedro Lagos".into(),
            owner_phone: "+56 9 8765 4321".into(),
            owner_email: String::new(),
            owner_address: String::new(),
            microchip: String::new(),
            observations: String::new(),
            attending_veterinarian_id: String::new(),
        })
        .unwrap();
    assert!(pet.accepted, "{:?}", pet.errors);
    let pet_id = pet.id.unwrap();

    // Next open weekday, a week out, 10:00 UTC
    let mut day = Utc::now().date_naive() + Duration::days(7);
    while day.weekday() == Weekday::Sun {
        day += Duration::days(1);
    }
    let at = day
        .and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        .and_utc();

    let input = FfiAppointmentInput {
        id: None,
        pet_id: pet_id.clone(),
        scheduled_at: at.to_rfc3339(),
        kind: "vaccination".into(),
        status: "confirmed".into(),
        reason: "Vacuna triple felina anual".into(),
        observations: String::new(),
        veterinarian: String::new(),
        estimated_price: "15000".into(),
    };
    let booked = core.schedule_appointment(input.clone()).unwrap();
    assert!(booked.accepted, "{:?}", booked.errors);

    let clash = core
        .schedule_appointment(FfiAppointmentInput {
            scheduled_at: (at + Duration::minutes(10)).to_rfc3339(),
            ..input.clone()
        })
        .unwrap();
    assert!(!clash.accepted);
    assert_eq!(clash.errors[0].field, None);
    assert_eq!(clash.errors[0].code, "scheduling_conflict");

    let bad_time = core
        .schedule_appointment(FfiAppointmentInput {
            scheduled_at: "mañana a las diez".into(),
            ..input
        })
        .unwrap();
    assert_eq!(bad_time.errors[0].field.as_deref(), Some("scheduled_at"));
    assert_eq!(bad_time.errors[0].code, "invalid_format");

    let listed = core
        .list_appointments(FfiAppointmentFilter {
            text: Some("misha".into()),
            status: Some("confirmed".into()),
            date: Some(day.format("%Y-%m-%d").to_string()),
        })
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].pet_id, pet_id);
    assert!(listed[0].is_modifiable);
}
