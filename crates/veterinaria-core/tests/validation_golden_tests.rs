//! Golden tests for the field validators.
//!
//! Each case pins the normalized value a validator accepts, or the reason
//! code it rejects with.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use veterinaria_core::models::SpeciesKind;
use veterinaria_core::validation::*;

/// Text field case.
struct GoldenCase {
    id: &'static str,
    validator: fn(&str) -> FieldResult<String>,
    input: &'static str,
    expected: Result<&'static str, FieldErrorCode>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "pet-name-trimmed",
            validator: validate_pet_name,
            input: "  Michi  ",
            expected: Ok("Michi"),
        },
        GoldenCase {
            id: "pet-name-empty",
            validator: validate_pet_name,
            input: "   ",
            expected: Err(FieldErrorCode::Required),
        },
        GoldenCase {
            id: "pet-name-single-letter",
            validator: validate_pet_name,
            input: "M",
            expected: Err(FieldErrorCode::TooShort),
        },
        GoldenCase {
            id: "pet-name-digits",
            validator: validate_pet_name,
            input: "Rex2",
            expected: Err(FieldErrorCode::InvalidCharacters),
        },
        GoldenCase {
            id: "owner-name-accents-apostrophe",
            validator: validate_owner_name,
            input: "José O'Higgins",
            expected: Ok("José O'Higgins"),
        },
        GoldenCase {
            id: "owner-name-short",
            validator: validate_owner_name,
            input: "Al",
            expected: Err(FieldErrorCode::TooShort),
        },
        GoldenCase {
            id: "vet-name-title",
            validator: validate_vet_name,
            input: "Dr. Juan Soto",
            expected: Ok("Dr. Juan Soto"),
        },
        GoldenCase {
            id: "phone-international",
            validator: validate_phone,
            input: "+56 9 1234 5678",
            expected: Ok("+56 9 1234 5678"),
        },
        GoldenCase {
            id: "phone-area-code",
            validator: validate_phone,
            input: "(2) 2345-6789",
            expected: Ok("(2) 2345-6789"),
        },
        GoldenCase {
            id: "phone-letters-dropped",
            validator: validate_phone,
            input: "555-1234 ext",
            expected: Ok("555-1234"),
        },
        GoldenCase {
            id: "phone-too-short",
            validator: validate_phone,
            input: "12-34",
            expected: Err(FieldErrorCode::InvalidFormat),
        },
        GoldenCase {
            id: "phone-few-digits",
            validator: validate_phone,
            input: "(12) 3-4 5",
            expected: Err(FieldErrorCode::TooFewDigits),
        },
        GoldenCase {
            id: "phone-many-digits",
            validator: validate_phone,
            input: "1234567890123456",
            expected: Err(FieldErrorCode::TooManyDigits),
        },
        GoldenCase {
            id: "email-lowercased",
            validator: validate_email,
            input: " Ana@Correo.CL ",
            expected: Ok("ana@correo.cl"),
        },
        GoldenCase {
            id: "email-no-tld",
            validator: validate_email,
            input: "ana@correo",
            expected: Err(FieldErrorCode::InvalidFormat),
        },
        GoldenCase {
            id: "microchip-normalized",
            validator: validate_microchip_format,
            input: " 985abc0012345 ",
            expected: Ok("985ABC0012345"),
        },
        GoldenCase {
            id: "microchip-short",
            validator: validate_microchip_format,
            input: "12345",
            expected: Err(FieldErrorCode::InvalidFormat),
        },
        GoldenCase {
            id: "microchip-not-hex",
            validator: validate_microchip_format,
            input: "GHIJKL123456",
            expected: Err(FieldErrorCode::InvalidFormat),
        },
        GoldenCase {
            id: "code-normalized",
            validator: validate_product_code_format,
            input: " rim-100 ",
            expected: Ok("RIM-100"),
        },
        GoldenCase {
            id: "code-empty",
            validator: validate_product_code_format,
            input: "",
            expected: Err(FieldErrorCode::Required),
        },
        GoldenCase {
            id: "code-with-space",
            validator: validate_product_code_format,
            input: "COD 1",
            expected: Err(FieldErrorCode::InvalidFormat),
        },
        GoldenCase {
            id: "product-name-plain",
            validator: validate_product_name,
            input: "Rimadyl 100mg",
            expected: Ok("Rimadyl 100mg"),
        },
        GoldenCase {
            id: "product-name-numeric",
            validator: validate_product_name,
            input: "12345",
            expected: Err(FieldErrorCode::NumericOnly),
        },
        GoldenCase {
            id: "product-name-symbols",
            validator: validate_product_name,
            input: "Collar!!! @#",
            expected: Err(FieldErrorCode::TooManySpecialCharacters),
        },
        GoldenCase {
            id: "description-short",
            validator: validate_description,
            input: "Corto",
            expected: Err(FieldErrorCode::TooShort),
        },
        GoldenCase {
            id: "reason-ok",
            validator: validate_reason,
            input: "Vacuna antirrábica anual",
            expected: Ok("Vacuna antirrábica anual"),
        },
        GoldenCase {
            id: "ingredient-short",
            validator: validate_active_ingredient,
            input: "Zn",
            expected: Err(FieldErrorCode::TooShort),
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let actual = (case.validator)(case.input);

        match (&actual, case.expected) {
            (Ok(value), Ok(expected)) => {
                assert_eq!(value, expected, "Case {}: value mismatch", case.id)
            }
            (Err(error), Err(expected)) => {
                assert_eq!(error.code, expected, "Case {}: code mismatch", case.id)
            }
            _ => panic!(
                "Case {}: expected {:?}, got {:?}",
                case.id, case.expected, actual
            ),
        }
    }
}

#[test]
fn test_species_weight_limits() {
    let cases: Vec<(Decimal, SpeciesKind, Option<FieldErrorCode>)> = vec![
        (dec!(4.5), SpeciesKind::Cat, None),
        (dec!(15), SpeciesKind::Cat, None),
        (dec!(16), SpeciesKind::Cat, Some(FieldErrorCode::SpeciesLimit)),
        (dec!(150), SpeciesKind::Dog, Some(FieldErrorCode::SpeciesLimit)),
        (dec!(5), SpeciesKind::Bird, None),
        (dec!(5.1), SpeciesKind::Bird, Some(FieldErrorCode::SpeciesLimit)),
        (dec!(150), SpeciesKind::Other, None),
        (dec!(250), SpeciesKind::Other, Some(FieldErrorCode::TooHigh)),
        (dec!(0), SpeciesKind::Dog, Some(FieldErrorCode::NotPositive)),
        (dec!(-3), SpeciesKind::Other, Some(FieldErrorCode::NotPositive)),
        (dec!(4.25), SpeciesKind::Cat, None),
        (dec!(4.250), SpeciesKind::Cat, None),
        (dec!(4.123456789), SpeciesKind::Cat, Some(FieldErrorCode::InvalidFormat)),
        (dec!(0.005), SpeciesKind::Bird, Some(FieldErrorCode::InvalidFormat)),
    ];

    for (weight, species, expected) in cases {
        let actual = validate_weight(weight, species).err().map(|e| e.code);
        assert_eq!(actual, expected, "{} kg {:?}", weight, species);
    }
}

#[test]
fn test_species_age_limits() {
    let cases: Vec<(i64, SpeciesKind, Option<FieldErrorCode>)> = vec![
        (0, SpeciesKind::Dog, None),
        (24, SpeciesKind::Cat, None),
        (26, SpeciesKind::Cat, Some(FieldErrorCode::SpeciesLimit)),
        (21, SpeciesKind::Dog, Some(FieldErrorCode::SpeciesLimit)),
        (40, SpeciesKind::Bird, None),
        (60, SpeciesKind::Bird, Some(FieldErrorCode::TooHigh)),
        (-1, SpeciesKind::Other, Some(FieldErrorCode::Negative)),
    ];

    for (age, species, expected) in cases {
        let actual = validate_age(age, species).err().map(|e| e.code);
        assert_eq!(actual, expected, "{} years {:?}", age, species);
    }
}

#[test]
fn test_price_and_stock_bounds() {
    assert_eq!(validate_product_price(dec!(25990)).unwrap(), dec!(25990));
    assert_eq!(
        validate_product_price(dec!(0)).unwrap_err().code,
        FieldErrorCode::NotPositive
    );
    assert_eq!(
        validate_product_price(dec!(10000000.01)).unwrap_err().code,
        FieldErrorCode::TooHigh
    );
    assert_eq!(
        validate_estimated_price(dec!(1000001)).unwrap_err().code,
        FieldErrorCode::TooHigh
    );
    assert_eq!(validate_product_price(dec!(4990.50)).unwrap(), dec!(4990.50));
    assert_eq!(
        validate_product_price(dec!(4990.505)).unwrap_err().code,
        FieldErrorCode::InvalidFormat
    );
    assert_eq!(
        validate_estimated_price(dec!(15000.999)).unwrap_err().code,
        FieldErrorCode::InvalidFormat
    );

    assert_eq!(validate_stock(0).unwrap(), 0);
    assert_eq!(validate_stock(-1).unwrap_err().code, FieldErrorCode::Negative);
    assert_eq!(validate_stock(100_001).unwrap_err().code, FieldErrorCode::TooHigh);
}
