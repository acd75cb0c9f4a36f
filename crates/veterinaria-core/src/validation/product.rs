//! Product record validation, including the medication field rule.

use tracing::debug;

use super::{
    non_blank, validate_active_ingredient, validate_description, validate_product_code_format,
    validate_product_name, validate_product_price, validate_stock, FieldErrorCode, RecordResult,
    ValidationContext, ValidationError, ValidationReport,
};
use crate::models::{Product, ProductInput};

/// Validate a product submission. A submission with an `id` is an update of that product.
pub fn validate_product(
    input: &ProductInput,
    ctx: &ValidationContext<'_>,
) -> RecordResult<Product> {
    let mut report = ValidationReport::default();
    let exclude_id = input.id.as_deref();

    let category_id = match non_blank(&input.category_id) {
        None => {
            report.field_error("category", FieldErrorCode::Required, "The category is required");
            None
        }
        Some(id) if ctx.lookup.category_is_active(id)? => Some(id.to_string()),
        Some(_) => {
            report.field_error(
                "category",
                FieldErrorCode::UnknownReference,
                "Select an active category",
            );
            None
        }
    };

    let name = report.check("name", validate_product_name(&input.name));
    let description = non_blank(&input.description)
        .and_then(|text| report.check("description", validate_description(text)));

    let product_type = input.product_type;
    if product_type.is_none() {
        report.field_error(
            "product_type",
            FieldErrorCode::Required,
            "The product type is required",
        );
    }

    let price = match input.price {
        Some(price) => report.check("price", validate_product_price(price)),
        None => {
            report.field_error("price", FieldErrorCode::Required, "The price is required");
            None
        }
    };

    let code = match report.check("code", validate_product_code_format(&input.code)) {
        Some(code) if ctx.lookup.product_code_taken(&code, exclude_id)? => {
            report.push(ValidationError::Uniqueness {
                field: "code",
                value: code,
            });
            None
        }
        code => code,
    };

    let stock = report.check("stock", validate_stock(input.stock.unwrap_or(0)));

    // The ingredient minimum applies whenever the field is filled in
    let active_ingredient = non_blank(&input.active_ingredient)
        .and_then(|text| report.check("active_ingredient", validate_active_ingredient(text)));
    let concentration = non_blank(&input.concentration).map(str::to_string);
    let laboratory = non_blank(&input.laboratory).map(str::to_string);

    if product_type.is_some_and(|t| t.is_medication()) {
        let required = [
            ("active_ingredient", non_blank(&input.active_ingredient), "active ingredient"),
            ("concentration", concentration.as_deref(), "concentration"),
            ("laboratory", laboratory.as_deref(), "laboratory"),
        ];
        for (field, value, label) in required {
            if value.is_none() {
                report.push(ValidationError::CrossField {
                    field: Some(field),
                    code: FieldErrorCode::Required,
                    message: format!("The {} is required for medications", label),
                });
            }
        }
    }

    let (Some(category_id), Some(name), Some(product_type), Some(price), Some(code), Some(stock)) =
        (category_id, name, product_type, price, code, stock)
    else {
        debug!(errors = report.errors.len(), "Rejected product submission");
        return report.reject();
    };
    if !report.is_valid() {
        debug!(errors = report.errors.len(), "Rejected product submission");
        return report.reject();
    }

    let mut product = Product::new(category_id, name, product_type, code, price);
    if let Some(id) = &input.id {
        product.id = id.clone();
    }
    product.description = description;
    product.stock = stock;
    product.active_ingredient = active_ingredient;
    product.concentration = concentration;
    product.laboratory = laboratory;

    report.finish(product)
}
