//! Validation and filtering of order submissions
//!
//! [`validate_order`] turns an untrusted JSON payload into an
//! [`OrderSubmission`]. Every rule is checked and every failure is reported
//! together; nothing is returned unless all rules pass. The caller's payload
//! is only read, the sanitized submission is a new value.

pub mod extractor;
pub mod filters;
pub mod validators;

pub use extractor::JsonPayload;

use crate::core::error::ValidationError;
use crate::core::order::OrderSubmission;
use chrono::NaiveDate;
use serde_json::Value;
use validators::{
    EMPLOYEE_NAME_REQUIRED, NOTES_NOT_TEXT, STORE_REQUIRED, SUPPLY_ITEM_REQUIRED,
};

/// Validate and sanitize a raw submission against the calendar day `today`
///
/// Store names are not checked against a list of known stores; any
/// non-empty text is accepted.
pub fn validate_order(payload: &Value, today: NaiveDate) -> Result<OrderSubmission, ValidationError> {
    let mut errors = Vec::new();

    let employee_name = validators::required_text(payload.get("employeeName"), EMPLOYEE_NAME_REQUIRED)
        .map_err(|e| errors.push(e))
        .ok();
    let store = validators::required_text(payload.get("store"), STORE_REQUIRED)
        .map_err(|e| errors.push(e))
        .ok();
    let order_date = validators::order_date(payload.get("orderDate"), today)
        .map_err(|e| errors.push(e))
        .ok();

    let office_supplies = filters::supply_items(payload.get("officeSupplies"));
    let cleaning_supplies = filters::supply_items(payload.get("cleaningSupplies"));
    if office_supplies.is_empty() && cleaning_supplies.is_empty() {
        errors.push(SUPPLY_ITEM_REQUIRED.to_string());
    }

    let additional_notes = validators::optional_text(payload.get("additionalNotes"), NOTES_NOT_TEXT)
        .map_err(|e| errors.push(e))
        .ok();

    let request_id = filters::non_blank(payload.get("requestId"));

    match (employee_name, store, order_date, additional_notes) {
        (Some(employee_name), Some(store), Some(order_date), Some(additional_notes))
            if errors.is_empty() =>
        {
            Ok(OrderSubmission::new(
                employee_name,
                store,
                order_date,
                office_supplies,
                cleaning_supplies,
                additional_notes,
                request_id,
            ))
        }
        _ => Err(ValidationError::new(errors)),
    }
}
