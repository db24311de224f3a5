//! Field rules for order submissions
//!
//! Each rule reads one field of the raw JSON payload and either returns the
//! sanitized value or the message shown to the employee.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const EMPLOYEE_NAME_REQUIRED: &str = "Employee name is required and must be a non-empty string";
pub const STORE_REQUIRED: &str = "Store selection is required";
pub const ORDER_DATE_REQUIRED: &str = "Order date is required";
pub const ORDER_DATE_FORMAT: &str = "Order date must be in YYYY-MM-DD format";
pub const ORDER_DATE_PAST: &str = "Order date cannot be in the past";
pub const SUPPLY_ITEM_REQUIRED: &str =
    "At least one valid supply item with name and quantity is required";
pub const NOTES_NOT_TEXT: &str = "Additional notes must be a string";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Rule: field is text with something left after trimming
pub fn required_text(value: Option<&Value>, message: &str) -> Result<String, String> {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(message.to_string()),
    }
}

/// Rule: order date is a strict `YYYY-MM-DD` calendar date no earlier than `today`
pub fn order_date(value: Option<&Value>, today: NaiveDate) -> Result<NaiveDate, String> {
    let Some(raw) = value.and_then(Value::as_str) else {
        return Err(ORDER_DATE_REQUIRED.to_string());
    };
    if raw.is_empty() {
        return Err(ORDER_DATE_REQUIRED.to_string());
    }

    if !DATE_PATTERN.is_match(raw) {
        return Err(ORDER_DATE_FORMAT.to_string());
    }

    // The pattern admits 2026-02-30; chrono does not.
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ORDER_DATE_FORMAT.to_string())?;

    if date < today {
        Err(ORDER_DATE_PAST.to_string())
    } else {
        Ok(date)
    }
}

/// Rule: notes are absent, null or text
pub fn optional_text(value: Option<&Value>, message: &str) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(_) => Err(message.to_string()),
    }
}

/// A positive whole quantity that fits in `u32`
///
/// `5.0` counts as the integer five; `2.5`, `"3"`, `0` and negatives do not.
pub fn positive_quantity(value: &Value) -> Option<u32> {
    let Value::Number(number) = value else {
        return None;
    };
    let whole = match number.as_u64() {
        Some(n) => n,
        None => {
            let float = number.as_f64()?;
            if float.fract() != 0.0 || float <= 0.0 || float > f64::from(u32::MAX) {
                return None;
            }
            float as u64
        }
    };

    u32::try_from(whole).ok().filter(|n| *n > 0)
}
