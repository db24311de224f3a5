//! Filters that clean untrusted payload values before they become domain types

use super::validators::positive_quantity;
use crate::core::order::SupplyItem;
use serde_json::Value;

/// Filter: keep only well-formed supply items, with trimmed names
///
/// A missing or non-array list is treated as empty. Malformed entries are
/// dropped without an error.
pub fn supply_items(value: Option<&Value>) -> Vec<SupplyItem> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries.iter().filter_map(supply_item).collect()
}

/// Filter: one supply item, or `None` if it is not usable
pub fn supply_item(value: &Value) -> Option<SupplyItem> {
    let name = value.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let quantity = positive_quantity(value.get("quantity")?)?;

    Some(SupplyItem {
        name: name.to_string(),
        quantity,
    })
}

/// Filter: trimmed text, with blank or non-text values treated as absent
pub fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
