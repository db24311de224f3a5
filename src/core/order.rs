//! Order domain types
//!
//! [`OrderSubmission`] values only come out of
//! [`validate_order`](crate::core::validation::validate_order); there is no
//! public constructor and no setter, so a submission that reaches the
//! renderer or the store has already passed every rule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One requested supply line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplyItem {
    pub name: String,
    pub quantity: u32,
}

/// A validated and sanitized order request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    employee_name: String,
    store: String,
    order_date: NaiveDate,
    office_supplies: Vec<SupplyItem>,
    cleaning_supplies: Vec<SupplyItem>,
    additional_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
}

impl OrderSubmission {
    pub(crate) fn new(
        employee_name: String,
        store: String,
        order_date: NaiveDate,
        office_supplies: Vec<SupplyItem>,
        cleaning_supplies: Vec<SupplyItem>,
        additional_notes: String,
        request_id: Option<String>,
    ) -> Self {
        Self {
            employee_name,
            store,
            order_date,
            office_supplies,
            cleaning_supplies,
            additional_notes,
            request_id,
        }
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn order_date(&self) -> NaiveDate {
        self.order_date
    }

    pub fn office_supplies(&self) -> &[SupplyItem] {
        &self.office_supplies
    }

    pub fn cleaning_supplies(&self) -> &[SupplyItem] {
        &self.cleaning_supplies
    }

    /// Notes, trimmed; empty when none were given
    pub fn additional_notes(&self) -> &str {
        &self.additional_notes
    }

    /// Client-generated id used to de-duplicate resubmissions
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn has_notes(&self) -> bool {
        !self.additional_notes.is_empty()
    }

    /// Number of supply lines across both lists
    pub fn item_count(&self) -> usize {
        self.office_supplies.len() + self.cleaning_supplies.len()
    }
}

/// Fulfilment status of a stored order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Ordered,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Ordered => "ordered",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "ordered" => Ok(OrderStatus::Ordered),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// One entry of an order's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub updated_by: String,
}

/// The stored copy of an acknowledged submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub submission: OrderSubmission,
    pub status: OrderStatus,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status_history: Vec<StatusChange>,
}

impl OrderRecord {
    /// A new pending record for a submission whose email went out
    pub fn sent(submission: OrderSubmission, message_id: String, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission,
            status: OrderStatus::Pending,
            email_sent: true,
            message_id: Some(message_id),
            submitted_at,
            status_history: vec![StatusChange {
                status: OrderStatus::Pending,
                timestamp: submitted_at,
                updated_by: "system".to_string(),
            }],
        }
    }

    /// Move to `status`, recording who changed it
    pub fn transition(&mut self, status: OrderStatus, updated_by: &str, at: DateTime<Utc>) {
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            timestamp: at,
            updated_by: updated_by.to_string(),
        });
    }
}
