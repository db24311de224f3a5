//! HTML email rendering with tera
//!
//! Templates are compiled into the binary and registered under `.html` names,
//! so tera escapes every interpolated value. Names, store labels, item names
//! and notes typed into the form can never inject markup into the email.
//!
//! Rendering is a pure function of its arguments: the submission time is
//! passed in rather than read from the clock.

use crate::core::OrderSubmission;
use chrono::{DateTime, Local};
use tera::{Context, Tera};

const ORDER_TEMPLATE: &str = "order.html";
const DIAGNOSTIC_TEMPLATE: &str = "diagnostic.html";

/// Default organization shown in email headers
pub const DEFAULT_ORGANIZATION: &str = "Metro by T-Mobile";
const SYSTEM_NAME: &str = "Supply Order System";

/// Subject line of the diagnostic email
pub const DIAGNOSTIC_SUBJECT: &str = "Test Email - Supply Order System";

/// Transport details shown in the diagnostic email
#[derive(Debug, Clone, Default)]
pub struct DiagnosticDetails {
    pub server: String,
    pub recipient: String,
}

/// Renders order and diagnostic emails
pub struct TemplateRenderer {
    tera: Tera,
    organization: String,
}

impl TemplateRenderer {
    /// Compile the built-in templates
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_templates(vec![
            (ORDER_TEMPLATE, include_str!("templates/order.html")),
            (DIAGNOSTIC_TEMPLATE, include_str!("templates/diagnostic.html")),
        ])?;

        Ok(Self {
            tera,
            organization: DEFAULT_ORGANIZATION.to_string(),
        })
    }

    /// Set the organization named in the header and footer
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Render the email body for a submission
    pub fn render(
        &self,
        submission: &OrderSubmission,
        submitted_at: DateTime<Local>,
    ) -> Result<String, tera::Error> {
        let mut context = self.base_context();
        context.insert("employee_name", submission.employee_name());
        context.insert("store", submission.store());
        context.insert(
            "order_date",
            &submission.order_date().format("%B %-d, %Y").to_string(),
        );
        context.insert("office_supplies", submission.office_supplies());
        context.insert("cleaning_supplies", submission.cleaning_supplies());
        context.insert("additional_notes", submission.additional_notes());
        context.insert("submitted_at", &format_timestamp(submitted_at));

        self.tera.render(ORDER_TEMPLATE, &context)
    }

    /// Render the fixed-content diagnostic email
    pub fn render_diagnostic(
        &self,
        details: &DiagnosticDetails,
        sent_at: DateTime<Local>,
    ) -> Result<String, tera::Error> {
        let mut context = self.base_context();
        context.insert("server", &details.server);
        context.insert("recipient", &details.recipient);
        context.insert("sent_at", &format_timestamp(sent_at));

        self.tera.render(DIAGNOSTIC_TEMPLATE, &context)
    }

    /// Subject line for a submission's email
    pub fn subject_for(submission: &OrderSubmission) -> String {
        format!(
            "Supply Order - {} Store ({})",
            submission.store(),
            submission.employee_name()
        )
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("organization", &self.organization);
        context.insert("system_name", SYSTEM_NAME);
        context
    }
}

fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%B %-d, %Y at %-I:%M %p").to_string()
}
