//! Free-text note attached to the Shopify customer.
//!
//! Staff review wholesale applications from the customer page in the Shopify
//! admin, so everything the form collected that has no dedicated customer
//! field ends up here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::models::WholesaleApplication;

/// Status line every new application starts with.
pub const PENDING_REVIEW: &str = "PENDING REVIEW";

/// `10/19/2026, 3:04:05 PM`
const SUBMITTED_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApplicationNote(String);

impl ApplicationNote {
    /// Renders the review note for an application submitted at `submitted_at`.
    ///
    /// Address line 2, the additional information block and the comments
    /// block are only written when they have content.
    pub fn build(application: &WholesaleApplication, submitted_at: DateTime<Utc>) -> Self {
        let mut note = String::from("===== WHOLESALE APPLICATION =====\n\n");

        note.push_str("--- CONTACT INFORMATION ---\n");
        note.push_str(&format!("Phone: {}\n\n", application.phone));

        note.push_str("--- BUSINESS INFORMATION ---\n");
        note.push_str(&format!("Company Name: {}\n", application.company));
        note.push_str(&format!("Business Type: {}\n", application.business_type));
        note.push_str(&format!("Tax ID/License: {}\n\n", application.tax_id));

        note.push_str("--- BUSINESS ADDRESS ---\n");
        note.push_str(&format!("{}\n", application.address1));
        if let Some(address2) = &application.address2 {
            note.push_str(&format!("{}\n", address2));
        }
        note.push_str(&format!(
            "{}, {} {}\n",
            application.city, application.province, application.zip
        ));
        note.push_str(&format!("{}\n\n", application.country));

        if application.website.is_some()
            || application.monthly_volume.is_some()
            || application.referral_source.is_some()
        {
            note.push_str("--- ADDITIONAL INFORMATION ---\n");
            if let Some(website) = &application.website {
                note.push_str(&format!("Website: {}\n", website));
            }
            if let Some(volume) = &application.monthly_volume {
                note.push_str(&format!("Est. Monthly Volume: {}\n", volume));
            }
            if let Some(source) = &application.referral_source {
                note.push_str(&format!("Referral Source: {}\n", source));
            }
            note.push('\n');
        }

        if let Some(comments) = &application.comments {
            note.push_str("--- COMMENTS ---\n");
            note.push_str(&format!("{}\n\n", comments));
        }

        note.push_str("--- APPLICATION STATUS ---\n");
        note.push_str(&format!(
            "Submitted: {}\n",
            submitted_at.format(SUBMITTED_FORMAT)
        ));
        note.push_str(&format!("Status: {}\n", PENDING_REVIEW));

        Self(note)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
