use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::note::ApplicationNote;

/// Tag applied to every customer created from the signup form.
pub const WHOLESALE_TAG: &str = "wholesale";

/// Opt-in level reported with the marketing consent record.
pub const OPT_IN_LEVEL: &str = "single_opt_in";

/// Message returned to the form on success.
pub const SUCCESS_MESSAGE: &str = "Wholesale application submitted successfully";

// ============================================================================
// Inbound form
// ============================================================================

/// Raw wholesale signup form as posted by the storefront.
///
/// Every field is optional at this stage; [`FormSubmission::validate`] decides
/// what is required. Scalars are accepted as text so that e.g. a numeric `zip`
/// does not fail the whole submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_type: Option<String>,
    #[serde(rename = "taxID", default, deserialize_with = "lenient_text")]
    pub tax_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address1: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address2: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub monthly_volume: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral_source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "truthy_flag")]
    pub accepts_marketing: bool,
}

/// A form that passed presence checks.
#[derive(Debug, Clone, PartialEq)]
pub struct WholesaleApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub business_type: String,
    pub tax_id: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub country: String,
    pub website: Option<String>,
    pub monthly_volume: Option<String>,
    pub referral_source: Option<String>,
    pub comments: Option<String>,
    pub accepts_marketing: bool,
}

impl FormSubmission {
    /// Checks required fields and normalizes optional ones.
    ///
    /// A required field that is absent, null or blank is reported by its form
    /// key, in declaration order. Optional fields that are empty become `None`.
    pub fn validate(self) -> Result<WholesaleApplication, AppError> {
        let mut missing = Vec::new();
        let mut required = |value: Option<String>, key: &'static str| match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let application = WholesaleApplication {
            first_name: required(self.first_name, "firstName"),
            last_name: required(self.last_name, "lastName"),
            email: required(self.email, "email"),
            phone: required(self.phone, "phone"),
            company: required(self.company, "company"),
            business_type: required(self.business_type, "businessType"),
            tax_id: required(self.tax_id, "taxID"),
            address1: required(self.address1, "address1"),
            address2: present(self.address2),
            city: required(self.city, "city"),
            province: required(self.province, "province"),
            zip: required(self.zip, "zip"),
            country: required(self.country, "country"),
            website: present(self.website),
            monthly_volume: present(self.monthly_volume),
            referral_source: present(self.referral_source),
            comments: present(self.comments),
            accepts_marketing: self.accepts_marketing,
        };

        if missing.is_empty() {
            Ok(application)
        } else {
            Err(AppError::MissingFields(missing))
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Loose truthiness of a JSON value: `null`, `false`, `0` and `""` are false,
/// everything else (including empty arrays and objects) is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_)) => Err(serde::de::Error::custom("expected text, found an array")),
        Some(Value::Object(_)) => Err(serde::de::Error::custom("expected text, found an object")),
    }
}

fn truthy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .is_some_and(is_truthy))
}

// ============================================================================
// Outbound Shopify payload
// ============================================================================

/// Body of `POST /admin/api/{version}/customers.json`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerCreationRequest {
    pub customer: NewCustomer,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tags: String,
    pub note: ApplicationNote,
    pub verified_email: bool,
    pub email_marketing_consent: EmailMarketingConsent,
    pub addresses: Vec<CustomerAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    Subscribed,
    NotSubscribed,
}

impl From<bool> for ConsentState {
    fn from(accepts_marketing: bool) -> Self {
        if accepts_marketing {
            ConsentState::Subscribed
        } else {
            ConsentState::NotSubscribed
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailMarketingConsent {
    pub state: ConsentState,
    pub opt_in_level: String,
    /// RFC 3339, UTC, millisecond precision.
    pub consent_updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerAddress {
    pub address1: String,
    /// Empty string when the form had no second line.
    pub address2: String,
    pub city: String,
    pub province: String,
    pub zip: String,
    pub country: String,
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl CustomerCreationRequest {
    /// Shapes a validated application into the Shopify customer payload.
    pub fn new(
        application: &WholesaleApplication,
        note: ApplicationNote,
        consent_updated_at: DateTime<Utc>,
    ) -> Self {
        let address = CustomerAddress {
            address1: application.address1.clone(),
            address2: application.address2.clone().unwrap_or_default(),
            city: application.city.clone(),
            province: application.province.clone(),
            zip: application.zip.clone(),
            country: application.country.clone(),
            company: application.company.clone(),
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
            phone: application.phone.clone(),
        };

        Self {
            customer: NewCustomer {
                first_name: application.first_name.clone(),
                last_name: application.last_name.clone(),
                email: application.email.clone(),
                phone: application.phone.clone(),
                tags: WHOLESALE_TAG.to_string(),
                note,
                verified_email: false,
                email_marketing_consent: EmailMarketingConsent {
                    state: application.accepts_marketing.into(),
                    opt_in_level: OPT_IN_LEVEL.to_string(),
                    consent_updated_at: consent_updated_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                },
                addresses: vec![address],
            },
        }
    }
}

// ============================================================================
// Response to the form
// ============================================================================

/// Uniform response body of the submission endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    pub message: String,
}

impl SubmissionResult {
    pub fn created(customer_id: u64) -> Self {
        Self {
            success: true,
            customer_id: Some(customer_id),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            customer_id: None,
            message: message.into(),
        }
    }
}
