use serde::Deserialize;
use serde_json::Value;

use crate::config::{Config, SHOPIFY_API_VERSION};
use crate::errors::AppError;
use crate::models::{is_truthy, CustomerCreationRequest};

/// Fallback message when Shopify declines without an `errors` value.
pub const GENERIC_REJECTION: &str = "Failed to create customer";

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Outcome of a customer creation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateCustomerOutcome {
    /// Shopify created the customer and assigned this id.
    Created { id: u64 },
    /// Shopify answered with JSON but did not create a customer.
    UpstreamRejected {
        /// The `errors` value of the response, when it had a usable one.
        details: Option<Value>,
    },
    /// The exchange itself failed: send error, unreadable or malformed response.
    TransportFault { cause: String },
}

impl CreateCustomerOutcome {
    /// Caller-facing message for a rejection: the `errors` value as compact
    /// JSON (key order preserved), or a generic fallback.
    pub fn rejection_message(details: Option<&Value>) -> String {
        details
            .and_then(|errors| serde_json::to_string(errors).ok())
            .unwrap_or_else(|| GENERIC_REJECTION.to_string())
    }

    /// Maps the outcome onto the handler's result type.
    pub fn into_result(self) -> Result<u64, AppError> {
        match self {
            CreateCustomerOutcome::Created { id } => Ok(id),
            CreateCustomerOutcome::UpstreamRejected { details } => Err(
                AppError::UpstreamRejected(Self::rejection_message(details.as_ref())),
            ),
            CreateCustomerOutcome::TransportFault { cause } => Err(AppError::ServerError(cause)),
        }
    }
}

/// Top-level shape of a `customers.json` response.
#[derive(Debug, Default, Deserialize)]
struct CustomersResponse {
    #[serde(default)]
    customer: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

/// Client for the Shopify Admin REST API customer endpoint.
#[derive(Clone)]
pub struct ShopifyClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl ShopifyClient {
    /// Creates a new `ShopifyClient`.
    ///
    /// No client-side timeout is configured; a hung upstream surfaces as a
    /// transport fault once the platform aborts the connection.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ServerError(format!("Failed to create Shopify client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.shopify_base_url(),
            access_token: config.shopify_access_token.clone(),
        })
    }

    /// `{base}/admin/api/{version}/customers.json`
    pub fn customers_endpoint(&self) -> String {
        format!(
            "{}/admin/api/{}/customers.json",
            self.base_url, SHOPIFY_API_VERSION
        )
    }

    /// Creates a customer in Shopify.
    ///
    /// Exactly one request is sent; nothing is retried.
    ///
    /// # Arguments
    ///
    /// * `request` - The customer creation payload.
    ///
    /// # Returns
    ///
    /// * `CreateCustomerOutcome` - Created, rejected by Shopify, or failed in transit.
    pub async fn create_customer(
        &self,
        request: &CustomerCreationRequest,
    ) -> CreateCustomerOutcome {
        let url = self.customers_endpoint();
        tracing::info!("Creating wholesale customer in Shopify: {}", url);

        let response = match self
            .client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Shopify request failed: {}", e);
                return CreateCustomerOutcome::TransportFault {
                    cause: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to read Shopify response ({}): {}", status, e);
                return CreateCustomerOutcome::TransportFault {
                    cause: e.to_string(),
                };
            }
        };

        let parsed: CustomersResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Shopify returned non-JSON response {}: {}", status, body);
                return CreateCustomerOutcome::TransportFault {
                    cause: e.to_string(),
                };
            }
        };

        match parsed.customer {
            Some(customer) if status.is_success() && is_truthy(&customer) => {
                match customer.get("id").and_then(Value::as_u64) {
                    Some(id) => {
                        tracing::info!("✅ Customer created in Shopify: {}", id);
                        CreateCustomerOutcome::Created { id }
                    }
                    None => {
                        tracing::error!("Unexpected Shopify customer record: {}", customer);
                        CreateCustomerOutcome::TransportFault {
                            cause: "Shopify customer record is missing an id".to_string(),
                        }
                    }
                }
            }
            _ => {
                tracing::error!("Shopify API error {}: {}", status, body);
                CreateCustomerOutcome::UpstreamRejected {
                    details: parsed.errors.filter(is_truthy),
                }
            }
        }
    }
}
