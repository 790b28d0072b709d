/// Integration tests with a mocked Shopify Admin API
/// Drives the full router (method dispatch, CORS headers, form handling, upstream mapping)
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wholesale_signup_api::config::{Config, DEFAULT_MAX_BODY_BYTES, DEFAULT_SUBMISSION_PATH};
use wholesale_signup_api::handlers::AppState;
use wholesale_signup_api::routes::build_router;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CUSTOMERS_PATH: &str = "/admin/api/2024-10/customers.json";

/// Helper function to create test config
fn create_test_config(shopify_base_url: String) -> Config {
    Config {
        port: 3000,
        shopify_store: "test-store.myshopify.com".to_string(),
        shopify_access_token: "shpat_test_token".to_string(),
        shopify_base_url: Some(shopify_base_url),
        submission_path: DEFAULT_SUBMISSION_PATH.to_string(),
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    }
}

fn create_app(shopify_base_url: String) -> Router {
    create_app_with_config(create_test_config(shopify_base_url))
}

fn create_app_with_config(config: Config) -> Router {
    let state = AppState::new(config).unwrap();
    build_router(Arc::new(state))
}

fn wholesale_form() -> Value {
    json!({
        "firstName": "Jane",
        "lastName": "Doe",
        "email": "jane@boutique.example",
        "phone": "+1 503 555 0142",
        "company": "Jane's Boutique",
        "businessType": "Retail Store",
        "taxID": "93-1234567",
        "address1": "400 SW Main St",
        "address2": "Suite 12",
        "city": "Portland",
        "province": "OR",
        "zip": "97204",
        "country": "United States",
        "website": "https://boutique.example",
        "monthlyVolume": "$1,000 - $5,000",
        "referralSource": "Trade show",
        "comments": "Looking to stock the full line.",
        "acceptsMarketing": true
    })
}

async fn send(
    app: Router,
    method_name: &str,
    body: Option<String>,
) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder()
        .method(method_name)
        .uri(DEFAULT_SUBMISSION_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(app: Router, form: &Value) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, body) = send(app, "POST", Some(form.to_string())).await;
    (status, headers, serde_json::from_str(&body).unwrap())
}

fn assert_cors_headers(headers: &HeaderMap) {
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_preflight_returns_empty_ok() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, headers, body) = send(create_app(mock_server.uri()), "OPTIONS", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_other_methods_are_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    for method_name in ["GET", "PUT", "PATCH", "DELETE"] {
        let (status, headers, body) = send(create_app(mock_server.uri()), method_name, None).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method_name);
        assert_eq!(
            serde_json::from_str::<Value>(&body).unwrap(),
            json!({"success": false, "message": "Method not allowed"})
        );
        assert_cors_headers(&headers);
    }
}

#[tokio::test]
async fn test_successful_customer_creation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .and(header_eq("X-Shopify-Access-Token", "shpat_test_token"))
        .and(body_partial_json(json!({
            "customer": {
                "first_name": "Jane",
                "last_name": "Doe",
                "email": "jane@boutique.example",
                "tags": "wholesale",
                "verified_email": false,
                "email_marketing_consent": {
                    "state": "subscribed",
                    "opt_in_level": "single_opt_in"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customer": {"id": 123}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, headers, body) = post_form(create_app(mock_server.uri()), &wholesale_form()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "customerId": 123,
            "message": "Wholesale application submitted successfully"
        })
    );
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_outbound_payload_carries_note_and_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customer": {"id": 9}})))
        .mount(&mock_server)
        .await;

    let mut form = wholesale_form();
    form["acceptsMarketing"] = json!(false);
    post_form(create_app(mock_server.uri()), &form).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let payload: Value = requests[0].body_json().unwrap();
    let customer = &payload["customer"];

    let note = customer["note"].as_str().unwrap();
    assert!(note.starts_with("===== WHOLESALE APPLICATION =====\n"));
    assert!(note.contains("--- CONTACT INFORMATION ---\nPhone: +1 503 555 0142\n"));
    assert!(note.contains("--- BUSINESS INFORMATION ---\nCompany Name: Jane's Boutique\n"));
    assert!(note.contains("Tax ID/License: 93-1234567\n"));
    assert!(note.contains(
        "--- BUSINESS ADDRESS ---\n400 SW Main St\nSuite 12\nPortland, OR 97204\nUnited States\n"
    ));
    assert!(note.contains("Website: https://boutique.example\n"));
    assert!(note.contains("Est. Monthly Volume: $1,000 - $5,000\n"));
    assert!(note.contains("Referral Source: Trade show\n"));
    assert!(note.contains("--- COMMENTS ---\nLooking to stock the full line.\n"));
    assert!(note.ends_with("Status: PENDING REVIEW\n"));

    assert_eq!(customer["email_marketing_consent"]["state"], "not_subscribed");
    assert!(customer["email_marketing_consent"]["consent_updated_at"]
        .as_str()
        .unwrap()
        .ends_with('Z'));
    assert_eq!(customer["addresses"][0]["address2"], "Suite 12");
    assert_eq!(customer["addresses"][0]["company"], "Jane's Boutique");
}

#[tokio::test]
async fn test_upstream_rejection_surfaces_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"errors": {"email": ["has already been taken"]}})),
        )
        .mount(&mock_server)
        .await;

    let (status, headers, body) = post_form(create_app(mock_server.uri()), &wholesale_form()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": r#"{"email":["has already been taken"]}"#})
    );
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_success_status_without_customer_is_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"customer": null})))
        .mount(&mock_server)
        .await;

    let (status, _, body) = post_form(create_app(mock_server.uri()), &wholesale_form()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Failed to create customer"})
    );
}

#[tokio::test]
async fn test_network_failure_is_server_error() {
    // Nothing listens on port 1
    let app = create_app("http://127.0.0.1:1".to_string());

    let (status, headers, body) = post_form(app, &wholesale_form()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Server error: "), "{}", message);
    assert!(message.len() > "Server error: ".len());
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_non_json_upstream_response_is_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let (status, _, body) = post_form(create_app(mock_server.uri()), &wholesale_form()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Server error: "));
}

#[tokio::test]
async fn test_missing_required_fields_skip_shopify() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customer": {"id": 1}})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut form = wholesale_form();
    let obj = form.as_object_mut().unwrap();
    obj.remove("email");
    obj.insert("zip".to_string(), json!(""));

    let (status, headers, body) = post_form(create_app(mock_server.uri()), &form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "message": "Missing required fields: email, zip"})
    );
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_unparseable_body_is_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    for raw in ["{not json", "", "null", "\"just text\""] {
        let (status, _, body) =
            send(create_app(mock_server.uri()), "POST", Some(raw.to_string())).await;
        let body: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {:?}", raw);
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Server error: "));
    }
}

#[tokio::test]
async fn test_identical_submissions_are_not_deduplicated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(CUSTOMERS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customer": {"id": 77}})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let form = wholesale_form();
    for _ in 0..2 {
        let (status, _, body) = post_form(create_app(mock_server.uri()), &form).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customerId"], 77);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_app("http://127.0.0.1:1".to_string());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "wholesale-signup-api");
}

#[tokio::test]
async fn test_oversized_body_keeps_method_dispatch_and_uniform_shape() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"customer": {"id": 1}})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri());
    config.max_body_bytes = 16;
    let oversized = wholesale_form().to_string();
    assert!(oversized.len() > 16);

    // Preflight still answers 200 with an empty body
    let (status, headers, body) =
        send(create_app_with_config(config.clone()), "OPTIONS", Some(oversized.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_cors_headers(&headers);

    // Other methods still get the 405 JSON body
    let (status, headers, body) =
        send(create_app_with_config(config.clone()), "GET", Some(oversized.clone())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"success": false, "message": "Method not allowed"})
    );
    assert_cors_headers(&headers);

    // POST is refused with the uniform failure body and no Shopify call
    let (status, headers, body) =
        send(create_app_with_config(config), "POST", Some(oversized)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Request body rejected: "));
    assert!(body.get("customerId").is_none());
    assert_cors_headers(&headers);
}

#[tokio::test]
async fn test_oversized_body_with_content_length_is_refused_as_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri());
    config.max_body_bytes = 16;
    let oversized = wholesale_form().to_string();

    let request = Request::builder()
        .method("POST")
        .uri(DEFAULT_SUBMISSION_PATH)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, oversized.len())
        .body(Body::from(oversized))
        .unwrap();

    let response = create_app_with_config(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_cors_headers(response.headers());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}
