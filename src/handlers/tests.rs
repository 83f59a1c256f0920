use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{create_router, database::test_pool, utils::create_token, AppState};

const SECRET: &str = "router-test-secret";

async fn app() -> Router {
    let db = test_pool().await;
    create_router(AppState::new(db, SECRET))
}

fn bearer() -> String {
    let token = create_token(1, "Pat Buyer".to_string(), SECRET).unwrap();
    format!("Bearer {}", token)
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, bearer());
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    call(app, request).await
}

async fn create_vendor(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/api/vendors", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_i64().unwrap()
}

async fn create_product(app: &Router, vendor_id: i64, name: &str, price: f64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/api/vendors/{}/products", vendor_id),
        Some(json!({ "name": name, "sku": format!("SKU-{}", name), "unit_price": price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_i64().unwrap()
}

fn order_body(vendor_id: i64, po_number: &str, product_id: i64) -> Value {
    json!({
        "vendor_id": vendor_id,
        "po_number": po_number,
        "order_date": "2026-01-01",
        "items": [{ "product_id": product_id, "qty": 3, "unit_price": 10.00 }]
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;

    let missing = Request::builder()
        .uri("/api/vendors")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, missing).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let forged = Request::builder()
        .uri("/api/vendors")
        .header(AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn unknown_route_gets_not_found_envelope() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/vendors")
        .header(AUTHORIZATION, bearer())
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/api/vendors/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::POST, "/api/vendors", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purchase_order_lifecycle_over_http() {
    let app = app().await;
    let vendor_id = create_vendor(&app, "Acme Supply").await;
    let product_id = create_product(&app, vendor_id, "Widget", 10.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/purchase-orders",
        Some(order_body(vendor_id, "PO-1", product_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["vendor_name"], "Acme Supply");
    assert_eq!(body["data"]["items"][0]["line_total"], "30.00");
    let order_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/purchase-orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/purchase-orders",
        Some(order_body(vendor_id, "PO-1", product_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("PO-1"));

    for po_number in ["PO-2", "PO-3"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/purchase-orders",
            Some(order_body(vendor_id, po_number, product_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/purchase-orders?vendorId={}&page=1&limit=10", vendor_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/purchase-orders/{}", order_id),
        Some(json!({ "status": "submitted", "order_date": "2026-01-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "submitted");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/purchase-orders/{}/items", order_id),
        Some(json!({ "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one item is required");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/purchase-orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/purchase-orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_vendor_removes_its_dependents() {
    let app = app().await;
    let vendor_id = create_vendor(&app, "Initech").await;
    let product_id = create_product(&app, vendor_id, "Stapler", 4.5).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/vendors/{}/contacts", vendor_id),
        Some(json!({ "name": "Milton", "email": "milton@initech.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let contact_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/purchase-orders",
        Some(order_body(vendor_id, "PO-INI-1", product_id)),
    )
    .await;
    let order_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/api/vendors/{}", vendor_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/vendors/{}", vendor_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, &format!("/api/purchase-orders/{}", order_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", contact_id),
        Some(json!({ "name": "Milton" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{}", product_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_product_cannot_be_deleted() {
    let app = app().await;
    let vendor_id = create_vendor(&app, "Globex").await;
    let used = create_product(&app, vendor_id, "Gear", 2.0).await;
    let unused = create_product(&app, vendor_id, "Sprocket", 1.0).await;

    send(
        &app,
        Method::POST,
        "/api/purchase-orders",
        Some(order_body(vendor_id, "PO-G-1", used)),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/products/{}", used), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{}", unused), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn vendor_update_keeps_status_when_omitted() {
    let app = app().await;
    let vendor_id = create_vendor(&app, "Hooli").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/vendors/{}", vendor_id),
        Some(json!({ "name": "Hooli", "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/vendors/{}", vendor_id),
        Some(json!({ "name": "Hooli XYZ", "city": "Palo Alto" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");
    assert_eq!(body["data"]["city"], "Palo Alto");

    let (_, body) = send(&app, Method::GET, "/api/vendors?status=inactive&search=XYZ", None).await;
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn analytics_echo_the_resolved_date_range() {
    let app = app().await;
    let vendor_id = create_vendor(&app, "Umbrella").await;
    let product_id = create_product(&app, vendor_id, "Vial", 10.0).await;
    send(
        &app,
        Method::POST,
        "/api/purchase-orders",
        Some(order_body(vendor_id, "PO-U-1", product_id)),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/analytics/summary?start=2026-01-01&end=2026-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalSpend"], "30.00");
    assert_eq!(body["data"]["orderCount"], 1);
    assert_eq!(body["dateRange"]["start"], "2026-01-01");
    assert_eq!(body["dateRange"]["end"], "2026-01-31");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/analytics/po-status?start=2026-01-01&end=2026-01-31&vendorId=all",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["status"], "draft");
    assert_eq!(body["data"][0]["count"], 1);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/analytics/spend-trend?vendorId=abc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["openPurchaseOrders"], 1);
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let app = app().await;
    create_vendor(&app, "Acme Supply").await;

    let (status, body) = send(&app, Method::GET, "/api/vendors?page=9223372036854775807", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/purchase-orders?page=9223372036854775807&limit=100",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn internal_error_detail_follows_router_state() {
    let db = test_pool().await;
    db.close().await;

    let hidden = create_router(AppState::new(db.clone(), SECRET));
    let (status, body) = send(&hidden, Method::GET, "/api/vendors", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
    assert!(body.get("detail").is_none());

    let shown = create_router(AppState::new(db, SECRET).with_error_details(true));
    let (status, body) = send(&shown, Method::GET, "/api/vendors", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["detail"].as_str().unwrap().contains("Database error"));
}
