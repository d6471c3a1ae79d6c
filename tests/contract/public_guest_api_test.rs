//! Contract tests for the unauthenticated routes: public invoice links,
//! guest previews and health checks.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;

#[actix_web::test]
async fn test_public_view_marks_sent_invoice_viewed() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/invoices")
        .insert_header(bearer(TEST_TOKEN))
        .set_json(invoice_payload())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = data(&body)["id"].as_str().unwrap().to_string();
    let public_id = data(&body)["public_id"].as_str().unwrap().to_string();
    assert_eq!(
        data(&body)["public_url"],
        format!("https://bills.test/i/{}", public_id)
    );

    // Drafts are readable but stay drafts
    let req = test::TestRequest::get()
        .uri(&format!("/public/invoices/{}", public_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(data(&body)["status"], "draft");
    assert!(data(&body)["viewed_date"].is_null());

    let req = test::TestRequest::post()
        .uri(&format!("/invoices/{}/send", id))
        .insert_header(bearer(TEST_TOKEN))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/public/invoices/{}", public_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(data(&body)["status"], "viewed");
    assert!(data(&body)["viewed_date"].is_string());
    assert_eq!(data(&body)["total_cents"].as_i64(), Some(24839));
}

#[actix_web::test]
async fn test_unknown_public_id_is_not_found() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/public/invoices/missing")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[actix_web::test]
async fn test_guest_preview_prices_invoice() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/guest/invoices/preview?invoice_id=deadbeef-0000-4000-8000-000000000000")
        .set_json(guest_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let preview = data(&body);
    assert_eq!(preview["invoice_id"], "deadbeef-0000-4000-8000-000000000000");
    assert_eq!(preview["invoice"]["number"], "GUEST-DEADBEEF");
    assert_eq!(preview["invoice"]["date"], "2024-06-01");
    assert_eq!(preview["invoice"]["currency"], "USD");
    assert_eq!(preview["totals"]["subtotal_cents"].as_i64(), Some(9999));
    assert_eq!(preview["totals"]["tax_cents"].as_i64(), Some(1000));
    assert_eq!(preview["totals"]["total_cents"].as_i64(), Some(10999));
    assert_eq!(preview["formatted_total"], "$109.99");
}

#[actix_web::test]
async fn test_guest_preview_generates_id() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/guest/invoices/preview")
        .set_json(guest_payload())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let invoice_id = data(&body)["invoice_id"].as_str().unwrap();
    let number = data(&body)["invoice"]["number"].as_str().unwrap();
    assert_eq!(invoice_id.len(), 36);
    assert_eq!(number, format!("GUEST-{}", invoice_id[..8].to_uppercase()));
}

#[actix_web::test]
async fn test_guest_preview_validation() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/guest/invoices/preview")
        .set_json(json!({
            "from_name": "",
            "to_name": "Acme",
            "to_email": "not-an-email",
            "items": [],
            "due_date": "2024-07-15"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let messages: Vec<&str> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["message"].as_str())
        .collect();
    assert!(messages.contains(&"Your business name is required"));
    assert!(messages.contains(&"Invalid email"));
    assert!(messages.contains(&"At least one item is required"));
}

#[actix_web::test]
async fn test_guest_preview_rejects_oversized_line() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let mut payload = guest_payload();
    payload["items"][0]["quantity"] = json!("1000000000000000000000");
    payload["items"][0]["unit_price"] = json!("1000000000");

    let req = test::TestRequest::post()
        .uri("/guest/invoices/preview")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_health_checks_skip_auth() {
    let state = test_state(2024, 6, 1);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"]["storage"], "memory");
}
