//! Checkout flows over HTTP: the happy path, stock conflicts, connectivity
//! failures.

use cajonera_integration_tests::{TestApp, sample_catalog};
use serde_json::json;

/// Walk review -> pay so a submission is legal.
async fn walk_to_payment(app: &TestApp) {
    let review = app.get("/checkout").await;
    assert_eq!(review.status(), 200);

    let cont = app.post_form("/checkout/continue", &[]).await;
    assert_eq!(cont.status(), 303);
    assert_eq!(cont.headers()["location"], "/checkout/pay");

    let pay = app.get("/checkout/pay").await;
    assert_eq!(pay.status(), 200);
}

#[tokio::test]
async fn accepted_order_clears_cart_and_redirects_to_whatsapp() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "2")]).await;
    walk_to_payment(&app).await;

    let resp = app.post_form("/checkout/submit", &[]).await;
    assert_eq!(resp.status(), 303);
    let location = resp.headers()["location"].to_str().expect("location");
    assert!(location.starts_with("https://wa.me/51999888777?text="));
    assert!(location.contains("PED-0001"));

    // The cart is gone only after the backend said yes.
    assert_eq!(app.cart_count().await, "0");

    let orders = app.backend.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["userName"], "Rosa");
    assert_eq!(orders[0]["total"], "10.00");
    assert_eq!(orders[0]["cart"][0]["nombre"], "Aceitunas de Tacna");
    assert_eq!(orders[0]["cart"][0]["quantity"], 1);
}

#[tokio::test]
async fn stock_conflict_routes_back_to_review_with_cart_intact() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.backend.set_submit_response(json!({
        "status": "error",
        "message": "Sin stock suficiente de Aceitunas de Tacna"
    }));
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "2")]).await;
    walk_to_payment(&app).await;

    let resp = app.post_form("/checkout/submit", &[]).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/checkout");

    // The review step shows the backend's message verbatim, cart intact.
    let review = app.get("/checkout").await;
    let body = review.text().await.expect("review page");
    assert!(body.contains("Sin stock suficiente de Aceitunas de Tacna"));
    assert_eq!(app.cart_count().await, "1");
}

#[tokio::test]
async fn connectivity_failure_returns_to_the_payment_step() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.backend.set_submit_status(500);
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "2")]).await;
    walk_to_payment(&app).await;

    let resp = app.post_form("/checkout/submit", &[]).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/checkout/pay");

    let pay = app.get("/checkout/pay").await;
    let body = pay.text().await.expect("pay page");
    assert!(body.contains("Error de conexión"));
    assert_eq!(app.cart_count().await, "1");

    // Exactly one attempt: nothing retried automatically.
    assert_eq!(app.backend.orders().len(), 1);
}

#[tokio::test]
async fn payment_step_requires_passing_through_review() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;
    app.post_form("/cart/add", &[("product_id", "2")]).await;

    let resp = app.get("/checkout/pay").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/checkout");
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    let resp = app.get("/checkout").await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");
}
