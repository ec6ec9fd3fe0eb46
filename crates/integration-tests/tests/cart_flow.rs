//! Cart flows over HTTP: optimistic admission, rejection notices, removal.

use cajonera_integration_tests::{TestApp, sample_catalog};

#[tokio::test]
async fn add_within_remaining_updates_the_badge() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    let resp = app.post_form("/cart/add", &[("product_id", "2")]).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");

    assert_eq!(app.cart_count().await, "1");
}

#[tokio::test]
async fn add_beyond_remaining_is_rejected_locally() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    // Queso Andino has exactly one unit left (10 capacity, 9 committed).
    app.post_form("/cart/add", &[("product_id", "1")]).await;
    assert_eq!(app.cart_count().await, "1");

    let resp = app.post_form("/cart/add", &[("product_id", "1")]).await;
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("notice");
    assert!(body.contains("Solo quedan 1 unidades"));
    assert!(body.contains("Queso Andino"));

    // No mutation, and nothing ever reached the backend.
    assert_eq!(app.cart_count().await, "1");
    assert!(app.backend.orders().is_empty());
}

#[tokio::test]
async fn vanished_product_cannot_be_added() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    let resp = app.post_form("/cart/add", &[("product_id", "99")]).await;
    let body = resp.text().await.expect("notice");
    assert!(body.contains("ya no está disponible"));
    assert_eq!(app.cart_count().await, "0");
}

#[tokio::test]
async fn increase_beyond_remaining_reports_the_maximum() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "1")]).await;

    let resp = app
        .post_form("/cart/update", &[("product_id", "1"), ("delta", "1")])
        .await;
    let body = resp.text().await.expect("cart fragment");
    assert!(body.contains("Solo hay 1 disponibles."));
    assert_eq!(app.cart_count().await, "1");
}

#[tokio::test]
async fn decreasing_to_zero_removes_the_line() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "2")]).await;
    let resp = app
        .post_form("/cart/update", &[("product_id", "2"), ("delta", "-1")])
        .await;
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("cart fragment");
    assert!(body.contains("Aún no has agregado nada"));

    assert_eq!(app.cart_count().await, "0");
}

#[tokio::test]
async fn remove_drops_the_whole_line() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());
    app.register("Rosa", "51987654321").await;

    app.post_form("/cart/add", &[("product_id", "2")]).await;
    app.post_form("/cart/add", &[("product_id", "2")]).await;
    assert_eq!(app.cart_count().await, "2");

    app.post_form("/cart/remove", &[("product_id", "2")]).await;
    assert_eq!(app.cart_count().await, "0");
}

#[tokio::test]
async fn cart_fragments_require_a_pass() {
    let app = TestApp::spawn().await;
    app.backend.set_catalog(sample_catalog());

    // An HTMX fragment request without a pass gets a bare 401, not a
    // redirect it would swap into the page.
    let resp = app
        .client
        .post(app.url("/cart/add"))
        .header("HX-Request", "true")
        .form(&[("product_id", "2")])
        .send()
        .await
        .expect("POST request");
    assert_eq!(resp.status(), 401);

    // The same request as a plain navigation is sent through the gate.
    let resp = app.post_form("/cart/add", &[("product_id", "2")]).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/access");
}
