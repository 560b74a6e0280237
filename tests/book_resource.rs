use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use gateway_kernel::Settings;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const DEFAULT_NAME: &str = "AAAAAAAAAA";
const UPDATED_NAME: &str = "BBBBBBBBBB";
const DEFAULT_DESCRIPTION: &str = "AAAAAAAAAA";
const UPDATED_DESCRIPTION: &str = "BBBBBBBBBB";
const DEFAULT_PRICE: i64 = 1;
const UPDATED_PRICE: i64 = 2;

async fn app() -> Router {
    let pool = gateway_db::connect_in_memory().await.unwrap();
    ipa_gateway::app(&Settings::default(), &pool).await.unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    send_as(app, method, uri, "application/json", body).await
}

async fn send_as(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: Option<Value>,
) -> Response {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    };
    app.clone().oneshot(request.unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn default_book() -> Value {
    json!({
        "name": DEFAULT_NAME,
        "description": DEFAULT_DESCRIPTION,
        "price": DEFAULT_PRICE
    })
}

async fn create(app: &Router, body: Value) -> i64 {
    let response = send(app, Method::POST, "/api/books", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_i64().unwrap()
}

async fn count(app: &Router) -> u64 {
    let response = send(app, Method::GET, "/api/books?size=1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.headers()["x-total-count"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

#[tokio::test]
async fn create_book() {
    let app = app().await;
    let before = count(&app).await;

    let response = send(&app, Method::POST, "/api/books", Some(default_book())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let headers = response.headers().clone();
    let body = json_body(response).await;
    let id = body["id"].as_i64().unwrap();

    assert_eq!(headers[header::LOCATION], format!("/api/books/{id}").as_str());
    assert_eq!(headers["x-ipagatewayapp-alert"], "ipaGatewayApp.book.created");
    assert_eq!(headers["x-ipagatewayapp-params"], id.to_string().as_str());
    assert_eq!(body["name"], DEFAULT_NAME);
    assert_eq!(body["description"], DEFAULT_DESCRIPTION);
    assert_eq!(body["price"], DEFAULT_PRICE);
    assert_eq!(count(&app).await, before + 1);
}

#[tokio::test]
async fn create_book_with_existing_id() {
    let app = app().await;
    let before = count(&app).await;

    let mut body = default_book();
    body["id"] = json!(1);
    let response = send(&app, Method::POST, "/api/books", Some(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-ipagatewayapp-error"], "error.idexists");
    assert_eq!(response.headers()["x-ipagatewayapp-params"], "book");
    assert_eq!(json_body(response).await["error"]["code"], "error.idexists");
    assert_eq!(count(&app).await, before);
}

#[tokio::test]
async fn get_book() {
    let app = app().await;
    let id = create(&app, default_book()).await;

    let response = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "id": id,
            "name": DEFAULT_NAME,
            "description": DEFAULT_DESCRIPTION,
            "price": DEFAULT_PRICE
        })
    );
}

#[tokio::test]
async fn get_non_existing_book() {
    let app = app().await;
    let response = send(&app, Method::GET, "/api/books/9999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn put_existing_book() {
    let app = app().await;
    let id = create(&app, default_book()).await;
    let before = count(&app).await;

    let replacement = json!({
        "id": id,
        "name": UPDATED_NAME,
        "description": UPDATED_DESCRIPTION,
        "price": UPDATED_PRICE
    });
    let response = send(&app, Method::PUT, &format!("/api/books/{id}"), Some(replacement.clone())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ipagatewayapp-alert"], "ipaGatewayApp.book.updated");
    assert_eq!(json_body(response).await, replacement);

    let stored = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(json_body(stored).await, replacement);
    assert_eq!(count(&app).await, before);
}

#[tokio::test]
async fn put_rejects_bad_ids_before_writing() {
    let app = app().await;
    let id = create(&app, default_book()).await;
    let before = count(&app).await;

    let cases = [
        (format!("/api/books/{id}"), json!({"name": UPDATED_NAME}), "error.idnull"),
        (
            format!("/api/books/{}", id + 1),
            json!({"id": id, "name": UPDATED_NAME}),
            "error.idinvalid",
        ),
        (
            "/api/books/9999".to_string(),
            json!({"id": 9999, "name": UPDATED_NAME}),
            "error.idnotfound",
        ),
    ];

    for (uri, body, key) in cases {
        let response = send(&app, Method::PUT, &uri, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{key}");
        assert_eq!(response.headers()["x-ipagatewayapp-error"], key);
    }

    let stored = json_body(send(&app, Method::GET, &format!("/api/books/{id}"), None).await).await;
    assert_eq!(stored["name"], DEFAULT_NAME);
    assert_eq!(count(&app).await, before);
}

#[tokio::test]
async fn update_without_path_id_is_not_allowed() {
    let app = app().await;

    let response = send(&app, Method::PUT, "/api/books", Some(json!({"id": 1}))).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = send(&app, Method::PATCH, "/api/books", Some(json!({"id": 1}))).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let app = app().await;
    let id = create(&app, default_book()).await;

    let response = send_as(
        &app,
        Method::PATCH,
        &format!("/api/books/{id}"),
        "application/merge-patch+json",
        Some(json!({"id": id, "description": UPDATED_DESCRIPTION})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "id": id,
            "name": DEFAULT_NAME,
            "description": UPDATED_DESCRIPTION,
            "price": DEFAULT_PRICE
        })
    );
}

#[tokio::test]
async fn full_partial_update_overwrites_everything() {
    let app = app().await;
    let id = create(&app, default_book()).await;

    let patch = json!({
        "id": id,
        "name": UPDATED_NAME,
        "description": UPDATED_DESCRIPTION,
        "price": UPDATED_PRICE
    });
    let response = send(&app, Method::PATCH, &format!("/api/books/{id}"), Some(patch.clone())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, patch);
}

#[tokio::test]
async fn partial_update_ignores_null_fields() {
    let app = app().await;
    let id = create(&app, default_book()).await;

    let response = send_as(
        &app,
        Method::PATCH,
        &format!("/api/books/{id}"),
        "application/merge-patch+json",
        Some(json!({
            "id": id,
            "name": UPDATED_NAME,
            "description": null,
            "price": null
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let expected = json!({
        "id": id,
        "name": UPDATED_NAME,
        "description": DEFAULT_DESCRIPTION,
        "price": DEFAULT_PRICE
    });
    assert_eq!(json_body(response).await, expected);

    let stored = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(json_body(stored).await, expected);
}

#[tokio::test]
async fn partial_update_rejects_bad_ids() {
    let app = app().await;
    let id = create(&app, default_book()).await;

    let response = send(
        &app,
        Method::PATCH,
        &format!("/api/books/{}", id + 1),
        Some(json!({"id": id, "name": UPDATED_NAME})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-ipagatewayapp-error"], "error.idinvalid");

    let response = send(
        &app,
        Method::PATCH,
        "/api/books/9999",
        Some(json!({"id": 9999, "name": UPDATED_NAME})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-ipagatewayapp-error"], "error.idnotfound");

    let response = send(
        &app,
        Method::PATCH,
        &format!("/api/books/{id}"),
        Some(json!({"name": UPDATED_NAME})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-ipagatewayapp-error"], "error.idnull");
}

#[tokio::test]
async fn list_books_pages_with_headers() {
    let app = app().await;
    for price in 1..=5 {
        create(
            &app,
            json!({"name": format!("book-{price}"), "description": "d", "price": price}),
        )
        .await;
    }

    let response = send(&app, Method::GET, "/api/books?page=1&size=2&sort=price,desc", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers["x-total-count"], "5");
    let link = headers[header::LINK].to_str().unwrap();
    assert!(link.contains("rel=\"next\""));
    assert!(link.contains("rel=\"prev\""));
    assert!(link.contains("page=2&size=2>; rel=\"last\""));
    assert!(link.contains("page=0&size=2>; rel=\"first\""));
    assert!(link.starts_with("</api/books?sort=price%2Cdesc&"));

    let body = json_body(response).await;
    let prices: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["price"].as_i64().unwrap())
        .collect();
    assert_eq!(prices, vec![3, 2]);
}

#[tokio::test]
async fn list_books_rejects_unknown_sort() {
    let app = app().await;
    let response = send(&app, Method::GET, "/api/books?sort=author,asc", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_book() {
    let app = app().await;
    let id = create(&app, default_book()).await;
    let before = count(&app).await;

    let response = send(&app, Method::DELETE, &format!("/api/books/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["x-ipagatewayapp-alert"], "ipaGatewayApp.book.deleted");
    assert_eq!(count(&app).await, before - 1);

    let response = send(&app, Method::DELETE, &format!("/api/books/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(count(&app).await, before - 1);
}

#[tokio::test]
async fn create_get_patch_flow() {
    let app = app().await;

    let id = create(&app, json!({"name": "A", "description": "d", "price": 10})).await;

    let response = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(
        json_body(response).await,
        json!({"id": id, "name": "A", "description": "d", "price": 10})
    );

    let response = send(
        &app,
        Method::PATCH,
        &format!("/api/books/{id}"),
        Some(json!({"id": id, "name": "B"})),
    )
    .await;
    assert_eq!(
        json_body(response).await,
        json!({"id": id, "name": "B", "description": "d", "price": 10})
    );
}

#[tokio::test]
async fn cors_preflight_exposes_gateway_headers() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/books")
        .header(header::ORIGIN, "http://localhost:9000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:9000");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "1800");
}
