//! Error-envelope and extractor behavior, exercised through the HTTP
//! machinery without a database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ratecraft_api::error::AppError;
use ratecraft_api::middleware::auth::{CurrentUser, USER_ID_HEADER};
use ratecraft_core::error::CoreError;
use ratecraft_research::ResearchApiError;

async fn whoami(user: CurrentUser) -> String {
    user.user_id.to_string()
}

fn app() -> Router {
    Router::new().route("/whoami", get(whoami))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// -- CurrentUser extractor ---------------------------------------------------

#[tokio::test]
async fn missing_user_header_is_rejected() {
    let response = app()
        .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_numeric_user_header_is_rejected() {
    let response = app()
        .oneshot(
            Request::get("/whoami")
                .header(USER_ID_HEADER, "not-a-number")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valid_user_header_is_extracted() {
    let response = app()
        .oneshot(
            Request::get("/whoami")
                .header(USER_ID_HEADER, "7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"7");
}

// -- Error envelope ----------------------------------------------------------

#[tokio::test]
async fn validation_error_maps_to_400() {
    let response =
        AppError::Core(CoreError::Validation("margin out of range".to_string())).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "margin out of range");
}

#[tokio::test]
async fn not_found_error_maps_to_404() {
    let response = AppError::Core(CoreError::NotFound {
        entity: "PricingProfile",
        id: 42,
    })
    .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn forbidden_error_maps_to_403() {
    let response =
        AppError::Core(CoreError::Forbidden("not your session".to_string())).into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn internal_error_message_is_sanitized() {
    let response =
        AppError::InternalError("connection pool exhausted at 10.0.0.5".to_string())
            .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn research_error_maps_to_retryable_502() {
    let response = AppError::Research(ResearchApiError::ApiError {
        status: 500,
        body: "model overloaded".to_string(),
    })
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "AI_SERVICE_ERROR");
    // Internal detail from the upstream body is not leaked.
    assert!(!body["message"].as_str().unwrap().contains("overloaded"));
}
