use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use larder::LarderError;
use serde_json::Value;

async fn render(err: LarderError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn forbidden_is_indistinguishable_from_not_found() {
    let forbidden = render(LarderError::Forbidden("person 3 does not own Package#1".into())).await;
    let not_found = render(LarderError::NotFound("Package 1".into())).await;

    assert_eq!(forbidden.0, StatusCode::NOT_FOUND);
    assert_eq!(forbidden, not_found);
    assert_eq!(forbidden.1["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn validation_and_conflict_keep_their_messages() {
    let (status, body) = render(LarderError::Validation("group name must be present".into())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["message"], "group name must be present");

    let (status, body) = render(LarderError::Conflict("github account 7 is linked".into())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn internal_failures_hide_details() {
    let (status, body) = render(LarderError::RactorError("actor gone".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(!body.to_string().contains("actor gone"));
}

#[tokio::test]
async fn error_body_carries_only_code_and_message() {
    let (_, body) = render(LarderError::Conflict("github account 7 is linked".into())).await;
    let error = body["error"].as_object().unwrap();
    let mut keys: Vec<_> = error.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["code", "message"]);
}
