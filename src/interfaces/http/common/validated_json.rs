//! JSON body extractor with `validator` checks
//!
//! Rejections use the crate's error-code style inside the [`ApiResponse`]
//! envelope:
//!
//! - `INVALID_BODY: ...` with axum's own status for bodies that do not
//!   deserialize (400 syntax, 415 content type, 422 wrong shape)
//! - `VALIDATION_FAILED: courseId: length; userId: length` (422) for bodies
//!   that deserialize but break a `#[validate]` rule. Field names are
//!   reported as the client sent them (camelCase).

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

impl ValidatedJsonRejection {
    fn status(&self) -> StatusCode {
        match self {
            Self::Malformed(rejection) => rejection.status(),
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Malformed(rejection) => format!("INVALID_BODY: {}", rejection.body_text()),
            Self::Invalid(errors) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        let field = camel_case(&field);
                        errs.iter().map(move |e| format!("{field}: {}", e.code))
                    })
                    .collect();
                // field_errors() is a HashMap
                fields.sort();
                format!("VALIDATION_FAILED: {}", fields.join("; "))
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.message());
        (self.status(), Json(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Malformed)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(Self(value))
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct HoldRequest {
        #[validate(length(min = 1, max = 10))]
        course_id: String,
        #[validate(range(min = 1, max = 4))]
        seat_count: u32,
    }

    async fn hold(ValidatedJson(body): ValidatedJson<HoldRequest>) -> String {
        format!("{}x{}", body.course_id, body.seat_count)
    }

    async fn send(content_type: &str, body: impl Into<Body>) -> (StatusCode, Value) {
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/hold")
            .header("content-type", content_type)
            .body(body.into())
            .unwrap();
        let resp = Router::new()
            .route("/hold", post(hold))
            .oneshot(req)
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn valid_body_reaches_handler() {
        let body = json!({"courseId": "1", "seatCount": 2}).to_string();
        let (status, _) = send("application/json", body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn syntax_error_is_invalid_body() {
        let (status, body) = send("application/json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("INVALID_BODY"));
    }

    #[tokio::test]
    async fn missing_content_type_is_415() {
        let body = json!({"courseId": "1", "seatCount": 2}).to_string();
        let (status, body) = send("text/plain", body).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].as_str().unwrap().starts_with("INVALID_BODY"));
    }

    #[tokio::test]
    async fn rule_violations_list_client_field_names() {
        let body = json!({"courseId": "", "seatCount": 9}).to_string();
        let (status, body) = send("application/json", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            "VALIDATION_FAILED: courseId: length; seatCount: range"
        );
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("course_id"), "courseId");
        assert_eq!(camel_case("user_id"), "userId");
        assert_eq!(camel_case("limit"), "limit");
    }
}
