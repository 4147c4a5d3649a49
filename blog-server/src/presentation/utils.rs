use actix_web::error::{PathError, QueryPayloadError};
use actix_web::{HttpMessage, HttpRequest, web};

use crate::domain::error::DomainError;
use crate::presentation::middleware::RequestId;

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

/// Bodies are only read as JSON when declared as `application/json` or a
/// `+json` type.
pub fn require_json(req: &HttpRequest) -> Result<(), DomainError> {
    let content_type = req.content_type();
    if content_type.eq_ignore_ascii_case("application/json") || content_type.ends_with("+json") {
        Ok(())
    } else {
        Err(DomainError::InvalidJson)
    }
}

/// Malformed query strings answer with the same `{"error": ...}` body as
/// validation failures.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        DomainError::validation(format!("Invalid query string: {}", err)).into()
    })
}

/// Non-numeric ids cannot name a post.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|_err: PathError, req| {
        let raw = req.match_info().get("id").unwrap_or_default().to_string();
        DomainError::InvalidPostId(raw).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn require_json_checks_the_content_type() {
        let req = TestRequest::default()
            .insert_header(("content-type", "application/json; charset=utf-8"))
            .to_http_request();
        assert!(require_json(&req).is_ok());

        let req = TestRequest::default()
            .insert_header(("content-type", "application/merge-patch+json"))
            .to_http_request();
        assert!(require_json(&req).is_ok());

        let req = TestRequest::default()
            .insert_header(("content-type", "text/plain"))
            .to_http_request();
        assert!(matches!(require_json(&req), Err(DomainError::InvalidJson)));

        let req = TestRequest::default().to_http_request();
        assert!(matches!(require_json(&req), Err(DomainError::InvalidJson)));
    }
}
