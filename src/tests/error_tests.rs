#[cfg(test)]
mod tests {
    use crate::error::{AppError, AppResult, OptionExt};
    use crate::index::IndexError;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::io;

    async fn body_json(error: AppError) -> Value {
        let body = error.into_response().into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadShortcut("shortcut must be a bare filename".to_string());
        assert_eq!(format!("{}", error), "Bad shortcut: shortcut must be a bare filename");

        let error = AppError::NotFound("tool.sh not found".to_string());
        assert_eq!(format!("{}", error), "Not found: tool.sh not found");
    }

    #[test]
    fn test_app_error_into_response() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::TraversalRejected("../x".into()), StatusCode::NOT_FOUND),
            (AppError::BadShortcut("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::IoError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Unauthorized { realm: "Dropper".into() }, StatusCode::UNAUTHORIZED),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = AppError::Unauthorized { realm: "Lab".into() }.into_response();
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Basic realm=\"Lab\"");
    }

    #[tokio::test]
    async fn test_traversal_renders_like_not_found() {
        let traversal = body_json(AppError::TraversalRejected("../etc/passwd".into())).await;
        let missing = body_json(None::<()>.ok_or_not_found("../etc/passwd").unwrap_err()).await;
        assert_eq!(traversal["error"]["code"], "NOT_FOUND");
        assert_eq!(traversal["error"], missing["error"]);
        assert_eq!(traversal["status"], 404);
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let json = body_json(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(json["error"]["details"]["error_id"].is_string());
        assert!(!json.to_string().contains("secret detail"));
    }

    #[test]
    fn test_from_io_error() {
        let not_found: AppError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let denied: AppError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        match denied {
            AppError::IoError(msg) => assert!(msg.contains("nope")),
            other => panic!("Expected IoError variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_index_error() {
        let error: AppError = IndexError::RootNotDirectory("/nope".into()).into();
        assert!(matches!(error, AppError::Internal(_)));
    }

    #[test]
    fn test_option_ext() {
        let some: AppResult<u8> = Some(1).ok_or_not_found("thing");
        assert_eq!(some.unwrap(), 1);
        let none: AppResult<u8> = None.ok_or_not_found("thing");
        match none {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "thing not found"),
            _ => panic!("Expected NotFound"),
        }
    }
}
