#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tower::ServiceExt;

    use crate::middleware::auth::{check_basic, Credentials, CredentialsError};
    use crate::tests::{app_with, tree, user_pass, NO_AUTH, USER_PASS};

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn correct_credentials_pass() {
        assert!(check_basic(Some(&basic("user:pass")), &user_pass()));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let header = format!("basic {}", STANDARD.encode("user:pass"));
        assert!(check_basic(Some(&header), &user_pass()));
        let header = format!("BASIC   {}", STANDARD.encode("user:pass"));
        assert!(check_basic(Some(&header), &user_pass()));
    }

    #[test]
    fn missing_or_malformed_headers_fail() {
        let creds = user_pass();
        assert!(!check_basic(None, &creds));
        assert!(!check_basic(Some(""), &creds));
        assert!(!check_basic(Some("Basic"), &creds));
        assert!(!check_basic(Some("Basic !!!not-base64!!!"), &creds));
        assert!(!check_basic(Some(&format!("Bearer {}", STANDARD.encode("user:pass"))), &creds));
        assert!(!check_basic(Some(&basic("userpass")), &creds));
        let invalid_utf8 = format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':', b'x']));
        assert!(!check_basic(Some(&invalid_utf8), &creds));
    }

    #[test]
    fn wrong_username_or_password_fails() {
        let creds = user_pass();
        assert!(!check_basic(Some(&basic("user:wrong")), &creds));
        assert!(!check_basic(Some(&basic("admin:pass")), &creds));
        assert!(!check_basic(Some(&basic("user:pass2")), &creds));
        assert!(!check_basic(Some(&basic("User:pass")), &creds));
        assert!(!check_basic(Some(&basic(":")), &creds));
    }

    #[test]
    fn password_may_contain_colons() {
        let creds = Credentials::parse("admin:p:a:ss").unwrap();
        assert_eq!(creds.username(), "admin");
        assert!(check_basic(Some(&basic("admin:p:a:ss")), &creds));
        assert!(!check_basic(Some(&basic("admin:p")), &creds));
    }

    #[test]
    fn parse_rejects_malformed_pairs() {
        assert_eq!(Credentials::parse("nocolon"), Err(CredentialsError::MissingSeparator));
        assert_eq!(Credentials::parse(":pass"), Err(CredentialsError::EmptyUsername));
        assert!(Credentials::parse("user:").is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }

    async fn status_with(
        app: axum::Router,
        uri: &str,
        auth: Option<&str>,
    ) -> axum::response::Response {
        let mut req = Request::builder().uri(uri);
        if let Some(value) = auth {
            req = req.header(header::AUTHORIZATION, value);
        }
        app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn gate_rejects_missing_credentials_with_challenge() {
        let dir = tree(&[("linux/linpeas.sh", b"x")]);
        let (app, _) = app_with(dir.path(), USER_PASS).await;

        for uri in ["/drop/linpeas.sh", "/linux/linpeas.sh", "/_ping", "/_ls", "/", "/nope"] {
            let res = status_with(app.clone(), uri, None).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", uri);
            assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Basic realm=\"Dropper\"");
        }
    }

    #[tokio::test]
    async fn gate_rejects_wrong_credentials() {
        let dir = tree(&[("linux/linpeas.sh", b"x")]);
        let (app, state) = app_with(dir.path(), USER_PASS).await;

        let res = status_with(app, "/drop/linpeas.sh", Some(&basic("user:nope"))).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(state.metrics.get_snapshot().auth_failures, 1);
    }

    #[tokio::test]
    async fn gate_passes_correct_credentials() {
        let dir = tree(&[("linux/linpeas.sh", b"x")]);
        let (app, _) = app_with(dir.path(), USER_PASS).await;

        let res = status_with(app.clone(), "/drop/linpeas.sh", Some(&basic("user:pass"))).await;
        assert_eq!(res.status(), StatusCode::OK);
        // Passing the gate does not turn a miss into a hit
        let res = status_with(app, "/drop/missing.sh", Some(&basic("user:pass"))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn no_auth_mode_never_challenges() {
        let dir = tree(&[("linux/linpeas.sh", b"x")]);
        let (app, state) = app_with(dir.path(), NO_AUTH).await;

        for auth in [None, Some("garbage"), Some("Basic Zm9vOmJhcg==")] {
            let res = status_with(app.clone(), "/drop/linpeas.sh", auth).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert!(!res.headers().contains_key(header::WWW_AUTHENTICATE));
        }
        assert_eq!(state.metrics.get_snapshot().auth_failures, 0);
    }

    #[tokio::test]
    async fn challenge_body_does_not_leak_credentials() {
        use http_body_util::BodyExt;

        let dir = tree(&[("a.txt", b"x")]);
        let (app, _) = app_with(dir.path(), USER_PASS).await;
        let res = status_with(app, "/a.txt", Some(&basic("user:wrong"))).await;
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("pass"));
    }
}
