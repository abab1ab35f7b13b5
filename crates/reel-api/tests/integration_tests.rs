//! # Integration Tests for reel-api
//!
//! Drives the full router: sign-up with email verification, email lookup,
//! sign-in and sessions, password reset, profile edits, the movie catalog
//! proxy (against a wiremock catalog), rate limiting, health probes and the
//! OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_matcher, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reel_api::mailer::{link_param, MemoryMailer};
use reel_api::middleware::rate_limit::RateLimitConfig;
use reel_api::state::{AppConfig, AppState};
use reel_catalog::{CatalogClient, CatalogConfig};

// -- Harness ------------------------------------------------------------------

struct Harness {
    app: Router,
    mailer: MemoryMailer,
}

impl Harness {
    fn new() -> Self {
        Self::with(AppConfig::default(), None)
    }

    fn with(config: AppConfig, catalog: Option<CatalogClient>) -> Self {
        let mailer = MemoryMailer::new();
        let state = AppState::with_config(config, catalog, Arc::new(mailer.clone()));
        Self {
            app: reel_api::app(state),
            mailer,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, headers, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        let (status, _, body) = self
            .json(
                Method::POST,
                "/v1/auth/sign-up/email",
                json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "confirmPassword": password,
                }),
                None,
            )
            .await;
        (status, body)
    }

    fn mailed_token(&self, email: &str) -> String {
        let mail = self.mailer.last_to(email).expect("no mail sent");
        link_param(&mail.text, "token").expect("no token in mail")
    }

    /// Sign up, verify without a callback and return the session token.
    async fn verified_user(&self, name: &str, email: &str, password: &str) -> String {
        let (status, _) = self.sign_up(name, email, password).await;
        assert_eq!(status, StatusCode::CREATED);
        let token = self.mailed_token(email);
        let (status, _, body) = self
            .get(&format!("/v1/auth/verify-email?token={token}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn sign_in(&self, email: &str, password: &str) -> (StatusCode, HeaderMap, Value) {
        self.json(
            Method::POST,
            "/v1/auth/sign-in/email",
            json!({ "email": email, "password": password }),
            None,
        )
        .await
    }
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_and_readiness() {
    let h = Harness::new();
    let (status, _, body) = h.get("/health/liveness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));

    let (status, _, body) = h.get("/health/readiness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ready".into()));
}

#[tokio::test]
async fn test_metrics_count_api_requests() {
    let h = Harness::new();
    h.get("/v1/profile", None).await;
    let (status, _, body) = h.get("/health/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"], 1);
    assert_eq!(body["clientErrors"], 1);
}

// -- Sign-up & verification ---------------------------------------------------

#[tokio::test]
async fn test_sign_up_sends_verification_mail() {
    let h = Harness::new();
    let (status, body) = h.sign_up("Jane Doe", "Jane@Example.com", "password1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["emailVerified"], false);
    assert!(body["user"].get("passwordHash").is_none());

    let mail = h.mailer.last_to("jane@example.com").unwrap();
    assert_eq!(mail.subject, "Verify your email address");
    assert!(mail
        .text
        .starts_with("Click the link to verify your email: http://localhost:8080/v1/auth/verify-email?"));
}

#[tokio::test]
async fn test_sign_up_duplicate_is_conflict() {
    let h = Harness::new();
    h.sign_up("Jane", "jane@example.com", "password1").await;
    let (status, body) = h.sign_up("Jane", "JANE@example.com", "password1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_sign_up_field_errors() {
    let h = Harness::new();
    let (status, body) = h.sign_up("", "jane@example.com", "password1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "name");

    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/sign-up/email",
            json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "password1",
                "confirmPassword": "password2",
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "confirmPassword");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let h = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/auth/sign-in/email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, body) = h.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_verification_link_redirects_and_sets_cookie() {
    let h = Harness::new();
    h.sign_up("Jane", "jane@example.com", "password1").await;
    let mail = h.mailer.last_to("jane@example.com").unwrap();
    let token = link_param(&mail.text, "token").unwrap();
    let callback = link_param(&mail.text, "callbackURL").unwrap();
    assert_eq!(callback, "/movies");

    let (status, headers, _) = h
        .get(
            &format!("/v1/auth/verify-email?token={token}&callbackURL=%2Fmovies"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/movies");
    let cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("reel.session_token="));

    // Second use: the token is spent, the browser lands on the callback with an error.
    let (status, headers, _) = h
        .get(
            &format!("/v1/auth/verify-email?token={token}&callbackURL=%2Fmovies"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/movies?error=INVALID_TOKEN");
}

#[tokio::test]
async fn test_verification_with_bad_token_and_no_callback() {
    let h = Harness::new();
    let (status, _, body) = h.get("/v1/auth/verify-email?token=nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_verification_ignores_absolute_callback() {
    let h = Harness::new();
    h.sign_up("Jane", "jane@example.com", "password1").await;
    let token = h.mailed_token("jane@example.com");
    let (status, _, body) = h
        .get(
            &format!("/v1/auth/verify-email?token={token}&callbackURL=https%3A%2F%2Fevil.example"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["emailVerified"], true);
}

#[tokio::test]
async fn test_resend_verification() {
    let h = Harness::new();
    h.sign_up("Jane", "jane@example.com", "password1").await;
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/send-verification-email",
            json!({ "email": "jane@example.com" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(h.mailer.sent().len(), 2);
}

// -- Email lookup -------------------------------------------------------------

#[tokio::test]
async fn test_lookup_reports_each_account_state() {
    let h = Harness::new();

    let (status, _, body) = h.get("/v1/users/lookup?email=ghost%40example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": false, "verified": false }));

    h.sign_up("Jane Doe", "jane@example.com", "password1").await;
    let (_, _, body) = h.get("/v1/users/lookup?email=jane%40example.com", None).await;
    assert_eq!(
        body,
        json!({ "exists": true, "verified": false, "displayName": "Jane Doe" })
    );

    let token = h.mailed_token("jane@example.com");
    h.get(&format!("/v1/auth/verify-email?token={token}"), None)
        .await;
    let (_, _, body) = h.get("/v1/users/lookup?email=JANE%40example.com", None).await;
    assert_eq!(body["verified"], true);
}

#[tokio::test]
async fn test_lookup_validates_input() {
    let h = Harness::new();
    let (status, _, _) = h.get("/v1/users/lookup", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = h.get("/v1/users/lookup?email=not-an-email", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "email");
}

// -- Sign-in & sessions -------------------------------------------------------

#[tokio::test]
async fn test_unverified_account_cannot_sign_in() {
    let h = Harness::new();
    h.sign_up("Jane", "jane@example.com", "password1").await;
    let (status, _, body) = h.sign_in("jane@example.com", "password1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "EMAIL_NOT_VERIFIED");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let h = Harness::new();
    h.verified_user("Jane", "jane@example.com", "password1").await;

    let (status, _, wrong) = h.sign_in("jane@example.com", "password2").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, unknown) = h.sign_in("ghost@example.com", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(wrong["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_sign_in_session_and_sign_out() {
    let h = Harness::new();
    h.verified_user("Jane Doe", "jane@example.com", "password1")
        .await;

    let (status, headers, body) = h.sign_in("jane@example.com", "password1").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["name"], "Jane Doe");
    assert!(headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains(&token));

    let (status, _, session) = h.get("/v1/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["email"], "jane@example.com");
    assert_eq!(session["session"]["userId"], body["user"]["id"]);

    let (status, headers, _) = h
        .json(Method::POST, "/v1/auth/sign-out", json!({}), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let (status, _, _) = h.get("/v1/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let h = Harness::new();
    let token = h.verified_user("Jane", "jane@example.com", "password1").await;
    let request = Request::builder()
        .uri("/v1/profile")
        .header(header::COOKIE, format!("reel.session_token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = h.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@example.com");
}

// -- Social sign-in -----------------------------------------------------------

#[tokio::test]
async fn test_social_sign_in_without_google_config_is_503() {
    let h = Harness::new();
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/sign-in/social",
            json!({ "provider": "google" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_social_sign_in_returns_authorization_url() {
    let config = AppConfig {
        google: Some(reel_api::oauth::GoogleOAuthConfig::new(
            "client-1".into(),
            "secret".into(),
            "http://localhost:8080",
        )),
        ..AppConfig::default()
    };
    let h = Harness::with(config, None);
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/sign-in/social",
            json!({ "provider": "Google", "callbackURL": "/movies" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], true);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=client-1"));
}

#[tokio::test]
async fn test_social_sign_in_unknown_provider() {
    let h = Harness::new();
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/sign-in/social",
            json!({ "provider": "myspace" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "provider");
}

// -- Password reset -----------------------------------------------------------

#[tokio::test]
async fn test_password_reset_revokes_sessions() {
    let h = Harness::new();
    let session = h.verified_user("Jane", "jane@example.com", "password1").await;

    let (status, _, _) = h
        .json(
            Method::POST,
            "/v1/auth/forgot-password",
            json!({ "email": "jane@example.com" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let mail = h.mailer.last_to("jane@example.com").unwrap();
    assert_eq!(mail.subject, "Reset your password");
    let token = link_param(&mail.text, "token").unwrap();

    let (status, _, _) = h
        .json(
            Method::POST,
            "/v1/auth/reset-password",
            json!({
                "token": token,
                "newPassword": "new-password",
                "confirmPassword": "new-password",
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = h.get("/v1/profile", Some(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = h.sign_in("jane@example.com", "password1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = h.sign_in("jane@example.com", "new-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let h = Harness::new();
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/forgot-password",
            json!({ "email": "ghost@example.com" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_reset_with_unknown_token() {
    let h = Harness::new();
    let (status, _, body) = h
        .json(
            Method::POST,
            "/v1/auth/reset-password",
            json!({
                "token": "nope",
                "newPassword": "new-password",
                "confirmPassword": "new-password",
            }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

// -- Profile & account fetch --------------------------------------------------

#[tokio::test]
async fn test_profile_requires_session() {
    let h = Harness::new();
    let (status, _, body) = h.get("/v1/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_profile_name_update() {
    let h = Harness::new();
    let token = h.verified_user("Jane", "jane@example.com", "password1").await;

    let (status, _, body) = h
        .json(
            Method::PATCH,
            "/v1/profile",
            json!({ "name": "Janet Doe" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Janet Doe");

    let (status, _, body) = h
        .json(Method::PATCH, "/v1/profile", json!({ "name": " " }), Some(&token))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "name");

    let (_, _, body) = h.get("/v1/profile", Some(&token)).await;
    assert_eq!(body["name"], "Janet Doe");
}

#[tokio::test]
async fn test_user_fetch_is_limited_to_own_record() {
    let h = Harness::new();
    let jane = h.verified_user("Jane", "jane@example.com", "password1").await;
    let john = h.verified_user("John", "john@example.com", "password1").await;

    let (_, _, me) = h.get("/v1/profile", Some(&jane)).await;
    let jane_id = me["id"].as_str().unwrap().to_string();

    let (status, _, body) = h.get(&format!("/v1/users/{jane_id}"), Some(&jane)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@example.com");

    let (status, _, _) = h.get(&format!("/v1/users/{jane_id}"), Some(&john)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = h.get("/v1/users/not-a-uuid", Some(&jane)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Movie catalog proxy ------------------------------------------------------

async fn catalog_harness(server: &MockServer) -> Harness {
    let config = CatalogConfig::with_base_url(&server.uri(), "test-token").unwrap();
    let catalog = CatalogClient::new(config).unwrap();
    Harness::with(AppConfig::default(), Some(catalog))
}

#[tokio::test]
async fn test_movies_return_503_without_catalog() {
    let h = Harness::new();
    for uri in ["/v1/movies", "/v1/movies/550", "/v1/movies/search?query=x"] {
        let (status, _, body) = h.get(uri, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }
}

#[tokio::test]
async fn test_popular_movies_are_proxied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(header_matcher("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                { "id": 550, "title": "Fight Club", "poster_path": "/a.jpg", "release_date": "1999-10-15" }
            ],
            "total_pages": 1,
            "total_results": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = catalog_harness(&server).await;
    let (status, _, body) = h.get("/v1/movies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["title"], "Fight Club");
    assert_eq!(body["results"][0]["poster_path"], "/a.jpg");
}

#[tokio::test]
async fn test_search_forwards_query_and_tolerates_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "zzz qqq"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 1, "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let h = catalog_harness(&server).await;
    let (status, _, body) = h.get("/v1/movies/search?query=zzz%20qqq", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_search_validates_query() {
    let server = MockServer::start().await;
    let h = catalog_harness(&server).await;

    let (status, _, _) = h.get("/v1/movies/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = h.get("/v1/movies/search?query=%20%20", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"]["field"], "query");
}

#[tokio::test]
async fn test_unknown_movie_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    let h = catalog_harness(&server).await;
    let (status, _, body) = h.get("/v1/movies/999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_genre_is_fetched_in_polish() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genre/movie/28"))
        .and(query_param("language", "pl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 28, "name": "Akcja" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = catalog_harness(&server).await;
    let (status, _, body) = h.get("/v1/movies/genre/28", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Akcja");
}

#[tokio::test]
async fn test_catalog_failure_is_502_without_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database on fire"))
        .mount(&server)
        .await;

    let h = catalog_harness(&server).await;
    let (status, _, body) = h.get("/v1/movies", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(body["error"]["message"], "Failed to fetch data");
}

// -- Rate limiting ------------------------------------------------------------

#[tokio::test]
async fn test_lookup_is_rate_limited() {
    let config = AppConfig {
        rate_limit: RateLimitConfig {
            max_requests: 2,
            window_secs: 60,
        },
        ..AppConfig::default()
    };
    let h = Harness::with(config, None);
    for _ in 0..2 {
        let (status, _, _) = h.get("/v1/users/lookup?email=a%40example.com", None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _, body) = h.get("/v1/users/lookup?email=a%40example.com", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Health probes sit outside the limiter.
    let (status, _, _) = h.get("/health/liveness", None).await;
    assert_eq!(status, StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_lists_routes() {
    let h = Harness::new();
    let (status, _, body) = h.get("/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    for expected in [
        "/v1/auth/sign-in/email",
        "/v1/users/lookup",
        "/v1/profile",
        "/v1/movies/search",
    ] {
        assert!(paths.contains_key(expected), "missing {expected}");
    }
}
