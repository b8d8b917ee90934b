//! Shared test helpers for integration tests.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use serde_json::Value;
use tower::ServiceExt;

use guardpost_api::middleware::RouterGuardExt;
use guardpost_api::{AppState, AuthPrincipal};
use guardpost_core::config::AppConfig;
use guardpost_core::config::auth::{AuthConfig, GuardConfig, KeyConfig, KeyRole, TokenLocation};
use guardpost_core::config::logging::LoggingConfig;
use guardpost_core::config::revocation::RevocationConfig;

/// HMAC secret shared by all test guards.
pub const TEST_SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Shared state, for issuing tokens and inspecting the registry.
    pub state: AppState,
}

/// Response captured from a test request.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Builds an app with guards `api`, `admin`, and cookie-based `web`,
    /// and the given default guard.
    pub async fn new(default_guard: Option<&str>) -> Self {
        let state = AppState::from_config(test_config(default_guard))
            .await
            .expect("Failed to build test state");
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// Issues a token under the named guard.
    pub fn issue(&self, guard: &str, subject: &str) -> String {
        self.state
            .registry
            .get(guard)
            .expect("guard not registered")
            .tokens()
            .issue(subject, serde_json::Map::new())
            .expect("Failed to issue token")
            .token
    }

    /// Performs a GET request with optional bearer token and cookie.
    pub async fn get(
        &self,
        path: &str,
        bearer: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body is not JSON")
        };

        TestResponse { status, body }
    }
}

/// Config with one signing key and three guards.
pub fn test_config(default_guard: Option<&str>) -> AppConfig {
    AppConfig {
        auth: AuthConfig {
            leeway_seconds: 0,
            default_guard: default_guard.map(String::from),
            keys: vec![KeyConfig {
                kid: "k1".to_string(),
                secret: base64::engine::general_purpose::STANDARD.encode(TEST_SECRET),
                role: KeyRole::Signing,
            }],
            guards: HashMap::from([
                ("api".to_string(), GuardConfig::default()),
                ("admin".to_string(), GuardConfig::default()),
                (
                    "web".to_string(),
                    GuardConfig {
                        locations: vec![TokenLocation::Cookie {
                            name: "gp_token".to_string(),
                        }],
                        ..GuardConfig::default()
                    },
                ),
            ]),
        },
        revocation: RevocationConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Handler reporting which guard authenticated the request.
pub async fn whoami(auth: AuthPrincipal) -> Json<Value> {
    Json(serde_json::json!({
        "subject": auth.subject,
        "guard": auth.guard,
        "token_id": auth.token_id,
    }))
}

/// Router with one route per test surface.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/profile", get(whoami))
        .with_guard("api", state.clone());

    let admin_routes = Router::new()
        .route("/admin/users", get(whoami))
        .with_guard("admin", state.clone());

    let web_routes = Router::new()
        .route("/web/home", get(whoami))
        .with_guard("web", state.clone());

    // No guard metadata: authentication falls back to the default guard.
    let open_routes = Router::new().route("/open", get(whoami));

    Router::new()
        .merge(api_routes)
        .merge(admin_routes)
        .merge(web_routes)
        .merge(open_routes)
        .with_state(state)
}
