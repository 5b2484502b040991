use axum::{
    body::Body,
    http::{Request, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::auth::Claims;
use crate::config::ScopeMode;
use crate::{db, AppState};

pub const TEST_SECRET: &str = "test-secret";

/// An `AppState` over a fresh SQLite file with the schema applied.
///
/// Hold on to the returned `TempDir`; the database lives inside it.
pub fn test_app_state(scope_mode: ScopeMode) -> (AppState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let pool = db::open_pool(tmp.path().join("board.db")).expect("pool");
    db::run_migrations(&pool).expect("migrations");

    let state = AppState {
        db: pool,
        jwt_secret: TEST_SECRET.to_string(),
        scope_mode,
        redirect_to: "/contact.html".to_string(),
    };
    (state, tmp)
}

/// `Authorization` header value for `identity`.
pub fn bearer(identity: &str, secret: &str) -> String {
    let claims = Claims {
        sub: identity.to_string(),
        exp: (Utc::now() + Duration::days(30)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("jwt");
    format!("Bearer {token}")
}

pub fn form_post(uri: &str, body: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json")
}
