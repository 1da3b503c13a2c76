//! Bearer-token auth (HS256 class, §6 "Authentication is bearer-token
//! with a shared secret"), grounded on the teacher family's
//! `JwtService` (`everruns-everruns/crates/control-plane/src/auth/jwt.rs`):
//! one symmetric secret, one claims shape, encode/decode wrapped behind a
//! small service so handlers never touch `jsonwebtoken` directly.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::ApiState;

/// The admin token's claims: just who it was issued for and when it
/// expires. There is no role/scope system here — every holder of a
/// valid token gets full admin access, matching §6's "shared secret"
/// wording (no per-user session state).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self { encoding_key: EncodingKey::from_secret(secret.as_bytes()), decoding_key: DecodingKey::from_secret(secret.as_bytes()), validation: Validation::default() }
    }

    /// Issue a token for `subject`, valid for `lifetime`.
    pub fn issue(&self, subject: &str, lifetime: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims { sub: subject.to_owned(), iat: now.timestamp(), exp: (now + lifetime).timestamp() };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Rejects any request without a valid `Authorization: Bearer <token>`
/// header (§6, §7 "Auth failures: 401").
pub async fn require_bearer_token(State(state): State<ApiState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(token).map_err(|_| ApiError::Unauthorized)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_back_to_the_same_subject() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.issue("admin", Duration::hours(1)).unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn expired_token_fails_verification() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.issue("admin", Duration::seconds(-1)).unwrap();
        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn token_signed_with_a_different_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.issue("admin", Duration::hours(1)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }
}
