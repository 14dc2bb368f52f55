use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::services::{AdminError, ServiceResult};
use crate::session::Operator;

/// Claims carried by operator tokens issued at `/api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorClaims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl OperatorClaims {
    pub fn operator(&self) -> Operator {
        Operator {
            email: self.sub.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn issue(&self, operator: &Operator, ttl_hours: i64) -> ServiceResult<(String, i64)> {
        let now = Utc::now();
        let exp = (now + Duration::hours(ttl_hours)).timestamp();
        let claims = OperatorClaims {
            sub: operator.email.clone(),
            name: operator.name.clone(),
            role: operator.role.clone(),
            exp,
            iat: now.timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AdminError::Internal(format!("failed to sign token: {err}")))?;
        Ok((token, exp))
    }

    pub fn verify(&self, token: &str) -> Result<OperatorClaims, AuthError> {
        decode::<OperatorClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Rejection type returned when auth fails.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = match self {
            AuthError::MissingToken => "missing bearer token",
            AuthError::InvalidToken => "invalid token",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "error", "message": msg})),
        )
            .into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for OperatorClaims
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        JwtKeys::from_ref(state).verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let keys = JwtKeys::from_secret("test-secret");
        let operator = Operator {
            email: "ops@lumina.shop".into(),
            name: "Ops".into(),
            role: "admin".into(),
        };
        let (token, exp) = keys.issue(&operator, 1).unwrap();
        assert!(exp > Utc::now().timestamp());
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.operator(), operator);
        assert!(JwtKeys::from_secret("other").verify(&token).is_err());
    }
}
