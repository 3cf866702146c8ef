//! Identity verification.
//!
//! The storefront delegates sign-in to an external identity provider;
//! what reaches this API is an HS256 bearer token carrying the verified
//! uid, email, and an optional `admin` role claim. Admin access is
//! granted either by that claim or by a configured email allow-list.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ServiceError;

/// Token claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Buyer uid
    pub sub: String,
    pub email: String,
    /// Role claim set by the identity provider for staff accounts
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// A caller whose token has been verified.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(
                "admin role required".to_string(),
            ))
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    admin_allow_list: Vec<String>,
}

impl AuthService {
    pub fn new(jwt_secret: &str, admin_allow_list: Vec<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
            admin_allow_list,
        }
    }

    /// Verifies a bearer token and resolves the caller identity,
    /// applying the admin allow-list on top of the role claim.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| ServiceError::Unauthenticated(format!("invalid token: {e}")))?;

        let claims = data.claims;
        let is_admin = claims.admin
            || self
                .admin_allow_list
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&claims.email));

        Ok(AuthenticatedUser {
            uid: claims.sub,
            email: claims.email,
            is_admin,
        })
    }

    /// Issues a token for the given identity. Used by the test harness;
    /// in production tokens come from the identity provider.
    pub fn issue_token(
        &self,
        uid: &str,
        email: &str,
        admin: bool,
        ttl_secs: i64,
    ) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: uid.to_string(),
            email: email.to_string(),
            admin,
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {e}")))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ServiceError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthenticated("missing bearer token".to_string()))
}

#[async_trait]
impl FromRequestParts<crate::AppState> for AuthenticatedUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.auth.verify(token)
    }
}

/// Marker extractor for endpoints that require the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<crate::AppState> for AdminUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

pub type SharedAuthService = Arc<AuthService>;

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-with-plenty-of-entropy-0123456789";

    #[test]
    fn verify_round_trip() {
        let auth = AuthService::new(SECRET, vec![]);
        let token = auth.issue_token("u1", "buyer@example.com", false, 3600).unwrap();
        let user = auth.verify(&token).unwrap();
        assert_eq!(user.uid, "u1");
        assert_eq!(user.email, "buyer@example.com");
        assert!(!user.is_admin);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = AuthService::new("some-other-secret-with-entropy-abcdefgh", vec![]);
        let verifier = AuthService::new(SECRET, vec![]);
        let token = issuer.issue_token("u1", "buyer@example.com", false, 3600).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let auth = AuthService::new(SECRET, vec![]);
        let token = auth.issue_token("u1", "buyer@example.com", false, -120).unwrap();
        assert!(matches!(
            auth.verify(&token),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn admin_claim_grants_admin() {
        let auth = AuthService::new(SECRET, vec![]);
        let token = auth.issue_token("staff", "staff@label.example", true, 3600).unwrap();
        assert!(auth.verify(&token).unwrap().is_admin);
    }

    #[test]
    fn allow_list_grants_admin_without_claim() {
        let auth = AuthService::new(SECRET, vec!["boss@label.example".to_string()]);
        let token = auth.issue_token("boss", "Boss@Label.Example", false, 3600).unwrap();
        assert!(auth.verify(&token).unwrap().is_admin);

        let other = auth.issue_token("u2", "fan@example.com", false, 3600).unwrap();
        let user = auth.verify(&other).unwrap();
        assert!(!user.is_admin);
        assert!(matches!(
            user.require_admin(),
            Err(ServiceError::PermissionDenied(_))
        ));
    }
}
