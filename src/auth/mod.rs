pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::AdminRole;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token does not carry admin claims")]
    AdminRequired,

    #[error("token does not carry user claims")]
    UserRequired,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Token claims. A user token carries `userId`; an admin token carries
/// `adminId`, `email` and `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    pub exp: i64,
    pub iat: i64,
}

/// Verified user identity attached to requests by `require_user`.
#[derive(Clone, Debug)]
pub struct UserIdentity {
    pub user_id: Uuid,
}

/// Verified admin identity attached to requests by `require_admin`.
#[derive(Clone, Debug)]
pub struct AdminIdentity {
    pub admin_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

impl Claims {
    pub fn user_identity(&self) -> Result<UserIdentity, AuthError> {
        match self.user_id {
            Some(user_id) => Ok(UserIdentity { user_id }),
            None => Err(AuthError::UserRequired),
        }
    }

    pub fn admin_identity(&self) -> Result<AdminIdentity, AuthError> {
        let admin_id = self.admin_id.ok_or(AuthError::AdminRequired)?;
        Ok(AdminIdentity {
            admin_id,
            email: self.email.clone().unwrap_or_default(),
            role: self.role.unwrap_or_default(),
        })
    }
}

/// Issues and verifies HS256 bearer tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        let hours = i64::try_from(security.jwt_expiry_hours).unwrap_or(24 * 7);
        Self::new(&security.jwt_secret, Duration::hours(hours))
    }

    pub fn issue_user(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        self.issue(&Claims {
            user_id: Some(user_id),
            admin_id: None,
            email: None,
            role: None,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        })
    }

    pub fn issue_admin(&self, admin_id: Uuid, email: &str, role: AdminRole) -> Result<String, AuthError> {
        let now = Utc::now();
        self.issue(&Claims {
            user_id: None,
            admin_id: Some(admin_id),
            email: Some(email.to_string()),
            role: Some(role),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        })
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or(AuthError::MissingToken)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-secret", Duration::days(7))
    }

    #[test]
    fn user_token_roundtrip() {
        let id = Uuid::new_v4();
        let token = codec().issue_user(id).unwrap();
        let claims = codec().verify(&token).unwrap();
        assert_eq!(claims.user_id, Some(id));
        assert!(claims.admin_id.is_none());
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn user_token_lacks_admin_scope() {
        let token = codec().issue_user(Uuid::new_v4()).unwrap();
        let claims = codec().verify(&token).unwrap();
        assert!(matches!(claims.admin_identity(), Err(AuthError::AdminRequired)));
    }

    #[test]
    fn admin_token_carries_identity() {
        let id = Uuid::new_v4();
        let token = codec()
            .issue_admin(id, "root@example.com", AdminRole::Superadmin)
            .unwrap();
        let identity = codec().verify(&token).unwrap().admin_identity().unwrap();
        assert_eq!(identity.admin_id, id);
        assert_eq!(identity.email, "root@example.com");
        assert_eq!(identity.role, AdminRole::Superadmin);
    }

    #[test]
    fn expired_token_rejected() {
        let now = Utc::now();
        let token = codec()
            .issue(&Claims {
                user_id: Some(Uuid::new_v4()),
                admin_id: None,
                email: None,
                role: None,
                iat: (now - Duration::days(8)).timestamp(),
                exp: (now - Duration::days(1)).timestamp(),
            })
            .unwrap();
        assert!(matches!(codec().verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenCodec::new("other", Duration::days(7))
            .issue_user(Uuid::new_v4())
            .unwrap();
        assert!(codec().verify(&token).is_err());
        assert!(codec().verify("not.a.jwt").is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AuthError::MissingToken)));
        assert!(matches!(bearer_token(Some("Bearer   ")), Err(AuthError::MissingToken)));
    }
}
