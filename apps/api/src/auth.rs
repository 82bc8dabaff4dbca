//! Authentication module.
//!
//! Handles JWT issuing and validation, password hashing, and the
//! [`CurrentUser`] extractor every protected handler takes.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! CurrentUser::from_request_parts ── missing / bad / expired ──► 401
//!        │
//!        ▼
//! user.authorize(Operation::X) ── role not in POLICY ──► 403
//!        │
//!        ▼
//! ledger operation
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use warung_core::access::{is_allowed, Operation, Role};
use warung_core::User;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub username: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issues a token carrying the user's id and role.
    pub fn generate_token(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to generate token");
            ApiError::internal()
        })
    }

    /// Validates signature and expiry, then decodes the claims.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::unauthorized("Token expired")
                }
                _ => ApiError::unauthorized("Invalid token"),
            })
    }
}

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password for storage (argon2id, random salt).
///
/// Argon2 is CPU-heavy, so it runs on the blocking pool.
pub async fn hash_password(password: &str) -> ApiResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password_sync(&password))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {e}");
            ApiError::internal()
        })?
}

/// Verifies a password against a stored hash on the blocking pool.
///
/// A malformed hash never matches.
pub async fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password_sync(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {e}");
            ApiError::internal()
        })
}

fn hash_password_sync(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            ApiError::internal()
        })
}

fn verify_password_sync(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Bearer Extraction
// =============================================================================

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Reads and validates the bearer token from request headers.
    pub fn from_headers(headers: &HeaderMap, jwt: &JwtManager) -> ApiResult<Self> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

        let claims = jwt.validate_token(token).inspect_err(|e| {
            warn!(reason = %e.message, "Rejected bearer token");
        })?;

        let id = claims
            .sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Malformed token subject"))?;

        Ok(CurrentUser {
            id,
            username: claims.username,
            role: claims.role,
        })
    }

    /// Checks the access policy; denial is a 403.
    pub fn authorize(&self, operation: Operation) -> ApiResult<()> {
        if is_allowed(self.role, operation) {
            return Ok(());
        }

        warn!(
            user = %self.username,
            role = %self.role,
            ?operation,
            "Operation denied by policy"
        );
        Err(ApiError::forbidden(format!(
            "Role '{}' may not perform this operation",
            self.role
        )))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = CurrentUser::from_headers(&parts.headers, &state.jwt)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(role: Role) -> User {
        User {
            id: 7,
            username: "sari".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);

        let token = manager.generate_token(&user(Role::Kasir)).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "sari");
        assert_eq!(claims.role, Role::Kasir);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("secret-a", 3600)
            .generate_token(&user(Role::Admin))
            .unwrap();

        let err = JwtManager::new("secret-b", 3600)
            .validate_token(&token)
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway.
        let manager = JwtManager::new("test-secret", -120);
        let token = manager.generate_token(&user(Role::Admin)).unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.message, "Token expired");
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let hash = hash_password("rahasia123").await.unwrap();

        assert_ne!(hash, "rahasia123");
        assert!(verify_password("rahasia123", &hash).await.unwrap());
        assert!(!verify_password("salah", &hash).await.unwrap());
        assert!(!verify_password("rahasia123", "not-a-hash").await.unwrap());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("abc"), None);
    }

    #[test]
    fn test_current_user_from_headers() {
        let manager = JwtManager::new("test-secret", 3600);
        let token = manager.generate_token(&user(Role::Admin)).unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(
            CurrentUser::from_headers(&headers, &manager).unwrap_err().status,
            axum::http::StatusCode::UNAUTHORIZED
        );

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        let current = CurrentUser::from_headers(&headers, &manager).unwrap();
        assert_eq!(current.id, 7);
        assert_eq!(current.role, Role::Admin);
    }

    #[test]
    fn test_authorize_uses_policy() {
        let kasir = CurrentUser {
            id: 1,
            username: "budi".to_string(),
            role: Role::Kasir,
        };

        assert!(kasir.authorize(Operation::CreateTransaction).is_ok());
        let err = kasir.authorize(Operation::DeleteTransaction).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }
}
