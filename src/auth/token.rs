// Token service - self-contained HS256 bearer credentials.
//
// A token binds `sub` and `username` for its full lifetime; validity is a
// pure function of signature and expiry. Nothing is stored server-side and
// there is no revocation list.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::UserId;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject user id, stringified per JWT convention.
    sub: String,
    username: String,
    iat: i64,
    exp: i64,
}

/// Verified token payload handed to the authorization layer.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub username: String,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn issue(&self, user_id: UserId, username: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Side-effect-free verification: bad signature, malformed payload and
    /// expiry all collapse into `InvalidToken`.
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::InvalidToken("Invalid token".to_string()))?;

        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::InvalidToken("Invalid token".to_string()))?;

        Ok(TokenClaims {
            user_id,
            username: data.claims.username,
        })
    }
}
