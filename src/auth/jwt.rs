use crate::core::errors::BillSplitError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Id of the authenticated user.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and checks HS256 bearer tokens for logged-in users.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: String, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::try_seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)).unwrap_or(Duration::MAX),
        }
    }

    pub fn generate_token(&self, user_id: &str) -> Result<String, BillSplitError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| BillSplitError::InternalServerError("Token lifetime out of range".to_string()))?;
        self.sign(&Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, BillSplitError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| BillSplitError::InternalServerError(format!("Token signing failed: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, BillSplitError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| BillSplitError::Unauthorized(format!("Invalid token: {}", e)))
    }
}
