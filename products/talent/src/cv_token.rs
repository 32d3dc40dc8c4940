//! Signed tokens that let the public portal render a candidate's CV without a login.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not issue candidate token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Issues tokens for public CV links.
pub trait CandidateTokenProvider: Send + Sync {
    fn generate_token(&self, candidate_number: &str, valid_days: i64) -> Result<String, TokenError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// HS256 tokens keyed by a shared secret.
#[derive(Clone)]
pub struct JwtTokenProvider {
    secret: String,
}

impl JwtTokenProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }

    pub fn decode(&self, token: &str) -> Result<CvClaims, TokenError> {
        Ok(
            jsonwebtoken::decode::<CvClaims>(token, &self.decoding_key(), &Validation::default())?
                .claims,
        )
    }
}

impl std::fmt::Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenProvider").finish_non_exhaustive()
    }
}

impl CandidateTokenProvider for JwtTokenProvider {
    fn generate_token(&self, candidate_number: &str, valid_days: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(Duration::days(valid_days))
            .unwrap_or(now)
            .timestamp() as usize;
        let claims = CvClaims {
            sub: candidate_number.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_decode_to_candidate_number() {
        let provider = JwtTokenProvider::new("test-secret");
        let token = provider.generate_token("0042", 365).unwrap();
        let claims = provider.decode(&token).unwrap();
        assert_eq!(claims.sub, "0042");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn other_secrets_are_rejected() {
        let token = JwtTokenProvider::new("one").generate_token("7", 1).unwrap();
        assert!(JwtTokenProvider::new("two").decode(&token).is_err());
    }
}
