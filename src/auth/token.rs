use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::core::AuthConfig;
use crate::errors::AppError;
use crate::users::model::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Signs and verifies the short-lived access tokens (HS256).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_minutes: i64,
}

impl TokenIssuer {

    pub fn new(config: &AuthConfig) -> Self {
        TokenIssuer {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            expiry_minutes: config.access_token_minutes,
        }
    }

    pub fn issue(&self, user_id: i64, email: &str, role: UserRole) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            exp: (Utc::now() + Duration::minutes(self.expiry_minutes)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::ProcessingError(format!("Unable to sign token: {}", err)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token.".to_string()))
    }

}

/// Opaque random value, hex encoded. Used for refresh tokens and the
/// single-use verification/reset tokens.
pub fn random_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-time tokens are stored as their SHA-256 hex digest, never in the clear.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_minutes: 15,
        })
    }

    #[test]
    fn issued_tokens_verify() {
        let issuer = issuer();
        let token = issuer.issue(42, "a@example.org", UserRole::User).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@example.org");
        assert_eq!(claims.role, UserRole::User);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = issuer();
        let token = issuer.issue(42, "a@example.org", UserRole::User).unwrap();
        assert!(issuer.verify(&format!("{}x", token)).is_err());
        assert!(issuer.verify("not-a-token").is_err());
    }

    #[test]
    fn digests_are_stable_and_tokens_random() {
        assert_eq!(token_digest("abc"), token_digest("abc"));
        assert_ne!(random_token(32), random_token(32));
        assert_eq!(random_token(64).len(), 128);
    }
}
