use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{Identity, Role};
use crate::utils::AppError;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // account id (hex ObjectId)
    pub role: Role,
    pub iat: usize, // issued at
    pub exp: usize, // expiration
}

/// Issues and verifies HS256 bearer tokens. Stateless: nothing is stored server-side.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
}

impl TokenService {
    pub fn new(secret: &str, validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id.to_hex(),
            role: identity.role,
            iat: now.timestamp() as usize,
            exp: (now + self.validity).timestamp() as usize,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::unexpected(format!("Failed to generate token: {}", e)))
    }

    /// Fails with `Unauthenticated` on a bad signature, malformed payload or expiry.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {}", e);
                AppError::unauthenticated("Invalid token")
            })?;

        let id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthenticated("Invalid token"))?;

        Ok(Identity {
            id,
            role: claims.role,
        })
    }
}
