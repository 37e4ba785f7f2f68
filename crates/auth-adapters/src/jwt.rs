//! JWT implementation of the `TokenCodec` port.
//!
//! Claims carry only the user id, the login method and expiry — never the
//! user record, and never any credential. Google sessions get a longer TTL
//! than password sessions; both are configured, not hardcoded.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{AppError, LoginMethod, Result, TokenCodec};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    method: LoginMethod,
    iat: i64,
    exp: i64,
}

pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    password_ttl: Duration,
    google_ttl: Duration,
}

impl JwtCodec {
    pub fn new(secret: &SecretString, password_token_hours: i64, google_token_hours: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            password_ttl: Duration::hours(password_token_hours),
            google_ttl: Duration::hours(google_token_hours),
        }
    }
}

impl TokenCodec for JwtCodec {
    fn issue(&self, user_id: Uuid, method: LoginMethod) -> Result<String> {
        let now = Utc::now();
        let ttl = match method {
            LoginMethod::Password => self.password_ttl,
            LoginMethod::Google => self.google_ttl,
        };
        let claims = Claims {
            sub: user_id,
            method,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AppError::internal)
    }

    fn decode(&self, token: &str) -> Result<Uuid> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))
    }
}
