//! Credential and identity adapters: argon2 password hashing, JWT session
//! tokens (feature `auth-jwt`), and Google id-token verification.

pub mod google;
pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use google::GoogleVerifier;
pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtCodec;
