//! Mobile-verification OTP state machine.
//!
//! Per (mobile, user) pair: absent -> pending -> verified, or pending ->
//! exhausted/expired -> absent. Expiry is enforced store-side; a vanished
//! record is indistinguishable from one that was never issued, and that
//! ambiguity is deliberate.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use domains::{AppError, OtpRecord, OtpRepo};

/// Codes live this long before the store reaps them.
pub const OTP_TTL_MINUTES: i64 = 5;
/// Wrong guesses tolerated before the record is destroyed.
pub const MAX_ATTEMPTS: i32 = 3;

/// Successful verify outcomes. A wrong code is an outcome, not an error:
/// it carries the remaining-attempts count the client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
    Verified,
    /// `remaining` may be 0: the next wrong attempt will exhaust the record.
    WrongCode { remaining: i32 },
}

#[derive(Error, Debug)]
pub enum OtpVerifyError {
    /// Never issued, already consumed, or expired — indistinguishable by
    /// design so callers cannot probe which it was.
    #[error("no verification code found for this number")]
    NotFound,

    #[error("this code was already used")]
    AlreadyUsed,

    /// The record has been destroyed; a fresh issue is required.
    #[error("too many wrong attempts, request a new code")]
    AttemptsExhausted,

    #[error(transparent)]
    Store(#[from] AppError),
}

pub struct OtpService {
    otps: Arc<dyn OtpRepo>,
}

impl OtpService {
    pub fn new(otps: Arc<dyn OtpRepo>) -> Self {
        Self { otps }
    }

    /// Issues a fresh 6-digit code for the pair, collapsing any prior record
    /// first so at most one live code exists. Returns the code; delivery is
    /// out of band.
    pub async fn issue(&self, mobile: &str, user: Uuid) -> Result<String, AppError> {
        self.otps.delete_pair(mobile, user).await?;

        let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        let now = Utc::now();
        self.otps
            .insert(&OtpRecord {
                mobile: mobile.to_owned(),
                user_id: user,
                code: code.clone(),
                attempts: 0,
                verified: false,
                expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
                created_at: now,
            })
            .await?;

        info!(%user, "issued verification code");
        Ok(code)
    }

    pub async fn verify(
        &self,
        mobile: &str,
        user: Uuid,
        candidate: &str,
    ) -> Result<OtpOutcome, OtpVerifyError> {
        let record = self
            .otps
            .find_live(mobile, user)
            .await?
            .ok_or(OtpVerifyError::NotFound)?;

        if record.verified {
            return Err(OtpVerifyError::AlreadyUsed);
        }
        // Normally unreachable: the last tolerated guess destroys the record
        // below. Covers a leftover from racing verifies.
        if record.attempts >= MAX_ATTEMPTS {
            self.otps.delete_pair(mobile, user).await?;
            return Err(OtpVerifyError::AttemptsExhausted);
        }

        if record.code != candidate {
            // Atomic in the store: parallel wrong guesses each consume an
            // attempt, never share one.
            let attempts = self.otps.bump_attempts(mobile, user).await?;
            if attempts >= MAX_ATTEMPTS {
                // Guess budget spent: the record dies with this reply, and
                // the next verify reads as never issued.
                self.otps.delete_pair(mobile, user).await?;
            }
            return Ok(OtpOutcome::WrongCode {
                remaining: (MAX_ATTEMPTS - attempts).max(0),
            });
        }

        self.otps.mark_verified(mobile, user).await?;
        info!(%user, "mobile number verified");
        Ok(OtpOutcome::Verified)
    }
}
