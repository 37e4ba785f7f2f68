//! Account lifecycle: signup, logins, mobile verification, wishlist.
//!
//! Session tokens carry only the user id and login method; every
//! authenticated request re-fetches the account, so a block takes effect on
//! the very next call even against a still-valid token.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use domains::{
    AppError, IdentityVerifier, LoginMethod, PasswordHasher, Result, TokenCodec, User, UserRepo,
};

use crate::otp::{OtpOutcome, OtpService, OtpVerifyError};

pub struct AccountService {
    users: Arc<dyn UserRepo>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
    identity: Arc<dyn IdentityVerifier>,
    otp: OtpService,
    /// Signups are restricted to this email domain.
    allowed_domain: String,
}

/// A signed-in session: the account plus its bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
        identity: Arc<dyn IdentityVerifier>,
        otp: OtpService,
        allowed_domain: impl Into<String>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            identity,
            otp,
            allowed_domain: allowed_domain.into(),
        }
    }

    pub async fn signup(&self, email: &str, username: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_ascii_lowercase();
        if username.trim().is_empty() {
            return Err(AppError::Validation("username is required".into()));
        }
        if password.len() < 6 {
            return Err(AppError::Validation(
                "password must be at least 6 characters".into(),
            ));
        }
        self.require_allowed_domain(&email)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "an account with this email already exists".into(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            username: username.trim().to_owned(),
            password_hash: Some(self.hasher.hash(password)?),
            mobile: None,
            mobile_verified: false,
            google_id: None,
            liked_products: vec![],
            is_blocked: false,
            blocked_reason: None,
            blocked_at: None,
            created_at: Utc::now(),
        };
        self.users.insert(&user).await?;
        info!(user = %user.id, "account created");

        let token = self.tokens.issue(user.id, LoginMethod::Password)?;
        Ok(Session { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_ascii_lowercase();
        // One failure message for bad email and bad password; no probing.
        let invalid = || AppError::Unauthorized("invalid email or password".into());

        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !self.hasher.verify(password, hash) {
            return Err(invalid());
        }
        self.reject_blocked(&user)?;

        let token = self.tokens.issue(user.id, LoginMethod::Password)?;
        Ok(Session { user, token })
    }

    /// Verifies an external id token and upserts the account by email.
    pub async fn google_login(&self, id_token: &str) -> Result<Session> {
        let identity = self.identity.verify(id_token).await?;
        let email = identity.email.trim().to_ascii_lowercase();
        self.require_allowed_domain(&email)?;

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => {
                if user.google_id.is_none() {
                    self.users.attach_google_id(user.id, &identity.subject).await?;
                }
                user
            }
            None => {
                let username = identity
                    .name
                    .unwrap_or_else(|| email.split('@').next().unwrap_or("student").to_owned());
                let user = User {
                    id: Uuid::new_v4(),
                    email,
                    username,
                    password_hash: None,
                    mobile: None,
                    mobile_verified: false,
                    google_id: Some(identity.subject),
                    liked_products: vec![],
                    is_blocked: false,
                    blocked_reason: None,
                    blocked_at: None,
                    created_at: Utc::now(),
                };
                self.users.insert(&user).await?;
                info!(user = %user.id, "account created via google");
                user
            }
        };
        self.reject_blocked(&user)?;

        let token = self.tokens.issue(user.id, LoginMethod::Google)?;
        Ok(Session { user, token })
    }

    /// Resolves a bearer token to a live account. Blocked users are rejected
    /// here, so a block takes effect without waiting for token expiry.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let id = self.tokens.decode(token)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown account".into()))?;
        self.reject_blocked(&user)?;
        Ok(user)
    }

    // ── Mobile verification ─────────────────────────────────────────────

    /// Stores the new number unverified and issues a code for it.
    pub async fn request_otp(&self, user: &User, mobile: &str) -> Result<String> {
        let mobile = mobile.trim();
        if !is_plausible_mobile(mobile) {
            return Err(AppError::Validation("invalid mobile number".into()));
        }
        if user.mobile.as_deref() != Some(mobile) {
            self.users.update_mobile(user.id, mobile).await?;
            self.users.set_mobile_verified(user.id, false).await?;
        }
        self.otp.issue(mobile, user.id).await
    }

    /// Changes the account's number directly. The new number starts
    /// unverified until an OTP round succeeds for it.
    pub async fn update_mobile(&self, user: &User, mobile: &str) -> Result<()> {
        let mobile = mobile.trim();
        if !is_plausible_mobile(mobile) {
            return Err(AppError::Validation("invalid mobile number".into()));
        }
        self.users.update_mobile(user.id, mobile).await?;
        self.users.set_mobile_verified(user.id, false).await?;
        Ok(())
    }

    pub async fn verify_otp(
        &self,
        user: &User,
        mobile: &str,
        code: &str,
    ) -> std::result::Result<OtpOutcome, OtpVerifyError> {
        let outcome = self.otp.verify(mobile.trim(), user.id, code).await?;
        if outcome == OtpOutcome::Verified {
            self.users.set_mobile_verified(user.id, true).await?;
        }
        Ok(outcome)
    }

    // ── Wishlist ────────────────────────────────────────────────────────

    /// Flips the liked state for the product; returns `true` when the call
    /// left it liked.
    pub async fn toggle_like(&self, user: &User, product: Uuid) -> Result<bool> {
        let liked = user.liked_products.contains(&product);
        self.users.set_like(user.id, product, !liked).await?;
        Ok(!liked)
    }

    // ── Admin ───────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list_all().await
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn require_allowed_domain(&self, email: &str) -> Result<()> {
        match email.rsplit_once('@') {
            Some((local, domain))
                if !local.is_empty() && domain.eq_ignore_ascii_case(&self.allowed_domain) =>
            {
                Ok(())
            }
            _ => Err(AppError::Validation(format!(
                "signups are restricted to @{} addresses",
                self.allowed_domain
            ))),
        }
    }

    fn reject_blocked(&self, user: &User) -> Result<()> {
        if user.is_blocked {
            return Err(AppError::Forbidden(
                "this account has been blocked by the moderators".into(),
            ));
        }
        Ok(())
    }
}

fn is_plausible_mobile(mobile: &str) -> bool {
    let digits = mobile.strip_prefix('+').unwrap_or(mobile);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
