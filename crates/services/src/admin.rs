//! Admin authorization predicate.
//!
//! The deployment has a single configured admin address; the rest of the
//! system only ever asks `is_admin(&user)`, so a future role table replaces
//! this struct without touching its callers.

use domains::User;

#[derive(Debug, Clone)]
pub struct AdminPolicy {
    admin_email: String,
}

impl AdminPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into(),
        }
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.email.eq_ignore_ascii_case(&self.admin_email)
    }
}
