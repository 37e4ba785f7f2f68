//! # Services
//!
//! The core SellBUY logic, written against the `domains` ports only: the
//! blocked-seller cache, the rolling listing quota, the OTP state machine,
//! the listing/moderation workflow, accounts, and the support desk.

pub mod accounts;
pub mod admin;
pub mod blocked_cache;
pub mod listings;
pub mod otp;
pub mod quota;
pub mod support;

pub use accounts::AccountService;
pub use admin::AdminPolicy;
pub use blocked_cache::BlockedSellerCache;
pub use listings::ListingService;
pub use otp::{OtpOutcome, OtpService, OtpVerifyError};
pub use quota::ListingQuota;
pub use support::SupportService;
