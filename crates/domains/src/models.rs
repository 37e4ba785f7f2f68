//! # Domain Models
//!
//! The entities of the SellBUY marketplace. All timestamps are UTC and all
//! identifiers are UUID v4; wire spellings of the enums (`"BH-1"`,
//! `"Like New"`, ...) are fixed here so the HTTP layer and the store agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Generates a plain-text-backed enum: serde wire spelling, `as_str` for the
/// store, `FromStr` for parsing query parameters.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self { $(Self::$variant => $text,)+ }
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(AppError::Validation(format!(
                        concat!("invalid ", stringify!($name), " value: {}"),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Campus pickup spots. Listings are constrained to this set.
    Location {
        Bh1 => "BH-1",
        Bh2 => "BH-2",
        Bh3 => "BH-3",
        Bh4 => "BH-4",
        Gh1 => "GH-1",
        Gh2 => "GH-2",
        AcademicBlock => "Academic Block",
        MainGate => "Main Gate",
    }
}

text_enum! {
    Condition {
        New => "New",
        LikeNew => "Like New",
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
    }
}

text_enum! {
    /// How long the seller has owned the item.
    AgeBucket {
        UnderSixMonths => "0-6 months",
        SixToTwelveMonths => "6-12 months",
        OneToTwoYears => "1-2 years",
        OverTwoYears => "2+ years",
    }
}

text_enum! {
    ContactPreference {
        Chat => "Chat",
        Call => "Call",
        Both => "Both",
    }
}

text_enum! {
    /// Sale lifecycle, owner-controlled.
    ProductStatus {
        Available => "Available",
        Sold => "Sold",
    }
}

text_enum! {
    /// Moderation visibility, admin-controlled. Independent of [`ProductStatus`];
    /// all four combinations are valid.
    ApprovalStatus {
        Approved => "Approved",
        Hidden => "Hidden",
    }
}

text_enum! {
    /// Support-ticket state. Transitions are forward-only:
    /// Unread -> Read -> Resolved, or Unread -> Resolved directly.
    MessageStatus {
        Unread => "unread",
        Read => "read",
        Resolved => "resolved",
    }
}

text_enum! {
    ExitReason {
        TooManyFields => "too-many-fields",
        ChangedMind => "changed-mind",
        PriceDoubt => "price-doubt",
        JustBrowsing => "just-browsing",
        TechnicalIssue => "technical-issue",
        Other => "other",
    }
}

text_enum! {
    ExitTrigger {
        CloseButton => "close-button",
        BackNavigation => "back-navigation",
        TabClose => "tab-close",
    }
}

text_enum! {
    DeviceType {
        Mobile => "mobile",
        Tablet => "tablet",
        Desktop => "desktop",
    }
}

text_enum! {
    /// Which credential produced a session token. Google sessions get a
    /// longer expiry than password sessions.
    LoginMethod {
        Password => "password",
        Google => "google",
    }
}

/// An account. Created at signup or on first Google login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string. `None` for Google-only accounts. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub mobile: Option<String>,
    pub mobile_verified: bool,
    pub google_id: Option<String>,
    pub liked_products: Vec<Uuid>,
    pub is_blocked: bool,
    pub blocked_reason: Option<String>,
    pub blocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A listing. Exactly one owner; one or two image references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Kept as text; numeric filters parse at read time and skip
    /// non-numeric values rather than rejecting the row.
    pub price: String,
    pub negotiable: bool,
    pub category: String,
    pub images: Vec<String>,
    pub location: Location,
    pub condition: Condition,
    pub age: AgeBucket,
    pub external_url: Option<String>,
    pub contact: ContactPreference,
    pub status: ProductStatus,
    pub approval: ApprovalStatus,
    pub hidden_reason: Option<String>,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price as a number, if the stored text parses as one.
    pub fn numeric_price(&self) -> Option<f64> {
        self.price.trim().parse::<f64>().ok()
    }
}

/// Validated input for a new listing; the workflow fills in ids, defaults
/// and timestamps.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub negotiable: bool,
    pub category: String,
    pub location: Location,
    pub condition: Condition,
    pub age: AgeBucket,
    pub external_url: Option<String>,
    pub contact: ContactPreference,
}

/// Partial update to a listing. `None` means "keep the stored value".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub negotiable: Option<bool>,
    pub category: Option<String>,
    pub location: Option<Location>,
    pub condition: Option<Condition>,
    pub age: Option<AgeBucket>,
    pub external_url: Option<String>,
    pub contact: Option<ContactPreference>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.negotiable.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.condition.is_none()
            && self.age.is_none()
            && self.external_url.is_none()
            && self.contact.is_none()
    }
}

/// Public-feed filter. Absent dimensions impose no constraint; all present
/// dimensions are intersected.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub location: Option<Location>,
    pub condition: Option<Condition>,
    pub status: Option<ProductStatus>,
    /// Case-insensitive substring over name, description and category.
    pub text: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// One live verification code per (mobile, user) pair.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub mobile: String,
    pub user_id: Uuid,
    pub code: String,
    pub attempts: i32,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A user-to-admin support ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub admin_reply: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Anonymous abandon-the-listing-form analytics, keyed by a client-generated
/// session id. Not linked to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitFeedback {
    pub session_id: String,
    pub reason: ExitReason,
    pub comment: Option<String>,
    pub completion_percent: i32,
    pub completed_fields: Vec<String>,
    pub exit_trigger: ExitTrigger,
    pub device: DeviceType,
    pub wanted_help: bool,
    pub created_at: DateTime<Utc>,
}

/// Listing tallies, straight from the product store.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCounts {
    pub total: i64,
    pub hidden: i64,
    pub sold: i64,
}

/// Account tallies, straight from the user store.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total: i64,
    pub blocked: i64,
}

/// Admin dashboard tallies, assembled across the stores.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub users: i64,
    pub blocked_users: i64,
    pub products: i64,
    pub hidden_products: i64,
    pub sold_products: i64,
    pub unread_messages: i64,
}

/// Claims extracted from a verified external id token.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
}
