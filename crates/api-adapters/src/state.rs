//! State shared across all request handlers.

use std::sync::Arc;

use services::{AccountService, AdminPolicy, ListingService, SupportService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub listings: Arc<ListingService>,
    pub support: Arc<SupportService>,
    pub admin: AdminPolicy,
}

impl AppState {
    pub fn new(
        accounts: Arc<AccountService>,
        listings: Arc<ListingService>,
        support: Arc<SupportService>,
        admin: AdminPolicy,
    ) -> Self {
        Self {
            accounts,
            listings,
            support,
            admin,
        }
    }
}
