//! Admin back-office REST client.
//!
//! Listings, search, detail views and deletes against the backend's
//! `/admin/...` endpoints. Requires a session cookie of a logged-in admin.

mod client;
mod table;
mod types;

pub use client::AdminClient;
pub use table::{render_page, render_stats, truncate_preview};
pub use types::{
    AdminRole, AdminUpdate, DeleteTarget, NewAdmin, Page, Pagination, Resource, Row, SearchScope,
    SystemStats,
};
