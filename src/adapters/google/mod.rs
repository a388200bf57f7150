//! Google Sheets provider: service account auth over OAuth, Drive v3 for
//! title lookup, Sheets v4 for metadata and values.

pub mod api;
pub mod auth;
pub mod client;

pub use client::{GoogleSession, GoogleSheets};
