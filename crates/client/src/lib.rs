//! Typed REST client for the chanjo backend.
//!
//! The backend is the system of record for accounts, profiles, and the
//! administered-vaccine history. Every response body is deserialized into
//! an explicit wire type and converted to domain types at the boundary, so
//! malformed server data fails fast with a typed error instead of leaking
//! partial values into the schedule logic.

pub mod client;
pub mod error;
pub mod store;
mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use store::AdministeredStore;
