//! Shared contracts for the gamedb resource database.
//!
//! This crate holds the leaf types every other gamedb crate builds on:
//!
//! - [`Record`] - A loadable entry, and the [`Record::empty`] sentinel returned
//!   by lookups that find nothing.
//! - [`Provider`] - Strategy that asynchronously loads a typed asset by key.
//! - [`LoadResult`] - Value returned by every load, successful or not.
//! - [`Lifetime`] - Cancellation scope passed to every suspending operation.
//!
//! Concrete providers live in `gamedb_providers`; categories and the resolution
//! engine live in `gamedb_database`.

pub mod lifetime;
pub mod provider;
pub mod record;
pub mod tracing_setup;

pub use lifetime::Lifetime;
pub use provider::{
    Asset, AssetType, CANCELLED_ERROR, LoadResult, NOT_FOUND_ERROR, Provider, ProviderExt,
    ProviderFault,
};
pub use record::{EMPTY_RECORD_ID, Record, eq_ignore_case};
