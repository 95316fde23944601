//! # Cask Types
//!
//! Shared value types and collaborator contracts for the Cask blob store.
//!
//! This crate holds the small set of types the message format codec consumes
//! from the rest of the system without owning their implementation:
//!
//! - [`ContentKey`] / [`KeyFactory`] - the opaque key contract used to
//!   address the chunks of a composite blob
//! - Account and container id sentinels for schema versions that predate
//!   multi-tenant identification
//! - Time constants and the wall-clock helper used for creation timestamps
//!
//! The crate deliberately has no knowledge of wire layouts. The message
//! format codec owns all byte-level interpretation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod key;
mod tenancy;
mod time;

pub use key::{ContentKey, KeyError, KeyFactory, KeyResult};
pub use tenancy::{UNKNOWN_ACCOUNT_ID, UNKNOWN_CONTAINER_ID};
pub use time::{current_time_millis, INFINITE_TIME, MS_PER_SEC};
