//! # Cask Testkit
//!
//! Deterministic test collaborators for exercising the Cask message format:
//! mock content keys, random payloads, and byte-corruption helpers used by
//! bit-rot tests.
//!
//! Nothing here is meant for production use.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod data;
mod keys;

pub use data::{corrupt_byte, random_bytes};
pub use keys::{MockKey, MockKeyFactory};
