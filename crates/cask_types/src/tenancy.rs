//! Account and container id sentinels.
//!
//! Accounts and containers are managed by the identity service; the codec
//! only carries their integer ids. Schema versions that predate multi-tenant
//! support decode to these reserved sentinels.

/// Reserved account id for records written before account support existed.
pub const UNKNOWN_ACCOUNT_ID: i16 = -1;

/// Reserved container id for records written before container support existed.
pub const UNKNOWN_CONTAINER_ID: i16 = -1;
