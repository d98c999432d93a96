//! Resolvers for the two inputs of an update
//!
//! Both resolvers hand back a [`crate::pending::Pending`] so the caller can
//! launch them and await the single result when it needs it.

pub mod address;
pub mod zone;

pub use address::{AddressResolver, AddressSources, parse_address};
pub use zone::{ZoneResolver, find_zone_id, select_zone};
