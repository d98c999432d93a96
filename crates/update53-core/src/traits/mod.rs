//! Core traits for update53
//!
//! - [`AddressSource`]: Fetch a candidate public address
//! - [`DnsProvider`]: List hosted zones and upsert records

pub mod address_source;
pub mod dns_provider;

pub use address_source::{AddressSource, FixedAddress};
pub use dns_provider::{
    ChangeAction, ChangeReceipt, ChangeRequest, DnsProvider, RecordType, Zone,
};
