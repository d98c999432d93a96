// # Address Source Trait
//
// Defines the interface for fetching the caller's public address.
//
// ## Implementations
//
// - URL fetch: `update53-ip-http` crate (`HttpAddressSource`)
// - EC2 instance metadata: `update53-ip-http` crate (`MetadataAddressSource`)
// - Fixed override: [`FixedAddress`] in this module
//
// ## Usage
//
// ```rust,ignore
// use update53_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> update53_core::Result<()> {
//     let source = /* AddressSource implementation */;
//     let candidate = source.fetch().await?;
//     println!("{} says {}", source.describe(), candidate);
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for public address sources
///
/// A source returns the candidate address as text. It does not parse or
/// validate it; [`crate::AddressResolver`] does that so every source fails
/// the same way on garbage input.
///
/// # Contract
///
/// - One outbound request per call at most
/// - Leading/trailing whitespace is trimmed
/// - Transport failures and non-2xx responses are returned as
///   [`crate::Error::Network`] tagged with [`AddressSource::describe`]
/// - No retries; the next daemon tick is the retry
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Fetch the candidate address text
    async fn fetch(&self) -> Result<String, crate::Error>;

    /// Human readable identity of this source, used in error context
    fn describe(&self) -> String;
}

/// A source that always returns the same text
///
/// Backs the force-ip override. Never touches the network.
#[derive(Debug, Clone)]
pub struct FixedAddress {
    address: String,
}

impl FixedAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl AddressSource for FixedAddress {
    async fn fetch(&self) -> Result<String, crate::Error> {
        Ok(self.address.clone())
    }

    fn describe(&self) -> String {
        "force ip".to_string()
    }
}
