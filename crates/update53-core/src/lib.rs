// # update53-core
//
// Core library for the update53 dynamic DNS updater.
//
// ## Architecture Overview
//
// This library holds the update decision and execution pipeline:
// - **AddressSource**: Trait for fetching a candidate public address as text
// - **DnsProvider**: Trait for listing hosted zones and upserting records
// - **AddressResolver**: Picks one address source by precedence and validates the result
// - **ZoneResolver**: Finds the hosted zone id for a hostname
// - **UpdateOrchestrator**: Runs one cycle and owns the last applied address
// - **DaemonLoop**: Drives the orchestrator on a timer until shutdown
//
// ## Design Principles
//
// 1. **One-shot futures**: Each resolver runs as its own task and yields exactly one result
// 2. **Single writer**: Only the orchestrator reads or writes the cached address
// 3. **Non-fatal cycles**: Every cycle error is reported, none stops the daemon
// 4. **Library-First**: Sources and providers are plugged in behind traits

pub mod traits;
pub mod pending;
pub mod resolver;
pub mod orchestrator;
pub mod daemon;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{AddressSource, DnsProvider};
pub use resolver::{AddressResolver, AddressSources, ZoneResolver};
pub use orchestrator::{CycleOutcome, UpdateOrchestrator};
pub use daemon::{DaemonEvent, DaemonLoop};
pub use config::{UpdateConfig, ZoneMatch};
pub use error::{Error, Result};
