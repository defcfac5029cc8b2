//! Lookup providers and the registry that catalogs them.
//!
//! Modules:
//! - `command`: providers backed by an external executable (dig, nslookup, whois)
//! - `comprehensive`: fan-out provider that merges every other provider's output
//! - `registry`: process-wide catalog with name/flag uniqueness

mod command;
mod comprehensive;
mod registry;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::LookupError;

pub use command::{CommandProvider, DigVerbosity};
pub use comprehensive::{COMPREHENSIVE_REPORT_NAME, ComprehensiveProvider};
pub use registry::ProviderRegistry;

/// A unit capable of performing one kind of lookup.
///
/// Providers are built once at startup, registered, and never mutated.
#[async_trait]
pub trait LookupProvider: Send + Sync + Debug {
    /// User-facing name, unique within a registry (e.g. `DIG (A)`).
    fn name(&self) -> &str;

    /// Command-line flag identifier, unique within a registry (e.g. `dig-a`).
    fn flag_name(&self) -> &str;

    /// Help text for the provider's batch flag.
    fn usage(&self) -> String {
        format!("Run {} lookup on domains from <filename>", self.name())
    }

    /// External executable this provider shells out to, if any.
    fn base_command(&self) -> Option<&str> {
        None
    }

    /// Whether the result may be re-run on a timer.
    fn is_watchable(&self) -> bool {
        true
    }

    fn check_availability(&self) -> bool;

    /// Run the lookup for `target`.
    async fn execute(&self, target: &str) -> Result<String, LookupError>;
}
