//! # dlookup engine
//!
//! Everything that decides *what* runs and *how its output looks*, kept free
//! of terminal concerns:
//!
//! - **`provider`**: the [`LookupProvider`] trait, command-backed providers,
//!   the comprehensive fan-out provider, and the [`ProviderRegistry`]
//! - **`runner`**: process execution and output normalization
//! - **`availability`**: memoized `PATH` probes
//! - **`report`**: deterministic report formatting
//! - **`watch`**: the per-tab watch state machine and its timers
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use dlookup_engine::{AvailabilityCache, ProcessCommandRunner, ProviderRegistry};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = ProviderRegistry::with_default_providers(
//!     Arc::new(ProcessCommandRunner),
//!     Arc::new(AvailabilityCache::system()),
//!     None,
//! )?;
//! if let Some(provider) = registry.get("DIG (A)") {
//!     println!("{}", provider.execute("example.com").await?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod availability;
pub mod error;
pub mod provider;
pub mod report;
pub mod runner;
pub mod watch;

use std::sync::Arc;

use dlookup_types::LookupOutcome;
use tracing::warn;

pub use availability::AvailabilityCache;
pub use error::{LookupError, RegistryError, WatchError};
pub use provider::{
    COMPREHENSIVE_REPORT_NAME, CommandProvider, ComprehensiveProvider, DigVerbosity, LookupProvider, ProviderRegistry,
};
pub use report::{PREFERRED_REPORT_ORDER, format_failure, format_report};
pub use runner::{CommandRunner, NO_RESULTS, ProcessCommandRunner};
pub use watch::{WatchPhase, WatchSession, WatchStart, WatchTimers, parse_interval};

/// Run `provider` against `target` and fold the result into a [`LookupOutcome`].
pub async fn run_lookup(provider: Arc<dyn LookupProvider>, target: &str) -> LookupOutcome {
    match provider.execute(target).await {
        Ok(output) => LookupOutcome::Success { output },
        Err(error) => {
            warn!(provider = %provider.name(), target = %target, error = %error, "lookup failed");
            LookupOutcome::Failure {
                output: error.output().to_string(),
                message: error.to_string(),
            }
        }
    }
}
