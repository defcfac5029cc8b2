//! # dlookup TUI
//!
//! Tabbed terminal interface for running DNS and WHOIS lookups.
//!
//! Each tab walks through domain entry, lookup selection, and a scrollable
//! result view, and can re-run its lookup on a timer. State transitions live
//! in [`app`] and [`tab`] and only return effects; [`cmd`] executes them and
//! the runtime in `ui::runtime` feeds completions back in as messages.

pub mod app;
pub mod cmd;
pub mod keymap;
pub mod tab;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use dlookup_engine::ProviderRegistry;
use dlookup_util::AppConfig;

/// How the first screen is populated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartupPlan {
    /// One empty tab waiting for a domain.
    #[default]
    Interactive,
    /// One tab per target, each already running `provider`.
    Batch { provider: String, targets: Vec<String> },
}

/// Run the TUI until the user quits.
///
/// # Errors
///
/// Fails when the terminal cannot be put into (or restored from) raw mode or
/// when drawing fails.
pub async fn run(registry: Arc<ProviderRegistry>, config: AppConfig, plan: StartupPlan) -> Result<()> {
    ui::runtime::run_app(registry, config, plan).await
}
