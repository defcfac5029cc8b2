//! # Effect execution
//!
//! The boundary between the pure [`App`](crate::app::App) state and the
//! outside world. [`run_from_effects`] turns [`Effect`]s into background
//! lookups and watch timer changes; finished lookups come back to the runtime
//! as futures in the returned [`CommandBatch`].

use chrono::Local;
use dlookup_engine::{ProviderRegistry, WatchTimers, run_lookup};
use dlookup_types::{Effect, LookupCompletion, LookupOutcome, TabId};
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use tracing::{debug, warn};

/// Future resolving to one finished lookup.
pub type PendingLookup = BoxFuture<'static, LookupCompletion>;

#[derive(Default)]
pub struct CommandBatch {
    pub pending: Vec<PendingLookup>,
    pub quit: bool,
}

/// Execute `effects`, spawning lookups on the Tokio runtime.
pub fn run_from_effects(registry: &ProviderRegistry, timers: &mut WatchTimers, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for effect in effects {
        match effect {
            Effect::RunLookup {
                tab_id,
                run_id,
                provider,
                target,
            } => batch.pending.push(spawn_lookup(registry, tab_id, run_id, provider, target)),
            Effect::ArmWatchTimer {
                tab_id,
                generation,
                interval,
            } => timers.arm(tab_id, generation, interval),
            Effect::CancelWatchTimer(tab_id) => timers.cancel(tab_id),
            Effect::Quit => batch.quit = true,
        }
    }
    batch
}

fn spawn_lookup(registry: &ProviderRegistry, tab_id: TabId, run_id: u64, provider: String, target: String) -> PendingLookup {
    let completion = move |provider: String, target: String, outcome: LookupOutcome| LookupCompletion {
        tab_id,
        run_id,
        provider,
        target,
        outcome,
        finished_at: Local::now(),
    };

    let Some(lookup) = registry.get(&provider) else {
        warn!(provider = %provider, "unknown lookup provider");
        let outcome = LookupOutcome::Failure {
            message: format!("unknown lookup provider: {provider}"),
            output: String::new(),
        };
        return future::ready(completion(provider, target, outcome)).boxed();
    };

    debug!(%tab_id, run_id, provider = %provider, target = %target, "starting lookup");
    let task_target = target.clone();
    let handle = tokio::spawn(async move { run_lookup(lookup, &task_target).await });
    async move {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%tab_id, error = %error, "lookup task failed");
                LookupOutcome::Failure {
                    message: format!("lookup task failed: {error}"),
                    output: String::new(),
                }
            }
        };
        completion(provider, target, outcome)
    }
    .boxed()
}
