//! Runtime: terminal lifecycle and the single event loop.
//!
//! Responsibilities
//! - Enter/leave the alternate screen and raw mode.
//! - Forward terminal input from a dedicated blocking thread.
//! - Execute `Effect`s through `cmd` and feed finished lookups and watch ticks
//!   back into `App` as `Msg`s.
//! - Redraw after every handled event or tick.
//!
//! Ticking is fast (100 ms) while a lookup is in flight so the throbber
//! animates, and slow (5 s) otherwise.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dlookup_engine::{ProviderRegistry, WatchTimers};
use dlookup_types::{Effect, Msg};
use dlookup_util::AppConfig;
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::StartupPlan;
use crate::app::App;
use crate::cmd::{self, PendingLookup};
use crate::ui::theme::{self, Theme};
use crate::ui::view;

type TuiBackend = CrosstermBackend<std::io::Stdout>;

/// Spawn a thread that blocks on `crossterm::event::read()` and forwards
/// events over a channel. The thread ends when the receiver is dropped.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!("Failed to read terminal event: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<TuiBackend>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut Terminal<TuiBackend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<TuiBackend>, app: &App, theme: &dyn Theme) -> Result<()> {
    terminal.draw(|frame| view::draw(frame, app, theme))?;
    Ok(())
}

fn handle_input_event(app: &mut App, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => app.handle_key(key_event),
        Event::Resize(width, height) => app.update(Msg::Resize(width, height)),
        Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Entry point called from `lib::run`: sets up the terminal, runs the loop,
/// and restores the terminal even when the loop fails.
pub async fn run_app(registry: Arc<ProviderRegistry>, config: AppConfig, plan: StartupPlan) -> Result<()> {
    let mut app = App::new(registry, &config);
    let effects = match plan {
        StartupPlan::Interactive => Vec::new(),
        StartupPlan::Batch { provider, targets } => app.open_batch(&provider, &targets),
    };

    let theme = theme::load();
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, &theme, effects).await;
    cleanup_terminal(&mut terminal)?;
    outcome
}

async fn event_loop(terminal: &mut Terminal<TuiBackend>, app: &mut App, theme: &dyn Theme, mut effects: Vec<Effect>) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let (tick_sender, mut watch_ticks) = mpsc::unbounded_channel();
    let mut timers = WatchTimers::new(tick_sender);
    let mut pending: FuturesUnordered<PendingLookup> = FuturesUnordered::new();

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if !effects.is_empty() {
            let batch = cmd::run_from_effects(app.registry(), &mut timers, std::mem::take(&mut effects));
            pending.extend(batch.pending);
            if batch.quit {
                info!("quit requested");
                break;
            }
        }

        render(terminal, app, theme)?;

        let target_interval = if app.is_busy() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        tokio::select! {
            maybe_event = input_receiver.recv() => {
                match maybe_event {
                    Some(event) => effects.extend(handle_input_event(app, event)),
                    // input thread ended; shut down cleanly
                    None => break,
                }
            }

            _ = ticker.tick() => {
                effects.extend(app.update(Msg::Tick));
            }

            Some(completion) = pending.next(), if !pending.is_empty() => {
                effects.extend(app.update(Msg::LookupCompleted(Box::new(completion))));
            }

            Some(tick) = watch_ticks.recv() => {
                effects.extend(app.update(Msg::WatchTick(tick)));
            }

            _ = signal::ctrl_c() => { break; }
        }
    }

    timers.cancel_all();
    Ok(())
}
