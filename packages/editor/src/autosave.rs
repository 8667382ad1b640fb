//! # Autosave Scheduling
//!
//! Two independent timers drive background saves:
//!
//! ```text
//! mutation ──touch──▶ debounce (reset on every touch) ──┐
//!                                                       ├──▶ target.autosave(trigger)
//! heartbeat (fixed interval, ignores touches) ──────────┘
//! ```
//!
//! Both run inside one task. Cancelling the task cancels both timers; the task
//! holds only a weak reference to its target, so it also stops once the
//! target is dropped.

use async_trait::async_trait;
use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// What caused a save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    /// Quiet period after the last mutation elapsed
    Debounce,
    /// Fixed-interval timer fired
    Heartbeat,
    /// Autosave requested while another save was in flight
    Coalesced,
    /// Direct user action
    Explicit,
    /// Save-before-close confirmed by the user
    Close,
}

impl SaveTrigger {
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            SaveTrigger::Debounce | SaveTrigger::Heartbeat | SaveTrigger::Coalesced
        )
    }
}

/// Receiver of timer-driven save requests
#[async_trait]
pub(crate) trait AutosaveTarget: Send + Sync + 'static {
    /// Must be a no-op when there is nothing to save at call time
    async fn autosave(&self, trigger: SaveTrigger);
}

pub(crate) struct AutosaveScheduler {
    touches: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl AutosaveScheduler {
    pub(crate) fn spawn<T: AutosaveTarget>(
        handle: &Handle,
        target: Weak<T>,
        debounce: Duration,
        heartbeat: Option<Duration>,
    ) -> Self {
        let (touches, rx) = mpsc::unbounded_channel();
        let task = handle.spawn(run(target, rx, debounce, heartbeat));
        Self { touches, task }
    }

    /// Restart the debounce timer
    pub(crate) fn touch(&self) {
        // A closed channel means the task already stopped
        let _ = self.touches.send(());
    }

    /// Stop both timers and wait until the task is gone
    pub(crate) async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T: AutosaveTarget>(
    target: Weak<T>,
    mut touches: mpsc::UnboundedReceiver<()>,
    debounce: Duration,
    heartbeat: Option<Duration>,
) {
    let sleep = tokio::time::sleep(debounce);
    tokio::pin!(sleep);
    let mut armed = false;

    let mut ticker = heartbeat.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            touch = touches.recv() => match touch {
                Some(()) => {
                    sleep.as_mut().reset(Instant::now() + debounce);
                    armed = true;
                }
                None => break,
            },
            () = &mut sleep, if armed => {
                armed = false;
                if !fire(&target, SaveTrigger::Debounce).await {
                    break;
                }
            }
            () = tick(&mut ticker) => {
                if !fire(&target, SaveTrigger::Heartbeat).await {
                    break;
                }
            }
        }
    }

    tracing::debug!("autosave scheduler stopped");
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Returns false once the target is gone
async fn fire<T: AutosaveTarget>(target: &Weak<T>, trigger: SaveTrigger) -> bool {
    match target.upgrade() {
        Some(target) => {
            target.autosave(trigger).await;
            true
        }
        None => false,
    }
}
