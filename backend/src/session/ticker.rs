//! Fixed-interval ticker with a cancellation handle, and the progress sources it drives

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a running ticker
///
/// Dropping the handle stops the ticker at its next wake-up.
pub struct TickerHandle {
    cancel_tx: mpsc::Sender<()>,
    task: JoinHandle<u32>,
}

impl TickerHandle {
    /// Ask the ticker to stop. Returns false if it had already finished.
    pub fn cancel(&self) -> bool {
        self.cancel_tx.try_send(()).is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the ticker to stop, returning how many ticks it ran
    pub async fn join(self) -> u32 {
        self.task.await.unwrap_or_default()
    }
}

/// Call `on_tick` every `interval` until it breaks or the ticker is cancelled.
///
/// The first tick fires one full interval after spawning. `on_tick` receives
/// the 1-based tick number.
pub fn spawn<F>(interval: Duration, mut on_tick: F) -> TickerHandle
where
    F: FnMut(u32) -> ControlFlow<()> + Send + 'static,
{
    let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);

    let start = Instant::now() + interval;

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0;

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    debug!("Ticker cancelled after {} ticks", ticks);
                    break;
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    if on_tick(ticks).is_break() {
                        break;
                    }
                }
            }
        }

        ticks
    });

    TickerHandle { cancel_tx, task }
}

/// What a progress source reports on each tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressSignal {
    /// Move forward by this many percentage points
    Advance(u8),
    /// The transfer failed
    Failed(String),
}

/// Something that can tell a downloading session how far along it is
pub trait ProgressSource: Send + 'static {
    fn poll(&mut self) -> ProgressSignal;
}

/// Pretends to transfer by advancing a fixed step every tick
#[derive(Debug, Clone, Copy)]
pub struct SimulatedTransfer {
    step: u8,
}

impl SimulatedTransfer {
    pub fn new(step: u8) -> Self {
        Self { step }
    }
}

impl ProgressSource for SimulatedTransfer {
    fn poll(&mut self) -> ProgressSignal {
        ProgressSignal::Advance(self.step)
    }
}
