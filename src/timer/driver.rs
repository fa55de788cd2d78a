//! Async driver: one [`RestTimer`] ticked by at most one [`Ticker`]

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{Phase, RestTimer, SetKey, Tick, TimerError, Ticker};

/// Tick period of the driver; accuracy comes from wall-clock deltas
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    Expired { trigger: Option<SetKey> },
}

/// Read-only view of the timer for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_secs: f64,
    pub total_secs: u32,
    pub progress: f64,
    pub trigger: Option<SetKey>,
}

pub struct TimerDriver {
    timer: Arc<Mutex<RestTimer>>,
    ticker: Option<Ticker>,
    period: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
}

fn lock(timer: &Mutex<RestTimer>) -> MutexGuard<'_, RestTimer> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TimerDriver {
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            timer: Arc::new(Mutex::new(RestTimer::new())),
            ticker: None,
            period,
            events: tx,
        };
        (driver, rx)
    }

    /// Arm a new run, replacing the current one. On `InvalidDuration` the
    /// running countdown (if any) keeps going untouched.
    pub fn start(&mut self, total_secs: u32, trigger: Option<SetKey>) -> Result<(), TimerError> {
        let generation = {
            let mut timer = lock(&self.timer);
            timer.start(total_secs, trigger, Instant::now())?;
            timer.generation()
        };

        if let Some(previous) = self.ticker.take() {
            previous.cancel();
        }

        let timer = Arc::clone(&self.timer);
        let events = self.events.clone();
        self.ticker = Some(Ticker::spawn(self.period, move |now| {
            let mut timer = lock(&timer);
            // a late tick from a replaced run
            if timer.generation() != generation {
                return ControlFlow::Break(());
            }
            match timer.tick(now) {
                Tick::Running { remaining_secs } => {
                    debug!(remaining_secs, "rest tick");
                    ControlFlow::Continue(())
                }
                Tick::Expired => {
                    let trigger = timer.trigger();
                    info!(?trigger, "rest over");
                    // receiver gone means nobody is watching; nothing to do
                    let _ = events.send(TimerEvent::Expired { trigger });
                    ControlFlow::Break(())
                }
                Tick::Inactive => ControlFlow::Break(()),
            }
        }));

        info!(total_secs, ?trigger, "rest started");
        Ok(())
    }

    pub fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        let mut timer = lock(&self.timer);
        if timer.phase() == Phase::Running {
            info!("rest cancelled");
        }
        timer.cancel();
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let timer = lock(&self.timer);
        TimerSnapshot {
            phase: timer.phase(),
            remaining_secs: timer.remaining_secs(),
            total_secs: timer.total_secs(),
            progress: timer.progress(),
            trigger: timer.trigger(),
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.timer).phase() == Phase::Running
    }
}
