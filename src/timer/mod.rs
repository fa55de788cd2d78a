//! Rest timer - countdown state machine between sets
//!
//! [`RestTimer`] is pure: every transition takes the current instant, so it
//! is driven either by a [`Ticker`] (see [`TimerDriver`]) or directly by a
//! polling loop. Remaining time always decreases by the measured wall-clock
//! delta between ticks, never by an assumed poll period.

pub mod driver;
pub mod ticker;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::session::CompletionEvent;

pub use driver::{TimerDriver, TimerEvent, TimerSnapshot};
pub use ticker::Ticker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("rest duration must be a positive number of seconds")]
    InvalidDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Expired,
}

/// The set whose completion armed the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetKey {
    pub exercise_id: i64,
    pub set_index: u32,
}

impl From<&CompletionEvent> for SetKey {
    fn from(event: &CompletionEvent) -> Self {
        Self {
            exercise_id: event.exercise_id,
            set_index: event.set_index,
        }
    }
}

/// Rest length presets for a quick start without picking a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Normal,
    Intermediate,
    Intense,
}

impl Intensity {
    pub fn all() -> &'static [Intensity] {
        &[Intensity::Normal, Intensity::Intermediate, Intensity::Intense]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intensity::Normal => "normal",
            Intensity::Intermediate => "intermediate",
            Intensity::Intense => "intense",
        }
    }

    pub fn rest_secs(&self) -> u32 {
        match self {
            Intensity::Normal => 90,
            Intensity::Intermediate => 120,
            Intensity::Intense => 180,
        }
    }

    pub fn parse(s: &str) -> Option<Intensity> {
        Self::all()
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(s.trim()))
    }
}

/// Result of one [`RestTimer::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Running { remaining_secs: f64 },
    /// Returned once per run, on the tick that reaches zero
    Expired,
    Inactive,
}

#[derive(Debug, Clone)]
pub struct RestTimer {
    phase: Phase,
    total: Duration,
    remaining: Duration,
    last_tick: Option<Instant>,
    trigger: Option<SetKey>,
    generation: u64,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTimer {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            total: Duration::ZERO,
            remaining: Duration::ZERO,
            last_tick: None,
            trigger: None,
            generation: 0,
        }
    }

    /// Begin a run of `total_secs`, replacing any run in progress.
    /// A zero duration is rejected and the timer is left as it was.
    pub fn start(
        &mut self,
        total_secs: u32,
        trigger: Option<SetKey>,
        now: Instant,
    ) -> Result<(), TimerError> {
        if total_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        self.total = Duration::from_secs(u64::from(total_secs));
        self.remaining = self.total;
        self.last_tick = Some(now);
        self.trigger = trigger;
        self.phase = Phase::Running;
        self.generation += 1;
        Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> Tick {
        if self.phase != Phase::Running {
            return Tick::Inactive;
        }
        let last = self.last_tick.unwrap_or(now);
        let elapsed = now.saturating_duration_since(last);
        self.last_tick = Some(now);
        self.remaining = self.remaining.saturating_sub(elapsed);

        if self.remaining.is_zero() {
            self.phase = Phase::Expired;
            return Tick::Expired;
        }
        Tick::Running {
            remaining_secs: self.remaining_secs(),
        }
    }

    /// Stop without expiring. Remaining goes back to the full duration.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.phase = Phase::Idle;
        self.remaining = self.total;
        self.last_tick = None;
        self.trigger = None;
        self.generation += 1;
    }

    /// Re-arm for the next set, or go idle with `None`
    pub fn reset(
        &mut self,
        total_secs: Option<u32>,
        trigger: Option<SetKey>,
        now: Instant,
    ) -> Result<(), TimerError> {
        match total_secs {
            Some(secs) => self.start(secs, trigger, now),
            None => {
                self.cancel();
                Ok(())
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining.as_secs_f64()
    }

    pub fn total_secs(&self) -> u32 {
        self.total.as_secs() as u32
    }

    /// Fraction of the run still left, 0 when idle
    pub fn progress(&self) -> f64 {
        if self.phase == Phase::Idle || self.total.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.total.as_secs_f64()
    }

    pub fn trigger(&self) -> Option<SetKey> {
        self.trigger
    }

    /// Bumped on every start and cancel
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// `MM:SS`, zero padded, seconds floored
pub fn format_for_display(remaining_secs: f64) -> String {
    let secs = if remaining_secs.is_finite() && remaining_secs > 0.0 {
        remaining_secs.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Option<SetKey> {
        Some(SetKey {
            exercise_id: 5,
            set_index: 2,
        })
    }

    #[test]
    fn test_format_for_display() {
        assert_eq!(format_for_display(125.0), "02:05");
        assert_eq!(format_for_display(0.0), "00:00");
        assert_eq!(format_for_display(59.0), "00:59");
        assert_eq!(format_for_display(59.999), "00:59");
        assert_eq!(format_for_display(-3.0), "00:00");
        assert_eq!(format_for_display(f64::NAN), "00:00");
        assert_eq!(format_for_display(6000.0), "100:00");
    }

    #[test]
    fn test_new_timer_is_idle() {
        let t = RestTimer::new();
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.remaining_secs(), 0.0);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn test_start_zero_rejected_and_state_kept() {
        let now = Instant::now();
        let mut t = RestTimer::new();
        t.start(30, key(), now).unwrap();
        t.tick(now + Duration::from_secs(5));

        assert_eq!(t.start(0, None, now), Err(TimerError::InvalidDuration));
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.remaining_secs(), 25.0);
        assert_eq!(t.trigger(), key());
    }

    #[test]
    fn test_tick_uses_elapsed_wall_clock() {
        let t0 = Instant::now();
        let mut t = RestTimer::new();
        t.start(10, None, t0).unwrap();
        // uneven gaps, as after a dropped frame or a resume from background
        t.tick(t0 + Duration::from_millis(300));
        t.tick(t0 + Duration::from_millis(4_300));
        assert!((t.remaining_secs() - 5.7).abs() < 1e-9);
    }

    #[test]
    fn test_expires_once_regardless_of_granularity() {
        for step_ms in [1_000u64, 333, 7_000, 45_000] {
            let t0 = Instant::now();
            let mut t = RestTimer::new();
            t.start(45, None, t0).unwrap();

            let mut expired = 0;
            let mut at = 0;
            while at < 60_000 {
                at += step_ms;
                if t.tick(t0 + Duration::from_millis(at)) == Tick::Expired {
                    expired += 1;
                }
            }
            assert_eq!(expired, 1, "step {}ms", step_ms);
            assert_eq!(t.phase(), Phase::Expired);
            assert_eq!(t.remaining_secs(), 0.0);
        }
    }

    #[test]
    fn test_restart_while_running() {
        let t0 = Instant::now();
        let mut t = RestTimer::new();
        t.start(40, None, t0).unwrap();
        t.tick(t0 + Duration::from_secs(30));
        assert_eq!(t.remaining_secs(), 10.0);
        let gen_before = t.generation();

        let t1 = t0 + Duration::from_secs(30);
        t.start(30, key(), t1).unwrap();
        assert_eq!(t.remaining_secs(), 30.0);
        assert_eq!(t.total_secs(), 30);
        assert!(t.generation() > gen_before);

        t.tick(t1 + Duration::from_secs(1));
        assert_eq!(t.remaining_secs(), 29.0);
    }

    #[test]
    fn test_cancel_goes_idle() {
        let t0 = Instant::now();
        let mut t = RestTimer::new();
        t.start(20, key(), t0).unwrap();
        t.tick(t0 + Duration::from_secs(4));
        t.cancel();
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.remaining_secs(), 20.0);
        assert!(t.trigger().is_none());
        assert_eq!(t.tick(t0 + Duration::from_secs(30)), Tick::Inactive);
    }

    #[test]
    fn test_reset_after_expiry() {
        let t0 = Instant::now();
        let mut t = RestTimer::new();
        t.start(5, None, t0).unwrap();
        assert_eq!(t.tick(t0 + Duration::from_secs(5)), Tick::Expired);
        assert_eq!(t.tick(t0 + Duration::from_secs(6)), Tick::Inactive);

        t.reset(Some(90), key(), t0 + Duration::from_secs(6)).unwrap();
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.remaining_secs(), 90.0);

        t.reset(None, None, t0).unwrap();
        assert_eq!(t.phase(), Phase::Idle);
    }

    #[test]
    fn test_progress_fraction() {
        let t0 = Instant::now();
        let mut t = RestTimer::new();
        t.start(120, None, t0).unwrap();
        t.tick(t0 + Duration::from_secs(30));
        assert!((t.progress() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_set_key_from_event() {
        let event = CompletionEvent {
            exercise_id: 9,
            exercise_name: "Dips".into(),
            set_index: 3,
            rest_duration_secs: 60,
        };
        let k = SetKey::from(&event);
        assert_eq!(k.exercise_id, 9);
        assert_eq!(k.set_index, 3);
    }

    #[test]
    fn test_intensity_presets() {
        assert_eq!(Intensity::parse("Normal").map(|i| i.rest_secs()), Some(90));
        assert_eq!(Intensity::parse("intermediate").map(|i| i.rest_secs()), Some(120));
        assert_eq!(Intensity::parse(" intense ").map(|i| i.rest_secs()), Some(180));
        assert_eq!(Intensity::parse("easy"), None);
    }
}
