//! Sleep controller: brightness fades and the asleep/awake transition
//!
//! The watcher task that arms the idle timer lives in the device façade;
//! this module owns the state it inspects and the fade walk both
//! transitions share.

use std::time::{Duration, Instant};

use crate::error::Result;

use super::Shared;

/// Fade animation tick, 30 steps per second
pub(crate) const FADE_TICK: Duration = Duration::from_nanos(1_000_000_000 / 30);

/// Mutable sleep-related device state, guarded by the per-device
/// reader-writer lock. The 1 Hz watcher takes the read side; the input
/// worker and the sleep/wake transitions take the write side.
pub(crate) struct SleepState {
    /// Monotonic timestamp of the most recent user input or wake
    pub last_action: Instant,
    /// Whether the display is currently dark waiting for input
    pub asleep: bool,
    /// Last commanded user brightness (0..=100)
    pub brightness: u8,
    /// Brightness to restore on wake
    pub pre_sleep_brightness: u8,
    /// Duration of the sleep/wake fade animation; zero is instantaneous
    pub fade_duration: Duration,
}

impl SleepState {
    pub(crate) fn new() -> Self {
        Self {
            last_action: Instant::now(),
            asleep: false,
            brightness: 0,
            pre_sleep_brightness: 0,
            fade_duration: Duration::ZERO,
        }
    }
}

impl Shared {
    /// Darkens the display and marks the device asleep. The brightness in
    /// effect is remembered so the next wake can restore it.
    pub(crate) async fn enter_sleep(&self) -> Result<()> {
        let mut state = self.sleep.write().await;

        state.pre_sleep_brightness = state.brightness;
        let (start, duration) = (state.brightness, state.fade_duration);
        self.fade(&mut state, start, 0, duration).await;

        state.asleep = true;
        state.brightness = 0;
        self.write_brightness(0)
    }

    /// Restores the pre-sleep brightness and refreshes the activity
    /// timestamp so the idle timer starts over.
    pub(crate) async fn wake(&self) -> Result<()> {
        let mut state = self.sleep.write().await;

        state.asleep = false;
        let (target, duration) = (state.pre_sleep_brightness, state.fade_duration);
        self.fade(&mut state, 0, target, duration).await;

        state.last_action = Instant::now();
        state.brightness = target;
        self.write_brightness(target)
    }

    /// Walks the brightness from `start` to `end` in 30 Hz steps spread
    /// over `duration`. A zero duration skips the walk entirely. A failed
    /// step leaves the device at whatever brightness it reached and the
    /// fade proceeds to the next tick.
    async fn fade(&self, state: &mut SleepState, start: u8, end: u8, duration: Duration) {
        let ticks = duration.as_secs_f64() / FADE_TICK.as_secs_f64();
        let step = (f64::from(end) - f64::from(start)) / ticks;
        if !step.is_finite() {
            return;
        }

        let mut current = f64::from(start);
        loop {
            let advancing = if start < end {
                (current as i8) < end as i8
            } else if start > end {
                (current as i8) > end as i8
            } else {
                false
            };
            if !advancing {
                break;
            }

            let percent = current.round() as u8;
            state.brightness = percent;
            if let Err(e) = self.write_brightness(percent) {
                log::warn!("fade step failed: {}", e);
            }

            tokio::time::sleep(FADE_TICK).await;
            current += step;
        }
    }
}
