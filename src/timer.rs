//! Wraparound-safe millisecond timer (C7 in the design doc), ported from
//! `millisec_timer.h`/`.c`.
//!
//! Expiry is computed entirely with wrapping arithmetic so a timer set
//! shortly before the `u32` millisecond counter wraps (every ~49.7 days)
//! still fires at the right point: `elapsed = now - set_time` and
//! `duration = expire_time - set_time` are both taken mod 2^32, so the
//! comparison `elapsed >= duration` stays correct across the wrap.

pub type TimerUnit = u32;

/// A one-shot (or, via [`Self::is_expired_repeat`], self-rearming) deadline
/// measured against an externally supplied millisecond clock. Nothing in
/// this type reads the clock itself — callers pass `now` in, which is what
/// lets the same type serve a host `Instant`-backed clock or a bare SysTick
/// counter on a microcontroller.
#[derive(Debug, Clone, Copy, Default)]
pub struct MillisecTimer {
    enabled: bool,
    set_time: TimerUnit,
    expire_time: TimerUnit,
}

impl MillisecTimer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: false,
            set_time: 0,
            expire_time: 0,
        }
    }

    /// Arms the timer to expire `rel` ms after `now`.
    pub fn set_rel(&mut self, now: TimerUnit, rel: TimerUnit) {
        self.enabled = true;
        self.set_time = now;
        self.expire_time = now.wrapping_add(rel);
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn has_elapsed(&self, now: TimerUnit) -> bool {
        let elapsed = now.wrapping_sub(self.set_time);
        let duration = self.expire_time.wrapping_sub(self.set_time);
        elapsed >= duration
    }

    /// If the timer is enabled and `now` is at or past expiry, disables it
    /// and returns `true`. Otherwise returns `false` without side effects.
    pub fn is_expired(&mut self, now: TimerUnit) -> bool {
        if self.enabled && self.has_elapsed(now) {
            self.enabled = false;
            true
        } else {
            false
        }
    }

    /// Like [`Self::is_expired`], but on expiry rearms for the same
    /// duration instead of disabling: `new_expire = old_expire +
    /// (old_expire - old_set)`, `new_set = old_expire`.
    pub fn is_expired_repeat(&mut self, now: TimerUnit) -> bool {
        if self.enabled && self.has_elapsed(now) {
            let duration = self.expire_time.wrapping_sub(self.set_time);
            self.set_time = self.expire_time;
            self.expire_time = self.expire_time.wrapping_add(duration);
            true
        } else {
            false
        }
    }
}
