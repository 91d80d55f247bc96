use std::time::Duration;

use log::debug;

use crate::core::tasks::{
    TaskHandle,
    TaskManager,
};

/// Periodic advance. At most one interval task exists; every arm or disarm bumps the
/// generation so ticks already sitting in the channel are rejected.
pub struct AutoplayTimer {
    enabled: bool,
    interval_seconds: u32,
    generation: u64,
    pending: Option<TaskHandle>,
}

impl AutoplayTimer {
    pub fn new(enabled: bool, interval_seconds: u32) -> Self {
        Self { enabled, interval_seconds: interval_seconds.max(1), generation: 0, pending: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_seconds))
    }

    /// Restarts the countdown from now. Stays disarmed when disabled or there is nothing to show.
    pub fn arm(&mut self, tasks: &TaskManager, has_items: bool) {
        self.disarm();

        if !self.enabled || !has_items {
            return;
        }

        self.pending = Some(tasks.start_autoplay(self.generation, self.interval()));
        debug!(
            "[Autoplay] Armed every {}s (generation {})",
            self.interval_seconds, self.generation
        );
    }

    pub fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
        self.generation += 1;
    }

    /// Whether a tick belongs to the live interval task.
    pub fn accept_tick(&self, generation: u64) -> bool {
        self.enabled && self.pending.is_some() && generation == self.generation
    }

    /// Returns whether the value changed; callers re-arm on change.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    pub fn set_interval(&mut self, seconds: u32) -> bool {
        let seconds = seconds.max(1);
        let changed = self.interval_seconds != seconds;
        self.interval_seconds = seconds;
        changed
    }

    /// `max(1, interval + delta)`; ignored while autoplay is off.
    pub fn adjust_interval(&mut self, delta: i64) -> Option<u32> {
        if !self.enabled {
            return None;
        }

        let adjusted = i64::from(self.interval_seconds)
            .saturating_add(delta)
            .clamp(1, u32::MAX.into());
        self.interval_seconds = adjusted as u32;
        Some(self.interval_seconds)
    }
}
