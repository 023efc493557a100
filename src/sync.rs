// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling of the appliance.
//!
//! [`StateSynchronizer`] runs as its own task. It wakes every [`TICK`],
//! looks at the clock at most once per [`MIN_CHECK_SPACING`] and reads the
//! appliance when the next poll is due. A successful read schedules the
//! next one after the configured reload interval, a failed one after
//! [`RETRY_DELAY`]. There is no exponential backoff.
//!
//! The HTTP request runs without the bridge lock. The merge of the result
//! and the update of the dirty flag happen under one lock acquisition, so
//! property reads never see a half applied poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::appliance::{ApplianceClient, apply_report};
use crate::bus::BusTransport;
use crate::context::BridgeContext;

/// Wake-up period of the poll loop.
pub const TICK: Duration = Duration::from_secs(5);

/// Minimum time between two looks at the schedule.
pub const MIN_CHECK_SPACING: Duration = Duration::from_secs(10);

/// Delay before the next attempt after a failed poll.
pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// At least one sensor value changed.
    Changed,
    /// The appliance answered with the known values.
    Unchanged,
    /// The appliance could not be read.
    Failed,
}

/// When to look at the clock and when to poll.
#[derive(Debug, Clone, Default)]
pub struct PollSchedule {
    last_check: Option<Instant>,
    next_due: Option<Instant>,
}

impl PollSchedule {
    /// Creates a schedule with the first poll due immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns when the next poll is due, `None` before the first one.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Returns `true` if a poll is due at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_none_or(|due| now >= due)
    }

    /// Called on every tick. Returns `true` if enough time has passed since
    /// the previous check, and records `now` as the latest check.
    pub fn should_check(&mut self, now: Instant) -> bool {
        let spaced = self
            .last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= MIN_CHECK_SPACING);
        if spaced {
            self.last_check = Some(now);
        }
        spaced
    }

    /// Returns `true` if the caller should poll at `now`.
    ///
    /// Ticks closer than [`MIN_CHECK_SPACING`] to the previous check are
    /// ignored.
    pub fn check(&mut self, now: Instant) -> bool {
        self.should_check(now) && self.is_due(now)
    }

    /// Schedules the next poll after `outcome`.
    ///
    /// A delay too large for the clock falls back to [`RETRY_DELAY`].
    pub fn record(&mut self, outcome: PollOutcome, now: Instant, reload_interval: Duration) {
        let delay = match outcome {
            PollOutcome::Changed | PollOutcome::Unchanged => reload_interval,
            PollOutcome::Failed => RETRY_DELAY,
        };
        self.next_due = Some(now.checked_add(delay).unwrap_or(now + RETRY_DELAY));
    }
}

/// Background task keeping the shared state in step with the appliance.
#[derive(Debug)]
pub struct StateSynchronizer<T: BusTransport> {
    client: ApplianceClient,
    ctx: Arc<BridgeContext>,
    transport: Arc<T>,
    schedule: PollSchedule,
}

impl<T: BusTransport> StateSynchronizer<T> {
    /// Creates a synchronizer. The first poll happens on the first tick.
    #[must_use]
    pub fn new(client: ApplianceClient, ctx: Arc<BridgeContext>, transport: Arc<T>) -> Self {
        Self {
            client,
            ctx,
            transport,
            schedule: PollSchedule::new(),
        }
    }

    /// Returns the poll schedule.
    #[must_use]
    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Reads the appliance once and schedules the next poll.
    ///
    /// A change sets the dirty flag, everything else clears it. A failure
    /// additionally sends a pong for the device so the bus controller keeps
    /// seeing it alive.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let result = self.client.fetch_report().await;
        let now = Instant::now();

        let (outcome, reload_interval) = match result {
            Ok(report) => {
                let mut state = self.ctx.lock();
                let changed = apply_report(&mut state, &report, Utc::now());
                state.dirty = changed;
                let outcome = if changed {
                    PollOutcome::Changed
                } else {
                    PollOutcome::Unchanged
                };
                (outcome, state.settings.reload_interval)
            }
            Err(e) => {
                tracing::warn!(
                    url = %self.client.base_url(),
                    error = %e,
                    "Could not read appliance"
                );
                self.ctx.lock().dirty = false;
                let device = self.ctx.identity().device();
                if let Err(e) = self.transport.send_pong(device) {
                    tracing::warn!(%device, error = %e, "Could not send pong");
                }
                (PollOutcome::Failed, RETRY_DELAY)
            }
        };

        self.schedule.record(outcome, now, reload_interval);
        tracing::debug!(?outcome, "Poll finished");
        outcome
    }

    /// Runs the poll loop until `shutdown` turns `true` or its sender is
    /// dropped.
    ///
    /// A poll in flight is not cancelled. It is bounded by the HTTP
    /// timeout.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(url = %self.client.base_url(), "Starting appliance poller");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if self.schedule.check(Instant::now()) {
                        self.poll_once().await;
                    }
                }
            }
        }

        tracing::info!("Appliance poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELOAD: Duration = Duration::from_secs(60);

    #[test]
    fn first_check_is_due() {
        let mut schedule = PollSchedule::new();
        assert!(schedule.check(Instant::now()));
    }

    #[test]
    fn checks_closer_than_spacing_are_ignored() {
        let start = Instant::now();
        let mut schedule = PollSchedule::new();
        assert!(schedule.check(start));
        // Never polled successfully, so any accepted check is due.
        assert!(!schedule.check(start + TICK));
        assert!(schedule.check(start + MIN_CHECK_SPACING));
    }

    #[test]
    fn oversized_interval_falls_back_to_retry_delay() {
        let start = Instant::now();
        let mut schedule = PollSchedule::new();
        schedule.record(PollOutcome::Changed, start, Duration::MAX);
        assert_eq!(schedule.next_due(), Some(start + RETRY_DELAY));
    }

    #[test]
    fn success_waits_for_reload_interval() {
        let start = Instant::now();
        let mut schedule = PollSchedule::new();
        schedule.record(PollOutcome::Unchanged, start, Duration::from_secs(120));
        assert!(!schedule.is_due(start + Duration::from_secs(119)));
        assert!(schedule.is_due(start + Duration::from_secs(120)));
    }

    #[test]
    fn failure_retries_after_fixed_delay() {
        let start = Instant::now();
        let mut schedule = PollSchedule::new();
        schedule.record(PollOutcome::Failed, start, Duration::from_secs(600));
        assert_eq!(schedule.next_due(), Some(start + RETRY_DELAY));
    }

    #[test]
    fn change_and_no_change_schedule_alike() {
        let start = Instant::now();
        let mut a = PollSchedule::new();
        let mut b = PollSchedule::new();
        a.record(PollOutcome::Changed, start, RELOAD);
        b.record(PollOutcome::Unchanged, start, RELOAD);
        assert_eq!(a.next_due(), b.next_due());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_reach_the_schedule_every_other_time() {
        let mut schedule = PollSchedule::new();
        schedule.record(PollOutcome::Unchanged, Instant::now(), RELOAD);

        let mut ticker = tokio::time::interval(TICK);
        let mut accepted = 0;
        for _ in 0..6 {
            ticker.tick().await;
            if schedule.should_check(Instant::now()) {
                accepted += 1;
                assert!(!schedule.is_due(Instant::now()));
            }
        }
        // Ticks at 0, 5, 10, 15, 20, 25 s: checks at 0, 10, 20.
        assert_eq!(accepted, 3);
    }
}
