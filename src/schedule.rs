//! Cooperative scheduling.
//!
//! Training progress is decoupled from whatever drives it. A `Steppable` advances by
//! at most one epoch per `tick()`, so a UI can call it from its redraw or idle hook,
//! a timer can call it periodically, and tests can spin it in a tight loop with
//! [`drive`].
//!
//! `tick()` takes `&mut self`, so two epochs can never run against overlapping views
//! of the same parameters. Cancellation from outside the owner goes through a
//! [`StopHandle`], which the steppable checks at the start of every tick.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::EpochReport;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing was touched.
    Idle,
    /// Running, but this tick was skipped by pacing.
    Paced,
    /// One epoch completed.
    Epoch(EpochReport),
}

/// Something that makes progress one tick at a time.
pub trait Steppable {
    fn tick(&mut self) -> TickOutcome;

    /// True while further ticks can make progress.
    fn is_active(&self) -> bool;
}

/// Cloneable stop request shared with a `Steppable`.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the owner to stop before its next tick does any work.
    pub fn stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Consume a pending request.
    pub(crate) fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

/// Totals gathered by [`drive`] / [`drive_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveSummary {
    pub ticks: u64,
    pub epochs: u64,
    pub last: Option<EpochReport>,
}

impl DriveSummary {
    fn record(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        if let TickOutcome::Epoch(report) = outcome {
            self.epochs += 1;
            self.last = Some(*report);
        }
    }
}

/// Tick `s` until it goes inactive or `max_ticks` ticks have run.
pub fn drive<S: Steppable + ?Sized>(s: &mut S, max_ticks: Option<u64>) -> DriveSummary {
    drive_with(s, max_ticks, |_| ControlFlow::Continue(()))
}

/// Like [`drive`], but hands every outcome to `on_tick`, which may break out early.
pub fn drive_with<S, F>(s: &mut S, max_ticks: Option<u64>, mut on_tick: F) -> DriveSummary
where
    S: Steppable + ?Sized,
    F: FnMut(&TickOutcome) -> ControlFlow<()>,
{
    let mut summary = DriveSummary::default();
    while s.is_active() {
        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            break;
        }
        let outcome = s.tick();
        summary.record(&outcome);
        if on_tick(&outcome).is_break() {
            break;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts down, producing an "epoch" on every other tick.
    struct Countdown {
        remaining: u64,
        ticks: u64,
    }

    impl Steppable for Countdown {
        fn tick(&mut self) -> TickOutcome {
            if self.remaining == 0 {
                return TickOutcome::Idle;
            }
            self.ticks += 1;
            if self.ticks % 2 == 1 {
                return TickOutcome::Paced;
            }
            self.remaining -= 1;
            TickOutcome::Epoch(EpochReport {
                epoch: self.ticks / 2,
                loss: self.remaining as f64,
                stop: None,
            })
        }

        fn is_active(&self) -> bool {
            self.remaining > 0
        }
    }

    #[test]
    fn drive_runs_until_inactive() {
        let mut c = Countdown {
            remaining: 3,
            ticks: 0,
        };
        let summary = drive(&mut c, None);
        assert_eq!(summary.ticks, 6);
        assert_eq!(summary.epochs, 3);
        assert_eq!(summary.last.map(|r| r.epoch), Some(3));
    }

    #[test]
    fn drive_respects_max_ticks() {
        let mut c = Countdown {
            remaining: 10,
            ticks: 0,
        };
        let summary = drive(&mut c, Some(5));
        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.epochs, 2);
        assert!(c.is_active());
    }

    #[test]
    fn drive_with_can_break_early() {
        let mut c = Countdown {
            remaining: 10,
            ticks: 0,
        };
        let summary = drive_with(&mut c, None, |outcome| match outcome {
            TickOutcome::Epoch(_) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        });
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.epochs, 1);
    }

    #[test]
    fn stop_handle_is_shared_between_clones() {
        let a = StopHandle::new();
        let b = a.clone();
        assert!(!a.is_stop_requested());

        b.stop();
        assert!(a.is_stop_requested());
        assert!(a.take());
        assert!(!b.is_stop_requested());
        assert!(!a.take());
    }
}
