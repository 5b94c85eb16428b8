//! External stop signals checked between documents and between sweeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Anything the sampler can poll to stop early
pub trait StopSignal {
    /// True once sampling should stop
    fn should_stop(&self) -> bool;
}

/// Never asks to stop
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    #[inline]
    fn should_stop(&self) -> bool {
        false
    }
}

impl StopSignal for AtomicBool {
    #[inline]
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Wall-clock time budget
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    /// `None` if the budget runs past what `Instant` can represent
    end: Option<Instant>,
}

impl Deadline {
    /// Expires `budget` from now
    pub fn after(budget: Duration) -> Self {
        Deadline {
            end: Instant::now().checked_add(budget),
        }
    }
}

impl StopSignal for Deadline {
    #[inline]
    fn should_stop(&self) -> bool {
        self.end.is_some_and(|end| Instant::now() >= end)
    }
}

impl<S: StopSignal + ?Sized> StopSignal for &S {
    #[inline]
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}
