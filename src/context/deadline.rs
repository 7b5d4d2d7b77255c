use std::time::{Duration, Instant};

/// The absolute point in time by which a call must complete, if any.
///
/// Only the absolute instant is stored; every query recomputes the
/// remaining time against the current clock.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// A deadline `timeout` from now. A timeout too large for the clock to
    /// represent means no deadline.
    pub fn after(timeout: Duration) -> Self {
        Instant::now()
            .checked_add(timeout)
            .map_or_else(Self::none, Self::at)
    }

    /// Derives a deadline from a client-supplied timeout, clamped by the
    /// server's limit. The shorter of the two wins.
    pub fn from_timeouts(client: Option<Duration>, server_max: Option<Duration>) -> Self {
        match (client, server_max) {
            (Some(c), Some(s)) => Self::after(c.min(s)),
            (Some(t), None) | (None, Some(t)) => Self::after(t),
            (None, None) => Self::none(),
        }
    }

    pub fn instant(&self) -> Option<Instant> {
        self.at
    }

    /// Time left until the deadline, saturating at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|d| d.is_zero())
    }
}
