//! Idle / Active / Fault transitions.
//!
//! The controller never reads the clock itself; every operation takes
//! `now` so the loop and the tests drive time explicitly.

use super::state::SessionState;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of feeding a button edge to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Idle -> Active; a start notification is due
    Started,
    /// Active or Fault -> Idle; a stop notification is due
    Stopped,
    /// Edge arrived inside the debounce window and was ignored
    Debounced,
}

#[derive(Debug, Clone)]
pub struct SessionController {
    state: SessionState,
    last_reading_at: Option<Instant>,
    last_edge_at: Option<Instant>,
    timeout: Duration,
    debounce: Duration,
}

impl SessionController {
    pub fn new(timeout: Duration, debounce: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            last_reading_at: None,
            last_edge_at: None,
            timeout,
            debounce,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle a button press edge.
    pub fn on_edge(&mut self, now: Instant) -> EdgeOutcome {
        if let Some(prev) = self.last_edge_at {
            if now.saturating_duration_since(prev) < self.debounce {
                debug!("Ignoring button edge inside {:?} debounce window", self.debounce);
                return EdgeOutcome::Debounced;
            }
        }
        self.last_edge_at = Some(now);

        match self.state {
            SessionState::Idle => {
                info!("Button pressed, starting session");
                self.state = SessionState::Active;
                self.last_reading_at = Some(now);
                EdgeOutcome::Started
            }
            SessionState::Active | SessionState::Fault => {
                info!("Button pressed, stopping {} session", self.state);
                self.state = SessionState::Idle;
                self.last_reading_at = None;
                EdgeOutcome::Stopped
            }
        }
    }

    /// Note that a valid reading arrived. Ignored outside an active session.
    pub fn record_reading(&mut self, now: Instant) {
        if self.state == SessionState::Active {
            self.last_reading_at = Some(now);
        }
    }

    /// Enter Fault if the session has been silent for the timeout.
    ///
    /// Returns `true` only on the call that makes the transition.
    pub fn on_timeout_check(&mut self, now: Instant) -> bool {
        if self.state != SessionState::Active {
            return false;
        }

        match self.since_last_reading(now) {
            Some(silence) if silence >= self.timeout => {
                warn!(
                    "No reading from sensor node for {:.1}s, entering fault state",
                    silence.as_secs_f32()
                );
                self.state = SessionState::Fault;
                true
            }
            _ => false,
        }
    }

    /// Time since the last accepted reading (or session start).
    pub fn since_last_reading(&self, now: Instant) -> Option<Duration> {
        self.last_reading_at
            .map(|at| now.saturating_duration_since(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);
    const DEBOUNCE: Duration = Duration::from_millis(200);

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_edge_toggles_session() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);
        assert_eq!(session.state(), SessionState::Idle);

        assert_eq!(session.on_edge(t0), EdgeOutcome::Started);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.since_last_reading(t0), Some(Duration::ZERO));

        assert_eq!(session.on_edge(t0 + secs(1.0)), EdgeOutcome::Stopped);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.since_last_reading(t0 + secs(1.0)), None);
    }

    #[test]
    fn test_bouncing_edges_are_ignored() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);

        assert_eq!(session.on_edge(t0), EdgeOutcome::Started);
        assert_eq!(session.on_edge(t0 + secs(0.05)), EdgeOutcome::Debounced);
        assert_eq!(session.on_edge(t0 + secs(0.15)), EdgeOutcome::Debounced);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.on_edge(t0 + secs(0.2)), EdgeOutcome::Stopped);
    }

    #[test]
    fn test_zero_debounce_accepts_every_edge() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, Duration::ZERO);
        assert_eq!(session.on_edge(t0), EdgeOutcome::Started);
        assert_eq!(session.on_edge(t0), EdgeOutcome::Stopped);
    }

    #[test]
    fn test_timeout_enters_fault_once() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);
        session.on_edge(t0);

        assert!(!session.on_timeout_check(t0 + secs(9.9)));
        assert!(session.on_timeout_check(t0 + secs(10.0)));
        assert_eq!(session.state(), SessionState::Fault);
        assert!(!session.on_timeout_check(t0 + secs(20.0)));
    }

    #[test]
    fn test_reading_resets_staleness() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);
        session.on_edge(t0);

        session.record_reading(t0 + secs(8.0));
        assert!(!session.on_timeout_check(t0 + secs(17.0)));
        assert!(session.on_timeout_check(t0 + secs(18.0)));
    }

    #[test]
    fn test_idle_never_faults() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);
        assert!(!session.on_timeout_check(t0 + secs(60.0)));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_fault_stops_on_edge() {
        let t0 = Instant::now();
        let mut session = SessionController::new(TIMEOUT, DEBOUNCE);
        session.on_edge(t0);
        session.on_timeout_check(t0 + secs(11.0));

        assert_eq!(session.on_edge(t0 + secs(12.0)), EdgeOutcome::Stopped);
        assert_eq!(session.state(), SessionState::Idle);
    }
}
