//! The control loop.
//!
//! [`ControlLoop`] owns every piece of mutable state: the session, the
//! indicators and the link. Nothing else mutates them. Button handlers
//! only post an [`Edge`] into a channel, and [`run_until`] feeds those
//! edges and a fixed-rate tick into the loop on a single task.

use crate::config::LinkConfig;
use crate::error::Result;
use crate::indicator::{IndicatorDriver, OutputPins, OutputState};
use crate::input::Edge;
use crate::link::{parse_reading, ControlMessage, Datagram, DatagramLink, Reading};
use crate::session::{EdgeOutcome, SessionController, SessionState, Thresholds};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Counters kept for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    /// Sessions started
    pub sessions: u64,
    /// Readings accepted and displayed
    pub readings: u64,
    /// Payloads that did not parse
    pub malformed: u64,
    /// Times a session went into fault
    pub faults: u64,
    /// Most recent accepted reading
    pub last_reading: Option<Reading>,
}

/// Point-in-time view of the loop, logged on shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopReport {
    pub state: SessionState,
    /// Started and not yet stopped (Active or Fault)
    pub in_session: bool,
    /// Fault indicator currently blinking
    pub blinking: bool,
    /// Silence since the last reading or session start, while in session
    pub silence_ms: Option<u64>,
    pub timeout_ms: u64,
    pub low_threshold: u32,
    pub medium_threshold: u32,
    pub outputs: OutputState,
    pub stats: LoopStats,
}

pub struct ControlLoop<L: DatagramLink, O: OutputPins> {
    session: SessionController,
    indicators: IndicatorDriver<O>,
    link: L,
    thresholds: Thresholds,
    stats: LoopStats,
}

impl<L: DatagramLink, O: OutputPins> ControlLoop<L, O> {
    pub fn new(config: &LinkConfig, link: L, outputs: O) -> Result<Self> {
        config.validate()?;
        let thresholds = Thresholds::new(config.low_threshold, config.medium_threshold)?;

        Ok(Self {
            session: SessionController::new(config.timeout(), config.debounce()),
            indicators: IndicatorDriver::new(outputs, config.blink_period()),
            link,
            thresholds,
            stats: LoopStats::default(),
        })
    }

    /// React to a button press.
    pub fn handle_edge(&mut self, now: Instant) -> EdgeOutcome {
        let outcome = self.session.on_edge(now);
        match outcome {
            EdgeOutcome::Started => {
                self.stats.sessions += 1;
                self.notify(ControlMessage::Start);
                self.indicators.session_started();
            }
            EdgeOutcome::Stopped => {
                self.notify(ControlMessage::Stop);
                self.indicators.all_off();
                info!("System reset to initial state");
            }
            EdgeOutcome::Debounced => {}
        }
        outcome
    }

    /// One poll interval: receive at most one datagram, check for
    /// staleness, advance the fault blink.
    pub fn tick(&mut self, now: Instant) {
        if self.session.state() == SessionState::Active {
            match self.link.poll_datagram() {
                Ok(Some(datagram)) => self.handle_datagram(&datagram, now),
                Ok(None) => {}
                Err(e) => warn!("Failed to receive from sensor node: {}", e),
            }
        }

        if self.session.on_timeout_check(now) {
            self.stats.faults += 1;
            self.indicators.begin_blink(now);
        }

        self.indicators.tick(now);
    }

    /// Switch every output off. Runs on every exit path of [`run_until`].
    pub fn shutdown(&mut self) {
        self.indicators.all_off();
        info!("Indicators cleared");
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn outputs(&self) -> OutputState {
        self.indicators.state()
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn report(&self, now: Instant) -> LoopReport {
        let state = self.session.state();
        LoopReport {
            state,
            in_session: state.in_session(),
            blinking: self.indicators.is_blinking(),
            silence_ms: self
                .session
                .since_last_reading(now)
                .map(|silence| silence.as_millis() as u64),
            timeout_ms: self.session.timeout().as_millis() as u64,
            low_threshold: self.thresholds.low(),
            medium_threshold: self.thresholds.medium(),
            outputs: self.indicators.state(),
            stats: self.stats.clone(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    fn handle_datagram(&mut self, datagram: &Datagram, now: Instant) {
        match parse_reading(&datagram.payload) {
            Ok(reading) => {
                let level = self.thresholds.classify(reading);
                info!(
                    "Received light sensor value: {} from {} ({:?})",
                    reading, datagram.from, level
                );
                self.indicators.apply_level(level);
                self.session.record_reading(now);
                self.stats.readings += 1;
                self.stats.last_reading = Some(reading);
            }
            Err(e) => {
                // Staleness timer is left alone so a chatty but broken node still faults.
                warn!("Discarding payload from {}: {}", datagram.from, e);
                self.stats.malformed += 1;
            }
        }
    }

    fn notify(&mut self, message: ControlMessage) {
        if let Err(e) = self.link.send(message) {
            warn!("{}", e);
        }
    }
}

/// Drive `control` until `shutdown` completes, then clear the outputs.
///
/// Edges are applied as they arrive; everything else happens on a
/// `poll_interval` tick. The loop is handed back so the caller decides
/// when the link and pins are released.
pub async fn run_until<L, O, F>(
    mut control: ControlLoop<L, O>,
    mut edges: mpsc::Receiver<Edge>,
    poll_interval: Duration,
    shutdown: F,
) -> ControlLoop<L, O>
where
    L: DatagramLink,
    O: OutputPins,
    F: Future<Output = ()>,
{
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Press the button to start/stop UDP communication...");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            Some(edge) = edges.recv() => {
                control.handle_edge(edge.at);
            }
            _ = ticker.tick() => {
                control.tick(Instant::now());
            }
        }
    }

    control.shutdown();
    control
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use crate::indicator::MemoryOutputs;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct QueueLink {
        sent: Vec<ControlMessage>,
        inbound: VecDeque<Vec<u8>>,
        fail_sends: bool,
    }

    impl DatagramLink for QueueLink {
        fn send(&mut self, message: ControlMessage) -> Result<()> {
            self.sent.push(message);
            if self.fail_sends {
                return Err(LinkError::network_error("unreachable"));
            }
            Ok(())
        }

        fn poll_datagram(&mut self) -> Result<Option<Datagram>> {
            Ok(self.inbound.pop_front().map(|payload| Datagram {
                payload,
                from: "127.0.0.1:8266".parse().unwrap(),
            }))
        }
    }

    fn control(link: QueueLink) -> ControlLoop<QueueLink, MemoryOutputs> {
        ControlLoop::new(&LinkConfig::default(), link, MemoryOutputs::new()).unwrap()
    }

    #[test]
    fn test_idle_does_not_poll() {
        let t0 = Instant::now();
        let mut link = QueueLink::default();
        link.inbound.push_back(b"900".to_vec());
        let mut c = control(link);

        c.tick(t0);
        assert_eq!(c.link().inbound.len(), 1);
        assert!(c.outputs().all_off());
    }

    #[test]
    fn test_one_datagram_per_tick() {
        let t0 = Instant::now();
        let mut c = control(QueueLink::default());
        c.handle_edge(t0);
        c.link_mut().inbound.extend([b"100".to_vec(), b"800".to_vec()]);

        c.tick(t0);
        assert_eq!(c.outputs().levels(), (true, false, false));
        c.tick(t0 + Duration::from_millis(100));
        assert_eq!(c.outputs().levels(), (true, true, true));
        assert_eq!(c.stats().readings, 2);
    }

    #[test]
    fn test_failed_send_still_transitions() {
        let t0 = Instant::now();
        let mut c = control(QueueLink {
            fail_sends: true,
            ..QueueLink::default()
        });

        assert_eq!(c.handle_edge(t0), EdgeOutcome::Started);
        assert_eq!(c.state(), SessionState::Active);
        assert_eq!(c.link().sent, vec![ControlMessage::Start]);
    }

    #[test]
    fn test_session_start_lights_white() {
        let t0 = Instant::now();
        let mut c = control(QueueLink::default());
        c.handle_edge(t0);
        assert!(c.outputs().white);
        assert_eq!(c.outputs().levels(), (false, false, false));
    }

    #[test]
    fn test_report_tracks_fault() {
        let t0 = Instant::now();
        let mut c = control(QueueLink::default());

        let idle = c.report(t0);
        assert!(!idle.in_session);
        assert_eq!(idle.silence_ms, None);
        assert_eq!((idle.low_threshold, idle.medium_threshold), (300, 700));
        assert_eq!(idle.timeout_ms, 10_000);

        c.handle_edge(t0);
        c.tick(t0 + Duration::from_secs(10));
        let faulted = c.report(t0 + Duration::from_millis(10_250));
        assert_eq!(faulted.state, SessionState::Fault);
        assert!(faulted.in_session);
        assert!(faulted.blinking);
        assert_eq!(faulted.silence_ms, Some(10_250));
        assert_eq!(faulted.stats.faults, 1);

        c.handle_edge(t0 + Duration::from_secs(11));
        let stopped = c.report(t0 + Duration::from_secs(11));
        assert!(!stopped.in_session);
        assert!(!stopped.blinking);
        assert!(stopped.outputs.all_off());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = LinkConfig::default().with_thresholds(700, 300);
        let result = ControlLoop::new(&config, QueueLink::default(), MemoryOutputs::new());
        assert!(result.is_err());
    }
}
