use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tracing::debug;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum ShellEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Redraw interval elapsed without input
    Tick,
    /// One second of session time, tagged with the session that started
    /// the [`SecondTicker`] so stale ticks can be told apart
    Second(u64),
}

/// Source of terminal events (keyboard, mouse, resize, etc.)
pub trait ShellEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<ShellEvent, RecvTimeoutError>;

    /// Sender that injects events into this source, used by session tickers
    fn sender(&self) -> Sender<ShellEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<ShellEvent>,
    rx: Receiver<ShellEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => ShellEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => ShellEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => ShellEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    debug!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if reader_tx.send(ev).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ShellEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ShellEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    tx: Sender<ShellEvent>,
    rx: Receiver<ShellEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ShellEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<ShellEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: ShellEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: ShellEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> ShellEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => ShellEvent::Tick,
        }
    }

    pub fn sender(&self) -> Sender<ShellEvent> {
        self.event_source.sender()
    }
}

/// Background thread posting [`ShellEvent::Second`] at a fixed interval.
/// Stops on [`cancel`](Self::cancel) or drop.
pub struct SecondTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SecondTicker {
    pub fn start(tx: Sender<ShellEvent>, session: u64) -> Self {
        Self::with_interval(tx, session, Duration::from_secs(1))
    }

    pub fn with_interval(tx: Sender<ShellEvent>, session: u64, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(ShellEvent::Second(session)).is_err() {
                        break;
                    }
                }
                // stop requested or the ticker handle is gone
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the thread and waits for it. No `Second` is sent afterwards.
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SecondTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_tick_on_timeout() {
        let es = TestEventSource::new();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            ShellEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let es = TestEventSource::new();
        es.sender().send(ShellEvent::Resize).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            ShellEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn second_ticker_posts_seconds() {
        let (tx, rx) = mpsc::channel();
        let _ticker = SecondTicker::with_interval(tx, 7, Duration::from_millis(5));
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(ShellEvent::Second(7)) => {}
            other => panic!("expected Second, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_ticker_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = SecondTicker::with_interval(tx, 1, Duration::from_millis(5));
        ticker.cancel();
        assert!(!ticker.is_running());

        // drain anything sent before the cancel, then expect silence
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn dropped_ticker_stops_thread() {
        let (tx, rx) = mpsc::channel();
        drop(SecondTicker::with_interval(tx, 1, Duration::from_millis(5)));
        while rx.try_recv().is_ok() {}
        // the only sender lived in the joined thread
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        ));
    }
}
