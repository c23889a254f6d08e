use std::io::{self, Write};

use thiserror::Error;
use tracing::warn;

use crate::kitchen::StationKind;

/// A short tone. Sinks that cannot synthesize pitch may ignore the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Cue {
    pub const MANUAL_STEP: Cue = Cue::new(1000, 300);
    pub const AUTO_STEP: Cue = Cue::new(1100, 400);

    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    pub fn for_station(kind: StationKind) -> Self {
        match kind {
            StationKind::CuttingBoard => Cue::new(600, 150),
            StationKind::Pan => Cue::new(800, 200),
            StationKind::Pot => Cue::new(700, 250),
            StationKind::Oven => Cue::new(900, 250),
            StationKind::Plate => Cue::new(1200, 300),
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable: {0}")]
    Unavailable(#[from] io::Error),
}

pub trait CueSink {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MutedSink;

impl CueSink for MutedSink {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Rings the terminal bell for every cue
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CueSink for TerminalBell<W> {
    fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Plays a cue, logging and swallowing any failure.
pub fn play_cue(sink: &mut dyn CueSink, cue: Cue) {
    if let Err(err) = sink.play(cue) {
        warn!(%err, frequency_hz = cue.frequency_hz, "audio cue dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl CueSink for BrokenSink {
        fn play(&mut self, _cue: Cue) -> Result<(), AudioError> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "no audio device").into())
        }
    }

    #[test]
    fn station_cues_are_distinct() {
        let kinds = [
            StationKind::CuttingBoard,
            StationKind::Pan,
            StationKind::Pot,
            StationKind::Oven,
            StationKind::Plate,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(Cue::for_station(*a), Cue::for_station(*b));
            }
        }
    }

    #[test]
    fn bell_writes_bel_byte() {
        let mut bell = TerminalBell::new(Vec::new());
        bell.play(Cue::AUTO_STEP).unwrap();
        bell.play(Cue::MANUAL_STEP).unwrap();
        assert_eq!(bell.out, b"\x07\x07");
    }

    #[test]
    fn failing_sink_is_swallowed() {
        let mut sink = BrokenSink;
        play_cue(&mut sink, Cue::for_station(StationKind::Pan));
    }
}
