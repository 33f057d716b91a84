#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure sound system that turns status transitions into tone requests.
//!
//! The system does not produce audio itself. Audio adapters play the emitted
//! [`Tone`] values with whatever backend they have available.

use std::time::Duration;

use drift_core::{Event, SimulationStatus};

/// Frequencies, in hertz, associated with each simulation status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneTable {
    /// Tone played while the current path can keep advancing.
    pub ok: f32,
    /// Tone played when a path loops.
    pub looped: f32,
    /// Tone played when a path falls off the board.
    pub fell: f32,
    /// Tone played once the board is complete.
    pub complete: f32,
}

impl Default for ToneTable {
    fn default() -> Self {
        Self {
            ok: 440.0,
            looped: 880.0,
            fell: 220.0,
            complete: 110.0,
        }
    }
}

impl ToneTable {
    /// Frequency mapped to the provided status.
    #[must_use]
    pub const fn frequency(&self, status: SimulationStatus) -> f32 {
        match status {
            SimulationStatus::Ok => self.ok,
            SimulationStatus::Loop => self.looped,
            SimulationStatus::Fell => self.fell,
            SimulationStatus::Complete => self.complete,
        }
    }
}

/// Linear attack/release gain envelope shared by every tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    /// Gain reached at the end of the attack.
    pub peak_gain: f32,
    /// Time taken to ramp from silence to `peak_gain`.
    pub attack: Duration,
    /// Time at which the gain is back to silence, measured from the tone start.
    pub release: Duration,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            peak_gain: 0.5,
            attack: Duration::from_millis(50),
            release: Duration::from_millis(200),
        }
    }
}

impl Envelope {
    /// Gain at `elapsed` time since the tone started.
    ///
    /// Audio adapters sample this curve to shape the oscillator volume; the
    /// system itself never plays sound.
    #[must_use]
    pub fn gain_at(&self, elapsed: Duration) -> f32 {
        if elapsed >= self.release {
            return 0.0;
        }
        if elapsed < self.attack {
            return self.peak_gain * (elapsed.as_secs_f32() / self.attack.as_secs_f32());
        }

        let decay = self.release.saturating_sub(self.attack).as_secs_f32();
        if decay <= f32::EPSILON {
            return 0.0;
        }
        let into_decay = (elapsed - self.attack).as_secs_f32();
        self.peak_gain * (1.0 - into_decay / decay)
    }
}

/// Request to play a single tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    /// Status that triggered the tone.
    pub status: SimulationStatus,
    /// Oscillator frequency in hertz.
    pub frequency: f32,
    /// Gain envelope applied while the tone plays.
    pub envelope: Envelope,
}

/// Pure system that reacts to status events with tone requests.
#[derive(Debug, Default)]
pub struct Sound {
    tones: ToneTable,
    envelope: Envelope,
    muted: bool,
}

impl Sound {
    /// Creates a sound system using the provided tone table and envelope.
    #[must_use]
    pub fn new(tones: ToneTable, envelope: Envelope) -> Self {
        Self {
            tones,
            envelope,
            muted: false,
        }
    }

    /// Silences or re-enables tone emission.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Emits one tone for every status event in `events`.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Tone>) {
        if self.muted {
            return;
        }

        for event in events {
            if let Event::StatusChanged { status } = event {
                out.push(Tone {
                    status: *status,
                    frequency: self.tones.frequency(*status),
                    envelope: self.envelope,
                });
            }
        }
    }
}
