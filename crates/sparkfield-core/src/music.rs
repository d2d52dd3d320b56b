//! Note selection for the audio layer.
//!
//! This decides which notes sound and when; turning `NoteCommand`s into
//! audio is the front-end's job.

use glam::Vec2;
use rand::prelude::*;

use crate::constants::{
    CHORD_DURATION_SEC, MAJOR_TRIAD, SUSTAIN_NOTE_THROTTLE_MS, SUSTAIN_RELEASE_DELAY_MS,
    TRAIL_NOTE_DURATION_SEC, TRIGGER_NOTE_THROTTLE_MS,
};

/// Cycled while dragging in trigger mode; also the pool of chord roots.
pub const SYNTHWAVE_NOTES: &[&str] = &[
    "C4", "E4", "G4", "B4", "C5", // C major
    "G3", "B3", "D4", "G4", // G major
    "A3", "C4", "E4", "A4", // A minor
    "F3", "A3", "C4", "F4", // F major
    "D4", "F4", "A4", "C5", // D minor
    "E4", "G4", "B4", "D5", // E minor
    "C4", "G4", "E5", "C5", // spaced out
    "G3", "D4", "A4", "E5",
];

/// Pitch table for position-mapped sustained notes, low to high.
pub const MINOR_SCALE_NOTES: &[&str] = &[
    "A2", "B2", "C3", "D3", "E3", "F3", "G3", "A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4",
    "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5", "C6", "D6", "E6",
];

const FALLBACK_MIDI: i32 = 57; // A3

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SoundMode {
    /// Short notes fired from a fixed sequence while dragging.
    #[default]
    Trigger,
    /// One held note whose pitch follows the pointer.
    Sustain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Voice {
    Lead,
    Bass,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteCommand {
    /// Attack and release after `duration_sec`.
    Play {
        voice: Voice,
        frequency_hz: f32,
        velocity: f32,
        duration_sec: f32,
    },
    /// Attack and hold until a matching `Release`.
    Attack {
        voice: Voice,
        frequency_hz: f32,
        velocity: f32,
    },
    Release {
        voice: Voice,
    },
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Parse scientific pitch notation (`C4`, `A#2`, `Eb3`) into a MIDI number.
pub fn note_to_midi(name: &str) -> Option<i32> {
    let mut chars = name.trim().chars();
    let pitch_class = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next()? {
        '#' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;
    Some((octave + 1) * 12 + pitch_class + accidental)
}

fn table_midi(table: &[&str], index: usize) -> i32 {
    table
        .get(index)
        .and_then(|n| note_to_midi(n))
        .unwrap_or(FALLBACK_MIDI)
}

/// Map a screen position to a pitch: x picks one of 16 steps, y shifts the
/// step by whole groups of four.
pub fn position_note_midi(screen: Vec2, viewport: Vec2) -> i32 {
    let nx = (screen.x / viewport.x.max(1.0)).clamp(0.0, 1.0);
    let ny = (screen.y / viewport.y.max(1.0)).clamp(0.0, 1.0);
    let base = (nx * 16.0).floor() as usize;
    let shift = (ny * 4.0).floor() as usize;
    let index = (base + shift * 4).min(MINOR_SCALE_NOTES.len() - 1);
    table_midi(MINOR_SCALE_NOTES, index)
}

/// Faster pointer movement plays louder, from 0.3 up to 1.0.
pub fn movement_velocity(screen: Vec2, prev: Option<Vec2>) -> f32 {
    let speed = prev.map_or(0.0, |p| screen.distance(p));
    (0.3 + (speed / 50.0) * 0.7).min(1.0)
}

pub struct NotePlayer {
    mode: SoundMode,
    enabled: bool,
    rng: StdRng,
    next_index: usize,
    last_note_ms: Option<f64>,
    held_midi: Option<i32>,
    release_at_ms: Option<f64>,
}

impl NotePlayer {
    pub fn new(mode: SoundMode, seed: u64) -> Self {
        Self {
            mode,
            enabled: true,
            rng: StdRng::seed_from_u64(seed),
            next_index: 0,
            last_note_ms: None,
            held_midi: None,
            release_at_ms: None,
        }
    }

    pub fn mode(&self) -> SoundMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn held_midi(&self) -> Option<i32> {
        self.held_midi
    }

    pub fn set_mode(&mut self, mode: SoundMode, out: &mut Vec<NoteCommand>) {
        if mode != self.mode {
            self.release_now(out);
            self.mode = mode;
            self.last_note_ms = None;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool, out: &mut Vec<NoteCommand>) {
        if !enabled {
            self.release_now(out);
        }
        if enabled != self.enabled {
            log::info!("[audio] {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn press(&mut self, screen: Vec2, viewport: Vec2, out: &mut Vec<NoteCommand>) {
        if self.enabled && self.mode == SoundMode::Sustain {
            self.sustain(screen, None, viewport, out);
        }
    }

    pub fn drag(
        &mut self,
        screen: Vec2,
        prev: Vec2,
        viewport: Vec2,
        now_ms: f64,
        out: &mut Vec<NoteCommand>,
    ) {
        if !self.enabled {
            return;
        }
        let throttle = match self.mode {
            SoundMode::Trigger => TRIGGER_NOTE_THROTTLE_MS,
            SoundMode::Sustain => SUSTAIN_NOTE_THROTTLE_MS,
        };
        if self.last_note_ms.is_some_and(|t| now_ms - t <= throttle) {
            return;
        }
        self.last_note_ms = Some(now_ms);
        match self.mode {
            SoundMode::Trigger => self.play_next_in_sequence(out),
            SoundMode::Sustain => self.sustain(screen, Some(prev), viewport, out),
        }
    }

    /// A major triad over a random sequence root.
    pub fn tap(&mut self, out: &mut Vec<NoteCommand>) {
        if !self.enabled {
            return;
        }
        let root = table_midi(SYNTHWAVE_NOTES, self.rng.gen_range(0..SYNTHWAVE_NOTES.len()));
        for interval in MAJOR_TRIAD {
            out.push(NoteCommand::Play {
                voice: Voice::Lead,
                frequency_hz: midi_to_hz((root + interval) as f32),
                velocity: 1.0,
                duration_sec: CHORD_DURATION_SEC,
            });
        }
    }

    /// Pointer lifted: reset the drag throttle and let a held note ring out
    /// briefly.
    pub fn release(&mut self, now_ms: f64) {
        self.last_note_ms = None;
        if self.held_midi.is_some() {
            self.release_at_ms = Some(now_ms + SUSTAIN_RELEASE_DELAY_MS);
        }
    }

    /// Fire any scheduled release that is due.
    pub fn tick(&mut self, now_ms: f64, out: &mut Vec<NoteCommand>) {
        if self.release_at_ms.is_some_and(|t| now_ms >= t) {
            self.release_now(out);
        }
    }

    fn release_now(&mut self, out: &mut Vec<NoteCommand>) {
        if self.held_midi.take().is_some() {
            out.push(NoteCommand::Release { voice: Voice::Lead });
        }
        self.release_at_ms = None;
    }

    fn play_next_in_sequence(&mut self, out: &mut Vec<NoteCommand>) {
        let midi = table_midi(SYNTHWAVE_NOTES, self.next_index);
        self.next_index = (self.next_index + 1) % SYNTHWAVE_NOTES.len();
        let frequency_hz = midi_to_hz(midi as f32);
        for voice in [Voice::Lead, Voice::Bass] {
            out.push(NoteCommand::Play {
                voice,
                frequency_hz,
                velocity: 1.0,
                duration_sec: TRAIL_NOTE_DURATION_SEC,
            });
        }
    }

    fn sustain(
        &mut self,
        screen: Vec2,
        prev: Option<Vec2>,
        viewport: Vec2,
        out: &mut Vec<NoteCommand>,
    ) {
        let midi = position_note_midi(screen, viewport);
        if self.held_midi != Some(midi) {
            if self.held_midi.is_some() {
                out.push(NoteCommand::Release { voice: Voice::Lead });
            }
            out.push(NoteCommand::Attack {
                voice: Voice::Lead,
                frequency_hz: midi_to_hz(midi as f32),
                velocity: movement_velocity(screen, prev),
            });
            self.held_midi = Some(midi);
        }
        self.release_at_ms = None;
    }
}
