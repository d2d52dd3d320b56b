//! Platform-free composition of the toy: particle system, camera,
//! gesture driver and note selection behind one frame/pointer API.
//!
//! Front-ends forward raw pointer events and frame ticks here, upload
//! `system().buffers()` each frame and play the drained `NoteCommand`s.

use glam::Vec2;

use crate::camera::OrbitCamera;
use crate::config::{BlendMode, ConfigError, Preset};
use crate::interaction::{Gesture, Gestures, InteractionDriver, PointerKind};
use crate::music::{NoteCommand, NotePlayer};
use crate::stats::{FrameStats, StatsReport};
use crate::system::{clamp_frame_dt, ParticleSystem};

pub struct Scene {
    system: ParticleSystem,
    camera: OrbitCamera,
    driver: InteractionDriver,
    notes: NotePlayer,
    stats: FrameStats,
    preset: Preset,
    paused: bool,
    skip_next_dt: bool,
    pending_notes: Vec<NoteCommand>,
}

impl Scene {
    pub fn new(preset: Preset, viewport: Vec2, seed: u64) -> Self {
        Self::with_system(preset, ParticleSystem::new(preset.config(), seed), viewport, seed)
    }

    /// Build around an existing system, e.g. one driven by a manual clock.
    pub fn with_system(preset: Preset, system: ParticleSystem, viewport: Vec2, seed: u64) -> Self {
        log::info!("[scene] preset={} viewport={}x{}", preset.name(), viewport.x, viewport.y);
        Self {
            system,
            camera: OrbitCamera::new(viewport),
            driver: InteractionDriver::new(),
            notes: NotePlayer::new(preset.sound_mode(), seed ^ 0x9E37_79B9_7F4A_7C15),
            stats: FrameStats::default(),
            preset,
            paused: false,
            skip_next_dt: false,
            pending_notes: Vec::new(),
        }
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn notes(&self) -> &NotePlayer {
        &self.notes
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.system.config().blend_mode
    }

    pub fn point_scale(&self) -> f32 {
        self.preset.point_scale()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance one rendered frame. `dt_sec` is the wall-clock frame delta.
    pub fn frame(&mut self, dt_sec: f32, now_ms: f64) -> Option<StatsReport> {
        let dt = if self.skip_next_dt {
            self.skip_next_dt = false;
            0.0
        } else {
            clamp_frame_dt(dt_sec)
        };
        if !self.paused {
            self.system.step(dt);
        }
        self.notes.tick(now_ms, &mut self.pending_notes);
        let report = self.stats.record(dt_sec, self.system.live_count());
        if let Some(r) = report {
            log::debug!("[scene] fps={} live={}", r.fps, r.live_particles);
        }
        report
    }

    /// Flip between playing and paused; returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            self.skip_next_dt = true;
        }
        log::info!("[scene] {}", if self.paused { "paused" } else { "playing" });
        self.paused
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.camera.resize(viewport);
    }

    pub fn pointer_down(&mut self, screen: Vec2, kind: PointerKind, now_ms: f64) {
        let gestures = self.driver.pointer_down(screen, kind, now_ms);
        self.apply(gestures, now_ms);
    }

    pub fn pointer_move(&mut self, screen: Vec2, now_ms: f64) {
        let gestures = self
            .driver
            .pointer_move(screen, now_ms, self.system.config(), &self.camera);
        self.apply(gestures, now_ms);
    }

    pub fn pointer_up(&mut self, screen: Vec2, now_ms: f64) {
        let gestures = self
            .driver
            .pointer_up(screen, now_ms, self.system.config(), &self.camera);
        self.apply(gestures, now_ms);
    }

    pub fn pointer_cancel(&mut self, now_ms: f64) {
        let gestures = self.driver.cancel();
        self.apply(gestures, now_ms);
    }

    pub fn orbit_begin(&mut self, screen: Vec2) {
        self.driver.orbit_begin(screen);
    }

    pub fn orbit_move(&mut self, screen: Vec2) {
        if let Some(delta) = self.driver.orbit_move(screen) {
            self.camera.rotate(delta);
        }
    }

    pub fn orbit_end(&mut self) {
        self.driver.orbit_end();
    }

    fn apply(&mut self, gestures: Gestures, now_ms: f64) {
        let viewport = self.camera.viewport;
        for gesture in gestures {
            match gesture {
                Gesture::Press { screen } => {
                    self.notes.press(screen, viewport, &mut self.pending_notes);
                }
                Gesture::Drag { screen, prev } => {
                    self.notes.drag(screen, prev, viewport, now_ms, &mut self.pending_notes);
                }
                Gesture::Trail { count, position } => {
                    self.system.emit(count, position);
                }
                Gesture::Tap { count, position } => {
                    self.system.emit(count, position);
                    self.notes.tap(&mut self.pending_notes);
                }
                Gesture::Release => self.notes.release(now_ms),
            }
        }
    }

    pub fn gentle_clear(&mut self) {
        self.system.gentle_clear();
    }

    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.system.set_param(key, value)
    }

    /// Switch tuning; live particles stay and adopt the new forces.
    pub fn apply_preset(&mut self, preset: Preset) {
        log::info!("[scene] preset {} -> {}", self.preset.name(), preset.name());
        self.preset = preset;
        self.system.reconfigure(preset.config());
        self.notes.set_mode(preset.sound_mode(), &mut self.pending_notes);
    }

    pub fn reset_defaults(&mut self) {
        self.apply_preset(self.preset);
    }

    pub fn cycle_blend_mode(&mut self) -> BlendMode {
        let next = self.blend_mode().next();
        let mut config = self.system.config().clone();
        config.blend_mode = next;
        self.system.reconfigure(config);
        log::info!("[scene] blend mode {}", next);
        next
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.notes.set_enabled(enabled, &mut self.pending_notes);
    }

    /// Take the note commands produced since the last call.
    pub fn drain_notes(&mut self) -> Vec<NoteCommand> {
        std::mem::take(&mut self.pending_notes)
    }
}
