//! A single non-interacting particle and its age-derived visual curve.

use glam::Vec3;
use rand::Rng;

use crate::config::SimulationConfig;
use crate::constants::{
    GENTLE_CLEAR_FADE_SECS, GHOST_ALPHA_SCALE, GHOST_EASE_EXPONENT, TURBULENCE_PHASE_RANGE,
    TURBULENCE_Z_PHASE_SCALE, ZEN_MIN_SIZE_RATIO, ZEN_RAMP_START_RATIO,
};

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left; negative during the ghost phase.
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub turbulence_phase: f32,
    clearing: bool,
    clear_start_life: Option<f32>,
}

impl Particle {
    /// Snapshots lifespan and samples size and turbulence phase from `rng`.
    pub fn new<R: Rng + ?Sized>(
        position: Vec3,
        velocity: Vec3,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Self {
        let size = config.base_size + (rng.gen::<f32>() - 0.5) * config.size_variation;
        let turbulence_phase = rng.gen::<f32>() * TURBULENCE_PHASE_RANGE;
        Self {
            position,
            velocity,
            life: config.lifespan,
            max_life: config.lifespan,
            size,
            turbulence_phase,
            clearing: false,
            clear_start_life: None,
        }
    }

    /// Advance by `dt` seconds and report whether the particle survives.
    ///
    /// `time_secs` drives turbulence. `clearing` is the system-wide gentle
    /// clear flag; the first step that observes it caps the remaining life.
    pub fn step(
        &mut self,
        dt: f32,
        config: &SimulationConfig,
        time_secs: f64,
        clearing: bool,
    ) -> bool {
        if clearing && !self.clearing {
            self.clearing = true;
            self.clear_start_life = Some(self.life);
            self.life = self.life.min(GENTLE_CLEAR_FADE_SECS);
        } else if !clearing {
            self.clearing = false;
        }

        self.velocity.y += config.gravity * dt;
        self.velocity *= 1.0 - config.air_resistance * dt;
        self.velocity += config.wind * dt;

        let phase = self.turbulence_phase as f64;
        let wobble_x = (time_secs + phase).sin() as f32;
        let wobble_z = (time_secs + phase * TURBULENCE_Z_PHASE_SCALE as f64).cos() as f32;
        self.velocity.x += wobble_x * config.turbulence * dt;
        self.velocity.z += wobble_z * config.turbulence * dt;

        self.position += self.velocity * dt;
        self.life -= dt;

        self.is_alive(config)
    }

    pub fn is_alive(&self, config: &SimulationConfig) -> bool {
        if config.zen_mode {
            self.life > -config.ghost_duration
        } else {
            self.life > 0.0
        }
    }

    /// 1 at birth, 0 at nominal death, negative while a ghost.
    pub fn life_ratio(&self) -> f32 {
        if self.max_life > 0.0 {
            self.life / self.max_life
        } else {
            0.0
        }
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    /// Remaining life at the moment a gentle clear first reached this particle.
    pub fn clear_start_life(&self) -> Option<f32> {
        self.clear_start_life
    }

    pub fn alpha(&self, config: &SimulationConfig) -> f32 {
        let ratio = self.life_ratio();
        if !config.zen_mode {
            return config.opacity * ratio.max(0.0);
        }
        if ratio > ZEN_RAMP_START_RATIO {
            config.opacity
        } else if ratio > 0.0 {
            config.opacity * (ratio / ZEN_RAMP_START_RATIO)
        } else {
            // Jumps from ~0 to 0.6 * opacity as the ghost phase begins.
            let ghost_ratio = if config.ghost_duration > 0.0 {
                (1.0 + self.life / config.ghost_duration).max(0.0)
            } else {
                0.0
            };
            config.opacity * GHOST_ALPHA_SCALE * ghost_ratio.powf(GHOST_EASE_EXPONENT)
        }
    }

    /// Interpolation factor from start colour (0) to end colour (1).
    pub fn color_lerp(&self, config: &SimulationConfig) -> f32 {
        let onset = config.color_lerp_onset;
        if onset <= 0.0 {
            return 0.0;
        }
        let ratio = self.life_ratio();
        if ratio < onset {
            (1.0 - ratio / onset).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn render_size(&self, config: &SimulationConfig) -> f32 {
        let ratio = self.life_ratio();
        let scale = if config.zen_mode {
            ratio.max(ZEN_MIN_SIZE_RATIO)
        } else {
            ratio
        };
        (self.size * scale).max(0.0)
    }
}
