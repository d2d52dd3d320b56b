//! Fixed-capacity particle pool: emission, integration, expiry and the
//! render buffers handed to the renderer each frame.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::constants::{GENTLE_CLEAR_FADE_SECS, MAX_CAPACITY, MAX_FRAME_DT_SEC};
use crate::particle::Particle;

/// GPU upload layout for one point sprite.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

/// Parallel attribute buffers, all sized to the configured capacity.
///
/// Slots `[0, live)` mirror the live particles in the same order; the rest
/// are zeroed so the renderer never sees stale data.
#[derive(Clone, Debug, Default)]
pub struct RenderBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    pub alphas: Vec<f32>,
}

impl RenderBuffers {
    pub fn new(capacity: usize) -> Self {
        let mut buffers = Self::default();
        buffers.resize(capacity);
        buffers
    }

    pub fn capacity(&self) -> usize {
        self.sizes.len()
    }

    fn resize(&mut self, capacity: usize) {
        let capacity = capacity.min(MAX_CAPACITY);
        self.positions.resize(capacity.saturating_mul(3), 0.0);
        self.colors.resize(capacity.saturating_mul(3), 0.0);
        self.sizes.resize(capacity, 0.0);
        self.alphas.resize(capacity, 0.0);
    }

    fn write(&mut self, i: usize, position: Vec3, color: [f32; 3], size: f32, alpha: f32) {
        self.positions[i * 3..i * 3 + 3].copy_from_slice(&position.to_array());
        self.colors[i * 3..i * 3 + 3].copy_from_slice(&color);
        self.sizes[i] = size;
        self.alphas[i] = alpha;
    }

    fn zero_from(&mut self, start: usize) {
        self.positions[start * 3..].fill(0.0);
        self.colors[start * 3..].fill(0.0);
        self.sizes[start..].fill(0.0);
        self.alphas[start..].fill(0.0);
    }

    pub fn instance(&self, i: usize) -> ParticleInstance {
        ParticleInstance {
            position: [
                self.positions[i * 3],
                self.positions[i * 3 + 1],
                self.positions[i * 3 + 2],
            ],
            size: self.sizes[i],
            color: [self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]],
            alpha: self.alphas[i],
        }
    }

    /// Interleave the first `count` slots for upload.
    pub fn write_instances(&self, count: usize, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend((0..count.min(self.capacity())).map(|i| self.instance(i)));
    }
}

/// Bound a wall-clock frame delta so a stalled frame cannot destabilise the
/// drag term.
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT_SEC)
    } else {
        0.0
    }
}

pub struct ParticleSystem {
    config: SimulationConfig,
    particles: Vec<Particle>,
    buffers: RenderBuffers,
    emission_accumulator: f32,
    // Simulated seconds since the last gentle clear, while one is active.
    clear_elapsed: Option<f32>,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl ParticleSystem {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::with_clock(config, seed, SystemClock::new())
    }

    pub fn with_clock(
        mut config: SimulationConfig,
        seed: u64,
        clock: impl Clock + 'static,
    ) -> Self {
        config.capacity = config.capacity.min(MAX_CAPACITY);
        let buffers = RenderBuffers::new(config.capacity);
        Self {
            config,
            particles: Vec::new(),
            buffers,
            emission_accumulator: 0.0,
            clear_elapsed: None,
            rng: StdRng::seed_from_u64(seed),
            clock: Box::new(clock),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn buffers(&self) -> &RenderBuffers {
        &self.buffers
    }

    pub fn is_clearing(&self) -> bool {
        self.clear_elapsed.is_some()
    }

    /// Replace the configuration. Shrinking capacity evicts the oldest
    /// particles so the live set never exceeds it; capacity is capped at
    /// `MAX_CAPACITY`.
    pub fn reconfigure(&mut self, mut config: SimulationConfig) {
        config.capacity = config.capacity.min(MAX_CAPACITY);
        let capacity = config.capacity;
        if capacity != self.config.capacity {
            log::info!(
                "[particles] capacity {} -> {}",
                self.config.capacity,
                capacity
            );
        }
        self.config = config;
        if self.particles.len() > capacity {
            let excess = self.particles.len() - capacity;
            self.particles.drain(..excess);
            log::debug!("[particles] evicted {} oldest particles", excess);
        }
        self.buffers.resize(capacity);
        self.repack_buffers();
    }

    /// Edit one field by control id; see [`SimulationConfig::set_param`].
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.config.clone();
        if let Err(e) = next.set_param(key, value) {
            log::warn!("[particles] rejected {}={:?}: {}", key, value, e);
            return Err(e);
        }
        self.reconfigure(next);
        Ok(())
    }

    /// Emit up to `count` particles at `origin`, stopping at capacity.
    /// Returns how many were created.
    pub fn emit(&mut self, count: usize, origin: Vec3) -> usize {
        let mut emitted = 0;
        while emitted < count && self.spawn(origin) {
            emitted += 1;
        }
        if emitted > 0 {
            log::debug!(
                "[particles] emitted {} at ({:.2},{:.2},{:.2}), live={}",
                emitted,
                origin.x,
                origin.y,
                origin.z,
                self.particles.len()
            );
            self.repack_buffers();
        }
        emitted
    }

    fn spawn(&mut self, origin: Vec3) -> bool {
        if self.particles.len() >= self.config.capacity {
            return false;
        }
        let spread = self.config.spread_angle_deg.to_radians();
        let angle = (self.rng.gen::<f32>() - 0.5) * spread;
        let elevation = (self.rng.gen::<f32>() - 0.5) * spread;
        let direction = Vec3::new(
            angle.sin() * elevation.cos(),
            elevation.sin(),
            angle.cos() * elevation.cos(),
        );
        let speed = self.config.initial_speed * (0.5 + 0.5 * self.rng.gen::<f32>());
        let particle = Particle::new(origin, direction * speed, &self.config, &mut self.rng);
        self.particles.push(particle);
        true
    }

    /// Automatic emission, integration, expiry and repacking for `dt`
    /// seconds. Negative or non-finite `dt` integrates nothing; callers
    /// driving this from wall-clock frames should bound `dt` first
    /// (see [`clamp_frame_dt`]).
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.auto_emit(dt);

        let clearing = self.clear_elapsed.is_some();
        let time_secs = self.clock.now_secs();
        let config = &self.config;
        self.particles
            .retain_mut(|p| p.step(dt, config, time_secs, clearing));

        let clear_duration = self.clear_duration();
        if let Some(elapsed) = self.clear_elapsed.as_mut() {
            *elapsed += dt;
            if *elapsed >= clear_duration {
                self.clear_elapsed = None;
                log::info!("[particles] gentle clear finished");
            }
        }

        self.repack_buffers();
    }

    fn auto_emit(&mut self, dt: f32) {
        if !self.config.auto_emission || self.config.emission_rate <= 0.0 {
            self.emission_accumulator = 0.0;
            return;
        }
        let interval = 1.0 / self.config.emission_rate;
        self.emission_accumulator += dt;
        while self.emission_accumulator >= interval && self.spawn(Vec3::ZERO) {
            self.emission_accumulator -= interval;
        }
        if self.particles.len() >= self.config.capacity {
            self.emission_accumulator = self.emission_accumulator.min(interval);
        }
    }

    /// Fade the whole ensemble out within `GENTLE_CLEAR_FADE_SECS` of
    /// simulated time without removing anything abruptly.
    pub fn gentle_clear(&mut self) {
        log::info!(
            "[particles] gentle clear of {} particles",
            self.particles.len()
        );
        self.clear_elapsed = Some(0.0);
    }

    /// Simulated seconds the clear flag stays raised, derived from the
    /// current ghost duration.
    pub fn clear_duration(&self) -> f32 {
        let ghost = if self.config.zen_mode {
            self.config.ghost_duration.max(0.0)
        } else {
            0.0
        };
        GENTLE_CLEAR_FADE_SECS + ghost
    }

    /// Rewrite every buffer slot from the live set.
    pub fn repack_buffers(&mut self) {
        let config = &self.config;
        let live = self.particles.len().min(self.buffers.capacity());
        for (i, p) in self.particles.iter().take(live).enumerate() {
            let color = config
                .start_color
                .lerp(config.end_color, p.color_lerp(config))
                .to_array();
            self.buffers
                .write(i, p.position, color, p.render_size(config), p.alpha(config));
        }
        self.buffers.zero_from(live);
    }
}
