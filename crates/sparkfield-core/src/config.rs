//! Simulation configuration and named presets.
//!
//! A `SimulationConfig` is owned by a `ParticleSystem` and replaced or edited
//! through it. Every field may change between steps; live particles pick up
//! the new forces immediately but keep the lifespan and size they were born
//! with.

use glam::Vec3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    MAX_CAPACITY, POINT_SCALE_BASELINE, POINT_SCALE_REFERENCE, ZEN_COLOR_LERP_ONSET,
};
use crate::music::SoundMode;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("invalid number `{value}` for `{key}`")]
    InvalidNumber { key: String, value: String },
    #[error("invalid colour `{0}` (expected #rrggbb)")]
    InvalidColor(String),
    #[error("unknown blend mode `{0}`")]
    UnknownBlendMode(String),
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

/// Linear RGB colour with components in \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ConfigError::InvalidColor(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::from_hex)
            .map_err(|_| ConfigError::InvalidColor(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    #[default]
    Additive,
    Multiply,
    Subtractive,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Additive,
        BlendMode::Multiply,
        BlendMode::Subtractive,
    ];

    pub fn next(self) -> BlendMode {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Additive => "additive",
            BlendMode::Multiply => "multiply",
            BlendMode::Subtractive => "subtractive",
        }
    }
}

impl FromStr for BlendMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(BlendMode::Normal),
            "additive" => Ok(BlendMode::Additive),
            "multiply" => Ok(BlendMode::Multiply),
            "subtractive" => Ok(BlendMode::Subtractive),
            _ => Err(ConfigError::UnknownBlendMode(s.to_string())),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Upper bound on the live particle set and length of every render buffer.
    pub capacity: usize,
    /// Automatic emission rate in particles per second.
    pub emission_rate: f32,
    /// Acceleration along y.
    pub gravity: f32,
    pub initial_speed: f32,
    /// Full cone angle in degrees; directions are sampled in ±half of it.
    pub spread_angle_deg: f32,
    /// Linear drag coefficient. Stable while `air_resistance * dt < 1`.
    pub air_resistance: f32,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub base_size: f32,
    pub size_variation: f32,
    pub opacity: f32,
    /// Seconds; snapshotted by each particle at birth.
    pub lifespan: f32,
    pub turbulence: f32,
    pub wind: Vec3,
    pub burst_size: u32,
    pub trail_density: u32,
    pub blend_mode: BlendMode,
    /// Emit `emission_rate` particles per second from the origin on every step.
    pub auto_emission: bool,
    /// Persistent particles with a ghost phase after nominal death.
    pub zen_mode: bool,
    pub ghost_duration: f32,
    /// Life ratio below which colour starts moving from start to end colour.
    pub color_lerp_onset: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            emission_rate: 69.0,
            gravity: -1.0,
            initial_speed: 3.0,
            spread_angle_deg: 133.0,
            air_resistance: 0.1,
            start_color: Rgb::from_hex(0x000000),
            end_color: Rgb::from_hex(0xfff300),
            base_size: 0.5,
            size_variation: 3.0,
            opacity: 0.3,
            lifespan: 9.0,
            turbulence: 1.3,
            wind: Vec3::new(-1.5, 1.5, 1.0),
            burst_size: 99,
            trail_density: 33,
            blend_mode: BlendMode::Subtractive,
            auto_emission: true,
            zen_mode: false,
            ghost_duration: 0.0,
            color_lerp_onset: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Particles emitted per drag-trail call; a fractional rate rounds up.
    pub fn trail_count(&self) -> usize {
        (self.trail_density as f32)
            .min(self.emission_rate)
            .max(0.0)
            .ceil() as usize
    }

    /// Apply one control edit, keyed by control id, from its textual value.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let num = || -> Result<f32, ConfigError> {
            value
                .trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: key.to_string(),
                    value: value.to_string(),
                })
        };
        match key {
            "particleCount" => self.capacity = clamp_capacity(num()?),
            "emissionRate" => self.emission_rate = num()?,
            "gravity" => self.gravity = num()?,
            "initialSpeed" => self.initial_speed = num()?,
            "spreadAngle" => self.spread_angle_deg = num()?,
            "airResistance" => self.air_resistance = num()?,
            "startColor" => self.start_color = value.parse()?,
            "endColor" => self.end_color = value.parse()?,
            "particleSize" => self.base_size = num()?,
            "sizeVariation" => self.size_variation = num()?,
            "opacity" => self.opacity = num()?,
            "lifespan" => self.lifespan = num()?,
            "turbulence" => self.turbulence = num()?,
            "blendMode" => self.blend_mode = value.parse()?,
            "windX" => self.wind.x = num()?,
            "windY" => self.wind.y = num()?,
            "windZ" => self.wind.z = num()?,
            "burstSize" => self.burst_size = num()? as u32,
            "trailDensity" => self.trail_density = num()? as u32,
            "zenMode" => self.zen_mode = parse_flag(key, value)?,
            "autoEmission" => self.auto_emission = parse_flag(key, value)?,
            "ghostDuration" => self.ghost_duration = num()?,
            "colorLerpOnset" => self.color_lerp_onset = num()?,
            _ => return Err(ConfigError::UnknownParameter(key.to_string())),
        }
        Ok(())
    }
}

/// Non-finite and negative counts become 0; large ones stop at `MAX_CAPACITY`.
fn clamp_capacity(value: f32) -> usize {
    if value.is_finite() {
        value.clamp(0.0, MAX_CAPACITY as f32) as usize
    } else if value > 0.0 {
        MAX_CAPACITY
    } else {
        0
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// The three tunings the toy ships with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    /// Automatic emission from the origin, notes triggered while dragging.
    #[default]
    Baseline,
    /// Click-driven persistent particles with a ghost fade.
    Zen,
    /// Click-driven, brighter palette, position-mapped sustained notes.
    Reference,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Baseline, Preset::Zen, Preset::Reference];

    pub fn config(self) -> SimulationConfig {
        match self {
            Preset::Baseline => SimulationConfig::default(),
            Preset::Zen => SimulationConfig {
                gravity: -0.2,
                initial_speed: 1.5,
                air_resistance: 0.3,
                start_color: Rgb::WHITE,
                end_color: Rgb::from_hex(0x7fd1ff),
                opacity: 0.7,
                lifespan: 12.0,
                turbulence: 0.6,
                wind: Vec3::new(0.2, 0.1, 0.0),
                blend_mode: BlendMode::Additive,
                auto_emission: false,
                zen_mode: true,
                ghost_duration: 4.0,
                color_lerp_onset: ZEN_COLOR_LERP_ONSET,
                ..SimulationConfig::default()
            },
            Preset::Reference => SimulationConfig {
                start_color: Rgb::WHITE,
                end_color: Rgb::from_hex(0xff00cc),
                opacity: 0.7,
                auto_emission: false,
                ..SimulationConfig::default()
            },
        }
    }

    pub fn sound_mode(self) -> SoundMode {
        match self {
            Preset::Baseline => SoundMode::Trigger,
            Preset::Zen | Preset::Reference => SoundMode::Sustain,
        }
    }

    /// Sprite size in pixels at unit view depth.
    pub fn point_scale(self) -> f32 {
        match self {
            Preset::Baseline => POINT_SCALE_BASELINE,
            Preset::Zen | Preset::Reference => POINT_SCALE_REFERENCE,
        }
    }

    pub fn next(self) -> Preset {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Baseline => "baseline",
            Preset::Zen => "zen",
            Preset::Reference => "reference",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(Preset::Baseline),
            "zen" => Ok(Preset::Zen),
            "reference" => Ok(Preset::Reference),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}
