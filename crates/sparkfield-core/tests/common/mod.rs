#![allow(dead_code)]

use sparkfield_core::{ManualClock, ParticleSystem, SimulationConfig};

/// No forces, no automatic emission: particles only age.
pub fn still_config() -> SimulationConfig {
    SimulationConfig {
        capacity: 100,
        emission_rate: 0.0,
        gravity: 0.0,
        initial_speed: 0.0,
        air_resistance: 0.0,
        turbulence: 0.0,
        wind: glam::Vec3::ZERO,
        auto_emission: false,
        ..SimulationConfig::default()
    }
}

pub fn system_with(config: SimulationConfig) -> ParticleSystem {
    ParticleSystem::with_clock(config, 7, ManualClock::new(0.0))
}

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}
