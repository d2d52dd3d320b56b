// Per-particle integration and the age-derived alpha/colour/size curves.

mod common;

use common::{approx, still_config};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sparkfield_core::{Particle, SimulationConfig};

fn particle(config: &SimulationConfig) -> Particle {
    let mut rng = StdRng::seed_from_u64(1);
    Particle::new(Vec3::ZERO, Vec3::ZERO, config, &mut rng)
}

fn zen_config() -> SimulationConfig {
    SimulationConfig {
        zen_mode: true,
        ghost_duration: 2.0,
        opacity: 0.8,
        lifespan: 10.0,
        color_lerp_onset: 0.3,
        ..still_config()
    }
}

#[test]
fn construction_snapshots_lifespan_and_samples_size_in_range() {
    let config = SimulationConfig {
        base_size: 2.0,
        size_variation: 1.0,
        lifespan: 4.0,
        ..still_config()
    };
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let p = Particle::new(Vec3::ONE, Vec3::X, &config, &mut rng);
        assert_eq!(p.life, 4.0);
        assert_eq!(p.max_life, 4.0);
        assert!(p.size >= 1.5 && p.size < 2.5, "size {} out of range", p.size);
        assert!(p.turbulence_phase >= 0.0 && p.turbulence_phase < 1000.0);
        assert_eq!(p.position, Vec3::ONE);
        assert_eq!(p.velocity, Vec3::X);
    }
}

#[test]
fn later_lifespan_edits_do_not_touch_live_particles() {
    let mut config = still_config();
    config.lifespan = 3.0;
    let mut p = particle(&config);
    config.lifespan = 100.0;
    p.step(1.0, &config, 0.0, false);
    assert_eq!(p.max_life, 3.0);
    assert!(approx(p.life_ratio(), 2.0 / 3.0, 1e-6));
}

#[test]
fn gravity_is_euler_integrated() {
    let config = SimulationConfig {
        gravity: -9.8,
        lifespan: 10.0,
        ..still_config()
    };
    let mut p = particle(&config);
    assert!(p.step(1.0, &config, 0.0, false));
    assert!(approx(p.velocity.y, -9.8, 1e-5));
    assert!(approx(p.position.y, -9.8, 1e-5));
    p.step(1.0, &config, 0.0, false);
    // v = -19.6, x = -9.8 + -19.6
    assert!(approx(p.position.y, -29.4, 1e-4));
}

#[test]
fn drag_scales_velocity_linearly_in_dt() {
    let config = SimulationConfig {
        air_resistance: 0.5,
        ..still_config()
    };
    let mut p = particle(&config);
    p.velocity = Vec3::new(10.0, 0.0, 0.0);
    p.step(0.1, &config, 0.0, false);
    assert!(approx(p.velocity.x, 9.5, 1e-5));
}

#[test]
fn wind_applies_on_every_axis() {
    let config = SimulationConfig {
        wind: Vec3::new(-1.5, 1.5, 1.0),
        ..still_config()
    };
    let mut p = particle(&config);
    p.step(0.5, &config, 0.0, false);
    assert!(approx(p.velocity.x, -0.75, 1e-6));
    assert!(approx(p.velocity.y, 0.75, 1e-6));
    assert!(approx(p.velocity.z, 0.5, 1e-6));
}

#[test]
fn turbulence_follows_injected_time() {
    let config = SimulationConfig {
        turbulence: 2.0,
        ..still_config()
    };
    let mut p = particle(&config);
    p.turbulence_phase = 0.0;
    // sin(0) = 0 on x, cos(0) = 1 on z
    p.step(0.5, &config, 0.0, false);
    assert!(approx(p.velocity.x, 0.0, 1e-6));
    assert!(approx(p.velocity.z, 1.0, 1e-6));

    let mut q = particle(&config);
    q.turbulence_phase = 0.0;
    q.step(0.5, &config, std::f64::consts::FRAC_PI_2, false);
    assert!(approx(q.velocity.x, 1.0, 1e-6));
    assert!(approx(q.velocity.z, 0.0, 1e-6));
}

#[test]
fn baseline_alpha_tracks_life_ratio() {
    let config = SimulationConfig {
        opacity: 0.5,
        lifespan: 4.0,
        ..still_config()
    };
    let mut p = particle(&config);
    assert!(approx(p.alpha(&config), 0.5, 1e-6));
    p.life = 1.0;
    assert!(approx(p.alpha(&config), 0.125, 1e-6));
    p.life = -1.0;
    assert_eq!(p.alpha(&config), 0.0);
}

#[test]
fn zen_alpha_branches_agree_at_ramp_start() {
    let config = zen_config();
    let mut p = particle(&config);
    p.life = 2.0; // ratio exactly 0.2
    assert!(approx(p.alpha(&config), 0.8, 1e-6));
    p.life = 2.0001;
    assert!(approx(p.alpha(&config), 0.8, 1e-6));
    p.life = 1.0; // ratio 0.1, halfway down the ramp
    assert!(approx(p.alpha(&config), 0.4, 1e-6));
}

#[test]
fn zen_alpha_jumps_at_nominal_death() {
    let config = zen_config();
    let mut p = particle(&config);
    p.life = 1e-4;
    let just_before = p.alpha(&config);
    p.life = 0.0;
    let at_zero = p.alpha(&config);
    assert!(just_before < 1e-3);
    assert!(approx(at_zero, 0.8 * 0.6, 1e-6));
}

#[test]
fn zen_ghost_fade_is_cube_root_eased() {
    let config = zen_config();
    let mut p = particle(&config);
    p.life = -1.0; // halfway through a 2s ghost phase
    let expected = 0.8 * 0.6 * 0.5_f32.powf(0.33);
    assert!(approx(p.alpha(&config), expected, 1e-6));
    p.life = -2.0;
    assert_eq!(p.alpha(&config), 0.0);
}

#[test]
fn zen_colour_shifts_only_in_final_thirty_percent() {
    let config = zen_config();
    let mut p = particle(&config);
    p.life = 5.0;
    assert_eq!(p.color_lerp(&config), 0.0);
    p.life = 1.5; // ratio 0.15
    assert!(approx(p.color_lerp(&config), 0.5, 1e-6));
    p.life = -1.0;
    assert_eq!(p.color_lerp(&config), 1.0);
}

#[test]
fn baseline_colour_lerps_over_whole_life() {
    let config = SimulationConfig {
        lifespan: 4.0,
        ..still_config()
    };
    let mut p = particle(&config);
    assert_eq!(p.color_lerp(&config), 0.0);
    p.life = 1.0;
    assert!(approx(p.color_lerp(&config), 0.75, 1e-6));
}

#[test]
fn render_size_shrinks_with_age_and_ghosts_keep_a_floor() {
    let baseline = SimulationConfig {
        base_size: 2.0,
        size_variation: 0.0,
        lifespan: 4.0,
        ..still_config()
    };
    let mut p = particle(&baseline);
    p.life = 2.0;
    assert!(approx(p.render_size(&baseline), 1.0, 1e-6));

    let zen = SimulationConfig {
        base_size: 2.0,
        size_variation: 0.0,
        ..zen_config()
    };
    let mut g = particle(&zen);
    g.life = -1.0;
    assert!(approx(g.render_size(&zen), 2.0 * 0.35, 1e-6));
}

#[test]
fn survival_predicates_differ_by_mode() {
    let config = SimulationConfig {
        lifespan: 1.0,
        ..still_config()
    };
    let mut p = particle(&config);
    assert!(p.step(0.5, &config, 0.0, false));
    assert!(!p.step(0.5, &config, 0.0, false));

    let zen = SimulationConfig {
        lifespan: 1.0,
        ..zen_config()
    };
    let mut g = particle(&zen);
    assert!(g.step(0.5, &zen, 0.0, false));
    assert!(g.step(0.5, &zen, 0.0, false)); // life 0, ghost begins
    assert!(g.step(1.5, &zen, 0.0, false)); // -1.5 > -2
    assert!(!g.step(0.5, &zen, 0.0, false)); // -2 is gone
}

#[test]
fn gentle_clear_caps_life_once() {
    let config = SimulationConfig {
        lifespan: 50.0,
        ..still_config()
    };
    let mut p = particle(&config);
    p.step(0.1, &config, 0.0, true);
    assert!(approx(p.life, 4.9, 1e-5));
    assert_eq!(p.clear_start_life(), Some(50.0));
    assert!(p.is_clearing());

    // Still the same clear: no second cap.
    p.life = 20.0;
    p.step(0.1, &config, 0.0, true);
    assert!(approx(p.life, 19.9, 1e-5));

    // Flag dropped, then raised again: caps anew.
    p.step(0.1, &config, 0.0, false);
    assert!(!p.is_clearing());
    p.step(0.1, &config, 0.0, true);
    assert!(approx(p.life, 4.9, 1e-5));
}

#[test]
fn zero_lifespan_has_a_defined_ratio() {
    let config = SimulationConfig {
        lifespan: 0.0,
        ..still_config()
    };
    let mut p = particle(&config);
    assert_eq!(p.life_ratio(), 0.0);
    assert!(!p.step(0.016, &config, 0.0, false));
}
