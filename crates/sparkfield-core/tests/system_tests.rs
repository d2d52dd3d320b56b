// Pool-level behaviour: capacity, emission, expiry, buffers, gentle clear.

mod common;

use common::{approx, still_config, system_with};
use glam::Vec3;
use sparkfield_core::constants::MAX_CAPACITY;
use sparkfield_core::{clamp_frame_dt, ManualClock, ParticleSystem, Rgb, SimulationConfig};

#[test]
fn burst_fills_leading_slots_and_zeroes_the_rest() {
    let mut sys = system_with(SimulationConfig {
        capacity: 10,
        emission_rate: 0.0,
        burst_size: 5,
        ..still_config()
    });
    assert_eq!(sys.emit(5, Vec3::ZERO), 5);
    assert_eq!(sys.live_count(), 5);

    let buffers = sys.buffers();
    assert_eq!(buffers.capacity(), 10);
    assert_eq!(buffers.positions.len(), 30);
    for i in 0..5 {
        assert!(buffers.alphas[i] > 0.0);
    }
    for i in 5..10 {
        assert_eq!(buffers.alphas[i], 0.0);
        assert_eq!(buffers.sizes[i], 0.0);
        assert_eq!(&buffers.positions[i * 3..i * 3 + 3], &[0.0, 0.0, 0.0]);
    }
}

#[test]
fn emission_stops_at_capacity_without_error() {
    let mut sys = system_with(SimulationConfig {
        capacity: 3,
        ..still_config()
    });
    assert_eq!(sys.emit(10, Vec3::ZERO), 3);
    assert_eq!(sys.live_count(), 3);
    assert_eq!(sys.emit(1, Vec3::ZERO), 0);
    assert_eq!(sys.live_count(), 3);
}

#[test]
fn emitting_zero_is_a_no_op() {
    let mut sys = system_with(still_config());
    sys.emit(2, Vec3::ZERO);
    assert_eq!(sys.emit(0, Vec3::new(1.0, 2.0, 3.0)), 0);
    assert_eq!(sys.live_count(), 2);
}

#[test]
fn zero_capacity_stays_empty() {
    let mut sys = system_with(SimulationConfig {
        capacity: 0,
        auto_emission: true,
        emission_rate: 100.0,
        ..still_config()
    });
    sys.emit(5, Vec3::ZERO);
    sys.step(0.05);
    assert_eq!(sys.live_count(), 0);
    assert_eq!(sys.buffers().capacity(), 0);
}

#[test]
fn live_count_never_exceeds_capacity() {
    let mut sys = ParticleSystem::with_clock(
        SimulationConfig {
            capacity: 50,
            emission_rate: 400.0,
            lifespan: 0.5,
            ..SimulationConfig::default()
        },
        3,
        ManualClock::new(0.0),
    );
    for i in 0..200 {
        if i % 7 == 0 {
            sys.emit(13, Vec3::new(i as f32, 0.0, 0.0));
        }
        assert!(sys.live_count() <= 50);
        sys.step(1.0 / 60.0);
        assert!(sys.live_count() <= 50);
    }
}

#[test]
fn emitted_particles_start_at_origin_with_jittered_speed() {
    let mut sys = system_with(SimulationConfig {
        initial_speed: 4.0,
        spread_angle_deg: 90.0,
        ..still_config()
    });
    let origin = Vec3::new(1.0, -2.0, 0.5);
    sys.emit(50, origin);
    for p in sys.particles() {
        assert_eq!(p.position, origin);
        let speed = p.velocity.length();
        assert!(speed >= 2.0 - 1e-4 && speed <= 4.0 + 1e-4, "speed {speed}");
        // within a 45 degree half-cone around +z
        assert!(p.velocity.z > 0.0);
    }
}

#[test]
fn life_ratio_decreases_linearly() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 4.0,
        ..still_config()
    });
    sys.emit(1, Vec3::ZERO);
    for _ in 0..10 {
        sys.step(0.1);
    }
    assert!(approx(sys.particles()[0].life_ratio(), 0.75, 1e-5));
}

#[test]
fn baseline_particles_expire_when_life_reaches_zero() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 1.0,
        ..still_config()
    });
    sys.emit(3, Vec3::ZERO);
    for _ in 0..3 {
        sys.step(0.25);
    }
    assert_eq!(sys.live_count(), 3);
    sys.step(0.25);
    assert_eq!(sys.live_count(), 0);
    assert!(sys.buffers().alphas.iter().all(|a| *a == 0.0));
    assert!(sys.buffers().sizes.iter().all(|s| *s == 0.0));
}

#[test]
fn zen_particles_linger_through_the_ghost_phase() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 1.0,
        zen_mode: true,
        ghost_duration: 0.5,
        ..still_config()
    });
    sys.emit(2, Vec3::ZERO);
    for _ in 0..5 {
        sys.step(0.25);
    }
    assert_eq!(sys.live_count(), 2);
    assert!(sys.buffers().alphas[0] > 0.0);
    sys.step(0.25);
    assert_eq!(sys.live_count(), 0);
}

#[test]
fn gravity_step_matches_euler_formula() {
    let mut sys = system_with(SimulationConfig {
        gravity: -9.8,
        lifespan: 10.0,
        ..still_config()
    });
    sys.emit(1, Vec3::ZERO);
    sys.step(1.0);
    let p = &sys.particles()[0];
    assert!(approx(p.velocity.y, -9.8, 1e-5));
    assert!(approx(p.position.y, -9.8, 1e-5));
    assert!(approx(sys.buffers().positions[1], -9.8, 1e-5));
}

#[test]
fn automatic_emission_carries_fractional_debt() {
    let mut sys = system_with(SimulationConfig {
        auto_emission: true,
        emission_rate: 4.0,
        lifespan: 10.0,
        ..still_config()
    });
    sys.step(1.0);
    assert_eq!(sys.live_count(), 4);
    sys.step(0.125);
    assert_eq!(sys.live_count(), 4);
    sys.step(0.125);
    assert_eq!(sys.live_count(), 5);
}

#[test]
fn automatic_emission_is_off_for_click_driven_configs() {
    let mut sys = system_with(SimulationConfig {
        auto_emission: false,
        emission_rate: 100.0,
        ..still_config()
    });
    sys.step(1.0);
    assert_eq!(sys.live_count(), 0);
}

#[test]
fn saturated_emitter_does_not_bank_a_catch_up_burst() {
    let mut sys = system_with(SimulationConfig {
        capacity: 2,
        auto_emission: true,
        emission_rate: 4.0,
        lifespan: 1.5,
        ..still_config()
    });
    sys.step(1.0); // 2 born, 2 intervals of debt dropped
    assert_eq!(sys.live_count(), 2);
    sys.step(1.0); // both expire after emission is attempted
    assert_eq!(sys.live_count(), 0);
    sys.step(0.0);
    assert!(sys.live_count() <= 1);
}

#[test]
fn colours_lerp_from_start_to_end() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 1.0,
        start_color: Rgb::BLACK,
        end_color: Rgb::WHITE,
        ..still_config()
    });
    sys.emit(1, Vec3::ZERO);
    assert_eq!(&sys.buffers().colors[0..3], &[0.0, 0.0, 0.0]);
    sys.step(0.5);
    for c in &sys.buffers().colors[0..3] {
        assert!(approx(*c, 0.5, 1e-5));
    }
}

#[test]
fn instances_interleave_the_live_slots() {
    let mut sys = system_with(SimulationConfig {
        capacity: 8,
        opacity: 0.25,
        ..still_config()
    });
    sys.emit(3, Vec3::new(1.0, 2.0, 3.0));
    let mut out = Vec::new();
    sys.buffers().write_instances(sys.live_count(), &mut out);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].position, [1.0, 2.0, 3.0]);
    assert!(approx(out[2].alpha, 0.25, 1e-6));
    assert_eq!(std::mem::size_of_val(&out[0]), 32);
}

#[test]
fn shrinking_capacity_evicts_the_oldest() {
    let mut sys = system_with(still_config());
    sys.emit(5, Vec3::new(-1.0, 0.0, 0.0));
    sys.emit(5, Vec3::new(1.0, 0.0, 0.0));
    let mut config = sys.config().clone();
    config.capacity = 3;
    sys.reconfigure(config);
    assert_eq!(sys.live_count(), 3);
    assert!(sys.particles().iter().all(|p| p.position.x == 1.0));
    assert_eq!(sys.buffers().capacity(), 3);
    assert_eq!(sys.buffers().positions.len(), 9);
}

#[test]
fn growing_capacity_zeroes_new_slots() {
    let mut sys = system_with(SimulationConfig {
        capacity: 2,
        ..still_config()
    });
    sys.emit(2, Vec3::ONE);
    sys.set_param("particleCount", "6").unwrap();
    assert_eq!(sys.buffers().capacity(), 6);
    assert_eq!(sys.live_count(), 2);
    assert!(sys.buffers().alphas[2..].iter().all(|a| *a == 0.0));
    assert_eq!(sys.emit(10, Vec3::ZERO), 4);
}

#[test]
fn out_of_range_particle_counts_do_not_crash() {
    let mut sys = system_with(still_config());
    sys.emit(4, Vec3::ZERO);

    sys.set_param("particleCount", "inf").unwrap();
    assert_eq!(sys.config().capacity, MAX_CAPACITY);
    assert_eq!(sys.buffers().capacity(), MAX_CAPACITY);
    assert_eq!(sys.live_count(), 4);

    sys.set_param("particleCount", "1e12").unwrap();
    assert_eq!(sys.buffers().capacity(), MAX_CAPACITY);

    sys.set_param("particleCount", "NaN").unwrap();
    assert_eq!(sys.config().capacity, 0);
    assert_eq!(sys.live_count(), 0);

    sys.set_param("particleCount", "-5").unwrap();
    assert_eq!(sys.buffers().capacity(), 0);
    sys.step(0.1);
    assert_eq!(sys.emit(3, Vec3::ZERO), 0);
}

#[test]
fn oversized_capacity_in_a_config_is_capped() {
    let mut sys = system_with(SimulationConfig {
        capacity: usize::MAX,
        ..still_config()
    });
    assert_eq!(sys.config().capacity, MAX_CAPACITY);
    assert_eq!(sys.buffers().positions.len(), MAX_CAPACITY * 3);

    let mut config = sys.config().clone();
    config.capacity = usize::MAX;
    sys.reconfigure(config);
    assert_eq!(sys.config().capacity, MAX_CAPACITY);
    assert_eq!(sys.emit(2, Vec3::ZERO), 2);
}

#[test]
fn rejected_parameter_leaves_config_untouched() {
    let mut sys = system_with(still_config());
    let before = sys.config().clone();
    assert!(sys.set_param("gravity", "down").is_err());
    assert!(sys.set_param("nope", "1").is_err());
    assert_eq!(sys.config(), &before);
}

#[test]
fn live_edits_change_forces_but_not_snapshots() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 2.0,
        ..still_config()
    });
    sys.emit(1, Vec3::ZERO);
    sys.set_param("lifespan", "20").unwrap();
    sys.set_param("gravity", "-1").unwrap();
    sys.step(1.0);
    let p = &sys.particles()[0];
    assert_eq!(p.max_life, 2.0);
    assert!(approx(p.velocity.y, -1.0, 1e-6));
}

#[test]
fn gentle_clear_caps_remaining_life_on_next_step() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 50.0,
        ..still_config()
    });
    sys.emit(4, Vec3::ZERO);
    sys.gentle_clear();
    assert!(sys.is_clearing());
    sys.step(0.1);
    for p in sys.particles() {
        assert!(approx(p.life, 4.9, 1e-5));
    }
}

#[test]
fn gentle_clear_fades_everything_and_then_lowers_the_flag() {
    let mut sys = system_with(SimulationConfig {
        lifespan: 50.0,
        zen_mode: true,
        ghost_duration: 1.0,
        ..still_config()
    });
    sys.emit(4, Vec3::ZERO);
    sys.gentle_clear();
    assert_eq!(sys.clear_duration(), 6.0);
    for _ in 0..11 {
        sys.step(0.5);
    }
    assert!(sys.is_clearing());
    sys.step(0.5);
    assert!(!sys.is_clearing());
    assert_eq!(sys.live_count(), 0);
}

#[test]
fn turbulence_follows_the_injected_clock() {
    let clock = ManualClock::new(0.0);
    let mut sys = ParticleSystem::with_clock(
        SimulationConfig {
            turbulence: 1.0,
            lifespan: 10.0,
            ..still_config()
        },
        7,
        clock.clone(),
    );
    sys.emit(1, Vec3::ZERO);
    let phase = sys.particles()[0].turbulence_phase as f64;
    clock.set(2.0);
    sys.step(0.5);
    let expected = (2.0 + phase).sin() as f32 * 0.5;
    assert!(approx(sys.particles()[0].velocity.x, expected, 1e-5));
}

#[test]
fn step_ignores_negative_and_non_finite_dt() {
    let mut sys = system_with(still_config());
    sys.emit(1, Vec3::ZERO);
    let life = sys.particles()[0].life;
    sys.step(-1.0);
    sys.step(f32::NAN);
    assert_eq!(sys.particles()[0].life, life);
}

#[test]
fn frame_dt_is_clamped_for_stability() {
    assert!(approx(clamp_frame_dt(5.0), 1.0 / 15.0, 1e-7));
    assert_eq!(clamp_frame_dt(-0.5), 0.0);
    assert_eq!(clamp_frame_dt(f32::INFINITY), 0.0);
    assert_eq!(clamp_frame_dt(0.01), 0.01);
}
