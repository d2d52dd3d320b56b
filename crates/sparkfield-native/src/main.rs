use glam::Vec2;
use std::time::Instant;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use sparkfield_core::{PointerKind, Preset, Scene};

mod audio;
mod render;

const SEED: u64 = 42;

fn window_title(scene: &Scene) -> String {
    format!(
        "sparkfield [{}] {}{}",
        scene.preset().name(),
        scene.blend_mode(),
        if scene.is_paused() { " (paused)" } else { "" }
    )
}

/// Active touch ids in arrival order; the first drives emission, a second
/// one orbits the camera.
#[derive(Default)]
struct TouchState {
    ids: Vec<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("sparkfield")
        .build(&event_loop)?;

    let size = window.inner_size();
    let mut scene = Scene::new(
        Preset::Baseline,
        Vec2::new(size.width as f32, size.height as f32),
        SEED,
    );
    window.set_title(&window_title(&scene));

    let audio = audio::start_audio();
    if audio.is_none() {
        log::warn!("[audio] no output device; running silent");
    }

    let mut gpu = pollster::block_on(render::GpuState::new(&window))?;
    let start = Instant::now();
    let mut cursor = Vec2::ZERO;
    let mut touches = TouchState::default();
    let mut audio_enabled = true;

    log::info!("keys: space=pause c=gentle clear p=next preset r=reset b=blend m=mute esc=quit");

    event_loop.run(move |event, elwt| {
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    gpu.resize(size);
                    scene.resize(Vec2::new(size.width as f32, size.height as f32));
                }
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Vec2::new(position.x as f32, position.y as f32);
                    scene.pointer_move(cursor, now_ms);
                    scene.orbit_move(cursor);
                }
                WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => {
                        scene.pointer_down(cursor, PointerKind::Mouse, now_ms)
                    }
                    (MouseButton::Left, ElementState::Released) => scene.pointer_up(cursor, now_ms),
                    (MouseButton::Right, ElementState::Pressed) => scene.orbit_begin(cursor),
                    (MouseButton::Right, ElementState::Released) => scene.orbit_end(),
                    _ => {}
                },
                WindowEvent::Touch(touch) => {
                    let at = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                    match touch.phase {
                        TouchPhase::Started => {
                            touches.ids.push(touch.id);
                            if touches.ids.len() == 1 {
                                scene.pointer_down(at, PointerKind::Touch, now_ms);
                            } else if touches.ids.len() == 2 {
                                scene.pointer_cancel(now_ms);
                                scene.orbit_begin(at);
                            }
                        }
                        TouchPhase::Moved => {
                            if touches.ids.len() == 1 {
                                scene.pointer_move(at, now_ms);
                            } else if touches.ids.last() == Some(&touch.id) {
                                scene.orbit_move(at);
                            }
                        }
                        TouchPhase::Ended | TouchPhase::Cancelled => {
                            if touches.ids.len() == 1 {
                                if touch.phase == TouchPhase::Ended {
                                    scene.pointer_up(at, now_ms);
                                } else {
                                    scene.pointer_cancel(now_ms);
                                }
                            } else {
                                scene.orbit_end();
                            }
                            touches.ids.retain(|id| *id != touch.id);
                        }
                    }
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => {
                    match logical_key.as_ref() {
                        Key::Named(NamedKey::Space) => {
                            scene.toggle_pause();
                        }
                        Key::Named(NamedKey::Escape) => elwt.exit(),
                        Key::Character("c") => scene.gentle_clear(),
                        Key::Character("p") => scene.apply_preset(scene.preset().next()),
                        Key::Character("r") => scene.reset_defaults(),
                        Key::Character("b") => {
                            scene.cycle_blend_mode();
                        }
                        Key::Character("m") => {
                            audio_enabled = !audio_enabled;
                            scene.set_audio_enabled(audio_enabled);
                        }
                        _ => {}
                    }
                    gpu.window.set_title(&window_title(&scene));
                }
                _ => {}
            },
            Event::AboutToWait => {
                let frame_start = Instant::now();
                let dt = frame_start - gpu.last_frame;
                gpu.last_frame = frame_start;
                if let Some(report) = scene.frame(dt.as_secs_f32(), now_ms) {
                    log::info!(
                        "[stats] fps={} particles={}",
                        report.fps,
                        report.live_particles
                    );
                }
                let notes = scene.drain_notes();
                if let Some(out) = audio.as_ref() {
                    out.play(&notes);
                }
                match gpu.render(&scene) {
                    Ok(_) => gpu.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure_surface()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(e) => log::warn!("[render] {e:?}"),
                }
            }
            _ => {}
        }
    })?;
    Ok(())
}
