//! Pointer gesture classification.
//!
//! Raw pointer positions and timestamps go in; taps, throttled drag trails
//! and camera orbit deltas come out. Screen coordinates are pixels with the
//! origin at the top-left corner.

use glam::{Vec2, Vec3};
use smallvec::SmallVec;

use crate::camera::WorldResolver;
use crate::config::SimulationConfig;
use crate::constants::{TAP_MAX_DURATION_MS, TAP_MAX_MOVE_PX, TRAIL_THROTTLE_MS};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Press {
        screen: Vec2,
    },
    /// Pointer moved while pressed. `prev` is the drag reference point.
    Drag {
        screen: Vec2,
        prev: Vec2,
    },
    /// Throttled trail emission under the pointer.
    Trail {
        count: usize,
        position: Vec3,
    },
    /// Short, still press: one burst at the press point.
    Tap {
        count: usize,
        position: Vec3,
    },
    Release,
}

pub type Gestures = SmallVec<[Gesture; 3]>;

#[derive(Clone, Copy, Debug)]
struct Press {
    start_ms: f64,
    anchor: Vec2,
    kind: PointerKind,
}

#[derive(Debug, Default)]
pub struct InteractionDriver {
    press: Option<Press>,
    last_trail_ms: Option<f64>,
    orbit_anchor: Option<Vec2>,
}

impl InteractionDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn pointer_down(&mut self, screen: Vec2, kind: PointerKind, now_ms: f64) -> Gestures {
        self.press = Some(Press {
            start_ms: now_ms,
            anchor: screen,
            kind,
        });
        let mut out = Gestures::new();
        out.push(Gesture::Press { screen });
        out
    }

    pub fn pointer_move(
        &mut self,
        screen: Vec2,
        now_ms: f64,
        config: &SimulationConfig,
        resolver: &impl WorldResolver,
    ) -> Gestures {
        let mut out = Gestures::new();
        let Some(press) = self.press.as_mut() else {
            return out;
        };
        out.push(Gesture::Drag {
            screen,
            prev: press.anchor,
        });
        // Touch drags measure from the latest contact point.
        if press.kind == PointerKind::Touch {
            press.anchor = screen;
        }
        if self
            .last_trail_ms
            .map_or(true, |t| now_ms - t > TRAIL_THROTTLE_MS)
        {
            self.last_trail_ms = Some(now_ms);
            out.push(Gesture::Trail {
                count: config.trail_count(),
                position: resolver.world_position(screen),
            });
        }
        out
    }

    pub fn pointer_up(
        &mut self,
        screen: Vec2,
        now_ms: f64,
        config: &SimulationConfig,
        resolver: &impl WorldResolver,
    ) -> Gestures {
        let mut out = Gestures::new();
        let Some(press) = self.press.take() else {
            return out;
        };
        let duration_ms = now_ms - press.start_ms;
        let moved_px = screen.distance(press.anchor);
        if duration_ms < TAP_MAX_DURATION_MS && moved_px < TAP_MAX_MOVE_PX {
            log::debug!(
                "[input] tap {:.0}ms {:.1}px at ({:.0},{:.0})",
                duration_ms,
                moved_px,
                press.anchor.x,
                press.anchor.y
            );
            out.push(Gesture::Tap {
                count: config.burst_size as usize,
                position: resolver.world_position(press.anchor),
            });
        }
        out.push(Gesture::Release);
        out
    }

    /// Drop an in-flight press without classifying it.
    pub fn cancel(&mut self) -> Gestures {
        let mut out = Gestures::new();
        if self.press.take().is_some() {
            out.push(Gesture::Release);
        }
        out
    }

    pub fn orbit_begin(&mut self, screen: Vec2) {
        self.orbit_anchor = Some(screen);
    }

    /// Pixel delta since the previous orbit sample.
    pub fn orbit_move(&mut self, screen: Vec2) -> Option<Vec2> {
        let anchor = self.orbit_anchor.as_mut()?;
        let delta = screen - *anchor;
        *anchor = screen;
        Some(delta)
    }

    pub fn orbit_end(&mut self) {
        self.orbit_anchor = None;
    }
}
