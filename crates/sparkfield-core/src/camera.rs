//! Orbiting perspective camera and the screen-to-world resolver used to
//! place emissions under the pointer.

use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;

use crate::constants::{
    CAMERA_FOVY_DEG, CAMERA_ORBIT_RADIUS, CAMERA_ROTATE_PER_PX, CAMERA_ZFAR, CAMERA_ZNEAR,
};

/// Maps a screen position (pixels, origin top-left) to a world position.
pub trait WorldResolver {
    fn world_position(&self, screen: Vec2) -> Vec3;
}

impl<F: Fn(Vec2) -> Vec3> WorldResolver for F {
    fn world_position(&self, screen: Vec2) -> Vec3 {
        self(screen)
    }
}

/// Right-handed camera circling the origin at a fixed radius.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    pub viewport: Vec2,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            radius: CAMERA_ORBIT_RADIUS,
            viewport,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Apply a pointer drag in pixels. Pitch stays within ±90°.
    pub fn rotate(&mut self, delta_px: Vec2) {
        self.yaw += delta_px.x * CAMERA_ROTATE_PER_PX;
        self.pitch = (self.pitch + delta_px.y * CAMERA_ROTATE_PER_PX).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn eye(&self) -> Vec3 {
        self.radius
            * Vec3::new(
                self.yaw.sin() * self.pitch.cos(),
                self.pitch.sin(),
                self.yaw.cos() * self.pitch.cos(),
            )
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect(), self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        // Straight up/down views need a different up vector.
        let up = if self.pitch.abs() >= FRAC_PI_2 - 1e-4 {
            Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos()) * self.pitch.signum()
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a screen pixel: `(origin, direction)`.
    pub fn screen_ray(&self, screen: Vec2) -> (Vec3, Vec3) {
        let ndc_x = (2.0 * screen.x / self.viewport.x.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / self.viewport.y.max(1.0));
        let inv = self.view_proj().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far: Vec3 = p_far.truncate() / p_far.w;
        let origin = self.eye();
        (origin, (far - origin).normalize_or_zero())
    }
}

impl WorldResolver for OrbitCamera {
    /// Intersect the pointer ray with the `z = 0` plane; rays that never
    /// reach it resolve to the origin.
    fn world_position(&self, screen: Vec2) -> Vec3 {
        let (origin, dir) = self.screen_ray(screen);
        if dir.z.abs() <= 1e-6 {
            return Vec3::ZERO;
        }
        let t = -origin.z / dir.z;
        if t < 0.0 {
            return Vec3::ZERO;
        }
        origin + dir * t
    }
}
