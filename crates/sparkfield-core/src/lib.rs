pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod interaction;
pub mod music;
pub mod particle;
pub mod scene;
pub mod stats;
pub mod system;

pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use camera::*;
pub use clock::*;
pub use config::*;
pub use interaction::*;
pub use music::*;
pub use particle::*;
pub use scene::*;
pub use stats::*;
pub use system::*;
