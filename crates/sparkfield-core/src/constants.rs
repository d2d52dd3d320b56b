// Shared simulation, interaction and audio tuning constants.

// Integration
pub const MAX_FRAME_DT_SEC: f32 = 1.0 / 15.0; // largest wall-clock frame delta fed to a step
pub const TURBULENCE_Z_PHASE_SCALE: f32 = 1.1; // decorrelates the z wobble from x
pub const TURBULENCE_PHASE_RANGE: f32 = 1000.0; // per-particle phase seed in [0, range)

// Zen fade curve
pub const ZEN_RAMP_START_RATIO: f32 = 0.2; // life ratio below which alpha ramps down
pub const GHOST_ALPHA_SCALE: f32 = 0.6; // alpha multiplier on entering the ghost phase
pub const GHOST_EASE_EXPONENT: f32 = 0.33; // cube-root easing for a slow tail
pub const ZEN_MIN_SIZE_RATIO: f32 = 0.35; // ghosts keep at least this share of their size
pub const ZEN_COLOR_LERP_ONSET: f32 = 0.3; // colour starts shifting in the last 30% of life

// Pool
pub const MAX_CAPACITY: usize = 1_000_000; // upper bound on particleCount edits

// Gentle clear
pub const GENTLE_CLEAR_FADE_SECS: f32 = 5.0; // remaining life cap applied on clear

// Gesture classification
pub const TAP_MAX_DURATION_MS: f64 = 300.0;
pub const TAP_MAX_MOVE_PX: f32 = 5.0;
pub const TRAIL_THROTTLE_MS: f64 = 50.0;

// Note throttles and envelopes
pub const TRIGGER_NOTE_THROTTLE_MS: f64 = 150.0;
pub const SUSTAIN_NOTE_THROTTLE_MS: f64 = 100.0;
pub const SUSTAIN_RELEASE_DELAY_MS: f64 = 250.0;
pub const TRAIL_NOTE_DURATION_SEC: f32 = 0.125; // a sixteenth at 120 bpm
pub const CHORD_DURATION_SEC: f32 = 0.5;
pub const MAJOR_TRIAD: [i32; 3] = [0, 4, 7];

// Camera
pub const CAMERA_ORBIT_RADIUS: f32 = 15.0;
pub const CAMERA_ROTATE_PER_PX: f32 = 0.005;
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;

// Point sprite attenuation (pixels at unit view depth)
pub const POINT_SCALE_BASELINE: f32 = 300.0;
pub const POINT_SCALE_REFERENCE: f32 = 150.0;
