/// Frame rate and population, reported once per window of at least a second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsReport {
    pub fps: f32,
    pub live_particles: usize,
}

#[derive(Clone, Debug, Default)]
pub struct FrameStats {
    frames: u32,
    elapsed: f32,
}

impl FrameStats {
    pub fn record(&mut self, dt_sec: f32, live_particles: usize) -> Option<StatsReport> {
        self.frames += 1;
        self.elapsed += dt_sec.max(0.0);
        if self.elapsed < 1.0 {
            return None;
        }
        let report = StatsReport {
            fps: (self.frames as f32 / self.elapsed).round(),
            live_particles,
        };
        self.frames = 0;
        self.elapsed = 0.0;
        Some(report)
    }
}
