// ---------------- Native audio (cpal) ----------------
//
// A small oscillator mixer that plays the core's `NoteCommand`s.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use sparkfield_core::{NoteCommand, Voice};

const ATTACK_SEC: f32 = 0.005;
const RELEASE_SEC: f32 = 0.3;
// Both voices sit ~3 dB under full scale before the soft clip.
const LEAD_GAIN: f32 = 0.25;
const BASS_GAIN: f32 = 0.15;

#[derive(Clone)]
struct ActiveOscillator {
    voice: Voice,
    amplitude: f32,
    phase: f32,     // radians
    phase_inc: f32, // radians per sample
    // None while a sustained note is held.
    total_samples: Option<u32>,
    samples_emitted: u32,
    attack_samples: u32,
    release_samples: u32,
}

struct AudioState {
    sample_rate: f32,
    oscillators: Vec<ActiveOscillator>,
}

pub struct AudioOut {
    _stream: cpal::Stream,
    state: Arc<Mutex<AudioState>>,
}

fn lock(state: &Mutex<AudioState>) -> MutexGuard<'_, AudioState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl AudioOut {
    pub fn play(&self, commands: &[NoteCommand]) {
        if commands.is_empty() {
            return;
        }
        let mut guard = lock(&self.state);
        let sr = guard.sample_rate;
        for cmd in commands {
            match *cmd {
                NoteCommand::Play {
                    voice,
                    frequency_hz,
                    velocity,
                    duration_sec,
                } => {
                    let total = ((duration_sec + RELEASE_SEC) * sr) as u32;
                    guard
                        .oscillators
                        .push(oscillator(voice, frequency_hz, velocity, Some(total), sr));
                }
                NoteCommand::Attack {
                    voice,
                    frequency_hz,
                    velocity,
                } => {
                    guard
                        .oscillators
                        .push(oscillator(voice, frequency_hz, velocity, None, sr));
                }
                NoteCommand::Release { voice } => {
                    for osc in guard.oscillators.iter_mut() {
                        if osc.voice == voice && osc.total_samples.is_none() {
                            osc.total_samples = Some(osc.samples_emitted + osc.release_samples);
                        }
                    }
                }
            }
        }
    }
}

fn oscillator(
    voice: Voice,
    frequency_hz: f32,
    velocity: f32,
    total_samples: Option<u32>,
    sr: f32,
) -> ActiveOscillator {
    let gain = match voice {
        Voice::Lead => LEAD_GAIN,
        Voice::Bass => BASS_GAIN,
    };
    let attack = (ATTACK_SEC * sr) as u32;
    let release = (RELEASE_SEC * sr) as u32;
    ActiveOscillator {
        voice,
        amplitude: velocity.min(1.0) * gain,
        phase: 0.0,
        phase_inc: 2.0 * PI * frequency_hz / sr,
        total_samples: total_samples.map(|t| t.max(1)),
        samples_emitted: 0,
        attack_samples: attack,
        release_samples: release,
    }
}

pub fn start_audio() -> Option<AudioOut> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let config = device.default_output_config().ok()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let state = Arc::new(Mutex::new(AudioState {
        sample_rate,
        oscillators: Vec::new(),
    }));

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &config.into(), channels, Arc::clone(&state))
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &config.into(), channels, Arc::clone(&state))
        }
        cpal::SampleFormat::U16 => {
            build_stream::<u16>(&device, &config.into(), channels, Arc::clone(&state))
        }
        other => {
            log::warn!("[audio] unsupported sample format {:?}", other);
            return None;
        }
    }
    .map_err(|e| log::warn!("[audio] could not open output stream: {e}"))
    .ok()?;

    stream.play().ok()?;
    log::info!("[audio] output at {} Hz, {} channels", sample_rate, channels);
    Some(AudioOut {
        _stream: stream,
        state,
    })
}

fn render_wave_sample(phase: f32, voice: Voice) -> f32 {
    match voice {
        Voice::Lead => phase.sin(),
        Voice::Bass => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

fn envelope(osc: &ActiveOscillator) -> f32 {
    let n = osc.samples_emitted;
    if n < osc.attack_samples {
        return n as f32 / osc.attack_samples.max(1) as f32;
    }
    match osc.total_samples {
        Some(total) if n > total.saturating_sub(osc.release_samples) => {
            let rel_n = n - total.saturating_sub(osc.release_samples);
            1.0 - (rel_n as f32 / osc.release_samples.max(1) as f32)
        }
        _ => 1.0,
    }
}

fn mix_sample(oscillators: &mut Vec<ActiveOscillator>) -> f32 {
    let mut out = 0.0f32;
    let mut i = 0usize;
    while i < oscillators.len() {
        let osc = &mut oscillators[i];
        out += render_wave_sample(osc.phase, osc.voice) * osc.amplitude * envelope(osc);
        osc.phase += osc.phase_inc;
        if osc.phase > 2.0 * PI {
            osc.phase -= 2.0 * PI;
        }
        osc.samples_emitted += 1;
        if osc.total_samples.is_some_and(|t| osc.samples_emitted >= t) {
            oscillators.swap_remove(i);
            continue;
        }
        i += 1;
    }
    out.tanh()
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    state: Arc<Mutex<AudioState>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut guard = lock(&state);
            for frame in data.chunks_mut(channels.max(1)) {
                let value = T::from_sample(mix_sample(&mut guard.oscillators));
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        |err| log::error!("[audio] stream error: {err}"),
        None,
    )
}
