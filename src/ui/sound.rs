/// Sound engine: procedural chiptune effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::SimEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::PI;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_land: Arc<Vec<u8>>,
        sfx_snack: Arc<Vec<u8>>,
        sfx_respawn: Arc<Vec<u8>>,
        sfx_spray_on: Arc<Vec<u8>>,
        sfx_spray_off: Arc<Vec<u8>>,
        sfx_complete: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_sweep(320.0, 760.0, 0.11, 0.22))),
                sfx_land: Arc::new(make_wav(&gen_sweep(180.0, 90.0, 0.05, 0.18))),
                sfx_snack: Arc::new(make_wav(&gen_arpeggio(&[1047.0, 1319.0, 1568.0], 0.045))),
                sfx_respawn: Arc::new(make_wav(&gen_arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.09))),
                sfx_spray_on: Arc::new(make_wav(&gen_hiss(0.18, true))),
                sfx_spray_off: Arc::new(make_wav(&gen_hiss(0.10, false))),
                sfx_complete: Arc::new(make_wav(&gen_lullaby())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_land(&self) { self.play(&self.sfx_land); }
        pub fn play_snack(&self) { self.play(&self.sfx_snack); }
        pub fn play_respawn(&self) { self.play(&self.sfx_respawn); }
        pub fn play_spray(&self, active: bool) {
            if active { self.play(&self.sfx_spray_on) } else { self.play(&self.sfx_spray_off) }
        }
        pub fn play_complete(&self) { self.play(&self.sfx_complete); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Linear pitch sweep with a fading envelope.
    pub(super) fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * 2.0 * PI / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Notes in sequence, sine plus a third harmonic.
    pub(super) fn gen_arpeggio(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * PI).sin() * 0.7 + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Spray hiss: noise that swells in when switching on, cuts off otherwise.
    pub(super) fn gen_hiss(duration: f32, rising: bool) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 0x2545_f491;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = if rising { t.powf(0.5) * (1.0 - t).powf(0.3) } else { (1.0 - t).powf(2.0) };
                noise * env * 0.18
            })
            .collect()
    }

    /// Level complete: slow descending lullaby ending on a held tonic.
    pub(super) fn gen_lullaby() -> Vec<f32> {
        let notes = [784.0_f32, 659.0, 587.0, 523.0]; // G5 E5 D5 C5
        let mut samples = Vec::new();
        for (k, &freq) in notes.iter().enumerate() {
            let dur = if k + 1 == notes.len() { 0.4 } else { 0.16 };
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.8;
                let wave = (t * freq * 2.0 * PI).sin() * 0.8 + (t * freq * 2.0 * 2.0 * PI).sin() * 0.2;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_land(&self) {}
    pub fn play_snack(&self) {}
    pub fn play_respawn(&self) {}
    pub fn play_spray(&self, _active: bool) {}
    pub fn play_complete(&self) {}
}

/// Map one frame's simulation events to effects.
pub fn play_events(engine: &SoundEngine, events: &[SimEvent]) {
    for ev in events {
        match ev {
            SimEvent::PlayerJumped { .. } => engine.play_jump(),
            SimEvent::PlayerLanded { .. } => engine.play_land(),
            SimEvent::PlayerRespawned { .. } => engine.play_respawn(),
            SimEvent::SnackCollected { .. } => engine.play_snack(),
            SimEvent::HazardsToggled { active } => engine.play_spray(*active),
            SimEvent::LevelCompleted { .. } => engine.play_complete(),
        }
    }
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::*;

    #[test]
    fn wav_header_matches_sample_count() {
        let samples = gen_sweep(200.0, 400.0, 0.01, 0.5);
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn generators_stay_in_range() {
        for buf in [gen_arpeggio(&[440.0, 880.0], 0.02), gen_hiss(0.05, true), gen_lullaby()] {
            assert!(!buf.is_empty());
            assert!(buf.iter().all(|s| s.abs() <= 1.0));
        }
    }
}
