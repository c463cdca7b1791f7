/// Sound engine: procedural chiptune cues via rodio.
///
/// Every cue is rendered to an in-memory WAV buffer once at startup.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// One sound effect per kind of game event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Jump,
    Coin,
    Stomp,
    Hurt,
    Fall,
    Die,
}

impl Cue {
    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    pub const ALL: [Cue; 6] = [Cue::Jump, Cue::Coin, Cue::Stomp, Cue::Hurt, Cue::Fall, Cue::Die];

    pub fn for_event(event: &GameEvent) -> Cue {
        match event {
            GameEvent::Jumped => Cue::Jump,
            GameEvent::CoinPicked { .. } => Cue::Coin,
            GameEvent::EnemyStomped { .. } => Cue::Stomp,
            GameEvent::PlayerHurt { .. } => Cue::Hurt,
            GameEvent::PlayerFell { .. } => Cue::Fall,
            GameEvent::PlayerDied => Cue::Die,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{debug, warn};

    use super::Cue;

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed by `Cue as usize`.
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            let buffers = Cue::ALL.iter()
                .map(|&cue| Arc::new(make_wav(&render(cue))))
                .collect();
            debug!(cues = Cue::ALL.len(), "sound buffers ready");

            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, cue: Cue) {
            let buf = &self.buffers[cue as usize];
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    pub(super) fn render(cue: Cue) -> Vec<f32> {
        match cue {
            Cue::Jump => gen_jump(),
            Cue::Coin => gen_coin(),
            Cue::Stomp => gen_stomp(),
            Cue::Hurt => gen_hurt(),
            Cue::Fall => gen_fall(),
            Cue::Die => gen_die(),
        }
    }

    // ── Cue synthesis: mono f32 samples in [-1, 1] ──

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Pitch sweep from `f0` to `f1` Hz with a linear fade out.
    fn sweep(f0: f32, f1: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (f0 + (f1 - f0) * t) / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * volume
            })
            .collect()
    }

    /// Consecutive notes; each gets sine + 3rd harmonic for a square-ish tone.
    fn notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in freqs {
            let n = sample_count(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Jump: quick upward chirp
    fn gen_jump() -> Vec<f32> {
        sweep(300.0, 750.0, 0.09, 0.25)
    }

    /// Coin: two bright notes B5 → E6
    fn gen_coin() -> Vec<f32> {
        notes(&[988.0, 1319.0], 0.06, 0.25)
    }

    /// Stomp: low thud, noise over a falling tone
    fn gen_stomp() -> Vec<f32> {
        let n = sample_count(0.1);
        let mut rng: u32 = 0x5eed;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                phase += (220.0 - t * 140.0) / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                ((phase * TAU).sin() * 0.6 + noise * 0.4) * (1.0 - t).powf(1.5) * 0.35
            })
            .collect()
    }

    /// Hurt: short dissonant buzz
    fn gen_hurt() -> Vec<f32> {
        notes(&[233.0, 220.0], 0.08, 0.3)
    }

    /// Fall: long descending whistle
    fn gen_fall() -> Vec<f32> {
        sweep(900.0, 150.0, 0.45, 0.25)
    }

    /// Death: sad descending line A4 → F#4 → Eb4 → C4, faded tail
    fn gen_die() -> Vec<f32> {
        let mut samples = notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3);
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade_len as f32;
        }
        samples
    }

    // ── WAV encoding: RIFF header + 16-bit mono PCM ──

    const WAV_HEADER_LEN: usize = 44;

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);

        let fields: [&[u8]; 13] = [
            b"RIFF",
            &(36 + data_len).to_le_bytes(),
            b"WAVE",
            b"fmt ",
            &16u32.to_le_bytes(),            // fmt chunk size
            &1u16.to_le_bytes(),             // PCM
            &1u16.to_le_bytes(),             // mono
            &SAMPLE_RATE.to_le_bytes(),
            &(SAMPLE_RATE * 2).to_le_bytes(), // bytes per second
            &2u16.to_le_bytes(),             // bytes per frame
            &16u16.to_le_bytes(),            // bits per sample
            b"data",
            &data_len.to_le_bytes(),
        ];
        fields.iter().for_each(|f| wav.extend_from_slice(f));

        wav.extend(samples.iter().flat_map(|&s| ((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes()));
        wav
    }
}

// Without the feature the engine is a stub that plays nothing.

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
}

/// Play the cue for each event of a frame.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(engine) = sound else { return };
    for event in events {
        engine.play(Cue::for_event(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_has_a_cue() {
        assert_eq!(Cue::for_event(&GameEvent::Jumped), Cue::Jump);
        assert_eq!(Cue::for_event(&GameEvent::CoinPicked { index: 3 }), Cue::Coin);
        assert_eq!(Cue::for_event(&GameEvent::EnemyStomped { id: 0 }), Cue::Stomp);
        assert_eq!(Cue::for_event(&GameEvent::PlayerHurt { lives: 2 }), Cue::Hurt);
        assert_eq!(Cue::for_event(&GameEvent::PlayerFell { lives: 1 }), Cue::Fall);
        assert_eq!(Cue::for_event(&GameEvent::PlayerDied), Cue::Die);
    }

    #[test]
    fn cue_indices_match_table_order() {
        for (i, cue) in Cue::ALL.iter().enumerate() {
            assert_eq!(*cue as usize, i);
        }
    }

    #[cfg(feature = "sound")]
    #[test]
    fn cues_render_to_valid_wav() {
        use super::inner::{make_wav, render, SAMPLE_RATE};
        for cue in Cue::ALL {
            let samples = render(cue);
            assert!(!samples.is_empty(), "{cue:?} is silent");
            assert!(samples.iter().all(|s| s.abs() <= 1.0), "{cue:?} clips");

            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), SAMPLE_RATE);
        }
    }
}
