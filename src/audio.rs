//! Sound effects
//!
//! The sim only emits [`SoundEvent`]s through an [`AudioSink`]. On the web the
//! events are synthesised with the Web Audio API from the [`voice`] table, no
//! sample files needed.

use std::cell::RefCell;
use std::rc::Rc;

/// Gameplay sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Shoot,
    Jump,
    /// Right call on a target
    Correct,
    /// Wrong call on a target
    Incorrect,
    LevelComplete,
    LevelFailed,
}

impl SoundEvent {
    pub const ALL: [SoundEvent; 6] = [
        SoundEvent::Shoot,
        SoundEvent::Jump,
        SoundEvent::Correct,
        SoundEvent::Incorrect,
        SoundEvent::LevelComplete,
        SoundEvent::LevelFailed,
    ];
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Silent sink (native runs, muted builds)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

/// Lets the page keep a handle to the sink it gave the sim
impl<T: AudioSink> AudioSink for Rc<RefCell<T>> {
    fn play(&mut self, event: SoundEvent) {
        self.borrow_mut().play(event);
    }
}

/// Sink that remembers what was played. Clones share one log.
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    events: Rc<RefCell<Vec<SoundEvent>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SoundEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: SoundEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, event: SoundEvent) {
        log::debug!("sound: {:?}", event);
        self.events.borrow_mut().push(event);
    }
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator note: start after `delay`, sweep `freq -> freq_end` and
/// decay from `gain * volume` to silence over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub freq: f32,
    pub freq_end: Option<f32>,
    pub gain: f32,
    pub delay: f64,
    pub duration: f64,
}

const fn sweep(wave: Wave, freq: f32, freq_end: f32, gain: f32, duration: f64) -> Tone {
    Tone {
        wave,
        freq,
        freq_end: Some(freq_end),
        gain,
        delay: 0.0,
        duration,
    }
}

const fn note(freq: f32, delay: f64) -> Tone {
    Tone {
        wave: Wave::Sine,
        freq,
        freq_end: None,
        gain: 0.4,
        delay,
        duration: 0.08,
    }
}

const SHOOT: [Tone; 1] = [sweep(Wave::Square, 1200.0, 800.0, 0.7, 0.05)];
const JUMP: [Tone; 1] = [sweep(Wave::Sine, 300.0, 150.0, 0.8, 0.1)];
const CORRECT: [Tone; 1] = [sweep(Wave::Sine, 600.0, 800.0, 0.6, 0.08)];
const INCORRECT: [Tone; 1] = [sweep(Wave::Sawtooth, 200.0, 150.0, 0.5, 0.12)];
/// A major arpeggio
const LEVEL_COMPLETE: [Tone; 4] = [
    note(440.0, 0.0),
    note(554.0, 0.1),
    note(659.0, 0.2),
    note(880.0, 0.3),
];
const LEVEL_FAILED: [Tone; 1] = [sweep(Wave::Triangle, 200.0, 100.0, 0.6, 0.3)];

/// Synthesis recipe for an event
pub fn voice(event: SoundEvent) -> &'static [Tone] {
    match event {
        SoundEvent::Shoot => &SHOOT,
        SoundEvent::Jump => &JUMP,
        SoundEvent::Correct => &CORRECT,
        SoundEvent::Incorrect => &INCORRECT,
        SoundEvent::LevelComplete => &LEVEL_COMPLETE,
        SoundEvent::LevelFailed => &LEVEL_FAILED,
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundEvent, Tone, Wave, voice};
    use crate::settings::Settings;

    /// Web Audio output
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        enabled: bool,
        volume: f32,
    }

    impl WebAudio {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                enabled: settings.sound_enabled,
                volume: settings.volume,
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.enabled = settings.sound_enabled;
            self.volume = settings.volume.clamp(0.0, 1.0);
        }

        /// Browsers keep the context suspended until a user gesture
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            wave: Wave,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            });
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone) {
            let Some((osc, gain)) = self.create_osc(ctx, tone.freq, tone.wave) else {
                return;
            };
            let t = ctx.current_time() + tone.delay;
            let end = t + tone.duration;

            osc.frequency().set_value_at_time(tone.freq, t).ok();
            if let Some(freq_end) = tone.freq_end {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(freq_end, end)
                    .ok();
            }
            gain.gain().set_value_at_time(self.volume * tone.gain, t).ok();
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(end).ok();
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, event: SoundEvent) {
            if !self.enabled || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            for tone in voice(event) {
                self.play_tone(ctx, tone);
            }
        }
    }
}
