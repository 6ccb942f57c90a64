//! Audio cues using the Web Audio API
//!
//! Procedurally generated oscillator tones - no sound files. The manager
//! is constructed lazily on the first user gesture and owns all audio
//! state explicitly; every Web Audio failure is swallowed after logging,
//! and nothing here feeds back into the simulation.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Star collected
    Collect,
    /// Heart lost
    Hit,
    /// Resume-countdown step
    CountdownTick,
}

/// Background melody as (frequency Hz, duration s); 0 Hz is a rest
const MELODY: &[(f32, f64)] = &[
    (659.25, 0.5), // E5
    (783.99, 0.5), // G5
    (659.25, 0.5), // E5
    (523.25, 0.9), // C5
    (0.0, 0.4),
    (587.33, 0.5), // D5
    (698.46, 0.5), // F5
    (783.99, 0.7), // G5
    (587.33, 0.9), // D5
    (0.0, 0.8),
    (783.99, 0.5), // G5
    (659.25, 0.5), // E5
    (523.25, 1.0), // C5
    (0.0, 1.5),
];

/// Master gain for the background melody
const MUSIC_GAIN: f32 = 0.04;

/// Length of one melody pass in milliseconds; the host re-triggers
/// [`AudioManager::schedule_music_pass`] at this interval while music is on
pub fn music_pass_ms() -> i32 {
    (MELODY.iter().map(|(_, d)| d).sum::<f64>() * 1000.0) as i32
}

/// Audio session owned by the game glue
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music_gain: Option<GainNode>,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            music_gain: None,
            muted: false,
        }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Fire a one-shot cue
    pub fn play(&self, cue: SoundCue) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Collect => self.play_collect(ctx),
            SoundCue::Hit => self.play_hit(ctx),
            SoundCue::CountdownTick => self.play_countdown_tick(ctx),
        }
    }

    /// Start the background melody and schedule its first pass
    pub fn start_music(&mut self) {
        self.stop_music();
        let Some(ctx) = &self.ctx else { return };

        let Ok(gain) = ctx.create_gain() else {
            log::warn!("music gain node unavailable");
            return;
        };
        gain.gain().set_value(if self.muted { 0.0 } else { MUSIC_GAIN });
        if gain.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        self.music_gain = Some(gain);
        self.schedule_music_pass();
    }

    /// Queue one pass of the melody on the audio clock. A no-op unless
    /// music was started.
    pub fn schedule_music_pass(&self) {
        let (Some(ctx), Some(master)) = (&self.ctx, &self.music_gain) else {
            return;
        };

        let start = ctx.current_time();
        let mut at = 0.0;
        for &(freq, duration) in MELODY {
            if freq > 0.0 {
                self.schedule_note(ctx, master, freq, start + at, duration * 0.9);
            }
            at += duration;
        }
    }

    /// Stop the melody with a quick fade and drop its nodes
    pub fn stop_music(&mut self) {
        let Some(gain) = self.music_gain.take() else {
            return;
        };
        if let Some(ctx) = &self.ctx {
            let t = ctx.current_time();
            let _ = gain.gain().cancel_scheduled_values(t);
            let _ = gain.gain().set_value_at_time(gain.gain().value(), t);
            let _ = gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.05);
        }
        let _ = gain.disconnect();
    }

    /// Tear down the audio session entirely
    pub fn dispose(&mut self) {
        self.stop_music();
        if let Some(ctx) = self.ctx.take() {
            let _ = ctx.close();
        }
    }

    // === Tone generators ===

    /// Oscillator routed through its own gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Collect - bright two-note ding
    fn play_collect(&self, ctx: &AudioContext) {
        let t = ctx.current_time();
        for freq in [987.77, 1318.51] {
            if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) {
                gain.gain().set_value_at_time(0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Hit - short descending thump
    fn play_hit(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(50.0, t + 0.1)
            .ok();
        gain.gain().set_value_at_time(0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Countdown step - short beep
    fn play_countdown_tick(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// One melody note with a short attack/release envelope
    fn schedule_note(
        &self,
        ctx: &AudioContext,
        master: &GainNode,
        freq: f32,
        at: f64,
        duration: f64,
    ) {
        let Ok(osc) = ctx.create_oscillator() else {
            return;
        };
        let Ok(gain) = ctx.create_gain() else { return };

        osc.set_type(OscillatorType::Sine);
        if osc.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(master).is_err()
        {
            return;
        }

        let attack = 0.015;
        let release = 0.18;
        osc.frequency().set_value_at_time(freq, at).ok();
        gain.gain().set_value_at_time(0.0, at).ok();
        gain.gain().linear_ramp_to_value_at_time(1.0, at + attack).ok();
        gain.gain()
            .set_value_at_time(1.0, (at + duration - release).max(at + attack))
            .ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, at + duration).ok();

        osc.start_with_when(at).ok();
        osc.stop_with_when(at + duration).ok();
    }
}
