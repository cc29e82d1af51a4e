//! Sound effects for launches and bursts.
//!
//! Built with the `audio` feature, [`AudioEngine`] plays through the default
//! output device. Without the feature, without a device, or when muted it
//! only counts and logs events.

pub mod synth;

use crate::events::{EventSink, ShowEvent};

#[cfg(feature = "audio")]
use output::Output;

pub struct AudioEngine {
    #[cfg(feature = "audio")]
    output: Option<Output>,
    launches: u64,
    explosions: u64,
}

impl AudioEngine {
    pub fn new(muted: bool) -> Self {
        if muted {
            log::info!("audio muted");
            return Self::muted();
        }

        #[cfg(feature = "audio")]
        {
            let output = Output::open();
            if output.is_none() {
                log::warn!("no audio output device, continuing without sound");
            }
            Self {
                output,
                launches: 0,
                explosions: 0,
            }
        }

        #[cfg(not(feature = "audio"))]
        {
            log::info!("built without audio support");
            Self::muted()
        }
    }

    pub fn muted() -> Self {
        Self {
            #[cfg(feature = "audio")]
            output: None,
            launches: 0,
            explosions: 0,
        }
    }

    pub fn is_muted(&self) -> bool {
        #[cfg(feature = "audio")]
        {
            self.output.is_none()
        }
        #[cfg(not(feature = "audio"))]
        {
            true
        }
    }

    pub fn launches(&self) -> u64 {
        self.launches
    }

    pub fn explosions(&self) -> u64 {
        self.explosions
    }

    #[cfg(feature = "audio")]
    fn play(&self, cues: Vec<synth::Cue>) {
        if let Some(output) = &self.output {
            output.play(cues);
        }
    }

    #[cfg(not(feature = "audio"))]
    fn play(&self, _cues: Vec<synth::Cue>) {}
}

impl EventSink for AudioEngine {
    fn emit(&mut self, event: ShowEvent) {
        match event {
            ShowEvent::Launch => {
                self.launches += 1;
                if !self.is_muted() {
                    self.play(synth::launch_cues());
                }
            }
            ShowEvent::Explosion => {
                self.explosions += 1;
                if !self.is_muted() {
                    self.play(synth::explosion_cues());
                }
            }
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        log::info!(
            "audio closed after {} launches, {} explosions",
            self.launches,
            self.explosions
        );
    }
}

#[cfg(feature = "audio")]
mod output {
    use std::time::Duration;

    use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

    use super::synth::{Cue, SAMPLE_RATE, Sound};

    pub struct Output {
        stream: OutputStream,
    }

    impl Output {
        pub fn open() -> Option<Self> {
            let mut stream = OutputStreamBuilder::open_default_stream().ok()?;
            // Dropping the stream would otherwise print to the restored terminal
            stream.log_on_drop(false);
            Some(Self { stream })
        }

        /// Fire-and-forget: every cue gets its own detached sink.
        pub fn play(&self, cues: Vec<Cue>) {
            for cue in cues {
                let sink = Sink::connect_new(self.stream.mixer());
                sink.append(cue.sound.delay(Duration::from_secs_f32(cue.delay)));
                sink.detach();
            }
        }
    }

    impl Source for Sound {
        fn current_span_len(&self) -> Option<usize> {
            None
        }

        fn channels(&self) -> rodio::ChannelCount {
            1
        }

        fn sample_rate(&self) -> rodio::SampleRate {
            SAMPLE_RATE
        }

        fn total_duration(&self) -> Option<Duration> {
            None
        }
    }
}
