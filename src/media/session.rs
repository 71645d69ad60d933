use crate::media::MediaDescriptor;
use std::time::Instant;

/// Playback clock for the selected media.
///
/// Position only advances while playing and is driven by [`MediaSession::tick`]
/// so callers decide which `Instant` counts as "now".
#[derive(Debug, Clone, Default)]
pub struct MediaSession {
    descriptor: Option<MediaDescriptor>,
    position: f64,
    playing: bool,
    last_tick: Option<Instant>,
}

impl MediaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata arrived for a new source. Playback restarts from zero, paused.
    pub fn load(&mut self, descriptor: MediaDescriptor) {
        self.descriptor = Some(descriptor);
        self.position = 0.0;
        self.playing = false;
        self.last_tick = None;
    }

    pub fn unload(&mut self) {
        *self = Self::default();
    }

    pub fn descriptor(&self) -> Option<MediaDescriptor> {
        self.descriptor
    }

    pub fn is_ready(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        self.descriptor.map(|d| d.duration_seconds)
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Returns `true` when playback actually started.
    pub fn play(&mut self, now: Instant) -> bool {
        let Some(duration) = self.duration() else {
            return false;
        };
        if self.playing {
            return false;
        }
        if self.position >= duration {
            self.position = 0.0;
        }
        self.playing = true;
        self.last_tick = Some(now);
        true
    }

    /// Returns `true` when playback was running and is now paused.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        self.tick(now);
        self.playing = false;
        self.last_tick = None;
        true
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing {
            self.pause(now);
        } else {
            self.play(now);
        }
    }

    pub fn seek(&mut self, seconds: f64, now: Instant) {
        let Some(duration) = self.duration() else {
            return;
        };
        self.position = if seconds.is_finite() {
            seconds.clamp(0.0, duration)
        } else {
            0.0
        };
        if self.playing {
            self.last_tick = Some(now);
        }
    }

    /// Advance the clock and return the new position. Reaching the end stops
    /// playback and clears the playing flag.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if !self.playing {
            return self.position;
        }
        let Some(duration) = self.duration() else {
            return self.position;
        };
        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.position = (self.position + elapsed).min(duration);
        }
        self.last_tick = Some(now);
        if self.position >= duration {
            self.playing = false;
            self.last_tick = None;
            tracing::debug!(duration, "playback reached end of media");
        }
        self.position
    }
}
