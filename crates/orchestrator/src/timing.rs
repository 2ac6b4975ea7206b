//! Humanized timing: how long the persona thinks and types.

use std::time::Duration;

use rand::Rng;

use crate::config::TimingConfig;
use crate::text;

/// Characters in an average word.
const CHARS_PER_WORD: f64 = 5.0;

/// Pauses before a reply is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// Pause before starting to write.
    pub thinking: Duration,
    /// Time spent "typing" the reply.
    pub typing: Duration,
}

impl Delays {
    pub fn total(&self) -> Duration {
        self.thinking + self.typing
    }
}

/// Samples thinking and typing pauses from a [`TimingConfig`].
#[derive(Debug, Clone)]
pub struct TimingModel {
    config: TimingConfig,
}

impl TimingModel {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    /// Both pauses for `reply`.
    pub fn compute_delays<R: Rng + ?Sized>(&self, reply: &str, rng: &mut R) -> Delays {
        let thinking = self.thinking_delay(rng);
        let typing = self.typing_delay(reply, rng);
        Delays { thinking, typing }
    }

    /// Uniform pause between the configured bounds, independent of content.
    pub fn thinking_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.config.response_delay_min.as_secs_f64();
        let max = self.config.response_delay_max.as_secs_f64();
        if max <= min {
            return self.config.response_delay_min;
        }
        Duration::try_from_secs_f64(rng.gen_range(min..=max))
            .unwrap_or(self.config.response_delay_max)
    }

    /// Time to type `reply` at the configured speed.
    ///
    /// Every technology keyword costs a confusion penalty, and an occasional
    /// typo costs a correction delay. The result is clamped to the typing
    /// bounds, and for a fixed random source it never decreases as the reply
    /// grows.
    pub fn typing_delay<R: Rng + ?Sized>(&self, reply: &str, rng: &mut R) -> Duration {
        let cfg = &self.config;
        let chars_per_second = cfg.typing_wpm * CHARS_PER_WORD / 60.0;

        let mut secs = reply.chars().count() as f64 / chars_per_second;
        secs += text::count_occurrences(reply, text::TECH_KEYWORDS) as f64
            * cfg.confusion_penalty.as_secs_f64();
        if rng.gen_bool(cfg.correction_probability) {
            secs += cfg.correction_delay.as_secs_f64();
        }

        let secs = secs.clamp(
            cfg.min_typing_delay.as_secs_f64(),
            cfg.max_typing_delay.as_secs_f64(),
        );
        Duration::try_from_secs_f64(secs).unwrap_or(cfg.max_typing_delay)
    }

    /// How often the composing indicator should be re-sent.
    pub fn composing_refresh(&self) -> Duration {
        self.config.composing_refresh
    }
}
