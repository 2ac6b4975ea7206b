//! Response-decision policy.
//!
//! Decides for each inbound message whether the persona should answer, and
//! whether that answer is exempt from rate limiting.

use chat_core::{ChatEvent, ContextEntry};
use rand::Rng;
use regex::Regex;

use crate::config::BotConfig;
use crate::error::ConfigError;
use crate::text;

/// How many recent context entries are checked for the persona's own messages.
const FOLLOW_UP_LOOKBACK: usize = 3;

/// Why a message may get an answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// The message quotes one of the persona's messages.
    DirectReply,
    /// The message mentions the persona or one of its trigger words.
    Mention,
    /// The message carries an image.
    ImageAttached,
    /// Heuristic signals suggest the persona would chime in.
    HeuristicMatch { probability: f64 },
    /// No signal; answer only by chance.
    RandomCandidate { probability: f64 },
    /// Never answer.
    NoTrigger,
}

impl Trigger {
    /// Whether the persona always answers.
    pub fn is_unconditional(&self) -> bool {
        matches!(
            self,
            Trigger::DirectReply | Trigger::Mention | Trigger::ImageAttached
        )
    }

    /// Whether the answer skips the rate limiter.
    pub fn bypasses_rate_limit(&self) -> bool {
        self.is_unconditional()
    }

    /// Chance of answering.
    pub fn probability(&self) -> f64 {
        match self {
            Trigger::DirectReply | Trigger::Mention | Trigger::ImageAttached => 1.0,
            Trigger::HeuristicMatch { probability } | Trigger::RandomCandidate { probability } => {
                *probability
            }
            Trigger::NoTrigger => 0.0,
        }
    }

    /// Draw whether to answer. Certain outcomes consume no randomness.
    pub fn should_respond<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let p = self.probability();
        if p >= 1.0 {
            return true;
        }
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        rng.gen_bool(p)
    }

    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Trigger::DirectReply => "direct_reply",
            Trigger::Mention => "mention",
            Trigger::ImageAttached => "image",
            Trigger::HeuristicMatch { .. } => "heuristic",
            Trigger::RandomCandidate { .. } => "random",
            Trigger::NoTrigger => "none",
        }
    }
}

/// Weight each heuristic signal adds to the score.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicWeights {
    /// Message opens with a question word.
    pub question_opener: f64,
    /// Per distinct technology keyword.
    pub tech_keyword: f64,
    /// Upper bound for all technology keywords together.
    pub tech_keyword_cap: f64,
    pub help_request: f64,
    pub question_mark: f64,
    /// Message addresses the whole group.
    pub group_address: f64,
    pub confusion: f64,
    /// The persona spoke in the last few messages.
    pub follow_up: f64,
}

impl HeuristicWeights {
    pub(crate) fn all(&self) -> [f64; 8] {
        [
            self.question_opener,
            self.tech_keyword,
            self.tech_keyword_cap,
            self.help_request,
            self.question_mark,
            self.group_address,
            self.confusion,
            self.follow_up,
        ]
    }
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            question_opener: 0.3,
            tech_keyword: 0.15,
            tech_keyword_cap: 0.4,
            help_request: 0.35,
            question_mark: 0.2,
            group_address: 0.15,
            confusion: 0.25,
            follow_up: 0.15,
        }
    }
}

/// Classifies inbound messages into [`Trigger`]s.
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    trigger_pattern: Option<Regex>,
    weights: HeuristicWeights,
    high_confidence: f64,
    low_confidence: f64,
    random_probability: f64,
}

impl ResponsePolicy {
    /// Build the policy from the bot configuration.
    pub fn new(config: &BotConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            trigger_pattern: trigger_pattern(&config.persona.trigger_words)?,
            weights: config.response.weights.clone(),
            high_confidence: config.response.high_confidence_threshold,
            low_confidence: config.response.low_confidence_threshold,
            random_probability: config.response.random_response_probability,
        })
    }

    /// Classify `event` given the messages that preceded it.
    pub fn classify(&self, event: &ChatEvent, recent: &[ContextEntry]) -> Trigger {
        if event.is_blank() {
            return Trigger::NoTrigger;
        }
        if event.is_reply_to_self() {
            return Trigger::DirectReply;
        }
        if event.mentions_self || self.contains_trigger_word(&event.text) {
            return Trigger::Mention;
        }
        if event.has_image() {
            return Trigger::ImageAttached;
        }

        let score = self.score(&event.text, recent);
        if score > self.high_confidence {
            Trigger::HeuristicMatch { probability: 1.0 }
        } else if score > self.low_confidence {
            Trigger::HeuristicMatch { probability: score }
        } else if self.random_probability > 0.0 {
            Trigger::RandomCandidate {
                probability: self.random_probability,
            }
        } else {
            Trigger::NoTrigger
        }
    }

    /// Heuristic interest score in `[0, 1]`.
    pub fn score(&self, message: &str, recent: &[ContextEntry]) -> f64 {
        let w = &self.weights;
        let words = text::words(message);
        let mut score = 0.0;

        if words
            .first()
            .is_some_and(|first| text::QUESTION_STARTERS.contains(&first.as_str()))
        {
            score += w.question_opener;
        }

        let tech_hits = text::count_matches(&words, text::TECH_KEYWORDS) as f64;
        score += (tech_hits * w.tech_keyword).min(w.tech_keyword_cap);

        if text::contains_any(&words, text::HELP_PHRASES) {
            score += w.help_request;
        }
        if message.contains('?') {
            score += w.question_mark;
        }
        if text::contains_any(&words, text::GROUP_ADDRESS) {
            score += w.group_address;
        }
        if text::contains_any(&words, text::CONFUSION_WORDS) {
            score += w.confusion;
        }
        if recent
            .iter()
            .rev()
            .take(FOLLOW_UP_LOOKBACK)
            .any(|entry| entry.from_self)
        {
            score += w.follow_up;
        }

        score.clamp(0.0, 1.0)
    }

    fn contains_trigger_word(&self, message: &str) -> bool {
        self.trigger_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(message))
    }
}

fn trigger_pattern(words: &[String]) -> Result<Option<Regex>, ConfigError> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(bounded)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }

    let source = format!("(?i)(?:{})", alternatives.join("|"));
    Regex::new(&source)
        .map(Some)
        .map_err(|e| ConfigError::invalid("TRIGGER_WORDS", words.join(","), e.to_string()))
}

/// Escape `word` and anchor it on word boundaries.
///
/// `\b` only holds next to a word character, so an edge such as the `@` of
/// `@nonno` is left unanchored.
fn bounded(word: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let boundary = |edge: Option<char>| if edge.is_some_and(is_word) { r"\b" } else { "" };

    format!(
        "{}{}{}",
        boundary(word.chars().next()),
        regex::escape(word),
        boundary(word.chars().next_back())
    )
}
