//! Bot configuration: persona, response policy, timing, safety and logging.
//!
//! Everything is read once at startup through [`BotConfig::from_env`] (or
//! [`BotConfig::from_lookup`] in tests) and validated before use.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::policy::HeuristicWeights;

/// Default personality description.
pub const DEFAULT_PERSONALITY: &str =
    "un nonno di 70 anni, gentile e curioso, che si confonde con la tecnologia";

/// Default log file.
pub const DEFAULT_LOG_FILE: &str = "nonno_bot.log";

/// Complete configuration of the response core.
#[derive(Debug, Clone, Default)]
pub struct BotConfig {
    pub persona: PersonaConfig,
    pub response: ResponseConfig,
    pub timing: TimingConfig,
    pub safety: SafetyConfig,
    pub logging: LoggingConfig,
}

/// Who the persona is.
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    /// Account the persona posts from; used as sender id of its own messages.
    pub account: String,
    /// Name shown for the persona's own messages in the prompt.
    pub display_name: String,
    /// Personality description passed to the AI backend.
    pub personality: String,
    /// Lowercased words that count as addressing the persona.
    pub trigger_words: Vec<String>,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            account: "self".to_string(),
            display_name: "Nonno".to_string(),
            personality: DEFAULT_PERSONALITY.to_string(),
            trigger_words: Vec::new(),
        }
    }
}

/// When to respond.
#[derive(Debug, Clone)]
pub struct ResponseConfig {
    /// Messages kept per group and sent to the AI backend.
    pub context_messages: usize,
    /// Chance of answering a message with no other signal.
    pub random_response_probability: f64,
    /// Score above which a heuristic match always responds.
    pub high_confidence_threshold: f64,
    /// Score above which a heuristic match responds with probability = score.
    pub low_confidence_threshold: f64,
    pub weights: HeuristicWeights,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            context_messages: 20,
            random_response_probability: 0.05,
            high_confidence_threshold: 0.4,
            low_confidence_threshold: 0.2,
            weights: HeuristicWeights::default(),
        }
    }
}

/// Humanized timing parameters.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Lower bound of the thinking pause.
    pub response_delay_min: Duration,
    /// Upper bound of the thinking pause.
    pub response_delay_max: Duration,
    /// Typing speed in words per minute (5 characters per word).
    pub typing_wpm: f64,
    /// Extra time per tech keyword occurrence in the reply.
    pub confusion_penalty: Duration,
    /// Chance of a simulated typo-and-fix.
    pub correction_probability: f64,
    /// Time a typo-and-fix costs.
    pub correction_delay: Duration,
    pub min_typing_delay: Duration,
    pub max_typing_delay: Duration,
    /// How often the composing indicator is re-sent.
    pub composing_refresh: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            response_delay_min: Duration::from_secs(1),
            response_delay_max: Duration::from_secs(3),
            typing_wpm: 25.0,
            confusion_penalty: Duration::from_secs(3),
            correction_probability: 0.1,
            correction_delay: Duration::from_secs(5),
            min_typing_delay: Duration::from_secs(2),
            max_typing_delay: Duration::from_secs(180),
            composing_refresh: Duration::from_secs(4),
        }
    }
}

/// Abuse and failure limits.
#[derive(Debug, Clone)]
pub struct SafetyConfig {
    /// Autonomous replies allowed per window.
    pub rate_limit_messages: usize,
    pub rate_limit_window: Duration,
    /// Drop messages from known automated accounts.
    pub ignore_bots: bool,
    /// Upper bound for one AI completion.
    pub ai_timeout: Duration,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            rate_limit_messages: 10,
            rate_limit_window: Duration::from_secs(60),
            ignore_bots: true,
            ai_timeout: Duration::from_secs(30),
        }
    }
}

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(ConfigError::invalid(
                "LOG_LEVEL",
                s,
                "must be one of DEBUG, INFO, WARNING, ERROR",
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Where logs go.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Log file; `None` logs to stdout only.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Persona:
    /// - `SIGNAL_ACCOUNT` - account the persona posts from
    /// - `BOT_NAME` - display name (default: Nonno)
    /// - `BOT_PERSONALITY` - personality description
    /// - `TRIGGER_WORDS` - comma-separated words that address the persona
    ///
    /// Response:
    /// - `CONTEXT_MESSAGES` (default: 20)
    /// - `RANDOM_RESPONSE_PROBABILITY` (default: 0.05)
    ///
    /// Timing (seconds unless noted):
    /// - `RESPONSE_DELAY_MIN` / `RESPONSE_DELAY_MAX` (default: 1 / 3)
    /// - `TYPING_WPM` - words per minute (default: 25)
    /// - `TYPING_CONFUSION_PENALTY` (default: 3)
    /// - `TYPING_CORRECTION_PROBABILITY` - 0..1 (default: 0.1)
    /// - `TYPING_CORRECTION_DELAY` (default: 5)
    /// - `TYPING_MIN_DELAY` / `TYPING_MAX_DELAY` (default: 2 / 180)
    /// - `COMPOSING_REFRESH_INTERVAL` (default: 4)
    ///
    /// Safety:
    /// - `RATE_LIMIT_MESSAGES` / `RATE_LIMIT_WINDOW` (default: 10 / 60)
    /// - `IGNORE_BOTS` (default: true)
    /// - `AI_TIMEOUT` (default: 30)
    ///
    /// Logging:
    /// - `LOG_LEVEL` - DEBUG, INFO, WARNING or ERROR (default: INFO)
    /// - `LOG_FILE` - path, empty to disable (default: nonno_bot.log)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BotConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Settings { lookup };
        let defaults = BotConfig::default();

        let persona = PersonaConfig {
            account: settings.get("SIGNAL_ACCOUNT").unwrap_or(defaults.persona.account),
            display_name: settings
                .get("BOT_NAME")
                .unwrap_or(defaults.persona.display_name),
            personality: settings
                .get("BOT_PERSONALITY")
                .unwrap_or(defaults.persona.personality),
            trigger_words: settings.list("TRIGGER_WORDS"),
        };

        let response = ResponseConfig {
            context_messages: settings
                .parse("CONTEXT_MESSAGES", defaults.response.context_messages)?,
            random_response_probability: settings.probability(
                "RANDOM_RESPONSE_PROBABILITY",
                defaults.response.random_response_probability,
            )?,
            ..defaults.response
        };

        let timing = TimingConfig {
            response_delay_min: settings.seconds(
                "RESPONSE_DELAY_MIN",
                defaults.timing.response_delay_min,
            )?,
            response_delay_max: settings.seconds(
                "RESPONSE_DELAY_MAX",
                defaults.timing.response_delay_max,
            )?,
            typing_wpm: settings.parse("TYPING_WPM", defaults.timing.typing_wpm)?,
            confusion_penalty: settings.seconds(
                "TYPING_CONFUSION_PENALTY",
                defaults.timing.confusion_penalty,
            )?,
            correction_probability: settings.probability(
                "TYPING_CORRECTION_PROBABILITY",
                defaults.timing.correction_probability,
            )?,
            correction_delay: settings.seconds(
                "TYPING_CORRECTION_DELAY",
                defaults.timing.correction_delay,
            )?,
            min_typing_delay: settings
                .seconds("TYPING_MIN_DELAY", defaults.timing.min_typing_delay)?,
            max_typing_delay: settings
                .seconds("TYPING_MAX_DELAY", defaults.timing.max_typing_delay)?,
            composing_refresh: settings.seconds(
                "COMPOSING_REFRESH_INTERVAL",
                defaults.timing.composing_refresh,
            )?,
        };

        let safety = SafetyConfig {
            rate_limit_messages: settings
                .parse("RATE_LIMIT_MESSAGES", defaults.safety.rate_limit_messages)?,
            rate_limit_window: settings
                .seconds("RATE_LIMIT_WINDOW", defaults.safety.rate_limit_window)?,
            ignore_bots: settings.flag("IGNORE_BOTS", defaults.safety.ignore_bots),
            ai_timeout: settings.seconds("AI_TIMEOUT", defaults.safety.ai_timeout)?,
        };

        let logging = LoggingConfig {
            level: match settings.get("LOG_LEVEL") {
                Some(raw) => raw.parse()?,
                None => defaults.logging.level,
            },
            // An explicitly empty LOG_FILE disables the file sink.
            file: match (settings.lookup)("LOG_FILE") {
                Some(raw) if raw.trim().is_empty() => None,
                Some(raw) => Some(PathBuf::from(raw.trim())),
                None => defaults.logging.file,
            },
        };

        let config = Self {
            persona,
            response,
            timing,
            safety,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.response.context_messages < 1 {
            return Err(ConfigError::Validation(
                "CONTEXT_MESSAGES must be at least 1".to_string(),
            ));
        }
        if self.timing.response_delay_max < self.timing.response_delay_min {
            return Err(ConfigError::Validation(
                "RESPONSE_DELAY_MIN must not exceed RESPONSE_DELAY_MAX".to_string(),
            ));
        }
        if self.timing.max_typing_delay < self.timing.min_typing_delay {
            return Err(ConfigError::Validation(
                "TYPING_MIN_DELAY must not exceed TYPING_MAX_DELAY".to_string(),
            ));
        }
        if !(self.timing.typing_wpm.is_finite() && self.timing.typing_wpm > 0.0) {
            return Err(ConfigError::Validation(
                "TYPING_WPM must be a positive number".to_string(),
            ));
        }
        if self.timing.composing_refresh.is_zero() {
            return Err(ConfigError::Validation(
                "COMPOSING_REFRESH_INTERVAL must be positive".to_string(),
            ));
        }
        if self.safety.rate_limit_messages < 1 || self.safety.rate_limit_window < Duration::from_secs(1)
        {
            return Err(ConfigError::Validation(
                "RATE_LIMIT_MESSAGES and RATE_LIMIT_WINDOW must be at least 1".to_string(),
            ));
        }
        if self.safety.ai_timeout.is_zero() {
            return Err(ConfigError::Validation("AI_TIMEOUT must be positive".to_string()));
        }
        let r = &self.response;
        if !(0.0..=1.0).contains(&r.random_response_probability) {
            return Err(ConfigError::Validation(
                "RANDOM_RESPONSE_PROBABILITY must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.timing.correction_probability) {
            return Err(ConfigError::Validation(
                "TYPING_CORRECTION_PROBABILITY must be between 0 and 1".to_string(),
            ));
        }
        if r.weights.all().iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(ConfigError::Validation(
                "heuristic weights must be finite and non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&r.low_confidence_threshold)
            || !(0.0..=1.0).contains(&r.high_confidence_threshold)
            || r.low_confidence_threshold > r.high_confidence_threshold
        {
            return Err(ConfigError::Validation(
                "heuristic thresholds must satisfy 0 <= low <= high <= 1".to_string(),
            ));
        }
        Ok(())
    }
}

struct Settings<F> {
    lookup: F,
}

impl<F> Settings<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid(key, raw, "not a valid number")),
        }
    }

    fn seconds(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        let secs: f64 = raw
            .parse()
            .map_err(|_| ConfigError::invalid(key, raw.as_str(), "not a number of seconds"))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::invalid(key, raw, "must be zero or more seconds"));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| ConfigError::invalid(key, raw.as_str(), e.to_string()))
    }

    fn probability(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        let value: f64 = self.parse(key, default)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::invalid(
                key,
                value.to_string(),
                "must be between 0 and 1",
            ));
        }
        Ok(value)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(default)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        BotConfig::from_lookup(lookup(pairs))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.persona.display_name, "Nonno");
        assert_eq!(config.persona.personality, DEFAULT_PERSONALITY);
        assert!(config.persona.trigger_words.is_empty());
        assert_eq!(config.response.context_messages, 20);
        assert_eq!(config.response.random_response_probability, 0.05);
        assert_eq!(config.timing.response_delay_min, Duration::from_secs(1));
        assert_eq!(config.timing.response_delay_max, Duration::from_secs(3));
        assert_eq!(config.timing.typing_wpm, 25.0);
        assert_eq!(config.timing.composing_refresh, Duration::from_secs(4));
        assert_eq!(config.safety.rate_limit_messages, 10);
        assert_eq!(config.safety.rate_limit_window, Duration::from_secs(60));
        assert!(config.safety.ignore_bots);
        assert_eq!(config.safety.ai_timeout, Duration::from_secs(30));
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.file, Some(PathBuf::from("nonno_bot.log")));
    }

    #[test]
    fn test_all_values() {
        let config = load(&[
            ("SIGNAL_ACCOUNT", "+15550000000"),
            ("BOT_NAME", "Nonno Pino"),
            ("BOT_PERSONALITY", "un pensionato di Bari"),
            ("TRIGGER_WORDS", " Nonno, Pino ,,"),
            ("CONTEXT_MESSAGES", "5"),
            ("RANDOM_RESPONSE_PROBABILITY", "0"),
            ("RESPONSE_DELAY_MIN", "0.5"),
            ("RESPONSE_DELAY_MAX", "0.5"),
            ("TYPING_WPM", "40"),
            ("TYPING_CORRECTION_PROBABILITY", "1"),
            ("RATE_LIMIT_MESSAGES", "3"),
            ("RATE_LIMIT_WINDOW", "30"),
            ("IGNORE_BOTS", "false"),
            ("LOG_LEVEL", "warning"),
            ("LOG_FILE", ""),
        ])
        .unwrap();

        assert_eq!(config.persona.account, "+15550000000");
        assert_eq!(config.persona.display_name, "Nonno Pino");
        assert_eq!(config.persona.personality, "un pensionato di Bari");
        assert_eq!(config.persona.trigger_words, vec!["nonno", "pino"]);
        assert_eq!(config.response.context_messages, 5);
        assert_eq!(config.response.random_response_probability, 0.0);
        assert_eq!(config.timing.response_delay_min, Duration::from_millis(500));
        assert_eq!(config.timing.typing_wpm, 40.0);
        assert_eq!(config.timing.correction_probability, 1.0);
        assert_eq!(config.safety.rate_limit_messages, 3);
        assert_eq!(config.safety.rate_limit_window, Duration::from_secs(30));
        assert!(!config.safety.ignore_bots);
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_rejects_zero_context() {
        assert!(matches!(
            load(&[("CONTEXT_MESSAGES", "0")]),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_delays() {
        assert!(matches!(
            load(&[("RESPONSE_DELAY_MIN", "5"), ("RESPONSE_DELAY_MAX", "2")]),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            load(&[("RESPONSE_DELAY_MIN", "-1")]),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rejects_seconds_too_large_for_a_duration() {
        for key in ["RESPONSE_DELAY_MAX", "TYPING_MAX_DELAY", "RATE_LIMIT_WINDOW", "AI_TIMEOUT"] {
            let err = load(&[(key, "1e20")]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: ref k, .. } if k == key),
                "{} should be rejected, got {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_rejects_bad_rate_limit() {
        assert!(load(&[("RATE_LIMIT_MESSAGES", "0")]).is_err());
        assert!(load(&[("RATE_LIMIT_WINDOW", "0")]).is_err());
        assert!(load(&[("RATE_LIMIT_MESSAGES", "ten")]).is_err());
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let err = load(&[("LOG_LEVEL", "VERBOSE")]).unwrap_err();
        assert!(err.to_string().contains("LOG_LEVEL"));
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        assert!(load(&[("RANDOM_RESPONSE_PROBABILITY", "1.5")]).is_err());
        assert!(load(&[("TYPING_CORRECTION_PROBABILITY", "-0.1")]).is_err());
    }

    #[test]
    fn test_validate_checks_values_set_in_code() {
        let mut config = BotConfig::default();
        config.timing.correction_probability = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = BotConfig::default();
        config.response.random_response_probability = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.response.weights.help_request = -0.1;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.response.weights.follow_up = f64::INFINITY;
        assert!(config.validate().is_err());

        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_wpm() {
        assert!(load(&[("TYPING_WPM", "0")]).is_err());
    }

    #[test]
    fn test_log_level_round_trip_names() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::Warning.as_filter(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }
}
