//! Per-message conversation state machine.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_core::{
    Brain, ChatEvent, ChatTransport, CompletionRequest, ContextEntry, ImagePayload,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::context::ContextStore;
use crate::error::ConfigError;
use crate::policy::{ResponsePolicy, Trigger};
use crate::rate_limit::RateLimiter;
use crate::timing::TimingModel;

/// Why a message got no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Sender is a known automated account.
    BotSender,
    /// No text and no image.
    EmptyMessage,
    /// Nothing in the message invites a reply.
    NoTrigger,
    /// The probability draw said no.
    NotSelected,
    /// The AI backend failed, timed out or returned nothing.
    AiFailed,
    /// The reply could not be delivered.
    SendFailed,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Suppressed(SuppressReason),
    /// Would have replied, but the group's reply budget is spent.
    RateLimited,
    Responded { text: String },
}

type SharedRng = Mutex<Box<dyn RngCore + Send>>;

/// Drives one inbound message from intake to (maybe) a posted reply.
///
/// The orchestrator:
/// - Drops messages from bots and empty messages
/// - Records every other message in the group's context window
/// - Asks the [`ResponsePolicy`] whether to answer
/// - Applies the [`RateLimiter`] to answers that are not exempt
/// - Shows the composing indicator while it "thinks" and "types"
/// - Sends the AI reply as a quote of the triggering message
pub struct Orchestrator<B: Brain, T: ChatTransport> {
    config: BotConfig,
    brain: B,
    transport: T,
    policy: ResponsePolicy,
    timing: TimingModel,
    limiter: Arc<RateLimiter>,
    context: ContextStore,
    rng: SharedRng,
}

impl<B: Brain, T: ChatTransport> Orchestrator<B, T> {
    /// Create an orchestrator with an entropy-seeded random source and its
    /// own rate limiter.
    pub fn new(config: BotConfig, brain: B, transport: T) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = ResponsePolicy::new(&config)?;

        Ok(Self {
            policy,
            timing: TimingModel::new(config.timing.clone()),
            limiter: Arc::new(RateLimiter::from_config(&config.safety)),
            context: ContextStore::new(config.response.context_messages),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            config,
            brain,
            transport,
        })
    }

    /// Replace the random source.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    /// Share an existing rate limiter.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn brain(&self) -> &B {
        &self.brain
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// Handle one inbound message.
    ///
    /// Collaborator failures never escape: they are logged and turned into
    /// an [`Outcome`].
    pub async fn handle_event(&self, event: &ChatEvent) -> Outcome {
        let group_id = event.group_id.as_str();

        if self.config.safety.ignore_bots && event.sender_is_bot {
            debug!("Ignoring message from bot account {}", event.sender_id);
            return Outcome::Suppressed(SuppressReason::BotSender);
        }
        if event.is_blank() {
            debug!("Ignoring empty message from {}", event.sender_id);
            return Outcome::Suppressed(SuppressReason::EmptyMessage);
        }

        let recent = self.context.snapshot(group_id);
        let trigger = self.policy.classify(event, &recent);
        self.context.record(group_id, ContextEntry::from_event(event));

        debug!(
            "Message {} from {} classified as {} (p={:.2})",
            event.message_id,
            event.sender_name,
            trigger.label(),
            trigger.probability()
        );

        if trigger == Trigger::NoTrigger {
            return Outcome::Suppressed(SuppressReason::NoTrigger);
        }

        let selected = {
            let mut rng = self.rng();
            trigger.should_respond(&mut **rng)
        };
        if !selected {
            return Outcome::Suppressed(SuppressReason::NotSelected);
        }

        if !trigger.bypasses_rate_limit() {
            let now = Instant::now().into_std();
            if !self.limiter.try_acquire(group_id, now) {
                info!(
                    "Rate limit reached in group {} ({} per {:?}), skipping reply",
                    group_id,
                    self.limiter.max_messages(),
                    self.limiter.window()
                );
                return Outcome::RateLimited;
            }
            debug!(
                "Rate limit: {} replies left in group {}",
                self.limiter.remaining(group_id, now),
                group_id
            );
        }

        self.respond(event, trigger).await
    }

    async fn respond(&self, event: &ChatEvent, trigger: Trigger) -> Outcome {
        let group_id = event.group_id.as_str();
        info!(
            "Replying to {} in group {} (trigger: {})",
            event.sender_name,
            group_id,
            trigger.label()
        );

        self.start_composing(group_id).await;
        let reply = match self.keep_composing(group_id, self.compose_reply(event)).await {
            Ok(reply) => reply,
            Err(reason) => return self.abandon(group_id, reason).await,
        };

        let quote = event.message_ref();
        if let Err(e) = self
            .transport
            .send_message(group_id, &reply, Some(&quote))
            .await
        {
            error!("Failed to send reply to group {}: {}", group_id, e);
            return self.abandon(group_id, SuppressReason::SendFailed).await;
        }

        let persona = &self.config.persona;
        self.context.record(
            group_id,
            ContextEntry::own(&persona.account, &persona.display_name, &reply, Utc::now()),
        );
        info!("Sent reply to group {} ({} chars)", group_id, reply.chars().count());

        Outcome::Responded { text: reply }
    }

    /// Think, ask the brain, then "type" the answer.
    async fn compose_reply(&self, event: &ChatEvent) -> Result<String, SuppressReason> {
        let group_id = event.group_id.as_str();

        let thinking = {
            let mut rng = self.rng();
            self.timing.thinking_delay(&mut **rng)
        };
        debug!("Thinking for {:?}", thinking);
        sleep(thinking).await;

        let image = self.fetch_image(event).await;
        let request = CompletionRequest {
            persona: self.config.persona.personality.clone(),
            group_name: event
                .group_name
                .clone()
                .unwrap_or_else(|| group_id.to_string()),
            context: self.context.snapshot(group_id),
            image,
        };

        let ai_timeout = self.config.safety.ai_timeout;
        let reply = match timeout(ai_timeout, self.brain.complete(request)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                warn!("{} returned an empty reply", self.brain.name());
                return Err(SuppressReason::AiFailed);
            }
            Ok(Err(e)) => {
                error!("AI completion failed: {}", e);
                return Err(SuppressReason::AiFailed);
            }
            Err(_) => {
                error!("AI completion timed out after {:?}", ai_timeout);
                return Err(SuppressReason::AiFailed);
            }
        };

        let typing = {
            let mut rng = self.rng();
            self.timing.typing_delay(&reply, &mut **rng)
        };
        debug!("Typing {} chars for {:?}", reply.chars().count(), typing);
        sleep(typing).await;

        Ok(reply)
    }

    /// Download the event's image, or `None` if there is none or it fails.
    async fn fetch_image(&self, event: &ChatEvent) -> Option<ImagePayload> {
        let image = event.image.as_ref()?;
        match self.transport.download_image(&event.group_id, image).await {
            Ok(data) if !data.is_empty() => {
                debug!("Downloaded image {} ({} bytes)", image.attachment_id, data.len());
                Some(ImagePayload::new(image.content_type.clone(), data))
            }
            Ok(_) => {
                warn!("Image {} is empty, replying without it", image.attachment_id);
                None
            }
            Err(e) => {
                warn!(
                    "Failed to download image {}, replying without it: {}",
                    image.attachment_id, e
                );
                None
            }
        }
    }

    /// Run `work`, re-sending the composing indicator every refresh interval.
    async fn keep_composing<F: Future>(&self, group_id: &str, work: F) -> F::Output {
        let refresh = self.timing.composing_refresh();
        tokio::pin!(work);
        loop {
            tokio::select! {
                biased;
                output = &mut work => return output,
                _ = sleep(refresh) => self.start_composing(group_id).await,
            }
        }
    }

    async fn start_composing(&self, group_id: &str) {
        if let Err(e) = self.transport.send_composing_indicator(group_id).await {
            warn!("Failed to send composing indicator: {}", e);
        }
    }

    async fn abandon(&self, group_id: &str, reason: SuppressReason) -> Outcome {
        if let Err(e) = self.transport.stop_composing_indicator(group_id).await {
            warn!("Failed to stop composing indicator: {}", e);
        }
        Outcome::Suppressed(reason)
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RngCore + Send>> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_brain::{EchoBrain, RecordingTransport};
    use rand::rngs::mock::StepRng;

    fn quiet_config() -> BotConfig {
        let mut config = BotConfig::default();
        config.persona.trigger_words = vec!["nonno".to_string()];
        config
    }

    fn orchestrator() -> Orchestrator<EchoBrain, RecordingTransport> {
        Orchestrator::new(quiet_config(), EchoBrain::new(), RecordingTransport::new())
            .unwrap()
            .with_rng(StepRng::new(0, 0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_message_is_not_recorded() {
        let orchestrator = orchestrator();
        let event = ChatEvent::new("g", "+1555", "  ", 1);

        assert_eq!(
            orchestrator.handle_event(&event).await,
            Outcome::Suppressed(SuppressReason::EmptyMessage)
        );
        assert_eq!(orchestrator.context().len("g"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mention_is_answered_with_quote() {
        let orchestrator = orchestrator();
        let event = ChatEvent::new("g", "+1555", "nonno ci sei", 7);

        let outcome = orchestrator.handle_event(&event).await;

        assert_eq!(
            outcome,
            Outcome::Responded {
                text: "nonno ci sei".to_string()
            }
        );
        let sent = orchestrator.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_to, Some(event.message_ref()));
        // inbound message plus own reply
        assert_eq!(orchestrator.context().len("g"), 2);
        assert!(orchestrator.context().snapshot("g")[1].from_self);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_selected_skips_everything() {
        let orchestrator = orchestrator().with_rng(StepRng::new(u64::MAX, 0));
        let event = ChatEvent::new("g", "+1555", "andiamo al mare domenica", 1);

        assert_eq!(
            orchestrator.handle_event(&event).await,
            Outcome::Suppressed(SuppressReason::NotSelected)
        );
        assert_eq!(orchestrator.brain().call_count(), 0);
        assert_eq!(orchestrator.rate_limiter().remaining("g", Instant::now().into_std()), 10);
        assert_eq!(orchestrator.context().len("g"), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = BotConfig::default();
        config.response.context_messages = 0;

        assert!(Orchestrator::new(config, EchoBrain::new(), RecordingTransport::new()).is_err());

        let mut config = BotConfig::default();
        config.timing.correction_probability = 1.5;
        assert!(Orchestrator::new(config, EchoBrain::new(), RecordingTransport::new()).is_err());
    }
}
