//! End-to-end flow through the orchestrator with mock collaborators.
//!
//! All tests run on a paused tokio clock, so the humanized pauses are
//! skipped instantly while still being observable through timestamps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_core::{ChatEvent, ImageRef, MessageRef, ReplyRef};
use mock_brain::{
    DelayedBrain, EchoBrain, FailingBrain, FailureKind, IndicatorEvent, RecordingTransport,
    ScriptedBrain,
};
use orchestrator::{BotConfig, Orchestrator, Outcome, RateLimiter, SuppressReason};
use rand::rngs::mock::StepRng;

const GROUP: &str = "group-famiglia";
const PERSONA: &str = "+15550000000";

static NEXT_ID: AtomicU64 = AtomicU64::new(1_700_000_000_000);

fn config(overrides: &[(&str, &str)]) -> BotConfig {
    let mut vars: HashMap<String, String> = [
        ("SIGNAL_ACCOUNT", PERSONA),
        ("TRIGGER_WORDS", "nonno"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    BotConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// No thinking or typing time.
const INSTANT: &[(&str, &str)] = &[
    ("RESPONSE_DELAY_MIN", "0"),
    ("RESPONSE_DELAY_MAX", "0"),
    ("TYPING_MIN_DELAY", "0"),
    ("TYPING_MAX_DELAY", "0"),
];

fn message(text: &str) -> ChatEvent {
    let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
    ChatEvent::new(GROUP, "+15551112222", text, id)
        .with_sender_name("Giulia")
        .with_group_name("Famiglia")
}

fn photo() -> ImageRef {
    ImageRef {
        attachment_id: "photo-1".to_string(),
        content_type: "image/jpeg".to_string(),
    }
}

/// Always wins probability draws.
fn lucky() -> StepRng {
    StepRng::new(0, 0)
}

#[tokio::test(start_paused = true)]
async fn test_mention_bypasses_rate_limit_and_replies_once() {
    let brain = EchoBrain::with_prefix("Eh? ");
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(
        config(&[("CONTEXT_MESSAGES", "5")]),
        brain.clone(),
        transport.clone(),
    )
    .unwrap()
    .with_rng(lucky());

    let event = message("@nonno come funziona il wifi?");
    let outcome = orchestrator.handle_event(&event).await;

    assert_eq!(
        outcome,
        Outcome::Responded {
            text: "Eh? @nonno come funziona il wifi?".to_string()
        }
    );

    let now = tokio::time::Instant::now().into_std();
    assert_eq!(orchestrator.rate_limiter().remaining(GROUP, now), 10);

    let requests = brain.requests();
    assert_eq!(requests.len(), 1);
    let latest = requests[0].latest().unwrap();
    assert_eq!(latest.text, "@nonno come funziona il wifi?");
    assert_eq!(requests[0].group_name, "Famiglia");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].group_id, GROUP);
    assert_eq!(sent[0].reply_to, Some(event.message_ref()));
    assert!(orchestrator.context().len(GROUP) <= 5);
}

#[tokio::test(start_paused = true)]
async fn test_eleventh_random_candidate_is_rate_limited() {
    let brain = EchoBrain::new();
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(config(INSTANT), brain.clone(), transport.clone())
        .unwrap()
        .with_rng(lucky());

    for i in 0..10 {
        let outcome = orchestrator
            .handle_event(&message(&format!("andiamo al mare domenica {}", i)))
            .await;
        assert!(matches!(outcome, Outcome::Responded { .. }), "message {}", i);
    }

    let outcome = orchestrator
        .handle_event(&message("andiamo al mare domenica 10"))
        .await;

    assert_eq!(outcome, Outcome::RateLimited);
    assert_eq!(brain.call_count(), 10);
    assert_eq!(transport.sent().len(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_frees_up_after_window() {
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(
        config(&[
            ("RATE_LIMIT_MESSAGES", "1"),
            ("RESPONSE_DELAY_MIN", "0"),
            ("RESPONSE_DELAY_MAX", "0"),
            ("TYPING_MIN_DELAY", "0"),
            ("TYPING_MAX_DELAY", "0"),
        ]),
        EchoBrain::new(),
        transport.clone(),
    )
    .unwrap()
    .with_rng(lucky());

    assert!(matches!(
        orchestrator.handle_event(&message("bella giornata")).await,
        Outcome::Responded { .. }
    ));
    assert_eq!(
        orchestrator.handle_event(&message("davvero bella")).await,
        Outcome::RateLimited
    );

    // Unconditional triggers ignore the spent budget.
    assert!(matches!(
        orchestrator.handle_event(&message("nonno")).await,
        Outcome::Responded { .. }
    ));

    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(matches!(
        orchestrator.handle_event(&message("e adesso?")).await,
        Outcome::Responded { .. }
    ));
    assert_eq!(transport.sent().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_shared_rate_limiter_is_used() {
    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
    let orchestrator = Orchestrator::new(config(INSTANT), EchoBrain::new(), RecordingTransport::new())
        .unwrap()
        .with_rng(lucky())
        .with_rate_limiter(limiter.clone());

    orchestrator.handle_event(&message("buona notte")).await;

    assert_eq!(limiter.remaining(GROUP, tokio::time::Instant::now().into_std()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ai_error_suppresses_reply() {
    let brain = FailingBrain::new(FailureKind::Network);
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(config(&[]), brain.clone(), transport.clone())
        .unwrap()
        .with_rng(lucky());

    let outcome = orchestrator.handle_event(&message("nonno aiuto")).await;

    assert_eq!(outcome, Outcome::Suppressed(SuppressReason::AiFailed));
    assert_eq!(brain.call_count(), 1);
    assert!(transport.sent().is_empty());
    assert_eq!(
        transport.indicator_events().last(),
        Some(&IndicatorEvent::Stopped(GROUP.to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_blank_ai_reply_suppresses() {
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(config(&[]), ScriptedBrain::new("   "), transport.clone())
        .unwrap()
        .with_rng(lucky());

    assert_eq!(
        orchestrator.handle_event(&message("nonno?")).await,
        Outcome::Suppressed(SuppressReason::AiFailed)
    );
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_ai_timeout_suppresses_reply() {
    let brain = DelayedBrain::with_secs(EchoBrain::new(), 120);
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(config(&[("AI_TIMEOUT", "10")]), brain, transport.clone())
        .unwrap()
        .with_rng(lucky());

    let start = tokio::time::Instant::now();
    let outcome = orchestrator.handle_event(&message("nonno ci sei?")).await;

    assert_eq!(outcome, Outcome::Suppressed(SuppressReason::AiFailed));
    assert!(start.elapsed() < Duration::from_secs(120));
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_image_download_failure_still_replies() {
    let brain = ScriptedBrain::new("Che bella foto!");
    let transport = RecordingTransport::new();
    transport.fail_downloads(true);
    let orchestrator = Orchestrator::new(config(&[]), brain.clone(), transport.clone())
        .unwrap()
        .with_rng(lucky());

    let outcome = orchestrator
        .handle_event(&message("").with_image(photo()))
        .await;

    assert_eq!(
        outcome,
        Outcome::Responded {
            text: "Che bella foto!".to_string()
        }
    );
    assert_eq!(transport.downloads(), vec![photo()]);
    assert!(brain.requests()[0].image.is_none());
    assert!(brain.requests()[0].latest().unwrap().has_image);
}

#[tokio::test(start_paused = true)]
async fn test_downloaded_image_is_passed_to_brain() {
    let brain = ScriptedBrain::new("Che bel gatto");
    let transport = RecordingTransport::new().with_image_bytes(vec![0xFF, 0xD8, 0xFF]);
    let orchestrator = Orchestrator::new(config(&[]), brain.clone(), transport)
        .unwrap()
        .with_rng(lucky());

    orchestrator
        .handle_event(&message("guardate").with_image(photo()))
        .await;

    let image = brain.requests()[0].image.clone().unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF]);
}

#[tokio::test(start_paused = true)]
async fn test_bot_sender_is_ignored() {
    let brain = EchoBrain::new();
    let orchestrator = Orchestrator::new(config(&[]), brain.clone(), RecordingTransport::new())
        .unwrap()
        .with_rng(lucky());

    let outcome = orchestrator.handle_event(&message("nonno!").from_bot()).await;

    assert_eq!(outcome, Outcome::Suppressed(SuppressReason::BotSender));
    assert_eq!(brain.call_count(), 0);
    assert_eq!(orchestrator.context().len(GROUP), 0);
}

#[tokio::test(start_paused = true)]
async fn test_bot_sender_allowed_when_not_ignoring_bots() {
    let orchestrator = Orchestrator::new(
        config(&[("IGNORE_BOTS", "false")]),
        EchoBrain::new(),
        RecordingTransport::new(),
    )
    .unwrap()
    .with_rng(lucky());

    assert!(matches!(
        orchestrator.handle_event(&message("nonno!").from_bot()).await,
        Outcome::Responded { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_is_not_recorded() {
    let transport = RecordingTransport::new();
    transport.fail_sends(true);
    let orchestrator = Orchestrator::new(config(&[]), EchoBrain::new(), transport.clone())
        .unwrap()
        .with_rng(lucky());

    let outcome = orchestrator.handle_event(&message("nonno ciao")).await;

    assert_eq!(outcome, Outcome::Suppressed(SuppressReason::SendFailed));
    let context = orchestrator.context().snapshot(GROUP);
    assert_eq!(context.len(), 1);
    assert!(!context[0].from_self);
}

#[tokio::test(start_paused = true)]
async fn test_indicator_failures_are_skipped() {
    let transport = RecordingTransport::new();
    transport.fail_indicators(true);
    let orchestrator = Orchestrator::new(config(&[]), EchoBrain::new(), transport.clone())
        .unwrap()
        .with_rng(lucky());

    assert!(matches!(
        orchestrator.handle_event(&message("nonno ciao")).await,
        Outcome::Responded { .. }
    ));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_context_window_is_capped() {
    let brain = EchoBrain::new();
    let orchestrator = Orchestrator::new(
        config(&[("CONTEXT_MESSAGES", "3")]),
        brain.clone(),
        RecordingTransport::new(),
    )
    .unwrap()
    .with_rng(lucky());

    for i in 0..5 {
        orchestrator
            .handle_event(&message(&format!("nonno {}", i)))
            .await;
    }

    assert_eq!(orchestrator.context().len(GROUP), 3);
    for request in brain.requests() {
        assert!(request.context.len() <= 3);
    }
    let last = brain.requests().pop().unwrap();
    assert_eq!(last.latest().unwrap().text, "nonno 4");
}

#[tokio::test(start_paused = true)]
async fn test_reply_to_own_message_is_answered() {
    let orchestrator = Orchestrator::new(
        config(&[("RANDOM_RESPONSE_PROBABILITY", "0")]),
        EchoBrain::new(),
        RecordingTransport::new(),
    )
    .unwrap()
    // Would lose every probability draw.
    .with_rng(StepRng::new(u64::MAX, 0));

    let event = message("grazie mille").with_reply(ReplyRef {
        message: MessageRef::new(1, PERSONA),
        author_name: Some("Nonno".to_string()),
        text: Some("prego".to_string()),
        to_self: true,
    });

    assert!(matches!(
        orchestrator.handle_event(&event).await,
        Outcome::Responded { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_composing_indicator_is_refreshed_while_typing() {
    let reply = "Ah, il telefono nuovo! ".repeat(8);
    let transport = RecordingTransport::new();
    let orchestrator = Orchestrator::new(
        config(&[("COMPOSING_REFRESH_INTERVAL", "4")]),
        ScriptedBrain::new(reply.clone()),
        transport.clone(),
    )
    .unwrap()
    .with_rng(lucky());

    let start = tokio::time::Instant::now();
    orchestrator.handle_event(&message("nonno hai visto?")).await;

    let times = transport.composing_times();
    assert!(times.len() > 2, "indicator sent {} times", times.len());
    assert_eq!(times[0], start);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] <= Duration::from_secs(4));
    }

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, reply.trim());
    assert!(sent[0].at - *times.last().unwrap() <= Duration::from_secs(4));
    // Thinking (1s) plus typing (at least 2s).
    assert!(sent[0].at - start >= Duration::from_secs(3));
}
