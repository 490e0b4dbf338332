//! Lifecycle guarantees of the session controller, exercised end to end
//! against the simulated platform with a paused tokio clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use voicefeed_core::types::{SessionConfig, SessionState};
use voicefeed_session::{EngineCall, SessionController, SessionHandlers, SimulatedPlatform};

// =============================================================================
// Helpers
// =============================================================================

/// Collects callback invocations in order.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn handlers(&self) -> SessionHandlers {
        let (a, b, c, d) = (self.0.clone(), self.0.clone(), self.0.clone(), self.0.clone());
        SessionHandlers::new()
            .on_transcript(move |t| a.lock().unwrap().push(format!("transcript:{t}")))
            .on_start(move || b.lock().unwrap().push("start".to_string()))
            .on_end(move || c.lock().unwrap().push("end".to_string()))
            .on_error(move |e| d.lock().unwrap().push(format!("error:{e}")))
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.as_str() == name).count()
    }
}

fn configure(
    platform: &SimulatedPlatform,
    config: SessionConfig,
    recorder: &Recorder,
) -> SessionController {
    SessionController::configure(Arc::new(platform.clone()), config, recorder.handlers())
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn repeated_start_while_listening_creates_nothing_new() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    c.start();
    probe.fire_start();
    c.process_pending();
    for _ in 0..5 {
        c.start();
    }
    c.process_pending();

    assert_eq!(c.state(), SessionState::Listening);
    assert_eq!(probe.engines_created(), 1);
    assert_eq!(probe.count(&EngineCall::Start), 1);
    assert_eq!(recorder.count("start"), 1);
}

#[tokio::test(start_paused = true)]
async fn single_shot_auto_stops_within_delay() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let config = SessionConfig::default()
        .with_continuous(false)
        .with_auto_stop(true);
    let mut c = configure(&platform, config, &recorder);

    c.start();
    probe.fire_start();
    probe.fire_result("hello");
    c.process_pending();
    assert_eq!(probe.count(&EngineCall::Stop), 0);
    assert_eq!(c.state(), SessionState::Listening);

    let armed_at = Instant::now();
    assert!(c.next_event().await);
    let waited = armed_at.elapsed();
    assert!(waited >= Duration::from_millis(100));
    assert!(waited < Duration::from_millis(150));
    assert_eq!(probe.count(&EngineCall::Stop), 1);
    assert_eq!(c.state(), SessionState::Stopping);
    assert!(c.snapshot().is_listening);

    probe.fire_end();
    assert!(c.next_event().await);

    assert_eq!(
        recorder.events(),
        vec!["start", "transcript:hello", "end"]
    );
    let snapshot = c.snapshot();
    assert!(!snapshot.is_listening);
    assert_eq!(snapshot.transcript, "hello");
    assert_eq!(snapshot.state, SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn auto_stop_waits_for_configured_delay() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let config = SessionConfig::default().with_auto_stop_delay(Duration::from_millis(250));
    let mut c = configure(&platform, config, &recorder);

    c.start();
    probe.fire_start();
    probe.fire_result("later");
    c.process_pending();

    tokio::time::advance(Duration::from_millis(249)).await;
    c.process_pending();
    assert_eq!(probe.count(&EngineCall::Stop), 0);

    tokio::time::advance(Duration::from_millis(1)).await;
    c.process_pending();
    assert_eq!(probe.count(&EngineCall::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn steady_results_still_auto_stop_on_time() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    probe.fire_start();
    for i in 0..3 {
        probe.fire_result(&format!("phrase {i}"));
        c.process_pending();
        tokio::time::advance(Duration::from_millis(30)).await;
        c.process_pending();
    }
    assert_eq!(probe.count(&EngineCall::Stop), 0);

    // 100ms after the first result.
    tokio::time::advance(Duration::from_millis(10)).await;
    c.process_pending();
    assert_eq!(probe.count(&EngineCall::Stop), 1);
    assert_eq!(c.state(), SessionState::Stopping);
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_never_auto_stops() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let config = SessionConfig::default()
        .with_continuous(true)
        .with_auto_stop(true);
    let mut c = configure(&platform, config, &recorder);

    c.start();
    probe.fire_start();
    for i in 0..4 {
        probe.fire_result(&format!("phrase {i}"));
        c.process_pending();
        tokio::time::advance(Duration::from_millis(500)).await;
        c.process_pending();
    }

    assert_eq!(probe.count(&EngineCall::Stop), 0);
    assert_eq!(c.state(), SessionState::Listening);
    assert_eq!(
        recorder.events(),
        vec![
            "start",
            "transcript:phrase 0",
            "transcript:phrase 1",
            "transcript:phrase 2",
            "transcript:phrase 3",
        ]
    );
}

#[test]
fn stop_while_idle_is_idempotent() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);
    let calls_before = probe.calls();
    let mut rx = c.subscribe();

    for _ in 0..3 {
        c.stop();
    }

    assert_eq!(probe.calls(), calls_before);
    assert_eq!(c.state(), SessionState::Idle);
    assert!(!rx.has_changed().unwrap());
    assert!(recorder.events().is_empty());
}

#[test]
fn stop_while_starting_is_ignored() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    c.stop();
    assert_eq!(c.state(), SessionState::Starting);
    assert_eq!(probe.count(&EngineCall::Stop), 0);
}

#[tokio::test(start_paused = true)]
async fn dispose_with_pending_result_and_timer_stays_silent() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    probe.fire_start();
    probe.fire_result("armed");
    c.process_pending();
    let sink = probe.sink().unwrap();
    probe.fire_result("queued");
    let before = recorder.events();

    c.dispose();
    sink.emit(voicefeed_session::EngineEvent::Ended);
    tokio::time::advance(Duration::from_millis(500)).await;

    assert_eq!(c.process_pending(), 0);
    assert!(!c.next_event().await);
    assert_eq!(recorder.events(), before);
    assert_eq!(probe.count(&EngineCall::Stop), 0);
    assert_eq!(probe.live_engines(), 0);
    assert_eq!(c.state(), SessionState::Disposed);
}

#[test]
fn unsupported_platform_reports_once_without_engine() {
    let platform = SimulatedPlatform::unsupported();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    assert_eq!(
        recorder.events(),
        vec!["error:Your browser doesn't support Speech Recognition."]
    );
    assert_eq!(probe.engines_created(), 0);
    assert!(!c.has_engine());

    c.start();
    c.stop();
    let snapshot = c.snapshot();
    assert!(!snapshot.is_listening);
    assert_eq!(snapshot.transcript, "");
    assert_eq!(recorder.events().len(), 1);
    assert!(probe.alerts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn continuous_results_then_manual_stop() {
    let platform = SimulatedPlatform::new().with_auto_ack(true);
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(
        &platform,
        SessionConfig::default().with_continuous(true),
        &recorder,
    );

    c.start();
    assert!(c.next_event().await);
    assert_eq!(c.state(), SessionState::Listening);

    probe.fire_result("one");
    probe.fire_result("two");
    c.process_pending();
    c.stop();
    assert!(c.next_event().await);

    assert_eq!(
        recorder.events(),
        vec!["start", "transcript:one", "transcript:two", "end"]
    );
    assert_eq!(c.snapshot().transcript, "two");
    assert_eq!(probe.count(&EngineCall::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn auto_stop_timer_does_not_leak_into_next_session() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    probe.fire_start();
    probe.fire_result("first");
    probe.fire_end();
    c.process_pending();

    c.start();
    probe.fire_start();
    c.process_pending();
    tokio::time::advance(Duration::from_millis(300)).await;
    c.process_pending();

    assert_eq!(c.state(), SessionState::Listening);
    assert_eq!(probe.count(&EngineCall::Stop), 0);
}

#[tokio::test(start_paused = true)]
async fn reconfigure_cancels_pending_auto_stop() {
    let platform = SimulatedPlatform::new();
    let probe = platform.probe();
    let recorder = Recorder::default();
    let mut c = configure(&platform, SessionConfig::default(), &recorder);

    c.start();
    probe.fire_start();
    probe.fire_result("pending");
    c.process_pending();

    c.reconfigure(SessionConfig::default(), recorder.handlers());
    tokio::time::advance(Duration::from_millis(300)).await;
    c.process_pending();

    assert_eq!(probe.count(&EngineCall::Stop), 0);
    assert_eq!(probe.count(&EngineCall::Abort), 1);
    assert_eq!(probe.live_engines(), 1);
    assert_eq!(c.snapshot().transcript, "pending");
}
