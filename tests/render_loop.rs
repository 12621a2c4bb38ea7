//! Render/dispatch loop tests
//!
//! The loop must terminate on quit and frame exhaustion, survive detector
//! failures, pick the annotation style from the current focus, and keep
//! rendering while a voice capture is in flight.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{
    AudioScript, FakeAudio, FakeDetector, FakeTranscriber, ScriptedFrames, ScriptedSurface,
    detection, test_catalog,
};
use spotter::video::{Command, FOCUS_COLOR, OTHER_COLOR};
use spotter::{App, AudioSource, Transcriber};

fn app(audio: FakeAudio, transcriber: FakeTranscriber) -> App {
    let audio: Arc<dyn AudioSource> = Arc::new(audio);
    let transcriber: Arc<dyn Transcriber> = Arc::new(transcriber);
    App::new(
        "dog",
        Arc::new(test_catalog()),
        audio,
        transcriber,
        spotter::VoiceSettings::default(),
    )
}

fn idle_app() -> App {
    app(FakeAudio::new(vec![]), FakeTranscriber::new(vec![]))
}

#[tokio::test]
async fn loop_terminates_on_frame_exhaustion() {
    let app = idle_app();
    let detector = FakeDetector::new(vec!["dog"], vec![]);
    let mut frames = ScriptedFrames::new(3);
    let mut surface = ScriptedSurface::passive();

    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    assert_eq!(surface.presented.len(), 3);
}

#[tokio::test]
async fn loop_terminates_on_quit_command() {
    let app = idle_app();
    let detector = FakeDetector::new(vec!["dog"], vec![]);
    let mut frames = ScriptedFrames::new(100);
    let mut surface = ScriptedSurface::new(vec![None, Some(Command::Quit)]);

    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    // Quit lands after the second present
    assert_eq!(surface.presented.len(), 2);
}

#[tokio::test]
async fn detector_failure_skips_annotation_but_keeps_looping() {
    let app = idle_app();
    let detector = FakeDetector::failing();
    let mut frames = ScriptedFrames::new(2);
    let mut surface = ScriptedSurface::passive();

    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    assert_eq!(surface.presented.len(), 2);
    // Nothing was drawn on the frames
    for frame in &surface.presented {
        assert!(frame.pixels().iter().all(|&p| p == 0));
    }
}

#[tokio::test]
async fn annotation_style_follows_current_focus() {
    let app = idle_app(); // focus = "dog"
    let detector = FakeDetector::new(
        vec!["dog", "person"],
        vec![
            detection("dog", 5.0, 20.0, 25.0, 40.0),
            detection("person", 35.0, 20.0, 55.0, 40.0),
        ],
    );
    let mut frames = ScriptedFrames::new(1);
    let mut surface = ScriptedSurface::passive();

    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    let frame = &surface.presented[0];
    assert_eq!(frame.get(5, 20), Some(FOCUS_COLOR));
    assert_eq!(frame.get(35, 20), Some(OTHER_COLOR));
}

#[tokio::test]
async fn rendering_continues_while_capture_is_in_flight() {
    // Capture takes far longer than the whole loop run
    let app = app(
        FakeAudio::new(vec![AudioScript::SlowClip(Duration::from_secs(10))]),
        FakeTranscriber::hearing("car"),
    );
    let detector = FakeDetector::new(vec!["dog"], vec![]);
    let mut frames = ScriptedFrames::new(20);

    let mut commands = vec![Some(Command::ChangeFocus)];
    commands.resize(20, None);
    let mut surface = ScriptedSurface::new(commands);

    let started = Instant::now();
    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    // All frames rendered without waiting on the 10s capture
    assert_eq!(surface.presented.len(), 20);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(app.focus().update_in_flight());
    assert_eq!(app.focus().current_focus(), "dog");
}

#[tokio::test]
async fn double_change_focus_commands_spawn_exactly_one_task() {
    let audio = Arc::new(FakeAudio::new(vec![AudioScript::SlowClip(
        Duration::from_secs(10),
    )]));
    let transcriber: Arc<dyn Transcriber> = Arc::new(FakeTranscriber::hearing("car"));
    let app = App::new(
        "dog",
        Arc::new(test_catalog()),
        Arc::clone(&audio) as Arc<dyn AudioSource>,
        transcriber,
        spotter::VoiceSettings::default(),
    );

    let detector = FakeDetector::new(vec!["dog"], vec![]);
    let mut frames = ScriptedFrames::new(5);
    let mut surface = ScriptedSurface::new(vec![
        Some(Command::ChangeFocus),
        Some(Command::ChangeFocus),
        None,
        None,
        Some(Command::Quit),
    ]);

    app.run(&mut frames, &detector, &mut surface).await.unwrap();

    // Let the spawned task start its capture before counting
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(audio.captures_started(), 1);
}
