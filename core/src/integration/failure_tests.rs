//! Stage failure tests: every fatal error ends the session in `Failed`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::test_utils::*;
use crate::archive::ResolutionError;
use crate::bootstrap::{Bootstrap, PipelineError, SessionFailure, SessionState};
use crate::config::{ConfigError, LaunchConfig, PropsSource, TomlSettingsStore, UserSettings};
use crate::engine::EngineError;
use crate::fetch::FetchError;
use crate::registry::BridgeRegistry;
use crate::test_utils::{TestEngine, launch_config, serve, zip_archive};

const GENERIC_EN: &str = "An error occurred while retrieving the game.";

type TestBootstrap = Bootstrap<TestEngine, HashMap<String, Vec<u8>>>;

fn failed_start(bootstrap: TestBootstrap, config: LaunchConfig) -> SessionFailure {
    match pollster::block_on(bootstrap.start(&PropsSource(config))) {
        Ok(_) => panic!("session unexpectedly reached ready"),
        Err(failure) => failure,
    }
}

#[test]
fn missing_rom_fails_before_any_io() {
    let (log, recorder) = transition_recorder();
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", vec![1]))
        .on_transition(recorder);

    let failure = failed_start(bootstrap, LaunchConfig::new().with("type", "gba"));

    assert_eq!(failure.stage, SessionState::ConfigValidating);
    assert!(matches!(
        failure.error,
        PipelineError::Config(ConfigError::MissingRom)
    ));
    assert_eq!(failure.message, "A ROM file was not specified.");
    assert_eq!(
        *log.borrow(),
        vec![
            (SessionState::Idle, SessionState::ConfigValidating),
            (SessionState::ConfigValidating, SessionState::Failed),
        ]
    );
}

#[test]
fn config_errors_report_detail_without_debug() {
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", vec![1]));
    let failure = failed_start(bootstrap, launch_config("game.zip", "snes"));
    assert_eq!(failure.message, "unknown console type 'snes'");
}

#[test]
fn debug_mode_reports_error_detail() {
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("other.zip", vec![1]));
    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.message, GENERIC_EN);

    let bootstrap = Bootstrap::new(TestEngine::new(), serve("other.zip", vec![1])).debug(true);
    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.message, "ROM not found: game.zip");
}

#[test]
fn missing_and_unknown_console_types_are_fatal() {
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", vec![1]));
    let failure = failed_start(bootstrap, LaunchConfig::new().with("rom", "game.zip"));
    assert!(matches!(
        failure.error,
        PipelineError::Config(ConfigError::MissingConsoleType)
    ));

    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", vec![1]));
    let failure = failed_start(bootstrap, launch_config("game.zip", "snes"));
    assert_eq!(failure.stage, SessionState::ConfigValidating);
    assert!(matches!(
        failure.error,
        PipelineError::Config(ConfigError::UnknownConsoleType(_))
    ));
}

#[test]
fn engine_load_failure() {
    let mut engine = TestEngine::new();
    engine.fail_load = true;
    let bootstrap = Bootstrap::new(engine, serve("game.zip", vec![1]));

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::EngineLoading);
    assert!(matches!(failure.error, PipelineError::Engine(EngineError::Load(_))));
}

#[test]
fn unreadable_settings_fail_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", vec![1]))
        .settings(TomlSettingsStore::new(dir.path().to_path_buf()));

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::SettingsLoading);
    assert!(matches!(failure.error, PipelineError::Settings(_)));
}

#[test]
fn engine_rejecting_settings_fails_at_settings_stage() {
    let mut engine = TestEngine::new();
    engine.fail_configure = true;
    let bootstrap = Bootstrap::new(engine, serve("game.zip", vec![1]));

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::SettingsLoading);
    assert!(matches!(
        failure.error,
        PipelineError::Engine(EngineError::Configure(_))
    ));
}

#[test]
fn fetch_failure_uses_settings_locale() {
    let mut settings = UserSettings::default();
    settings.locale = "es".into();
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("other.zip", vec![1])).settings(settings);

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::Fetching);
    assert!(matches!(failure.error, PipelineError::Fetch(FetchError::NotFound(_))));
    assert_eq!(failure.message, "Se produjo un error al recuperar el juego.");
}

#[test]
fn debug_setting_enables_error_detail() {
    let mut settings = UserSettings::default();
    settings.debug = true;
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("other.zip", vec![1])).settings(settings);

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.message, "ROM not found: game.zip");
}

#[test]
fn archive_without_rom_fails_resolution() {
    let payload = zip_archive(&[("readme.txt", b"a"), ("cover.png", b"b")]);
    let bootstrap = Bootstrap::new(TestEngine::new(), serve("game.zip", payload));

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::Resolving);
    assert!(matches!(
        failure.error,
        PipelineError::Resolution(ResolutionError::NoCandidate(_))
    ));
}

#[test]
fn rejected_submission_never_publishes_bridge() {
    let mut engine = TestEngine::new();
    engine.reject_rom = true;
    let registry = BridgeRegistry::new();
    let failed = Rc::new(RefCell::new(None));
    let failed_sink = Rc::clone(&failed);
    let payload = zip_archive(&[("game.gba", gba_rom("GAME").as_slice())]);

    let bootstrap = Bootstrap::new(engine, serve("game.zip", payload))
        .registry(registry.clone())
        .on_ready(|_| panic!("ready after a rejected submission"))
        .on_failed(move |failure| *failed_sink.borrow_mut() = Some(failure.stage));

    let failure = failed_start(bootstrap, launch_config("game.zip", "gba"));
    assert_eq!(failure.stage, SessionState::Submitting);
    assert!(matches!(
        failure.error,
        PipelineError::Engine(EngineError::Submission(_))
    ));
    assert_eq!(*failed.borrow(), Some(SessionState::Submitting));
    assert!(registry.lookup().is_none());
}
