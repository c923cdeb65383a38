//! Tests for the build-time resolution policy engine.
//!
//! These cover the mapping tiers, classification-driven synthesis, the
//! graceful/strict failure semantics, and decision idempotence.

extern crate webshim;

use webshim::resolver::classify::Confidence;
use webshim::resolver::config::ShimConfig;
use webshim::resolver::policy::{
    Decision, DelegateResolver, ResolutionEngine, ResolveError, ResolvedModule,
};
use webshim::resolver::registry::MappingTier;
use webshim::runtime::proxy::Interceptor;

/// Delegate that records every identifier it is asked for and can be told
/// to fail on one of them.
struct RecordingResolver {
    requests: Vec<String>,
    fail_on: Option<String>,
}

impl RecordingResolver {
    fn new() -> Self {
        RecordingResolver {
            requests: Vec::new(),
            fail_on: None,
        }
    }

    fn failing_on(identifier: &str) -> Self {
        RecordingResolver {
            requests: Vec::new(),
            fail_on: Some(identifier.to_string()),
        }
    }
}

impl DelegateResolver for RecordingResolver {
    fn resolve(
        &mut self,
        identifier: &str,
        _platform: &str,
    ) -> Result<ResolvedModule, ResolveError> {
        self.requests.push(identifier.to_string());
        if self.fail_on.as_deref() == Some(identifier) {
            return Err(ResolveError::Delegate(format!(
                "cannot resolve {}",
                identifier
            )));
        }
        Ok(ResolvedModule::bare(identifier))
    }
}

#[test]
fn test_user_mapping_on_web_and_native() {
    let engine = ResolutionEngine::new(ShimConfig::new().with_user_mapping("pkg-a", "sub-a"));
    let mut delegate = RecordingResolver::new();

    let resolved = engine.resolve("pkg-a", "web", &mut delegate).unwrap();
    assert_eq!(resolved.identifier, "sub-a");

    let resolved = engine.resolve("pkg-a", "ios", &mut delegate).unwrap();
    assert_eq!(resolved.identifier, "pkg-a");

    assert_eq!(delegate.requests, vec!["sub-a", "pkg-a"]);
}

#[test]
fn test_built_in_mapping() {
    let engine = ResolutionEngine::new(ShimConfig::new());
    let mut delegate = RecordingResolver::new();
    let resolved = engine.resolve("react-native", "web", &mut delegate).unwrap();
    assert_eq!(resolved.identifier, "react-native-web");

    match engine.decide("react-native", "web") {
        Decision::Mapped { tier, .. } => assert_eq!(tier, MappingTier::BuiltIn),
        other => panic!("expected mapped decision, got {:?}", other),
    }
}

#[test]
fn test_tier_precedence() {
    let config = ShimConfig::new()
        .with_user_mapping("react-native-svg", "./user-svg")
        .with_override("react-native-svg", "./override-svg");
    let engine = ResolutionEngine::new(config);
    match engine.decide("react-native-svg", "web") {
        Decision::Mapped { tier, substitute } => {
            assert_eq!(tier, MappingTier::Override);
            assert_eq!(substitute, "./override-svg");
        }
        other => panic!("expected mapped decision, got {:?}", other),
    }
}

#[test]
fn test_unmapped_mobile_module_is_synthesized() {
    let engine = ResolutionEngine::new(ShimConfig::new());
    let mut delegate = RecordingResolver::new();

    // Matches the mobile namespace and a hardware keyword; no mapping, no
    // package metadata available.
    let resolved = engine
        .resolve("react-native-unknown-sensor", "web", &mut delegate)
        .unwrap();
    assert_ne!(resolved.identifier, "react-native-unknown-sensor");
    assert!(resolved.identifier.contains("mocks"));

    // The synthesized substitute is loadable and calling any exported
    // function on it returns without failing.
    let module = engine.synthesizer().synthesize("react-native-unknown-sensor");
    let interceptor = Interceptor::new(&ShimConfig::new().force_web());
    let proxy = interceptor.intercept("react-native-unknown-sensor", module);
    assert!(proxy.get("readSensor").call(vec![]).is_ok());
}

#[test]
fn test_low_confidence_respects_threshold() {
    // No hardware keyword: the namespace prefix alone gives Low confidence,
    // below the default Medium threshold.
    let engine = ResolutionEngine::new(ShimConfig::new());
    assert_eq!(
        engine.decide("react-native-unknown-widget", "web"),
        Decision::PassThrough
    );

    let relaxed = ResolutionEngine::new(
        ShimConfig::new().with_confidence_threshold(Confidence::Low),
    );
    match relaxed.decide("react-native-unknown-widget", "web") {
        Decision::Synthesized { .. } => {}
        other => panic!("expected synthesis, got {:?}", other),
    }
}

#[test]
fn test_mocks_disabled_graceful_falls_through() {
    let engine = ResolutionEngine::new(ShimConfig::new().mocks_disabled());
    let mut delegate = RecordingResolver::new();
    let resolved = engine
        .resolve("react-native-unknown-sensor", "web", &mut delegate)
        .unwrap();
    assert_eq!(resolved.identifier, "react-native-unknown-sensor");
}

#[test]
fn test_mocks_disabled_strict_errors() {
    let engine = ResolutionEngine::new(ShimConfig::new().mocks_disabled().strict());
    let mut delegate = RecordingResolver::new();
    match engine.resolve("react-native-unknown-sensor", "web", &mut delegate) {
        Err(ResolveError::SynthesisDisabled(id)) => {
            assert_eq!(id, "react-native-unknown-sensor")
        }
        other => panic!("expected SynthesisDisabled, got {:?}", other),
    }
    // The delegate was never consulted.
    assert!(delegate.requests.is_empty());
}

#[test]
fn test_excluded_identifier_passes_through() {
    let config = ShimConfig::new().exclude_identifier("react-native-svg*");
    let engine = ResolutionEngine::new(config);
    let mut delegate = RecordingResolver::new();
    let resolved = engine
        .resolve("react-native-svg", "web", &mut delegate)
        .unwrap();
    // Excluded wins over the built-in mapping for the same identifier.
    assert_eq!(resolved.identifier, "react-native-svg");
}

#[test]
fn test_force_include_synthesizes_ordinary_identifier() {
    let config = ShimConfig::new().force_include_identifier("some-pure-js-lib");
    let engine = ResolutionEngine::new(config);
    match engine.decide("some-pure-js-lib", "web") {
        Decision::Synthesized { substitute } => assert!(substitute.contains("some-pure-js-lib")),
        other => panic!("expected synthesis, got {:?}", other),
    }
}

#[test]
fn test_delegate_failure_recovers_gracefully() {
    let engine = ResolutionEngine::new(ShimConfig::new());
    let mut delegate = RecordingResolver::failing_on("react-native-web");
    let resolved = engine.resolve("react-native", "web", &mut delegate).unwrap();
    assert_eq!(resolved.identifier, "react-native");
    assert_eq!(delegate.requests, vec!["react-native-web", "react-native"]);
}

#[test]
fn test_delegate_failure_propagates_in_strict_mode() {
    let engine = ResolutionEngine::new(ShimConfig::new().strict());
    let mut delegate = RecordingResolver::failing_on("react-native-web");
    match engine.resolve("react-native", "web", &mut delegate) {
        Err(ResolveError::Delegate(_)) => {}
        other => panic!("expected delegate error, got {:?}", other),
    }
    assert_eq!(delegate.requests, vec!["react-native-web"]);
}

#[test]
fn test_resolution_is_idempotent() {
    let engine = ResolutionEngine::new(ShimConfig::new());
    let first = engine.decide("react-native-camera", "web");
    let second = engine.decide("react-native-camera", "web");
    assert_eq!(first, second);

    let mut delegate = RecordingResolver::new();
    let a = engine
        .resolve("react-native-camera", "web", &mut delegate)
        .unwrap();
    let b = engine
        .resolve("react-native-camera", "web", &mut delegate)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_decision_cache_cleared_on_reset() {
    let engine = ResolutionEngine::new(ShimConfig::new());
    let before = engine.decide("react-native", "web");
    engine.clear_caches();
    let after = engine.decide("react-native", "web");
    assert_eq!(before, after);
}

#[test]
fn test_mock_written_to_disk_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = ShimConfig::new().with_mock_dir(dir.path());
    let engine = ResolutionEngine::new(config);

    // The delegate does not know the synthetic identifier; the written stub
    // is authoritative.
    let mut delegate = RecordingResolver::failing_on("webshim/mocks/react-native-camera");
    let resolved = engine
        .resolve("react-native-camera", "web", &mut delegate)
        .unwrap();
    let path = resolved.file_path.expect("stub path");
    let source = std::fs::read_to_string(&path).unwrap();
    assert!(source.contains("react-native-camera"));
    assert!(source.contains("RNCamera"));

    // Regeneration is deterministic.
    engine.clear_caches();
    let again = engine
        .resolve("react-native-camera", "web", &mut delegate)
        .unwrap();
    let source_again = std::fs::read_to_string(again.file_path.unwrap()).unwrap();
    assert_eq!(source, source_again);
}
