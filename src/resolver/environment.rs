//! Execution-environment detection.
//!
//! The runtime interceptor skips wrapping entirely on a native target, and
//! the build-time resolver refuses to substitute for non-web platforms, so
//! both layers share this detector. Detection runs a cascade of probes, the
//! first decisive probe wins, and the result is memoized until `reset()`.

use std::cell::RefCell;
use std::env;

use serde::Deserialize;

use crate::resolver::config::ShimConfig;

/// Environment variable consulted by the probe cascade.
pub const PLATFORM_ENV_VAR: &str = "WEBSHIM_PLATFORM";

/// The current execution target, coarsely classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Browser-like: DOM and web APIs are expected to exist.
    Web,
    /// Native-like: the mobile runtime is in charge, the shim stays out of
    /// the way.
    Native,
}

/// Probe cascade with a memoized, explicitly resettable snapshot.
///
/// Probe order:
/// 1. Forced environment from configuration
/// 2. `WEBSHIM_PLATFORM` environment variable
/// 3. Compile target (`wasm32` implies a browser-like host)
/// 4. Default: `Native` (conservative - never shim unless sure)
pub struct EnvironmentDetector {
    forced: Option<Environment>,
    snapshot: RefCell<Option<Environment>>,
}

impl EnvironmentDetector {
    pub fn new() -> Self {
        EnvironmentDetector {
            forced: None,
            snapshot: RefCell::new(None),
        }
    }

    pub fn from_config(config: &ShimConfig) -> Self {
        EnvironmentDetector {
            forced: config.force_environment,
            snapshot: RefCell::new(None),
        }
    }

    pub fn forced(environment: Environment) -> Self {
        EnvironmentDetector {
            forced: Some(environment),
            snapshot: RefCell::new(None),
        }
    }

    /// The memoized classification. First call runs the probe cascade.
    pub fn current(&self) -> Environment {
        if let Some(snapshot) = *self.snapshot.borrow() {
            return snapshot;
        }
        let detected = self.probe();
        *self.snapshot.borrow_mut() = Some(detected);
        detected
    }

    pub fn is_web(&self) -> bool {
        self.current() == Environment::Web
    }

    /// Drop the memoized snapshot so the next `current()` re-probes.
    pub fn reset(&self) {
        *self.snapshot.borrow_mut() = None;
    }

    fn probe(&self) -> Environment {
        if let Some(forced) = self.forced {
            return forced;
        }
        if let Ok(platform) = env::var(PLATFORM_ENV_VAR) {
            let platform = platform.to_ascii_lowercase();
            match platform.as_str() {
                "web" | "dom" | "browser" => return Environment::Web,
                "ios" | "android" | "native" => return Environment::Native,
                _ => {}
            }
        }
        if cfg!(target_arch = "wasm32") {
            return Environment::Web;
        }
        Environment::Native
    }
}

impl Default for EnvironmentDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_environment_skips_probes() {
        let detector = EnvironmentDetector::forced(Environment::Web);
        assert!(detector.is_web());
        let detector = EnvironmentDetector::forced(Environment::Native);
        assert!(!detector.is_web());
    }

    #[test]
    fn test_snapshot_memoized_until_reset() {
        let detector = EnvironmentDetector::forced(Environment::Web);
        assert_eq!(detector.current(), Environment::Web);
        assert!(detector.snapshot.borrow().is_some());
        detector.reset();
        assert!(detector.snapshot.borrow().is_none());
        assert_eq!(detector.current(), Environment::Web);
    }

    #[test]
    fn test_env_var_probe() {
        // This is the only test that touches the process environment.
        env::remove_var(PLATFORM_ENV_VAR);
        let detector = EnvironmentDetector::new();
        if !cfg!(target_arch = "wasm32") {
            assert_eq!(detector.current(), Environment::Native);
        }

        env::set_var(PLATFORM_ENV_VAR, "web");
        detector.reset();
        assert_eq!(detector.current(), Environment::Web);

        env::set_var(PLATFORM_ENV_VAR, "android");
        detector.reset();
        assert_eq!(detector.current(), Environment::Native);

        env::remove_var(PLATFORM_ENV_VAR);
    }

    #[test]
    fn test_from_config() {
        let config = ShimConfig::new().force_web();
        let detector = EnvironmentDetector::from_config(&config);
        assert!(detector.is_web());
    }
}
