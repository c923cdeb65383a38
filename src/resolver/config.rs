//! Shim configuration.
//!
//! The configuration object is consumed, never produced, by the engine:
//! construct it programmatically with the builder methods, or load it from
//! a JSON file (the format a JS bundler config would actually carry).
//!
//! Expected file format:
//! ```json
//! {
//!     "overrides": { "react-native-maps": "./web/maps-stub" },
//!     "userMap": { "react-native-torch": "./shims/torch" },
//!     "mocksEnabled": true,
//!     "strategy": "graceful",
//!     "webPlatforms": ["web", "dom"],
//!     "verbosity": "normal",
//!     "fallbacks": { "react-native-torch.turnOn": null },
//!     "confidenceThreshold": "medium",
//!     "exclude": ["react-native-svg*"],
//!     "forceInclude": [],
//!     "mockDir": ".webshim/mocks",
//!     "forceEnvironment": "web"
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::resolver::classify::Confidence;
use crate::resolver::environment::Environment;

/// What happens when an intercepted operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    /// Substitute a fallback value and keep running.
    Graceful,
    /// Log, then surface the original error.
    Strict,
}

/// Logging verbosity. `Silent` turns engine logging off entirely.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent,
    Normal,
    Verbose,
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(String),
    /// Config file could not be parsed.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete configuration surface for both the build-time resolver and the
/// runtime interceptor. Read-only once handed to an engine; reconfiguration
/// means constructing a new engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShimConfig {
    /// Highest-precedence identifier substitutions.
    pub overrides: HashMap<String, String>,
    /// User-supplied substitutions, checked after `overrides`.
    pub user_map: HashMap<String, String>,
    /// Whether unmapped mobile-only modules may be synthesized.
    pub mocks_enabled: bool,
    pub strategy: FallbackStrategy,
    /// Platform identifiers treated as browser-like at build time.
    pub web_platforms: HashSet<String>,
    pub verbosity: Verbosity,
    /// Fixed substitute values keyed by module or `module.member` path.
    /// Handler-style rules are registered programmatically on the policy.
    #[serde(rename = "fallbacks")]
    pub custom_fallbacks: HashMap<String, serde_json::Value>,
    /// Minimum classifier confidence for treating an unmapped identifier as
    /// mobile-only.
    pub confidence_threshold: Confidence,
    /// Identifier patterns resolution must leave untouched.
    pub exclude: Vec<String>,
    /// Identifier patterns that are always synthesized when unmapped.
    pub force_include: Vec<String>,
    /// Where synthesized stub sources are written. None keeps them virtual.
    pub mock_dir: Option<PathBuf>,
    /// Skip environment probing and assume this environment.
    pub force_environment: Option<Environment>,
}

impl ShimConfig {
    pub fn new() -> Self {
        let mut web_platforms = HashSet::new();
        web_platforms.insert("web".to_string());
        web_platforms.insert("dom".to_string());
        web_platforms.insert("browser".to_string());
        ShimConfig {
            overrides: HashMap::new(),
            user_map: HashMap::new(),
            mocks_enabled: true,
            strategy: FallbackStrategy::Graceful,
            web_platforms,
            verbosity: Verbosity::Normal,
            custom_fallbacks: HashMap::new(),
            confidence_threshold: Confidence::Medium,
            exclude: Vec::new(),
            force_include: Vec::new(),
            mock_dir: None,
            force_environment: None,
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    // -- builder methods ---------------------------------------------------

    pub fn with_override(mut self, source: impl Into<String>, substitute: impl Into<String>) -> Self {
        self.overrides.insert(source.into(), substitute.into());
        self
    }

    pub fn with_user_mapping(mut self, source: impl Into<String>, substitute: impl Into<String>) -> Self {
        self.user_map.insert(source.into(), substitute.into());
        self
    }

    pub fn mocks_disabled(mut self) -> Self {
        self.mocks_enabled = false;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strategy = FallbackStrategy::Strict;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn silent(mut self) -> Self {
        self.verbosity = Verbosity::Silent;
        self
    }

    pub fn add_web_platform(mut self, platform: impl Into<String>) -> Self {
        self.web_platforms.insert(platform.into());
        self
    }

    pub fn with_fallback_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom_fallbacks.insert(key.into(), value);
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: Confidence) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn exclude_identifier(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn force_include_identifier(mut self, pattern: impl Into<String>) -> Self {
        self.force_include.push(pattern.into());
        self
    }

    pub fn with_mock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mock_dir = Some(dir.into());
        self
    }

    pub fn force_web(mut self) -> Self {
        self.force_environment = Some(Environment::Web);
        self
    }

    pub fn force_native(mut self) -> Self {
        self.force_environment = Some(Environment::Native);
        self
    }

    // -- queries -----------------------------------------------------------

    pub fn is_web_platform(&self, platform: &str) -> bool {
        self.web_platforms.contains(platform)
    }

    pub fn is_excluded(&self, identifier: &str) -> bool {
        self.exclude.iter().any(|p| matches_pattern(p, identifier))
    }

    pub fn is_force_included(&self, identifier: &str) -> bool {
        self.force_include.iter().any(|p| matches_pattern(p, identifier))
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact match, or prefix match when the pattern carries a trailing `*`.
fn matches_pattern(pattern: &str, identifier: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        identifier.starts_with(prefix)
    } else {
        pattern == identifier
    }
}
