//! Resolution policy engine.
//!
//! For each (identifier, platform) pair the engine combines classifier
//! output and registry lookups into one decision: pass through unchanged,
//! redirect to a mapped substitute, or synthesize a stand-in. The host
//! bundler's own resolver is consumed through the narrow
//! [`DelegateResolver`] contract and is never bypassed - the engine only
//! changes which identifier the delegate is asked for.
//!
//! Precedence, each check short-circuiting on first match:
//!
//! 1. Non-web platform -> delegate unchanged
//! 2. Excluded identifier -> delegate unchanged
//! 3. Override tier mapping -> delegate the substitute
//! 4. User-map tier mapping -> delegate the substitute
//! 5. Built-in tier mapping -> delegate the substitute
//! 6. Force-included, or classified mobile-only at or above the confidence
//!    threshold -> synthesize (or refuse when mocks are disabled)
//! 7. Delegate unchanged
//!
//! In graceful mode every failure along the way recovers by delegating the
//! original identifier; strict mode propagates.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::resolver::classify::Classifier;
use crate::resolver::config::{FallbackStrategy, ShimConfig};
use crate::resolver::registry::{MappingRegistry, MappingTier};
use crate::runtime::synthesize::{render_stub_source, Synthesizer};

/// Error type for resolution.
#[derive(Debug)]
pub enum ResolveError {
    /// The delegate resolver failed.
    Delegate(String),
    /// A mobile-only module needs a stand-in but mock generation is
    /// disabled (surfaced in strict mode only).
    SynthesisDisabled(String),
    /// A generated stub could not be written (surfaced in strict mode only).
    MockWrite(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Delegate(msg) => write!(f, "Delegate resolution failed: {}", msg),
            ResolveError::SynthesisDisabled(id) => write!(
                f,
                "{} is mobile-only with no mapping and mock generation is disabled",
                id
            ),
            ResolveError::MockWrite(msg) => write!(f, "Failed to write mock: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Module descriptor handed back to the bundler.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub identifier: String,
    pub file_path: Option<PathBuf>,
}

impl ResolvedModule {
    pub fn bare(identifier: impl Into<String>) -> Self {
        ResolvedModule {
            identifier: identifier.into(),
            file_path: None,
        }
    }

    pub fn at(identifier: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        ResolvedModule {
            identifier: identifier.into(),
            file_path: Some(file_path.into()),
        }
    }
}

/// The narrow contract to the host bundler's resolver: a module name in, a
/// module descriptor out.
pub trait DelegateResolver {
    fn resolve(&mut self, identifier: &str, platform: &str) -> Result<ResolvedModule, ResolveError>;
}

/// How a resolution was decided. Deterministic per (identifier, platform)
/// for a given configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Delegate the identifier unchanged.
    PassThrough,
    /// Explicitly excluded by configuration; delegate unchanged.
    Excluded,
    /// Redirect to an explicitly mapped substitute.
    Mapped {
        tier: MappingTier,
        substitute: String,
    },
    /// Synthesize a stand-in under the given identifier.
    Synthesized { substitute: String },
    /// Needs a stand-in but mock generation is disabled.
    Refused,
}

/// The policy engine. Owns the registry, classifier, and synthesizer, plus
/// a decision memo that keeps repeated resolutions identical.
pub struct ResolutionEngine {
    config: ShimConfig,
    registry: MappingRegistry,
    classifier: Classifier,
    synthesizer: Synthesizer,
    decisions: RefCell<HashMap<String, Decision>>,
}

impl ResolutionEngine {
    pub fn new(config: ShimConfig) -> Self {
        let registry = MappingRegistry::from_config(&config);
        ResolutionEngine {
            config,
            registry,
            classifier: Classifier::new(),
            synthesizer: Synthesizer::new(),
            decisions: RefCell::new(HashMap::new()),
        }
    }

    /// Engine with a metadata-probing classifier and a host module loader.
    pub fn with_parts(config: ShimConfig, classifier: Classifier, synthesizer: Synthesizer) -> Self {
        let registry = MappingRegistry::from_config(&config);
        ResolutionEngine {
            config,
            registry,
            classifier,
            synthesizer,
            decisions: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Drop every memo (decisions, classifier metadata, synthesizer
    /// descriptors). Wholesale, not incremental.
    pub fn clear_caches(&self) {
        self.decisions.borrow_mut().clear();
        self.classifier.clear_cache();
        self.synthesizer.clear_cache();
    }

    /// The policy decision for one (identifier, platform) pair, memoized.
    pub fn decide(&self, identifier: &str, platform: &str) -> Decision {
        let memo_key = format!("{}::{}", platform, identifier);
        if let Some(decision) = self.decisions.borrow().get(&memo_key) {
            return decision.clone();
        }
        let decision = self.decide_uncached(identifier, platform);
        self.decisions.borrow_mut().insert(memo_key, decision.clone());
        decision
    }

    fn decide_uncached(&self, identifier: &str, platform: &str) -> Decision {
        if !self.config.is_web_platform(platform) {
            return Decision::PassThrough;
        }
        if self.config.is_excluded(identifier) {
            return Decision::Excluded;
        }
        if let Some(entry) = self.registry.lookup(identifier) {
            return Decision::Mapped {
                tier: entry.tier,
                substitute: entry.substitute,
            };
        }

        let needs_stand_in = if self.config.is_force_included(identifier) {
            true
        } else {
            let classification = self.classifier.classify(identifier);
            classification.mobile_only
                && classification.confidence >= self.config.confidence_threshold
        };

        if needs_stand_in {
            if self.config.mocks_enabled {
                Decision::Synthesized {
                    substitute: mock_identifier(identifier),
                }
            } else {
                Decision::Refused
            }
        } else {
            Decision::PassThrough
        }
    }

    /// Resolve one identifier through the delegate, applying the policy.
    pub fn resolve(
        &self,
        identifier: &str,
        platform: &str,
        delegate: &mut dyn DelegateResolver,
    ) -> Result<ResolvedModule, ResolveError> {
        match self.decide(identifier, platform) {
            Decision::PassThrough => {
                debug!(module = identifier, platform, "resolution passes through");
                delegate.resolve(identifier, platform)
            }
            Decision::Excluded => {
                debug!(module = identifier, platform, "identifier excluded by configuration");
                delegate.resolve(identifier, platform)
            }
            Decision::Mapped { tier, substitute } => {
                info!(
                    module = identifier,
                    substitute = %substitute,
                    tier = ?tier,
                    "redirecting to mapped substitute"
                );
                match delegate.resolve(&substitute, platform) {
                    Ok(resolved) => Ok(resolved),
                    Err(error) => self.recover(identifier, platform, delegate, error),
                }
            }
            Decision::Synthesized { substitute } => {
                info!(
                    module = identifier,
                    substitute = %substitute,
                    "synthesizing stand-in"
                );
                let written = match self.write_mock(identifier, &substitute) {
                    Ok(path) => path,
                    Err(error) => {
                        if self.config.strategy == FallbackStrategy::Strict {
                            return Err(error);
                        }
                        warn!(module = identifier, %error, "mock write failed, continuing");
                        None
                    }
                };
                match delegate.resolve(&substitute, platform) {
                    Ok(mut resolved) => {
                        if resolved.file_path.is_none() {
                            resolved.file_path = written;
                        }
                        Ok(resolved)
                    }
                    // The host may not know the synthetic identifier; the
                    // written stub (if any) is authoritative then.
                    Err(_) if written.is_some() => {
                        Ok(ResolvedModule {
                            identifier: substitute,
                            file_path: written,
                        })
                    }
                    Err(error) => self.recover(identifier, platform, delegate, error),
                }
            }
            Decision::Refused => {
                if self.config.strategy == FallbackStrategy::Strict {
                    Err(ResolveError::SynthesisDisabled(identifier.to_string()))
                } else {
                    warn!(
                        module = identifier,
                        "mobile-only module left unmapped (mock generation disabled)"
                    );
                    delegate.resolve(identifier, platform)
                }
            }
        }
    }

    /// Graceful recovery: log and re-delegate the original identifier.
    /// Strict mode propagates instead.
    fn recover(
        &self,
        identifier: &str,
        platform: &str,
        delegate: &mut dyn DelegateResolver,
        error: ResolveError,
    ) -> Result<ResolvedModule, ResolveError> {
        if self.config.strategy == FallbackStrategy::Strict {
            return Err(error);
        }
        warn!(
            module = identifier,
            %error,
            "substitute resolution failed, falling back to the original identifier"
        );
        delegate.resolve(identifier, platform)
    }

    /// Render and write the deterministic stub source when a mock directory
    /// is configured. Returns the written path, or `None` without one.
    fn write_mock(&self, identifier: &str, substitute: &str) -> Result<Option<PathBuf>, ResolveError> {
        let dir = match &self.config.mock_dir {
            Some(dir) => dir.clone(),
            None => return Ok(None),
        };
        let descriptor = self.synthesizer.describe(identifier);
        let source = render_stub_source(&descriptor);
        let file_name = substitute
            .rsplit('/')
            .next()
            .unwrap_or(substitute)
            .to_string();
        let path = dir.join(format!("{}.js", file_name));
        fs::create_dir_all(&dir).map_err(|e| ResolveError::MockWrite(e.to_string()))?;
        fs::write(&path, source).map_err(|e| ResolveError::MockWrite(e.to_string()))?;
        Ok(Some(path))
    }
}

/// Synthetic identifier for a generated stand-in. Deterministic per source
/// identifier.
pub fn mock_identifier(identifier: &str) -> String {
    let sanitized: String = identifier
        .chars()
        .map(|c| match c {
            '/' => '_',
            '@' => '_',
            other => other,
        })
        .collect();
    format!("webshim/mocks/{}", sanitized.trim_start_matches('_'))
}
