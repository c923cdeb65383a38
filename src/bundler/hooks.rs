//! Hook decorators for the host bundler.
//!
//! The bundler keeps its own resolver and transformer; these decorators wrap
//! them without altering their external contracts. The resolver hook
//! occasionally substitutes identifiers per the resolution policy; the
//! transform hook leaves output text untouched and only attaches
//! compatibility warnings as metadata.

use crate::resolver::policy::{DelegateResolver, ResolutionEngine, ResolveError, ResolvedModule};

/// Decorates the host resolver with the resolution policy. The host
/// observes ordinary resolver behavior with occasional identifier
/// substitution.
pub struct ResolverHook<'a, D: DelegateResolver> {
    engine: &'a ResolutionEngine,
    delegate: D,
}

impl<'a, D: DelegateResolver> ResolverHook<'a, D> {
    pub fn new(engine: &'a ResolutionEngine, delegate: D) -> Self {
        ResolverHook { engine, delegate }
    }

    pub fn resolve(
        &mut self,
        identifier: &str,
        platform: &str,
    ) -> Result<ResolvedModule, ResolveError> {
        self.engine.resolve(identifier, platform, &mut self.delegate)
    }

    pub fn into_delegate(self) -> D {
        self.delegate
    }
}

/// Error type for source transformation.
#[derive(Debug)]
pub enum TransformError {
    /// The delegate transformer failed.
    Delegate(String),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::Delegate(msg) => write!(f, "Delegate transform failed: {}", msg),
        }
    }
}

impl std::error::Error for TransformError {}

/// Transformed source plus attached compatibility metadata.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub code: String,
    pub warnings: Vec<CompatWarning>,
}

impl TransformOutput {
    pub fn passthrough(source: &str) -> Self {
        TransformOutput {
            code: source.to_string(),
            warnings: Vec::new(),
        }
    }
}

/// One direct-native-API usage found in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatWarning {
    /// 1-based source line.
    pub line: usize,
    pub pattern: String,
    pub message: String,
    pub suggestion: String,
}

/// The narrow contract to the host bundler's transformer.
pub trait DelegateTransformer {
    fn transform(&mut self, source: &str, filename: &str) -> Result<TransformOutput, TransformError>;
}

lazy_static! {
    /// Direct-native-API usage patterns worth flagging, with a suggestion
    /// each. Matching is textual and line-based; commented lines are
    /// skipped.
    static ref NATIVE_API_PATTERNS: Vec<(&'static str, &'static str, &'static str)> = vec![
        (
            "NativeModules",
            "Direct NativeModules access has no web implementation",
            "Gate the access behind Platform.OS or provide a web substitute module",
        ),
        (
            "requireNativeComponent",
            "requireNativeComponent cannot load native views on web",
            "Map the component to a DOM-backed implementation",
        ),
        (
            "TurboModuleRegistry",
            "TurboModuleRegistry lookups fail on web",
            "Resolve the module through a mapped substitute instead",
        ),
        (
            "NativeEventEmitter",
            "NativeEventEmitter has no native event source on web",
            "Subscribe to the substitute module's emitter instead",
        ),
        (
            "PermissionsAndroid",
            "PermissionsAndroid is Android-only",
            "Use the browser permission APIs or assume granted on web",
        ),
        (
            "UIManager",
            "UIManager is not available outside the native renderer",
            "Avoid direct view-manager calls in shared code",
        ),
        (
            "DeviceEventEmitter",
            "DeviceEventEmitter events never fire on web",
            "Emit through a platform-neutral event bus",
        ),
    ];
}

/// Scan source text for direct-native-API usage. Best-effort and
/// line-based; quoted occurrences are not distinguished, commented lines
/// are skipped.
pub fn scan_for_native_usage(source: &str) -> Vec<CompatWarning> {
    let mut warnings = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*") {
            continue;
        }
        for (pattern, message, suggestion) in NATIVE_API_PATTERNS.iter() {
            if trimmed.contains(pattern) {
                warnings.push(CompatWarning {
                    line: index + 1,
                    pattern: (*pattern).to_string(),
                    message: (*message).to_string(),
                    suggestion: (*suggestion).to_string(),
                });
            }
        }
    }
    warnings
}

/// Decorates the host transformer with the compatibility scan. Output text
/// is exactly what the delegate produced.
pub struct TransformHook<D: DelegateTransformer> {
    delegate: D,
}

impl<D: DelegateTransformer> TransformHook<D> {
    pub fn new(delegate: D) -> Self {
        TransformHook { delegate }
    }

    pub fn transform(
        &mut self,
        source: &str,
        filename: &str,
    ) -> Result<TransformOutput, TransformError> {
        let mut output = self.delegate.transform(source, filename)?;
        output.warnings.extend(scan_for_native_usage(source));
        Ok(output)
    }

    pub fn into_delegate(self) -> D {
        self.delegate
    }
}
