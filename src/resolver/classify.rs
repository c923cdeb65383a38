//! Identifier classification.
//!
//! Given a module identifier (and optionally its on-disk package metadata),
//! decide whether it is mobile-only, and with what confidence. Rules are
//! checked in strict order; the first decisive rule wins. Filesystem probes
//! (package metadata, web-variant sibling files) degrade silently on any
//! failure - classification never errors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Coarse qualitative certainty of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Result of classifying one identifier. Produced fresh per call, cheap to
/// recompute; callers cache the metadata lookups, not the classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub mobile_only: bool,
    pub confidence: Confidence,
    pub reason: String,
}

impl Classification {
    fn web(confidence: Confidence, reason: impl Into<String>) -> Self {
        Classification {
            mobile_only: false,
            confidence,
            reason: reason.into(),
        }
    }

    fn mobile(confidence: Confidence, reason: impl Into<String>) -> Self {
        Classification {
            mobile_only: true,
            confidence,
            reason: reason.into(),
        }
    }
}

lazy_static! {
    /// Identifiers known to run fine in a browser despite carrying the
    /// mobile namespace.
    static ref WEB_SAFE_ALLOW_LIST: Vec<&'static str> = vec![
        "react",
        "react-dom",
        "react-native-web",
        "react-native-svg-web",
        "react-native-web-linear-gradient",
        "scheduler",
        "prop-types",
    ];

    /// Hardware and platform-capability keywords that only make sense on a
    /// native device.
    static ref HARDWARE_KEYWORDS: Vec<&'static str> = vec![
        "camera",
        "bluetooth",
        "biometric",
        "fingerprint",
        "haptic",
        "vibration",
        "sensor",
        "contacts",
        "nfc",
        "torch",
        "gyroscope",
        "accelerometer",
        "barometer",
        "pedometer",
        "sms",
        "telephony",
        "push-notification",
    ];
}

/// Does the identifier mention the mobile ecosystem at all?
fn mentions_mobile_ecosystem(identifier: &str) -> bool {
    identifier.contains("react-native")
}

/// Does the identifier carry one of the two mobile namespace prefixes?
fn has_mobile_prefix(identifier: &str) -> bool {
    identifier == "react-native"
        || identifier.starts_with("react-native-")
        || identifier.starts_with("react-native/")
        || identifier.starts_with("@react-native")
}

/// Subset of `package.json` the classifier inspects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub main: Option<String>,
    pub keywords: Vec<String>,
    pub files: Vec<String>,
    pub browser: Option<serde_json::Value>,
    pub peer_dependencies: HashMap<String, String>,
    pub codegen_config: Option<serde_json::Value>,
    /// Directory the metadata was loaded from; enables the sibling-file
    /// probe. Not part of the JSON document itself.
    #[serde(skip)]
    pub package_dir: Option<PathBuf>,
}

impl PackageMetadata {
    /// Read `<package_dir>/package.json`. Missing files and parse errors
    /// yield `None` - metadata is strictly optional input.
    pub fn load(package_dir: &Path) -> Option<Self> {
        let content = fs::read_to_string(package_dir.join("package.json")).ok()?;
        let mut metadata: PackageMetadata = serde_json::from_str(&content).ok()?;
        metadata.package_dir = Some(package_dir.to_path_buf());
        Some(metadata)
    }

    fn declares_web_support(&self) -> bool {
        if self.browser.is_some() {
            return true;
        }
        if self
            .keywords
            .iter()
            .any(|k| k.contains("web") || k.contains("browser"))
        {
            return true;
        }
        self.files.iter().any(|f| f.ends_with(".web.js"))
    }

    fn declares_native_only(&self) -> bool {
        if self.codegen_config.is_some() {
            return true;
        }
        if self
            .keywords
            .iter()
            .any(|k| k == "native-module" || k == "turbomodule")
        {
            return true;
        }
        self.peer_dependencies.contains_key("react-native")
            && !self.peer_dependencies.contains_key("react-native-web")
    }

    /// Does a `*.web.js` variant sit next to the package entry file?
    fn has_web_entry_sibling(&self) -> bool {
        let dir = match &self.package_dir {
            Some(dir) => dir,
            None => return false,
        };
        let entry = self.main.as_deref().unwrap_or("index.js");
        let entry_path = dir.join(entry);
        let stem = match entry_path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => return false,
        };
        let sibling = entry_path
            .parent()
            .unwrap_or(dir)
            .join(format!("{}.web.js", stem));
        sibling.exists()
    }
}

/// Classify one identifier. Rules in strict order, first decisive rule wins.
pub fn classify(identifier: &str, metadata: Option<&PackageMetadata>) -> Classification {
    // 1. Curated allow-list of explicitly web-compatible packages.
    if WEB_SAFE_ALLOW_LIST.contains(&identifier) {
        return Classification::web(Confidence::High, "explicitly web-compatible");
    }

    // 2. Web-variant naming convention.
    if identifier.ends_with("-web") || identifier.contains("/web") {
        return Classification::web(Confidence::High, "web-variant naming convention");
    }

    // 3. Ordinary packages outside the mobile ecosystem are web-safe.
    if !mentions_mobile_ecosystem(identifier) {
        return Classification::web(Confidence::Medium, "outside the mobile-ecosystem namespace");
    }

    if let Some(metadata) = metadata {
        // 4. Explicit web support markers in package metadata.
        if metadata.declares_web_support() {
            return Classification::web(Confidence::High, "package metadata declares web support");
        }

        // 5. Explicit native-only markers.
        if metadata.declares_native_only() {
            return Classification::mobile(
                Confidence::High,
                "package metadata declares a native-only module",
            );
        }
    }

    // 6. Hardware/platform-capability keywords in the identifier.
    let lower = identifier.to_ascii_lowercase();
    if let Some(keyword) = HARDWARE_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        return Classification::mobile(
            Confidence::Medium,
            format!("identifier names a device capability ({})", keyword),
        );
    }

    // 7. A web-variant entry file next to the package entry.
    if let Some(metadata) = metadata {
        if metadata.has_web_entry_sibling() {
            return Classification::web(
                Confidence::Medium,
                "web-variant entry file present on disk",
            );
        }
    }

    // 8. Conservative default by namespace prefix.
    if has_mobile_prefix(identifier) {
        Classification::mobile(
            Confidence::Low,
            "mobile-ecosystem namespace with no web markers",
        )
    } else {
        Classification::web(Confidence::Low, "no decisive marker")
    }
}

/// Classifier with a metadata cache.
///
/// Classification itself is a pure function; the filesystem lookups are not,
/// so metadata reads are done at most once per identifier per classifier
/// instance.
pub struct Classifier {
    package_root: Option<PathBuf>,
    metadata_cache: RefCell<HashMap<String, Option<PackageMetadata>>>,
}

impl Classifier {
    pub fn new() -> Self {
        Classifier {
            package_root: None,
            metadata_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Enable metadata probing under the given packages directory
    /// (typically `node_modules`).
    pub fn with_package_root(root: impl Into<PathBuf>) -> Self {
        Classifier {
            package_root: Some(root.into()),
            metadata_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn classify(&self, identifier: &str) -> Classification {
        let metadata = self.metadata_for(identifier);
        classify(identifier, metadata.as_ref())
    }

    pub fn clear_cache(&self) {
        self.metadata_cache.borrow_mut().clear();
    }

    fn metadata_for(&self, identifier: &str) -> Option<PackageMetadata> {
        let root = self.package_root.as_ref()?;
        if let Some(cached) = self.metadata_cache.borrow().get(identifier) {
            return cached.clone();
        }
        let loaded = package_dir_for(identifier).and_then(|rel| PackageMetadata::load(&root.join(rel)));
        self.metadata_cache
            .borrow_mut()
            .insert(identifier.to_string(), loaded.clone());
        loaded
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Package directory for an identifier, relative to the packages root:
/// `pkg/sub/path` lives under `pkg`, `@scope/pkg/sub` under `@scope/pkg`.
fn package_dir_for(identifier: &str) -> Option<PathBuf> {
    let mut segments = identifier.split('/');
    let first = segments.next()?;
    if first.is_empty() {
        return None;
    }
    if let Some(stripped) = first.strip_prefix('@') {
        if stripped.is_empty() {
            return None;
        }
        let second = segments.next()?;
        Some(PathBuf::from(first).join(second))
    } else {
        Some(PathBuf::from(first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_wins() {
        let c = classify("react-native-web", None);
        assert!(!c.mobile_only);
        assert_eq!(c.confidence, Confidence::High);
    }

    #[test]
    fn test_web_naming_convention() {
        let c = classify("react-native-maps-web", None);
        assert!(!c.mobile_only);
        assert_eq!(c.confidence, Confidence::High);
        let c = classify("react-native-svg/web", None);
        assert!(!c.mobile_only);
    }

    #[test]
    fn test_ordinary_package_is_web_safe() {
        let c = classify("lodash", None);
        assert!(!c.mobile_only);
        assert_eq!(c.confidence, Confidence::Medium);
    }

    #[test]
    fn test_hardware_keyword() {
        let c = classify("react-native-camera", None);
        assert!(c.mobile_only);
        assert_eq!(c.confidence, Confidence::Medium);
        let c = classify("react-native-fingerprint-scanner", None);
        assert!(c.mobile_only);
    }

    #[test]
    fn test_prefix_default_is_conservative() {
        let c = classify("react-native-unknown-widget", None);
        assert!(c.mobile_only);
        assert_eq!(c.confidence, Confidence::Low);
        let c = classify("@react-native-community/netinfo", None);
        assert!(c.mobile_only);
    }

    #[test]
    fn test_metadata_web_support() {
        let metadata = PackageMetadata {
            browser: Some(serde_json::json!("./dist/index.web.js")),
            ..PackageMetadata::default()
        };
        let c = classify("react-native-gesture-handler", Some(&metadata));
        assert!(!c.mobile_only);
        assert_eq!(c.confidence, Confidence::High);
    }

    #[test]
    fn test_metadata_native_only() {
        let mut metadata = PackageMetadata::default();
        metadata
            .peer_dependencies
            .insert("react-native".to_string(), "*".to_string());
        let c = classify("react-native-widgets", Some(&metadata));
        assert!(c.mobile_only);
        assert_eq!(c.confidence, Confidence::High);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn test_package_dir_for() {
        assert_eq!(package_dir_for("lodash"), Some(PathBuf::from("lodash")));
        assert_eq!(
            package_dir_for("react-native-camera/src"),
            Some(PathBuf::from("react-native-camera"))
        );
        assert_eq!(
            package_dir_for("@react-native-community/netinfo"),
            Some(PathBuf::from("@react-native-community/netinfo"))
        );
        assert_eq!(package_dir_for(""), None);
    }
}
