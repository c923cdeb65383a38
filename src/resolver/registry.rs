//! Tiered substitution mappings.
//!
//! An ordered table of exact-match substitutions (identifier -> substitute
//! identifier) in three tiers with strict precedence:
//! override > user map > built-in. The registry is read-only configuration
//! loaded once per build.

use std::collections::HashMap;

use crate::resolver::config::ShimConfig;

/// Which tier a mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTier {
    Override,
    UserMap,
    BuiltIn,
}

/// One resolved mapping.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub source: String,
    pub substitute: String,
    pub tier: MappingTier,
}

lazy_static! {
    /// Curated substitutions for packages with a maintained web counterpart.
    static ref BUILT_IN_MAPPINGS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("react-native", "react-native-web");
        m.insert("react-native-linear-gradient", "react-native-web-linear-gradient");
        m.insert("react-native-svg", "react-native-svg-web");
        m.insert("react-native-maps", "react-native-web-maps");
        m.insert("react-native-webview", "react-native-web-webview");
        m.insert("lottie-react-native", "react-native-web-lottie");
        m.insert("react-native-vector-icons", "@expo/vector-icons");
        m.insert("react-native-modal", "modal-react-native-web");
        m
    };
}

/// The three mapping tiers behind one lookup.
pub struct MappingRegistry {
    overrides: HashMap<String, String>,
    user_map: HashMap<String, String>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        MappingRegistry {
            overrides: HashMap::new(),
            user_map: HashMap::new(),
        }
    }

    pub fn from_config(config: &ShimConfig) -> Self {
        MappingRegistry {
            overrides: config.overrides.clone(),
            user_map: config.user_map.clone(),
        }
    }

    /// Find the winning mapping for an identifier, if any tier carries one.
    pub fn lookup(&self, identifier: &str) -> Option<MappingEntry> {
        if let Some(substitute) = self.overrides.get(identifier) {
            return Some(MappingEntry {
                source: identifier.to_string(),
                substitute: substitute.clone(),
                tier: MappingTier::Override,
            });
        }
        if let Some(substitute) = self.user_map.get(identifier) {
            return Some(MappingEntry {
                source: identifier.to_string(),
                substitute: substitute.clone(),
                tier: MappingTier::UserMap,
            });
        }
        if let Some(substitute) = BUILT_IN_MAPPINGS.get(identifier) {
            return Some(MappingEntry {
                source: identifier.to_string(),
                substitute: (*substitute).to_string(),
                tier: MappingTier::BuiltIn,
            });
        }
        None
    }

    pub fn has_mapping(&self, identifier: &str) -> bool {
        self.overrides.contains_key(identifier)
            || self.user_map.contains_key(identifier)
            || BUILT_IN_MAPPINGS.contains_key(identifier)
    }

    /// Identifiers in the built-in tier (for diagnostics).
    pub fn built_in_sources() -> Vec<&'static str> {
        let mut sources: Vec<&'static str> = BUILT_IN_MAPPINGS.keys().copied().collect();
        sources.sort();
        sources
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
