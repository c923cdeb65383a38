//! Built-in fallback rules for well-known packages.
//!
//! Each submodule registers the rules for one package family: storage,
//! geolocation, haptics, clipboard, share, device info, and connectivity,
//! including their enum-like sub-exports. Rules reach real browser
//! capabilities through the [`BrowserBridge`] trait when the host provides
//! one; under the default [`NoBridge`] every capability degrades to an
//! inert response.

use std::rc::Rc;

use crate::runtime::fallback::FallbackPolicy;

pub mod clipboard;
pub mod connectivity;
pub mod device;
pub mod geolocation;
pub mod haptics;
pub mod share;
pub mod storage;

/// A fix on the current geographic position, as far as the host knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// Connection status as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub online: bool,
    pub connection_type: String,
}

/// Host-provided access to browser capabilities. Every method has an inert
/// default, so an implementation only overrides what its platform offers.
/// `false`/`None` consistently mean "not available here".
pub trait BrowserBridge {
    fn vibrate(&self, _duration_ms: u64) -> bool {
        false
    }

    fn clipboard_read(&self) -> Option<String> {
        None
    }

    fn clipboard_write(&self, _text: &str) -> bool {
        false
    }

    fn share(&self, _message: &str, _url: Option<&str>) -> bool {
        false
    }

    fn current_position(&self) -> Option<GeoPosition> {
        None
    }

    fn connection(&self) -> Option<ConnectionStatus> {
        None
    }

    fn storage_get(&self, _key: &str) -> Option<String> {
        None
    }

    fn storage_set(&self, _key: &str, _value: &str) -> bool {
        false
    }

    fn storage_remove(&self, _key: &str) -> bool {
        false
    }

    fn storage_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn user_agent(&self) -> Option<String> {
        None
    }
}

/// The default bridge: no capabilities at all.
pub struct NoBridge;

impl BrowserBridge for NoBridge {}

/// Register every built-in rule table with the policy.
pub fn register_builtin_fallbacks(policy: &mut FallbackPolicy, bridge: Rc<dyn BrowserBridge>) {
    storage::register(policy, &bridge);
    geolocation::register(policy, &bridge);
    haptics::register(policy, &bridge);
    clipboard::register(policy, &bridge);
    share::register(policy, &bridge);
    device::register(policy, &bridge);
    connectivity::register(policy, &bridge);
}
