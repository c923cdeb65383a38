//! Naming-convention classification of module members.
//!
//! Mobile-ecosystem packages follow strong naming conventions (hooks start
//! with `use`, components are PascalCase, enum-like exports end in `Type` or
//! `Constants`, ...). Everything in this module is a pure function over the
//! member name, returning a closed set of tagged variants, so the heuristics
//! stay unit-testable and independent of the value model.

use crate::runtime::value::Value;

/// Shape of a member name, used when a key is missing from a wrapped target.
/// Checked in this order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberShape {
    EventEmitter,
    Context,
    Component,
    Hook,
    AddListener,
    RemoveListener,
    Other,
}

lazy_static! {
    /// Enum-like exports that are objects on the real module even though a
    /// degraded target may carry them as null.
    static ref KNOWN_ENUM_EXPORTS: Vec<&'static str> = vec![
        "ConnectionType",
        "CellularGeneration",
        "HapticFeedbackTypes",
        "NotificationFeedbackType",
        "ImpactFeedbackStyle",
        "PermissionStatus",
        "AuthorizationStatus",
        "CameraType",
        "FlashMode",
        "MediaType",
        "Directions",
        "State",
    ];

    /// Suffixes implying "this member should be an object".
    static ref OBJECT_SUFFIXES: Vec<&'static str> = vec![
        "State", "Type", "Types", "Constants", "Config", "Options",
        "Settings", "Styles", "Theme", "Event", "Events", "Manager", "Handler",
    ];
}

pub fn member_shape(name: &str) -> MemberShape {
    if name.ends_with("EventEmitter") || name.ends_with("Emitter") {
        MemberShape::EventEmitter
    } else if name.ends_with("Context") {
        MemberShape::Context
    } else if is_component_name(name) {
        MemberShape::Component
    } else if is_hook_name(name) {
        MemberShape::Hook
    } else if name.starts_with("add") && name.contains("Listener") || name == "addEventListener" {
        MemberShape::AddListener
    } else if name.starts_with("remove") && (name.contains("Listener") || name.contains("Subscription"))
        || name == "removeEventListener"
    {
        MemberShape::RemoveListener
    } else {
        MemberShape::Other
    }
}

/// PascalCase and not all-caps: `CameraView` yes, `URL` no, `getItem` no.
pub fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.chars().any(|c| c.is_ascii_lowercase())
}

/// `use` prefix followed by an uppercase letter: `useCameraDevice`.
pub fn is_hook_name(name: &str) -> bool {
    name.starts_with("use")
        && name
            .chars()
            .nth(3)
            .map_or(false, |c| c.is_ascii_uppercase())
}

pub fn is_context_name(name: &str) -> bool {
    name.ends_with("Context")
}

/// Should a null-valued member with this name be replaced by a fallback
/// object, so that dotted access on it (`ConnectionType.wifi`) keeps working?
pub fn expects_object(name: &str) -> bool {
    if KNOWN_ENUM_EXPORTS.contains(&name) {
        return true;
    }
    OBJECT_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix) && name.len() > suffix.len())
}

/// An unsubscribe handle: `{ remove() {} }`. There was never a real
/// subscription, so removal is a no-op by construction.
pub fn unsubscribe_handle() -> Value {
    Value::object(vec![("remove", Value::native_fn(|_| Ok(Value::Undefined)))])
}

/// Derive a safe return value from a member name when no explicit fallback
/// rule matched. Last resort of the fallback chain.
pub fn generic_default(name: &str) -> Value {
    let lower = name.to_ascii_lowercase();
    if lower.contains("permission") {
        // Permission checks report "granted" so capability-gated code paths
        // stay enabled and fall through to the per-capability fallbacks.
        return Value::object(vec![
            ("status", Value::str("granted")),
            ("granted", Value::Boolean(true)),
        ]);
    }
    if lower.contains("listener") || lower.contains("subscribe") {
        return unsubscribe_handle();
    }
    if name.starts_with("is")
        || name.starts_with("has")
        || name.starts_with("can")
        || name.starts_with("should")
        || name.starts_with("supports")
    {
        return Value::Boolean(false);
    }
    if name.starts_with("get") || name.starts_with("fetch") || name.starts_with("read") {
        // Constant-bag getters yield an empty bag, plain getters yield null.
        if name.ends_with("Constants") || name.ends_with("Config") {
            return Value::object(vec![]);
        }
        return Value::Null;
    }
    Value::Undefined
}

/// Heuristic: does this member name suggest an asynchronous operation?
/// Only consulted when the real module could not be loaded, so the actual
/// return type is unknown.
pub fn is_async_name(name: &str) -> bool {
    const ASYNC_PREFIXES: [&str; 8] = [
        "get", "set", "fetch", "load", "save", "remove", "request", "open",
    ];
    ASYNC_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix) && name.len() > prefix.len())
        || name.ends_with("Async")
}

/// Return shape inferred from a hook's name. Unknown hooks return null.
pub fn hook_default(name: &str) -> Value {
    if name.contains("Inset") || name.contains("SafeArea") {
        return Value::object(vec![
            ("top", Value::int(0)),
            ("bottom", Value::int(0)),
            ("left", Value::int(0)),
            ("right", Value::int(0)),
        ]);
    }
    if name.contains("Dimensions") || name.contains("Frame") || name.contains("Layout") {
        return Value::object(vec![
            ("x", Value::int(0)),
            ("y", Value::int(0)),
            ("width", Value::int(0)),
            ("height", Value::int(0)),
        ]);
    }
    if name.contains("State") {
        // [value, setter] tuple
        return Value::array(vec![
            Value::Null,
            Value::native_fn(|_| Ok(Value::Undefined)),
        ]);
    }
    if name.contains("Navigation") {
        return Value::object(vec![
            ("navigate", Value::native_fn(|_| Ok(Value::Undefined))),
            ("goBack", Value::native_fn(|_| Ok(Value::Undefined))),
            ("setOptions", Value::native_fn(|_| Ok(Value::Undefined))),
            ("addListener", Value::native_fn(|_| Ok(unsubscribe_handle()))),
            ("isFocused", Value::native_fn(|_| Ok(Value::Boolean(true)))),
        ]);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_shape_order() {
        assert_eq!(member_shape("DeviceEventEmitter"), MemberShape::EventEmitter);
        assert_eq!(member_shape("NavigationContext"), MemberShape::Context);
        assert_eq!(member_shape("CameraView"), MemberShape::Component);
        assert_eq!(member_shape("useCameraDevice"), MemberShape::Hook);
        assert_eq!(member_shape("addWifiListener"), MemberShape::AddListener);
        assert_eq!(member_shape("removeListeners"), MemberShape::RemoveListener);
        assert_eq!(member_shape("getItem"), MemberShape::Other);
    }

    #[test]
    fn test_component_name() {
        assert!(is_component_name("MapView"));
        assert!(!is_component_name("URL"));
        assert!(!is_component_name("getItem"));
        assert!(!is_component_name(""));
    }

    #[test]
    fn test_hook_name() {
        assert!(is_hook_name("useSafeAreaInsets"));
        assert!(!is_hook_name("use"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("getItem"));
    }

    #[test]
    fn test_expects_object() {
        assert!(expects_object("ConnectionType"));
        assert!(expects_object("HapticConstants"));
        assert!(expects_object("ThemeManager"));
        assert!(!expects_object("getItem"));
        // A bare suffix with nothing in front of it is not enum-like.
        assert!(!expects_object("Constants"));
    }

    #[test]
    fn test_generic_defaults() {
        assert_eq!(generic_default("isAvailable"), Value::Boolean(false));
        // permission wins over the predicate prefix
        assert_eq!(generic_default("hasPermission").type_name(), "object");
        assert_eq!(generic_default("getName"), Value::Null);
        assert_eq!(generic_default("getConstants").type_name(), "object");
        assert_eq!(generic_default("addChangeListener").type_name(), "object");
        assert_eq!(generic_default("launch"), Value::Undefined);
    }

    #[test]
    fn test_hook_defaults() {
        let insets = hook_default("useSafeAreaInsets");
        assert_eq!(insets.type_name(), "object");
        let frame = hook_default("useWindowDimensions");
        assert_eq!(frame.type_name(), "object");
        let tuple = hook_default("useCameraState");
        assert_eq!(tuple.type_name(), "array");
        assert_eq!(hook_default("useUnknownThing"), Value::Null);
    }

    #[test]
    fn test_async_name() {
        assert!(is_async_name("getItem"));
        assert!(is_async_name("requestPermission"));
        assert!(is_async_name("vibrateAsync"));
        assert!(!is_async_name("get"));
        assert!(!is_async_name("addListener"));
    }
}
