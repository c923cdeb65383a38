//! Device information fallbacks (`react-native-device-info`).
//!
//! There is no device to describe, so the answers are stable browser-shaped
//! placeholders; the user agent comes from the host when available.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::BrowserBridge;

pub const MODULE: &str = "react-native-device-info";

/// Register device-info rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    policy.add_built_in_rule(
        format!("{}.getUniqueId", MODULE),
        FallbackRule::value(Value::resolved(Value::str("web"))),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.getDeviceName", MODULE),
        FallbackRule::handler(move |_record| {
            let name = b.user_agent().unwrap_or_else(|| "Browser".to_string());
            Value::resolved(Value::str(name))
        }),
    );

    policy.add_built_in_rule(
        format!("{}.getSystemName", MODULE),
        FallbackRule::value(Value::str("Web")),
    );

    policy.add_built_in_rule(
        format!("{}.getSystemVersion", MODULE),
        FallbackRule::value(Value::str("0.0.0")),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.getUserAgent", MODULE),
        FallbackRule::handler(move |_record| {
            let agent = b.user_agent().unwrap_or_default();
            Value::resolved(Value::str(agent))
        }),
    );

    policy.add_built_in_rule(
        format!("{}.isEmulator", MODULE),
        FallbackRule::value(Value::resolved(Value::Boolean(false))),
    );

    policy.add_built_in_rule(
        format!("{}.isTablet", MODULE),
        FallbackRule::value(Value::Boolean(false)),
    );
}
