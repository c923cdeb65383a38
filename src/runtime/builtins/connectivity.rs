//! Connectivity fallbacks (`@react-native-community/netinfo`).
//!
//! Connection state comes from the host when available; without it the
//! answers report an unknown connection rather than claiming to be offline,
//! so connectivity-gated code paths stay usable.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::shapes;
use crate::runtime::value::Value;

use super::{BrowserBridge, ConnectionStatus};

pub const MODULE: &str = "@react-native-community/netinfo";

fn state_value(status: Option<ConnectionStatus>) -> Value {
    match status {
        Some(status) => Value::object(vec![
            ("isConnected", Value::Boolean(status.online)),
            ("isInternetReachable", Value::Boolean(status.online)),
            ("type", Value::str(status.connection_type)),
        ]),
        None => Value::object(vec![
            ("isConnected", Value::Null),
            ("isInternetReachable", Value::Null),
            ("type", Value::str("unknown")),
        ]),
    }
}

fn state_type_enum() -> Value {
    let names = ["none", "unknown", "wifi", "cellular", "ethernet", "other"];
    Value::object(names.iter().map(|n| (*n, Value::str(*n))).collect())
}

/// Register connectivity rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.fetch", MODULE),
        FallbackRule::handler(move |_record| Value::resolved(state_value(b.connection()))),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.addEventListener", MODULE),
        FallbackRule::handler(move |record| {
            // Fire the listener once with the current state so subscribers
            // see a snapshot, then hand back a no-op unsubscribe.
            if let Some(Value::Function(listener)) = record.args.get(0) {
                let _ = listener.call(vec![state_value(b.connection())]);
            }
            shapes::unsubscribe_handle()
        }),
    );

    policy.add_built_in_rule(
        format!("{}.NetInfoStateType", MODULE),
        FallbackRule::value(state_type_enum()),
    );

    policy.add_built_in_rule(
        format!("{}.ConnectionType", MODULE),
        FallbackRule::value(state_type_enum()),
    );
}
