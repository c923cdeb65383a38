//! Share-sheet fallbacks (`react-native-share`).
//!
//! Uses the host's share capability when present. Without one the call
//! resolves to a dismissed result, which is what callers already handle for
//! a user-cancelled share sheet.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::BrowserBridge;

pub const MODULE: &str = "react-native-share";

fn option_string(options: &Value, key: &str) -> Option<String> {
    match options {
        Value::Object(obj) => match obj.borrow().get(key) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Register share rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    let b = bridge.clone();
    let open = FallbackRule::handler(move |record| {
        let options = record.args.get(0).cloned().unwrap_or(Value::Null);
        let message = option_string(&options, "message").unwrap_or_default();
        let url = option_string(&options, "url");
        let shared = b.share(&message, url.as_deref());
        Value::resolved(Value::object(vec![
            ("success", Value::Boolean(shared)),
            ("dismissedAction", Value::Boolean(!shared)),
        ]))
    });
    policy.add_built_in_rule(format!("{}.open", MODULE), open.clone());
    policy.add_built_in_rule(format!("{}.shareSingle", MODULE), open);
}
