//! Clipboard fallbacks (`@react-native-clipboard/clipboard`).

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::BrowserBridge;

pub const MODULE: &str = "@react-native-clipboard/clipboard";

/// Register clipboard rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.getString", MODULE),
        FallbackRule::handler(move |_record| {
            let text = b.clipboard_read().unwrap_or_default();
            Value::resolved(Value::str(text))
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.setString", MODULE),
        FallbackRule::handler(move |record| {
            if let Some(Value::Str(text)) = record.args.get(0) {
                b.clipboard_write(text);
            }
            Value::Undefined
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.hasString", MODULE),
        FallbackRule::handler(move |_record| {
            let has = b.clipboard_read().map_or(false, |text| !text.is_empty());
            Value::resolved(Value::Boolean(has))
        }),
    );
}
