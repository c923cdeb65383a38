//! Key-value storage fallbacks (`@react-native-async-storage/async-storage`).
//!
//! Backed by the host's storage capability when present (typically
//! `localStorage`), otherwise every operation resolves to an inert empty
//! result.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::BrowserBridge;

pub const MODULE: &str = "@react-native-async-storage/async-storage";

fn string_arg(args: &[Value], index: usize) -> Option<String> {
    match args.get(index) {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Register storage rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.getItem", MODULE),
        FallbackRule::handler(move |record| {
            let value = string_arg(&record.args, 0)
                .and_then(|key| b.storage_get(&key))
                .map(Value::str)
                .unwrap_or(Value::Null);
            Value::resolved(value)
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.setItem", MODULE),
        FallbackRule::handler(move |record| {
            if let (Some(key), Some(value)) =
                (string_arg(&record.args, 0), string_arg(&record.args, 1))
            {
                b.storage_set(&key, &value);
            }
            Value::resolved(Value::Undefined)
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.removeItem", MODULE),
        FallbackRule::handler(move |record| {
            if let Some(key) = string_arg(&record.args, 0) {
                b.storage_remove(&key);
            }
            Value::resolved(Value::Undefined)
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.getAllKeys", MODULE),
        FallbackRule::handler(move |_record| {
            let keys = b.storage_keys().into_iter().map(Value::str).collect();
            Value::resolved(Value::array(keys))
        }),
    );

    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.clear", MODULE),
        FallbackRule::handler(move |_record| {
            for key in b.storage_keys() {
                b.storage_remove(&key);
            }
            Value::resolved(Value::Undefined)
        }),
    );
}
