//! Haptic feedback fallbacks (`react-native-haptic-feedback`).
//!
//! Routed to the host's vibration capability when present; silently inert
//! otherwise.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::BrowserBridge;

pub const MODULE: &str = "react-native-haptic-feedback";

/// Vibration lengths per feedback type, loosely matching what the native
/// engines produce.
fn duration_for(feedback_type: &str) -> u64 {
    match feedback_type {
        "impactLight" | "selection" | "soft" => 10,
        "impactMedium" | "effectClick" => 20,
        "impactHeavy" | "rigid" => 30,
        "notificationSuccess" | "notificationWarning" | "notificationError" => 40,
        _ => 20,
    }
}

fn feedback_types() -> Value {
    let names = [
        "selection",
        "impactLight",
        "impactMedium",
        "impactHeavy",
        "rigid",
        "soft",
        "notificationSuccess",
        "notificationWarning",
        "notificationError",
    ];
    Value::object(names.iter().map(|n| (*n, Value::str(*n))).collect())
}

/// Register haptics rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    let b = bridge.clone();
    policy.add_built_in_rule(
        format!("{}.trigger", MODULE),
        FallbackRule::handler(move |record| {
            let feedback_type = match record.args.get(0) {
                Some(Value::Str(s)) => s.clone(),
                _ => "impactLight".to_string(),
            };
            b.vibrate(duration_for(&feedback_type));
            Value::Undefined
        }),
    );

    policy.add_built_in_rule(
        format!("{}.HapticFeedbackTypes", MODULE),
        FallbackRule::value(feedback_types()),
    );
}
