//! Geolocation fallbacks (`react-native-geolocation-service` and the
//! community geolocation package).
//!
//! The native API is callback-based: `getCurrentPosition(success, error)`.
//! With a position from the host bridge the success callback fires once;
//! without one the error callback fires with a PERMISSION_DENIED-shaped
//! record, which is how the real API reports an unavailable provider.

use std::rc::Rc;

use crate::runtime::fallback::{FallbackPolicy, FallbackRule};
use crate::runtime::value::Value;

use super::{BrowserBridge, GeoPosition};

pub const MODULES: [&str; 2] = [
    "react-native-geolocation-service",
    "@react-native-community/geolocation",
];

fn position_value(position: &GeoPosition) -> Value {
    Value::object(vec![
        (
            "coords",
            Value::object(vec![
                ("latitude", Value::float(position.latitude)),
                ("longitude", Value::float(position.longitude)),
                ("accuracy", Value::float(position.accuracy)),
            ]),
        ),
        ("timestamp", Value::int(0)),
    ])
}

fn position_error() -> Value {
    Value::object(vec![
        ("code", Value::int(1)),
        ("message", Value::str("Location provider is unavailable")),
    ])
}

/// Register geolocation rules with the policy.
pub fn register(policy: &mut FallbackPolicy, bridge: &Rc<dyn BrowserBridge>) {
    for module in MODULES.iter() {
        let b = bridge.clone();
        policy.add_built_in_rule(
            format!("{}.getCurrentPosition", module),
            FallbackRule::handler(move |record| {
                match b.current_position() {
                    Some(position) => {
                        if let Some(Value::Function(success)) = record.args.get(0) {
                            let _ = success.call(vec![position_value(&position)]);
                        }
                    }
                    None => {
                        if let Some(Value::Function(error)) = record.args.get(1) {
                            let _ = error.call(vec![position_error()]);
                        }
                    }
                }
                Value::Undefined
            }),
        );

        policy.add_built_in_rule(
            format!("{}.watchPosition", module),
            // There is nothing to watch; hand back a watch id that
            // clearWatch will accept.
            FallbackRule::value(Value::int(0)),
        );

        policy.add_built_in_rule(
            format!("{}.clearWatch", module),
            FallbackRule::value(Value::Undefined),
        );

        policy.add_built_in_rule(
            format!("{}.requestAuthorization", module),
            FallbackRule::value(Value::resolved(Value::str("granted"))),
        );
    }
}
