//! Tests for the runtime interception layer.
//!
//! These verify the never-throw guarantees on wrapped objects, fallback
//! substitution for failing calls and rejected promises, strict-mode
//! re-throw, and the per-instance proxy cache.

extern crate webshim;

use webshim::resolver::config::ShimConfig;
use webshim::runtime::proxy::{Interceptor, ModuleProxy};
use webshim::runtime::value::{PromiseState, Value};

fn web_interceptor() -> Interceptor {
    Interceptor::new(&ShimConfig::new().force_web().silent())
}

fn sample_module() -> Value {
    Value::object(vec![
        ("count", Value::int(3)),
        ("label", Value::str("ready")),
        (
            "config",
            Value::object(vec![("timeout", Value::int(500))]),
        ),
        ("broken", Value::native_fn(|_| Err("native crash".to_string()))),
        (
            "rejecting",
            Value::native_fn(|_| Ok(Value::rejected("permission denied"))),
        ),
        ("double", Value::native_fn(|args| match args.first() {
            Some(Value::Number(_)) => Ok(args.into_iter().next().unwrap()),
            _ => Ok(Value::Null),
        })),
        ("ConnectionType", Value::Null),
    ])
}

#[test]
fn test_existing_primitive_reads_are_stable() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    assert_eq!(proxy.get("count").value(), Value::int(3));
    assert_eq!(proxy.get("count").value(), Value::int(3));
    assert_eq!(proxy.get("label").value(), Value::str("ready"));
}

#[test]
fn test_object_reads_share_the_underlying_target() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    // Fresh child wrappers each time, but over the same shared object.
    let first = proxy.get("config").value();
    let second = proxy.get("config").value();
    assert_eq!(first, second);
    assert_eq!(proxy.get("config").get("timeout").value(), Value::int(500));
}

#[test]
fn test_missing_reads_never_fail_regardless_of_shape() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    let names = [
        "getMissing",
        "isMissing",
        "addMissingListener",
        "removeMissingListener",
        "MissingView",
        "useMissing",
        "MissingContext",
        "MissingEventEmitter",
        "completely_random_name",
        "",
        "with spaces",
    ];
    for name in names.iter() {
        // Reads and further chaining are infallible by construction.
        let stub = proxy.get(name).get("deeper");
        let _ = stub.coerce_bool();
        let _ = stub.coerce_string();
    }
}

#[test]
fn test_safe_stub_is_callable_and_chainable() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    let stub = proxy.get("totallyUnknown");
    assert!(stub.call(vec![]).is_ok());
    assert!(!stub.coerce_bool());
    let chained = stub.get("deeper").get("evenDeeper");
    assert!(chained.call(vec![]).is_ok());
}

#[test]
fn test_throwing_method_is_substituted() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    // No rule matches "broken": the generic default for the name is used.
    let result = proxy.get("broken").call(vec![]).unwrap();
    assert_eq!(result, Value::Undefined);
}

#[test]
fn test_rejected_promise_is_replaced_by_resolved_one() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    let result = proxy.get("rejecting").call(vec![]).unwrap();
    match result {
        Value::Promise(state) => match &*state {
            PromiseState::Resolved(_) => {}
            PromiseState::Rejected(e) => panic!("rejection escaped: {}", e),
        },
        other => panic!("expected promise, got {:?}", other),
    }
}

#[test]
fn test_successful_calls_pass_through_untouched() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    assert_eq!(
        proxy.get("double").call(vec![Value::int(21)]).unwrap(),
        Value::int(21)
    );
}

#[test]
fn test_strict_mode_rethrows_original_error() {
    let interceptor = Interceptor::new(&ShimConfig::new().force_web().strict().silent());
    let proxy = interceptor.intercept("sample", sample_module());
    let failure = proxy.get("broken").call(vec![]).unwrap_err();
    assert_eq!(failure.error, "native crash");
    assert_eq!(failure.path, "broken");

    let failure = proxy.get("rejecting").call(vec![]).unwrap_err();
    assert_eq!(failure.error, "permission denied");
}

#[test]
fn test_missing_async_storage_method_resolves() {
    // A wrapped module lacking getItem entirely: the built-in storage rule
    // answers with a resolved null rather than a "not a function" failure.
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept(
        "@react-native-async-storage/async-storage",
        Value::object(vec![]),
    );
    let result = proxy
        .get("getItem")
        .call(vec![Value::str("missing-key")])
        .unwrap();
    match result {
        Value::Promise(state) => assert_eq!(*state, PromiseState::Resolved(Value::Null)),
        other => panic!("expected promise, got {:?}", other),
    }
}

#[test]
fn test_null_enum_member_keeps_dotted_access_working() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    // ConnectionType is null on the target; dotted access must still work
    // and produce a stable placeholder.
    let wifi = proxy.get("ConnectionType").get("wifi");
    assert_eq!(wifi.coerce_string(), "wifi");
    assert_eq!(
        proxy.get("ConnectionType").get("wifi").coerce_string(),
        "wifi"
    );
}

#[test]
fn test_missing_enum_export_uses_declared_rule() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept(
        "@react-native-community/netinfo",
        Value::object(vec![]),
    );
    let wifi = proxy.get("NetInfoStateType").get("wifi");
    assert_eq!(wifi.value(), Value::str("wifi"));
}

#[test]
fn test_shape_synthesis_for_missing_members() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());

    // Event emitter shape.
    let handle = proxy
        .get("DeviceEventEmitter")
        .get("addListener")
        .call(vec![])
        .unwrap();
    match handle {
        Value::Object(obj) => assert!(obj.borrow().get("remove").is_some()),
        other => panic!("expected unsubscribe handle, got {:?}", other),
    }

    // Listener registration shape.
    let handle = proxy.get("addChangeListener").call(vec![]).unwrap();
    assert_eq!(handle.type_name(), "object");

    // Removal shape is a no-op.
    assert_eq!(
        proxy.get("removeChangeListener").call(vec![]).unwrap(),
        Value::Undefined
    );

    // Hook shape: unknown hooks return null.
    assert_eq!(proxy.get("useMystery").call(vec![]).unwrap(), Value::Null);

    // Component shape: callable, returns a plain element-like object.
    let element = proxy
        .get("FallbackView")
        .call(vec![Value::object(vec![("title", Value::str("hi"))])])
        .unwrap();
    match element {
        Value::Object(obj) => {
            assert_eq!(obj.borrow().get("type"), Some(Value::str("FallbackView")))
        }
        other => panic!("expected element object, got {:?}", other),
    }

    // Context shape: Provider and Consumer both exist.
    let context = proxy.get("ThemeContext");
    assert!(context.has("Provider"));
    assert!(context.has("Consumer"));
}

#[test]
fn test_property_writes_report_success_without_raising() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept("sample", sample_module());
    assert!(proxy.set("newFlag", Value::Boolean(true)));
    assert_eq!(proxy.get("newFlag").value(), Value::Boolean(true));

    // Writing through a primitive-backed stub cannot succeed, but it only
    // reports failure.
    assert!(!proxy.get("count").set("nested", Value::Null));
}

#[test]
fn test_membership_and_keys_include_declared_fallbacks() {
    let interceptor = web_interceptor();
    let proxy = interceptor.intercept(
        "@react-native-community/netinfo",
        Value::object(vec![("realKey", Value::int(1))]),
    );
    assert!(proxy.has("realKey"));
    assert!(proxy.has("fetch"));
    assert!(proxy.has("addEventListener"));
    assert!(!proxy.has("nonsense"));

    let keys = proxy.keys();
    assert!(keys.contains(&"realKey".to_string()));
    assert!(keys.contains(&"fetch".to_string()));
    assert!(keys.contains(&"NetInfoStateType".to_string()));
}

#[test]
fn test_cached_proxy_is_identical_across_wraps() {
    let interceptor = web_interceptor();
    let first = interceptor.intercept("sample", sample_module());
    let second = interceptor.intercept("sample", sample_module());
    assert!(ModuleProxy::ptr_eq(&first, &second));

    interceptor.clear_cache();
    let third = interceptor.intercept("sample", sample_module());
    assert!(!ModuleProxy::ptr_eq(&first, &third));
}

#[test]
fn test_native_target_skips_interception() {
    let interceptor = Interceptor::new(&ShimConfig::new().force_native().silent());
    let module = sample_module();
    let proxy = interceptor.intercept("sample", module.clone());
    assert!(proxy.is_passthrough());

    // The wrapped value is the original object, untouched.
    assert_eq!(proxy.value(), module);

    // Direct reads work; no fallback behavior is added.
    assert_eq!(proxy.get("count").value(), Value::int(3));
    assert_eq!(proxy.get("getMissing").value(), Value::Undefined);

    // Failures propagate exactly as the unwrapped module would raise them.
    let failure = proxy.get("broken").call(vec![]).unwrap_err();
    assert_eq!(failure.error, "native crash");
    let failure = proxy.get("getMissing").call(vec![]).unwrap_err();
    assert!(failure.error.contains("not a function"));
}
