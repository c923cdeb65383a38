//! Runtime interception layer.
//!
//! [`Interceptor::intercept`] wraps an already-loaded module object in a
//! [`ModuleProxy`] - an explicit recursive wrapper with `get`/`call`/`set`/
//! `has`/`keys` operations in place of a transparent language proxy. Every
//! operation either returns a real value, a synthesized fallback, or a
//! converted failure; raw errors only cross the boundary under the `Strict`
//! strategy.
//!
//! On a native target the interceptor stays out of the way entirely: proxies
//! are handed out in passthrough mode, performing direct access with no
//! fallback behavior.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::resolver::config::ShimConfig;
use crate::resolver::environment::EnvironmentDetector;
use crate::runtime::builtins::{self, BrowserBridge, NoBridge};
use crate::runtime::fallback::{FailureRecord, FallbackOutcome, FallbackPolicy, FallbackRule};
use crate::runtime::shapes::{self, MemberShape};
use crate::runtime::synthesize::{component_stand_in, context_stand_in, emitter_stand_in};
use crate::runtime::value::{PromiseState, Value};

/// An intercepted call that strict mode surfaces to the caller. In graceful
/// mode this type only appears on the native passthrough path, where errors
/// propagate exactly as the unwrapped module would have raised them.
#[derive(Debug)]
pub struct CallFailure {
    pub module: String,
    pub path: String,
    pub error: String,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} failed: {}", self.module, self.path, self.error)
    }
}

impl std::error::Error for CallFailure {}

/// Owner of the fallback policy, the environment detector, and the
/// name-keyed proxy cache. At most one top-level proxy exists per distinct
/// module name per interceptor instance.
pub struct Interceptor {
    policy: Rc<FallbackPolicy>,
    environment: EnvironmentDetector,
    proxies: RefCell<HashMap<String, ModuleProxy>>,
}

impl Interceptor {
    /// Build an interceptor from configuration, with built-in fallback rules
    /// backed by no browser capabilities (inert degradation).
    pub fn new(config: &ShimConfig) -> Self {
        Self::with_bridge(config, Rc::new(NoBridge))
    }

    /// Build an interceptor whose built-in rules reach real browser
    /// capabilities through the given bridge.
    pub fn with_bridge(config: &ShimConfig, bridge: Rc<dyn BrowserBridge>) -> Self {
        let mut policy = FallbackPolicy::new(config.strategy, config.verbosity);
        builtins::register_builtin_fallbacks(&mut policy, bridge);
        for (key, json) in &config.custom_fallbacks {
            policy.add_custom_rule(key.clone(), FallbackRule::value(Value::from_json(json)));
        }
        Self::with_policy(config, policy)
    }

    /// Build an interceptor around a fully prepared policy (programmatic
    /// handler rules included).
    pub fn with_policy(config: &ShimConfig, policy: FallbackPolicy) -> Self {
        Interceptor {
            policy: Rc::new(policy),
            environment: EnvironmentDetector::from_config(config),
            proxies: RefCell::new(HashMap::new()),
        }
    }

    /// Wrap a loaded module object. On a native target the returned proxy is
    /// a passthrough handle: direct access, no fallback behavior, no
    /// overhead beyond the handle itself.
    pub fn intercept(&self, module_name: &str, target: Value) -> ModuleProxy {
        if let Some(proxy) = self.proxies.borrow().get(module_name) {
            return proxy.clone();
        }
        let passthrough = !self.environment.is_web();
        let proxy = ModuleProxy::root(module_name, target, self.policy.clone(), passthrough);
        self.proxies
            .borrow_mut()
            .insert(module_name.to_string(), proxy.clone());
        proxy
    }

    pub fn environment(&self) -> &EnvironmentDetector {
        &self.environment
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Drop all cached proxies (reconfiguration support). The environment
    /// snapshot is reset too, so the next wrap re-probes.
    pub fn clear_cache(&self) {
        self.proxies.borrow_mut().clear();
        self.environment.reset();
    }
}

struct ProxyInner {
    module: String,
    /// Dotted member path within the module; empty at the top level.
    path: String,
    target: Value,
    policy: Rc<FallbackPolicy>,
    passthrough: bool,
}

/// Cheap-clone handle to one wrapped value. Cloning shares the handle;
/// [`ModuleProxy::ptr_eq`] tests identity.
pub struct ModuleProxy {
    inner: Rc<ProxyInner>,
}

impl Clone for ModuleProxy {
    fn clone(&self) -> Self {
        ModuleProxy {
            inner: self.inner.clone(),
        }
    }
}

impl ModuleProxy {
    fn root(module: &str, target: Value, policy: Rc<FallbackPolicy>, passthrough: bool) -> Self {
        ModuleProxy {
            inner: Rc::new(ProxyInner {
                module: module.to_string(),
                path: String::new(),
                target,
                policy,
                passthrough,
            }),
        }
    }

    fn child(&self, key: &str, target: Value) -> Self {
        ModuleProxy {
            inner: Rc::new(ProxyInner {
                module: self.inner.module.clone(),
                path: self.join(key),
                target,
                policy: self.inner.policy.clone(),
                passthrough: self.inner.passthrough,
            }),
        }
    }

    fn join(&self, key: &str) -> String {
        if self.inner.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.inner.path, key)
        }
    }

    /// Identity test for cached handles.
    pub fn ptr_eq(a: &ModuleProxy, b: &ModuleProxy) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn module(&self) -> &str {
        &self.inner.module
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The wrapped value itself (shared handle for objects).
    pub fn value(&self) -> Value {
        self.inner.target.clone()
    }

    pub fn is_passthrough(&self) -> bool {
        self.inner.passthrough
    }

    /// Read a property. Never fails: existing members come back wrapped,
    /// missing members come back as shape-synthesized stand-ins, declared
    /// fallbacks, or a callable-and-chainable safe stub.
    pub fn get(&self, key: &str) -> ModuleProxy {
        let existing = match &self.inner.target {
            Value::Object(obj) => obj.borrow().get(key),
            _ => None,
        };

        if self.inner.passthrough {
            return self.child(key, existing.unwrap_or(Value::Undefined));
        }

        match existing {
            Some(Value::Null) | Some(Value::Undefined) if shapes::expects_object(key) => {
                // Enum-like member degraded to null on this target: hand out
                // a nested fallback object so dotted access keeps working.
                self.child(key, Value::object(vec![]))
            }
            Some(value) => self.child(key, value),
            None => self.synthesize_missing(key),
        }
    }

    fn synthesize_missing(&self, key: &str) -> ModuleProxy {
        // A declared fixed-value rule (enum object, configured constant)
        // wins over name-shape guessing.
        let record = FailureRecord::new(
            self.inner.module.clone(),
            self.join(key),
            "property missing from target",
        );
        if let Some(value) = self.inner.policy.declared_static_value(&record) {
            return self.child(key, value);
        }

        match shapes::member_shape(key) {
            MemberShape::EventEmitter => self.child(key, emitter_stand_in()),
            MemberShape::Context => self.child(key, context_stand_in(Value::Null)),
            MemberShape::Component => self.child(key, component_stand_in(key)),
            MemberShape::Hook => {
                let name = key.to_string();
                self.child(key, Value::closure(move |_| Ok(shapes::hook_default(&name))))
            }
            MemberShape::AddListener => self.child(
                key,
                Value::native_fn(|_| Ok(shapes::unsubscribe_handle())),
            ),
            MemberShape::RemoveListener => {
                self.child(key, Value::native_fn(|_| Ok(Value::Undefined)))
            }
            // Safe stub: an undefined-backed proxy stays readable, callable
            // (the call path consults the full policy, handlers included),
            // and coercible without ever failing.
            MemberShape::Other => self.child(key, Value::Undefined),
        }
    }

    /// Invoke the wrapped value. Synchronous failures and rejected promise
    /// results are routed through the fallback policy; strict mode surfaces
    /// them as [`CallFailure`] instead.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, CallFailure> {
        self.call_with_fallback(args, None)
    }

    /// Invoke with an explicit per-call fallback rule, consulted before any
    /// configured or built-in rule.
    pub fn call_with_fallback(
        &self,
        args: Vec<Value>,
        per_call: Option<&FallbackRule>,
    ) -> Result<Value, CallFailure> {
        if self.inner.passthrough {
            return match &self.inner.target {
                Value::Function(f) => f.call(args).map_err(|error| self.failure(error)),
                other => Err(self.failure(format!("{} is not a function", other.type_name()))),
            };
        }

        match &self.inner.target {
            Value::Function(f) => match f.call(args.clone()) {
                Ok(Value::Promise(state)) => match &*state {
                    PromiseState::Rejected(error) => {
                        let record = self.record(error.clone(), args);
                        match self.inner.policy.resolve_failure(per_call, &record) {
                            FallbackOutcome::Substitute(value) => Ok(resolve_async(value)),
                            FallbackOutcome::Rethrow => Err(self.failure(error.clone())),
                        }
                    }
                    PromiseState::Resolved(_) => Ok(Value::Promise(state.clone())),
                },
                Ok(value) => Ok(value),
                Err(error) => {
                    let record = self.record(error.clone(), args);
                    match self.inner.policy.resolve_failure(per_call, &record) {
                        FallbackOutcome::Substitute(value) => Ok(value),
                        FallbackOutcome::Rethrow => Err(self.failure(error)),
                    }
                }
            },
            other => {
                let error = format!("{} is not a function", other.type_name());
                let record = self.record(error.clone(), args);
                match self.inner.policy.resolve_failure(per_call, &record) {
                    FallbackOutcome::Substitute(value) => Ok(value),
                    FallbackOutcome::Rethrow => Err(self.failure(error)),
                }
            }
        }
    }

    /// Write a property on the underlying target. Failures are logged and
    /// reported as `false`, never raised.
    pub fn set(&self, key: &str, value: Value) -> bool {
        match &self.inner.target {
            Value::Object(obj) => {
                obj.borrow_mut().set(key, value);
                true
            }
            other => {
                warn!(
                    module = %self.inner.module,
                    path = %self.join(key),
                    target = other.type_name(),
                    "property write rejected"
                );
                false
            }
        }
    }

    /// Membership test: the real target's keys plus every key a declared
    /// fallback rule covers, so capability probes are not misled.
    pub fn has(&self, key: &str) -> bool {
        let on_target = match &self.inner.target {
            Value::Object(obj) => obj.borrow().properties.contains_key(key),
            _ => false,
        };
        if on_target || self.inner.passthrough {
            return on_target;
        }
        self.inner
            .policy
            .has_rule_for(&self.inner.module, &self.join(key))
    }

    /// Key enumeration: union of real keys and declared-rule keys at this
    /// nesting level.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = match &self.inner.target {
            Value::Object(obj) => obj.borrow().keys(),
            _ => Vec::new(),
        };
        if !self.inner.passthrough {
            let prefix = if self.inner.path.is_empty() {
                String::new()
            } else {
                format!("{}.", self.inner.path)
            };
            for member in self.inner.policy.rule_members_for(&self.inner.module) {
                if let Some(rest) = member.strip_prefix(&prefix) {
                    let segment = rest.split('.').next().unwrap_or(rest);
                    if !segment.is_empty() {
                        keys.push(segment.to_string());
                    }
                }
            }
        }
        keys.sort();
        keys.dedup();
        keys
    }

    // -- primitive coercions (safe-stub friendly) --------------------------

    /// Truthiness of the wrapped value; safe stubs coerce to `false`.
    pub fn coerce_bool(&self) -> bool {
        match &self.inner.target {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::Number(n) => n.to_string() != "0",
            _ => true,
        }
    }

    /// String form of the wrapped value. A safe stub coerces to the member
    /// name it stands for, which keeps enum-style lookups stable.
    pub fn coerce_string(&self) -> String {
        match &self.inner.target {
            Value::Undefined => self
                .inner
                .path
                .rsplit('.')
                .next()
                .unwrap_or("")
                .to_string(),
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn record(&self, error: String, args: Vec<Value>) -> FailureRecord {
        FailureRecord::new(self.inner.module.clone(), self.inner.path.clone(), error)
            .with_args(args)
    }

    fn failure(&self, error: impl Into<String>) -> CallFailure {
        CallFailure {
            module: self.inner.module.clone(),
            path: self.inner.path.clone(),
            error: error.into(),
        }
    }
}

/// Substitutes for rejected promises must themselves look asynchronous.
fn resolve_async(value: Value) -> Value {
    match value {
        Value::Promise(_) => value,
        other => Value::resolved(other),
    }
}
