//! Layered fallback policy.
//!
//! When the interception layer detects a gap - a missing member, a throwing
//! method, a rejected promise - the policy decides what stands in for the
//! real result. Lookup order, first match wins:
//!
//! 1. Explicit per-call rule passed alongside the failing operation
//! 2. Per-module custom rule table (dotted path, then module-level key)
//! 3. Built-in rule table for well-known packages
//! 4. Naming-convention generic default
//!
//! Under the `Strict` strategy the policy re-throws instead of substituting,
//! after logging. Decision inputs are a structured [`FailureRecord`], never
//! an opaque exception.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{info, warn};

use crate::resolver::config::{FallbackStrategy, Verbosity};
use crate::runtime::shapes;
use crate::runtime::value::Value;

/// Structured description of a failed or missing operation. `path` is the
/// dotted member path within the module (`"getItem"`, `"ConnectionType.wifi"`).
pub struct FailureRecord {
    pub module: String,
    pub path: String,
    pub error: String,
    pub args: Vec<Value>,
}

impl FailureRecord {
    pub fn new(module: impl Into<String>, path: impl Into<String>, error: impl Into<String>) -> Self {
        FailureRecord {
            module: module.into(),
            path: path.into(),
            error: error.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Last segment of the dotted path - the member name the generic
    /// defaults are derived from.
    pub fn member_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Full rule key: `module.path`.
    pub fn scope_key(&self) -> String {
        format!("{}.{}", self.module, self.path)
    }
}

/// What a matching rule does with the failure.
pub enum FallbackBehavior {
    /// Substitute a fixed value.
    Value(Value),
    /// Compute the substitute from the failure record - plain fn pointer.
    Native(fn(&FailureRecord) -> Value),
    /// Computed substitute with captured state (small vtable cost).
    Handler(Rc<dyn Fn(&FailureRecord) -> Value>),
}

impl FallbackBehavior {
    fn apply(&self, record: &FailureRecord) -> Value {
        match self {
            FallbackBehavior::Value(v) => v.clone(),
            FallbackBehavior::Native(f) => f(record),
            FallbackBehavior::Handler(f) => f(record),
        }
    }
}

impl Clone for FallbackBehavior {
    fn clone(&self) -> Self {
        match self {
            FallbackBehavior::Value(v) => FallbackBehavior::Value(v.clone()),
            FallbackBehavior::Native(f) => FallbackBehavior::Native(*f),
            FallbackBehavior::Handler(f) => FallbackBehavior::Handler(f.clone()),
        }
    }
}

/// A single fallback rule. The scope key (module or `module.member` path) is
/// the map key it is registered under.
#[derive(Clone)]
pub struct FallbackRule {
    pub behavior: FallbackBehavior,
}

impl FallbackRule {
    pub fn value(v: Value) -> Self {
        FallbackRule {
            behavior: FallbackBehavior::Value(v),
        }
    }

    pub fn native(f: fn(&FailureRecord) -> Value) -> Self {
        FallbackRule {
            behavior: FallbackBehavior::Native(f),
        }
    }

    pub fn handler(f: impl Fn(&FailureRecord) -> Value + 'static) -> Self {
        FallbackRule {
            behavior: FallbackBehavior::Handler(Rc::new(f)),
        }
    }
}

/// Outcome of a policy consultation.
pub enum FallbackOutcome {
    /// Use this value instead of the failed result.
    Substitute(Value),
    /// Strict mode: surface the original error to the caller.
    Rethrow,
}

/// The layered rule set. Read-only after construction; reconfiguration means
/// building a new policy (and a new interceptor around it).
pub struct FallbackPolicy {
    /// User-supplied per-module rules.
    custom: HashMap<String, FallbackRule>,
    /// Built-in rules for well-known packages.
    built_in: HashMap<String, FallbackRule>,
    strategy: FallbackStrategy,
    verbosity: Verbosity,
}

impl FallbackPolicy {
    pub fn new(strategy: FallbackStrategy, verbosity: Verbosity) -> Self {
        FallbackPolicy {
            custom: HashMap::new(),
            built_in: HashMap::new(),
            strategy,
            verbosity,
        }
    }

    pub fn strategy(&self) -> FallbackStrategy {
        self.strategy
    }

    /// Register a user rule under a module or `module.member` key.
    pub fn add_custom_rule(&mut self, key: impl Into<String>, rule: FallbackRule) {
        self.custom.insert(key.into(), rule);
    }

    /// Register a built-in rule. Called by [`crate::runtime::builtins`].
    pub fn add_built_in_rule(&mut self, key: impl Into<String>, rule: FallbackRule) {
        self.built_in.insert(key.into(), rule);
    }

    /// Does any declared (custom or built-in) rule cover this member?
    /// Used by the proxy's membership test and key enumeration so capability
    /// checks are not misled when a fallback exists.
    pub fn has_rule_for(&self, module: &str, member: &str) -> bool {
        let key = format!("{}.{}", module, member);
        self.custom.contains_key(&key) || self.built_in.contains_key(&key)
    }

    /// Member names covered by declared rules for this module.
    pub fn rule_members_for(&self, module: &str) -> Vec<String> {
        let prefix = format!("{}.", module);
        let mut members: Vec<String> = self
            .custom
            .keys()
            .chain(self.built_in.keys())
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(|member| member.to_string())
            .collect();
        members.sort();
        members.dedup();
        members
    }

    fn find_rule(&self, record: &FailureRecord) -> Option<(&FallbackRule, &'static str)> {
        let scoped = record.scope_key();
        if let Some(rule) = self.custom.get(&scoped) {
            return Some((rule, "custom"));
        }
        if let Some(rule) = self.custom.get(&record.module) {
            return Some((rule, "custom"));
        }
        if let Some(rule) = self.built_in.get(&scoped) {
            return Some((rule, "built-in"));
        }
        if let Some(rule) = self.built_in.get(&record.module) {
            return Some((rule, "built-in"));
        }
        None
    }

    /// Look up a declared fixed-value substitute for a missing member.
    /// Only `Value` behaviors qualify: they are plain data (enum objects,
    /// configured constants) and safe to materialize on a property read.
    /// Handler rules run on the call path, where real arguments exist and
    /// side effects are expected. Strict-mode handling is not involved - a
    /// missing read has no error to re-throw.
    pub fn declared_static_value(&self, record: &FailureRecord) -> Option<Value> {
        self.find_rule(record).and_then(|(rule, origin)| match &rule.behavior {
            FallbackBehavior::Value(value) => {
                self.log_substitution(record, origin, false);
                Some(value.clone())
            }
            _ => None,
        })
    }

    /// Resolve a failed call. Graceful mode substitutes; strict mode logs
    /// and instructs the caller to surface the original error.
    pub fn resolve_failure(
        &self,
        per_call: Option<&FallbackRule>,
        record: &FailureRecord,
    ) -> FallbackOutcome {
        if self.strategy == FallbackStrategy::Strict {
            if self.verbosity != Verbosity::Silent {
                warn!(
                    module = %record.module,
                    path = %record.path,
                    error = %record.error,
                    "strict mode: re-throwing intercepted failure"
                );
            }
            return FallbackOutcome::Rethrow;
        }
        if let Some(rule) = per_call {
            self.log_substitution(record, "per-call", false);
            return FallbackOutcome::Substitute(rule.behavior.apply(record));
        }
        if let Some((rule, origin)) = self.find_rule(record) {
            self.log_substitution(record, origin, false);
            return FallbackOutcome::Substitute(rule.behavior.apply(record));
        }
        // No declared rule anywhere: derive a guess from the member name.
        self.log_substitution(record, "generic", true);
        FallbackOutcome::Substitute(shapes::generic_default(record.member_name()))
    }

    fn log_substitution(&self, record: &FailureRecord, origin: &str, guessed: bool) {
        match self.verbosity {
            Verbosity::Silent => {}
            Verbosity::Normal => {
                // Routine substitutions stay quiet; guesses are surprising
                // enough to warrant a warning.
                if guessed {
                    warn!(
                        module = %record.module,
                        path = %record.path,
                        error = %record.error,
                        "no fallback rule matched, substituting a convention-derived default"
                    );
                }
            }
            Verbosity::Verbose => {
                if guessed {
                    warn!(
                        module = %record.module,
                        path = %record.path,
                        error = %record.error,
                        "no fallback rule matched, substituting a convention-derived default"
                    );
                } else {
                    info!(
                        module = %record.module,
                        path = %record.path,
                        origin = origin,
                        "applied fallback"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FallbackPolicy {
        FallbackPolicy::new(FallbackStrategy::Graceful, Verbosity::Silent)
    }

    #[test]
    fn test_per_call_rule_wins() {
        let mut p = policy();
        p.add_custom_rule("mod.getItem", FallbackRule::value(Value::str("custom")));
        let record = FailureRecord::new("mod", "getItem", "boom");
        let per_call = FallbackRule::value(Value::str("per-call"));
        match p.resolve_failure(Some(&per_call), &record) {
            FallbackOutcome::Substitute(v) => assert_eq!(v, Value::str("per-call")),
            FallbackOutcome::Rethrow => panic!("unexpected rethrow"),
        }
    }

    #[test]
    fn test_custom_beats_built_in() {
        let mut p = policy();
        p.add_built_in_rule("mod.getItem", FallbackRule::value(Value::str("built-in")));
        p.add_custom_rule("mod.getItem", FallbackRule::value(Value::str("custom")));
        let record = FailureRecord::new("mod", "getItem", "boom");
        match p.resolve_failure(None, &record) {
            FallbackOutcome::Substitute(v) => assert_eq!(v, Value::str("custom")),
            FallbackOutcome::Rethrow => panic!("unexpected rethrow"),
        }
    }

    #[test]
    fn test_module_level_rule_applies_to_any_member() {
        let mut p = policy();
        p.add_custom_rule("mod", FallbackRule::value(Value::int(7)));
        let record = FailureRecord::new("mod", "anything", "boom");
        match p.resolve_failure(None, &record) {
            FallbackOutcome::Substitute(v) => assert_eq!(v, Value::int(7)),
            FallbackOutcome::Rethrow => panic!("unexpected rethrow"),
        }
    }

    #[test]
    fn test_generic_default_last_resort() {
        let p = policy();
        let record = FailureRecord::new("mod", "isEnabled", "boom");
        match p.resolve_failure(None, &record) {
            FallbackOutcome::Substitute(v) => assert_eq!(v, Value::Boolean(false)),
            FallbackOutcome::Rethrow => panic!("unexpected rethrow"),
        }
    }

    #[test]
    fn test_strict_rethrows() {
        let p = FallbackPolicy::new(FallbackStrategy::Strict, Verbosity::Silent);
        let record = FailureRecord::new("mod", "getItem", "boom");
        assert!(matches!(
            p.resolve_failure(None, &record),
            FallbackOutcome::Rethrow
        ));
    }

    #[test]
    fn test_handler_receives_record() {
        let mut p = policy();
        p.add_custom_rule(
            "mod.getItem",
            FallbackRule::native(|record| Value::str(record.member_name())),
        );
        let record = FailureRecord::new("mod", "getItem", "boom");
        match p.resolve_failure(None, &record) {
            FallbackOutcome::Substitute(v) => assert_eq!(v, Value::str("getItem")),
            FallbackOutcome::Rethrow => panic!("unexpected rethrow"),
        }
    }

    #[test]
    fn test_rule_members_for() {
        let mut p = policy();
        p.add_built_in_rule("mod.getItem", FallbackRule::value(Value::Null));
        p.add_custom_rule("mod.setItem", FallbackRule::value(Value::Null));
        p.add_custom_rule("other.thing", FallbackRule::value(Value::Null));
        assert_eq!(p.rule_members_for("mod"), vec!["getItem", "setItem"]);
        assert!(p.has_rule_for("mod", "getItem"));
        assert!(!p.has_rule_for("mod", "thing"));
    }
}
