use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Shared, mutable object payload. Objects are reference types: cloning a
/// `Value::Object` clones the handle, not the property map.
pub type SharedObject = Rc<RefCell<ObjectData>>;

/// Shared, mutable array payload.
pub type SharedArray = Rc<RefCell<Vec<Value>>>;

/// A dynamically typed module value. This is the object graph the
/// interception layer wraps: whatever the host loader hands over is first
/// converted into this representation.
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(NumberKind),
    Str(String),
    Array(SharedArray),
    Object(SharedObject),
    Function(FunctionValue),
    Promise(Rc<PromiseState>),
}

/// Property map behind a `Value::Object`.
pub struct ObjectData {
    pub properties: HashMap<String, Value>,
}

impl ObjectData {
    pub fn new() -> Self {
        ObjectData {
            properties: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.properties.get(key).cloned()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    /// Property names in sorted order. Synthesized artifacts must be
    /// deterministic, so every enumeration goes through here.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for ObjectData {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, PartialEq)]
pub enum NumberKind {
    Integer(i64),
    Float(f64),
}

impl Display for NumberKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberKind::Integer(i) => write!(f, "{}", i),
            NumberKind::Float(nf) => write!(f, "{}", nf),
        }
    }
}

impl Clone for NumberKind {
    fn clone(&self) -> Self {
        match self {
            NumberKind::Integer(i) => NumberKind::Integer(*i),
            NumberKind::Float(nf) => NumberKind::Float(*nf),
        }
    }
}

/// Outcome of an already-settled deferred result. The interception layer
/// never introduces suspension points of its own; a promise is just a value
/// that is already resolved or already rejected by the time it is observed.
#[derive(Debug, PartialEq)]
pub enum PromiseState {
    Resolved(Value),
    Rejected(String),
}

/// Native function signature for synthesized and built-in members.
pub type NativeFn = fn(Vec<Value>) -> Result<Value, String>;

/// A callable member - either a plain function pointer or a captured
/// closure (small vtable indirection cost).
pub enum FunctionValue {
    Native(NativeFn),
    Closure(Rc<dyn Fn(Vec<Value>) -> Result<Value, String>>),
}

impl FunctionValue {
    pub fn call(&self, args: Vec<Value>) -> Result<Value, String> {
        match self {
            FunctionValue::Native(f) => f(args),
            FunctionValue::Closure(f) => f(args),
        }
    }
}

impl Clone for FunctionValue {
    fn clone(&self) -> Self {
        match self {
            FunctionValue::Native(f) => FunctionValue::Native(*f),
            FunctionValue::Closure(f) => FunctionValue::Closure(f.clone()),
        }
    }
}

impl Value {
    /// Build an object value from key/value pairs.
    pub fn object(entries: Vec<(&str, Value)>) -> Value {
        let mut data = ObjectData::new();
        for (key, value) in entries {
            data.set(key, value);
        }
        Value::Object(Rc::new(RefCell::new(data)))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn int(i: i64) -> Value {
        Value::Number(NumberKind::Integer(i))
    }

    pub fn float(f: f64) -> Value {
        Value::Number(NumberKind::Float(f))
    }

    pub fn native_fn(f: NativeFn) -> Value {
        Value::Function(FunctionValue::Native(f))
    }

    pub fn closure(f: impl Fn(Vec<Value>) -> Result<Value, String> + 'static) -> Value {
        Value::Function(FunctionValue::Closure(Rc::new(f)))
    }

    pub fn resolved(value: Value) -> Value {
        Value::Promise(Rc::new(PromiseState::Resolved(value)))
    }

    pub fn rejected(error: impl Into<String>) -> Value {
        Value::Promise(Rc::new(PromiseState::Rejected(error.into())))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Convert a JSON document (configuration-declared fallback values) into
    /// a runtime value.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::int(i)
                } else {
                    Value::float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut data = ObjectData::new();
                for (key, value) in map {
                    data.set(key.clone(), Value::from_json(value));
                }
                Value::Object(Rc::new(RefCell::new(data)))
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Promise(_) => "promise",
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Undefined => Value::Undefined,
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Number(n) => Value::Number(n.clone()),
            Value::Str(s) => Value::Str(s.to_string()),
            Value::Array(a) => Value::Array(a.clone()),
            Value::Object(o) => Value::Object(o.clone()),
            Value::Function(f) => Value::Function(f.clone()),
            Value::Promise(p) => Value::Promise(p.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Array(a) => {
                let items: Vec<String> =
                    a.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(o) => {
                let data = o.borrow();
                let entries: Vec<String> = data
                    .keys()
                    .iter()
                    .map(|k| format!("{}: {}", k, data.properties[k]))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Function(_) => write!(f, "[function]"),
            Value::Promise(p) => match &**p {
                PromiseState::Resolved(v) => write!(f, "Promise(resolved: {})", v),
                PromiseState::Rejected(e) => write!(f, "Promise(rejected: {})", e),
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Value::Undefined"),
            Value::Null => write!(f, "Value::Null"),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::Number(n) => write!(f, "Value::Number({:?})", n),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::Array(_) => write!(f, "Value::Array(...)"),
            Value::Object(_) => write!(f, "Value::Object(...)"),
            Value::Function(_) => write!(f, "Value::Function(...)"),
            Value::Promise(p) => write!(f, "Value::Promise({:?})", p),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(FunctionValue::Native(a)), Value::Function(FunctionValue::Native(b))) => {
                *a as usize == *b as usize
            }
            (Value::Function(FunctionValue::Closure(a)), Value::Function(FunctionValue::Closure(b))) => {
                Rc::ptr_eq(a, b)
            }
            (Value::Promise(a), Value::Promise(b)) => a == b,
            _ => false,
        }
    }
}
