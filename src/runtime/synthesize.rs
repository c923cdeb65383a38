//! Stand-in module synthesis.
//!
//! When no explicit mapping exists for a mobile-only module, a best-effort
//! substitute is generated in two steps: interface discovery produces a
//! [`ModuleDescriptor`] (dynamic load -> static scan -> known-module table ->
//! empty, first success wins, never errors), and materialization turns each
//! described export into a synthetic value shaped by its category.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use crate::runtime::shapes;
use crate::runtime::value::Value;
use crate::scanner::{self, ScannedExport};

/// Category of one exported member, with category-specific metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportKind {
    Function { is_async: bool },
    /// An object export; members are described recursively.
    Object(Vec<ExportDescriptor>),
    Null,
    Primitive,
    Component,
    Hook,
    Context,
}

/// One exported member of a module interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDescriptor {
    pub name: String,
    pub kind: ExportKind,
}

impl ExportDescriptor {
    pub fn new(name: impl Into<String>, kind: ExportKind) -> Self {
        ExportDescriptor {
            name: name.into(),
            kind,
        }
    }
}

/// Approximated interface of one module. Built once per module name and
/// memoized for the life of the synthesizer instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub module_name: String,
    pub exports: Vec<ExportDescriptor>,
}

impl ModuleDescriptor {
    pub fn empty(module_name: impl Into<String>) -> Self {
        ModuleDescriptor {
            module_name: module_name.into(),
            exports: Vec::new(),
        }
    }

    pub fn with_export(mut self, name: impl Into<String>, kind: ExportKind) -> Self {
        self.exports.push(ExportDescriptor::new(name, kind));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

/// Host-supplied module loading. The default loader loads nothing, which
/// pushes discovery straight to the static scan.
pub trait ModuleLoader {
    /// Load the real module in the current process, if the environment can.
    fn load(&self, identifier: &str) -> Option<Value>;

    /// Entry source file for the identifier, for static scanning.
    fn entry_path(&self, identifier: &str) -> Option<PathBuf>;
}

/// Loader for hosts that cannot execute module code at build time.
pub struct NullLoader;

impl ModuleLoader for NullLoader {
    fn load(&self, _identifier: &str) -> Option<Value> {
        None
    }

    fn entry_path(&self, _identifier: &str) -> Option<PathBuf> {
        None
    }
}

lazy_static! {
    /// Hand-authored descriptors for very common modules whose shape is well
    /// known, used when both dynamic and static discovery fail.
    static ref KNOWN_MODULES: HashMap<&'static str, Vec<ExportDescriptor>> = {
        let afn = |name: &str| ExportDescriptor::new(name, ExportKind::Function { is_async: true });
        let sfn = |name: &str| ExportDescriptor::new(name, ExportKind::Function { is_async: false });
        let mut m = HashMap::new();
        m.insert(
            "@react-native-async-storage/async-storage",
            vec![
                afn("getItem"),
                afn("setItem"),
                afn("removeItem"),
                afn("clear"),
                afn("getAllKeys"),
                afn("multiGet"),
                afn("multiSet"),
            ],
        );
        m.insert(
            "@react-native-community/netinfo",
            vec![
                afn("fetch"),
                sfn("addEventListener"),
                ExportDescriptor::new("useNetInfo", ExportKind::Hook),
                ExportDescriptor::new(
                    "NetInfoStateType",
                    ExportKind::Object(vec![
                        ExportDescriptor::new("none", ExportKind::Primitive),
                        ExportDescriptor::new("wifi", ExportKind::Primitive),
                        ExportDescriptor::new("cellular", ExportKind::Primitive),
                        ExportDescriptor::new("unknown", ExportKind::Primitive),
                    ]),
                ),
            ],
        );
        m.insert(
            "react-native-device-info",
            vec![
                afn("getUniqueId"),
                afn("getDeviceName"),
                sfn("getSystemName"),
                sfn("getVersion"),
                afn("isEmulator"),
            ],
        );
        m.insert(
            "react-native-haptic-feedback",
            vec![sfn("trigger")],
        );
        m.insert(
            "@react-native-clipboard/clipboard",
            vec![afn("getString"), afn("setString")],
        );
        m.insert(
            "react-native-share",
            vec![afn("open"), afn("shareSingle")],
        );
        m.insert(
            "react-native-geolocation-service",
            vec![sfn("getCurrentPosition"), sfn("watchPosition"), sfn("clearWatch")],
        );
        m.insert(
            "react-native-camera",
            vec![
                ExportDescriptor::new("RNCamera", ExportKind::Component),
                ExportDescriptor::new(
                    "Constants",
                    ExportKind::Object(vec![
                        ExportDescriptor::new("Type", ExportKind::Object(vec![
                            ExportDescriptor::new("front", ExportKind::Primitive),
                            ExportDescriptor::new("back", ExportKind::Primitive),
                        ])),
                        ExportDescriptor::new("FlashMode", ExportKind::Object(vec![
                            ExportDescriptor::new("on", ExportKind::Primitive),
                            ExportDescriptor::new("off", ExportKind::Primitive),
                            ExportDescriptor::new("auto", ExportKind::Primitive),
                        ])),
                    ]),
                ),
            ],
        );
        m.insert(
            "react-native-safe-area-context",
            vec![
                ExportDescriptor::new("SafeAreaProvider", ExportKind::Component),
                ExportDescriptor::new("SafeAreaView", ExportKind::Component),
                ExportDescriptor::new("useSafeAreaInsets", ExportKind::Hook),
                ExportDescriptor::new("SafeAreaContext", ExportKind::Context),
            ],
        );
        m
    };
}

/// Interface discovery plus materialization, with per-module memoization.
pub struct Synthesizer {
    loader: Box<dyn ModuleLoader>,
    descriptors: RefCell<HashMap<String, Rc<ModuleDescriptor>>>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::with_loader(Box::new(NullLoader))
    }

    pub fn with_loader(loader: Box<dyn ModuleLoader>) -> Self {
        Synthesizer {
            loader,
            descriptors: RefCell::new(HashMap::new()),
        }
    }

    /// The memoized interface descriptor for a module. At most one
    /// descriptor exists per distinct module name per synthesizer instance.
    pub fn describe(&self, identifier: &str) -> Rc<ModuleDescriptor> {
        if let Some(descriptor) = self.descriptors.borrow().get(identifier) {
            return descriptor.clone();
        }
        let descriptor = Rc::new(self.discover(identifier));
        self.descriptors
            .borrow_mut()
            .insert(identifier.to_string(), descriptor.clone());
        descriptor
    }

    /// Full synthesis: describe, then materialize.
    pub fn synthesize(&self, identifier: &str) -> Value {
        materialize(&self.describe(identifier))
    }

    pub fn clear_cache(&self) {
        self.descriptors.borrow_mut().clear();
    }

    fn discover(&self, identifier: &str) -> ModuleDescriptor {
        // 1. Dynamic: enumerate the real module if the host can load it.
        if let Some(value) = self.loader.load(identifier) {
            if let Some(descriptor) = describe_loaded(identifier, &value) {
                debug!(module = identifier, "interface discovered dynamically");
                return descriptor;
            }
        }

        // 2. Static: scan the entry source without executing it.
        if let Some(entry) = self.loader.entry_path(identifier) {
            let scanned = scanner::scan_with_reexports(&entry);
            if !scanned.is_empty() {
                debug!(module = identifier, "interface discovered statically");
                return describe_scanned(identifier, &scanned);
            }
        }

        // 3. Curated table of well-known shapes.
        if let Some(exports) = KNOWN_MODULES.get(identifier) {
            debug!(module = identifier, "interface taken from known-module table");
            return ModuleDescriptor {
                module_name: identifier.to_string(),
                exports: exports.clone(),
            };
        }

        // 4. Empty descriptor - synthesis never fails.
        debug!(module = identifier, "interface unknown, using empty descriptor");
        ModuleDescriptor::empty(identifier)
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Describe a dynamically loaded module object by enumerating its
/// properties. Non-object modules yield a single default export.
fn describe_loaded(identifier: &str, value: &Value) -> Option<ModuleDescriptor> {
    match value {
        Value::Object(obj) => {
            let data = obj.borrow();
            let mut descriptor = ModuleDescriptor::empty(identifier);
            for key in data.keys() {
                let member = &data.properties[&key];
                let kind = classify_runtime_value(&key, member);
                descriptor.exports.push(ExportDescriptor::new(key, kind));
            }
            Some(descriptor)
        }
        Value::Undefined => None,
        other => Some(
            ModuleDescriptor::empty(identifier)
                .with_export("default", classify_runtime_value("default", other)),
        ),
    }
}

/// Classify by runtime type, with naming heuristics taking precedence where
/// the type alone is ambiguous.
fn classify_runtime_value(name: &str, value: &Value) -> ExportKind {
    match value {
        Value::Function(_) => {
            if shapes::is_hook_name(name) {
                ExportKind::Hook
            } else if shapes::is_component_name(name) {
                ExportKind::Component
            } else {
                ExportKind::Function {
                    is_async: shapes::is_async_name(name),
                }
            }
        }
        Value::Object(obj) => {
            if shapes::is_context_name(name) {
                return ExportKind::Context;
            }
            let data = obj.borrow();
            let members = data
                .keys()
                .into_iter()
                .map(|key| {
                    let kind = classify_runtime_value(&key, &data.properties[&key]);
                    ExportDescriptor::new(key, kind)
                })
                .collect();
            ExportKind::Object(members)
        }
        Value::Null | Value::Undefined => ExportKind::Null,
        _ => ExportKind::Primitive,
    }
}

/// Build a descriptor from statically scanned exports; categories come from
/// naming conventions alone, since nothing was executed.
fn describe_scanned(identifier: &str, scanned: &[ScannedExport]) -> ModuleDescriptor {
    let mut descriptor = ModuleDescriptor::empty(identifier);
    for export in scanned {
        match export {
            ScannedExport::Named(name) => {
                descriptor
                    .exports
                    .push(ExportDescriptor::new(name.clone(), classify_export_name(name)));
            }
            ScannedExport::Default => {
                descriptor
                    .exports
                    .push(ExportDescriptor::new("default", ExportKind::Object(Vec::new())));
            }
            // Unresolvable re-exports carry no member names.
            ScannedExport::ReexportAll(_) => {}
            ScannedExport::ReexportNamed { name, .. } => {
                descriptor
                    .exports
                    .push(ExportDescriptor::new(name.clone(), classify_export_name(name)));
            }
        }
    }
    descriptor
}

fn classify_export_name(name: &str) -> ExportKind {
    if shapes::is_context_name(name) {
        ExportKind::Context
    } else if shapes::is_hook_name(name) {
        ExportKind::Hook
    } else if shapes::is_component_name(name) {
        ExportKind::Component
    } else if !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
        ExportKind::Primitive
    } else {
        ExportKind::Function {
            is_async: shapes::is_async_name(name),
        }
    }
}

/// Materialize a descriptor into a live synthetic module object.
pub fn materialize(descriptor: &ModuleDescriptor) -> Value {
    let mut entries = Vec::new();
    for export in &descriptor.exports {
        entries.push((
            export.name.as_str(),
            materialize_export(&descriptor.module_name, export),
        ));
    }
    Value::object(entries)
}

fn materialize_export(module: &str, export: &ExportDescriptor) -> Value {
    let path = format!("{}.{}", module, export.name);
    match &export.kind {
        ExportKind::Function { is_async } => {
            let is_async = *is_async;
            let name = export.name.clone();
            Value::closure(move |_args| {
                debug!(path = %name, "synthesized function invoked");
                let default = shapes::generic_default(&name);
                if is_async {
                    Ok(Value::resolved(default))
                } else {
                    Ok(default)
                }
            })
        }
        ExportKind::Component => component_stand_in(&export.name),
        ExportKind::Hook => {
            let name = export.name.clone();
            Value::closure(move |_args| Ok(shapes::hook_default(&name)))
        }
        ExportKind::Context => context_stand_in(Value::Null),
        ExportKind::Object(members) => {
            let mut entries = Vec::new();
            for member in members {
                entries.push((member.name.as_str(), materialize_export(&path, member)));
            }
            Value::object(entries)
        }
        ExportKind::Null => Value::Null,
        // Enum-like constants conventionally map a name to itself.
        ExportKind::Primitive => Value::str(export.name.clone()),
    }
}

/// A component stand-in: callable without the real rendering library, it
/// returns a plain data object carrying the element type and props.
pub fn component_stand_in(name: &str) -> Value {
    let name = name.to_string();
    Value::closure(move |args| {
        let props = args.into_iter().next().unwrap_or(Value::Null);
        Ok(Value::object(vec![
            ("type", Value::str(name.clone())),
            ("props", props),
        ]))
    })
}

/// An event-emitter stand-in. Registrations hand back no-op unsubscribe
/// handles; there is never a real subscription behind them.
pub fn emitter_stand_in() -> Value {
    Value::object(vec![
        ("addListener", Value::native_fn(|_| Ok(shapes::unsubscribe_handle()))),
        ("addEventListener", Value::native_fn(|_| Ok(shapes::unsubscribe_handle()))),
        ("removeListener", Value::native_fn(|_| Ok(Value::Undefined))),
        ("removeAllListeners", Value::native_fn(|_| Ok(Value::Undefined))),
        ("emit", Value::native_fn(|_| Ok(Value::Boolean(false)))),
    ])
}

/// A context stand-in: Provider renders through, Consumer invokes its
/// child-as-function argument exactly once with the default value, and the
/// raw default sits under both conventional internal keys.
pub fn context_stand_in(default_value: Value) -> Value {
    let consumer_default = default_value.clone();
    let consumer = Value::closure(move |args| {
        // The child-as-function is conventionally the first argument, or a
        // `children` property on a props object.
        let child = match args.into_iter().next() {
            Some(Value::Function(f)) => Some(Value::Function(f)),
            Some(Value::Object(props)) => props.borrow().get("children"),
            _ => None,
        };
        match child {
            Some(Value::Function(f)) => f.call(vec![consumer_default.clone()]),
            _ => Ok(Value::Null),
        }
    });
    Value::object(vec![
        ("Provider", component_stand_in("Provider")),
        ("Consumer", consumer),
        ("_currentValue", default_value.clone()),
        ("_defaultValue", default_value),
    ])
}

/// Render a descriptor as deterministic stand-in JS source. The output is a
/// pure function of the descriptor, so generated files can be treated as
/// disposable build artifacts.
pub fn render_stub_source(descriptor: &ModuleDescriptor) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "// Auto-generated web stand-in for \"{}\".\n",
        descriptor.module_name
    ));
    out.push_str("// Regenerated on every build; safe to delete.\n");
    out.push_str("const __warned = {};\n");
    out.push_str("function __warn(name) {\n");
    out.push_str("  if (!__warned[name]) {\n");
    out.push_str("    __warned[name] = true;\n");
    out.push_str(&format!(
        "    console.warn('[webshim] {}.' + name + ' is not available on web');\n",
        descriptor.module_name
    ));
    out.push_str("  }\n}\n\n");

    for export in &descriptor.exports {
        if export.name == "default" {
            continue;
        }
        out.push_str(&render_stub_export(export, true));
    }
    if descriptor.exports.iter().any(|e| e.name == "default") {
        out.push_str("export default {};\n");
    }
    if descriptor.is_empty() {
        out.push_str("export default {};\n");
    }
    out
}

fn render_stub_export(export: &ExportDescriptor, top_level: bool) -> String {
    let prefix = if top_level { "export " } else { "" };
    match &export.kind {
        ExportKind::Function { is_async } => {
            let default = js_literal(&shapes::generic_default(&export.name));
            let body = if *is_async {
                format!("__warn('{}'); return Promise.resolve({});", export.name, default)
            } else {
                format!("__warn('{}'); return {};", export.name, default)
            };
            format!("{}function {}() {{ {} }}\n", prefix, export.name, body)
        }
        ExportKind::Component => format!(
            "{}function {}(props) {{ return null; }}\n",
            prefix, export.name
        ),
        ExportKind::Hook => format!(
            "{}function {}() {{ return {}; }}\n",
            prefix,
            export.name,
            js_literal(&shapes::hook_default(&export.name))
        ),
        ExportKind::Context => format!(
            "{}const {} = {{ Provider: (props) => (props && props.children) || null, \
             Consumer: (props) => (props && typeof props.children === 'function') ? props.children(null) : null, \
             _currentValue: null, _defaultValue: null }};\n",
            prefix, export.name
        ),
        ExportKind::Object(members) => {
            let rendered: Vec<String> = members
                .iter()
                .map(|member| format!("{}: {}", member.name, render_stub_member_value(member)))
                .collect();
            format!("{}const {} = {{ {} }};\n", prefix, export.name, rendered.join(", "))
        }
        ExportKind::Null => format!("{}const {} = null;\n", prefix, export.name),
        ExportKind::Primitive => format!(
            "{}const {} = '{}';\n",
            prefix, export.name, export.name
        ),
    }
}

fn render_stub_member_value(member: &ExportDescriptor) -> String {
    match &member.kind {
        ExportKind::Function { is_async } => {
            if *is_async {
                format!(
                    "function () {{ __warn('{}'); return Promise.resolve({}); }}",
                    member.name,
                    js_literal(&shapes::generic_default(&member.name))
                )
            } else {
                format!(
                    "function () {{ __warn('{}'); return {}; }}",
                    member.name,
                    js_literal(&shapes::generic_default(&member.name))
                )
            }
        }
        ExportKind::Object(members) => {
            let rendered: Vec<String> = members
                .iter()
                .map(|m| format!("{}: {}", m.name, render_stub_member_value(m)))
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        ExportKind::Null => "null".to_string(),
        ExportKind::Primitive => format!("'{}'", member.name),
        ExportKind::Component => "function (props) { return null; }".to_string(),
        ExportKind::Hook => format!("function () {{ return {}; }}", js_literal(&shapes::hook_default(&member.name))),
        ExportKind::Context => "{ Provider: null, Consumer: null, _currentValue: null, _defaultValue: null }".to_string(),
    }
}

/// Render a simple value as a JS literal. Functions render as no-ops.
fn js_literal(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Str(s) => format!("'{}'", s),
        Value::Array(items) => {
            let rendered: Vec<String> = items.borrow().iter().map(js_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(obj) => {
            let data = obj.borrow();
            let rendered: Vec<String> = data
                .keys()
                .iter()
                .map(|k| format!("{}: {}", k, js_literal(&data.properties[k])))
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        Value::Function(_) => "function () {}".to_string(),
        Value::Promise(_) => "Promise.resolve(null)".to_string(),
    }
}
